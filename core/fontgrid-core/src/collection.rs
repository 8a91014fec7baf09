//! Per-file font collections and their process-lifetime cache (made by FontLab https://www.fontlab.com/)

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use read_fonts::{FileRef, FontRef, TableProvider};

use crate::names::{family_names, LocalizedName};

/// One face inside a collection.
#[derive(Debug, Clone)]
pub struct CollectionFace {
    /// Face index within the file (0 for single-face files).
    pub index: u32,
    pub family_names: Vec<LocalizedName>,
    pub weight: u16,
    pub italic: bool,
}

/// In-memory index over the faces of a single font file.
#[derive(Debug)]
pub struct FontCollection {
    path: PathBuf,
    data: Arc<[u8]>,
    faces: Vec<CollectionFace>,
}

impl FontCollection {
    /// Read and index a font file.
    ///
    /// Unreadable faces are skipped; a file with no readable face is an error.
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
        Self::from_bytes(path, data)
    }

    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self> {
        let path = path.into();
        FileRef::new(&data)
            .map_err(|err| anyhow!("unsupported font container {}: {err}", path.display()))?;

        let mut faces = Vec::new();
        for (position, font) in FontRef::fonts(&data).enumerate() {
            let font = match font {
                Ok(font) => font,
                Err(err) => {
                    tracing::warn!(path = %path.display(), face = position, error = %err, "skipping unreadable face");
                    continue;
                }
            };
            let (weight, italic) = match font.os2() {
                Ok(os2) => (os2.us_weight_class(), os2.fs_selection().bits() & 0x0001 != 0),
                Err(_) => (400, false),
            };
            faces.push(CollectionFace {
                index: font.ttc_index().unwrap_or(0),
                family_names: family_names(&font),
                weight,
                italic,
            });
        }
        if faces.is_empty() {
            bail!("{} contains no readable faces", path.display());
        }

        Ok(Self {
            path,
            data: Arc::from(data),
            faces,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file bytes shared with anything drawing from this collection.
    pub fn data(&self) -> &Arc<[u8]> {
        &self.data
    }

    pub fn faces(&self) -> &[CollectionFace] {
        &self.faces
    }

    /// Best face of `family` for normal weight, upright style.
    pub fn find_family(&self, family: &str) -> Option<&CollectionFace> {
        self.faces
            .iter()
            .filter(|face| {
                face.family_names
                    .iter()
                    .any(|name| name.value.eq_ignore_ascii_case(family))
            })
            .min_by_key(|face| (face.italic, face.weight.abs_diff(400)))
    }
}

/// Lazily built collections keyed by normalized path; entries live forever.
#[derive(Debug, Default)]
pub struct FontCollectionCache {
    entries: HashMap<PathBuf, Arc<FontCollection>>,
}

impl FontCollectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached collection for `path`, built from the file on first use.
    ///
    /// Failures are not remembered: the next call tries again from scratch.
    pub fn get_or_create(&mut self, path: &Path) -> Result<Arc<FontCollection>> {
        self.get_or_create_with(path, FontCollection::open)
    }

    /// Like [`get_or_create`](Self::get_or_create) with a custom constructor.
    pub fn get_or_create_with(
        &mut self,
        path: &Path,
        build: impl FnOnce(&Path) -> Result<FontCollection>,
    ) -> Result<Arc<FontCollection>> {
        if path.as_os_str().is_empty() {
            bail!("font collection requested for an empty path");
        }
        let key = normalize(path);
        if let Some(existing) = self.entries.get(&key) {
            return Ok(Arc::clone(existing));
        }

        let collection = Arc::new(build(&key)?);
        tracing::debug!(path = %key.display(), faces = collection.faces().len(), "font collection cached");
        self.entries.insert(key, Arc::clone(&collection));
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Absolute, lexically cleaned path (`.` dropped, `..` folded).
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
