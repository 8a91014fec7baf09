//! Font sources: the bundled font folder and the source trait (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use read_fonts::{FileRef, FontRef};
use skrifa::FontRef as SkrifaFontRef;
use walkdir::WalkDir;

use crate::axes;
use crate::entry::{AxisData, FontEntry};
use crate::names::{family_names, LocalePreference};

/// Anything that can contribute raw entries to the catalog.
pub trait FontSource {
    /// Short label used in log lines.
    fn label(&self) -> &'static str;

    /// Entries in source order; duplicates are resolved by the catalog.
    fn enumerate(&self) -> Result<Vec<FontEntry>>;
}

/// Non-recursive scanner for a folder of font files.
#[derive(Debug, Clone)]
pub struct FolderFontSource {
    root: PathBuf,
    locales: LocalePreference,
}

impl FolderFontSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locales: LocalePreference::default(),
        }
    }

    pub fn with_locales(mut self, locales: LocalePreference) -> Self {
        self.locales = locales;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Font files directly inside the root, in file-name order.
    ///
    /// Symlinks are followed; entries that cannot be read are logged and skipped.
    pub fn candidate_files(&self) -> Result<Vec<PathBuf>> {
        let root = std::path::absolute(&self.root)
            .with_context(|| format!("resolving {}", self.root.display()))?;

        let mut found = Vec::new();
        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(root = %root.display(), error = %err, "skipping folder entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && is_font(entry.path()) {
                found.push(entry.path().to_path_buf());
            }
        }
        Ok(found)
    }

    fn load_file(&self, path: &Path) -> Result<Vec<FontEntry>> {
        let data = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
        FileRef::new(&data).map_err(|err| anyhow!("unsupported font container: {err}"))?;

        let mut entries = Vec::new();
        for (position, font) in FontRef::fonts(&data).enumerate() {
            let font = match font {
                Ok(font) => font,
                Err(err) => {
                    tracing::warn!(path = %path.display(), face = position, error = %err, "skipping unreadable face");
                    continue;
                }
            };

            let names = family_names(&font);
            let Some(family) = self.locales.pick(&names) else {
                tracing::debug!(path = %path.display(), face = position, "face has no family name");
                continue;
            };

            let index = font.ttc_index().unwrap_or(0);
            let axes = match SkrifaFontRef::from_index(&data, index) {
                Ok(face) => axes::extract(&face),
                Err(err) => {
                    tracing::debug!(path = %path.display(), index, error = %err, "face construction failed");
                    AxisData::default()
                }
            };

            entries.push(FontEntry::folder(family, path, axes));
        }
        Ok(entries)
    }
}

impl FontSource for FolderFontSource {
    fn label(&self) -> &'static str {
        "folder"
    }

    fn enumerate(&self) -> Result<Vec<FontEntry>> {
        if !self.root.is_dir() {
            tracing::info!(root = %self.root.display(), "font folder not present");
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for path in self.candidate_files()? {
            match self.load_file(&path) {
                Ok(found) => entries.extend(found),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping font file");
                }
            }
        }
        tracing::debug!(root = %self.root.display(), entries = entries.len(), "folder scan finished");
        Ok(entries)
    }
}

fn is_font(path: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return false,
    };

    matches!(ext.as_str(), "ttf" | "otf" | "ttc")
}
