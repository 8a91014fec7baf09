//! Catalog entry types (made by FontLab https://www.fontlab.com/)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Declared range of one variation axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub tag: String,
    pub min: f32,
    pub max: f32,
}

/// Axis metadata pulled from a face: tags and their ranges, in face order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisData {
    pub tags: Vec<String>,
    pub ranges: Vec<AxisRange>,
}

impl AxisData {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// One selectable catalog item: a system family or a face inside a folder file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontEntry {
    display_name: String,
    #[serde(default)]
    file_path: PathBuf,
    is_system_font: bool,
    #[serde(default)]
    axis_tags: Vec<String>,
    #[serde(default)]
    axis_ranges: Vec<AxisRange>,
}

impl FontEntry {
    /// Entry for a family owned by the host font store.
    pub fn system(family: impl Into<String>, axes: AxisData) -> Self {
        Self {
            display_name: family.into(),
            file_path: PathBuf::new(),
            is_system_font: true,
            axis_tags: axes.tags,
            axis_ranges: axes.ranges,
        }
    }

    /// Entry for a face loaded from a font file; the display name gets a `[file]` suffix.
    pub fn folder(family: &str, path: impl Into<PathBuf>, axes: AxisData) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            display_name: format!("{family} [{file_name}]"),
            file_path: path,
            is_system_font: false,
            axis_tags: axes.tags,
            axis_ranges: axes.ranges,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Backing file, empty for system entries.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn is_system_font(&self) -> bool {
        self.is_system_font
    }

    pub fn axis_tags(&self) -> &[String] {
        &self.axis_tags
    }

    pub fn axis_ranges(&self) -> &[AxisRange] {
        &self.axis_ranges
    }

    /// Key used for case-insensitive identity across the catalog.
    pub fn dedup_key(&self) -> String {
        self.display_name.to_lowercase()
    }

    /// Family name used to resolve a drawable face.
    ///
    /// Folder entries drop everything from the first ` [` onwards.
    pub fn family_name(&self) -> &str {
        if self.is_system_font {
            return &self.display_name;
        }
        match self.display_name.find(" [") {
            Some(pos) => &self.display_name[..pos],
            None => &self.display_name,
        }
    }
}
