//! Browser configuration (made by FontLab https://www.fontlab.com/)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::alias::DEFAULT_ALIAS_SECONDS;
use crate::names::LocalePreference;
use crate::render::{PreviewSettings, Rgb, DEFAULT_SAMPLE_TEXT};

/// Overrides the font folder when set.
pub const FONT_DIR_ENV: &str = "FONTGRID_FONT_DIR";
/// Folder name looked up next to the executable.
pub const DEFAULT_FONT_FOLDER: &str = "Fonts";

/// Everything the browser reads at startup; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Folder scanned for external fonts; `None` means `<exe dir>/Fonts`.
    pub font_folder: Option<PathBuf>,
    pub primary_locale: String,
    pub secondary_locale: String,
    pub sample_text: String,
    pub preview_font_size: f32,
    pub preview_locale: String,
    pub fallback_family: String,
    pub margin: f32,
    pub background: Rgb,
    pub alias_seconds: f64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let locales = LocalePreference::default();
        let preview = PreviewSettings::default();
        Self {
            font_folder: None,
            primary_locale: locales.primary,
            secondary_locale: locales.secondary,
            sample_text: DEFAULT_SAMPLE_TEXT.to_string(),
            preview_font_size: preview.font_size,
            preview_locale: preview.locale,
            fallback_family: preview.fallback_family,
            margin: preview.margin,
            background: Rgb::WHITE,
            alias_seconds: DEFAULT_ALIAS_SECONDS,
        }
    }
}

impl BrowserConfig {
    /// Read a JSON config file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Font folder after applying the environment override.
    pub fn resolve_font_folder(&self) -> PathBuf {
        if let Some(raw) = env::var_os(FONT_DIR_ENV).filter(|raw| !raw.is_empty()) {
            return PathBuf::from(raw);
        }
        if let Some(folder) = &self.font_folder {
            return folder.clone();
        }
        default_font_folder()
    }

    pub fn locales(&self) -> LocalePreference {
        LocalePreference {
            primary: self.primary_locale.to_lowercase(),
            secondary: self.secondary_locale.to_lowercase(),
        }
    }

    pub fn preview_settings(&self) -> PreviewSettings {
        PreviewSettings {
            font_size: self.preview_font_size,
            locale: self.preview_locale.clone(),
            fallback_family: self.fallback_family.clone(),
            margin: self.margin,
            default_sample: self.sample_text.clone(),
            ..PreviewSettings::default()
        }
    }
}

/// `Fonts` beside the running executable, or relative to the working directory.
pub fn default_font_folder() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_FONT_FOLDER)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_FOLDER))
}
