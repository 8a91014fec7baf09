//! Alias text templates (made by FontLab https://www.fontlab.com/)
//!
//! The host instantiates objects from a plain-text "alias": an `[Object]`
//! root carrying the frame range, followed by `[Object.N]` sections that each
//! name an effect and list its items. The key sets below are the host's, so
//! they are data here rather than string concatenation, and every template is
//! checked by [`AliasTemplate::validate`] before use.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::FontEntry;

/// Length used when the host time base cannot produce one.
pub const FALLBACK_FRAMES: u32 = 182;
/// Default duration of a created object, in seconds.
pub const DEFAULT_ALIAS_SECONDS: f64 = 1.1;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameLengthError {
    #[error("invalid time base: rate={rate} scale={scale}")]
    InvalidTimeBase { rate: i32, scale: i32 },
}

/// Frames covering `seconds` at `rate / scale` frames per second, rounded up.
///
/// A non-positive duration is one frame; a non-positive rate or scale is an error.
pub fn frame_length(seconds: f64, rate: i32, scale: i32) -> Result<u32, FrameLengthError> {
    if !(seconds > 0.0) {
        return Ok(1);
    }
    if rate <= 0 || scale <= 0 {
        return Err(FrameLengthError::InvalidTimeBase { rate, scale });
    }
    let frames = (seconds * f64::from(rate) / f64::from(scale)).ceil();
    Ok(if frames >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        (frames as u32).max(1)
    })
}

/// [`frame_length`] with [`FALLBACK_FRAMES`] substituted on error.
pub fn frame_length_or_fallback(seconds: f64, rate: i32, scale: i32) -> u32 {
    match frame_length(seconds, rate, scale) {
        Ok(frames) => frames,
        Err(err) => {
            tracing::debug!(error = %err, fallback = FALLBACK_FRAMES, "alias length fallback");
            FALLBACK_FRAMES
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template {template} has no sections")]
    Empty { template: &'static str },
    #[error("section {section} of {template} has an empty effect name")]
    MissingEffect {
        template: &'static str,
        section: usize,
    },
    #[error("duplicate key {key} in section {section} of {template}")]
    DuplicateKey {
        template: &'static str,
        section: usize,
        key: &'static str,
    },
    #[error("template {template} has {count} sample text slots, expected exactly one")]
    SampleTextSlots { template: &'static str, count: usize },
    #[error("template {template} never writes the font identity")]
    MissingFontIdentity { template: &'static str },
}

/// Which value an item receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Fixed(&'static str),
    /// File path for folder entries, empty for system entries.
    FolderPath,
    /// Display name for system entries, empty for folder entries.
    SystemName,
    /// Display name regardless of source.
    DisplayName,
    SampleText,
}

impl Slot {
    fn is_font_identity(self) -> bool {
        matches!(self, Slot::FolderPath | Slot::SystemName | Slot::DisplayName)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub effect: &'static str,
    pub items: &'static [(&'static str, Slot)],
}

/// Template keyed by the UI action that triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    /// "VF＋": the variable-font text effect.
    VariableFontText,
    /// "＋": the host's standard text effect.
    Text,
}

impl TemplateId {
    pub fn name(self) -> &'static str {
        match self {
            TemplateId::VariableFontText => "variable_font_text",
            TemplateId::Text => "text",
        }
    }

    pub fn template(self) -> &'static AliasTemplate {
        match self {
            TemplateId::VariableFontText => &VARIABLE_FONT_TEXT,
            TemplateId::Text => &TEXT,
        }
    }
}

impl FromStr for TemplateId {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "vf" | "variable" | "variable_font_text" => Ok(TemplateId::VariableFontText),
            "text" => Ok(TemplateId::Text),
            other => Err(anyhow!("unknown alias template: {other}")),
        }
    }
}

/// A versioned, ordered key layout.
#[derive(Debug, Clone, Copy)]
pub struct AliasTemplate {
    pub id: TemplateId,
    pub version: u32,
    pub sections: &'static [Section],
}

/// The values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct AliasFields<'a> {
    pub entry: &'a FontEntry,
    pub sample_text: &'a str,
    /// Non-positive lengths are replaced with [`FALLBACK_FRAMES`].
    pub frame_length: i64,
}

impl AliasTemplate {
    /// Structural checks: non-empty effects, unique keys per section, one
    /// sample text slot, at least one font identity slot.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let template = self.id.name();
        if self.sections.is_empty() {
            return Err(TemplateError::Empty { template });
        }

        let mut samples = 0;
        let mut identity = false;
        for (section, body) in self.sections.iter().enumerate() {
            if body.effect.is_empty() {
                return Err(TemplateError::MissingEffect { template, section });
            }
            let mut keys = HashSet::from(["effect.name"]);
            for (key, slot) in body.items {
                if !keys.insert(*key) {
                    return Err(TemplateError::DuplicateKey {
                        template,
                        section,
                        key: *key,
                    });
                }
                samples += usize::from(*slot == Slot::SampleText);
                identity |= slot.is_font_identity();
            }
        }

        if samples != 1 {
            return Err(TemplateError::SampleTextSlots {
                template,
                count: samples,
            });
        }
        if !identity {
            return Err(TemplateError::MissingFontIdentity { template });
        }
        Ok(())
    }

    /// Serialize `fields` into alias text.
    pub fn render(&self, fields: &AliasFields<'_>) -> Result<String, TemplateError> {
        self.validate()?;

        let frames = u32::try_from(fields.frame_length)
            .ok()
            .filter(|frames| *frames > 0)
            .unwrap_or(FALLBACK_FRAMES);
        let entry = fields.entry;
        let path = entry.file_path().to_string_lossy();

        let mut out = String::new();
        // writing to a String cannot fail
        let _ = writeln!(out, "[Object]\nframe=0,{frames}");
        for (index, section) in self.sections.iter().enumerate() {
            let _ = writeln!(out, "[Object.{index}]\neffect.name={}", section.effect);
            for (key, slot) in section.items {
                let value: &str = match slot {
                    Slot::Fixed(value) => *value,
                    Slot::FolderPath if !entry.is_system_font() => path.as_ref(),
                    Slot::SystemName if entry.is_system_font() => entry.display_name(),
                    Slot::FolderPath | Slot::SystemName => "",
                    Slot::DisplayName => entry.display_name(),
                    Slot::SampleText => fields.sample_text,
                };
                let _ = writeln!(out, "{key}={value}");
            }
        }

        tracing::trace!(
            template = self.id.name(),
            frames,
            bytes = out.len(),
            "alias rendered"
        );
        Ok(out)
    }
}

/// Render the template for `id`.
pub fn render_alias(id: TemplateId, fields: &AliasFields<'_>) -> Result<String, TemplateError> {
    id.template().render(fields)
}

const STANDARD_DRAW: Section = Section {
    effect: "標準描画",
    items: &[
        ("X", Slot::Fixed("0.00")),
        ("Y", Slot::Fixed("0.00")),
        ("Z", Slot::Fixed("0.00")),
        ("Group", Slot::Fixed("1")),
        ("中心X", Slot::Fixed("0.00")),
        ("中心Y", Slot::Fixed("0.00")),
        ("中心Z", Slot::Fixed("0.00")),
        ("X軸回転", Slot::Fixed("0.00")),
        ("Y軸回転", Slot::Fixed("0.00")),
        ("Z軸回転", Slot::Fixed("0.00")),
        ("拡大率", Slot::Fixed("100.000")),
        ("縦横比", Slot::Fixed("0.000")),
        ("透明度", Slot::Fixed("0.00")),
        ("合成モード", Slot::Fixed("通常")),
    ],
};

static VARIABLE_FONT_TEXT: AliasTemplate = AliasTemplate {
    id: TemplateId::VariableFontText,
    version: SCHEMA_VERSION,
    sections: &[
        Section {
            effect: "Variable Font Text",
            items: &[
                ("フォントファイル", Slot::FolderPath),
                ("フォント", Slot::SystemName),
                ("サイズ", Slot::Fixed("80.0")),
                ("文字色", Slot::Fixed("ffffff")),
                ("B", Slot::Fixed("0")),
                ("I", Slot::Fixed("0")),
                ("字間", Slot::Fixed("0.0")),
                ("影設定.hide", Slot::Fixed("1")),
                ("影を表示", Slot::Fixed("0")),
                ("影色", Slot::Fixed("000000")),
                ("影X", Slot::Fixed("0.0")),
                ("影Y", Slot::Fixed("0.0")),
                ("影濃度", Slot::Fixed("100")),
                ("影ぼかし", Slot::Fixed("0.0")),
                ("縁取り設定.hide", Slot::Fixed("1")),
                ("縁取りを表示", Slot::Fixed("0")),
                ("縁取り色", Slot::Fixed("000000")),
                ("縁取り幅", Slot::Fixed("5.0")),
                ("縁取りスタイル", Slot::Fixed("丸")),
                ("切り抜き", Slot::Fixed("0")),
                ("Weight", Slot::Fixed("400")),
                ("Width", Slot::Fixed("100")),
                ("Slant", Slot::Fixed("0.0")),
                ("Optical Size", Slot::Fixed("12.0")),
                ("Italic Axis", Slot::Fixed("0.0")),
                ("Grade (GRAD)", Slot::Fixed("0.0")),
                ("XTRA", Slot::Fixed("0")),
                ("XOPQ", Slot::Fixed("0")),
                ("YOPQ", Slot::Fixed("0")),
                ("YTLC", Slot::Fixed("0")),
                ("YTUC", Slot::Fixed("0")),
                ("YTAS", Slot::Fixed("0")),
                ("YTDE", Slot::Fixed("0")),
                ("YTFI", Slot::Fixed("0")),
                ("軸更新モード", Slot::Fixed("リアルタイム")),
                ("横幅", Slot::Fixed("0")),
                ("縦幅", Slot::Fixed("0")),
                ("文字揃え", Slot::Fixed("中央揃え[中]")),
                ("行間", Slot::Fixed("0.0")),
                ("アニメーション.hide", Slot::Fixed("1")),
                ("表示速度", Slot::Fixed("0.0")),
                ("文字毎に個別オブジェクト", Slot::Fixed("1")),
                ("テキスト", Slot::SampleText),
            ],
        },
        STANDARD_DRAW,
    ],
};

static TEXT: AliasTemplate = AliasTemplate {
    id: TemplateId::Text,
    version: SCHEMA_VERSION,
    sections: &[
        Section {
            effect: "テキスト",
            items: &[
                ("サイズ", Slot::Fixed("80.0")),
                ("字間", Slot::Fixed("0.00")),
                ("行間", Slot::Fixed("0.00")),
                ("表示速度", Slot::Fixed("0.00")),
                ("フォント", Slot::DisplayName),
                ("文字色", Slot::Fixed("ffffff")),
                ("影・縁色", Slot::Fixed("000000")),
                ("文字装飾", Slot::Fixed("標準文字")),
                ("文字揃え", Slot::Fixed("中央揃え[中]")),
                ("B", Slot::Fixed("0")),
                ("I", Slot::Fixed("0")),
                ("テキスト", Slot::SampleText),
                ("文字毎に個別オブジェクト", Slot::Fixed("0")),
                ("自動スクロール", Slot::Fixed("0")),
                ("移動座標上に表示", Slot::Fixed("0")),
                ("オブジェクトの長さを自動調節", Slot::Fixed("0")),
            ],
        },
        STANDARD_DRAW,
    ],
};
