//! Localized family names (made by FontLab https://www.fontlab.com/)

use read_fonts::tables::name::NameId;
use read_fonts::{FontRef, TableProvider};

/// A family name together with the locale it is written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedName {
    /// Lowercase BCP-47 style tag, e.g. `ja-jp`.
    pub locale: String,
    pub value: String,
}

impl LocalizedName {
    pub fn new(locale: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            locale: locale.into().to_ascii_lowercase(),
            value: value.into(),
        }
    }
}

/// Locale preference chain: primary, then secondary, then whatever exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalePreference {
    pub primary: String,
    pub secondary: String,
}

impl Default for LocalePreference {
    fn default() -> Self {
        Self {
            primary: "ja-jp".to_string(),
            secondary: "en-us".to_string(),
        }
    }
}

impl LocalePreference {
    /// Pick the best name; `None` only when `names` is empty.
    pub fn pick<'a>(&self, names: &'a [LocalizedName]) -> Option<&'a str> {
        let find = |locale: &str| {
            names
                .iter()
                .find(|n| n.locale.eq_ignore_ascii_case(locale))
                .map(|n| n.value.as_str())
        };
        find(&self.primary)
            .or_else(|| find(&self.secondary))
            .or_else(|| names.first().map(|n| n.value.as_str()))
    }
}

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_MAC: u16 = 1;
const PLATFORM_WINDOWS: u16 = 3;

/// Map a name-record language id to a locale tag.
fn record_locale(platform_id: u16, language_id: u16) -> String {
    match (platform_id, language_id) {
        (PLATFORM_WINDOWS, 0x0411) | (PLATFORM_MAC, 11) => "ja-jp".to_string(),
        (PLATFORM_WINDOWS, 0x0409) | (PLATFORM_MAC, 0) => "en-us".to_string(),
        (PLATFORM_WINDOWS, 0x0809) => "en-gb".to_string(),
        (PLATFORM_WINDOWS, 0x0412) => "ko-kr".to_string(),
        (PLATFORM_WINDOWS, 0x0804) => "zh-cn".to_string(),
        (PLATFORM_WINDOWS, 0x0404) => "zh-tw".to_string(),
        (PLATFORM_UNICODE, _) => "und".to_string(),
        (platform, lang) => format!("x-{platform}-{lang:04x}"),
    }
}

/// Family names from the `name` table, one per locale.
///
/// Typographic family names (ID 16) win over legacy family names (ID 1) so
/// that style-linked faces of one family share a single name.
pub fn family_names(font: &FontRef) -> Vec<LocalizedName> {
    let Ok(name_table) = font.name() else {
        return Vec::new();
    };
    let data = name_table.string_data();

    let collected = |wanted: NameId| {
        let mut out: Vec<LocalizedName> = Vec::new();
        for record in name_table.name_record() {
            if record.name_id() != wanted {
                continue;
            }
            let locale = record_locale(record.platform_id(), record.language_id());
            if out.iter().any(|n| n.locale == locale) {
                continue;
            }
            if let Ok(entry) = record.string(data) {
                let rendered = entry.to_string();
                let trimmed = rendered.trim();
                if !trimmed.is_empty() {
                    out.push(LocalizedName::new(locale, trimmed));
                }
            }
        }
        out
    };

    let typographic = collected(NameId::TYPOGRAPHIC_FAMILY_NAME);
    if !typographic.is_empty() {
        return typographic;
    }
    collected(NameId::FAMILY_NAME)
}
