//! The merged, deduplicated font catalog (made by FontLab https://www.fontlab.com/)

use std::collections::HashSet;
use std::ops::Index;

use crate::discovery::FontSource;
use crate::entry::FontEntry;

/// Ordered, deduplicated entries; immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<FontEntry>,
}

impl Catalog {
    /// Merge sources in priority order; the first occurrence of a name wins.
    ///
    /// A failing source is logged and contributes nothing.
    pub fn from_sources(sources: &[&dyn FontSource]) -> Self {
        let mut builder = CatalogBuilder::default();
        for source in sources {
            match source.enumerate() {
                Ok(entries) => {
                    let offered = entries.len();
                    let accepted = builder.extend(entries);
                    tracing::debug!(
                        source = source.label(),
                        offered,
                        accepted,
                        "source merged"
                    );
                }
                Err(err) => {
                    tracing::warn!(source = source.label(), error = %err, "font source failed");
                }
            }
        }
        let catalog = builder.build();
        tracing::info!(entries = catalog.len(), "catalog built");
        catalog
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FontEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[FontEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &FontEntry> {
        self.entries.iter()
    }

    /// Case-insensitive lookup by display name or resolved family name.
    pub fn find(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.entries
            .iter()
            .position(|e| e.dedup_key() == wanted)
            .or_else(|| {
                self.entries
                    .iter()
                    .position(|e| e.family_name().to_lowercase() == wanted)
            })
    }
}

impl Index<usize> for Catalog {
    type Output = FontEntry;

    fn index(&self, index: usize) -> &FontEntry {
        &self.entries[index]
    }
}

/// Append-only builder enforcing case-insensitive name uniqueness.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: Vec<FontEntry>,
    seen: HashSet<String>,
}

impl CatalogBuilder {
    /// Append `entry` unless its name is already taken; returns whether it was kept.
    pub fn push(&mut self, entry: FontEntry) -> bool {
        if !self.seen.insert(entry.dedup_key()) {
            tracing::info!(name = entry.display_name(), "font collision (keep first)");
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Append many entries in order; returns how many were kept.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = FontEntry>) -> usize {
        entries
            .into_iter()
            .map(|entry| self.push(entry))
            .filter(|kept| *kept)
            .count()
    }

    pub fn build(self) -> Catalog {
        Catalog {
            entries: self.entries,
        }
    }
}

impl FromIterator<FontEntry> for Catalog {
    fn from_iter<T: IntoIterator<Item = FontEntry>>(iter: T) -> Self {
        let mut builder = CatalogBuilder::default();
        builder.extend(iter);
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AxisData;
    use anyhow::{anyhow, Result};

    struct Fixed(&'static str, Vec<FontEntry>);

    impl FontSource for Fixed {
        fn label(&self) -> &'static str {
            self.0
        }
        fn enumerate(&self) -> Result<Vec<FontEntry>> {
            Ok(self.1.clone())
        }
    }

    struct Failing;

    impl FontSource for Failing {
        fn label(&self) -> &'static str {
            "failing"
        }
        fn enumerate(&self) -> Result<Vec<FontEntry>> {
            Err(anyhow!("store unavailable"))
        }
    }

    #[test]
    fn system_entries_come_first() {
        let system = Fixed("system", vec![FontEntry::system("Arial", AxisData::default())]);
        let folder = Fixed(
            "folder",
            vec![FontEntry::folder("Inter", "/f/Inter.ttf", AxisData::default())],
        );

        let catalog = Catalog::from_sources(&[&system, &folder]);

        assert_eq!(catalog.len(), 2);
        assert!(catalog[0].is_system_font());
        assert_eq!(catalog[1].display_name(), "Inter [Inter.ttf]");
    }

    #[test]
    fn failing_source_is_skipped() {
        let system = Fixed("system", vec![FontEntry::system("Arial", AxisData::default())]);
        let catalog = Catalog::from_sources(&[&Failing, &system]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn builder_reports_dropped_duplicates() {
        let mut builder = CatalogBuilder::default();
        assert!(builder.push(FontEntry::system("Meiryo", AxisData::default())));
        assert!(!builder.push(FontEntry::system("MEIRYO", AxisData::default())));
        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn find_matches_display_or_family_name() {
        let catalog: Catalog = vec![
            FontEntry::system("Arial", AxisData::default()),
            FontEntry::folder("Inter", "/f/Inter.ttf", AxisData::default()),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.find("arial"), Some(0));
        assert_eq!(catalog.find("Inter [Inter.ttf]"), Some(1));
        assert_eq!(catalog.find("inter"), Some(1));
        assert_eq!(catalog.find("missing"), None);
    }
}
