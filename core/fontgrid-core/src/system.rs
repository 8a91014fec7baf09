//! Host font store enumeration (made by FontLab https://www.fontlab.com/)

use anyhow::Result;

use crate::axes::{self, VariableFace};
use crate::discovery::FontSource;
use crate::entry::{AxisData, FontEntry};
use crate::names::{LocalePreference, LocalizedName};

/// The operating environment's font store, viewed family by family.
pub trait FontStore {
    fn family_count(&self) -> usize;

    /// Every localized name the store knows for `family`.
    fn family_names(&self, family: usize) -> Vec<LocalizedName>;

    /// Resolve the family's normal weight/style/stretch face and hand it to `visit`.
    fn with_normal_face(&self, family: usize, visit: &mut dyn FnMut(&dyn VariableFace))
        -> Result<()>;
}

/// Catalog source over a [`FontStore`].
pub struct SystemFontSource<S> {
    store: S,
    locales: LocalePreference,
}

impl<S: FontStore> SystemFontSource<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locales: LocalePreference::default(),
        }
    }

    pub fn with_locales(mut self, locales: LocalePreference) -> Self {
        self.locales = locales;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: FontStore> FontSource for SystemFontSource<S> {
    fn label(&self) -> &'static str {
        "system"
    }

    fn enumerate(&self) -> Result<Vec<FontEntry>> {
        let count = self.store.family_count();
        let mut entries = Vec::with_capacity(count);

        for family in 0..count {
            let names = self.store.family_names(family);
            let Some(name) = self.locales.pick(&names) else {
                tracing::debug!(family, "system family without a name");
                continue;
            };

            let mut axis_data = AxisData::default();
            if let Err(err) = self
                .store
                .with_normal_face(family, &mut |face| axis_data = axes::extract(face))
            {
                tracing::debug!(family = name, error = %err, "no representative face");
            }

            tracing::trace!(family = name, axes = axis_data.tags.len(), "system family added");
            entries.push(FontEntry::system(name, axis_data));
        }

        Ok(entries)
    }
}

#[cfg(feature = "system-fonts")]
pub use fontdb_store::FontDbStore;

#[cfg(feature = "system-fonts")]
mod fontdb_store {
    use std::collections::HashMap;
    use std::sync::Arc;

    use anyhow::{anyhow, Result};
    use fontdb::{Database, Family, Language, Query, Stretch, Style, Weight};
    use skrifa::FontRef as SkrifaFontRef;

    use super::FontStore;
    use crate::axes::VariableFace;
    use crate::names::LocalizedName;

    struct StoreFamily {
        key: String,
        names: Vec<LocalizedName>,
    }

    /// [`FontStore`] over a `fontdb` database, grouped by family name.
    pub struct FontDbStore {
        db: Arc<Database>,
        families: Vec<StoreFamily>,
    }

    impl FontDbStore {
        /// Load the platform's installed fonts.
        pub fn load_system() -> Self {
            let mut db = Database::new();
            db.load_system_fonts();
            tracing::info!(faces = db.len(), "system font database loaded");
            Self::new(Arc::new(db))
        }

        pub fn new(db: Arc<Database>) -> Self {
            let mut families: Vec<StoreFamily> = Vec::new();
            let mut seen: HashMap<String, usize> = HashMap::new();

            for face in db.faces() {
                let Some((key, _)) = face.families.first() else {
                    continue;
                };
                let slot = *seen.entry(key.clone()).or_insert_with(|| {
                    families.push(StoreFamily {
                        key: key.clone(),
                        names: Vec::new(),
                    });
                    families.len() - 1
                });
                let family = &mut families[slot];
                for (name, language) in &face.families {
                    let locale = locale_tag(*language);
                    if !family.names.iter().any(|n| n.locale == locale) {
                        family.names.push(LocalizedName::new(locale, name.clone()));
                    }
                }
            }

            Self { db, families }
        }

        /// Shared handle to the underlying database.
        pub fn database(&self) -> &Arc<Database> {
            &self.db
        }
    }

    fn locale_tag(language: Language) -> String {
        match language {
            Language::Japanese_Japan => "ja-jp".to_string(),
            Language::English_UnitedStates => "en-us".to_string(),
            other => format!("x-{other:?}").to_ascii_lowercase().replace('_', "-"),
        }
    }

    impl FontStore for FontDbStore {
        fn family_count(&self) -> usize {
            self.families.len()
        }

        fn family_names(&self, family: usize) -> Vec<LocalizedName> {
            self.families
                .get(family)
                .map(|f| f.names.clone())
                .unwrap_or_default()
        }

        fn with_normal_face(
            &self,
            family: usize,
            visit: &mut dyn FnMut(&dyn VariableFace),
        ) -> Result<()> {
            let key = &self
                .families
                .get(family)
                .ok_or_else(|| anyhow!("family index {family} out of range"))?
                .key;
            let id = self
                .db
                .query(&Query {
                    families: &[Family::Name(key.as_str())],
                    weight: Weight::NORMAL,
                    stretch: Stretch::Normal,
                    style: Style::Normal,
                })
                .ok_or_else(|| anyhow!("no face matches {key}"))?;

            self.db
                .with_face_data(id, |data, index| {
                    SkrifaFontRef::from_index(data, index)
                        .map(|face| visit(&face))
                        .map_err(|err| anyhow!("face {index} of {key}: {err}"))
                })
                .ok_or_else(|| anyhow!("face data for {key} unavailable"))?
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::axes::AxisDescriptor;
    use anyhow::anyhow;

    pub(crate) struct StaticFace(pub Vec<AxisDescriptor>);

    impl VariableFace for StaticFace {
        fn has_variations(&self) -> bool {
            !self.0.is_empty()
        }
        fn axis_descriptors(&self) -> Result<Vec<AxisDescriptor>> {
            Ok(self.0.clone())
        }
    }

    /// In-memory store: `(names, axes)` per family, `None` axes meaning no face.
    pub(crate) struct FakeStore(pub Vec<(Vec<LocalizedName>, Option<Vec<AxisDescriptor>>)>);

    impl FontStore for FakeStore {
        fn family_count(&self) -> usize {
            self.0.len()
        }

        fn family_names(&self, family: usize) -> Vec<LocalizedName> {
            self.0[family].0.clone()
        }

        fn with_normal_face(
            &self,
            family: usize,
            visit: &mut dyn FnMut(&dyn VariableFace),
        ) -> Result<()> {
            match &self.0[family].1 {
                Some(axes) => {
                    visit(&StaticFace(axes.clone()));
                    Ok(())
                }
                None => Err(anyhow!("no matching face")),
            }
        }
    }

    #[test]
    fn keeps_store_order_and_locale_preference() {
        let store = FakeStore(vec![
            (
                vec![
                    LocalizedName::new("en-us", "Yu Gothic"),
                    LocalizedName::new("ja-jp", "游ゴシック"),
                ],
                Some(Vec::new()),
            ),
            (vec![LocalizedName::new("en-us", "Arial")], Some(Vec::new())),
        ]);

        let entries = SystemFontSource::new(store).enumerate().expect("enumerate");
        let names: Vec<&str> = entries.iter().map(|e| e.display_name()).collect();

        assert_eq!(names, vec!["游ゴシック", "Arial"]);
        assert!(entries.iter().all(|e| e.is_system_font()));
    }

    #[test]
    fn unresolved_face_still_yields_entry() {
        let store = FakeStore(vec![(vec![LocalizedName::new("en-us", "Ghost")], None)]);

        let entries = SystemFontSource::new(store).enumerate().expect("enumerate");

        assert_eq!(entries.len(), 1);
        assert!(entries[0].axis_tags().is_empty());
    }

    #[test]
    fn nameless_families_are_skipped() {
        let store = FakeStore(vec![(Vec::new(), Some(Vec::new()))]);
        let entries = SystemFontSource::new(store).enumerate().expect("enumerate");
        assert!(entries.is_empty());
    }

    #[test]
    fn extracts_axes_from_representative_face() {
        let store = FakeStore(vec![(
            vec![LocalizedName::new("en-us", "Bahnschrift")],
            Some(vec![
                AxisDescriptor {
                    tag: u32::from_be_bytes(*b"wght"),
                    min: 300.0,
                    max: 700.0,
                },
                AxisDescriptor {
                    tag: u32::from_be_bytes(*b"wdth"),
                    min: 75.0,
                    max: 100.0,
                },
            ]),
        )]);

        let entries = SystemFontSource::new(store).enumerate().expect("enumerate");

        assert_eq!(entries[0].axis_tags(), ["wght", "wdth"]);
        assert_eq!(entries[0].axis_ranges()[0].max, 700.0);
    }
}
