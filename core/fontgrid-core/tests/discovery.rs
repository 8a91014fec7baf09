/// Real fonts, real files
///
/// These tests walk the fixture fonts shipped in `tests/fonts` and push
/// them through naming, axis extraction, the collection cache and the
/// raster preview. Point `FONTGRID_TEST_FONTS` elsewhere to try another set.
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use fontgrid_core::catalog::Catalog;
use fontgrid_core::collection::FontCollectionCache;
use fontgrid_core::detail::{axis_summary, MAX_AXIS_LINES};
use fontgrid_core::discovery::{FolderFontSource, FontSource};
use fontgrid_core::render::{PreviewTarget, SurfaceSize};
use tempfile::tempdir;

const STATIC_FONT: &str = "Tuffy.ttf";
const VARIABLE_FONT: &str = "colr_1_variable.ttf";

fn fonts_dir() -> PathBuf {
    if let Ok(env_override) = env::var("FONTGRID_TEST_FONTS") {
        return PathBuf::from(env_override)
            .canonicalize()
            .expect("FONTGRID_TEST_FONTS must point at a folder");
    }

    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fonts")
        .canonicalize()
        .expect("fixture fonts ship in tests/fonts")
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fonts")
        .join(name)
}

fn names(entries: &[fontgrid_core::entry::FontEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.display_name()).collect()
}

/// Two-face collection: the first face is `font`, the second points past the end of the file.
fn collection_with_broken_second_face(font: &[u8]) -> Vec<u8> {
    const HEADER: usize = 20;
    let mut out = Vec::with_capacity(HEADER + font.len());
    out.extend_from_slice(b"ttcf");
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    out.extend_from_slice(&2u32.to_be_bytes());
    out.extend_from_slice(&(HEADER as u32).to_be_bytes());
    out.extend_from_slice(&((HEADER + font.len() + 64) as u32).to_be_bytes());

    let mut face = font.to_vec();
    let tables = u16::from_be_bytes([face[4], face[5]]) as usize;
    for i in 0..tables {
        let at = 12 + 16 * i + 8;
        let offset = u32::from_be_bytes([face[at], face[at + 1], face[at + 2], face[at + 3]]);
        face[at..at + 4].copy_from_slice(&(offset + HEADER as u32).to_be_bytes());
    }
    out.extend_from_slice(&face);
    out
}

#[test]
fn folder_entries_carry_file_suffix_and_path() {
    let fonts = fonts_dir();

    let entries = FolderFontSource::new(&fonts).enumerate().expect("enumerate");
    assert!(!entries.is_empty(), "fixture folder has no readable fonts");

    for entry in &entries {
        assert!(!entry.is_system_font());
        assert!(entry.file_path().is_absolute());
        assert!(entry.file_path().starts_with(&fonts));
        let file_name = entry
            .file_path()
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .expect("file name");
        assert!(entry.display_name().ends_with(&format!(" [{file_name}]")));
        assert_eq!(entry.axis_tags().len(), entry.axis_ranges().len());
        for range in entry.axis_ranges() {
            assert!(range.min <= range.max, "{} has inverted range", range.tag);
        }
    }
}

#[test]
fn shipped_fixtures_resolve_names_and_axes() {
    let tmp = tempdir().expect("tempdir");
    for name in [STATIC_FONT, VARIABLE_FONT] {
        fs::copy(fixture(name), tmp.path().join(name)).expect("copy fixture");
    }

    let entries = FolderFontSource::new(tmp.path()).enumerate().expect("enumerate");
    assert_eq!(
        names(&entries),
        vec![
            "Tuffy [Tuffy.ttf]",
            "COLRv1 Variable Test Glyphs [colr_1_variable.ttf]"
        ]
    );

    let tuffy = &entries[0];
    assert_eq!(tuffy.family_name(), "Tuffy");
    assert!(tuffy.axis_tags().is_empty());

    let variable = &entries[1];
    assert_eq!(variable.axis_tags().len(), 44);
    assert_eq!(&variable.axis_tags()[..2], ["SWPS", "SWPE"]);
    assert_eq!(variable.axis_ranges()[0].min, -90.0);
    assert_eq!(variable.axis_ranges()[0].max, 90.0);

    let summary = axis_summary(variable);
    assert_eq!(summary.lines().count(), MAX_AXIS_LINES);
    assert!(summary.starts_with("SWPS SWPS -90.0-90.0\n"));
    assert!(summary.ends_with("..."));
}

#[cfg(unix)]
#[test]
fn symlinked_font_files_are_discovered() {
    use std::os::unix::fs::symlink;

    let tmp = tempdir().expect("tempdir");
    symlink(fixture(STATIC_FONT), tmp.path().join("Linked.ttf")).expect("symlink");
    fs::copy(fixture(VARIABLE_FONT), tmp.path().join("Copied.ttf")).expect("copy");
    symlink(tmp.path().join("missing.ttf"), tmp.path().join("Broken.ttf")).expect("symlink");

    let entries = FolderFontSource::new(tmp.path()).enumerate().expect("enumerate");

    assert_eq!(
        names(&entries),
        vec![
            "COLRv1 Variable Test Glyphs [Copied.ttf]",
            "Tuffy [Linked.ttf]"
        ]
    );
}

#[test]
fn damaged_face_is_skipped_by_discovery_and_cache_alike() {
    let tmp = tempdir().expect("tempdir");
    let font = fs::read(fixture(STATIC_FONT)).expect("read fixture");
    let path = tmp.path().join("Pair.ttc");
    fs::write(&path, collection_with_broken_second_face(&font)).expect("write ttc");

    let entries = FolderFontSource::new(tmp.path()).enumerate().expect("enumerate");
    assert_eq!(names(&entries), vec!["Tuffy [Pair.ttc]"]);

    let mut cache = FontCollectionCache::new();
    let collection = cache.get_or_create(&path).expect("collection");
    assert_eq!(collection.faces().len(), 1);
    assert_eq!(
        collection.find_family(entries[0].family_name()).map(|f| f.index),
        Some(0)
    );
}

#[test]
fn every_entry_resolves_inside_its_collection() {
    let fonts = fonts_dir();

    let catalog = Catalog::from_sources(&[&FolderFontSource::new(&fonts)]);
    assert!(!catalog.is_empty());
    let mut cache = FontCollectionCache::new();

    for entry in catalog.iter() {
        let collection = cache.get_or_create(entry.file_path()).expect("collection");
        assert!(
            collection.find_family(entry.family_name()).is_some(),
            "{} not found in {}",
            entry.family_name(),
            entry.file_path().display()
        );
        let again = cache.get_or_create(entry.file_path()).expect("cached");
        assert!(Arc::ptr_eq(&collection, &again));
    }
}

#[allow(dead_code)]
struct Fixed;

impl PreviewTarget for Fixed {
    fn sample_text(&self) -> Option<String> {
        Some("AaBb".to_string())
    }

    fn client_size(&self) -> SurfaceSize {
        SurfaceSize::new(240, 120)
    }
}

#[allow(dead_code)]
fn folder_of(name: &str) -> (tempfile::TempDir, PathBuf) {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join(name);
    fs::copy(fixture(name), &path).expect("copy fixture");
    (tmp, path)
}

#[cfg(feature = "raster")]
#[test]
fn raster_preview_paints_glyphs() {
    use fontgrid_core::render::raster::RasterBackend;
    use fontgrid_core::render::{PreviewRenderer, PreviewSettings, RenderOutcome, Rgb};

    let (tmp, _) = folder_of(STATIC_FONT);
    let catalog = Catalog::from_sources(&[&FolderFontSource::new(tmp.path())]);
    let entry = catalog.iter().next().expect("fixture entry");

    let backend = RasterBackend::new(Arc::new(fontdb::Database::new()));
    let renderer = PreviewRenderer::new(backend, PreviewSettings::default());

    let outcome = renderer.render(&Fixed, Some(entry), Rgb::WHITE, "fixture");
    assert_eq!(outcome, RenderOutcome::Presented { text_drawn: true });

    let inked = renderer
        .with_backend(|backend| {
            let frame = backend.last_presented().expect("frame");
            frame.pixels().iter().any(|p| p.red() < 128)
        })
        .expect("backend");
    assert!(inked, "sample text left no ink on the frame");

    let png = tmp.path().join("preview.png");
    renderer
        .with_backend(|backend| backend.save_png(&png))
        .expect("backend")
        .expect("save png");
    assert!(png.exists());
}
