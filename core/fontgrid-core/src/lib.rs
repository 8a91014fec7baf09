//! fontgrid-core: a patient shop window for typefaces
//!
//! Think of a type specimen drawer that rearranges itself while you browse.
//! This library gathers the fonts a machine already knows about, adds the
//! ones sitting in a folder next to the program, and keeps one tidy,
//! deduplicated catalog that can be narrowed down as fast as you can type.
//!
//! ## The Walk Through the Shop
//!
//! **Discovery**: finding who is in the building
//! - Asks the system font store for every family, in its own order
//! - Reads TTF, OTF and TTC files from a single folder, face by face
//! - Prefers Japanese names, settles for English, never invents one
//! - Notes every variable axis and how far it stretches
//!
//! **Browsing**: narrowing the crowd
//! - Filters by source and by a case-insensitive search string
//! - Keeps your selection when it can, politely moves it when it can't
//! - Describes the chosen font in the detail panel
//!
//! **Previewing**: letting a font speak for itself
//! - Draws the sample text through a pluggable graphics backend
//! - Survives lost devices, failed resizes and unreadable files
//! - Refuses to trip over itself when asked to draw mid-draw
//!
//! **Handing off**: sending the choice back to the host editor
//! - Writes the font into the selected timeline objects
//! - Builds host "alias" text from fixed, validated templates
//!
//! ## A Short Visit
//!
//! ```rust,no_run
//! use fontgrid_core::catalog::Catalog;
//! use fontgrid_core::discovery::FolderFontSource;
//! use fontgrid_core::filter::{self, FilterState, TypeFilter};
//!
//! let folder = FolderFontSource::new("Fonts");
//! let catalog = Catalog::from_sources(&[&folder]);
//!
//! let state = FilterState::new()
//!     .with_type(TypeFilter::FolderOnly)
//!     .with_query("noto");
//! let (view, selection) = filter::apply(&catalog, &state, None);
//!
//! println!("{} of {} fonts match", view.len(), catalog.len());
//! if let Some(index) = selection {
//!     println!("selected: {}", catalog[index].display_name());
//! }
//! ```
//!
//! ## Who Lives Where
//!
//! - [`catalog::Catalog`]: the ordered, deduplicated guest list
//! - [`filter::FilterState`]: what you are currently looking for
//! - [`collection::FontCollectionCache`]: parsed font files, kept warm
//! - [`render::PreviewRenderer`]: the careful painter behind the preview
//! - [`browser::FontBrowser`]: the shopkeeper tying it all together
//!
//! ---
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod alias;
pub mod axes;
pub mod browser;
pub mod catalog;
pub mod collection;
pub mod config;
pub mod detail;
pub mod discovery;
pub mod entry;
pub mod filter;
pub mod host;
pub mod names;
pub mod output;
pub mod render;
pub mod system;
pub mod tags;
