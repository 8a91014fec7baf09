//! The font browser controller (made by FontLab https://www.fontlab.com/)
//!
//! [`FontBrowser`] owns the catalog, the current filter and selection, the
//! preview background and the renderer. UI events come in as method calls;
//! the list, detail panel and preview go out through [`BrowserView`] and the
//! renderer, always in that order.

use crate::alias::{TemplateId, DEFAULT_ALIAS_SECONDS};
use crate::catalog::Catalog;
use crate::detail::DetailPanel;
use crate::entry::FontEntry;
use crate::filter::{self, FilterState, FilteredView};
use crate::host::{self, HostEditor};
use crate::render::{GraphicsBackend, PreviewRenderer, PreviewTarget, RenderOutcome, Rgb};

/// The list and detail widgets.
pub trait BrowserView {
    fn show_entries(&mut self, catalog: &Catalog, view: &FilteredView, selected_row: Option<usize>);

    fn show_detail(&mut self, detail: &DetailPanel);
}

pub struct FontBrowser<B: GraphicsBackend> {
    catalog: Catalog,
    filter: FilterState,
    view: FilteredView,
    selection: Option<usize>,
    background: Rgb,
    alias_seconds: f64,
    renderer: PreviewRenderer<B>,
}

impl<B: GraphicsBackend> FontBrowser<B> {
    /// Unfiltered view with the first entry selected.
    pub fn new(catalog: Catalog, renderer: PreviewRenderer<B>) -> Self {
        let filter = FilterState::new();
        let (view, selection) = filter::apply(&catalog, &filter, None);
        Self {
            catalog,
            filter,
            view,
            selection,
            background: Rgb::WHITE,
            alias_seconds: DEFAULT_ALIAS_SECONDS,
            renderer,
        }
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    pub fn with_alias_seconds(mut self, seconds: f64) -> Self {
        self.alias_seconds = seconds;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn selected_entry(&self) -> Option<&FontEntry> {
        self.selection.and_then(|index| self.catalog.get(index))
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn renderer(&self) -> &PreviewRenderer<B> {
        &self.renderer
    }

    pub fn detail(&self) -> DetailPanel {
        DetailPanel::for_selection(self.selected_entry())
    }

    /// Re-run the filter, then refresh list, detail and preview.
    pub fn apply_filter(
        &mut self,
        filter: FilterState,
        view: &mut dyn BrowserView,
        target: &dyn PreviewTarget,
    ) -> RenderOutcome {
        let (filtered, selection) = filter::apply(&self.catalog, &filter, self.selection);
        self.filter = filter;
        self.view = filtered;
        self.selection = selection;

        let row = selection.and_then(|index| self.view.row_of(index));
        view.show_entries(&self.catalog, &self.view, row);
        view.show_detail(&self.detail());
        let outcome = self.render(target, "apply_filter");
        tracing::info!(filtered = self.view.len(), "filter applied");
        outcome
    }

    /// Select list `row`; `activate` (double-click) also pushes the font to the host.
    ///
    /// Returns `false` only when activation was requested and the host update failed.
    pub fn select_row(
        &mut self,
        row: usize,
        activate: bool,
        view: &mut dyn BrowserView,
        target: &dyn PreviewTarget,
        host: Option<&dyn HostEditor>,
    ) -> bool {
        let Some(index) = self.view.catalog_index(row) else {
            tracing::debug!(row, "row outside the filtered list");
            return true;
        };
        if self.selection == Some(index) && !activate {
            tracing::trace!(row, "selection unchanged, skip");
            return true;
        }

        self.selection = Some(index);
        view.show_detail(&self.detail());
        self.render(target, "select_row");
        tracing::info!(row, index, "font selected");

        if !activate {
            return true;
        }
        let applied = self.apply_font_to_host(host);
        if !applied {
            tracing::warn!("applying the font to host objects failed or nothing was selected");
        }
        applied
    }

    pub fn sample_text_changed(&mut self, target: &dyn PreviewTarget) -> RenderOutcome {
        self.render(target, "sample_text_changed")
    }

    pub fn set_background(&mut self, background: Rgb, target: &dyn PreviewTarget) -> RenderOutcome {
        self.background = background;
        self.render(target, "background_changed")
    }

    pub fn resized(&mut self, target: &dyn PreviewTarget) -> RenderOutcome {
        self.render(target, "resized")
    }

    pub fn repaint(&mut self, target: &dyn PreviewTarget) -> RenderOutcome {
        self.render(target, "repaint")
    }

    /// Create a host object for the selection from `template`.
    pub fn create_object(&self, template: TemplateId, host: Option<&dyn HostEditor>) -> bool {
        let Some(entry) = self.selected_entry() else {
            tracing::warn!("no font selected");
            return false;
        };
        let Some(host) = host else {
            tracing::error!("host edit handle unavailable");
            return false;
        };
        let sample = self.renderer.sample_text();
        host::create_object_from_alias(host, template, entry, &sample, self.alias_seconds)
    }

    /// Write the selection into the host's selected or focused objects.
    pub fn apply_font_to_host(&self, host: Option<&dyn HostEditor>) -> bool {
        let Some(entry) = self.selected_entry() else {
            return false;
        };
        let Some(host) = host else {
            tracing::error!("host edit handle unavailable");
            return false;
        };
        host::apply_font_to_objects(host, entry)
    }

    fn render(&self, target: &dyn PreviewTarget, reason: &str) -> RenderOutcome {
        let entry = self.selection.and_then(|index| self.catalog.get(index));
        self.renderer.render(target, entry, self.background, reason)
    }
}
