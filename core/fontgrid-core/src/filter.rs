//! Catalog filtering and selection reconciliation (made by FontLab https://www.fontlab.com/)

use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::entry::FontEntry;

/// Which source an entry must come from to be listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    #[default]
    All,
    SystemOnly,
    FolderOnly,
}

impl TypeFilter {
    /// Map a type-combo position (0 all, 1 system, 2 folder); unknown positions mean all.
    pub fn from_combo_index(index: i32) -> Self {
        match index {
            1 => TypeFilter::SystemOnly,
            2 => TypeFilter::FolderOnly,
            _ => TypeFilter::All,
        }
    }

    fn admits(self, entry: &FontEntry) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::SystemOnly => entry.is_system_font(),
            TypeFilter::FolderOnly => !entry.is_system_font(),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "system" => Ok(TypeFilter::SystemOnly),
            "folder" | "external" => Ok(TypeFilter::FolderOnly),
            other => Err(anyhow!("unknown font type filter: {other}")),
        }
    }
}

/// Everything the list is filtered by; rebuilt on each UI change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    type_filter: TypeFilter,
    search_query: String,
    query_lower: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, type_filter: TypeFilter) -> Self {
        self.type_filter = type_filter;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self.query_lower = self.search_query.to_lowercase();
        self
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Type matches and the query is a case-insensitive substring of the display name.
    pub fn matches(&self, entry: &FontEntry) -> bool {
        if !self.type_filter.admits(entry) {
            return false;
        }
        if self.query_lower.is_empty() {
            return true;
        }
        entry.display_name().to_lowercase().contains(&self.query_lower)
    }
}

/// Catalog indices that passed the filter, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    indices: Vec<usize>,
}

impl FilteredView {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        // indices are strictly increasing
        self.indices.binary_search(&index).is_ok()
    }

    pub fn first(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    /// Catalog index shown at list row `row`.
    pub fn catalog_index(&self, row: usize) -> Option<usize> {
        self.indices.get(row).copied()
    }

    /// List row showing catalog index `index`.
    pub fn row_of(&self, index: usize) -> Option<usize> {
        self.indices.binary_search(&index).ok()
    }
}

/// Keep `previous` if it is still visible, else fall back to the first visible entry.
pub fn reconcile(view: &FilteredView, previous: Option<usize>) -> Option<usize> {
    match previous {
        Some(index) if view.contains(index) => Some(index),
        _ => view.first(),
    }
}

/// Recompute the view from scratch and reconcile the selection against it.
pub fn apply(
    catalog: &Catalog,
    state: &FilterState,
    previous: Option<usize>,
) -> (FilteredView, Option<usize>) {
    let indices = catalog
        .iter()
        .enumerate()
        .filter(|(_, entry)| state.matches(entry))
        .map(|(index, _)| index)
        .collect();
    let view = FilteredView { indices };
    let selection = reconcile(&view, previous);

    tracing::trace!(
        query = state.search_query(),
        filter = ?state.type_filter(),
        filtered = view.len(),
        selection = ?selection,
        "filter applied"
    );
    (view, selection)
}
