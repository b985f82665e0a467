//! Collection view state.
//!
//! # Design
//! - One value describes everything the collection screen renders.
//! - Search results and the collection are independent sets.

use sillage_api_models::{CollectionEntry, Perfume};

use crate::sync::form::PerfumeForm;

/// Progress of the search sub-flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchPhase {
    /// No query.
    #[default]
    Idle,
    /// Waiting for the quiet period to elapse.
    Debouncing,
    /// Request in flight.
    Searching,
    /// Latest query returned matches.
    Results,
    /// Latest query returned nothing.
    Empty,
}

impl SearchPhase {
    /// Whether a search is still expected to resolve.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Debouncing | Self::Searching)
    }

    /// Phase matching a resolved result set.
    #[must_use]
    pub const fn for_results(results: &[Perfume]) -> Self {
        if results.is_empty() {
            Self::Empty
        } else {
            Self::Results
        }
    }
}

/// Everything the collection screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionView {
    /// Mirror of the server-side collection.
    pub collection: Vec<CollectionEntry>,
    /// A reload is in flight.
    pub collection_loading: bool,
    /// Raw query text as typed.
    pub query: String,
    /// Search progress.
    pub search_phase: SearchPhase,
    /// Results of the latest applied query.
    pub search_results: Vec<Perfume>,
    /// Perfume awaiting removal confirmation.
    pub pending_deletion: Option<i64>,
    /// Creation form contents.
    pub form: PerfumeForm,
    /// A creation request is in flight.
    pub creating: bool,
    /// Message of the last failed operation.
    pub error: Option<String>,
}

impl CollectionView {
    /// Whether `perfume_id` is in the mirrored collection.
    #[must_use]
    pub fn contains(&self, perfume_id: i64) -> bool {
        self.collection
            .iter()
            .any(|entry| entry.perfume.id == perfume_id)
    }

    /// Collection entry awaiting removal confirmation.
    #[must_use]
    pub fn pending_entry(&self) -> Option<&CollectionEntry> {
        let id = self.pending_deletion?;
        self.collection.iter().find(|entry| entry.perfume.id == id)
    }
}
