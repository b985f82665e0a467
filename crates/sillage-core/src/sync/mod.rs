//! Interactive search and collection mutations.
//!
//! # Design
//! - `state.rs` holds the published view, `form.rs` the creation form.
//! - `controller.rs` owns the debounce timer and the sequence token.
//! - The collection is only ever replaced by a full reload from the server.

pub mod controller;
pub mod form;
pub mod state;

pub use controller::{CollectionSyncController, SyncSettings};
pub use form::PerfumeForm;
pub use state::{CollectionView, SearchPhase};
