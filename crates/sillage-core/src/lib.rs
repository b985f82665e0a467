#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Client-side session and collection synchronization for Sillage.
//!
//! Layout: `store.rs` (durable token storage), `http.rs` (authenticated
//! transport), `session.rs` (sign-in lifecycle), `repository.rs` and
//! `recommendations.rs` (remote operations), `sync/` (debounced search and
//! confirmed collection mutations), `app.rs` (start-up wiring).

mod context;
pub mod app;
pub mod error;
pub mod http;
pub mod recommendations;
pub mod repository;
pub mod session;
pub mod store;
pub mod sync;

pub use app::Sillage;
pub use error::{ClientError, ClientResult, ErrorKind, StoreError, StoreResult};
pub use http::ApiClient;
pub use recommendations::{RecommendationDraft, RecommendationRepository};
pub use repository::{CollectionApi, CollectionRepository};
pub use session::{AuthFailure, Registration, SessionManager, SessionStatus};
pub use store::{Credential, FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};
pub use sync::{
    CollectionSyncController, CollectionView, PerfumeForm, SearchPhase, SyncSettings,
};
