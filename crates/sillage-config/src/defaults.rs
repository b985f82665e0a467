//! Default values applied when the environment does not provide a setting.
//!
//! # Design
//! - Keep every fallback in one place so the CLI help and the loader agree.

/// Base URL of the remote API, including the version prefix.
pub const API_URL: &str = "http://localhost:8000/api/v1";
/// Per-request timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// Quiet period before a search keystroke triggers a remote call.
pub const SEARCH_DEBOUNCE_MS: u64 = 500;
/// Page size requested by interactive search.
pub const SEARCH_LIMIT: u32 = 20;
/// Directory holding the persisted session.
pub const STATE_DIR: &str = ".sillage";
/// Log level used when `RUST_LOG` is unset.
pub const LOG_LEVEL: &str = "info";
