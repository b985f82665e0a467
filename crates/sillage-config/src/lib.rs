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

//! Client configuration for the Sillage session and collection layer.
//!
//! Layout: `model.rs` (typed configuration), `loader.rs` (environment
//! loading through an injectable lookup), `validate.rs` (parsing and range
//! checks), `defaults.rs` (fallback values).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_PREFIX, EnvKey};
pub use model::{ClientConfig, ConfigOverrides};
