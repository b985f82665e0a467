//! Typed client configuration.
//!
//! # Design
//! - Pure data carrier; loading lives in `loader.rs`, checks in `validate.rs`.
//! - Every field is already validated, so consumers never re-check ranges.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigResult;
use crate::loader::EnvKey;
use crate::validate;

/// Session file name inside the state directory.
const SESSION_FILE: &str = "session.json";

/// Effective client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote API, always ending with `/`.
    pub api_url: Url,
    /// Per-request timeout.
    pub http_timeout: Duration,
    /// Quiet period before an interactive search is sent.
    pub search_debounce: Duration,
    /// Page size for interactive search.
    pub search_limit: u32,
    /// Directory holding the persisted session.
    pub state_dir: PathBuf,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Explicit log format (`json` or `pretty`); inferred when `None`.
    pub log_format: Option<String>,
}

impl ClientConfig {
    /// Configuration built purely from defaults.
    ///
    /// # Errors
    ///
    /// Only fails if the compiled-in defaults are themselves invalid.
    pub fn defaults() -> ConfigResult<Self> {
        Self::from_lookup(|_| None)
    }

    /// Location of the persisted session file.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }

    /// Apply command-line overrides on top of the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error when an override is out of range.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> ConfigResult<Self> {
        if let Some(api_url) = overrides.api_url {
            self.api_url = validate::parse_base_url(EnvKey::ApiUrl.flag(), &api_url)?;
        }
        if let Some(secs) = overrides.http_timeout_secs {
            self.http_timeout = validate::http_timeout(EnvKey::HttpTimeoutSecs.flag(), secs)?;
        }
        if let Some(dir) = overrides.state_dir {
            self.state_dir = dir;
        }
        Ok(self)
    }
}

/// Values supplied on the command line that take precedence over the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// API base URL.
    pub api_url: Option<String>,
    /// Request timeout in seconds.
    pub http_timeout_secs: Option<u64>,
    /// State directory.
    pub state_dir: Option<PathBuf>,
}
