//! Environment-backed configuration loading.
//!
//! # Design
//! - Read through an injectable lookup so tests never touch process state.
//! - Empty values count as unset; everything else is validated eagerly.

use std::path::PathBuf;

use tracing::debug;

use crate::defaults;
use crate::error::ConfigResult;
use crate::model::ClientConfig;
use crate::validate;

/// Prefix shared by every recognised environment variable.
pub const ENV_PREFIX: &str = "SILLAGE_";

/// Settings recognised by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKey {
    /// Base URL of the remote API.
    ApiUrl,
    /// Per-request timeout in seconds.
    HttpTimeoutSecs,
    /// Search debounce window in milliseconds.
    SearchDebounceMs,
    /// Interactive search page size.
    SearchLimit,
    /// Directory holding the persisted session.
    StateDir,
    /// Log level fallback.
    LogLevel,
    /// Log format (`json` or `pretty`).
    LogFormat,
}

impl EnvKey {
    /// Every key, in documentation order.
    pub const ALL: [Self; 7] = [
        Self::ApiUrl,
        Self::HttpTimeoutSecs,
        Self::SearchDebounceMs,
        Self::SearchLimit,
        Self::StateDir,
        Self::LogLevel,
        Self::LogFormat,
    ];

    /// Environment variable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ApiUrl => "SILLAGE_API_URL",
            Self::HttpTimeoutSecs => "SILLAGE_HTTP_TIMEOUT_SECS",
            Self::SearchDebounceMs => "SILLAGE_SEARCH_DEBOUNCE_MS",
            Self::SearchLimit => "SILLAGE_SEARCH_LIMIT",
            Self::StateDir => "SILLAGE_STATE_DIR",
            Self::LogLevel => "SILLAGE_LOG_LEVEL",
            Self::LogFormat => "SILLAGE_LOG_FORMAT",
        }
    }

    /// Name used when the value came from a command-line flag.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::ApiUrl => "--api-url",
            Self::HttpTimeoutSecs => "--timeout",
            Self::SearchDebounceMs => "search debounce",
            Self::SearchLimit => "search limit",
            Self::StateDir => "--state-dir",
            Self::LogLevel => "log level",
            Self::LogFormat => "log format",
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting encountered.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting encountered.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: EnvKey| {
            lookup(key.name())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_url = match read(EnvKey::ApiUrl) {
            Some(value) => validate::parse_base_url(EnvKey::ApiUrl.name(), &value)?,
            None => validate::parse_base_url(EnvKey::ApiUrl.name(), defaults::API_URL)?,
        };

        let timeout_secs = read(EnvKey::HttpTimeoutSecs)
            .map(|value| validate::parse_u64(EnvKey::HttpTimeoutSecs.name(), &value))
            .transpose()?
            .unwrap_or(defaults::HTTP_TIMEOUT_SECS);
        let http_timeout = validate::http_timeout(EnvKey::HttpTimeoutSecs.name(), timeout_secs)?;

        let debounce_ms = read(EnvKey::SearchDebounceMs)
            .map(|value| validate::parse_u64(EnvKey::SearchDebounceMs.name(), &value))
            .transpose()?
            .unwrap_or(defaults::SEARCH_DEBOUNCE_MS);
        let search_debounce =
            validate::search_debounce(EnvKey::SearchDebounceMs.name(), debounce_ms)?;

        let search_limit = match read(EnvKey::SearchLimit) {
            Some(value) => {
                let raw = validate::parse_u64(EnvKey::SearchLimit.name(), &value)?;
                validate::search_limit(EnvKey::SearchLimit.name(), raw)?
            }
            None => defaults::SEARCH_LIMIT,
        };

        let state_dir = read(EnvKey::StateDir)
            .map_or_else(|| PathBuf::from(defaults::STATE_DIR), PathBuf::from);
        let log_level = read(EnvKey::LogLevel).unwrap_or_else(|| defaults::LOG_LEVEL.to_string());
        let log_format = read(EnvKey::LogFormat)
            .map(|value| validate::log_format(EnvKey::LogFormat.name(), &value))
            .transpose()?;

        let config = Self {
            api_url,
            http_timeout,
            search_debounce,
            search_limit,
            state_dir,
            log_level,
            log_format,
        };
        debug!(
            api_url = %config.api_url,
            timeout_secs = config.http_timeout.as_secs(),
            search_limit = config.search_limit,
            "client configuration loaded"
        );
        Ok(config)
    }
}
