//! Subscriber installation and build metadata.
//!
//! Everything is written to stderr; stdout belongs to command output.

use std::io;

use once_cell::sync::OnceCell;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level` when set.
///
/// # Errors
///
/// Returns [`TelemetryError::SubscriberInstall`] when a global subscriber is
/// already in place.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    BUILD_SHA.get_or_init(|| config.build_sha.to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level));
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().compact().with_target(false).with_writer(io::stderr))
            .try_init(),
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { source })?;
    debug!(build_sha = config.build_sha, format = ?config.format, "logging initialised");
    Ok(())
}

/// Build identifier recorded by the first [`init_logging`] call, `"dev"` before it.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

/// Inputs for [`init_logging`].
#[derive(Debug, Clone, Copy)]
pub struct LoggingConfig<'a> {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `info`, `sillage_core=debug`).
    pub level: &'a str,
    /// Output format.
    pub format: LogFormat,
    /// Build identifier.
    pub build_sha: &'a str,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Compact human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty in debug builds, JSON in release builds.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Resolve an optional configured name, inferring when absent.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::UnknownFormat`] for names other than `json` or `pretty`.
    pub fn from_setting(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::infer()),
            Some(name) if name.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(name) if name.eq_ignore_ascii_case("pretty") => Ok(Self::Pretty),
            Some(other) => Err(TelemetryError::UnknownFormat {
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(LogFormat::from_setting(Some("json")).ok(), Some(LogFormat::Json));
        assert_eq!(
            LogFormat::from_setting(Some(" Pretty ")).ok(),
            Some(LogFormat::Pretty)
        );
        assert_eq!(LogFormat::from_setting(None).ok(), Some(LogFormat::infer()));
        assert_eq!(LogFormat::from_setting(Some("")).ok(), Some(LogFormat::infer()));
        assert!(matches!(
            LogFormat::from_setting(Some("xml")),
            Err(TelemetryError::UnknownFormat { .. })
        ));
    }
}
