//! Validation helpers and parsing utilities for configuration values.

use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Accepted request timeout window, in seconds.
pub const TIMEOUT_RANGE_SECS: (u64, u64) = (1, 300);
/// Upper bound for the search debounce window, in milliseconds.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;
/// Accepted search page sizes (the server rejects more than 100).
pub const SEARCH_LIMIT_RANGE: (u32, u32) = (1, 100);

/// Parse an API base URL, requiring an http(s) scheme.
///
/// A trailing slash is appended so endpoint paths resolve under any path
/// prefix (`/api/v1`) instead of replacing it.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] for unparsable or non-http(s) URLs.
pub fn parse_base_url(key: &str, value: &str) -> ConfigResult<Url> {
    let trimmed = value.trim();
    let mut url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidUrl {
        key: key.to_string(),
        value: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            key: key.to_string(),
            value: trimmed.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse an unsigned integer setting.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidNumber`] when the value is not a number.
pub fn parse_u64(key: &str, value: &str) -> ConfigResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: value.trim().to_string(),
        })
}

/// Validate the HTTP timeout window.
///
/// # Errors
///
/// Returns [`ConfigError::OutOfRange`] outside [`TIMEOUT_RANGE_SECS`].
pub fn http_timeout(key: &str, secs: u64) -> ConfigResult<Duration> {
    let (min, max) = TIMEOUT_RANGE_SECS;
    if !(min..=max).contains(&secs) {
        return Err(ConfigError::OutOfRange {
            key: key.to_string(),
            value: secs.to_string(),
            expected: "1-300 seconds",
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Validate the search debounce window.
///
/// # Errors
///
/// Returns [`ConfigError::OutOfRange`] above [`MAX_DEBOUNCE_MS`].
pub fn search_debounce(key: &str, millis: u64) -> ConfigResult<Duration> {
    if millis > MAX_DEBOUNCE_MS {
        return Err(ConfigError::OutOfRange {
            key: key.to_string(),
            value: millis.to_string(),
            expected: "0-10000 milliseconds",
        });
    }
    Ok(Duration::from_millis(millis))
}

/// Validate the search page size.
///
/// # Errors
///
/// Returns [`ConfigError::OutOfRange`] outside [`SEARCH_LIMIT_RANGE`].
pub fn search_limit(key: &str, limit: u64) -> ConfigResult<u32> {
    let (min, max) = SEARCH_LIMIT_RANGE;
    u32::try_from(limit)
        .ok()
        .filter(|value| (min..=max).contains(value))
        .ok_or_else(|| ConfigError::OutOfRange {
            key: key.to_string(),
            value: limit.to_string(),
            expected: "1-100",
        })
}

/// Validate a log format name.
///
/// # Errors
///
/// Returns [`ConfigError::Unsupported`] for anything but `json` or `pretty`.
pub fn log_format(key: &str, value: &str) -> ConfigResult<String> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "json" | "pretty" => Ok(normalized),
        _ => Err(ConfigError::Unsupported {
            key: key.to_string(),
            value: value.trim().to_string(),
            expected: "json or pretty",
        }),
    }
}
