//! Lenient timestamp (de)serialisation.
//!
//! The API emits naive UTC timestamps (`2025-03-01T10:00:00.123456`) but a
//! proxy or a future server version may add an offset. Both are accepted and
//! normalised to UTC; output is always RFC 3339.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp with or without a UTC offset.
///
/// # Errors
///
/// Returns a description of the rejected input when no supported format matches.
pub fn parse(value: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("unsupported timestamp '{trimmed}'"))
}

/// Serialise a timestamp as RFC 3339.
///
/// # Errors
///
/// Propagates serializer failures.
pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339())
}

/// Deserialise a timestamp with or without offset.
///
/// # Errors
///
/// Fails when the input is not a string in a supported format.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(D::Error::custom)
}

/// Same as the parent module for optional (nullable) timestamps.
pub mod option {
    use super::{DateTime, Deserialize, Deserializer, Serializer, Utc, parse};
    use serde::de::Error as _;

    /// Serialise an optional timestamp; `None` becomes `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_some(&value.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialise an optional timestamp; `null` becomes `None`.
    ///
    /// # Errors
    ///
    /// Fails when a present value is not in a supported format.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse(&raw).map_err(D::Error::custom))
            .transpose()
    }
}
