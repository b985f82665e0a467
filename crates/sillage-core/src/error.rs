//! Error types for the session and collection layer.
//!
//! # Design
//! - Constant display strings; context lives in fields.
//! - Every variant can produce a short message fit for end users.
//! - Remote details are kept verbatim and only replaced when absent.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for remote and session operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result alias for token store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised while persisting or reading the session.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("session storage io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The persisted session could not be decoded.
    #[error("persisted session is corrupt")]
    Corrupt {
        /// Session file that failed to decode.
        path: PathBuf,
        /// Underlying decode error.
        source: serde_json::Error,
    },
    /// The session could not be encoded for persistence.
    #[error("failed to encode session")]
    Encode {
        /// Underlying encode error.
        source: serde_json::Error,
    },
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected locally before any network round-trip.
    Validation,
    /// The server rejected or no longer accepts the credential.
    Auth,
    /// The resource already exists.
    Conflict,
    /// The server could not be reached in time.
    Network,
    /// Any other non-success response.
    Server,
    /// Local persistence failed.
    Storage,
}

/// Failures surfaced by the HTTP client, the session manager and the repositories.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected locally.
    #[error("validation failed")]
    Validation {
        /// What the user needs to fix.
        message: String,
    },
    /// Authentication missing, expired or rejected.
    #[error("authentication rejected")]
    Auth {
        /// Server detail, when provided.
        detail: Option<String>,
    },
    /// The target already exists (duplicate add).
    #[error("conflicting request")]
    Conflict {
        /// Server detail, when provided.
        detail: Option<String>,
    },
    /// Timeout or connection failure.
    #[error("network failure")]
    Network {
        /// Description of the transport failure.
        message: String,
    },
    /// Non-success response or undecodable body.
    #[error("server error")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server detail, when provided.
        detail: Option<String>,
    },
    /// Local persistence of the session failed.
    #[error("session storage failure")]
    Storage(#[from] StoreError),
}

impl ClientError {
    /// Build a validation failure.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build a network failure.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Network { .. } => ErrorKind::Network,
            Self::Server { .. } => ErrorKind::Server,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Detail string sent by the server, if any.
    #[must_use]
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            Self::Auth { detail } | Self::Conflict { detail } | Self::Server { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }

    /// Short human-readable message for display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } | Self::Network { message } => message.clone(),
            Self::Auth { detail } => detail
                .clone()
                .unwrap_or_else(|| "session expired, please sign in again".to_string()),
            Self::Conflict { detail } => detail
                .clone()
                .unwrap_or_else(|| "already exists".to_string()),
            Self::Server { status, detail } => detail
                .clone()
                .unwrap_or_else(|| format!("request failed with status {status}")),
            Self::Storage(_) => "could not save the session on this device".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_detail() {
        let conflict = ClientError::Conflict {
            detail: Some("El perfume ya está en tu colección".into()),
        };
        assert_eq!(conflict.user_message(), "El perfume ya está en tu colección");
        assert_eq!(conflict.kind(), ErrorKind::Conflict);

        let server = ClientError::Server {
            status: 503,
            detail: None,
        };
        assert_eq!(server.user_message(), "request failed with status 503");
        assert!(server.server_detail().is_none());
    }

    #[test]
    fn storage_errors_wrap_store_failures() {
        let err: ClientError = StoreError::Io {
            operation: "write",
            path: PathBuf::from("/tmp/session.json"),
            source: io::Error::other("disk full"),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.to_string(), "session storage failure");
        assert!(std::error::Error::source(&err).is_some());
    }
}
