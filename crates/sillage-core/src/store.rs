//! Durable storage for the signed-in session.
//!
//! # Design
//! - Fixed storage keys so the file stays readable across releases.
//! - Writes land in a sibling temp file renamed over the target.
//! - No freshness checks; the server decides whether a token is still valid.

use std::fmt;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sillage_api_models::UserProfile;
use tokio::fs;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

const KEY_ACCESS_TOKEN: &str = "sillage.access_token";
const KEY_TOKEN_TYPE: &str = "sillage.token_type";
const KEY_USER: &str = "sillage.user";

/// Bearer credential issued by the server.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    token_type: String,
}

impl Credential {
    /// Wrap a token returned by login or registration.
    #[must_use]
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
        }
    }

    /// Token scheme as reported by the server.
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub(crate) fn access_token(&self) -> &str {
        &self.access_token
    }

    pub(crate) fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Credential plus the cached profile of its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    /// Active credential.
    pub credential: Credential,
    /// Profile cached at sign-in, if one was stored.
    pub profile: Option<UserProfile>,
}

/// Persistence for the active session.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Replace whatever was stored with `session`.
    async fn save(&self, session: &StoredSession) -> StoreResult<()>;
    /// Read the stored session, `None` when nothing is stored.
    async fn load(&self) -> StoreResult<Option<StoredSession>>;
    /// Forget the stored session. Clearing an empty store succeeds.
    async fn clear(&self) -> StoreResult<()>;
}

#[derive(Serialize, Deserialize)]
struct SessionDocument {
    #[serde(rename = "sillage.access_token", default)]
    access_token: Option<String>,
    #[serde(rename = "sillage.token_type", default)]
    token_type: Option<String>,
    #[serde(rename = "sillage.user", default)]
    user: Option<UserProfile>,
}

/// Session persisted as a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store backed by `path`; parent directories are created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, operation: &'static str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            operation,
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn save(&self, session: &StoredSession) -> StoreResult<()> {
        let document = SessionDocument {
            access_token: Some(session.credential.access_token.clone()),
            token_type: Some(session.credential.token_type.clone()),
            user: session.profile.clone(),
        };
        let encoded =
            serde_json::to_vec_pretty(&document).map_err(|source| StoreError::Encode { source })?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error("create_dir", source))?;
        }
        let temp = self.temp_path();
        fs::write(&temp, encoded)
            .await
            .map_err(|source| self.io_error("write", source))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|source| self.io_error("rename", source))?;
        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    async fn load(&self) -> StoreResult<Option<StoredSession>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error("read", source)),
        };
        let document: SessionDocument =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        let Some(access_token) = document.access_token.filter(|token| !token.is_empty()) else {
            return Ok(None);
        };
        let token_type = document
            .token_type
            .unwrap_or_else(|| "bearer".to_string());
        Ok(Some(StoredSession {
            credential: Credential::new(access_token, token_type),
            profile: document.user,
        }))
    }

    async fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error("remove", source)),
        }
    }
}

/// Non-durable store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a session.
    #[must_use]
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, session: &StoredSession) -> StoreResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> StoreResult<Option<StoredSession>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
