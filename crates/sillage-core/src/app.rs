//! Start-up wiring.
//!
//! # Design
//! - Build every component once from [`ClientConfig`] and hand out shared handles.
//! - Logout tears down the collection view together with the session.

use std::sync::Arc;

use sillage_config::ClientConfig;
use tracing::info;

use crate::context::SessionContext;
use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::recommendations::RecommendationRepository;
use crate::repository::CollectionRepository;
use crate::session::{SessionManager, SessionStatus};
use crate::store::{FileTokenStore, TokenStore};
use crate::sync::{CollectionSyncController, SyncSettings};

/// Fully wired client.
#[derive(Clone)]
pub struct Sillage {
    session: SessionManager,
    collection: CollectionRepository,
    recommendations: RecommendationRepository,
    sync: CollectionSyncController,
}

impl Sillage {
    /// Wire a client persisting its session under the configured state directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let store = Arc::new(FileTokenStore::new(config.session_path()));
        Self::with_store(config, store)
    }

    /// Wire a client over an arbitrary token store.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn with_store(config: &ClientConfig, store: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let context = Arc::new(SessionContext::new(store));
        let api = ApiClient::new(config, Arc::clone(&context))?;
        let collection = CollectionRepository::new(api.clone());
        let sync = CollectionSyncController::new(
            Arc::new(collection.clone()),
            SyncSettings::from_config(config),
        );
        info!(api_url = %config.api_url, "client wired");
        Ok(Self {
            session: SessionManager::new(api.clone(), context),
            collection,
            recommendations: RecommendationRepository::new(api),
            sync,
        })
    }

    /// Read the persisted session and publish the initial status.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the persisted session is unreadable.
    pub async fn start(&self) -> ClientResult<SessionStatus> {
        self.session.restore().await
    }

    /// Session manager.
    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Direct collection repository.
    #[must_use]
    pub const fn collection(&self) -> &CollectionRepository {
        &self.collection
    }

    /// Recommendation repository.
    #[must_use]
    pub const fn recommendations(&self) -> &RecommendationRepository {
        &self.recommendations
    }

    /// Collection screen controller.
    #[must_use]
    pub const fn sync(&self) -> &CollectionSyncController {
        &self.sync
    }

    /// Sign out and discard the collection view.
    pub async fn logout(&self) {
        self.session.logout().await;
        self.sync.reset();
    }
}
