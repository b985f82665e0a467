//! Remote collection operations.
//!
//! # Design
//! - One remote call per operation, no retries, no caching.
//! - `CollectionApi` is the seam the sync controller depends on.

use async_trait::async_trait;
use sillage_api_models::{Acknowledgement, CollectionEntry, Perfume, PerfumeCreate, SearchQuery};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;

/// Collection operations consumed by the sync controller.
#[async_trait]
pub trait CollectionApi: Send + Sync {
    /// Search the catalogue.
    async fn search(&self, query: &SearchQuery) -> ClientResult<Vec<Perfume>>;
    /// Fetch the signed-in user's full collection.
    async fn collection(&self) -> ClientResult<Vec<CollectionEntry>>;
    /// Add a perfume; a duplicate yields [`ClientError::Conflict`].
    async fn add(&self, perfume_id: i64) -> ClientResult<Acknowledgement>;
    /// Remove a perfume from the collection.
    async fn remove(&self, perfume_id: i64) -> ClientResult<Acknowledgement>;
    /// Create a perfume; the server also adds it to the caller's collection.
    async fn create(&self, payload: &PerfumeCreate) -> ClientResult<Perfume>;
}

/// HTTP-backed [`CollectionApi`].
#[derive(Clone)]
pub struct CollectionRepository {
    api: ApiClient,
}

impl CollectionRepository {
    /// Repository over the shared client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CollectionApi for CollectionRepository {
    async fn search(&self, query: &SearchQuery) -> ClientResult<Vec<Perfume>> {
        let results: Vec<Perfume> = self.api.get_query("perfumes/search", query).await?;
        debug!(count = results.len(), "search returned");
        Ok(results)
    }

    async fn collection(&self) -> ClientResult<Vec<CollectionEntry>> {
        self.api.get_json("perfumes/collection").await
    }

    async fn add(&self, perfume_id: i64) -> ClientResult<Acknowledgement> {
        self.api
            .post_ack(&format!("perfumes/collection/{perfume_id}"))
            .await
            .map_err(|err| match err {
                // The service reports an existing entry as a plain 400.
                ClientError::Server {
                    status: 400,
                    detail,
                } => ClientError::Conflict { detail },
                other => other,
            })
    }

    async fn remove(&self, perfume_id: i64) -> ClientResult<Acknowledgement> {
        self.api
            .delete_ack(&format!("perfumes/collection/{perfume_id}"))
            .await
    }

    async fn create(&self, payload: &PerfumeCreate) -> ClientResult<Perfume> {
        self.api.post_json("perfumes/", payload).await
    }
}
