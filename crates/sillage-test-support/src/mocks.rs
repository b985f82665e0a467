//! In-memory stand-in for the remote collection service.
//!
//! Behaves like the real service where tests depend on it: duplicate adds
//! conflict, created perfumes land in the caller's collection, and search is
//! a case-insensitive substring match capped by `limit`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sillage_api_models::{Acknowledgement, CollectionEntry, Perfume, PerfumeCreate, SearchQuery};
use sillage_core::{ClientError, ClientResult, CollectionApi};

use crate::fixtures::{entry, sample_catalogue};

/// Detail returned for a duplicate add.
pub const DUPLICATE_DETAIL: &str = "El perfume ya está en tu colección";

/// Operation selector for injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOperation {
    /// `search`.
    Search,
    /// `collection`.
    Collection,
    /// `add`.
    Add,
    /// `remove`.
    Remove,
    /// `create`.
    Create,
}

/// Call recorded by the fake, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    /// Search with the given query text.
    Search(String),
    /// Full collection fetch.
    Collection,
    /// Add by id.
    Add(i64),
    /// Remove by id.
    Remove(i64),
    /// Create with the submitted payload.
    Create(PerfumeCreate),
}

#[derive(Default)]
struct FakeState {
    catalogue: Vec<Perfume>,
    collection: Vec<CollectionEntry>,
    clock: i64,
    calls: Vec<FakeCall>,
    failures: HashMap<FakeOperation, VecDeque<ClientError>>,
    search_delays: HashMap<String, Duration>,
    collection_delays: VecDeque<Duration>,
}

impl FakeState {
    fn take_failure(&mut self, operation: FakeOperation) -> Option<ClientError> {
        self.failures.get_mut(&operation)?.pop_front()
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }
}

/// In-memory [`CollectionApi`].
#[derive(Default)]
pub struct FakeCollectionService {
    state: Mutex<FakeState>,
}

impl FakeCollectionService {
    /// Service over [`sample_catalogue`] with an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalogue(sample_catalogue())
    }

    /// Service over a custom catalogue.
    #[must_use]
    pub fn with_catalogue(catalogue: Vec<Perfume>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                catalogue,
                ..FakeState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Put catalogue perfumes into the collection without recording calls.
    pub fn seed_collection(&self, ids: &[i64]) {
        let mut state = self.state();
        for id in ids {
            let Some(perfume) = state.catalogue.iter().find(|p| p.id == *id).cloned() else {
                continue;
            };
            let at = state.tick();
            state.collection.push(entry(perfume, at));
        }
    }

    /// Make the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: FakeOperation, error: ClientError) {
        self.state()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Delay responses to searches for exactly `query`.
    pub fn delay_search(&self, query: &str, delay: Duration) {
        self.state().search_delays.insert(query.to_string(), delay);
    }

    /// Delay the reply to the next `collection()` call.
    ///
    /// The reply still reflects the collection as it was when the call
    /// arrived, so a delayed reply can be overtaken by a fresher one.
    pub fn delay_next_collection(&self, delay: Duration) {
        self.state().collection_delays.push_back(delay);
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<FakeCall> {
        self.state().calls.clone()
    }

    /// Query texts of the searches received so far.
    #[must_use]
    pub fn search_queries(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                FakeCall::Search(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Server-side collection, as a fresh `collection()` would return it.
    #[must_use]
    pub fn stored_collection(&self) -> Vec<CollectionEntry> {
        self.state().collection.clone()
    }
}

fn matches(perfume: &Perfume, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    std::iter::once(&perfume.name)
        .chain(std::iter::once(&perfume.brand))
        .chain(perfume.notes.iter())
        .chain(perfume.accords.iter())
        .any(|field| field.to_lowercase().contains(&needle))
}

#[async_trait]
impl CollectionApi for FakeCollectionService {
    async fn search(&self, query: &SearchQuery) -> ClientResult<Vec<Perfume>> {
        let text = query.query.clone().unwrap_or_default();
        let delay = {
            let mut state = self.state();
            state.calls.push(FakeCall::Search(text.clone()));
            if let Some(err) = state.take_failure(FakeOperation::Search) {
                return Err(err);
            }
            state.search_delays.get(&text).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state();
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        Ok(state
            .catalogue
            .iter()
            .filter(|perfume| matches(perfume, &text))
            .filter(|perfume| {
                query
                    .brand
                    .as_deref()
                    .is_none_or(|brand| perfume.brand.eq_ignore_ascii_case(brand))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn collection(&self) -> ClientResult<Vec<CollectionEntry>> {
        let (snapshot, delay) = {
            let mut state = self.state();
            state.calls.push(FakeCall::Collection);
            if let Some(err) = state.take_failure(FakeOperation::Collection) {
                return Err(err);
            }
            (state.collection.clone(), state.collection_delays.pop_front())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(snapshot)
    }

    async fn add(&self, perfume_id: i64) -> ClientResult<Acknowledgement> {
        let mut state = self.state();
        state.calls.push(FakeCall::Add(perfume_id));
        if let Some(err) = state.take_failure(FakeOperation::Add) {
            return Err(err);
        }
        if state
            .collection
            .iter()
            .any(|entry| entry.perfume.id == perfume_id)
        {
            return Err(ClientError::Conflict {
                detail: Some(DUPLICATE_DETAIL.to_string()),
            });
        }
        let Some(perfume) = state
            .catalogue
            .iter()
            .find(|perfume| perfume.id == perfume_id)
            .cloned()
        else {
            return Err(ClientError::Server {
                status: 404,
                detail: Some("Perfume no encontrado".to_string()),
            });
        };
        let at = state.tick();
        state.collection.push(entry(perfume, at));
        Ok(Acknowledgement {
            message: "Perfume agregado a tu colección".to_string(),
        })
    }

    async fn remove(&self, perfume_id: i64) -> ClientResult<Acknowledgement> {
        let mut state = self.state();
        state.calls.push(FakeCall::Remove(perfume_id));
        if let Some(err) = state.take_failure(FakeOperation::Remove) {
            return Err(err);
        }
        let before = state.collection.len();
        state
            .collection
            .retain(|entry| entry.perfume.id != perfume_id);
        if state.collection.len() == before {
            return Err(ClientError::Server {
                status: 404,
                detail: Some("Perfume no está en tu colección".to_string()),
            });
        }
        Ok(Acknowledgement {
            message: "Perfume eliminado de tu colección".to_string(),
        })
    }

    async fn create(&self, payload: &PerfumeCreate) -> ClientResult<Perfume> {
        let mut state = self.state();
        state.calls.push(FakeCall::Create(payload.clone()));
        if let Some(err) = state.take_failure(FakeOperation::Create) {
            return Err(err);
        }
        let id = state
            .catalogue
            .iter()
            .map(|perfume| perfume.id)
            .max()
            .unwrap_or(0)
            + 1;
        let perfume = Perfume {
            id,
            name: payload.name.clone(),
            brand: payload.brand.clone(),
            perfumer: payload.perfumer.clone(),
            notes: payload.notes.clone(),
            accords: payload.accords.clone(),
            created_at: None,
            updated_at: None,
        };
        state.catalogue.push(perfume.clone());
        let at = state.tick();
        state.collection.push(entry(perfume.clone(), at));
        Ok(perfume)
    }
}
