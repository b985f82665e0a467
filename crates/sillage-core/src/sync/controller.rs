//! Debounced search and reload-after-success collection mutations.
//!
//! # Design
//! - Every keystroke bumps a sequence token; only the latest query's results apply.
//! - The debounce timer is abortable while sleeping; a request in flight never is.
//! - Mutations never touch the collection locally; success triggers a full reload.
//! - Reloads carry a generation too; a reply overtaken by a newer reload or a
//!   reset is dropped.
//! - Locks guard only synchronous sections and are never held across `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sillage_api_models::{Perfume, SearchQuery};
use sillage_config::ClientConfig;
use sillage_config::defaults::{SEARCH_DEBOUNCE_MS, SEARCH_LIMIT};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::repository::CollectionApi;
use crate::sync::form::PerfumeForm;
use crate::sync::state::{CollectionView, SearchPhase};

/// Tuning for the search sub-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Quiet period before a query is sent.
    pub debounce: Duration,
    /// Page size requested per search.
    pub search_limit: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
            search_limit: SEARCH_LIMIT,
        }
    }
}

impl SyncSettings {
    /// Settings taken from the client configuration.
    #[must_use]
    pub const fn from_config(config: &ClientConfig) -> Self {
        Self {
            debounce: config.search_debounce,
            search_limit: config.search_limit,
        }
    }
}

#[derive(Default)]
struct SearchTracker {
    issued: u64,
    reloads: u64,
    pending: Option<JoinHandle<()>>,
}

struct Inner {
    api: Arc<dyn CollectionApi>,
    settings: SyncSettings,
    view: watch::Sender<CollectionView>,
    search: Mutex<SearchTracker>,
}

impl Inner {
    fn tracker(&self) -> MutexGuard<'_, SearchTracker> {
        self.search.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut CollectionView)) {
        self.view.send_modify(apply);
    }

    fn fail(&self, err: &ClientError) {
        let message = err.user_message();
        self.update(|view| view.error = Some(message));
    }

    async fn run_search(self: Arc<Self>, token: u64, text: String) {
        tokio::time::sleep(self.settings.debounce).await;
        {
            let mut tracker = self.tracker();
            if tracker.issued != token {
                return;
            }
            tracker.pending = None;
            self.update(|view| view.search_phase = SearchPhase::Searching);
        }

        debug!(token, query = %text, "search issued");
        let query = SearchQuery::text(text, self.settings.search_limit);
        let outcome = self.api.search(&query).await;

        let tracker = self.tracker();
        if tracker.issued != token {
            debug!(token, latest = tracker.issued, "discarding stale search response");
            return;
        }
        match outcome {
            Ok(results) => self.update(|view| {
                view.search_phase = SearchPhase::for_results(&results);
                view.search_results = results;
                view.error = None;
            }),
            Err(err) => {
                warn!(error = %err, "search failed");
                let message = err.user_message();
                self.update(|view| {
                    view.search_phase = SearchPhase::Idle;
                    view.error = Some(message);
                });
            }
        }
        drop(tracker);
    }
}

/// Drives the collection screen: debounced search plus confirmed mutations.
///
/// Cloning is cheap; clones share the same view and timer.
#[derive(Clone)]
pub struct CollectionSyncController {
    inner: Arc<Inner>,
}

impl CollectionSyncController {
    /// Controller over any [`CollectionApi`].
    #[must_use]
    pub fn new(api: Arc<dyn CollectionApi>, settings: SyncSettings) -> Self {
        let (view, _) = watch::channel(CollectionView::default());
        Self {
            inner: Arc::new(Inner {
                api,
                settings,
                view,
                search: Mutex::new(SearchTracker::default()),
            }),
        }
    }

    /// Snapshot of the current view.
    #[must_use]
    pub fn view(&self) -> CollectionView {
        self.inner.view.borrow().clone()
    }

    /// Subscribe to view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CollectionView> {
        self.inner.view.subscribe()
    }

    /// Record a keystroke in the search box.
    ///
    /// Must be called from within a Tokio runtime. A blank query clears the
    /// results immediately without any remote call.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let text = query.trim().to_string();

        let mut tracker = self.inner.tracker();
        tracker.issued += 1;
        let token = tracker.issued;
        if let Some(timer) = tracker.pending.take() {
            timer.abort();
        }

        if text.is_empty() {
            self.inner.update(|view| {
                view.query = query;
                view.search_results.clear();
                view.search_phase = SearchPhase::Idle;
            });
            return;
        }

        self.inner.update(|view| {
            view.query = query;
            view.search_phase = SearchPhase::Debouncing;
        });
        let inner = Arc::clone(&self.inner);
        tracker.pending = Some(tokio::spawn(inner.run_search(token, text)));
    }

    /// Wait until the search sub-flow is neither debouncing nor searching.
    pub async fn settled(&self) -> CollectionView {
        let mut receiver = self.inner.view.subscribe();
        let settled = receiver
            .wait_for(|view| !view.search_phase.is_pending())
            .await
            .map(|view| view.clone());
        settled.unwrap_or_else(|_| self.view())
    }

    /// Replace the collection with the server's current state.
    ///
    /// A reply overtaken by a newer reload or a [`reset`](Self::reset) leaves
    /// the view alone.
    ///
    /// # Errors
    ///
    /// Propagates the remote failure; the previous collection stays in place.
    pub async fn reload_collection(&self) -> ClientResult<()> {
        let generation = {
            let mut tracker = self.inner.tracker();
            tracker.reloads += 1;
            self.inner.update(|view| view.collection_loading = true);
            tracker.reloads
        };
        let outcome = self.inner.api.collection().await;

        let tracker = self.inner.tracker();
        if tracker.reloads != generation {
            debug!(
                generation,
                latest = tracker.reloads,
                "discarding stale collection response"
            );
            return outcome.map(|_| ());
        }
        let result = match outcome {
            Ok(entries) => {
                debug!(count = entries.len(), "collection reloaded");
                self.inner.update(|view| {
                    view.collection = entries;
                    view.collection_loading = false;
                    view.error = None;
                });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "collection reload failed");
                let message = err.user_message();
                self.inner.update(|view| {
                    view.collection_loading = false;
                    view.error = Some(message);
                });
                Err(err)
            }
        };
        drop(tracker);
        result
    }

    /// Add a perfume, then reload the collection.
    ///
    /// # Errors
    ///
    /// Returns the add or reload failure; nothing changes locally on failure.
    pub async fn add_to_collection(&self, perfume_id: i64) -> ClientResult<()> {
        if let Err(err) = self.inner.api.add(perfume_id).await {
            warn!(perfume_id, error = %err, "add to collection failed");
            self.inner.fail(&err);
            return Err(err);
        }
        info!(perfume_id, "perfume added to collection");
        self.reload_collection().await
    }

    /// Ask for confirmation before removing `perfume_id`.
    pub fn request_removal(&self, perfume_id: i64) {
        self.inner
            .update(|view| view.pending_deletion = Some(perfume_id));
    }

    /// Dismiss the pending removal.
    pub fn cancel_removal(&self) {
        self.inner.update(|view| view.pending_deletion = None);
    }

    /// Remove the perfume awaiting confirmation, then reload.
    ///
    /// Returns `Ok(false)` when no removal was pending. The pending removal
    /// is cleared whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns the remove or reload failure.
    pub async fn confirm_removal(&self) -> ClientResult<bool> {
        let mut target = None;
        self.inner.view.send_if_modified(|view| {
            target = view.pending_deletion.take();
            target.is_some()
        });
        let Some(perfume_id) = target else {
            return Ok(false);
        };

        if let Err(err) = self.inner.api.remove(perfume_id).await {
            warn!(perfume_id, error = %err, "remove from collection failed");
            self.inner.fail(&err);
            return Err(err);
        }
        info!(perfume_id, "perfume removed from collection");
        self.reload_collection().await?;
        Ok(true)
    }

    /// Validate the form, create the perfume, reload and reset the form.
    ///
    /// # Errors
    ///
    /// Returns a validation error without any remote call when the name or
    /// brand is blank; otherwise the remote failure.
    pub async fn create_and_add(&self, form: PerfumeForm) -> ClientResult<Perfume> {
        let payload = match form.to_payload() {
            Ok(payload) => payload,
            Err(err) => {
                self.inner.update(|view| {
                    view.error = Some(err.user_message());
                    view.form = form;
                });
                return Err(err);
            }
        };

        self.inner.update(|view| {
            view.form = form;
            view.creating = true;
        });
        let created = match self.inner.api.create(&payload).await {
            Ok(created) => created,
            Err(err) => {
                warn!(error = %err, "perfume creation failed");
                let message = err.user_message();
                self.inner.update(|view| {
                    view.creating = false;
                    view.error = Some(message);
                });
                return Err(err);
            }
        };
        info!(perfume_id = created.id, "perfume created");
        self.inner.update(|view| {
            view.creating = false;
            view.form = PerfumeForm::default();
        });
        self.reload_collection().await?;
        Ok(created)
    }

    /// Return to the initial state, abandoning any pending search and any
    /// collection reload still in flight.
    pub fn reset(&self) {
        let mut tracker = self.inner.tracker();
        tracker.issued += 1;
        tracker.reloads += 1;
        if let Some(timer) = tracker.pending.take() {
            timer.abort();
        }
        self.inner.view.send_replace(CollectionView::default());
    }
}
