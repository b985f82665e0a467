//! Shared session slot used by the HTTP client and the session manager.
//!
//! Only these two components hold a `SessionContext`, and its mutators are
//! crate-private, so nothing else can install or drop a credential.

use std::sync::{Arc, PoisonError, RwLock};

use sillage_api_models::UserProfile;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::StoreResult;
use crate::session::SessionStatus;
use crate::store::{Credential, StoredSession, TokenStore};

pub(crate) struct SessionContext {
    store: Arc<dyn TokenStore>,
    credential: RwLock<Option<Credential>>,
    profile: RwLock<Option<UserProfile>>,
    status: watch::Sender<SessionStatus>,
}

impl SessionContext {
    pub(crate) fn new(store: Arc<dyn TokenStore>) -> Self {
        let (status, _) = watch::channel(SessionStatus::Loading);
        Self {
            store,
            credential: RwLock::new(None),
            profile: RwLock::new(None),
            status,
        }
    }

    pub(crate) fn store(&self) -> &dyn TokenStore {
        self.store.as_ref()
    }

    pub(crate) fn credential(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn has_credential(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn profile(&self) -> Option<UserProfile> {
        self.profile
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub(crate) fn set_status(&self, status: SessionStatus) {
        self.status.send_replace(status);
    }

    /// Install an already-persisted session and publish `Authenticated`.
    pub(crate) fn establish(&self, session: StoredSession) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session.credential);
        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = session.profile;
        self.set_status(SessionStatus::Authenticated);
    }

    /// Persist a fresh profile for the current credential.
    pub(crate) async fn replace_profile(&self, profile: UserProfile) -> StoreResult<()> {
        if let Some(credential) = self.credential() {
            self.store
                .save(&StoredSession {
                    credential,
                    profile: Some(profile.clone()),
                })
                .await?;
        }
        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = Some(profile);
        Ok(())
    }

    /// Drop the session after a 401.
    ///
    /// `sent` is the token the rejected request carried; a rejection of an
    /// older token must not sign out a session established since.
    pub(crate) async fn reject(&self, sent: Option<&str>) {
        let current = self.credential();
        let matches = current.as_ref().map(Credential::access_token) == sent;
        if !matches {
            return;
        }
        if current.is_some() {
            info!("credential rejected by server; signing out");
        }
        self.drop_session().await;
    }

    /// Forget the credential locally and publish `Anonymous`.
    pub(crate) async fn drop_session(&self) {
        self.credential
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.profile
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "failed to clear persisted session");
        }
        self.set_status(SessionStatus::Anonymous);
    }
}
