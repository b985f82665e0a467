//! Sign-in lifecycle and the published session status.
//!
//! # Design
//! - Status changes go out on a watch channel; presentation code subscribes.
//! - Login and registration return failures as values with a display reason.
//! - Logout always succeeds locally; the remote notification is best-effort.

use std::sync::Arc;

use sillage_api_models::{
    AuthResponse, LoginForm, ProfileUpdate, RegisterRequest, SubscriptionStatus, UserProfile,
};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::context::SessionContext;
use crate::error::{ClientError, ClientResult, ErrorKind};
use crate::http::ApiClient;
use crate::store::{Credential, StoredSession};

/// Minimum password length accepted by the server.
pub const MIN_PASSWORD_LEN: usize = 6;

const LOGIN_FALLBACK: &str = "login failed";
const REGISTER_FALLBACK: &str = "registration failed";

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Persisted state has not been read yet.
    Loading,
    /// No credential.
    Anonymous,
    /// A login or registration is in flight.
    Authenticating,
    /// A credential is installed.
    Authenticated,
}

/// Reason a login or registration did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    /// Classification of the underlying error.
    pub kind: ErrorKind,
    /// Reason suitable for display.
    pub message: String,
}

impl AuthFailure {
    fn from_error(err: &ClientError, fallback: &str) -> Self {
        let message = match err.kind() {
            ErrorKind::Auth | ErrorKind::Conflict | ErrorKind::Server => err
                .server_detail()
                .map_or_else(|| fallback.to_string(), str::to_string),
            _ => err.user_message(),
        };
        Self {
            kind: err.kind(),
            message,
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl std::error::Error for AuthFailure {}

/// Fields collected by the sign-up form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Account email.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl Registration {
    fn validate(&self) -> ClientResult<RegisterRequest> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ClientError::validation("email is required"));
        }
        if self.password.is_empty() {
            return Err(ClientError::validation("password is required"));
        }
        validate_password(&self.password)?;
        Ok(RegisterRequest {
            email: email.to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        })
    }
}

fn validate_password(password: &str) -> ClientResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Owns the sign-in state machine.
#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
    context: Arc<SessionContext>,
}

impl SessionManager {
    pub(crate) const fn new(api: ApiClient, context: Arc<SessionContext>) -> Self {
        Self { api, context }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.context.status()
    }

    /// Subscribe to status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.context.subscribe()
    }

    /// Cached profile of the signed-in user.
    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.context.profile()
    }

    /// Whether a credential is installed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.context.has_credential()
    }

    /// Resolve the initial status from the token store.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] when the persisted session cannot be
    /// read; the status is left `Anonymous`.
    pub async fn restore(&self) -> ClientResult<SessionStatus> {
        match self.context.store().load().await {
            Ok(Some(session)) => {
                info!("restored persisted session");
                self.context.establish(session);
            }
            Ok(None) => self.context.set_status(SessionStatus::Anonymous),
            Err(err) => {
                warn!(error = %err, "persisted session unreadable");
                self.context.set_status(SessionStatus::Anonymous);
                return Err(err.into());
            }
        }
        Ok(self.status())
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] carrying the server's reason, or
    /// `"login failed"` when none was given.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, AuthFailure> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthFailure::from_error(
                &ClientError::validation("email and password are required"),
                LOGIN_FALLBACK,
            ));
        }
        let form = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.authenticate(LOGIN_FALLBACK, async {
            self.api.post_form_anonymous("auth/login", &form).await
        })
        .await
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] for local validation failures or the
    /// server's reason (`"registration failed"` when none was given).
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, AuthFailure> {
        let request = registration
            .validate()
            .map_err(|err| AuthFailure::from_error(&err, REGISTER_FALLBACK))?;
        self.authenticate(REGISTER_FALLBACK, async {
            self.api.post_json_anonymous("auth/register", &request).await
        })
        .await
    }

    async fn authenticate<F>(&self, fallback: &str, call: F) -> Result<UserProfile, AuthFailure>
    where
        F: Future<Output = ClientResult<AuthResponse>>,
    {
        self.context.set_status(SessionStatus::Authenticating);
        let outcome = match call.await {
            Ok(response) => self.install(response).await,
            Err(err) => Err(err),
        };
        outcome.map_err(|err| {
            warn!(error = %err, reason = %err.user_message(), "sign-in failed");
            self.context.set_status(if self.context.has_credential() {
                SessionStatus::Authenticated
            } else {
                SessionStatus::Anonymous
            });
            AuthFailure::from_error(&err, fallback)
        })
    }

    async fn install(&self, response: AuthResponse) -> ClientResult<UserProfile> {
        let session = StoredSession {
            credential: Credential::new(response.access_token, response.token_type),
            profile: Some(response.user.clone()),
        };
        self.context.store().save(&session).await?;
        self.context.establish(session);
        info!(user_id = response.user.id, "signed in");
        Ok(response.user)
    }

    /// Sign out: notify the server, forget the credential, publish `Anonymous`.
    pub async fn logout(&self) {
        if self.context.has_credential()
            && let Err(err) = self.api.post_ack("auth/logout").await
        {
            warn!(error = %err, "logout notification failed; continuing");
        }
        self.context.drop_session().await;
        info!("signed out");
    }

    /// Re-fetch and re-persist the profile.
    ///
    /// Failures are logged and leave the cached profile unchanged.
    pub async fn refresh_profile(&self) -> Option<UserProfile> {
        let profile = match self.api.get_json::<UserProfile>("users/me").await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = %err, reason = %err.user_message(), "profile refresh failed");
                return None;
            }
        };
        if let Err(err) = self.context.replace_profile(profile.clone()).await {
            warn!(error = %err, "failed to persist refreshed profile");
        }
        Some(profile)
    }

    /// Update name and/or password.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty update or a short password,
    /// otherwise the remote or storage failure.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        if update.is_empty() {
            return Err(ClientError::validation("nothing to update"));
        }
        if let Some(password) = &update.password {
            validate_password(password)?;
        }
        let profile: UserProfile = self.api.put_json("users/me", update).await?;
        self.context.replace_profile(profile.clone()).await?;
        info!(user_id = profile.id, "profile updated");
        Ok(profile)
    }

    /// Subscription state of the signed-in user.
    ///
    /// # Errors
    ///
    /// Propagates remote failures.
    pub async fn subscription(&self) -> ClientResult<SubscriptionStatus> {
        self.api.get_json("users/me/subscription").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryTokenStore, TokenStore};
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;
    use sillage_config::{ClientConfig, ConfigOverrides};

    fn manager(server: &MockServer, store: Arc<MemoryTokenStore>) -> Result<SessionManager> {
        let config = ClientConfig::defaults()?.with_overrides(ConfigOverrides {
            api_url: Some(server.url("/api/v1")),
            ..ConfigOverrides::default()
        })?;
        let context = Arc::new(SessionContext::new(store));
        let api = ApiClient::new(&config, context.clone())?;
        Ok(SessionManager::new(api, context))
    }

    fn user_json() -> serde_json::Value {
        json!({
            "id": 7,
            "email": "ana@example.com",
            "first_name": "Ana",
            "last_name": "Ruiz",
            "suscrito": false,
            "consultas_restantes": 0,
            "is_active": true,
            "is_verified": false
        })
    }

    #[tokio::test]
    async fn login_posts_form_and_persists_session() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/auth/login")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("username=ana%40example.com&password=secret123");
            then.status(200).json_body(json!({
                "access_token": "token-abc",
                "token_type": "bearer",
                "user": user_json()
            }));
        });
        let store = Arc::new(MemoryTokenStore::new());
        let session = manager(&server, store.clone())?;
        let mut status = session.subscribe();

        let profile = session.login("ana@example.com", "secret123").await?;

        mock.assert();
        assert_eq!(profile.email, "ana@example.com");
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert_eq!(*status.borrow_and_update(), SessionStatus::Authenticated);
        let stored = store.load().await?.ok_or_else(|| anyhow::anyhow!("stored"))?;
        assert_eq!(stored.credential.access_token(), "token-abc");
        assert_eq!(stored.profile, Some(profile));
        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_returns_server_reason() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/login");
            then.status(401)
                .json_body(json!({"detail": "Email o contraseña incorrectos"}));
        });
        let session = manager(&server, Arc::new(MemoryTokenStore::new()))?;

        let failure = session
            .login("ana@example.com", "wrong-pass")
            .await
            .expect_err("rejected");
        assert_eq!(failure.kind, ErrorKind::Auth);
        assert_eq!(failure.message, "Email o contraseña incorrectos");
        assert_eq!(session.status(), SessionStatus::Anonymous);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_keeps_the_installed_session() -> Result<()> {
        let server = MockServer::start_async().await;
        let login = server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/login");
            then.status(401)
                .json_body(json!({"detail": "Email o contraseña incorrectos"}));
        });
        let store = Arc::new(MemoryTokenStore::with_session(StoredSession {
            credential: Credential::new("token-abc", "bearer"),
            profile: None,
        }));
        let session = manager(&server, store.clone())?;
        assert_eq!(session.restore().await?, SessionStatus::Authenticated);

        let failure = session
            .login("ana@example.com", "wrong-pass")
            .await
            .expect_err("rejected");

        login.assert();
        assert_eq!(failure.kind, ErrorKind::Auth);
        assert_eq!(session.status(), SessionStatus::Authenticated);
        let stored = store.load().await?.ok_or_else(|| anyhow::anyhow!("stored"))?;
        assert_eq!(stored.credential.access_token(), "token-abc");
        Ok(())
    }

    #[tokio::test]
    async fn login_without_detail_uses_fallback() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/login");
            then.status(500);
        });
        let session = manager(&server, Arc::new(MemoryTokenStore::new()))?;

        let failure = session
            .login("ana@example.com", "secret123")
            .await
            .expect_err("server error");
        assert_eq!(failure.message, "login failed");
        Ok(())
    }

    #[tokio::test]
    async fn register_validates_before_network() -> Result<()> {
        let server = MockServer::start_async().await;
        let session = manager(&server, Arc::new(MemoryTokenStore::new()))?;

        let failure = session
            .register(&Registration {
                email: "ana@example.com".into(),
                password: "12345".into(),
                first_name: "Ana".into(),
                last_name: "Ruiz".into(),
            })
            .await
            .expect_err("short password");
        assert_eq!(failure.kind, ErrorKind::Validation);
        assert_eq!(failure.message, "password must be at least 6 characters");
        Ok(())
    }

    #[tokio::test]
    async fn register_sends_json_and_signs_in() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/register").json_body(json!({
                "email": "ana@example.com",
                "password": "secret123",
                "first_name": "Ana",
                "last_name": "Ruiz"
            }));
            then.status(200).json_body(json!({
                "access_token": "token-new",
                "token_type": "bearer",
                "user": user_json()
            }));
        });
        let session = manager(&server, Arc::new(MemoryTokenStore::new()))?;

        session
            .register(&Registration {
                email: " ana@example.com ".into(),
                password: "secret123".into(),
                first_name: "Ana".into(),
                last_name: "Ruiz".into(),
            })
            .await?;
        mock.assert();
        assert!(session.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn logout_swallows_remote_failure() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/logout");
            then.status(404).json_body(json!({"detail": "Not Found"}));
        });
        let store = Arc::new(MemoryTokenStore::with_session(StoredSession {
            credential: Credential::new("token-abc", "bearer"),
            profile: None,
        }));
        let session = manager(&server, store.clone())?;
        session.restore().await?;
        assert!(session.is_authenticated());

        session.logout().await;

        mock.assert();
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert!(store.load().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn refresh_failure_keeps_cached_profile() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/users/me");
            then.status(503);
        });
        let cached: UserProfile = serde_json::from_value(user_json())?;
        let store = Arc::new(MemoryTokenStore::with_session(StoredSession {
            credential: Credential::new("token-abc", "bearer"),
            profile: Some(cached.clone()),
        }));
        let session = manager(&server, store)?;
        session.restore().await?;

        assert!(session.refresh_profile().await.is_none());
        assert_eq!(session.profile(), Some(cached));
        assert_eq!(session.status(), SessionStatus::Authenticated);
        Ok(())
    }

    #[tokio::test]
    async fn update_profile_persists_returned_profile() -> Result<()> {
        let server = MockServer::start_async().await;
        let mut updated = user_json();
        updated["first_name"] = json!("Anabel");
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/v1/users/me")
                .json_body(json!({"first_name": "Anabel"}));
            then.status(200).json_body(updated);
        });
        let store = Arc::new(MemoryTokenStore::with_session(StoredSession {
            credential: Credential::new("token-abc", "bearer"),
            profile: None,
        }));
        let session = manager(&server, store.clone())?;
        session.restore().await?;

        let short = ProfileUpdate {
            password: Some("123".into()),
            ..ProfileUpdate::default()
        };
        assert!(matches!(
            session.update_profile(&short).await,
            Err(ClientError::Validation { .. })
        ));

        let profile = session
            .update_profile(&ProfileUpdate {
                first_name: Some("Anabel".into()),
                ..ProfileUpdate::default()
            })
            .await?;
        mock.assert();
        assert_eq!(profile.first_name.as_deref(), Some("Anabel"));
        let stored = store.load().await?.ok_or_else(|| anyhow::anyhow!("stored"))?;
        assert_eq!(stored.profile, Some(profile));
        Ok(())
    }

    #[tokio::test]
    async fn subscription_maps_spanish_fields() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/users/me/subscription");
            then.status(200).json_body(json!({
                "suscrito": true,
                "consultas_restantes": 4,
                "message": "Tienes 4 consultas restantes"
            }));
        });
        let session = manager(&server, Arc::new(MemoryTokenStore::new()))?;
        let status = session.subscription().await?;
        assert!(status.subscribed);
        assert_eq!(status.queries_remaining, 4);
        Ok(())
    }

    #[tokio::test]
    async fn restore_without_session_is_anonymous() -> Result<()> {
        let server = MockServer::start_async().await;
        let session = manager(&server, Arc::new(MemoryTokenStore::new()))?;
        assert_eq!(session.status(), SessionStatus::Loading);
        assert_eq!(session.restore().await?, SessionStatus::Anonymous);
        Ok(())
    }
}
