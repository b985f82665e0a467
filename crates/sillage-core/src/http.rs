//! Authenticated transport to the remote API.
//!
//! # Design
//! - Single chokepoint: bearer injection, request ids and status mapping live here.
//! - A 401 on an authenticated call drops the session before the error is
//!   returned to the caller. Sign-in endpoints carry no bearer and never do.
//! - Endpoint paths are relative so a base URL prefix (`/api/v1`) is preserved.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sillage_api_models::{Acknowledgement, ErrorBody};
use sillage_config::ClientConfig;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::context::SessionContext;
use crate::error::{ClientError, ClientResult};

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bearer {
    Attach,
    Omit,
}

/// HTTP client shared by every repository.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    context: Arc<SessionContext>,
}

impl ApiClient {
    pub(crate) fn new(config: &ClientConfig, context: Arc<SessionContext>) -> ClientResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        let http = Client::builder()
            .timeout(config.http_timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| ClientError::network(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            context,
        })
    }

    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::validation(format!("invalid endpoint '{path}': {err}")))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let body = self.send(Method::GET, path, Bearer::Attach, |request| request).await?;
        decode(&body)
    }

    pub(crate) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        let body = self
            .send(Method::GET, path, Bearer::Attach, |request| request.query(query))
            .await?;
        decode(&body)
    }

    pub(crate) async fn post_json<T, B>(&self, path: &str, payload: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let body = self
            .send(Method::POST, path, Bearer::Attach, |request| request.json(payload))
            .await?;
        decode(&body)
    }

    pub(crate) async fn put_json<T, B>(&self, path: &str, payload: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let body = self
            .send(Method::PUT, path, Bearer::Attach, |request| request.json(payload))
            .await?;
        decode(&body)
    }

    /// Sign-in calls: form-encoded login.
    pub(crate) async fn post_form_anonymous<T, F>(&self, path: &str, form: &F) -> ClientResult<T>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized + Sync,
    {
        let body = self
            .send(Method::POST, path, Bearer::Omit, |request| request.form(form))
            .await?;
        decode(&body)
    }

    /// Sign-in calls: JSON registration.
    pub(crate) async fn post_json_anonymous<T, B>(&self, path: &str, payload: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let body = self
            .send(Method::POST, path, Bearer::Omit, |request| request.json(payload))
            .await?;
        decode(&body)
    }

    pub(crate) async fn post_ack(&self, path: &str) -> ClientResult<Acknowledgement> {
        let body = self.send(Method::POST, path, Bearer::Attach, |request| request).await?;
        decode_ack(&body)
    }

    pub(crate) async fn delete_ack(&self, path: &str) -> ClientResult<Acknowledgement> {
        let body = self.send(Method::DELETE, path, Bearer::Attach, |request| request).await?;
        decode_ack(&body)
    }

    async fn send<F>(
        &self,
        method: Method,
        path: &str,
        bearer: Bearer,
        configure: F,
    ) -> ClientResult<String>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.endpoint(path)?;
        let credential = match bearer {
            Bearer::Attach => self.context.credential(),
            Bearer::Omit => None,
        };
        let request_id = Uuid::new_v4().to_string();

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(HEADER_REQUEST_ID, &request_id);
        if let Some(credential) = &credential {
            request = request.header(AUTHORIZATION, credential.authorization());
        }

        let response = configure(request).send().await.map_err(|err| {
            warn!(
                %method,
                path,
                request_id = %request_id,
                error = %err,
                "request failed before a response"
            );
            transport_error(&err)
        })?;
        let status = response.status();
        debug!(
            %method,
            path,
            request_id = %request_id,
            status = status.as_u16(),
            "response received"
        );

        let body = response.text().await.map_err(|err| {
            warn!(
                %method,
                path,
                request_id = %request_id,
                error = %err,
                "failed to read response body"
            );
            transport_error(&err)
        })?;
        if status.is_success() {
            return Ok(body);
        }

        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|error| error.message());
        warn!(
            %method,
            path,
            request_id = %request_id,
            status = status.as_u16(),
            detail = detail.as_deref().unwrap_or(""),
            "request rejected"
        );
        Err(match status {
            StatusCode::UNAUTHORIZED => {
                if bearer == Bearer::Attach {
                    let sent = credential.as_ref().map(|value| value.access_token());
                    self.context.reject(sent).await;
                }
                ClientError::Auth { detail }
            }
            StatusCode::CONFLICT => ClientError::Conflict { detail },
            other => ClientError::Server {
                status: other.as_u16(),
                detail,
            },
        })
    }
}

fn transport_error(err: &reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::network("the server took too long to respond")
    } else if err.is_connect() {
        ClientError::network("could not reach the server")
    } else {
        ClientError::network(format!("network error: {err}"))
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> ClientResult<T> {
    serde_json::from_str(body).map_err(|err| ClientError::Server {
        status: StatusCode::OK.as_u16(),
        detail: Some(format!("unexpected response from server: {err}")),
    })
}

fn decode_ack(body: &str) -> ClientResult<Acknowledgement> {
    if body.trim().is_empty() {
        return Ok(Acknowledgement::default());
    }
    decode(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStatus;
    use crate::store::{Credential, MemoryTokenStore, StoredSession, TokenStore};
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;
    use sillage_api_models::{Perfume, SearchQuery};
    use sillage_config::ConfigOverrides;

    fn client_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> Result<ApiClient> {
        let config = ClientConfig::defaults()?.with_overrides(ConfigOverrides {
            api_url: Some(server.url("/api/v1")),
            ..ConfigOverrides::default()
        })?;
        let context = Arc::new(SessionContext::new(store));
        Ok(ApiClient::new(&config, context)?)
    }

    async fn signed_in(server: &MockServer) -> Result<(Arc<MemoryTokenStore>, ApiClient)> {
        let session = StoredSession {
            credential: Credential::new("token-abc", "bearer"),
            profile: None,
        };
        let store = Arc::new(MemoryTokenStore::with_session(session.clone()));
        let client = client_for(server, store.clone())?;
        client.context.establish(session);
        Ok((store, client))
    }

    #[tokio::test]
    async fn injects_bearer_and_request_id_under_prefix() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/perfumes/search")
                .query_param("q", "noir")
                .query_param("limit", "20")
                .header("authorization", "Bearer token-abc")
                .header_exists(HEADER_REQUEST_ID);
            then.status(200).json_body(json!([
                {"id": 1, "nombre": "Noir", "marca": "Maison X", "notas": [], "acordes": []}
            ]));
        });
        let (_, client) = signed_in(&server).await?;

        let results: Vec<Perfume> = client
            .get_query("/perfumes/search", &SearchQuery::text("noir", 20))
            .await?;

        mock.assert();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Noir");
        Ok(())
    }

    #[tokio::test]
    async fn unauthorized_clears_credential_and_store() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/users/me");
            then.status(401)
                .json_body(json!({"detail": "Could not validate credentials"}));
        });
        let (store, client) = signed_in(&server).await?;

        let err = client
            .get_json::<serde_json::Value>("users/me")
            .await
            .expect_err("401");

        assert!(matches!(err, ClientError::Auth { .. }));
        assert_eq!(err.user_message(), "Could not validate credentials");
        assert!(!client.context.has_credential());
        assert_eq!(client.context.status(), SessionStatus::Anonymous);
        assert!(store.load().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn maps_conflict_and_server_statuses() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/perfumes/collection/9");
            then.status(409)
                .json_body(json!({"detail": "El perfume ya está en tu colección"}));
        });
        server.mock(|when, then| {
            when.method(DELETE).path("/api/v1/perfumes/collection/9");
            then.status(500).body("boom");
        });
        let (_, client) = signed_in(&server).await?;

        let conflict = client
            .post_ack("perfumes/collection/9")
            .await
            .expect_err("409");
        assert_eq!(
            conflict.server_detail(),
            Some("El perfume ya está en tu colección")
        );

        let server_error = client
            .delete_ack("perfumes/collection/9")
            .await
            .expect_err("500");
        assert!(matches!(
            server_error,
            ClientError::Server {
                status: 500,
                detail: None
            }
        ));
        assert!(client.context.has_credential());
        Ok(())
    }

    #[tokio::test]
    async fn empty_acknowledgement_and_bad_json() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path("/api/v1/perfumes/collection/3");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/perfumes/collection");
            then.status(200).body("<html>");
        });
        let (_, client) = signed_in(&server).await?;

        let ack = client.delete_ack("perfumes/collection/3").await?;
        assert!(ack.message.is_empty());

        let err = client
            .get_json::<Vec<Perfume>>("perfumes/collection")
            .await
            .expect_err("decode");
        assert!(matches!(err, ClientError::Server { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() -> Result<()> {
        let config = ClientConfig::defaults()?.with_overrides(ConfigOverrides {
            api_url: Some("http://127.0.0.1:9/api/v1".into()),
            http_timeout_secs: Some(1),
            ..ConfigOverrides::default()
        })?;
        let context = Arc::new(SessionContext::new(Arc::new(MemoryTokenStore::new())));
        let client = ApiClient::new(&config, context)?;

        let err = client
            .get_json::<serde_json::Value>("users/me")
            .await
            .expect_err("unreachable");
        assert!(matches!(err, ClientError::Network { .. }));
        Ok(())
    }
}
