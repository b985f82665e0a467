use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use sillage_config::{ClientConfig, ConfigOverrides};
use sillage_core::{ClientError, ErrorKind, SessionStatus, Sillage};
use tempfile::TempDir;

fn config(server: &MockServer, state_dir: &TempDir) -> Result<ClientConfig> {
    Ok(ClientConfig::defaults()?.with_overrides(ConfigOverrides {
        api_url: Some(server.url("/api/v1")),
        http_timeout_secs: Some(5),
        state_dir: Some(state_dir.path().to_path_buf()),
    })?)
}

fn auth_body() -> serde_json::Value {
    json!({
        "access_token": "token-abc",
        "token_type": "bearer",
        "user": {
            "id": 7,
            "email": "ana@example.com",
            "first_name": "Ana",
            "last_name": "Ruiz",
            "suscrito": false,
            "consultas_restantes": 0,
            "is_active": true,
            "is_verified": true
        }
    })
}

#[tokio::test]
async fn login_survives_a_restart_without_logging_in_again() -> Result<()> {
    let server = MockServer::start_async().await;
    let login = server.mock(|when, then| {
        when.method(POST).path("/api/v1/auth/login");
        then.status(200).json_body(auth_body());
    });
    let collection = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/perfumes/collection")
            .header("authorization", "Bearer token-abc");
        then.status(200).json_body(json!([]));
    });
    let state_dir = TempDir::new()?;
    let config = config(&server, &state_dir)?;

    let first = Sillage::from_config(&config)?;
    assert_eq!(first.start().await?, SessionStatus::Anonymous);
    first.session().login("ana@example.com", "secret123").await?;
    drop(first);

    let second = Sillage::from_config(&config)?;
    assert_eq!(second.session().status(), SessionStatus::Loading);
    assert_eq!(second.start().await?, SessionStatus::Authenticated);
    assert_eq!(
        second.session().profile().map(|profile| profile.email),
        Some("ana@example.com".to_string())
    );
    second.sync().reload_collection().await?;

    login.assert();
    collection.assert();
    Ok(())
}

#[tokio::test]
async fn unauthorized_reload_signs_out_and_forgets_the_token() -> Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/auth/login");
        then.status(200).json_body(auth_body());
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/perfumes/collection");
        then.status(401)
            .json_body(json!({"detail": "Could not validate credentials"}));
    });
    let state_dir = TempDir::new()?;
    let config = config(&server, &state_dir)?;

    let client = Sillage::from_config(&config)?;
    client.start().await?;
    client.session().login("ana@example.com", "secret123").await?;
    let mut status = client.session().subscribe();

    let err = client.sync().reload_collection().await.err();
    assert!(matches!(err, Some(ClientError::Auth { .. })));
    assert_eq!(*status.borrow_and_update(), SessionStatus::Anonymous);
    assert!(!config.session_path().exists());

    let restarted = Sillage::from_config(&config)?;
    assert_eq!(restarted.start().await?, SessionStatus::Anonymous);
    Ok(())
}

#[tokio::test]
async fn corrupt_session_file_is_reported() -> Result<()> {
    let server = MockServer::start_async().await;
    let state_dir = TempDir::new()?;
    let config = config(&server, &state_dir)?;
    std::fs::write(config.session_path(), "{\"sillage.access_token\": 42")?;

    let client = Sillage::from_config(&config)?;
    let err = client.start().await.err();

    assert_eq!(err.map(|err| err.kind()), Some(ErrorKind::Storage));
    assert_eq!(client.session().status(), SessionStatus::Anonymous);
    Ok(())
}
