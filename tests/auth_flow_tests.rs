use std::collections::HashMap;

use mockito::{Matcher, Server};
use serde_json::json;
use tempfile::tempdir;

use spotify_playlist_toolbox::api::{auth, pkce};
use spotify_playlist_toolbox::config::Config;
use spotify_playlist_toolbox::error::AuthError;
use spotify_playlist_toolbox::store;

fn test_config(auth_base: &str) -> Config {
    Config {
        client_id: "cid".to_string(),
        redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
        auth_base: auth_base.to_string(),
        ..Config::default()
    }
}

fn open_store() -> (tempfile::TempDir, rusqlite::Connection) {
    let td = tempdir().unwrap();
    let conn = store::open_or_create(&td.path().join("test.db")).unwrap();
    (td, conn)
}

#[test]
fn begin_login_builds_the_authorize_url_and_stores_the_session() {
    let (_td, conn) = open_store();
    let cfg = test_config("https://accounts.example.com");

    let auth_url = auth::begin_login(&conn, &cfg).unwrap();

    let parsed = url::Url::parse(&auth_url).unwrap();
    assert!(auth_url.starts_with("https://accounts.example.com/authorize?"));
    let params: HashMap<String, String> = parsed.query_pairs().into_owned().collect();

    let (verifier, state) = store::load_login_session(&conn).unwrap().unwrap();
    assert_eq!(verifier.len(), 64);
    assert_eq!(state.len(), 16);
    assert_eq!(params.get("client_id").map(String::as_str), Some("cid"));
    assert_eq!(params.get("response_type").map(String::as_str), Some("code"));
    assert_eq!(
        params.get("redirect_uri").map(String::as_str),
        Some("http://127.0.0.1:8888/callback")
    );
    assert_eq!(params.get("state"), Some(&state));
    assert_eq!(
        params.get("code_challenge"),
        Some(&pkce::code_challenge_s256(&verifier))
    );
    assert_eq!(
        params.get("code_challenge_method").map(String::as_str),
        Some("S256")
    );
    assert!(params.get("scope").unwrap().contains("user-library-read"));
}

#[test]
fn complete_login_rejects_a_provider_error() {
    let (_td, conn) = open_store();
    let cfg = test_config("https://accounts.example.com");
    auth::begin_login(&conn, &cfg).unwrap();

    let err = auth::complete_login(
        &conn,
        "http://127.0.0.1:8888/callback?error=access_denied",
    )
    .unwrap_err();

    assert!(matches!(err, AuthError::Provider(e) if e == "access_denied"));
}

#[test]
fn complete_login_rejects_a_state_mismatch() {
    let (_td, conn) = open_store();
    let cfg = test_config("https://accounts.example.com");
    auth::begin_login(&conn, &cfg).unwrap();

    let err = auth::complete_login(
        &conn,
        "http://127.0.0.1:8888/callback?code=abc&state=not-the-stored-state",
    )
    .unwrap_err();

    assert!(matches!(err, AuthError::StateMismatch));
    // the session stays around for a legitimate retry of the same login
    assert!(store::load_login_session(&conn).unwrap().is_some());
}

#[test]
fn complete_login_without_a_pending_session_fails() {
    let (_td, conn) = open_store();

    let err = auth::complete_login(
        &conn,
        "http://127.0.0.1:8888/callback?code=abc&state=whatever",
    )
    .unwrap_err();

    assert!(matches!(err, AuthError::NoPendingLogin));
}

#[test]
fn complete_login_returns_the_code_when_state_matches() {
    let (_td, conn) = open_store();
    let cfg = test_config("https://accounts.example.com");
    auth::begin_login(&conn, &cfg).unwrap();
    let (_verifier, state) = store::load_login_session(&conn).unwrap().unwrap();

    let code = auth::complete_login(
        &conn,
        &format!("http://127.0.0.1:8888/callback?code=auth-code&state={}", state),
    )
    .unwrap();

    assert_eq!(code, "auth-code");
}

#[test]
fn exchange_sends_the_stored_verifier_and_persists_the_token() {
    let mut server = Server::new();
    let (_td, conn) = open_store();
    let cfg = test_config(&server.url());
    auth::begin_login(&conn, &cfg).unwrap();
    let (verifier, state) = store::load_login_session(&conn).unwrap().unwrap();

    let m = server
        .mock("POST", "/api/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("client_id".into(), "cid".into()),
            Matcher::UrlEncoded("code".into(), "auth-code".into()),
            Matcher::UrlEncoded("redirect_uri".into(), cfg.redirect_uri.clone()),
            Matcher::UrlEncoded("code_verifier".into(), verifier.clone()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "access_token": "tok", "token_type": "Bearer" }).to_string())
        .create();

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let code = auth::complete_login(
            &conn,
            &format!("http://127.0.0.1:8888/callback?code=auth-code&state={}", state),
        )
        .unwrap();
        let client = reqwest::Client::new();
        let token = auth::exchange_code(&client, &conn, &cfg, &code).await.unwrap();
        assert_eq!(token, "tok");
    });

    m.assert();
    assert_eq!(store::load_access_token(&conn).unwrap().as_deref(), Some("tok"));
    // the verifier/state pair is single-use
    assert!(store::load_login_session(&conn).unwrap().is_none());
}

#[test]
fn mismatched_verifier_is_rejected_by_the_token_endpoint() {
    let mut server = Server::new();
    let (_td, conn) = open_store();
    let cfg = test_config(&server.url());
    auth::begin_login(&conn, &cfg).unwrap();

    // The endpoint only accepts a different verifier; the stored one will
    // not match and the exchange fails.
    let _m = server
        .mock("POST", "/api/token")
        .match_body(Matcher::UrlEncoded(
            "code_verifier".into(),
            "some-other-verifier".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "access_token": "tok" }).to_string())
        .create();

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let client = reqwest::Client::new();
        let err = auth::exchange_code(&client, &conn, &cfg, "auth-code")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ExchangeFailed(_)));
    });
}

#[test]
fn failed_exchange_surfaces_the_status_and_clears_the_session() {
    let mut server = Server::new();
    let (_td, conn) = open_store();
    let cfg = test_config(&server.url());
    auth::begin_login(&conn, &cfg).unwrap();

    let _m = server
        .mock("POST", "/api/token")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(json!({ "error": "invalid_grant" }).to_string())
        .create();

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let client = reqwest::Client::new();
        let err = auth::exchange_code(&client, &conn, &cfg, "expired-code")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ExchangeFailed(400)));
    });

    assert!(store::load_login_session(&conn).unwrap().is_none());
    assert!(store::load_access_token(&conn).unwrap().is_none());
}
