use reqwest::Client;
use rusqlite::Connection;
use tracing::info;
use url::Url;

use super::pkce;
use crate::config::Config;
use crate::error::AuthError;
use crate::store;

/// This module implements the OAuth 2.0 Authorization Code flow with PKCE:
/// 1. `begin_login` builds the authorization URL and stores verifier + state.
/// 2. The user opens it in a browser, approves, and gets redirected back.
/// 3. The user pastes the full redirect URL into the CLI.
/// 4. `complete_login` validates state and extracts the `code` param.
/// 5. `exchange_code` trades the code + stored verifier for a bearer token.
///
/// This avoids running an embedded HTTP server and works well for manual
/// setup. The token is opaque: there is no refresh flow, a 401 later on just
/// means logging in again.

/// Build the authorization redirect and persist the verifier/state pair.
/// The session lives until the code exchange resolves.
pub fn begin_login(conn: &Connection, cfg: &Config) -> Result<String, AuthError> {
    let verifier = pkce::generate_code_verifier();
    let state = pkce::generate_state();
    let challenge = pkce::code_challenge_s256(&verifier);

    store::save_login_session(conn, &verifier, &state)?;

    let mut url = Url::parse(&format!("{}/authorize", cfg.auth_base))?;
    url.query_pairs_mut()
        .append_pair("client_id", &cfg.client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &cfg.redirect_uri)
        .append_pair("scope", &cfg.scope_string())
        .append_pair("state", &state)
        .append_pair("code_challenge", &challenge)
        .append_pair("code_challenge_method", "S256");

    Ok(url.to_string())
}

/// Parse the redirect-back URL and validate it against the stored session.
/// Returns the authorization code; the exchange is a separate step.
pub fn complete_login(conn: &Connection, redirect_url: &str) -> Result<String, AuthError> {
    let parsed = Url::parse(redirect_url)?;

    let mut code: Option<String> = None;
    let mut state: Option<String> = None;
    let mut error: Option<String> = None;
    for (k, v) in parsed.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            "error" => error = Some(v.into_owned()),
            _ => {}
        }
    }

    if let Some(e) = error {
        return Err(AuthError::Provider(e));
    }

    let (_verifier, stored_state) =
        store::load_login_session(conn)?.ok_or(AuthError::NoPendingLogin)?;
    if state.as_deref() != Some(stored_state.as_str()) {
        return Err(AuthError::StateMismatch);
    }

    code.ok_or(AuthError::MissingCode)
}

/// Exchange an authorization code for a bearer token using the stored
/// verifier (the verifier proves possession; the challenge is never sent
/// here). The login session is single-use and is cleared whether or not the
/// exchange succeeds.
pub async fn exchange_code(
    client: &Client,
    conn: &Connection,
    cfg: &Config,
    code: &str,
) -> Result<String, AuthError> {
    let (verifier, _state) =
        store::load_login_session(conn)?.ok_or(AuthError::NoPendingLogin)?;

    let result = client
        .post(format!("{}/api/token", cfg.auth_base))
        .form(&[
            ("client_id", cfg.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", cfg.redirect_uri.as_str()),
            ("code_verifier", verifier.as_str()),
        ])
        .send()
        .await;

    store::clear_login_session(conn)?;

    let resp = result?;
    let status = resp.status();
    if !status.is_success() {
        return Err(AuthError::ExchangeFailed(status.as_u16()));
    }

    let body: serde_json::Value = resp.json().await?;
    let token = body["access_token"]
        .as_str()
        .ok_or(AuthError::MalformedTokenResponse)?
        .to_string();

    store::save_access_token(conn, &token)?;
    info!("stored bearer token for the authenticated user");
    Ok(token)
}

/// Interactive login for the CLI: print the authorization URL, wait for the
/// pasted redirect URL, then exchange the code and store the token.
pub async fn run_login(conn: &Connection, cfg: &Config) -> anyhow::Result<()> {
    use std::io;

    let auth_url = begin_login(conn, cfg)?;
    println!(
        "Open this URL in your browser and authorize the application:\n\n{}\n",
        auth_url
    );
    println!(
        "After authorizing you will be redirected to {}. Copy the full redirect URL and paste it here:",
        cfg.redirect_uri
    );

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let code = complete_login(conn, input.trim())?;

    let client = Client::new();
    exchange_code(&client, conn, cfg, &code).await?;
    println!("Login successful. Token stored in {}.", cfg.db_path.display());
    Ok(())
}

/// Drop the stored bearer token.
pub fn logout(conn: &Connection) -> anyhow::Result<()> {
    store::clear_access_token(conn)?;
    Ok(())
}
