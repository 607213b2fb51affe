use thiserror::Error;

/// Failures of the OAuth PKCE login flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The authorization server redirected back with an `error` parameter.
    #[error("authorization provider returned error: {0}")]
    Provider(String),

    /// The `state` on the redirect does not match the one stored at login
    /// initiation.
    #[error("state mismatch on authorization redirect")]
    StateMismatch,

    /// The redirect carried neither a code nor an error parameter.
    #[error("authorization redirect carried no code")]
    MissingCode,

    /// No login session (verifier/state) is stored: begin_login was never
    /// called, or the session was already consumed by an earlier exchange.
    #[error("no pending login session")]
    NoPendingLogin,

    /// The token endpoint rejected the code exchange.
    #[error("code exchange failed with status {0}")]
    ExchangeFailed(u16),

    /// The token endpoint answered with a success status but no access_token.
    #[error("token response carried no access_token")]
    MalformedTokenResponse,

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("session store error: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Failures while reading paginated resources.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch failed with status {0}")]
    HttpError(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Failures while writing playlist contents.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("write failed with status {0}")]
    HttpError(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// User-input problems detected before any network call is made.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("at least one album group must be selected")]
    NoAlbumGroups,

    #[error("playlist name must not be empty")]
    EmptyPlaylistName,
}
