use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Spotify application client id. The PKCE flow needs no client secret.
    pub client_id: String,

    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    // Endpoint bases; tests point these at a local mock server.
    #[serde(default = "default_auth_base")]
    pub auth_base: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,

    // Paging / batching. The write batch size must stay within the API's
    // documented 100-URIs-per-call maximum.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_write_batch_size")]
    pub write_batch_size: usize,
    #[serde(default = "default_album_concurrency")]
    pub album_concurrency: usize,
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries_on_rate_limit: u32,

    // path to the session/token database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_redirect_uri() -> String { "http://127.0.0.1:8888/callback".into() }
fn default_auth_base() -> String { "https://accounts.spotify.com".into() }
fn default_api_base() -> String { "https://api.spotify.com/v1".into() }
fn default_page_limit() -> u32 { 50 }
fn default_write_batch_size() -> usize { 100 }
fn default_album_concurrency() -> usize { 5 }
fn default_inter_batch_delay_ms() -> u64 { 100 }
fn default_max_retries() -> u32 { 3 }

fn default_scopes() -> Vec<String> {
    vec![
        "user-library-read",
        "playlist-read-private",
        "playlist-read-collaborative",
        "playlist-modify-public",
        "playlist-modify-private",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spotify-playlist-toolbox")
}

fn default_db_path() -> PathBuf { data_dir().join("toolbox.db") }
fn default_log_dir() -> PathBuf { data_dir().join("logs") }

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Space-separated scope list as it goes into the authorization URL.
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            client_id: String::new(),
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
            auth_base: default_auth_base(),
            api_base: default_api_base(),
            page_limit: default_page_limit(),
            write_batch_size: default_write_batch_size(),
            album_concurrency: default_album_concurrency(),
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
            max_retries_on_rate_limit: default_max_retries(),
            db_path: default_db_path(),
            log_dir: default_log_dir(),
        }
    }
}
