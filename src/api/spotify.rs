use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::json;

use super::fetch::fetch_all;
use super::http::{send_with_retry, RetryPolicy};
use super::Provider;
use crate::config::Config;
use crate::error::{FetchError, WriteError};
use crate::models::{Album, AlbumGroup, Artist, Page, Playlist, PlaylistItem, SavedAlbum, Track};

/// Spotify Web API client over a stored bearer token.
///
/// Every read goes through the paginated fetcher and every call through the
/// rate-limit-aware invoker. The token is opaque: no refresh is attempted, a
/// 401 simply surfaces as an HTTP error and the user logs in again.
pub struct SpotifyClient {
    client: Client,
    api_base: String,
    token: String,
    policy: RetryPolicy,
    page_limit: u32,
}

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

impl SpotifyClient {
    pub fn new(cfg: &Config, token: String) -> Self {
        Self {
            client: Client::new(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            token,
            policy: RetryPolicy::from_max_attempts(cfg.max_retries_on_rate_limit),
            page_limit: cfg.page_limit,
        }
    }

    /// Override the retry policy (tests substitute a zero backoff).
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    async fn get_typed<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let bearer = self.bearer();
        let resp = send_with_retry(&self.policy, || {
            self.client.get(url).header(AUTHORIZATION, &bearer)
        })
        .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpError(status.as_u16()));
        }
        Ok(resp.json().await?)
    }

    async fn send_write(
        &self,
        method: Method,
        url: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, WriteError> {
        let bearer = self.bearer();
        let resp = send_with_retry(&self.policy, || {
            self.client
                .request(method.clone(), url)
                .header(AUTHORIZATION, &bearer)
                .header(CONTENT_TYPE, "application/json")
                .json(&body)
        })
        .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(WriteError::HttpError(status.as_u16()));
        }
        Ok(resp)
    }
}

#[async_trait]
impl Provider for SpotifyClient {
    fn name(&self) -> &str {
        "spotify"
    }

    async fn current_user_id(&self) -> Result<String, FetchError> {
        let me: IdOnly = self.get_typed(&format!("{}/me", self.api_base)).await?;
        Ok(me.id)
    }

    async fn artist(&self, artist_id: &str) -> Result<Artist, FetchError> {
        self.get_typed(&format!("{}/artists/{}", self.api_base, artist_id))
            .await
    }

    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<Artist>, FetchError> {
        #[derive(Deserialize)]
        struct SearchResponse {
            artists: Page<Artist>,
        }

        let url = format!(
            "{}/search?q={}&type=artist&limit={}",
            self.api_base,
            urlencoding::encode(query),
            limit
        );
        let resp: SearchResponse = self.get_typed(&url).await?;
        Ok(resp.artists.items)
    }

    async fn artist_albums(
        &self,
        artist_id: &str,
        groups: &[AlbumGroup],
    ) -> Result<Vec<Album>, FetchError> {
        let include = groups
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/artists/{}/albums?include_groups={}&limit={}",
            self.api_base, artist_id, include, self.page_limit
        );
        fetch_all(&self.client, &self.policy, &url, &self.token).await
    }

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>, FetchError> {
        let url = format!(
            "{}/albums/{}/tracks?limit={}",
            self.api_base, album_id, self.page_limit
        );
        fetch_all(&self.client, &self.policy, &url, &self.token).await
    }

    async fn saved_albums(&self) -> Result<Vec<SavedAlbum>, FetchError> {
        let url = format!("{}/me/albums?limit={}", self.api_base, self.page_limit);
        fetch_all(&self.client, &self.policy, &url, &self.token).await
    }

    async fn user_playlists(&self) -> Result<Vec<Playlist>, FetchError> {
        let url = format!("{}/me/playlists?limit={}", self.api_base, self.page_limit);
        fetch_all(&self.client, &self.policy, &url, &self.token).await
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, FetchError> {
        let url = format!(
            "{}/playlists/{}/tracks?limit={}",
            self.api_base, playlist_id, self.page_limit
        );
        let items: Vec<PlaylistItem> =
            fetch_all(&self.client, &self.policy, &url, &self.token).await?;
        Ok(items.into_iter().filter_map(|it| it.track).collect())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<String, WriteError> {
        let url = format!(
            "{}/users/{}/playlists",
            self.api_base,
            url::form_urlencoded::byte_serialize(user_id.as_bytes()).collect::<String>()
        );
        let body = json!({
            "name": name,
            "description": description,
            "public": public
        });
        let resp = self.send_write(Method::POST, &url, body).await?;
        let created: IdOnly = resp.json().await?;
        Ok(created.id)
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), WriteError> {
        let url = format!("{}/playlists/{}/tracks", self.api_base, playlist_id);
        self.send_write(Method::POST, &url, json!({ "uris": uris }))
            .await?;
        Ok(())
    }

    async fn replace_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), WriteError> {
        let url = format!("{}/playlists/{}/tracks", self.api_base, playlist_id);
        self.send_write(Method::PUT, &url, json!({ "uris": uris }))
            .await?;
        Ok(())
    }
}
