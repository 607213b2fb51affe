pub mod auth;
pub mod fetch;
pub mod http;
pub mod mock;
pub mod pkce;
pub mod spotify;

use async_trait::async_trait;

use crate::error::{FetchError, WriteError};
use crate::models::{Album, AlbumGroup, Artist, Playlist, SavedAlbum, Track};

/// Provider trait: the minimal set of remote operations the workflows need.
/// Implementations: spotify::SpotifyClient, and mock::MockProvider for tests.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Return the provider's name (for logging, UI, etc)
    fn name(&self) -> &str;

    /// Id of the user the bearer token belongs to.
    async fn current_user_id(&self) -> Result<String, FetchError>;

    async fn artist(&self, artist_id: &str) -> Result<Artist, FetchError>;

    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<Artist>, FetchError>;

    /// All albums of an artist restricted to the given groups, fully paginated.
    async fn artist_albums(
        &self,
        artist_id: &str,
        groups: &[AlbumGroup],
    ) -> Result<Vec<Album>, FetchError>;

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>, FetchError>;

    async fn saved_albums(&self) -> Result<Vec<SavedAlbum>, FetchError>;

    async fn user_playlists(&self) -> Result<Vec<Playlist>, FetchError>;

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, FetchError>;

    /// Create a playlist owned by `user_id` and return the remote playlist id.
    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<String, WriteError>;

    /// Append tracks (URIs) to a playlist (batching done by caller, max 100)
    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), WriteError>;

    /// Replace the playlist's entire contents with the given URIs (max 100).
    /// Anything the playlist held before is gone afterwards.
    async fn replace_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), WriteError>;
}
