use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use super::Provider;
use crate::error::{FetchError, WriteError};
use crate::models::{Album, AlbumGroup, Artist, Playlist, SavedAlbum, Track};

/// An in-memory provider used by tests. Reads serve scripted data; writes
/// are recorded for inspection.
#[derive(Default)]
pub struct MockProvider {
    pub user_id: String,
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    pub album_tracks: HashMap<String, Vec<Track>>,
    pub saved: Vec<SavedAlbum>,
    pub playlists: Vec<Playlist>,
    pub playlist_tracks: HashMap<String, Vec<Track>>,
    /// When set, add_tracks fails on the (1-based) nth call.
    pub fail_add_on_call: Option<usize>,
    pub writes: Mutex<RecordedWrites>,
}

#[derive(Default)]
pub struct RecordedWrites {
    /// (user_id, name) per created playlist.
    pub created: Vec<(String, String)>,
    pub ops: Vec<WriteOp>,
    pub add_calls: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Replace {
        playlist_id: String,
        uris: Vec<String>,
    },
    Add {
        playlist_id: String,
        uris: Vec<String>,
    },
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn current_user_id(&self) -> Result<String, FetchError> {
        Ok(self.user_id.clone())
    }

    async fn artist(&self, artist_id: &str) -> Result<Artist, FetchError> {
        self.artists
            .iter()
            .find(|a| a.id == artist_id)
            .cloned()
            .ok_or(FetchError::HttpError(404))
    }

    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<Artist>, FetchError> {
        let q = query.to_lowercase();
        Ok(self
            .artists
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&q))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn artist_albums(
        &self,
        _artist_id: &str,
        groups: &[AlbumGroup],
    ) -> Result<Vec<Album>, FetchError> {
        Ok(self
            .albums
            .iter()
            .filter(|al| al.album_group.map(|g| groups.contains(&g)).unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>, FetchError> {
        Ok(self.album_tracks.get(album_id).cloned().unwrap_or_default())
    }

    async fn saved_albums(&self) -> Result<Vec<SavedAlbum>, FetchError> {
        Ok(self.saved.clone())
    }

    async fn user_playlists(&self) -> Result<Vec<Playlist>, FetchError> {
        Ok(self.playlists.clone())
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, FetchError> {
        Ok(self
            .playlist_tracks
            .get(playlist_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        _description: &str,
        _public: bool,
    ) -> Result<String, WriteError> {
        info!("MockProvider: create_playlist {} for {}", name, user_id);
        let mut w = self.writes.lock().unwrap();
        w.created.push((user_id.to_string(), name.to_string()));
        Ok(format!("mock-playlist-{}", w.created.len()))
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), WriteError> {
        let mut w = self.writes.lock().unwrap();
        w.add_calls += 1;
        if self.fail_add_on_call == Some(w.add_calls) {
            return Err(WriteError::HttpError(500));
        }
        info!(
            "MockProvider: add_tracks {} -> {} tracks",
            playlist_id,
            uris.len()
        );
        w.ops.push(WriteOp::Add {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
        });
        Ok(())
    }

    async fn replace_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), WriteError> {
        info!(
            "MockProvider: replace_tracks {} -> {} tracks",
            playlist_id,
            uris.len()
        );
        let mut w = self.writes.lock().unwrap();
        w.ops.push(WriteOp::Replace {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
        });
        Ok(())
    }
}
