use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::try_join_all;
use log::info;
use tokio::time::sleep;

use crate::api::Provider;
use crate::batch::write_batches;
use crate::config::Config;
use crate::dedupe::dedupe_tracks;
use crate::error::{FetchError, ValidationError};
use crate::models::{Album, AlbumGroup, Track};
use crate::progress::ProgressSink;

/// Tuning knobs shared by the long-running workflows. The defaults are
/// values the remote API tolerates well, not contractual requirements.
#[derive(Debug, Clone)]
pub struct Tuning {
    pub write_batch_size: usize,
    pub album_concurrency: usize,
    pub inter_batch_delay: Duration,
}

impl Tuning {
    pub fn from_config(cfg: &Config) -> Self {
        Tuning {
            write_batch_size: cfg.write_batch_size,
            album_concurrency: cfg.album_concurrency,
            inter_batch_delay: Duration::from_millis(cfg.inter_batch_delay_ms),
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            write_batch_size: 100,
            album_concurrency: 5,
            inter_batch_delay: Duration::from_millis(100),
        }
    }
}

pub struct CollectRequest {
    pub artist_id: String,
    /// Album groups to include; an empty selection is a user error, never
    /// treated as "all".
    pub groups: Vec<AlbumGroup>,
    pub playlist_name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug)]
pub struct CollectOutcome {
    pub playlist_id: String,
    pub albums: usize,
    pub tracks_added: usize,
}

/// End-to-end "collect an artist's catalog into a playlist" workflow:
/// fetch matching albums, gather their tracks (appears_on filtered),
/// dedupe, create the playlist, write the URIs in batches.
///
/// Any stage failure aborts the remaining stages. A playlist created before
/// a later stage failed is left in place; nothing is rolled back.
pub async fn collect_artist_catalog(
    provider: &dyn Provider,
    tuning: &Tuning,
    req: &CollectRequest,
    progress: &dyn ProgressSink,
) -> anyhow::Result<CollectOutcome> {
    if req.groups.is_empty() {
        return Err(ValidationError::NoAlbumGroups.into());
    }
    let name = req.playlist_name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyPlaylistName.into());
    }

    progress.update("Fetching albums...", 10);
    let albums = provider.artist_albums(&req.artist_id, &req.groups).await?;
    if albums.is_empty() {
        anyhow::bail!("no albums found for this artist with the selected groups");
    }
    info!(
        "collecting tracks from {} albums for artist {}",
        albums.len(),
        req.artist_id
    );

    let tracks =
        fetch_tracks_from_albums(provider, tuning, &req.artist_id, &albums, progress).await?;
    if tracks.is_empty() {
        anyhow::bail!("no tracks found on the matched albums");
    }

    progress.update("Removing duplicates...", 70);
    let unique = dedupe_tracks(tracks);

    progress.update("Creating playlist...", 80);
    let user_id = provider.current_user_id().await?;
    let playlist_id = provider
        .create_playlist(&user_id, name, &req.description, req.public)
        .await?;

    let uris: Vec<String> = unique.into_iter().filter_map(|t| t.uri).collect();
    let total = uris.len();
    progress.update("Adding tracks to playlist...", 90);

    let written = AtomicUsize::new(0);
    write_batches(&uris, tuning.write_batch_size, tuning.inter_batch_delay, |batch| {
        let written = &written;
        let playlist_id = playlist_id.as_str();
        async move {
            provider.add_tracks(playlist_id, &batch).await?;
            let done = written.fetch_add(batch.len(), Ordering::Relaxed) + batch.len();
            let pct = (90 + done * 10 / total).min(100) as u8;
            progress.update(
                &format!("Adding tracks to playlist... ({}/{})", done, total),
                pct,
            );
            Ok(())
        }
    })
    .await?;

    progress.update(&format!("Added {} tracks to playlist", total), 100);
    info!("created playlist {} with {} tracks", playlist_id, total);

    Ok(CollectOutcome {
        playlist_id,
        albums: albums.len(),
        tracks_added: total,
    })
}

/// Fetch each album's tracks in bounded concurrent batches (join barrier per
/// batch, short pause between batches). Tracks on an appears_on album are
/// kept only when the target artist is credited on them; all other groups
/// keep every track.
async fn fetch_tracks_from_albums(
    provider: &dyn Provider,
    tuning: &Tuning,
    artist_id: &str,
    albums: &[Album],
    progress: &dyn ProgressSink,
) -> anyhow::Result<Vec<Track>> {
    let concurrency = tuning.album_concurrency.max(1);
    let total = albums.len();
    let mut tracks: Vec<Track> = Vec::new();
    let mut processed = 0usize;

    for batch in albums.chunks(concurrency) {
        let fetches = batch.iter().map(|album| async move {
            let album_tracks = provider.album_tracks(&album.id).await?;
            Ok::<(&Album, Vec<Track>), FetchError>((album, album_tracks))
        });
        let results = try_join_all(fetches).await?;

        for (album, album_tracks) in results {
            if album.album_group == Some(AlbumGroup::AppearsOn) {
                tracks.extend(album_tracks.into_iter().filter(|t| t.credits(artist_id)));
            } else {
                tracks.extend(album_tracks);
            }
        }

        processed += batch.len();
        let pct = (30 + processed * 40 / total) as u8;
        progress.update(
            &format!(
                "Collecting tracks from {} albums... ({}/{})",
                total, processed, total
            ),
            pct,
        );

        if processed < total {
            sleep(tuning.inter_batch_delay).await;
        }
    }

    Ok(tracks)
}
