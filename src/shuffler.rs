use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;
use rand::seq::SliceRandom;

use crate::api::Provider;
use crate::batch::{replace_all, write_batches};
use crate::collector::Tuning;
use crate::error::ValidationError;
use crate::progress::ProgressSink;

/// Where the shuffled order ends up.
pub enum ApplyMode {
    /// Rewrite the source playlist in place.
    Overwrite,
    /// Leave the source untouched and write into a brand-new playlist.
    CreateNew { name: String, public: bool },
}

#[derive(Debug)]
pub struct ShuffleOutcome {
    pub playlist_id: String,
    pub tracks: usize,
}

/// Load a playlist, shuffle its track order, and write the result back,
/// either in place or into a new playlist.
pub async fn shuffle_playlist(
    provider: &dyn Provider,
    tuning: &Tuning,
    playlist_id: &str,
    mode: ApplyMode,
    progress: &dyn ProgressSink,
) -> anyhow::Result<ShuffleOutcome> {
    if let ApplyMode::CreateNew { name, .. } = &mode {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyPlaylistName.into());
        }
    }

    progress.update("Loading tracks...", 10);
    let tracks = provider.playlist_tracks(playlist_id).await?;
    let mut uris: Vec<String> = tracks.into_iter().filter_map(|t| t.uri).collect();
    if uris.is_empty() {
        anyhow::bail!("playlist has no playable tracks to shuffle");
    }
    progress.update(&format!("Loaded {} tracks", uris.len()), 40);

    uris.shuffle(&mut rand::thread_rng());
    progress.update("Shuffled track order", 50);

    let total = uris.len();
    match mode {
        ApplyMode::Overwrite => {
            progress.update("Overwriting playlist...", 60);
            replace_all(
                provider,
                playlist_id,
                &uris,
                tuning.write_batch_size,
                tuning.inter_batch_delay,
            )
            .await?;
            info!("overwrote playlist {} with {} tracks", playlist_id, total);
            progress.update("Playlist overwritten", 100);
            Ok(ShuffleOutcome {
                playlist_id: playlist_id.to_string(),
                tracks: total,
            })
        }
        ApplyMode::CreateNew { name, public } => {
            progress.update("Creating playlist...", 60);
            let user_id = provider.current_user_id().await?;
            let created = provider
                .create_playlist(
                    &user_id,
                    name.trim(),
                    "Shuffled with spotify-playlist-toolbox",
                    public,
                )
                .await?;

            let written = AtomicUsize::new(0);
            write_batches(&uris, tuning.write_batch_size, tuning.inter_batch_delay, |batch| {
                let written = &written;
                let created = created.as_str();
                async move {
                    provider.add_tracks(created, &batch).await?;
                    let done = written.fetch_add(batch.len(), Ordering::Relaxed) + batch.len();
                    let pct = (60 + done * 40 / total).min(100) as u8;
                    progress.update(&format!("Adding tracks... ({}/{})", done, total), pct);
                    Ok(())
                }
            })
            .await?;

            info!("created shuffled playlist {} with {} tracks", created, total);
            progress.update("Playlist created", 100);
            Ok(ShuffleOutcome {
                playlist_id: created,
                tracks: total,
            })
        }
    }
}
