use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::api::Provider;
use crate::error::WriteError;

/// Issue `items` in consecutive chunks of at most `batch_size`, strictly in
/// order and never concurrently, so the destination ends up in input order.
/// The first failing chunk aborts the remainder and surfaces its error;
/// chunks already issued stay applied (no rollback). `pace` is slept between
/// chunks, not after the last, purely to ease rate-limit pressure.
pub async fn write_batches<F, Fut>(
    items: &[String],
    batch_size: usize,
    pace: Duration,
    mut issue: F,
) -> Result<(), WriteError>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = Result<(), WriteError>>,
{
    let batch_size = batch_size.max(1);
    let mut sent = 0usize;
    for chunk in items.chunks(batch_size) {
        issue(chunk.to_vec()).await?;
        sent += chunk.len();
        if sent < items.len() {
            sleep(pace).await;
        }
    }
    Ok(())
}

/// Replace a playlist's full contents with `uris`. The first chunk goes out
/// with replace semantics and clears whatever the playlist held, so it must
/// land before any append; the remainder is appended in order.
pub async fn replace_all(
    provider: &dyn Provider,
    playlist_id: &str,
    uris: &[String],
    batch_size: usize,
    pace: Duration,
) -> Result<(), WriteError> {
    let batch_size = batch_size.max(1);
    let head_len = uris.len().min(batch_size);
    let (head, rest) = uris.split_at(head_len);

    provider.replace_tracks(playlist_id, head).await?;

    if !rest.is_empty() {
        sleep(pace).await;
        write_batches(rest, batch_size, pace, |batch| async move {
            provider.add_tracks(playlist_id, &batch).await
        })
        .await?;
    }
    Ok(())
}
