use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::http::{send_with_retry, RetryPolicy};
use crate::error::FetchError;
use crate::models::Page;

/// Fetch every item behind a paginated listing, following `next` links until
/// the server stops supplying one. Items accumulate in server order; each
/// page is requested exactly once. The first non-success response aborts the
/// whole walk and the partial accumulation is discarded with it.
pub async fn fetch_all<T: DeserializeOwned>(
    client: &Client,
    policy: &RetryPolicy,
    seed_url: &str,
    token: &str,
) -> Result<Vec<T>, FetchError> {
    let bearer = format!("Bearer {}", token);
    let mut items: Vec<T> = Vec::new();
    let mut next: Option<String> = Some(seed_url.to_string());

    while let Some(url) = next {
        let resp = send_with_retry(policy, || {
            client.get(&url).header(AUTHORIZATION, &bearer)
        })
        .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpError(status.as_u16()));
        }
        let page: Page<T> = resp.json().await?;
        items.extend(page.items);
        next = page.next;
    }

    Ok(items)
}
