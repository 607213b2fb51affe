use std::collections::HashSet;

use crate::models::Track;

/// Drop tracks whose identity key (lowercased name + first artist) was seen
/// before, keeping the first occurrence in its original position. Single
/// left-to-right pass, O(n) time and auxiliary space.
pub fn dedupe_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen: HashSet<String> = HashSet::with_capacity(tracks.len());
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.identity_key()))
        .collect()
}
