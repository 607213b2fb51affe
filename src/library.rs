use rand::seq::SliceRandom;

use crate::models::SavedAlbum;

/// Uniformly random pick from the saved-album list.
pub fn pick_random(albums: &[SavedAlbum]) -> Option<&SavedAlbum> {
    albums.choose(&mut rand::thread_rng())
}
