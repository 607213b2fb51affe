use serde::Deserialize;

/// One page of a paginated listing: the items plus the absolute URL of the
/// next page. A missing `next` ends the walk.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Release-type tag the API attaches to an artist's albums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumGroup {
    Album,
    Single,
    AppearsOn,
    Compilation,
}

impl AlbumGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumGroup::Album => "album",
            AlbumGroup::Single => "single",
            AlbumGroup::AppearsOn => "appears_on",
            AlbumGroup::Compilation => "compilation",
        }
    }
}

impl std::fmt::Display for AlbumGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlbumGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "album" => Ok(AlbumGroup::Album),
            "single" => Ok(AlbumGroup::Single),
            "appears_on" => Ok(AlbumGroup::AppearsOn),
            "compilation" => Ok(AlbumGroup::Compilation),
            other => Err(format!("unknown album group '{}'", other)),
        }
    }
}

/// Artist credit as embedded in tracks and albums.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Full artist object as returned by search and /artists/{id}.
#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub followers: Followers,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

/// Album as listed under /artists/{id}/albums. `album_group` reflects the
/// relationship to the queried artist and is absent on other album listings.
#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub album_group: Option<AlbumGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

impl Track {
    /// Derived identity used for de-duplication: lowercased track name plus
    /// lowercased first-artist name. Missing fields contribute empty
    /// components rather than failing.
    pub fn identity_key(&self) -> String {
        let artist = self
            .artists
            .first()
            .map(|a| a.name.to_lowercase())
            .unwrap_or_default();
        format!("{}-{}", self.name.to_lowercase(), artist)
    }

    /// True if the given artist id appears in this track's credits.
    pub fn credits(&self, artist_id: &str) -> bool {
        self.artists.iter().any(|a| a.id == artist_id)
    }
}

/// Item shape of the playlist-tracks listing. The nested track may be null
/// for removed or otherwise unavailable entries.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tracks: TrackTotals,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackTotals {
    #[serde(default)]
    pub total: u64,
}

/// Item shape of the saved-albums listing (/me/albums).
#[derive(Debug, Clone, Deserialize)]
pub struct SavedAlbum {
    pub album: AlbumInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}
