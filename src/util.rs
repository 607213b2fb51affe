use once_cell::sync::Lazy;
use regex::Regex;

// Share-link formats accepted here:
//   spotify:artist:<id>
//   https://open.spotify.com/artist/<id>
//   https://open.spotify.com/intl-es/artist/<id>
//   bare 22-character id
static ARTIST_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"spotify:artist:([A-Za-z0-9]+)").unwrap(),
        Regex::new(r"open\.spotify\.com/(?:intl-[a-z]{2}/)?artist/([A-Za-z0-9]+)").unwrap(),
    ]
});

static PLAYLIST_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"spotify:playlist:([A-Za-z0-9]+)").unwrap(),
        Regex::new(r"open\.spotify\.com/(?:intl-[a-z]{2}/)?playlist/([A-Za-z0-9]+)").unwrap(),
    ]
});

static BARE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{22}$").unwrap());

fn parse_id(patterns: &[Regex], input: &str) -> Option<String> {
    for re in patterns {
        if let Some(caps) = re.captures(input) {
            return Some(caps[1].to_string());
        }
    }
    if BARE_ID.is_match(input) {
        return Some(input.to_string());
    }
    None
}

/// Extract an artist id from a share URL, a spotify: URI, or a bare id.
pub fn parse_artist_id(input: &str) -> Option<String> {
    parse_id(&ARTIST_PATTERNS[..], input.trim())
}

/// Extract a playlist id from a share URL, a spotify: URI, or a bare id.
pub fn parse_playlist_id(input: &str) -> Option<String> {
    parse_id(&PLAYLIST_PATTERNS[..], input.trim())
}
