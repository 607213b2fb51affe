use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::subscriber as tracing_subscriber_global;
use tracing_appender::rolling::RollingFileAppender;
use tracing_log::LogTracer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use spotify_playlist_toolbox as lib;
use lib::api::spotify::SpotifyClient;
use lib::api::{auth, Provider};
use lib::collector::{collect_artist_catalog, CollectRequest, Tuning};
use lib::config::Config;
use lib::models::AlbumGroup;
use lib::progress::ProgressSink;
use lib::shuffler::{shuffle_playlist, ApplyMode};
use lib::{library, store, util};

#[derive(Parser)]
#[command(name = "spotify-playlist-toolbox", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize with Spotify (PKCE) and store the bearer token
    Login,
    /// Forget the stored bearer token
    Logout,
    /// Search artists by name
    Search {
        query: String,

        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
    /// Collect an artist's full catalog into a new playlist
    Collect {
        /// Artist id, share URL, or spotify: URI
        #[arg(long)]
        artist: String,

        /// Comma-separated album groups: album,single,appears_on,compilation
        #[arg(long, default_value = "album,single,appears_on,compilation")]
        groups: String,

        /// Playlist name (default: "<Artist> - Complete Collection")
        #[arg(long)]
        name: Option<String>,

        /// Create the playlist as public
        #[arg(long)]
        public: bool,
    },
    /// Shuffle the track order of a playlist
    Shuffle {
        /// Playlist id, share URL, or spotify: URI
        #[arg(long)]
        playlist: String,

        /// Write the shuffled order into a new playlist instead of overwriting
        #[arg(long, value_name = "NAME")]
        into_new: Option<String>,

        /// Make the new playlist public (only with --into-new)
        #[arg(long)]
        public: bool,
    },
    /// Saved-album helpers
    Albums {
        #[command(subcommand)]
        sub: AlbumCommands,
    },
    /// List the user's playlists
    Playlists,
    /// Validate config file and exit
    ConfigValidate,
}

#[derive(Subcommand)]
enum AlbumCommands {
    /// List all saved albums
    List,
    /// Pick one saved album at random
    Pick,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Resolve config path: explicit --config overrides; otherwise prefer the
    // per-user config dir and fall back to a config.toml in the working
    // directory for local/dev usage.
    let resolved_config_path: PathBuf = match &cli.config {
        Some(p) => p.clone(),
        None => {
            let user_path = dirs::config_dir()
                .map(|d| d.join("spotify-playlist-toolbox").join("config.toml"));
            match user_path {
                Some(p) if p.exists() => p,
                _ => PathBuf::from("config.toml"),
            }
        }
    };

    let cfg = Config::from_path(&resolved_config_path)
        .with_context(|| format!("loading config from {}", resolved_config_path.display()))?;

    // Initialize log->tracing bridge and structured logging.
    // Logs go to stderr (stdout carries command output) and to a
    // daily-rotated file in cfg.log_dir.
    let _ = LogTracer::init();
    let _ = std::fs::create_dir_all(&cfg.log_dir);
    let file_appender: RollingFileAppender =
        tracing_appender::rolling::daily(&cfg.log_dir, "toolbox.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Honor RUST_LOG if set, otherwise default to warn so progress bars stay
    // readable.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer().with_writer(non_blocking);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer);

    tracing_subscriber_global::set_global_default(subscriber)
        .expect("failed to set global tracing subscriber");

    match cli.command {
        Commands::Login => {
            let conn = store::open_or_create(&cfg.db_path)?;
            auth::run_login(&conn, &cfg).await?;
        }
        Commands::Logout => {
            let conn = store::open_or_create(&cfg.db_path)?;
            auth::logout(&conn)?;
            println!("Logged out.");
        }
        Commands::ConfigValidate => match Config::from_path(&resolved_config_path) {
            Ok(_) => println!("OK"),
            Err(e) => {
                eprintln!("Config validation failed: {}", e);
                std::process::exit(2);
            }
        },
        Commands::Search { query, limit } => {
            let client = authed_client(&cfg)?;
            let artists = client.search_artists(&query, limit).await?;
            if artists.is_empty() {
                println!("No artists found.");
            }
            for a in artists {
                println!("{}  {} ({} followers)", a.id, a.name, a.followers.total);
            }
        }
        Commands::Collect {
            artist,
            groups,
            name,
            public,
        } => {
            let client = authed_client(&cfg)?;
            let tuning = Tuning::from_config(&cfg);

            let artist_id = util::parse_artist_id(&artist)
                .with_context(|| format!("could not parse an artist id from '{}'", artist))?;
            let groups = parse_groups(&groups)?;
            let artist = client
                .artist(&artist_id)
                .await
                .context("loading the artist")?;
            let playlist_name =
                name.unwrap_or_else(|| format!("{} - Complete Collection", artist.name));
            let req = CollectRequest {
                artist_id,
                groups,
                playlist_name,
                description: format!("Complete collection of {} tracks", artist.name),
                public,
            };

            let bar = CliProgress::new();
            let outcome = collect_artist_catalog(&client, &tuning, &req, &bar).await?;
            bar.finish();
            println!(
                "Created playlist {} with {} tracks from {} albums.",
                outcome.playlist_id, outcome.tracks_added, outcome.albums
            );
            println!(
                "https://open.spotify.com/playlist/{}",
                outcome.playlist_id
            );
        }
        Commands::Shuffle {
            playlist,
            into_new,
            public,
        } => {
            let client = authed_client(&cfg)?;
            let tuning = Tuning::from_config(&cfg);

            let playlist_id = util::parse_playlist_id(&playlist)
                .with_context(|| format!("could not parse a playlist id from '{}'", playlist))?;
            let mode = match into_new {
                Some(name) => ApplyMode::CreateNew { name, public },
                None => ApplyMode::Overwrite,
            };

            let bar = CliProgress::new();
            let outcome = shuffle_playlist(&client, &tuning, &playlist_id, mode, &bar).await?;
            bar.finish();
            println!(
                "Shuffled {} tracks into playlist {}.",
                outcome.tracks, outcome.playlist_id
            );
        }
        Commands::Albums { sub } => {
            let client = authed_client(&cfg)?;
            let saved = client.saved_albums().await?;
            match sub {
                AlbumCommands::List => {
                    println!("{} saved album(s):", saved.len());
                    for s in &saved {
                        println!("- {} by {}", s.album.name, artist_names(&s.album.artists));
                    }
                }
                AlbumCommands::Pick => match library::pick_random(&saved) {
                    Some(s) => {
                        println!("{} by {}", s.album.name, artist_names(&s.album.artists));
                        if let Some(url) = &s.album.external_urls.spotify {
                            println!("{}", url);
                        }
                    }
                    None => {
                        println!("No albums found in your library. Save some albums first!");
                    }
                },
            }
        }
        Commands::Playlists => {
            let client = authed_client(&cfg)?;
            let playlists = client.user_playlists().await?;
            for p in playlists {
                println!("{}  {} ({} tracks)", p.id, p.name, p.tracks.total);
            }
        }
    }

    Ok(())
}

/// Build a SpotifyClient from the stored bearer token, or explain how to get
/// one.
fn authed_client(cfg: &Config) -> Result<SpotifyClient> {
    let conn = store::open_or_create(&cfg.db_path)?;
    let token = store::load_access_token(&conn)?
        .context("not logged in; run the `login` command first")?;
    Ok(SpotifyClient::new(cfg, token))
}

fn parse_groups(s: &str) -> Result<Vec<AlbumGroup>> {
    let mut groups = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let group = part
            .parse::<AlbumGroup>()
            .map_err(|e| anyhow::anyhow!(e))?;
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    Ok(groups)
}

fn artist_names(artists: &[lib::models::ArtistRef]) -> String {
    if artists.is_empty() {
        return "unknown artist".into();
    }
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Progress bar surface for the long-running workflows.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.green} {pos:>3}% {msg}")
                .expect("static progress template"),
        );
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for CliProgress {
    fn update(&self, message: &str, percent: u8) {
        self.bar.set_position(percent as u64);
        self.bar.set_message(message.to_string());
    }
}
