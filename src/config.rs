use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub redirect_uri: String,
    pub auth_endpoint: String,
    /// Where the access token is persisted between runs
    pub token_path: PathBuf,
    /// Directory for the daily log files
    pub log_dir: PathBuf,
    /// Tracks requested per search (Spotify allows 1..=50)
    pub search_limit: u32,
    pub notification_ttl: Duration,
    pub default_playlist_name: String,
    pub playlist_description: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: "5618e6d9904642caabe20dcb8772baeb".to_string(),
            redirect_uri: "http://localhost:3000".to_string(),
            auth_endpoint: "https://accounts.spotify.com/authorize".to_string(),
            token_path: PathBuf::from(".cache/token.json"),
            log_dir: PathBuf::from(".logs"),
            search_limit: 4,
            notification_ttl: Duration::from_secs(4),
            default_playlist_name: "My Playlist".to_string(),
            playlist_description: "Created with Spotify Playlist Generator".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Config::default();

        let search_limit = match lookup("SEARCH_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=50).contains(n))
                .with_context(|| format!("SEARCH_LIMIT must be between 1 and 50, got {:?}", raw))?,
            None => defaults.search_limit,
        };

        let notification_ttl = match lookup("NOTIFICATION_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .with_context(|| format!("NOTIFICATION_SECS must be a number of seconds, got {:?}", raw))?,
            None => defaults.notification_ttl,
        };

        Ok(Config {
            client_id: lookup("SPOTIFY_CLIENT_ID").unwrap_or(defaults.client_id),
            redirect_uri: lookup("SPOTIFY_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            auth_endpoint: lookup("SPOTIFY_AUTH_ENDPOINT").unwrap_or(defaults.auth_endpoint),
            token_path: lookup("TOKEN_PATH").map(PathBuf::from).unwrap_or(defaults.token_path),
            log_dir: lookup("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            search_limit,
            notification_ttl,
            default_playlist_name: lookup("DEFAULT_PLAYLIST_NAME")
                .unwrap_or(defaults.default_playlist_name),
            playlist_description: lookup("PLAYLIST_DESCRIPTION")
                .unwrap_or(defaults.playlist_description),
        })
    }
}
