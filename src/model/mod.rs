//! Model module - Application state and the playlist-building core
//!
//! - `types`: Core type definitions (tracks, notifications, UI state)
//! - `session`: Bearer token capture, persistence and invalidation
//! - `notifications`: The single timed user-facing message
//! - `spotify_client`: Spotify API seam and its rspotify implementation
//! - `search`: Catalog search and the latest result page
//! - `playlist`: The local, deduplicated playlist draft
//! - `export`: Publishing the draft to Spotify
//! - `app_model`: Main application model wiring the pieces together

mod types;
mod session;
mod notifications;
mod spotify_client;
mod search;
mod playlist;
mod export;
mod app_model;

pub use types::{ActiveSection, Notification, Prompt, Severity, Track};

pub use session::{FileTokenStore, RedirectFragment};

pub use spotify_client::SpotifyClient;

pub use app_model::{AppModel, AppSnapshot};

#[cfg(test)]
pub(crate) use session::MemoryTokenStore;
#[cfg(test)]
pub(crate) use spotify_client::fake;
#[cfg(test)]
pub(crate) use types::track;
