//! Core type definitions for the application

use std::time::Duration;
use tokio::time::Instant;

/// A track from the catalog. Immutable once fetched; the playlist holds its
/// own copies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub images: Vec<String>,
    pub uri: String,
}

impl Track {
    pub fn artist_line(&self) -> String {
        if self.artists.is_empty() {
            "Unknown artist".to_string()
        } else {
            self.artists.join(", ")
        }
    }
}

/// Severity tag of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Success => "Success",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Info => "Info",
        }
    }
}

/// The single user-facing message currently on screen
#[derive(Clone, Debug)]
pub struct Notification {
    pub text: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

impl Notification {
    /// Time left before the message clears itself.
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Results,
    Playlist,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Results,
            ActiveSection::Results => ActiveSection::Playlist,
            ActiveSection::Playlist => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Playlist,
            ActiveSection::Results => ActiveSection::Search,
            ActiveSection::Playlist => ActiveSection::Results,
        }
    }
}

/// Text prompts that capture the keyboard while open
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    Login,
    PlaylistName,
}

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub result_selected: usize,
    pub playlist_selected: usize,
    pub prompt: Option<Prompt>,
    pub prompt_input: String,
    pub show_help_popup: bool,
    pub should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Search,
            search_query: String::new(),
            result_selected: 0,
            playlist_selected: 0,
            prompt: None,
            prompt_input: String::new(),
            show_help_popup: false,
            should_quit: false,
        }
    }
}

#[cfg(test)]
pub(crate) fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Song {}", id),
        artists: vec![format!("Artist {}", id)],
        images: vec![],
        uri: format!("spotify:track:{}", id),
    }
}
