//! The locally assembled playlist: ordered, unique by track id

use std::sync::Arc;
use tokio::sync::RwLock;

use super::notifications::NotificationCenter;
use super::types::{Severity, Track};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

/// Insertion-ordered tracks; no two entries share an id.
#[derive(Clone, Debug, Default)]
pub struct TrackList {
    tracks: Vec<Track>,
}

impl TrackList {
    pub fn add(&mut self, track: Track) -> AddOutcome {
        if self.contains(&track.id) {
            return AddOutcome::Duplicate;
        }
        self.tracks.push(track);
        AddOutcome::Added
    }

    /// Out-of-range indices leave the list untouched.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index < self.tracks.len() {
            Some(self.tracks.remove(index))
        } else {
            None
        }
    }

    /// Drop every entry whose id appears in `exported`.
    pub fn clear(&mut self, exported: &[Track]) {
        self.tracks.retain(|t| !exported.iter().any(|e| e.id == t.id));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == id)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }
}

struct Draft {
    tracks: TrackList,
    name: String,
}

/// Shared playlist draft (tracks + name) that reports each edit to the user.
#[derive(Clone)]
pub struct PlaylistCollection {
    draft: Arc<RwLock<Draft>>,
    default_name: Arc<str>,
    notifications: NotificationCenter,
}

impl PlaylistCollection {
    pub fn new(default_name: &str, notifications: NotificationCenter) -> Self {
        Self {
            draft: Arc::new(RwLock::new(Draft {
                tracks: TrackList::default(),
                name: default_name.to_string(),
            })),
            default_name: Arc::from(default_name),
            notifications,
        }
    }

    pub async fn add(&self, track: Track) -> AddOutcome {
        let name = track.name.clone();
        let outcome = self.draft.write().await.tracks.add(track);
        match outcome {
            AddOutcome::Added => {
                tracing::debug!(track = %name, "Added track to playlist");
                self.notifications
                    .show(format!("Added \"{}\" to the playlist.", name), Severity::Success)
                    .await;
            }
            AddOutcome::Duplicate => {
                self.notifications
                    .show(format!("\"{}\" is already in the playlist.", name), Severity::Warning)
                    .await;
            }
        }
        outcome
    }

    pub async fn remove(&self, index: usize) -> Option<Track> {
        let removed = self.draft.write().await.tracks.remove(index);
        match &removed {
            Some(track) => {
                tracing::debug!(index, track = %track.name, "Removed track from playlist");
                self.notifications
                    .show(format!("Removed \"{}\" from the playlist.", track.name), Severity::Info)
                    .await;
            }
            None => tracing::warn!(index, "Ignoring removal of out-of-range playlist entry"),
        }
        removed
    }

    /// Settle the draft after a successful export. Only the exported tracks
    /// are dropped and the name returns to the default only if it was the one
    /// exported; edits made while the export ran survive.
    pub async fn clear(&self, exported: &[Track], exported_name: &str) {
        let mut draft = self.draft.write().await;
        draft.tracks.clear(exported);
        if draft.name.trim() == exported_name {
            draft.name = self.default_name.to_string();
        }
    }

    pub async fn set_name(&self, name: impl Into<String>) {
        self.draft.write().await.name = name.into();
    }

    pub async fn name(&self) -> String {
        self.draft.read().await.name.clone()
    }

    pub async fn tracks(&self) -> Vec<Track> {
        self.draft.read().await.tracks.tracks().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.draft.read().await.tracks.len()
    }
}
