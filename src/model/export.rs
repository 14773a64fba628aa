//! Publishing the local playlist to Spotify
//!
//! Export is three dependent remote calls with no atomic commit:
//!
//! 1. `GET /v1/me` for the owner id
//! 2. create an empty public playlist for that owner
//! 3. add the track URIs in order, at most [`MAX_URIS_PER_REQUEST`] per call
//!
//! If step 3 fails the playlist created in step 2 is removed again so a
//! retry does not leave empty duplicates behind. The local draft is only
//! cleared once every step succeeded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{ApiError, Result};
use super::notifications::NotificationCenter;
use super::playlist::PlaylistCollection;
use super::session::Session;
use super::spotify_client::CatalogApi;
use super::types::{Severity, Track};

/// Spotify accepts at most this many URIs per add-items request.
pub const MAX_URIS_PER_REQUEST: usize = 100;

/// Releases the in-flight flag on every exit path.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlight(flag.clone()))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct ExportOrchestrator {
    api: Arc<dyn CatalogApi>,
    session: Session,
    playlist: PlaylistCollection,
    notifications: NotificationCenter,
    description: String,
    loading: Arc<AtomicBool>,
}

impl ExportOrchestrator {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        session: Session,
        playlist: PlaylistCollection,
        notifications: NotificationCenter,
        description: impl Into<String>,
    ) -> Self {
        Self {
            api,
            session,
            playlist,
            notifications,
            description: description.into(),
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Export the current draft.
    pub async fn export_current(&self) {
        let name = self.playlist.name().await;
        let tracks = self.playlist.tracks().await;
        self.export_playlist(&name, &tracks).await;
    }

    pub async fn export_playlist(&self, name: &str, tracks: &[Track]) {
        let name = name.trim();
        if let Err(err) = Self::validate(name, tracks) {
            self.notifications.show(err.user_message(), err.severity()).await;
            return;
        }

        let Some(_in_flight) = InFlight::acquire(&self.loading) else {
            let err = ApiError::validation("An export is already in progress.");
            self.notifications.show(err.user_message(), err.severity()).await;
            return;
        };

        let Some(token) = self.session.token().await else {
            self.notifications
                .show("Please log in to export.", Severity::Warning)
                .await;
            return;
        };

        tracing::info!(name, count = tracks.len(), "Exporting playlist");
        match self.publish(&token, name, tracks).await {
            Ok(playlist_id) => {
                tracing::info!(%playlist_id, count = tracks.len(), "Playlist exported");
                self.playlist.clear(tracks, name).await;
                let noun = if tracks.len() == 1 { "track" } else { "tracks" };
                self.notifications
                    .show(
                        format!("Exported {} {} to \"{}\".", tracks.len(), noun, name),
                        Severity::Success,
                    )
                    .await;
            }
            Err(err) => {
                tracing::error!(name, error = %err, "Playlist export failed");
                self.notifications.report(&err, &self.session, &token).await;
            }
        }
    }

    fn validate(name: &str, tracks: &[Track]) -> Result<()> {
        if tracks.is_empty() {
            return Err(ApiError::validation("Add some tracks before exporting."));
        }
        if name.is_empty() {
            return Err(ApiError::validation("Give the playlist a name before exporting."));
        }
        Ok(())
    }

    async fn publish(&self, token: &str, name: &str, tracks: &[Track]) -> Result<String> {
        let user_id = self.api.current_user_id(token).await?;
        let playlist_id = self
            .api
            .create_playlist(token, &user_id, name, &self.description, true)
            .await?;

        let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
        if let Err(err) = self.populate(token, &playlist_id, &uris).await {
            self.roll_back(token, &playlist_id, &err).await;
            return Err(err);
        }
        Ok(playlist_id)
    }

    async fn populate(&self, token: &str, playlist_id: &str, uris: &[String]) -> Result<()> {
        for chunk in uris.chunks(MAX_URIS_PER_REQUEST) {
            self.api.add_tracks(token, playlist_id, chunk).await?;
        }
        Ok(())
    }

    async fn roll_back(&self, token: &str, playlist_id: &str, cause: &ApiError) {
        if cause.is_auth() {
            tracing::warn!(playlist_id, "Token rejected, leaving empty playlist in place");
            return;
        }
        match self.api.remove_playlist(token, playlist_id).await {
            Ok(()) => tracing::info!(playlist_id, "Removed partially exported playlist"),
            Err(e) => {
                tracing::warn!(playlist_id, error = %e, "Could not remove partially exported playlist")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::session::RedirectFragment;
    use crate::model::spotify_client::fake::{Call, FakeCatalog};
    use crate::model::types::track;
    use std::time::Duration;

    struct Harness {
        export: ExportOrchestrator,
        api: Arc<FakeCatalog>,
        session: Session,
        playlist: PlaylistCollection,
        notifications: NotificationCenter,
    }

    async fn harness(track_ids: &[&str]) -> Harness {
        let api = FakeCatalog::new();
        let (session, _store) = Session::authenticated("tok").await;
        let notifications = NotificationCenter::new(Duration::from_secs(4));
        let playlist = PlaylistCollection::new("My Playlist", notifications.clone());
        for id in track_ids {
            playlist.add(track(id)).await;
        }
        playlist.set_name("Road trip").await;
        let export = ExportOrchestrator::new(
            api.clone(),
            session.clone(),
            playlist.clone(),
            notifications.clone(),
            "Created with Spotify Playlist Generator",
        );
        Harness { export, api, session, playlist, notifications }
    }

    #[tokio::test]
    async fn test_successful_export_runs_three_steps_and_clears() {
        let h = harness(&["a", "b"]).await;
        h.api.on_me(Ok("alice".into()));
        h.api.on_create(Ok("pl-9".into()));

        h.export.export_current().await;

        assert_eq!(
            h.api.calls(),
            vec![
                Call::Me,
                Call::Create {
                    user_id: "alice".into(),
                    name: "Road trip".into(),
                    description: "Created with Spotify Playlist Generator".into(),
                    public: true,
                },
                Call::Add {
                    playlist_id: "pl-9".into(),
                    uris: vec!["spotify:track:a".into(), "spotify:track:b".into()],
                },
            ]
        );
        assert!(h.api.tokens().iter().all(|t| t == "tok"));
        assert_eq!(h.playlist.len().await, 0);
        assert_eq!(h.playlist.name().await, "My Playlist");
        let note = h.notifications.current().await.unwrap();
        assert_eq!(note.severity, Severity::Success);
        assert!(note.text.contains("2 tracks"));
        assert!(!h.export.is_loading());
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_calls() {
        let h = harness(&["a"]).await;

        h.export.export_playlist("Road trip", &[]).await;
        let note = h.notifications.current().await.unwrap();
        assert_eq!(note.severity, Severity::Warning);
        assert!(note.text.contains("Add some tracks"));

        h.export.export_playlist("   ", &[track("a")]).await;
        assert!(h.notifications.current().await.unwrap().text.contains("name"));

        assert!(h.api.calls().is_empty());
        assert_eq!(h.playlist.len().await, 1);
    }

    #[tokio::test]
    async fn test_populate_failure_rolls_back_and_keeps_draft() {
        let h = harness(&["a", "b"]).await;
        h.api.on_create(Ok("pl-1".into()));
        h.api.on_add(Err(ApiError::Transport("500".into())));

        h.export.export_current().await;

        assert_eq!(
            h.api.calls().last(),
            Some(&Call::Remove { playlist_id: "pl-1".into() })
        );
        assert_eq!(h.playlist.len().await, 2);
        assert_eq!(h.playlist.name().await, "Road trip");
        assert!(h.session.is_authenticated().await);
        let note = h.notifications.current().await.unwrap();
        assert_eq!(note.severity, Severity::Error);
        assert!(note.text.contains("try again"));
    }

    #[tokio::test]
    async fn test_failed_rollback_still_reports_populate_failure() {
        let h = harness(&["a"]).await;
        h.api.on_add(Err(ApiError::Transport("timeout".into())));
        h.api.on_remove(Err(ApiError::Transport("timeout".into())));

        h.export.export_current().await;

        assert!(h.notifications.current().await.unwrap().text.contains("try again"));
        assert_eq!(h.playlist.len().await, 1);
    }

    #[tokio::test]
    async fn test_auth_failure_at_any_step_logs_out() {
        for step in 0..3 {
            let h = harness(&["a"]).await;
            match step {
                0 => h.api.on_me(Err(ApiError::Auth)),
                1 => h.api.on_create(Err(ApiError::Auth)),
                _ => h.api.on_add(Err(ApiError::Auth)),
            }

            h.export.export_current().await;

            assert!(!h.session.is_authenticated().await, "step {}", step);
            assert!(h.notifications.current().await.unwrap().text.contains("Session expired"));
            assert_eq!(h.playlist.len().await, 1);
            assert!(!h.api.calls().iter().any(|c| matches!(c, Call::Remove { .. })));
        }
    }

    #[tokio::test]
    async fn test_permission_failure_keeps_session() {
        let h = harness(&["a"]).await;
        h.api.on_create(Err(ApiError::Permission));

        h.export.export_current().await;

        assert!(h.session.is_authenticated().await);
        assert_eq!(h.api.calls().len(), 2);
        let note = h.notifications.current().await.unwrap();
        assert_eq!(note.severity, Severity::Error);
        assert!(note.text.contains("permissions"));
    }

    #[tokio::test]
    async fn test_large_playlists_are_added_in_batches() {
        let ids: Vec<String> = (0..230).map(|i| format!("t{}", i)).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let h = harness(&refs).await;

        h.export.export_current().await;

        let batches: Vec<Vec<String>> = h
            .api
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Add { uris, .. } => Some(uris),
                _ => None,
            })
            .collect();
        assert_eq!(batches.iter().map(Vec::len).collect::<Vec<_>>(), vec![100, 100, 30]);
        assert_eq!(batches[0][0], "spotify:track:t0");
        assert_eq!(batches[2][29], "spotify:track:t229");
    }

    #[tokio::test]
    async fn test_second_export_rejected_while_in_flight() {
        let h = harness(&["a"]).await;
        let _held = InFlight::acquire(&h.export.loading).unwrap();
        assert!(h.export.is_loading());

        h.export.export_current().await;

        assert!(h.api.calls().is_empty());
        assert!(h.notifications.current().await.unwrap().text.contains("already in progress"));
        assert_eq!(h.playlist.len().await, 1);
    }

    #[tokio::test]
    async fn test_single_track_message_is_singular() {
        let h = harness(&["a"]).await;
        h.export.export_current().await;
        let note = h.notifications.current().await.unwrap();
        assert_eq!(note.text, "Exported 1 track to \"Road trip\".");
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_made_during_export_survive() {
        let h = harness(&["a"]).await;
        h.api.delay_me(Duration::from_secs(1));

        let running = {
            let export = h.export.clone();
            tokio::spawn(async move { export.export_current().await })
        };
        tokio::task::yield_now().await;
        assert!(h.export.is_loading());

        h.playlist.add(track("b")).await;
        h.playlist.set_name("Night drive").await;
        running.await.unwrap();

        let exported: Vec<Call> = h
            .api
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Add { .. }))
            .collect();
        assert_eq!(
            exported,
            vec![Call::Add { playlist_id: "playlist-1".into(), uris: vec!["spotify:track:a".into()] }]
        );
        let ids: Vec<String> = h.playlist.tracks().await.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(h.playlist.name().await, "Night drive");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_old_token_keeps_newer_login() {
        let h = harness(&["a"]).await;
        h.api.delay_me(Duration::from_secs(1));
        h.api.on_me(Err(ApiError::Auth));

        let running = {
            let export = h.export.clone();
            tokio::spawn(async move { export.export_current().await })
        };
        tokio::task::yield_now().await;

        h.session.invalidate().await;
        assert!(h.session.capture(&mut RedirectFragment::from_redirect("#access_token=fresh")).await);
        running.await.unwrap();

        assert_eq!(h.session.token().await.as_deref(), Some("fresh"));
        assert!(h.notifications.current().await.unwrap().text.contains("Session expired"));
    }

    #[test]
    fn test_in_flight_guard_releases_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        {
            let _guard = InFlight::acquire(&flag).unwrap();
            assert!(InFlight::acquire(&flag).is_none());
        }
        assert!(InFlight::acquire(&flag).is_some());
    }
}
