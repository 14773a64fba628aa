//! Main application model with state management

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use super::export::ExportOrchestrator;
use super::notifications::NotificationCenter;
use super::playlist::PlaylistCollection;
use super::search::CatalogSearch;
use super::session::{Session, TokenStore};
use super::spotify_client::CatalogApi;
use super::types::{ActiveSection, Notification, Prompt, Track, UiState};

/// Everything the view needs for one frame
#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub authenticated: bool,
    pub authorize_url: String,
    pub results: Vec<Track>,
    pub playlist: Vec<Track>,
    pub playlist_name: String,
    pub loading: bool,
    pub notification: Option<Notification>,
    pub ui: UiState,
}

/// Main application model. Cloned handles share all state.
#[derive(Clone)]
pub struct AppModel {
    pub session: Session,
    pub notifications: NotificationCenter,
    pub search: CatalogSearch,
    pub playlist: PlaylistCollection,
    pub export: ExportOrchestrator,
    ui_state: Arc<Mutex<UiState>>,
    authorize_url: Arc<str>,
}

impl AppModel {
    pub fn new(config: &Config, api: Arc<dyn CatalogApi>, store: Arc<dyn TokenStore>) -> Self {
        let session = Session::new(store);
        let notifications = NotificationCenter::new(config.notification_ttl);
        let search = CatalogSearch::new(
            api.clone(),
            session.clone(),
            notifications.clone(),
            config.search_limit,
        );
        let playlist = PlaylistCollection::new(&config.default_playlist_name, notifications.clone());
        let export = ExportOrchestrator::new(
            api,
            session.clone(),
            playlist.clone(),
            notifications.clone(),
            config.playlist_description.clone(),
        );

        Self {
            session,
            notifications,
            search,
            playlist,
            export,
            ui_state: Arc::new(Mutex::new(UiState::default())),
            authorize_url: Arc::from(crate::auth::authorize_url(config)),
        }
    }

    pub async fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            authenticated: self.session.is_authenticated().await,
            authorize_url: self.authorize_url.to_string(),
            results: self.search.results().await,
            playlist: self.playlist.tracks().await,
            playlist_name: self.playlist.name().await,
            loading: self.export.is_loading(),
            notification: self.notifications.current().await,
            ui: self.get_ui_state().await,
        }
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        self.ui_state.lock().await.should_quit
    }

    pub async fn set_should_quit(&self, quit: bool) {
        self.ui_state.lock().await.should_quit = quit;
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        self.ui_state.lock().await.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Results => state.result_selected = state.result_selected.saturating_sub(1),
            ActiveSection::Playlist => {
                state.playlist_selected = state.playlist_selected.saturating_sub(1)
            }
            ActiveSection::Search => {}
        }
    }

    pub async fn move_selection_down(&self) {
        let results_len = self.search.results().await.len();
        let playlist_len = self.playlist.len().await;
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Results => {
                if state.result_selected < results_len.saturating_sub(1) {
                    state.result_selected += 1;
                }
            }
            ActiveSection::Playlist => {
                if state.playlist_selected < playlist_len.saturating_sub(1) {
                    state.playlist_selected += 1;
                }
            }
            ActiveSection::Search => {}
        }
    }

    /// Keep selections inside the lists after they shrink.
    pub async fn clamp_selections(&self) {
        let results_len = self.search.results().await.len();
        let playlist_len = self.playlist.len().await;
        let mut state = self.ui_state.lock().await;
        state.result_selected = state.result_selected.min(results_len.saturating_sub(1));
        state.playlist_selected = state.playlist_selected.min(playlist_len.saturating_sub(1));
    }

    pub async fn reset_result_selection(&self) {
        self.ui_state.lock().await.result_selected = 0;
    }

    pub async fn append_to_search(&self, c: char) {
        self.ui_state.lock().await.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        self.ui_state.lock().await.search_query.pop();
    }

    pub async fn clear_search_query(&self) {
        self.ui_state.lock().await.search_query.clear();
    }

    pub async fn open_prompt(&self, prompt: Prompt, initial: String) {
        let mut state = self.ui_state.lock().await;
        state.prompt = Some(prompt);
        state.prompt_input = initial;
    }

    /// Close the open prompt and hand back what was typed.
    pub async fn close_prompt(&self) -> Option<(Prompt, String)> {
        let mut state = self.ui_state.lock().await;
        let prompt = state.prompt.take()?;
        Some((prompt, std::mem::take(&mut state.prompt_input)))
    }

    pub async fn append_to_prompt(&self, text: &str) {
        self.ui_state.lock().await.prompt_input.push_str(text);
    }

    pub async fn backspace_prompt(&self) {
        self.ui_state.lock().await.prompt_input.pop();
    }

    pub async fn toggle_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = !state.show_help_popup;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::session::{MemoryTokenStore, RedirectFragment};
    use crate::model::spotify_client::fake::FakeCatalog;
    use crate::model::types::track;

    fn model() -> (AppModel, Arc<FakeCatalog>) {
        let api = FakeCatalog::new();
        let model = AppModel::new(&Config::default(), api.clone(), Arc::new(MemoryTokenStore::default()));
        (model, api)
    }

    #[tokio::test]
    async fn test_snapshot_reflects_core_state() {
        let (model, api) = model();
        let snapshot = model.snapshot().await;
        assert!(!snapshot.authenticated);
        assert!(snapshot.authorize_url.contains("response_type=token"));
        assert_eq!(snapshot.playlist_name, "My Playlist");

        let mut nav = RedirectFragment::from_redirect("#access_token=XYZ&token_type=Bearer");
        model.session.restore_or_capture(&mut nav).await;
        api.on_search("song", Ok(vec![track("a"), track("b")]));
        model.search.search("song").await;
        model.playlist.add(track("a")).await;

        let snapshot = model.snapshot().await;
        assert!(snapshot.authenticated);
        assert_eq!(snapshot.results.len(), 2);
        assert_eq!(snapshot.playlist.len(), 1);
        assert!(!snapshot.loading);
        assert!(snapshot.notification.is_some());
    }

    #[tokio::test]
    async fn test_selection_stays_in_bounds() {
        let (model, _) = model();
        for id in ["a", "b"] {
            model.playlist.add(track(id)).await;
        }
        model.set_active_section(ActiveSection::Playlist).await;
        for _ in 0..5 {
            model.move_selection_down().await;
        }
        assert_eq!(model.get_ui_state().await.playlist_selected, 1);

        model.playlist.remove(1).await;
        model.clamp_selections().await;
        assert_eq!(model.get_ui_state().await.playlist_selected, 0);
    }

    #[tokio::test]
    async fn test_prompt_round_trip() {
        let (model, _) = model();
        model.open_prompt(Prompt::PlaylistName, "Mix".into()).await;
        model.append_to_prompt(" 2").await;
        model.backspace_prompt().await;
        model.append_to_prompt("3").await;
        assert_eq!(model.close_prompt().await, Some((Prompt::PlaylistName, "Mix 3".into())));
        assert_eq!(model.close_prompt().await, None);
    }
}
