//! Controller actions. Remote-calling operations run as background tasks so
//! the UI keeps rendering while requests are in flight.

use crate::model::{ActiveSection, Prompt, RedirectFragment, Severity};
use super::AppController;

impl AppController {
    pub fn perform_search(&self, query: String) -> tokio::task::JoinHandle<()> {
        let model = self.model.clone();
        tokio::spawn(async move {
            model.search.search(&query).await;
            model.reset_result_selection().await;
            if !model.search.results().await.is_empty() && model.search.last_query().await == query.trim() {
                model.set_active_section(ActiveSection::Results).await;
            }
        })
    }

    pub async fn add_selected_result(&self) {
        let index = self.model.get_ui_state().await.result_selected;
        if let Some(track) = self.model.search.result(index).await {
            self.model.playlist.add(track).await;
        }
    }

    pub async fn remove_selected_entry(&self) {
        let index = self.model.get_ui_state().await.playlist_selected;
        self.model.playlist.remove(index).await;
        self.model.clamp_selections().await;
    }

    pub fn start_export(&self) -> tokio::task::JoinHandle<()> {
        let model = self.model.clone();
        tokio::spawn(async move {
            model.export.export_current().await;
            model.clamp_selections().await;
        })
    }

    pub async fn open_login_prompt(&self) {
        if self.model.session.is_authenticated().await {
            return;
        }
        self.model.open_prompt(Prompt::Login, String::new()).await;
    }

    pub async fn open_rename_prompt(&self) {
        let name = self.model.playlist.name().await;
        self.model.open_prompt(Prompt::PlaylistName, name).await;
    }

    pub async fn submit_prompt(&self) {
        match self.model.close_prompt().await {
            Some((Prompt::Login, input)) => self.login(&input).await,
            Some((Prompt::PlaylistName, input)) => {
                let name = input.trim();
                if name.is_empty() {
                    self.model
                        .notifications
                        .show("Playlist name cannot be empty.", Severity::Warning)
                        .await;
                } else {
                    self.model.playlist.set_name(name).await;
                }
            }
            None => {}
        }
    }

    pub async fn login(&self, redirect: &str) {
        let mut navigation = RedirectFragment::from_redirect(redirect);
        if self.model.session.capture(&mut navigation).await {
            self.model.notifications.show("Logged in.", Severity::Success).await;
        } else {
            self.model
                .notifications
                .show("No access token found in that redirect URL.", Severity::Warning)
                .await;
        }
    }

    pub async fn logout(&self) {
        self.model.session.invalidate().await;
        self.model.notifications.show("Logged out.", Severity::Info).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::model::fake::{Call, FakeCatalog};
    use crate::model::{track, AppModel, MemoryTokenStore};

    fn controller() -> (AppController, Arc<FakeCatalog>) {
        let api = FakeCatalog::new();
        let model = AppModel::new(&Config::default(), api.clone(), Arc::new(MemoryTokenStore::default()));
        (AppController::new(model), api)
    }

    #[tokio::test]
    async fn test_login_search_add_export_flow() {
        let (controller, api) = controller();
        let model = controller.model.clone();

        controller.login("http://localhost:3000/#token_type=Bearer&access_token=XYZ").await;
        assert_eq!(model.session.token().await.as_deref(), Some("XYZ"));

        api.on_search("daft", Ok(vec![track("a"), track("b")]));
        controller.perform_search("daft".into()).await.unwrap();
        assert_eq!(model.get_ui_state().await.active_section, ActiveSection::Results);

        controller.add_selected_result().await;
        model.move_selection_down().await;
        controller.add_selected_result().await;
        controller.add_selected_result().await;
        assert_eq!(model.playlist.len().await, 2);

        controller.start_export().await.unwrap();
        assert_eq!(model.playlist.len().await, 0);
        assert!(api.calls().iter().any(|c| matches!(c, Call::Add { uris, .. } if uris.len() == 2)));
    }

    #[tokio::test]
    async fn test_login_without_token_warns() {
        let (controller, _) = controller();
        controller.login("http://localhost:3000/#error=access_denied").await;
        assert!(!controller.model.session.is_authenticated().await);
        let note = controller.model.notifications.current().await.unwrap();
        assert_eq!(note.severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_rename_prompt_rejects_blank() {
        let (controller, _) = controller();
        controller.open_rename_prompt().await;
        controller.model.close_prompt().await;
        controller.model.open_prompt(Prompt::PlaylistName, "   ".into()).await;
        controller.submit_prompt().await;
        assert_eq!(controller.model.playlist.name().await, "My Playlist");

        controller.model.open_prompt(Prompt::PlaylistName, "Focus".into()).await;
        controller.submit_prompt().await;
        assert_eq!(controller.model.playlist.name().await, "Focus");
    }

    #[tokio::test]
    async fn test_logout_invalidates() {
        let (controller, _) = controller();
        controller.login("#access_token=XYZ").await;
        controller.logout().await;
        assert!(!controller.model.session.is_authenticated().await);
    }
}
