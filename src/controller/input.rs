//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActiveSection;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = &self.model;

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            model.set_should_quit(true).await;
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        // An open prompt captures all typing
        if ui_state.prompt.is_some() {
            match key.code {
                KeyCode::Enter => self.submit_prompt().await,
                KeyCode::Esc => {
                    model.close_prompt().await;
                }
                KeyCode::Backspace => model.backspace_prompt().await,
                KeyCode::Char(c) => model.append_to_prompt(&c.to_string()).await,
                _ => {}
            }
            return Ok(());
        }

        if ui_state.show_help_popup {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                model.toggle_help_popup().await;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab => {
                model.cycle_section_forward().await;
                return Ok(());
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
                return Ok(());
            }
            _ => {}
        }

        // Search input owns printable keys while focused
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Enter => {
                    self.perform_search(ui_state.search_query.clone());
                }
                KeyCode::Esc => {
                    if ui_state.search_query.is_empty() {
                        model.notifications.dismiss().await;
                    } else {
                        model.clear_search_query().await;
                    }
                }
                KeyCode::Backspace => model.backspace_search().await,
                KeyCode::Char(c) => model.append_to_search(c).await,
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => model.set_should_quit(true).await,
            KeyCode::Esc => model.notifications.dismiss().await,
            KeyCode::Char('?') => model.toggle_help_popup().await,
            KeyCode::Char('/') => model.set_active_section(ActiveSection::Search).await,
            KeyCode::Up => model.move_selection_up().await,
            KeyCode::Down => model.move_selection_down().await,
            KeyCode::Char('l') | KeyCode::Char('L') => {
                if model.session.is_authenticated().await {
                    self.logout().await;
                } else {
                    self.open_login_prompt().await;
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                // The orchestrator rejects overlapping exports itself
                self.start_export();
            }
            KeyCode::Char('n') | KeyCode::Char('N') => self.open_rename_prompt().await,
            KeyCode::Enter | KeyCode::Char('a') | KeyCode::Char('A')
                if ui_state.active_section == ActiveSection::Results =>
            {
                self.add_selected_result().await;
            }
            KeyCode::Delete | KeyCode::Char('d') | KeyCode::Char('D')
                if ui_state.active_section == ActiveSection::Playlist =>
            {
                self.remove_selected_entry().await;
            }
            _ => {}
        }
        Ok(())
    }

    /// Bracketed paste from the terminal; only the login and rename prompts
    /// accept it.
    pub async fn handle_paste(&self, text: &str) {
        if self.model.get_ui_state().await.prompt.is_some() {
            self.model.append_to_prompt(text.trim()).await;
        }
    }
}
