//! View module - UI rendering
//!
//! - `utils`: Shared helpers (truncation, scrollable lists, focus styles)
//! - `layout`: Top bar (search + session) and bottom key hints
//! - `content`: Search results and playlist columns
//! - `overlays`: Notification toast, text prompts, help popup

mod utils;
mod layout;
mod content;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::AppSnapshot;

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, snapshot: &AppSnapshot) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + session
                Constraint::Min(0),    // Results + playlist
                Constraint::Length(1), // Key hints
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], snapshot);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        content::render_results(frame, columns[0], snapshot);
        content::render_playlist(frame, columns[1], snapshot);

        layout::render_hints(frame, chunks[2], snapshot);

        if let Some(notification) = &snapshot.notification {
            overlays::render_notification(frame, notification);
        }

        if let Some(prompt) = snapshot.ui.prompt {
            overlays::render_prompt(frame, prompt, snapshot);
        }

        if snapshot.ui.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
