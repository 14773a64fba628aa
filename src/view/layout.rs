//! Layout rendering (top bar, key hints)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use super::utils::border_style;
use crate::model::{ActiveSection, AppSnapshot};

pub fn render_top_bar(frame: &mut Frame, area: Rect, snapshot: &AppSnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(22), // Session status
        ])
        .split(area);

    let focused = snapshot.ui.active_section == ActiveSection::Search;
    let search_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if snapshot.ui.search_query.is_empty() {
        "Type to search tracks..."
    } else {
        &snapshot.ui.search_query
    };

    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .padding(Padding::horizontal(1))
            .border_style(border_style(focused)),
    );
    frame.render_widget(search, chunks[0]);

    let (status, color) = if snapshot.authenticated {
        ("● Logged in", Color::Green)
    } else {
        ("○ Logged out", Color::DarkGray)
    };
    let session = Paragraph::new(status)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(" Spotify "));
    frame.render_widget(session, chunks[1]);
}

pub fn render_hints(frame: &mut Frame, area: Rect, snapshot: &AppSnapshot) {
    let key = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let text = Style::default().fg(Color::Gray);

    let mut spans = Vec::new();
    if snapshot.loading {
        spans.push(Span::styled(
            " Exporting... ",
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }

    let login_hint = if snapshot.authenticated { "logout" } else { "login" };
    for (k, desc) in [
        ("Tab", "section"),
        ("Enter", "search/add"),
        ("d", "remove"),
        ("e", "export"),
        ("n", "rename"),
        ("l", login_hint),
        ("?", "help"),
    ] {
        spans.push(Span::styled(format!(" {} ", k), key));
        spans.push(Span::styled(format!("{} ", desc), text));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
