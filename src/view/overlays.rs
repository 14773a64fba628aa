//! Overlay rendering (notification toast, text prompts, help popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::{AppSnapshot, Notification, Prompt, Severity};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
        Severity::Info => Color::Cyan,
    }
}

pub fn render_notification(frame: &mut Frame, notification: &Notification) {
    let area = frame.area();

    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;

    let line_count = notification.text.chars().count().div_ceil(inner_width) as u16;
    let popup_height = 2 + line_count.max(1);

    // Bottom-right corner, above the key hints
    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width + 1),
        y: area.height.saturating_sub(popup_height + 1),
        width: popup_width,
        height: popup_height.min(area.height),
    };

    frame.render_widget(Clear, popup_area);

    let color = severity_color(notification.severity);
    let widget = Paragraph::new(notification.text.clone())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(
                    " {} {}s (Esc to dismiss) ",
                    notification.severity.label(),
                    notification.remaining().as_secs_f32().ceil() as u64
                ))
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(widget, popup_area);
}

pub fn render_prompt(frame: &mut Frame, prompt: Prompt, snapshot: &AppSnapshot) {
    let area = frame.area();
    let popup_area = centered(area, 72.min(area.width.saturating_sub(4)), 12);

    frame.render_widget(Clear, popup_area);

    let label = Style::default().fg(Color::Gray);
    let input = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::styled(format!("{}_", snapshot.ui.prompt_input), Style::default().fg(Color::White)),
    ]);

    let (title, lines) = match prompt {
        Prompt::Login => (
            " Log in to Spotify (Enter to confirm, Esc to cancel) ",
            vec![
                Line::from(Span::styled("Open this URL in a browser and approve access:", label)),
                Line::from(Span::styled(
                    snapshot.authorize_url.clone(),
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(""),
                Line::from(Span::styled("Then paste the URL you were redirected to:", label)),
                input,
            ],
        ),
        Prompt::PlaylistName => (
            " Rename playlist (Enter to confirm, Esc to cancel) ",
            vec![Line::from(Span::styled("Playlist name:", label)), input],
        ),
    };

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(widget, popup_area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = vec![
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("↑ / ↓", "Move selection"),
        ("/", "Focus search"),
        ("", ""),
        ("", "── Search ──"),
        ("Enter", "Run search"),
        ("Esc", "Clear query"),
        ("", ""),
        ("", "── Playlist ──"),
        ("Enter / A", "Add selected result"),
        ("Delete / D", "Remove selected track"),
        ("N", "Rename playlist"),
        ("E", "Export to Spotify"),
        ("", ""),
        ("", "── General ──"),
        ("L", "Log in / Log out"),
        ("Esc", "Dismiss notification"),
        ("?", "Toggle this help"),
        ("Q / Ctrl+C", "Quit"),
    ];

    let popup_area = centered(area, 56, keybindings.len() as u16 + 2);

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help (? or Esc to close) ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(help_text, popup_area);
}
