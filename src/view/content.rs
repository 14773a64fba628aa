//! Search results and playlist draft columns

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding},
    Frame,
};

use super::utils::{border_style, calculate_num_width, item_style, render_scrollable_list, truncate_string};
use crate::model::{ActiveSection, AppSnapshot, Track};

fn track_item(index: usize, track: &Track, num_width: usize, width: usize, style: Style) -> ListItem<'static> {
    // Tracks with artwork get a small marker; the terminal can't show the image itself
    let marker = if track.images.is_empty() { "  " } else { "♪ " };
    let name_width = width.saturating_sub(num_width + 3) / 2;
    let artist_width = width.saturating_sub(num_width + 3 + name_width + 3);

    ListItem::new(Line::from(vec![
        Span::styled(format!("{:>w$} ", index + 1, w = num_width), Style::default().fg(Color::DarkGray)),
        Span::styled(marker.to_string(), Style::default().fg(Color::Cyan)),
        Span::styled(truncate_string(&track.name, name_width), style),
        Span::styled(" - ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            truncate_string(&track.artist_line(), artist_width),
            Style::default().fg(Color::Gray),
        ),
    ]))
}

pub fn render_results(frame: &mut Frame, area: Rect, snapshot: &AppSnapshot) {
    let focused = snapshot.ui.active_section == ActiveSection::Results;
    let inner_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(snapshot.results.len());

    let items: Vec<ListItem> = snapshot
        .results
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let style = item_style(i == snapshot.ui.result_selected, focused);
            track_item(i, track, num_width, inner_width, style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Results ")
        .padding(Padding::horizontal(1))
        .border_style(border_style(focused));

    render_scrollable_list(frame, area, items, snapshot.ui.result_selected, block);
}

pub fn render_playlist(frame: &mut Frame, area: Rect, snapshot: &AppSnapshot) {
    let focused = snapshot.ui.active_section == ActiveSection::Playlist;
    let inner_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(snapshot.playlist.len());

    let items: Vec<ListItem> = snapshot
        .playlist
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let style = item_style(i == snapshot.ui.playlist_selected, focused);
            track_item(i, track, num_width, inner_width, style)
        })
        .collect();

    let title = format!(
        " {} ({}) ",
        truncate_string(&snapshot.playlist_name, inner_width.saturating_sub(8)),
        snapshot.playlist.len()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(border_style(focused));

    render_scrollable_list(frame, area, items, snapshot.ui.playlist_selected, block);
}
