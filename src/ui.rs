//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, Pane};
use crate::config::UiSettings;
use crate::player::{PlaybackState, SEEK_STEP, TransportState};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("tab".to_string(), "switch pane".to_string());
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("enter".to_string(), "add + play / play".to_string());
    map.insert("a".to_string(), "add to playlist".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("x".to_string(), "stop".to_string());
    map.insert("n/b".to_string(), "next/prev song".to_string());
    // h/l is filled dynamically from the seek step.
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating the seek step.
fn controls_text() -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "tab", "j/k", "enter", "a", "space/p", "x", "n/b", "h/l", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "h/l" {
                Some(format!("[h/l] seek -/+{}s", SEEK_STEP.as_secs()))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the "now playing" line from the transport snapshot.
fn now_playing_text(transport: &TransportState) -> Option<String> {
    let track = transport.current.as_ref()?;
    let time = match track.duration {
        Some(total) => format!(
            "{} / {}",
            format_mmss(transport.position),
            format_mmss(total)
        ),
        None => format_mmss(transport.position),
    };
    Some(format!("Song: {} [{}]", track.display, time))
}

/// Render one track pane as a windowed list centered on the selection.
fn render_pane(frame: &mut Frame, area: Rect, title: &str, items: &[String], selected: usize, active: bool) {
    // Center the selected item when possible by creating a visible window.
    // Important: only build ListItems for the visible window (avoid allocating the entire list).
    let total = items.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = selected.min(total.saturating_sub(1));
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = if sel_pos > half { sel_pos - half } else { 0 };
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let visible_items: Vec<ListItem> = items[start..end]
        .iter()
        .map(|s| ListItem::new(s.as_str()))
        .collect();

    let border_style = if active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let list = List::new(visible_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title.to_string()),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if total > 0 && active {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, transport: &TransportState, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());
    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" legato ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();

        let state_text = match transport.playback_state() {
            PlaybackState::Stopped => "STATE: Stopped",
            PlaybackState::Playing => "STATE: Playing",
            PlaybackState::Paused => "STATE: Paused",
        };
        parts.push(state_text.to_string());

        if let Some(song) = now_playing_text(transport) {
            parts.push(song);
        }

        if let Some(notice) = &app.notice {
            parts.push(format!("NOTE: {}", notice));
        }

        if let Some(dir) = &app.current_dir {
            parts.push(format!("Dir: {}", dir));
        }

        parts.join(" • ")
    };

    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Files and playlist panes
    {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        let file_items: Vec<String> = app.files.iter().map(|t| t.display.clone()).collect();
        render_pane(
            frame,
            panes[0],
            " files ",
            &file_items,
            app.selected_file,
            app.pane == Pane::Files,
        );

        let playlist_items: Vec<String> = app
            .tracks
            .lock()
            .map(|list| list.iter().map(|t| t.display.clone()).collect())
            .unwrap_or_default();
        render_pane(
            frame,
            panes[1],
            " playlist ",
            &playlist_items,
            app.selected_track,
            app.pane == Pane::Playlist,
        );
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
