use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Pane};
use crate::config;
use crate::mpris::ControlCmd;
use crate::player::{Controller, SEEK_STEP};
use crate::ui;

/// Main terminal event loop: handles input, UI drawing and feedback from the
/// playback service. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Apply queued focus changes and service feedback before rendering.
        controller.pump();

        let transport = controller.transport_state();
        terminal.draw(|f| ui::draw(f, app, &transport, &settings.ui))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, controller) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, controller, control_tx) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one remote command. Returns `true` when shutdown was requested.
fn handle_control_cmd(cmd: ControlCmd, app: &mut App, controller: &mut Controller) -> bool {
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => {
            let target = controller
                .current_track()
                .cloned()
                .or_else(|| app.selected_playlist_track());
            if let Some(track) = target {
                controller.play(track);
            }
        }
        ControlCmd::Pause => controller.pause(),
        ControlCmd::PlayPause => {
            if controller.is_playing() {
                controller.pause();
            } else {
                let target = controller
                    .current_track()
                    .cloned()
                    .or_else(|| app.selected_playlist_track());
                if let Some(track) = target {
                    controller.play(track);
                }
            }
        }
        ControlCmd::Stop => controller.stop(),
        ControlCmd::Next => controller.skip_next(),
        ControlCmd::Prev => controller.skip_previous(),
        ControlCmd::Forward => controller.seek_relative(SEEK_STEP.as_millis() as i64),
        ControlCmd::Rewind => controller.seek_relative(-(SEEK_STEP.as_millis() as i64)),
    }

    false
}

/// Apply one key press. Returns `true` when shutdown was requested.
fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    controller: &mut Controller,
    control_tx: &mpsc::Sender<ControlCmd>,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => app.toggle_pane(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => match app.pane {
            Pane::Files => {
                if let Some(track) = app.add_selected_file() {
                    controller.play(track);
                }
            }
            Pane::Playlist => {
                if let Some(track) = app.selected_playlist_track() {
                    controller.play(track);
                }
            }
        },
        KeyCode::Char('a') => {
            if app.pane == Pane::Files {
                app.add_selected_file();
            }
        }
        // Transport keys share the remote-command path.
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('x') => {
            let _ = control_tx.send(ControlCmd::Stop);
        }
        KeyCode::Char('n') => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('b') => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('l') => {
            let _ = control_tx.send(ControlCmd::Forward);
        }
        KeyCode::Char('h') => {
            let _ = control_tx.send(ControlCmd::Rewind);
        }
        _ => {}
    }

    false
}
