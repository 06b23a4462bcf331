use std::env;
use std::path::Path;
use std::sync::{Arc, Mutex, mpsc};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::engine::rodio_factory;
use crate::focus::FocusArbiter;
use crate::library::{TrackList, TrackListHandle, scan};
use crate::mpris::{ControlCmd, MprisNotifier};
use crate::player::Controller;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    startup::init_logging();
    let settings = settings::load_settings();

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });

    let files = scan(Path::new(&dir), &settings.library);
    let tracks: TrackListHandle = Arc::new(Mutex::new(TrackList::default()));

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());
    let notifier = Arc::new(MprisNotifier::new(mpris, tracks.clone()));

    let arbiter = FocusArbiter::new();
    let mut controller = Controller::new(rodio_factory(), notifier, arbiter, &settings.audio);
    startup::install_ordering(&mut controller, tracks.clone());

    let mut app = App::new(files, tracks);
    app.set_current_dir(dir.clone());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &control_tx,
        &control_rx,
    );

    // Stop the service and release audio focus before leaving the screen.
    controller.dispose();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
