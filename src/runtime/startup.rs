use std::path::Path;
use std::sync::Mutex;

use crate::library::TrackListHandle;
use crate::player::{Controller, SkipDirection};

/// Route tracing output to the file named by `LEGATO_LOG`.
///
/// Stdout belongs to the TUI, so logging stays off unless a file is given.
pub fn init_logging() {
    let Some(path) = std::env::var_os("LEGATO_LOG") else {
        return;
    };

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(f) => f,
        Err(err) => {
            eprintln!(
                "legato: cannot open log file {}: {err}",
                Path::new(&path).display()
            );
            return;
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "legato=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

/// Resolve skips against the playlist: insertion order, no wraparound.
pub fn install_ordering(controller: &mut Controller, tracks: TrackListHandle) {
    controller.set_ordering(Box::new(move |id, direction| {
        let list = tracks.lock().ok()?;
        let next = match direction {
            SkipDirection::Next => list.next_after(id),
            SkipDirection::Previous => list.prev_before(id),
        };
        next.cloned()
    }));
}
