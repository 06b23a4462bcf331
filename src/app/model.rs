//! Application model types: `App` and `Pane`.
//!
//! The `App` struct holds the scanned files, the shared playlist and the
//! cursor state used by the UI and runtime.

use crate::library::{Track, TrackListHandle};

/// Which of the two panes currently owns the cursor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pane {
    Files,
    Playlist,
}

/// The main application model.
pub struct App {
    /// Tracks discovered by the library scan, in display order.
    pub files: Vec<Track>,
    /// The playlist shared with the skip-ordering closure.
    pub tracks: TrackListHandle,
    pub pane: Pane,
    pub selected_file: usize,
    pub selected_track: usize,
    /// One user-visible message at a time; replaced, never stacked.
    pub notice: Option<String>,
    pub current_dir: Option<String>,
}

impl App {
    /// Create a new `App` over the scanned `files` and the shared playlist.
    pub fn new(files: Vec<Track>, tracks: TrackListHandle) -> Self {
        Self {
            files,
            tracks,
            pane: Pane::Files,
            selected_file: 0,
            selected_track: 0,
            notice: None,
            current_dir: None,
        }
    }

    /// Move the cursor to the other pane.
    pub fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Files => Pane::Playlist,
            Pane::Playlist => Pane::Files,
        };
    }

    /// Record the scanned directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Return true if the scan found any tracks.
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// Number of tracks currently in the playlist.
    pub fn playlist_len(&self) -> usize {
        self.tracks.lock().map(|list| list.len()).unwrap_or(0)
    }

    /// The file track under the cursor, if any.
    pub fn selected_file_track(&self) -> Option<&Track> {
        self.files.get(self.selected_file)
    }

    /// The playlist track under the cursor, if any.
    pub fn selected_playlist_track(&self) -> Option<Track> {
        self.tracks
            .lock()
            .ok()
            .and_then(|list| list.get(self.selected_track).cloned())
    }

    /// Append the file track under the cursor to the playlist.
    ///
    /// Returns the track when it was newly added. A duplicate leaves the
    /// playlist untouched and replaces `notice` with one message.
    pub fn add_selected_file(&mut self) -> Option<Track> {
        let track = self.files.get(self.selected_file)?.clone();
        let added = match self.tracks.lock() {
            Ok(mut list) => list.add(track.clone()),
            Err(_) => return None,
        };
        match added {
            Ok(()) => {
                self.notice = None;
                Some(track)
            }
            Err(err) => {
                self.notice = Some(err.to_string());
                None
            }
        }
    }

    /// Move the cursor down in the active pane, wrapping at the end.
    pub fn next(&mut self) {
        match self.pane {
            Pane::Files => {
                if !self.files.is_empty() {
                    self.selected_file = (self.selected_file + 1) % self.files.len();
                }
            }
            Pane::Playlist => {
                let len = self.playlist_len();
                if len > 0 {
                    self.selected_track = (self.selected_track + 1) % len;
                }
            }
        }
    }

    /// Move the cursor up in the active pane, wrapping at the start.
    pub fn prev(&mut self) {
        match self.pane {
            Pane::Files => {
                if !self.files.is_empty() {
                    self.selected_file =
                        (self.selected_file + self.files.len() - 1) % self.files.len();
                }
            }
            Pane::Playlist => {
                let len = self.playlist_len();
                if len > 0 {
                    self.selected_track = (self.selected_track + len - 1) % len;
                }
            }
        }
    }

}
