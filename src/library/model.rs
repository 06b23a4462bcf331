use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Stable identifier for a track, hashed from its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u64);

impl TrackId {
    pub fn from_location(location: &Location) -> Self {
        Self(xxh3_64(location.as_path().to_string_lossy().as_bytes()))
    }
}

/// Opaque handle to a playable media source. The engine resolves it
/// into a byte stream; nothing else interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(PathBuf);

impl Location {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub location: Location,
    pub display: String,
}

impl Track {
    pub fn new(
        location: Location,
        title: String,
        artist: Option<String>,
        album: Option<String>,
        duration: Option<Duration>,
    ) -> Self {
        let id = TrackId::from_location(&location);
        let display = make_display(&title, artist.as_deref());
        Self {
            id,
            title,
            artist,
            album,
            duration,
            location,
            display,
        }
    }
}

fn make_display(title: &str, artist: Option<&str>) -> String {
    match artist {
        Some(a) if !a.trim().is_empty() => format!("{} - {}", a.trim(), title),
        _ => title.to_string(),
    }
}

/// Rejected insertion: a track with the same id is already present.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("already in the playlist: {title}")]
pub struct DuplicateTrack {
    pub title: String,
}

/// Insertion-ordered set of tracks, unique by id. Duplicates are
/// rejected with an error the UI surfaces as a notice; the collection
/// is left unchanged.
#[derive(Debug, Default)]
pub struct TrackList {
    tracks: Vec<Track>,
    ids: HashSet<TrackId>,
}

impl TrackList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, track: Track) -> Result<(), DuplicateTrack> {
        if !self.ids.insert(track.id) {
            return Err(DuplicateTrack {
                title: track.title.clone(),
            });
        }
        self.tracks.push(track);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.ids.contains(&id)
    }

    pub fn by_id(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn by_location(&self, location: &Location) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.location == location)
    }

    pub fn position_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Track after `id` in insertion order, `None` at the end (no wrap).
    pub fn next_after(&self, id: TrackId) -> Option<&Track> {
        let pos = self.position_of(id)?;
        self.tracks.get(pos + 1)
    }

    /// Track before `id` in insertion order, `None` at the start.
    pub fn prev_before(&self, id: TrackId) -> Option<&Track> {
        let pos = self.position_of(id)?;
        pos.checked_sub(1).and_then(|p| self.tracks.get(p))
    }
}

pub type TrackListHandle = Arc<Mutex<TrackList>>;
