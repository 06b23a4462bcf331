//! Playback wire types: the command vocabulary, the state-changed
//! signal and the handles shared between controller, service and UI.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::{Location, Track};

/// Fixed transport seek step.
pub const SEEK_STEP: Duration = Duration::from_millis(10_000);

/// Commands accepted by the playback service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCmd {
    /// Load `location` and start output, or resume it if it is already
    /// loaded and merely paused.
    Play(Location),
    /// Pause output if currently playing.
    Pause,
    /// Seek forward by `SEEK_STEP`, clamped to the duration.
    Forward10s,
    /// Seek backward by `SEEK_STEP`, clamped to zero.
    Rewind10s,
}

/// Signal broadcast by the service after each transport transition.
/// Carries the full current state, never a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged {
    pub playing: bool,
}

/// Snapshot of what the service is doing, shared for display.
/// The service is the sole writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackInfo {
    pub location: Option<Location>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// Output gain cell. The controller writes it when focus ducks or
/// returns; the service applies it to the live decoder.
#[derive(Clone)]
pub struct GainHandle(Arc<Mutex<f32>>);

impl GainHandle {
    pub fn new(initial: f32) -> Self {
        Self(Arc::new(Mutex::new(initial)))
    }

    pub fn set(&self, gain: f32) {
        if let Ok(mut g) = self.0.lock() {
            *g = gain;
        }
    }

    pub fn get(&self) -> f32 {
        self.0.lock().map(|g| *g).unwrap_or(1.0)
    }
}

/// Transport state owned by the controller; what the UI binds to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportState {
    pub current: Option<Track>,
    pub playing: bool,
    pub position: Duration,
}

impl TransportState {
    pub fn playback_state(&self) -> PlaybackState {
        match (&self.current, self.playing) {
            (None, _) => PlaybackState::Stopped,
            (Some(_), true) => PlaybackState::Playing,
            (Some(_), false) => PlaybackState::Paused,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDirection {
    Next,
    Previous,
}

/// Notification surface the service re-renders after every command and
/// on shutdown. Implementations resolve the snapshot into whatever
/// presentation they own.
pub trait Notifier: Send + Sync {
    fn render(&self, info: &PlaybackInfo);
}
