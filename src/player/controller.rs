//! UI-bound playback controller.
//!
//! Owns the desired transport state (current track, playing flag),
//! drives the background service through the command channel, and
//! reconciles against the service's state-changed signals. It is also
//! the audio-focus holder and the sole writer of the gain cell.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::config::AudioSettings;
use crate::engine::EngineFactory;
use crate::focus::{FocusArbiter, FocusChange, FocusKind, FocusToken};
use crate::library::{Track, TrackId};

use super::bus::StateBus;
use super::service::{PlaybackService, ServiceHandle};
use super::types::{
    GainHandle, Notifier, PlayerCmd, SkipDirection, StateChanged, TransportState,
};

/// Resolves the track adjacent to the given one. Installed by the
/// runtime; the built-in default resolves nothing.
pub type OrderingFn = Box<dyn Fn(TrackId, SkipDirection) -> Option<Track> + Send>;

pub struct Controller {
    current: Option<Track>,
    playing: bool,
    service: Option<ServiceHandle>,
    make_engine: EngineFactory,
    notifier: Arc<dyn Notifier>,
    states: StateBus<StateChanged>,
    state_rx: Receiver<StateChanged>,
    transport: StateBus<TransportState>,
    gain: GainHandle,
    initial_volume: f32,
    duck_volume: f32,
    arbiter: FocusArbiter,
    focus_token: Option<FocusToken>,
    focus_tx: Sender<FocusChange>,
    focus_events: Receiver<FocusChange>,
    ordering: OrderingFn,
}

impl Controller {
    pub fn new(
        make_engine: EngineFactory,
        notifier: Arc<dyn Notifier>,
        arbiter: FocusArbiter,
        audio: &AudioSettings,
    ) -> Self {
        let states = StateBus::new();
        let state_rx = states.subscribe();
        let (focus_tx, focus_events) = mpsc::channel();

        Self {
            current: None,
            playing: false,
            service: None,
            make_engine,
            notifier,
            states,
            state_rx,
            transport: StateBus::new(),
            gain: GainHandle::new(audio.initial_volume),
            initial_volume: audio.initial_volume,
            duck_volume: audio.duck_volume,
            arbiter,
            focus_token: None,
            focus_tx,
            focus_events,
            ordering: Box::new(|_, _| None),
        }
    }

    /// Start or resume playback of `track`.
    ///
    /// If `track` is already current and merely paused, the live
    /// decoder resumes in place and focus is not re-requested. If it is
    /// already playing, nothing happens. Otherwise the old service is
    /// stopped (releasing its decoder) before a new one starts.
    pub fn play(&mut self, track: Track) {
        let is_current = self.current.as_ref().is_some_and(|c| c.id == track.id);
        if is_current && self.service.is_some() {
            if !self.playing && self.dispatch(PlayerCmd::Play(track.location.clone())) {
                self.playing = true;
                self.publish_transport();
            }
            return;
        }

        // Different track: whatever is live must be released before the
        // new decoder exists. Stopping joins the service thread.
        self.stop_service();

        self.current = Some(track.clone());
        self.playing = true;
        self.request_focus();

        let handle = self.spawn_service();
        let _ = handle.send(PlayerCmd::Play(track.location));
        self.service = Some(handle);

        self.publish_transport();
    }

    /// No-op unless currently playing, so repeated pauses issue no
    /// engine calls.
    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.dispatch(PlayerCmd::Pause);
        self.playing = false;
        self.publish_transport();
    }

    /// Seek by one fixed transport step in the direction of `delta_ms`.
    /// The service clamps the result to `[0, duration]`.
    pub fn seek_relative(&mut self, delta_ms: i64) {
        if delta_ms == 0 {
            return;
        }
        let cmd = if delta_ms > 0 {
            PlayerCmd::Forward10s
        } else {
            PlayerCmd::Rewind10s
        };
        self.dispatch(cmd);
    }

    pub fn skip_next(&mut self) {
        self.skip(SkipDirection::Next);
    }

    pub fn skip_previous(&mut self) {
        self.skip(SkipDirection::Previous);
    }

    fn skip(&mut self, direction: SkipDirection) {
        let Some(current) = &self.current else {
            return;
        };
        if let Some(track) = (self.ordering)(current.id, direction) {
            self.play(track);
        }
    }

    /// Install the ordering used to resolve skip targets.
    pub fn set_ordering(&mut self, ordering: OrderingFn) {
        self.ordering = ordering;
    }

    /// Stop playback completely. The service is stopped and its decoder
    /// released before this returns.
    pub fn stop(&mut self) {
        self.stop_service();
        self.current = None;
        self.playing = false;
        self.publish_transport();
    }

    /// Apply a focus transition. The runtime feeds these in through
    /// `pump`; tests may call it directly.
    pub fn handle_focus_change(&mut self, change: FocusChange) {
        match change {
            FocusChange::Gained => {
                self.gain.set(self.initial_volume);
                if !self.playing {
                    if let Some(track) = self.current.clone() {
                        self.play(track);
                    }
                }
            }
            FocusChange::Loss => {
                tracing::debug!("audio focus lost, stopping playback");
                // Revoked, not abandoned: the arbiter already dropped us.
                self.focus_token = None;
                self.stop();
            }
            FocusChange::LossTransient => self.pause(),
            FocusChange::LossTransientCanDuck => self.gain.set(self.duck_volume),
        }
    }

    /// Drain pending focus events and service signals. Cheap; the
    /// runtime calls it every frame.
    pub fn pump(&mut self) {
        while let Ok(change) = self.focus_events.try_recv() {
            self.handle_focus_change(change);
        }
        while let Ok(signal) = self.state_rx.try_recv() {
            if signal.playing != self.playing {
                self.playing = signal.playing;
                self.publish_transport();
            }
        }
    }

    pub fn transport_state(&self) -> TransportState {
        let position = self
            .service
            .as_ref()
            .and_then(|s| s.snapshot().lock().ok().map(|info| info.position))
            .unwrap_or(Duration::ZERO);
        TransportState {
            current: self.current.clone(),
            playing: self.playing,
            position,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Transport-state broadcasts, cached last value included.
    pub fn subscribe_transport(&self) -> Receiver<TransportState> {
        self.transport.subscribe()
    }

    /// Raw service signals; anyone may listen alongside the controller.
    pub fn subscribe_states(&self) -> Receiver<StateChanged> {
        self.states.subscribe()
    }

    /// Release everything: service and decoder, focus, transport state.
    pub fn dispose(&mut self) {
        self.stop_service();
        self.current = None;
        self.playing = false;
        if let Some(token) = self.focus_token.take() {
            self.arbiter.abandon(token);
        }
        self.publish_transport();
    }

    fn spawn_service(&self) -> ServiceHandle {
        PlaybackService::spawn(
            self.make_engine.clone(),
            self.gain.clone(),
            self.notifier.clone(),
            self.states.clone(),
        )
    }

    fn stop_service(&mut self) {
        if let Some(service) = self.service.take() {
            service.stop();
            // The final not-playing signal is already queued; consume it
            // so it is not misread as feedback from the next service.
            while self.state_rx.try_recv().is_ok() {}
        }
    }

    fn dispatch(&mut self, cmd: PlayerCmd) -> bool {
        let Some(service) = &self.service else {
            return false;
        };
        if service.send(cmd).is_ok() {
            return true;
        }
        // The service thread is gone (engine bring-up failure); drop
        // the stale handle.
        self.stop_service();
        false
    }

    fn request_focus(&mut self) {
        if self.focus_token.is_some() {
            return;
        }
        self.focus_token = self
            .arbiter
            .request(FocusKind::Permanent, self.focus_tx.clone());
        if self.focus_token.is_none() {
            // Policy: proceed without focus rather than refuse playback.
            tracing::warn!("audio focus denied, playing without focus");
        }
    }

    fn publish_transport(&self) {
        self.transport.publish(self.transport_state());
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.dispose();
    }
}
