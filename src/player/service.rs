//! Background playback service.
//!
//! The service thread is the sole owner of the live decoder and the
//! sole writer of the notification surface and the shared snapshot.
//! Commands arrive on an mpsc channel; the receive timeout doubles as
//! a housekeeping tick. Closing the channel shuts the service down.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::engine::{Decoder, EngineFactory};
use crate::library::Location;

use super::bus::StateBus;
use super::types::{
    GainHandle, Notifier, PlaybackHandle, PlaybackInfo, PlayerCmd, SEEK_STEP, StateChanged,
};

const TICK: Duration = Duration::from_millis(200);

/// Owning handle for one spawned service. Dropping it without `stop`
/// still shuts the thread down via channel disconnection, but `stop`
/// waits until the decoder is released.
pub struct ServiceHandle {
    tx: Sender<PlayerCmd>,
    snapshot: PlaybackHandle,
    join: Option<JoinHandle<()>>,
}

impl ServiceHandle {
    pub fn send(&self, cmd: PlayerCmd) -> Result<(), SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    pub fn snapshot(&self) -> PlaybackHandle {
        self.snapshot.clone()
    }

    /// Closes the command channel and waits for the thread to release
    /// the decoder and emit its final not-playing signal.
    pub fn stop(self) {
        let ServiceHandle { tx, join, .. } = self;
        drop(tx);
        if let Some(handle) = join {
            let _ = handle.join();
        }
    }
}

pub struct PlaybackService;

impl PlaybackService {
    pub fn spawn(
        make_engine: EngineFactory,
        gain: GainHandle,
        notifier: Arc<dyn Notifier>,
        states: StateBus<StateChanged>,
    ) -> ServiceHandle {
        let (tx, rx) = mpsc::channel();
        let snapshot: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let thread_snapshot = snapshot.clone();
        let join = thread::spawn(move || {
            run(rx, make_engine, gain, notifier, states, thread_snapshot);
        });

        ServiceHandle {
            tx,
            snapshot,
            join: Some(join),
        }
    }
}

fn run(
    rx: Receiver<PlayerCmd>,
    make_engine: EngineFactory,
    gain: GainHandle,
    notifier: Arc<dyn Notifier>,
    states: StateBus<StateChanged>,
    snapshot: PlaybackHandle,
) {
    // The engine lives and dies on this thread.
    let mut engine = match make_engine() {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(%err, "audio engine unavailable");
            states.publish(StateChanged { playing: false });
            return;
        }
    };

    let mut decoder: Option<Box<dyn Decoder>> = None;
    let mut current: Option<Location> = None;
    let mut paused = true;
    let mut applied_gain = gain.get();

    tracing::debug!("playback service started");

    loop {
        match rx.recv_timeout(TICK) {
            Ok(cmd) => {
                let was_playing = decoder.is_some() && !paused;
                let mut open_failed = false;

                match cmd {
                    PlayerCmd::Play(location) => {
                        if decoder.is_some() && current.as_ref() == Some(&location) {
                            if paused {
                                if let Some(d) = decoder.as_mut() {
                                    d.play();
                                }
                                paused = false;
                            }
                        } else {
                            // Release the previous decoder fully before
                            // the engine opens a new one.
                            decoder = None;
                            current = None;
                            match engine.open(&location) {
                                Ok(mut d) => {
                                    d.set_volume(gain.get());
                                    applied_gain = gain.get();
                                    d.play();
                                    decoder = Some(d);
                                    current = Some(location);
                                    paused = false;
                                }
                                Err(err) => {
                                    tracing::error!(%err, "failed to start playback");
                                    paused = true;
                                    open_failed = true;
                                }
                            }
                        }
                    }
                    PlayerCmd::Pause => {
                        if !paused {
                            if let Some(d) = decoder.as_mut() {
                                d.pause();
                                paused = true;
                            }
                        }
                    }
                    PlayerCmd::Forward10s => {
                        if let Some(d) = decoder.as_mut() {
                            let mut target = d.position() + SEEK_STEP;
                            if let Some(duration) = d.duration() {
                                target = target.min(duration);
                            }
                            d.seek_to(target);
                        }
                    }
                    PlayerCmd::Rewind10s => {
                        if let Some(d) = decoder.as_mut() {
                            let target = d.position().saturating_sub(SEEK_STEP);
                            d.seek_to(target);
                        }
                    }
                }

                apply_gain(&mut decoder, &gain, &mut applied_gain);

                let now_playing = decoder.is_some() && !paused;
                let info = refresh_snapshot(&snapshot, &decoder, &current, now_playing);
                notifier.render(&info);

                // An open failure always signals, so an optimistically
                // updated controller converges to not-playing.
                if now_playing != was_playing || open_failed {
                    states.publish(StateChanged {
                        playing: now_playing,
                    });
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                apply_gain(&mut decoder, &gain, &mut applied_gain);

                let finished = decoder
                    .as_ref()
                    .is_some_and(|d| !paused && d.is_finished());
                if finished {
                    decoder = None;
                    paused = true;
                    let info = refresh_snapshot(&snapshot, &decoder, &current, false);
                    notifier.render(&info);
                    states.publish(StateChanged { playing: false });
                } else if decoder.is_some() {
                    refresh_snapshot(&snapshot, &decoder, &current, !paused);
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Command channel closed: release the decoder and emit the final
    // not-playing signal.
    decoder = None;
    current = None;
    let info = refresh_snapshot(&snapshot, &decoder, &current, false);
    notifier.render(&info);
    states.publish(StateChanged { playing: false });
    tracing::debug!("playback service stopped");
}

fn apply_gain(decoder: &mut Option<Box<dyn Decoder>>, gain: &GainHandle, applied: &mut f32) {
    let desired = gain.get();
    if desired != *applied {
        if let Some(d) = decoder.as_mut() {
            d.set_volume(desired);
        }
        *applied = desired;
    }
}

fn refresh_snapshot(
    snapshot: &PlaybackHandle,
    decoder: &Option<Box<dyn Decoder>>,
    current: &Option<Location>,
    playing: bool,
) -> PlaybackInfo {
    let info = PlaybackInfo {
        location: current.clone(),
        playing,
        position: decoder.as_ref().map_or(Duration::ZERO, |d| d.position()),
        duration: decoder.as_ref().and_then(|d| d.duration()),
    };
    if let Ok(mut shared) = snapshot.lock() {
        *shared = info.clone();
    }
    info
}
