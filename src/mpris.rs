use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::library::{Track, TrackListHandle};
use crate::player::{Notifier, PlaybackInfo, PlaybackState};

/// Commands a remote controller can issue over D-Bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    Forward,
    Rewind,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    position_micros: i64,
    track_id: Option<ObjectPath<'static>>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    pub fn set_position(&self, micros: i64) {
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = micros;
        }
    }

    /// Replace the exported metadata. `None` clears every field.
    pub fn set_track_metadata(&self, index: Option<usize>, track: Option<&Track>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };

        match track {
            Some(track) => {
                s.title = Some(track.title.clone());
                s.artist = track.artist.iter().cloned().collect();
                s.album = track.album.clone();
                s.url = Some(format!("file://{}", track.location.as_path().display()));
                s.length_micros = track.duration.map(duration_micros);
                s.track_id = index.and_then(|i| {
                    ObjectPath::try_from(format!("/org/mpris/MediaPlayer2/track/{i}")).ok()
                });
            }
            None => {
                s.title = None;
                s.artist = Vec::new();
                s.album = None;
                s.url = None;
                s.length_micros = None;
                s.track_id = None;
            }
        }
    }
}

/// Mirrors playback snapshots into the D-Bus surface.
///
/// Resolves the rendered location against the playlist so remote clients
/// see full tag metadata rather than a bare path.
pub struct MprisNotifier {
    handle: MprisHandle,
    tracks: TrackListHandle,
}

impl MprisNotifier {
    pub fn new(handle: MprisHandle, tracks: TrackListHandle) -> Self {
        Self { handle, tracks }
    }
}

impl Notifier for MprisNotifier {
    fn render(&self, info: &PlaybackInfo) {
        let resolved = info.location.as_ref().and_then(|loc| {
            self.tracks.lock().ok().and_then(|list| {
                let track = list.by_location(loc)?.clone();
                let index = list.position_of(track.id);
                Some((index, track))
            })
        });

        match &resolved {
            Some((index, track)) => self.handle.set_track_metadata(*index, Some(track)),
            None => self.handle.set_track_metadata(None, None),
        }

        let playback = if info.location.is_none() {
            PlaybackState::Stopped
        } else if info.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        };
        self.handle.set_playback(playback);
        self.handle.set_position(duration_micros(info.position));
    }
}

fn duration_micros(d: Duration) -> i64 {
    d.as_micros().min(i64::MAX as u128) as i64
}

fn insert_value(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    if let Ok(v) = OwnedValue::try_from(value) {
        map.insert(key.to_string(), v);
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "legato"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    /// Only the direction survives; the player seeks in fixed steps.
    fn seek(&self, offset_micros: i64) {
        if offset_micros > 0 {
            let _ = self.tx.send(ControlCmd::Forward);
        } else if offset_micros < 0 {
            let _ = self.tx.send(ControlCmd::Rewind);
        }
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        // NOTE: This returns a &'static str; we map state into static strings.
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(id) = &s.track_id {
            insert_value(&mut map, "mpris:trackid", Value::ObjectPath(id.clone()));
        }
        if let Some(title) = &s.title {
            insert_value(&mut map, "xesam:title", Value::from(title.clone()));
        }
        if !s.artist.is_empty() {
            insert_value(&mut map, "xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(album) = &s.album {
            insert_value(&mut map, "xesam:album", Value::from(album.clone()));
        }
        if let Some(url) = &s.url {
            insert_value(&mut map, "xesam:url", Value::from(url.clone()));
        }
        if let Some(len) = s.length_micros {
            insert_value(&mut map, "mpris:length", Value::from(len));
        }

        map
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let path = "/org/mpris/MediaPlayer2";

            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(err) => {
                    tracing::warn!(%err, "mpris: failed to connect to session bus");
                    return;
                }
            };

            if let Err(err) = connection
                .request_name("org.mpris.MediaPlayer2.legato")
                .await
            {
                tracing::warn!(%err, "mpris: failed to acquire bus name");
                return;
            }

            let object_server = connection.object_server();

            if let Err(err) = object_server.at(path, RootIface { tx: tx.clone() }).await {
                tracing::warn!(%err, "mpris: failed to register root interface");
                return;
            }

            if let Err(err) = object_server
                .at(
                    path,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                tracing::warn!(%err, "mpris: failed to register player interface");
                return;
            }

            // Keep the service alive.
            loop {
                Timer::after(Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
