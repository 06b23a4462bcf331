use super::*;
use crate::library::{Location, TrackList};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

fn make_track() -> Track {
    Track::new(
        Location::new(PathBuf::from("/tmp/music/test.mp3")),
        "Test Title".to_string(),
        Some("Test Artist".to_string()),
        Some("Test Album".to_string()),
        Some(Duration::from_micros(1_234_567)),
    )
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };

    let track = make_track();
    handle.set_track_metadata(Some(7), Some(&track));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.album.as_deref(), Some("Test Album"));
        assert!(s.url.as_deref().unwrap().contains("/tmp/music/test.mp3"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }

    handle.set_track_metadata(None, None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.album, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn playback_status_maps_state_to_mpris_strings() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    {
        let mut s = state.lock().unwrap();
        s.playback = PlaybackState::Stopped;
    }
    assert_eq!(iface.playback_status(), "Stopped");

    {
        let mut s = state.lock().unwrap();
        s.playback = PlaybackState::Playing;
    }
    assert_eq!(iface.playback_status(), "Playing");

    {
        let mut s = state.lock().unwrap();
        s.playback = PlaybackState::Paused;
    }
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    {
        let mut s = state.lock().unwrap();
        s.title = Some("Title".to_string());
        s.artist = vec!["Artist".to_string()];
        s.album = Some("Album".to_string());
        s.url = Some("file:///tmp/test.mp3".to_string());
        s.length_micros = Some(42);
        s.track_id = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/1").ok();
    }

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "xesam:url",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn seek_sends_only_the_direction() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    iface.seek(5_000_000);
    assert_eq!(rx.try_recv().unwrap(), ControlCmd::Forward);

    iface.seek(-1);
    assert_eq!(rx.try_recv().unwrap(), ControlCmd::Rewind);

    iface.seek(0);
    assert!(rx.try_recv().is_err());
}

#[test]
fn notifier_resolves_playlist_tracks_and_tracks_playback() {
    let track = make_track();
    let mut list = TrackList::default();
    list.add(track.clone()).unwrap();
    let tracks: TrackListHandle = Arc::new(Mutex::new(list));

    let state = Arc::new(Mutex::new(SharedState::default()));
    let notifier = MprisNotifier::new(
        MprisHandle {
            state: state.clone(),
        },
        tracks,
    );

    notifier.render(&PlaybackInfo {
        location: Some(track.location.clone()),
        playing: true,
        position: Duration::from_secs(2),
        duration: track.duration,
    });
    {
        let s = state.lock().unwrap();
        assert_eq!(s.playback, PlaybackState::Playing);
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.position_micros, 2_000_000);
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/0")
        );
    }

    notifier.render(&PlaybackInfo {
        location: Some(track.location.clone()),
        playing: false,
        position: Duration::from_secs(2),
        duration: track.duration,
    });
    assert_eq!(state.lock().unwrap().playback, PlaybackState::Paused);

    notifier.render(&PlaybackInfo {
        location: None,
        playing: false,
        position: Duration::ZERO,
        duration: None,
    });
    {
        let s = state.lock().unwrap();
        assert_eq!(s.playback, PlaybackState::Stopped);
        assert_eq!(s.title, None);
        assert!(s.track_id.is_none());
        assert_eq!(s.position_micros, 0);
    }
}
