use super::*;
use crate::library::{Location, Track, TrackList};
use std::sync::{Arc, Mutex};

fn t(title: &str) -> Track {
    Track::new(
        Location::new(format!("/fake/{title}.mp3").into()),
        title.to_string(),
        None,
        None,
        None,
    )
}

fn app_with(files: Vec<Track>) -> App {
    App::new(files, Arc::new(Mutex::new(TrackList::default())))
}

#[test]
fn toggle_pane_switches_between_files_and_playlist() {
    let mut app = app_with(vec![t("Alpha")]);
    assert_eq!(app.pane, Pane::Files);
    app.toggle_pane();
    assert_eq!(app.pane, Pane::Playlist);
    app.toggle_pane();
    assert_eq!(app.pane, Pane::Files);
}

#[test]
fn cursor_wraps_within_the_active_pane() {
    let mut app = app_with(vec![t("Alpha"), t("Beta"), t("Gamma")]);

    app.next();
    app.next();
    assert_eq!(app.selected_file, 2);
    app.next();
    assert_eq!(app.selected_file, 0);
    app.prev();
    assert_eq!(app.selected_file, 2);

    // The playlist cursor is untouched by files-pane movement.
    assert_eq!(app.selected_track, 0);
}

#[test]
fn movement_in_empty_panes_is_harmless() {
    let mut app = app_with(vec![]);
    app.next();
    app.prev();
    assert_eq!(app.selected_file, 0);

    app.toggle_pane();
    app.next();
    app.prev();
    assert_eq!(app.selected_track, 0);
    assert!(app.add_selected_file().is_none());
}

#[test]
fn adding_the_selected_file_appends_to_the_playlist() {
    let mut app = app_with(vec![t("Alpha"), t("Beta")]);

    let added = app.add_selected_file().unwrap();
    assert_eq!(added.title, "Alpha");
    assert_eq!(app.playlist_len(), 1);
    assert!(app.notice.is_none());

    app.next();
    app.add_selected_file().unwrap();
    assert_eq!(app.playlist_len(), 2);
}

#[test]
fn adding_a_duplicate_keeps_the_playlist_and_surfaces_one_notice() {
    let mut app = app_with(vec![t("Alpha")]);

    assert!(app.add_selected_file().is_some());
    assert_eq!(app.playlist_len(), 1);

    assert!(app.add_selected_file().is_none());
    assert_eq!(app.playlist_len(), 1);
    let first = app.notice.clone().unwrap();
    assert!(first.contains("Alpha"));

    // A second attempt replaces the message rather than stacking another.
    assert!(app.add_selected_file().is_none());
    assert_eq!(app.notice.as_deref(), Some(first.as_str()));
}

#[test]
fn a_successful_add_clears_the_notice() {
    let mut app = app_with(vec![t("Alpha"), t("Beta")]);

    app.add_selected_file();
    app.add_selected_file();
    assert!(app.notice.is_some());

    app.next();
    assert!(app.add_selected_file().is_some());
    assert!(app.notice.is_none());
}

#[test]
fn selected_playlist_track_follows_the_cursor() {
    let mut app = app_with(vec![t("Alpha"), t("Beta")]);
    app.add_selected_file();
    app.next();
    app.add_selected_file();

    app.toggle_pane();
    assert_eq!(app.selected_playlist_track().unwrap().title, "Alpha");
    app.next();
    assert_eq!(app.selected_playlist_track().unwrap().title, "Beta");
}

#[test]
fn set_current_dir_records_the_scanned_directory() {
    let mut app = app_with(vec![]);
    assert!(app.current_dir.is_none());
    app.set_current_dir("/tmp/music".to_string());
    assert_eq!(app.current_dir.as_deref(), Some("/tmp/music"));
}
