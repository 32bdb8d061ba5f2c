//! End-to-end tests of the redraw logic with test doubles for every collaborator

mod common;

use std::time::Duration;
use serde_json::json;
use tempfile::TempDir;

use common::{create_files, paused, playing, Harness};
use sonosdisplay::display::{DisplaySettings, View};
use sonosdisplay::slideshow::SlideshowCycler;
use sonosdisplay::sonos::TrackerError;
use sonosdisplay::PlaybackStatus;

#[tokio::test]
async fn test_new_track_is_drawn_once() {
    let mut h = Harness::simple();

    h.poll(playing("Roads", "http://art/roads.jpg")).await;

    assert_eq!(h.app.display().view(), View::Album);
    assert_eq!(h.backlight.status().power, Some(true));
    assert_eq!(h.images.requests(), vec!["http://art/roads.jpg"]);
    assert_eq!(h.surface.state().text.track, "Roads");
    assert_eq!(h.surface.state().text.detail, "Portishead • Dummy");

    h.poll(playing("Roads", "http://art/roads.jpg")).await;

    assert_eq!(h.images.requests().len(), 1);
    assert_eq!(h.surface.state().content_updates, 1);
}

#[tokio::test]
async fn test_new_art_for_same_track_is_redrawn() {
    let mut h = Harness::simple();
    h.poll(playing("Roads", "http://art/small.jpg")).await;

    h.poll(playing("Roads", "http://art/large.jpg")).await;

    assert_eq!(h.images.requests(), vec!["http://art/small.jpg", "http://art/large.jpg"]);
    assert_eq!(h.surface.state().content_updates, 2);
}

#[tokio::test]
async fn test_pause_blanks_and_resume_redraws() {
    let mut h = Harness::simple();
    h.poll(playing("Roads", "http://art/roads.jpg")).await;

    h.poll(paused("Roads", "http://art/roads.jpg")).await;

    assert_eq!(h.app.display().view(), View::Blank);
    assert_eq!(h.backlight.status().power, Some(false));
    // Metadata survives the pause
    assert_eq!(h.app.tracker().state().title, "Roads");
    assert_eq!(h.app.tracker().state().playback_status, PlaybackStatus::Paused);

    let before = h.backlight.status();
    h.poll(playing("Roads", "http://art/roads.jpg")).await;

    let after = h.backlight.status();
    assert_eq!(h.app.display().view(), View::Album);
    assert_eq!(after.on_calls - before.on_calls, 1);
    assert_eq!(after.off_calls, before.off_calls);
}

#[tokio::test]
async fn test_transitioning_keeps_picture_on() {
    let mut h = Harness::simple();
    h.poll(playing("Roads", "http://art/roads.jpg")).await;

    let mut between_tracks = playing("Roads", "http://art/roads.jpg");
    between_tracks["playbackState"] = json!("TRANSITIONING");
    h.poll(between_tracks).await;

    assert_eq!(h.app.tracker().state().playback_status, PlaybackStatus::Transitioning);
    assert_eq!(h.app.display().view(), View::Album);
    assert_eq!(h.backlight.status().off_calls, 0);

    h.poll(playing("Mysterons", "http://art/mysterons.jpg")).await;
    assert_eq!(h.surface.state().text.track, "Mysterons");
    assert_eq!(h.backlight.status().off_calls, 0);
}

#[tokio::test]
async fn test_transport_error_keeps_last_picture() {
    let mut h = Harness::simple();
    h.poll(playing("Roads", "http://art/roads.jpg")).await;

    h.api.enqueue(Err(TrackerError::Transport("connection refused".to_string())));
    h.app.refresh(None).await.unwrap();

    assert!(h.app.tracker().is_error());
    assert_eq!(h.app.display().view(), View::Album);
    assert_eq!(h.backlight.status().power, Some(true));
    assert_eq!(h.app.tracker().state().image_uri(), "http://art/roads.jpg");
    assert_eq!(h.surface.state().content_updates, 1);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_picture() {
    let mut h = Harness::simple();
    h.poll(playing("Roads", "http://art/roads.jpg")).await;

    h.poll(playing("Mysterons", "http://art/broken.jpg")).await;

    assert_eq!(h.surface.state().content_updates, 1);
    assert_eq!(h.surface.state().text.track, "Roads");
    assert_eq!(h.app.display().view(), View::Album);
}

#[tokio::test]
async fn test_track_without_art_blanks_display() {
    let mut h = Harness::simple();
    h.poll(playing("Roads", "http://art/roads.jpg")).await;

    h.poll(playing("Line In", "")).await;

    assert_eq!(h.app.display().view(), View::Blank);
    assert_eq!(h.images.requests().len(), 1);

    // Repeating the same track does not toggle the backlight again
    let before = h.backlight.status();
    h.poll(playing("Line In", "")).await;
    assert_eq!(h.backlight.status(), before);
}

#[tokio::test]
async fn test_detail_view_times_out_to_album() {
    let settings = DisplaySettings {
        show_details: true,
        show_artist_and_album: true,
        show_details_timeout: Some(Duration::from_secs(10)),
    };
    let mut h = Harness::new(settings, SlideshowCycler::disabled());

    h.poll(playing("Roads", "http://art/roads.jpg")).await;
    assert_eq!(h.app.display().view(), View::Detail);

    let first = h.scheduler.pending();
    assert_eq!(first.len(), 1);

    // A new track restarts the timeout
    h.poll(playing("Sour Times", "http://art/sour.jpg")).await;
    let second = h.scheduler.pending();
    assert_eq!(second.len(), 1);
    assert_ne!(first, second);

    assert!(!h.app.on_timer(first[0]).unwrap());
    assert_eq!(h.app.display().view(), View::Detail);

    assert!(h.app.on_timer(second[0]).unwrap());
    assert_eq!(h.app.display().view(), View::Album);
}

#[tokio::test]
async fn test_slideshow_fills_pauses() {
    let dir = TempDir::new().unwrap();
    create_files(dir.path(), &["1.png", "2.png"]);
    let slideshow = SlideshowCycler::from_directory(dir.path(), Vec::new()).unwrap();
    let slides: Vec<String> = slideshow
        .images()
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let mut h = Harness::new(DisplaySettings::default(), slideshow);

    h.poll(paused("Roads", "http://art/roads.jpg")).await;

    assert!(h.app.is_showing_slides());
    assert_eq!(h.app.display().view(), View::Album);
    assert_eq!(h.surface.state().text.track, "");
    assert_eq!(h.images.requests(), vec![slides[0].clone()]);

    // Staying paused does not restart the slideshow
    h.poll(paused("Roads", "http://art/roads.jpg")).await;
    assert_eq!(h.images.requests().len(), 1);

    h.app.advance_slideshow().await.unwrap();
    h.app.advance_slideshow().await.unwrap();
    assert_eq!(h.images.requests()[1..], [slides[1].clone(), slides[0].clone()]);

    h.poll(playing("Roads", "http://art/roads.jpg")).await;

    assert!(!h.app.is_showing_slides());
    assert_eq!(h.surface.state().text.track, "Roads");
    assert_eq!(h.images.requests().last().unwrap(), "http://art/roads.jpg");

    // Ticks while playing leave the track alone
    h.app.advance_slideshow().await.unwrap();
    assert_eq!(h.images.requests().len(), 4);
}

#[tokio::test]
async fn test_webhook_push_suspends_polling_until_timeout() {
    let mut h = Harness::simple();
    assert!(h.app.needs_poll());

    h.app.refresh(Some(playing("Roads", "http://art/roads.jpg"))).await.unwrap();

    assert!(h.app.tracker().push_active());
    assert!(!h.app.needs_poll());
    assert_eq!(h.app.display().view(), View::Album);

    h.clock.advance(Duration::from_secs(131));
    assert!(h.app.needs_poll());

    h.poll(playing("Roads", "http://art/roads.jpg")).await;
    assert!(!h.app.tracker().push_active());
}

#[tokio::test]
async fn test_radio_stream_shows_station() {
    let mut h = Harness::simple();

    h.poll(json!({
        "playbackState": "PLAYING",
        "currentTrack": {
            "type": "radio",
            "title": "x-sonosapi-hls:stream_bbc_radio_two",
            "stationName": "BBC Radio 2",
            "absoluteAlbumArtUri": "http://art/bbc2.png"
        }
    })).await;

    let text = h.surface.state().text;
    assert_eq!(text.track, "BBC Radio 2");
    assert!(h.app.tracker().state().title.is_empty());
    assert_eq!(h.images.requests(), vec!["http://art/bbc2.png"]);
}

#[tokio::test]
async fn test_cleanup_restores_backlight() {
    let mut h = Harness::simple();
    h.poll(paused("Roads", "http://art/roads.jpg")).await;

    h.app.cleanup().unwrap();

    assert!(h.backlight.status().cleaned_up);
}
