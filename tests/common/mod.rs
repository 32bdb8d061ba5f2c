// Common helpers for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::{json, Value};

use sonosdisplay::display::{
    DisplaySettings, DisplayStateMachine, HeadlessSurface, ManualScheduler, NullBacklight,
};
use sonosdisplay::helpers::{ImageError, ImageFetcher, ManualClock};
use sonosdisplay::slideshow::SlideshowCycler;
use sonosdisplay::sonos::{PlaybackStateTracker, StateFetcher, TrackerError};
use sonosdisplay::App;

/// State fetcher answering polls from a queue
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    responses: Arc<Mutex<VecDeque<Result<Value, TrackerError>>>>,
}

impl ScriptedFetcher {
    pub fn enqueue(&self, response: Result<Value, TrackerError>) {
        self.responses.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl StateFetcher for ScriptedFetcher {
    async fn fetch_state(&self, _room: &str) -> Result<Value, TrackerError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TrackerError::Transport("connection refused".to_string())))
    }
}

/// Image fetcher that records requested URIs and fails for URIs containing "broken"
#[derive(Clone, Default)]
pub struct RecordingImageFetcher {
    requests: Arc<Mutex<Vec<String>>>,
}

impl RecordingImageFetcher {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for RecordingImageFetcher {
    async fn fetch(&self, uri: &str) -> Result<DynamicImage, ImageError> {
        self.requests.lock().unwrap().push(uri.to_string());
        if uri.contains("broken") {
            return Err(ImageError::Fetch(format!("{}: 404 Not Found", uri)));
        }
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([20, 40, 60]))))
    }
}

/// An `App` wired to test doubles, with handles to inspect each of them
pub struct Harness {
    pub app: App,
    pub api: ScriptedFetcher,
    pub images: RecordingImageFetcher,
    pub backlight: NullBacklight,
    pub surface: HeadlessSurface,
    pub scheduler: ManualScheduler,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new(settings: DisplaySettings, slideshow: SlideshowCycler) -> Self {
        let api = ScriptedFetcher::default();
        let images = RecordingImageFetcher::default();
        let backlight = NullBacklight::new();
        let surface = HeadlessSurface::new();
        let scheduler = ManualScheduler::new();
        let clock = ManualClock::new();

        let tracker = PlaybackStateTracker::new("Living Room", Box::new(api.clone()), Arc::new(clock.clone()));
        let display = DisplayStateMachine::new(
            Box::new(backlight.clone()),
            Box::new(surface.clone()),
            Box::new(scheduler.clone()),
            settings,
        );
        let app = App::new(tracker, slideshow, display, Box::new(images.clone()));

        Harness { app, api, images, backlight, surface, scheduler, clock }
    }

    pub fn simple() -> Self {
        Self::new(DisplaySettings::default(), SlideshowCycler::disabled())
    }

    /// Queue a state response and run one poll cycle
    pub async fn poll(&mut self, state: Value) {
        self.api.enqueue(Ok(state));
        self.app.refresh(None).await.unwrap();
    }
}

pub fn playing(title: &str, art: &str) -> Value {
    json!({
        "playbackState": "PLAYING",
        "currentTrack": {
            "type": "track",
            "title": title,
            "artist": "Portishead",
            "album": "Dummy",
            "duration": 301,
            "albumArtUri": art
        },
        "nextTrack": {}
    })
}

pub fn paused(title: &str, art: &str) -> Value {
    let mut state = playing(title, art);
    state["playbackState"] = json!("PAUSED_PLAYBACK");
    state
}

/// Create empty files with the given names in `dir`
pub fn create_files(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"").unwrap();
    }
}
