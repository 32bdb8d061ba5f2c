use std::sync::{Arc, Mutex};
use log::{debug, info};

use crate::display::error::DisplayError;
use crate::helpers::image_fetch::{AlbumArt, SCREEN_H, SCREEN_W};

/// The view currently raised on the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Full-screen album art
    Album,
    /// Thumbnail with track, artist and album text
    Detail,
    /// Curtain in front of everything, backlight off
    Blank,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Album => write!(f, "album"),
            View::Detail => write!(f, "detail"),
            View::Blank => write!(f, "blank"),
        }
    }
}

/// Text lines of the detail view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackText {
    pub track: String,
    pub artist: String,
    pub album: String,
    /// Single-line "artist • album" summary
    pub detail: String,
}

/// Something that can draw the album and detail views
pub trait DisplaySurface: Send {
    /// Replace the art and text of both views
    fn set_content(&mut self, art: &AlbumArt, text: &TrackText) -> Result<(), DisplayError>;

    /// Bring a view to the front
    fn raise(&mut self, view: View) -> Result<(), DisplayError>;

    /// Render pending changes now
    fn flush(&mut self) -> Result<(), DisplayError>;
}

/// What a `HeadlessSurface` has been asked to show
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessState {
    pub view: Option<View>,
    pub text: TrackText,
    pub content_updates: usize,
    pub flushes: usize,
}

/// Surface without a screen: logs what would be drawn
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        info!("Using headless {}x{} display surface", SCREEN_W, SCREEN_H);
        Self::default()
    }

    /// Snapshot of the surface, shared between clones
    pub fn state(&self) -> HeadlessState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn with_state<F: FnOnce(&mut HeadlessState)>(&self, f: F) -> Result<(), DisplayError> {
        let mut state = self.state
            .lock()
            .map_err(|_| DisplayError::Surface("surface state poisoned".to_string()))?;
        f(&mut state);
        Ok(())
    }
}

impl DisplaySurface for HeadlessSurface {
    fn set_content(&mut self, art: &AlbumArt, text: &TrackText) -> Result<(), DisplayError> {
        info!("Now showing: {} / {} / {}", text.track, text.artist, text.album);
        debug!("Art {:?}, thumbnail {:?}", art.full.dimensions(), art.thumb.dimensions());
        self.with_state(|state| {
            state.text = text.clone();
            state.content_updates += 1;
        })
    }

    fn raise(&mut self, view: View) -> Result<(), DisplayError> {
        debug!("Raising {} view", view);
        self.with_state(|state| state.view = Some(view))
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.with_state(|state| state.flushes += 1)
    }
}
