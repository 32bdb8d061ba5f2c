use std::time::Duration;
use log::{debug, info};

use crate::config::DisplayConfig;
use crate::data::TrackState;
use crate::display::backlight::Backlight;
use crate::display::error::DisplayError;
use crate::display::surface::{DisplaySurface, TrackText, View};
use crate::display::timer::{TimerHandle, TimerScheduler, TimerToken};
use crate::helpers::image_fetch::AlbumArt;

/// Separator between artist and album in the one-line summary
const DETAIL_SEPARATOR: &str = " • ";

/// How new tracks are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    /// Enter the detail view on every track change
    pub show_details: bool,
    pub show_artist_and_album: bool,
    /// Fall back from the detail view to the album view after this delay
    pub show_details_timeout: Option<Duration>,
}

impl DisplaySettings {
    pub fn from_config(config: &DisplayConfig) -> Self {
        DisplaySettings {
            show_details: config.show_details,
            show_artist_and_album: config.show_artist_and_album,
            show_details_timeout: config.show_details_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self::from_config(&DisplayConfig::default())
    }
}

/// Compose the detail view text for a track
pub fn track_text(track: &TrackState, show_artist_and_album: bool) -> TrackText {
    let display_title = track.display_title().to_string();

    if !show_artist_and_album {
        return TrackText {
            track: display_title,
            ..TrackText::default()
        };
    }

    // Streams often repeat the station as the artist
    let artist = if track.artist != display_title {
        track.artist.clone()
    } else {
        String::new()
    };

    let detail = [artist.as_str(), track.album.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(DETAIL_SEPARATOR);

    TrackText {
        track: display_title,
        artist,
        album: track.album.clone(),
        detail,
    }
}

/// Owns what is on the screen: album view, detail view or blank.
///
/// Every transition raises the view, flushes the surface and sets the
/// backlight before returning. `hide` is the only transition that powers the
/// backlight off.
pub struct DisplayStateMachine {
    view: View,
    is_showing: bool,
    pending: Option<Box<dyn TimerHandle>>,
    next_token: TimerToken,
    settings: DisplaySettings,
    backlight: Box<dyn Backlight>,
    surface: Box<dyn DisplaySurface>,
    scheduler: Box<dyn TimerScheduler>,
}

impl DisplayStateMachine {
    pub fn new(
        backlight: Box<dyn Backlight>,
        surface: Box<dyn DisplaySurface>,
        scheduler: Box<dyn TimerScheduler>,
        settings: DisplaySettings,
    ) -> Self {
        Self {
            view: View::Blank,
            is_showing: false,
            pending: None,
            next_token: 1,
            settings,
            backlight,
            surface,
            scheduler,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_showing(&self) -> bool {
        self.is_showing
    }

    pub fn has_pending_timeout(&self) -> bool {
        self.pending.is_some()
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    /// Full-screen album art. Supersedes a pending detail timeout.
    pub fn show_album(&mut self) -> Result<(), DisplayError> {
        self.cancel_pending();
        self.transition(View::Album)
    }

    /// Detail view. With a timeout, any earlier timeout is replaced by a new one
    /// that returns to the album view.
    pub fn show_detail(&mut self, timeout: Option<Duration>) -> Result<(), DisplayError> {
        if let Some(delay) = timeout {
            self.cancel_pending();
            let token = self.next_token;
            self.next_token += 1;
            debug!("Detail view timeout {} in {:?}", token, delay);
            self.pending = Some(self.scheduler.schedule(delay, token));
        }
        self.transition(View::Detail)
    }

    /// Blank the screen and switch the backlight off
    pub fn hide(&mut self) -> Result<(), DisplayError> {
        self.cancel_pending();
        self.backlight.set_power(false)?;
        self.surface.raise(View::Blank)?;
        self.surface.flush()?;
        self.is_showing = false;
        self.view = View::Blank;
        Ok(())
    }

    /// Handle a fired detail timeout. Returns false for tokens that are no longer pending.
    pub fn on_timer_fired(&mut self, token: TimerToken) -> Result<bool, DisplayError> {
        match &self.pending {
            Some(handle) if handle.token() == token => {
                self.pending = None;
                self.transition(View::Album)?;
                Ok(true)
            }
            _ => {
                debug!("Ignoring stale detail timeout {}", token);
                Ok(false)
            }
        }
    }

    /// Show new album art and track text in the configured view
    pub fn update(&mut self, art: &AlbumArt, track: &TrackState) -> Result<(), DisplayError> {
        let text = track_text(track, self.settings.show_artist_and_album);
        self.surface.set_content(art, &text)?;

        if self.settings.show_details {
            self.show_detail(self.settings.show_details_timeout)
        } else {
            self.show_album()
        }
    }

    /// Show a slideshow image full screen, without text
    pub fn show_slide(&mut self, art: &AlbumArt) -> Result<(), DisplayError> {
        self.surface.set_content(art, &TrackText::default())?;
        self.show_album()
    }

    /// Release the backlight. Called once on shutdown.
    pub fn cleanup(&mut self) -> Result<(), DisplayError> {
        info!("Cleaning up display");
        self.cancel_pending();
        self.backlight.cleanup()
    }

    fn cancel_pending(&mut self) {
        if let Some(mut handle) = self.pending.take() {
            handle.cancel();
        }
    }

    fn transition(&mut self, view: View) -> Result<(), DisplayError> {
        if self.view != view {
            debug!("Display {} -> {}", self.view, view);
        }
        self.surface.raise(view)?;
        self.surface.flush()?;
        self.backlight.set_power(true)?;
        self.view = view;
        self.is_showing = true;
        Ok(())
    }
}

impl Drop for DisplayStateMachine {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
