use log::{debug, error, warn};
use serde_json::Value;

use crate::data::PlaybackStatus;
use crate::display::{DisplayError, DisplayStateMachine, TimerToken};
use crate::helpers::image_fetch::{AlbumArt, ImageFetcher};
use crate::slideshow::SlideshowCycler;
use crate::sonos::PlaybackStateTracker;

/// What the display was last asked to show
#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Nothing,
    /// Art of the track with this identity key
    Track(String),
    Slide,
}

/// Decides what goes on the screen after each refresh.
///
/// While playing, the current track's art is shown and redrawn whenever the
/// tracker reports a change. Otherwise the slideshow takes over if it is
/// enabled, or the screen is blanked. Errors keep the last picture.
pub struct App {
    tracker: PlaybackStateTracker,
    slideshow: SlideshowCycler,
    display: DisplayStateMachine,
    fetcher: Box<dyn ImageFetcher>,
    content: Content,
}

impl App {
    pub fn new(
        tracker: PlaybackStateTracker,
        slideshow: SlideshowCycler,
        display: DisplayStateMachine,
        fetcher: Box<dyn ImageFetcher>,
    ) -> Self {
        Self {
            tracker,
            slideshow,
            display,
            fetcher,
            content: Content::Nothing,
        }
    }

    pub fn tracker(&self) -> &PlaybackStateTracker {
        &self.tracker
    }

    pub fn display(&self) -> &DisplayStateMachine {
        &self.display
    }

    pub fn slideshow(&self) -> &SlideshowCycler {
        &self.slideshow
    }

    pub fn needs_poll(&self) -> bool {
        self.tracker.needs_poll()
    }

    pub fn is_showing_slides(&self) -> bool {
        self.content == Content::Slide
    }

    /// Refresh the playback state (push when a payload is given) and redraw
    pub async fn refresh(&mut self, payload: Option<Value>) -> Result<(), DisplayError> {
        let outcome = self.tracker.refresh(payload).await;

        // Track boundaries pass through TRANSITIONING, keep the current picture
        if self.tracker.is_error() || self.tracker.state().playback_status == PlaybackStatus::Transitioning {
            return Ok(());
        }

        if !self.tracker.is_playing() {
            return self.idle().await;
        }

        let key = self.tracker.state().identity_key().to_string();
        if outcome.needs_redraw() || self.content != Content::Track(key) {
            return self.show_track().await;
        }

        Ok(())
    }

    /// Move the slideshow on, if it is on screen
    pub async fn advance_slideshow(&mut self) -> Result<(), DisplayError> {
        if self.content != Content::Slide {
            return Ok(());
        }
        self.show_next_slide().await
    }

    /// Forward a fired detail timeout to the display
    pub fn on_timer(&mut self, token: TimerToken) -> Result<bool, DisplayError> {
        self.display.on_timer_fired(token)
    }

    pub fn cleanup(&mut self) -> Result<(), DisplayError> {
        self.display.cleanup()
    }

    async fn idle(&mut self) -> Result<(), DisplayError> {
        if self.slideshow.is_enabled() {
            if self.content != Content::Slide {
                debug!("Nothing playing, starting slideshow");
                return self.show_next_slide().await;
            }
            return Ok(());
        }

        if self.display.is_showing() {
            debug!("Nothing playing, blanking display");
            self.content = Content::Nothing;
            return self.display.hide();
        }
        Ok(())
    }

    async fn show_track(&mut self) -> Result<(), DisplayError> {
        let state = self.tracker.state();
        let key = state.identity_key().to_string();
        let uri = state.image_uri().to_string();

        if uri.is_empty() {
            warn!("No album art for {}, blanking display", key);
            self.content = Content::Track(key);
            return self.display.hide();
        }

        match self.fetcher.fetch(&uri).await {
            Ok(image) => {
                let art = AlbumArt::from_image(&image);
                self.display.update(&art, self.tracker.state())?;
                self.content = Content::Track(key);
                Ok(())
            }
            Err(e) => {
                error!("Keeping previous picture: {}", e);
                Ok(())
            }
        }
    }

    async fn show_next_slide(&mut self) -> Result<(), DisplayError> {
        let path = match self.slideshow.next_image() {
            Ok(path) => path,
            Err(e) => {
                debug!("{}", e);
                if self.content == Content::Slide {
                    self.content = Content::Nothing;
                    return self.display.hide();
                }
                return Ok(());
            }
        };

        let uri = path.to_string_lossy();
        match self.fetcher.fetch(&uri).await {
            Ok(image) => {
                self.display.show_slide(&AlbumArt::from_image(&image))?;
                self.content = Content::Slide;
                Ok(())
            }
            Err(e) => {
                error!("Skipping slideshow image: {}", e);
                Ok(())
            }
        }
    }
}
