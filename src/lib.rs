/// Data structures shared between the tracker and the display
pub mod data;

/// Playback tracking through node-sonos-http-api
pub mod sonos;

/// Local image slideshow
pub mod slideshow;

/// Display state machine, backlight and drawing surface
pub mod display;

/// Helper utilities for time and image loading
pub mod helpers;

pub mod webhook;
pub mod config;
pub mod logging;

/// Redraw logic tying everything together
pub mod app;

pub use app::App;
pub use config::DisplayConfig;
pub use data::{PlaybackStatus, RefreshOutcome, TrackState};
