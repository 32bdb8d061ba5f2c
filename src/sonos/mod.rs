// Playback state of a Sonos zone, read through node-sonos-http-api

pub mod api_client;
pub mod error;
pub mod radio;
pub mod tracker;

pub use api_client::{SonosApiClient, StateFetcher};
pub use error::{ParseError, TrackerError};
pub use tracker::{PlaybackStateTracker, WEBHOOK_TIMEOUT};
