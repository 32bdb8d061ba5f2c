// Last known playback metadata for the monitored zone
use std::fmt;
use std::time::Instant;

use crate::data::{MediaType, PlaybackStatus};

/// Equality fingerprint of a track together with its resolved album art.
///
/// Both values live in one struct so that they are always replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackIdentity {
    pub key: String,
    pub image_uri: String,
}

#[derive(Debug, Clone, Default)]
pub struct TrackState {
    pub playback_status: PlaybackStatus,
    pub media_type: MediaType,

    /// Title exactly as reported by the API, including stream placeholders
    pub raw_title: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub station_name: String,

    /// Track length in seconds, 0 when unknown
    pub duration_seconds: u64,

    /// None until the first track has been seen
    pub identity: Option<TrackIdentity>,

    pub last_poll_at: Option<Instant>,
    pub last_push_at: Option<Instant>,
}

impl TrackState {
    pub fn image_uri(&self) -> &str {
        self.identity.as_ref().map(|i| i.image_uri.as_str()).unwrap_or("")
    }

    pub fn identity_key(&self) -> &str {
        self.identity.as_ref().map(|i| i.key.as_str()).unwrap_or("")
    }

    /// Name shown as the headline: the track title, or the station for streams
    /// that do not carry a usable title.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.station_name
        } else {
            &self.title
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback_status.is_playing()
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identity {
            Some(identity) => write!(f, "{} ({})", identity.key, self.playback_status),
            None => write!(f, "<no track> ({})", self.playback_status),
        }
    }
}
