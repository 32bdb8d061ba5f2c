/// Playback status reported by the media API for a zone
use serde::{Serialize, Deserialize};
use strum_macros::EnumString;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Zone is actively playing media
    #[strum(serialize = "PLAYING")]
    Playing,
    /// Playback is paused
    #[strum(serialize = "PAUSED_PLAYBACK")]
    Paused,
    /// Zone is switching between sources or tracks
    #[strum(serialize = "TRANSITIONING")]
    Transitioning,
    /// Playback is stopped
    #[strum(serialize = "STOPPED")]
    Stopped,
    /// The last refresh failed, see `PlaybackStateTracker::last_error`
    #[strum(disabled)]
    Error,
}

impl PlaybackStatus {
    /// Map a raw `playbackState` string from the API.
    ///
    /// Values the API may add later are treated as stopped so that they never
    /// trigger a metadata update.
    pub fn from_api(value: &str) -> Self {
        value.parse().unwrap_or(PlaybackStatus::Stopped)
    }

    pub fn is_playing(&self) -> bool {
        *self == PlaybackStatus::Playing
    }
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        PlaybackStatus::Stopped
    }
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Playing => write!(f, "playing"),
            PlaybackStatus::Paused => write!(f, "paused"),
            PlaybackStatus::Transitioning => write!(f, "transitioning"),
            PlaybackStatus::Stopped => write!(f, "stopped"),
            PlaybackStatus::Error => write!(f, "error"),
        }
    }
}
