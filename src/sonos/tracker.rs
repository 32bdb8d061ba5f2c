use std::sync::Arc;
use std::time::{Duration, Instant};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::data::{MediaType, PlaybackStatus, RefreshOutcome, TrackIdentity, TrackState};
use crate::helpers::clock::Clock;
use crate::sonos::api_client::StateFetcher;
use crate::sonos::error::{ParseError, TrackerError};
use crate::sonos::radio;

/// Time without webhook activity after which polling takes over again
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(130);

/// Speaker base URI inside a `/getaa?` album art link, e.g. `http://192.168.1.20:1400`
static SPEAKER_URI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://.*:1400)/getaa\?.*").unwrap());

/// Fields of `currentTrack`, with absent values normalized to empty/zero
#[derive(Debug, Default)]
struct RawTrack {
    media_type: MediaType,
    title: String,
    artist: String,
    album: String,
    station: String,
    duration: u64,
}

impl RawTrack {
    fn from_json(track: Option<&Map<String, Value>>) -> Self {
        let track = match track {
            Some(t) => t,
            None => return RawTrack::default(),
        };
        let text = |key: &str| {
            track.get(key)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };

        RawTrack {
            media_type: MediaType::from_api(&text("type")),
            title: text("title"),
            artist: text("artist"),
            album: text("album"),
            station: text("stationName"),
            duration: track.get("duration").map(parse_duration).unwrap_or(0),
        }
    }

    fn is_empty(&self) -> bool {
        self.album.is_empty()
            && self.artist.is_empty()
            && self.duration == 0
            && self.station.is_empty()
            && self.title.is_empty()
    }
}

fn parse_duration(value: &Value) -> u64 {
    if let Some(secs) = value.as_u64() {
        return secs;
    }
    match value.as_f64() {
        Some(secs) if secs > 0.0 => secs.round() as u64,
        _ => 0,
    }
}

/// Format a duration as `H:MM:SS`, or None for unknown (zero) durations
pub fn format_duration(seconds: u64) -> Option<String> {
    if seconds == 0 {
        return None;
    }
    Some(format!("{}:{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60, seconds % 60))
}

/// Titles that are stream identifiers rather than something a person would read
pub fn is_placeholder_title(raw_title: &str) -> bool {
    raw_title.starts_with("x-sonosapi-") || raw_title.ends_with(".m3u8")
}

/// Build the change-detection fingerprint of a track. Order of the parts matters.
pub fn identity_key(artist: &str, title: &str, album: &str, duration: u64, station: &str) -> String {
    let mut key = artist.to_string();
    if !title.is_empty() {
        key.push_str(&format!(" - {}", title));
    }
    if !album.is_empty() {
        key.push_str(&format!(" ({})", album));
    }
    if let Some(formatted) = format_duration(duration) {
        key.push_str(&format!(" - {}", formatted));
    }
    if !station.is_empty() {
        key.push_str(&format!(" [{}]", station));
    }
    key
}

/// Holds the playback state of one zone and decides when the track changed
pub struct PlaybackStateTracker {
    room: String,
    fetcher: Box<dyn StateFetcher>,
    clock: Arc<dyn Clock>,
    state: TrackState,

    /// Base URI of the speaker, discovered once from a payload
    speaker_uri: Option<String>,

    /// Updates are currently arriving through the webhook
    push_active: bool,

    last_error: Option<TrackerError>,
}

impl PlaybackStateTracker {
    pub fn new(room: &str, fetcher: Box<dyn StateFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            room: room.to_string(),
            fetcher,
            clock,
            state: TrackState::default(),
            speaker_uri: None,
            push_active: false,
            last_error: None,
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    /// Change the actively monitored room
    pub fn set_room(&mut self, room: &str) {
        self.room = room.to_string();
        info!("Monitoring room: {}", room);
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn is_error(&self) -> bool {
        self.state.playback_status == PlaybackStatus::Error
    }

    pub fn last_error(&self) -> Option<&TrackerError> {
        self.last_error.as_ref()
    }

    pub fn push_active(&self) -> bool {
        self.push_active
    }

    pub fn speaker_uri(&self) -> Option<&str> {
        self.speaker_uri.as_deref()
    }

    /// Time of the most recent poll or push, whichever is newer
    pub fn last_update(&self) -> Option<Instant> {
        match (self.state.last_poll_at, self.state.last_push_at) {
            (Some(poll), Some(push)) => Some(poll.max(push)),
            (poll, push) => poll.or(push),
        }
    }

    /// Whether the owner of the event loop should poll on its next tick.
    ///
    /// While webhooks are flowing polling is suspended; once no update has been
    /// seen for `WEBHOOK_TIMEOUT` a poll is requested so that the fallback can
    /// kick in.
    pub fn needs_poll(&self) -> bool {
        if !self.push_active {
            return true;
        }
        match self.last_update() {
            Some(last) => self.clock.now().saturating_duration_since(last) > WEBHOOK_TIMEOUT,
            None => true,
        }
    }

    /// Refresh from a pushed payload, or poll the API when none is given
    pub async fn refresh(&mut self, payload: Option<Value>) -> RefreshOutcome {
        match payload {
            Some(payload) => self.push(&payload),
            None => self.poll().await,
        }
    }

    /// Apply a payload delivered by the webhook
    pub fn push(&mut self, payload: &Value) -> RefreshOutcome {
        if !self.push_active {
            info!("Switching to webhook updates");
        }
        self.state.last_push_at = Some(self.clock.now());
        self.push_active = true;
        self.apply(payload)
    }

    /// Fetch the state from the media API and apply it
    pub async fn poll(&mut self) -> RefreshOutcome {
        self.state.last_poll_at = Some(self.clock.now());
        self.check_push_freshness();

        let result = self.fetcher.fetch_state(&self.room).await;
        match result {
            Ok(payload) => self.apply(&payload),
            Err(e) => {
                self.fail(e);
                RefreshOutcome::Unchanged
            }
        }
    }

    fn check_push_freshness(&mut self) {
        if !self.push_active {
            return;
        }
        if let (Some(poll), Some(push)) = (self.state.last_poll_at, self.state.last_push_at) {
            if poll.saturating_duration_since(push) > WEBHOOK_TIMEOUT {
                warn!("Webhook activity timed out, falling back to polling");
                self.push_active = false;
            }
        }
    }

    fn fail(&mut self, err: TrackerError) {
        match &err {
            TrackerError::Transport(msg) => {
                error!("Connection failed. Ensure `node-sonos-http-api` is running: ({})", msg)
            }
            other => error!("Error reading state for {}: {}", self.room, other),
        }
        self.state.playback_status = PlaybackStatus::Error;
        self.last_error = Some(err);
    }

    fn apply(&mut self, payload: &Value) -> RefreshOutcome {
        let obj = match payload.as_object() {
            Some(obj) => obj,
            None => {
                self.fail(ParseError::NotAnObject.into());
                return RefreshOutcome::Unchanged;
            }
        };

        let status = match obj.get("playbackState").and_then(Value::as_str) {
            Some(s) => PlaybackStatus::from_api(s),
            None => {
                debug!("Payload without playbackState: {}", payload);
                self.fail(ParseError::MissingStatus.into());
                return RefreshOutcome::Unchanged;
            }
        };
        self.last_error = None;
        self.state.playback_status = status;

        // Metadata is only read while playing so a stop never blanks the screen
        if !status.is_playing() {
            return RefreshOutcome::Unchanged;
        }

        let current = obj.get("currentTrack").and_then(Value::as_object);
        let mut raw = RawTrack::from_json(current);

        if raw.is_empty() {
            debug!("No data returned by the API, skipping update");
            return RefreshOutcome::Unchanged;
        }

        if raw.media_type == MediaType::Radio && raw.station.is_empty() {
            raw.station = radio::station_name(&raw.title).to_string();
        }

        let title = if is_placeholder_title(&raw.title) {
            String::new()
        } else {
            raw.title.clone()
        };

        let key = identity_key(&raw.artist, &title, &raw.album, raw.duration, &raw.station);
        let image_uri = self.resolve_image_uri(obj, current);

        let outcome = match &self.state.identity {
            Some(previous) if previous.key == key => {
                if previous.image_uri == image_uri {
                    return RefreshOutcome::Unchanged;
                }
                debug!("Updated image URI: {}", image_uri);
                RefreshOutcome::ImageUpdated
            }
            _ => {
                info!("New track: {}", key);
                RefreshOutcome::TrackChanged
            }
        };

        self.state.media_type = raw.media_type;
        self.state.raw_title = raw.title;
        self.state.title = title;
        self.state.artist = raw.artist;
        self.state.album = raw.album;
        self.state.station_name = raw.station;
        self.state.duration_seconds = raw.duration;
        self.state.identity = Some(TrackIdentity { key, image_uri });

        outcome
    }

    /// Speaker base URI, extracted from `nextTrack.absoluteAlbumArtUri` until found once
    fn discover_speaker_uri(&mut self, obj: &Map<String, Value>) -> Option<String> {
        if self.speaker_uri.is_some() {
            return self.speaker_uri.clone();
        }

        let next_track_art = obj.get("nextTrack")
            .and_then(|t| t.get("absoluteAlbumArtUri"))
            .and_then(Value::as_str)
            .unwrap_or("");

        let found = SPEAKER_URI_PATTERN
            .captures(next_track_art)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        if let Some(uri) = &found {
            debug!("URL for {} found: {}", self.room, uri);
            self.speaker_uri = found.clone();
        }
        found
    }

    fn resolve_image_uri(&mut self, obj: &Map<String, Value>, current: Option<&Map<String, Value>>) -> String {
        let field = |key: &str| {
            current
                .and_then(|t| t.get(key))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };

        let album_art_uri = field("albumArtUri");
        let speaker_uri = self.discover_speaker_uri(obj);

        if album_art_uri.starts_with("http") {
            album_art_uri
        } else if let (Some(speaker), false) = (speaker_uri, album_art_uri.is_empty()) {
            format!("{}{}", speaker, album_art_uri)
        } else {
            field("absoluteAlbumArtUri")
        }
    }
}
