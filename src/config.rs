// Configuration for the now-playing display
//
// The configuration is a JSON file resolved once at startup. Every field is
// optional, missing values fall back to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LoggingConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Webhook receiver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub enable: bool,

    #[serde(default = "default_webhook_host")]
    pub host: String,

    #[serde(default = "default_webhook_port")]
    pub port: u16,
}

/// Slideshow shown while nothing is playing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideshowConfig {
    #[serde(default)]
    pub enable: bool,

    /// Directory with the PNG files to cycle through
    #[serde(default)]
    pub images_path: Option<PathBuf>,

    /// Cron-style windows during which the slideshow may run, e.g. "* 8-22 * * *"
    #[serde(default)]
    pub timers: Vec<String>,

    /// Seconds each image stays on screen
    #[serde(default = "default_slideshow_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_api_host")]
    pub api_host: String,

    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Sonos room (zone) to monitor
    #[serde(default = "default_room")]
    pub room: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Show the detail view (art thumbnail plus text) on track change
    #[serde(default)]
    pub show_details: bool,

    #[serde(default = "default_show_artist_and_album")]
    pub show_artist_and_album: bool,

    /// Return from the detail view to the full-screen art after this many seconds
    #[serde(default)]
    pub show_details_timeout_secs: Option<u64>,

    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub slideshow: SlideshowConfig,

    /// Device under /sys/class/backlight, None disables backlight control
    #[serde(default)]
    pub backlight_device: Option<String>,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_api_host() -> String {
    "localhost".to_string()
}

fn default_api_port() -> u16 {
    5005
}

fn default_room() -> String {
    "Living Room".to_string()
}

fn default_poll_interval() -> u64 {
    1
}

fn default_show_artist_and_album() -> bool {
    true
}

fn default_http_timeout() -> u64 {
    5
}

fn default_webhook_host() -> String {
    "0.0.0.0".to_string()
}

fn default_webhook_port() -> u16 {
    8080
}

fn default_slideshow_interval() -> u64 {
    30
}

impl Default for WebhookConfig {
    fn default() -> Self {
        WebhookConfig {
            enable: false,
            host: default_webhook_host(),
            port: default_webhook_port(),
        }
    }
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        SlideshowConfig {
            enable: false,
            images_path: None,
            timers: Vec::new(),
            interval_secs: default_slideshow_interval(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            api_host: default_api_host(),
            api_port: default_api_port(),
            room: default_room(),
            poll_interval_secs: default_poll_interval(),
            show_details: false,
            show_artist_and_album: default_show_artist_and_album(),
            show_details_timeout_secs: None,
            webhook: WebhookConfig::default(),
            slideshow: SlideshowConfig::default(),
            backlight_device: None,
            http_timeout_secs: default_http_timeout(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DisplayConfig {
    /// Load the configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: DisplayConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the file if it exists. Runs before logging is set up, so nothing is logged here.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path).map(Some)
        } else {
            Ok(None)
        }
    }
}
