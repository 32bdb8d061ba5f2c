use std::path::{Path, PathBuf};
use chrono::{DateTime, Local, TimeZone};
use log::{debug, error, info, warn};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::SlideshowConfig;
use crate::slideshow::time_window::TimeWindow;

/// Extension of the files picked up by the directory scan
pub const SLIDESHOW_EXTENSION: &str = "png";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SlideshowError {
    #[error("Slideshow configuration error: {0}")]
    Configuration(String),

    #[error("Slideshow is disabled")]
    Disabled,
}

/// Round-robin over the images of a local directory
#[derive(Debug, Clone, Default)]
pub struct SlideshowCycler {
    images: Vec<PathBuf>,
    cursor: usize,
    windows: Vec<TimeWindow>,
}

impl SlideshowCycler {
    /// Build the cycler from configuration.
    ///
    /// Configuration problems are logged once here and leave the slideshow
    /// disabled for the lifetime of the process.
    pub fn new(config: &SlideshowConfig) -> Self {
        if !config.enable {
            debug!("Slideshow not enabled in configuration");
            return Self::disabled();
        }

        let windows = parse_windows(&config.timers);

        let result = if !config.timers.is_empty() && windows.is_empty() {
            Err(SlideshowError::Configuration("none of the configured timers is valid".to_string()))
        } else {
            match &config.images_path {
                Some(path) => Self::from_directory(path, windows),
                None => Err(SlideshowError::Configuration("no images_path configured".to_string())),
            }
        };

        match result {
            Ok(cycler) => {
                info!("Slideshow started with {} images", cycler.len());
                cycler
            }
            Err(e) => {
                error!("{}, slideshow not started", e);
                Self::disabled()
            }
        }
    }

    /// A cycler without images, never enabled
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Scan `path` (non-recursively) for images. The list is fixed after this call.
    pub fn from_directory(path: &Path, windows: Vec<TimeWindow>) -> Result<Self, SlideshowError> {
        if !path.is_dir() {
            return Err(SlideshowError::Configuration(format!(
                "Cannot access path: {}, check that it exists",
                path.display()
            )));
        }

        let images: Vec<PathBuf> = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_slideshow_image(p))
            .collect();

        if images.is_empty() {
            return Err(SlideshowError::Configuration(format!(
                "There are no {} files in path: {}",
                SLIDESHOW_EXTENSION,
                path.display()
            )));
        }

        debug!("Found {} slideshow images in {}", images.len(), path.display());
        Ok(Self::from_images(images, windows))
    }

    /// Build a cycler over an explicit list, kept in the given order
    pub fn from_images(images: Vec<PathBuf>, windows: Vec<TimeWindow>) -> Self {
        Self {
            images,
            cursor: 0,
            windows,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled_at(&Local::now())
    }

    /// Images are available and, if windows are configured, one of them matches `at`
    pub fn is_enabled_at<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        if self.images.is_empty() {
            return false;
        }
        self.windows.is_empty() || self.windows.iter().any(|w| w.matches(at))
    }

    pub fn next_image(&mut self) -> Result<PathBuf, SlideshowError> {
        self.next_image_at(&Local::now())
    }

    pub fn next_image_at<Tz: TimeZone>(&mut self, at: &DateTime<Tz>) -> Result<PathBuf, SlideshowError> {
        if !self.is_enabled_at(at) {
            debug!("Not getting next image, slideshow is disabled");
            return Err(SlideshowError::Disabled);
        }

        let image = self.images[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.images.len();
        Ok(image)
    }
}

fn is_slideshow_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == SLIDESHOW_EXTENSION)
        .unwrap_or(false)
}

/// Parse configured windows, dropping (and logging) the invalid ones
fn parse_windows(timers: &[String]) -> Vec<TimeWindow> {
    timers
        .iter()
        .filter_map(|expr| match TimeWindow::parse(expr) {
            Ok(window) => Some(window),
            Err(e) => {
                warn!("{}, ignoring it", e);
                None
            }
        })
        .collect()
}
