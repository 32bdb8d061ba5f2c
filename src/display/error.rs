use thiserror::Error;

/// Failures of the display hardware or drawing surface
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Backlight error: {0}")]
    Backlight(String),

    #[error("Display surface error: {0}")]
    Surface(String),
}
