use thiserror::Error;

/// Problems with the shape of a state payload
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Failed to parse response: {0}")]
    InvalidJson(String),

    #[error("Empty response from media API")]
    EmptyResponse,

    #[error("State payload is not a JSON object")]
    NotAnObject,

    #[error("State payload has no playbackState")]
    MissingStatus,
}

/// Errors that can occur while refreshing the playback state
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Connection to media API failed: {0}")]
    Transport(String),

    #[error("Media API error: {0}")]
    Server(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
