/// Kind of media reported in `currentTrack.type`
use serde::{Serialize, Deserialize};
use strum_macros::EnumString;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[strum(serialize = "track")]
    Track,
    #[strum(serialize = "radio")]
    Radio,
    #[strum(serialize = "line_in")]
    LineIn,
    #[strum(disabled)]
    Unknown,
}

impl MediaType {
    pub fn from_api(value: &str) -> Self {
        value.parse().unwrap_or(MediaType::Unknown)
    }
}

impl Default for MediaType {
    fn default() -> Self {
        MediaType::Unknown
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Track => write!(f, "track"),
            MediaType::Radio => write!(f, "radio"),
            MediaType::LineIn => write!(f, "line_in"),
            MediaType::Unknown => write!(f, "unknown"),
        }
    }
}
