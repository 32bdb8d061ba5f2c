// Data structures for the now-playing display

pub mod media_type;
pub mod playback_status;
pub mod refresh_outcome;
pub mod track_state;

pub use media_type::*;
pub use playback_status::*;
pub use refresh_outcome::*;
pub use track_state::*;
