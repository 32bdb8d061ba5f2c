// Local image slideshow shown while nothing is playing

pub mod cycler;
pub mod time_window;

pub use cycler::{SlideshowCycler, SlideshowError};
pub use time_window::{TimeWindow, TimeWindowError};
