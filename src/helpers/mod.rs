pub mod clock;
pub mod image_fetch;

pub use clock::{Clock, ManualClock, SystemClock};
pub use image_fetch::{AlbumArt, HttpImageFetcher, ImageError, ImageFetcher};
