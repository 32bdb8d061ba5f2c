pub mod backlight;
pub mod controller;
pub mod error;
pub mod surface;
pub mod timer;

pub use backlight::{Backlight, BacklightStatus, NullBacklight, SysfsBacklight};
pub use controller::{track_text, DisplaySettings, DisplayStateMachine};
pub use error::DisplayError;
pub use surface::{DisplaySurface, HeadlessState, HeadlessSurface, TrackText, View};
pub use timer::{ManualScheduler, ScheduledTimer, TimerHandle, TimerScheduler, TimerToken, TokioTimerScheduler};
