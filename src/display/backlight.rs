use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use log::{debug, info};

use crate::display::error::DisplayError;

/// Root of the Linux backlight class devices
pub const SYSFS_BACKLIGHT_ROOT: &str = "/sys/class/backlight";

/// `bl_power` values, see FB_BLANK_* in linux/fb.h
const BL_POWER_ON: &str = "0";
const BL_POWER_OFF: &str = "4";

/// Power control of the screen backlight
pub trait Backlight: Send {
    fn set_power(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Release the hardware when the program exits
    fn cleanup(&mut self) -> Result<(), DisplayError>;
}

/// Backlight driven through `/sys/class/backlight/<device>/bl_power`
#[derive(Debug, Clone)]
pub struct SysfsBacklight {
    power_file: PathBuf,
    power: Option<bool>,
}

impl SysfsBacklight {
    pub fn new(device: &str) -> Self {
        Self::with_root(Path::new(SYSFS_BACKLIGHT_ROOT), device)
    }

    /// Use a different class directory, e.g. for tests
    pub fn with_root(root: &Path, device: &str) -> Self {
        SysfsBacklight {
            power_file: root.join(device).join("bl_power"),
            power: None,
        }
    }

    pub fn power_file(&self) -> &Path {
        &self.power_file
    }
}

impl Backlight for SysfsBacklight {
    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        if self.power == Some(on) {
            return Ok(());
        }

        let value = if on { BL_POWER_ON } else { BL_POWER_OFF };
        fs::write(&self.power_file, value).map_err(|e| {
            DisplayError::Backlight(format!("Failed to write {}: {}", self.power_file.display(), e))
        })?;

        debug!("Backlight {}", if on { "on" } else { "off" });
        self.power = Some(on);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), DisplayError> {
        info!("Restoring backlight power");
        self.power = None;
        self.set_power(true)
    }
}

/// Observed backlight activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BacklightStatus {
    pub power: Option<bool>,
    pub on_calls: usize,
    pub off_calls: usize,
    pub cleaned_up: bool,
}

/// Backlight for screens without power control. Only remembers what it was told.
#[derive(Debug, Clone, Default)]
pub struct NullBacklight {
    status: Arc<Mutex<BacklightStatus>>,
}

impl NullBacklight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls seen so far, shared between clones
    pub fn status(&self) -> BacklightStatus {
        self.status.lock().map(|s| *s).unwrap_or_default()
    }
}

impl Backlight for NullBacklight {
    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        let mut status = self.status
            .lock()
            .map_err(|_| DisplayError::Backlight("backlight status poisoned".to_string()))?;
        status.power = Some(on);
        if on {
            status.on_calls += 1;
        } else {
            status.off_calls += 1;
        }
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), DisplayError> {
        if let Ok(mut status) = self.status.lock() {
            status.cleaned_up = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sysfs_backlight_writes_bl_power() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("rpi_backlight")).unwrap();
        let mut backlight = SysfsBacklight::with_root(root.path(), "rpi_backlight");

        backlight.set_power(false).unwrap();
        assert_eq!(fs::read_to_string(backlight.power_file()).unwrap(), "4");

        backlight.set_power(true).unwrap();
        assert_eq!(fs::read_to_string(backlight.power_file()).unwrap(), "0");
    }

    #[test]
    fn test_sysfs_cleanup_powers_on() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("bl")).unwrap();
        let mut backlight = SysfsBacklight::with_root(root.path(), "bl");

        backlight.set_power(false).unwrap();
        backlight.cleanup().unwrap();
        assert_eq!(fs::read_to_string(backlight.power_file()).unwrap(), "0");
    }

    #[test]
    fn test_missing_device_is_error() {
        let root = TempDir::new().unwrap();
        let mut backlight = SysfsBacklight::with_root(root.path(), "missing");

        assert!(matches!(backlight.set_power(true), Err(DisplayError::Backlight(_))));
    }

    #[test]
    fn test_null_backlight_counts_calls() {
        let backlight = NullBacklight::new();
        let mut driver = backlight.clone();

        driver.set_power(true).unwrap();
        driver.set_power(false).unwrap();
        driver.set_power(true).unwrap();

        let status = backlight.status();
        assert_eq!(status.power, Some(true));
        assert_eq!(status.on_calls, 2);
        assert_eq!(status.off_calls, 1);
    }
}
