//! Integration tests for the command line interface

use std::process::Command;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_help() {
        let output = Command::new(env!("CARGO_BIN_EXE_sonosdisplay"))
            .arg("--help")
            .output()
            .expect("Failed to execute command");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Now-playing album art display"));
        assert!(stdout.contains("--config"));
        assert!(stdout.contains("--room"));
        assert!(stdout.contains("--debug"));
    }

    #[test]
    fn test_cli_version() {
        let output = Command::new(env!("CARGO_BIN_EXE_sonosdisplay"))
            .arg("--version")
            .output()
            .expect("Failed to execute command");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_invalid_config_fails_at_startup() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let output = Command::new(env!("CARGO_BIN_EXE_sonosdisplay"))
            .arg("--config")
            .arg(&path)
            .output()
            .expect("Failed to execute command");

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Parse"));
    }
}
