use std::collections::HashMap;
use std::io::Write;
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Serialize};
use env_logger::{Builder, Target, WriteStyle};

/// Logging subsystems of the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoggingSubsystem {
    /// Main loop and redraw logic
    #[serde(rename = "main")]
    Main,
    /// Playback tracking and the media API client
    #[serde(rename = "sonos")]
    Sonos,
    #[serde(rename = "slideshow")]
    Slideshow,
    /// Display state machine, backlight and surface
    #[serde(rename = "display")]
    Display,
    #[serde(rename = "webhook")]
    Webhook,
    /// HTTP client operations
    #[serde(rename = "http")]
    Http,
    /// Third-party dependencies
    #[serde(rename = "deps")]
    Dependencies,
}

impl LoggingSubsystem {
    /// Get the module prefix for this subsystem
    pub fn module_prefix(&self) -> &'static str {
        match self {
            LoggingSubsystem::Main => "sonosdisplay,sonosdisplay::app",
            LoggingSubsystem::Sonos => "sonosdisplay::sonos",
            LoggingSubsystem::Slideshow => "sonosdisplay::slideshow",
            LoggingSubsystem::Display => "sonosdisplay::display",
            LoggingSubsystem::Webhook => "sonosdisplay::webhook,rocket",
            LoggingSubsystem::Http => "sonosdisplay::helpers::image_fetch,reqwest,hyper",
            LoggingSubsystem::Dependencies => "rocket,hyper,reqwest",
        }
    }

    fn parse(name: &str) -> Option<LoggingSubsystem> {
        match name.to_lowercase().as_str() {
            "main" => Some(LoggingSubsystem::Main),
            "sonos" => Some(LoggingSubsystem::Sonos),
            "slideshow" => Some(LoggingSubsystem::Slideshow),
            "display" => Some(LoggingSubsystem::Display),
            "webhook" => Some(LoggingSubsystem::Webhook),
            "http" => Some(LoggingSubsystem::Http),
            "deps" | "dependencies" => Some(LoggingSubsystem::Dependencies),
            _ => None,
        }
    }
}

/// Logging configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Target for log output (stdout, stderr)
    #[serde(default = "default_target")]
    pub target: String,

    #[serde(default = "default_timestamps")]
    pub timestamps: bool,

    #[serde(default = "default_colors")]
    pub colors: bool,

    /// Subsystem-specific log levels
    #[serde(default)]
    pub subsystems: HashMap<String, String>,

    #[serde(default)]
    pub include_module_path: bool,

    #[serde(default)]
    pub include_line_numbers: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_target() -> String {
    "stdout".to_string()
}

fn default_timestamps() -> bool {
    true
}

fn default_colors() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            target: default_target(),
            timestamps: default_timestamps(),
            colors: default_colors(),
            subsystems: HashMap::new(),
            include_module_path: false,
            include_line_numbers: false,
        }
    }
}

impl LoggingConfig {
    /// Convert string log level to LevelFilter
    fn parse_log_level(level: &str) -> LevelFilter {
        match level.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => {
                eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", level);
                LevelFilter::Info
            }
        }
    }

    /// Raise the level when `--debug`/`-d` or `--verbose`/`-v` is given
    pub fn apply_cli_flags(&mut self, debug: bool, verbose: bool) {
        if debug {
            self.level = "debug".to_string();
        } else if verbose && Self::parse_log_level(&self.level) < LevelFilter::Info {
            self.level = "info".to_string();
        }
    }

    /// Build the env_logger filter string, e.g. `info,sonosdisplay::sonos=debug`
    pub fn build_filter_string(&self) -> String {
        let mut filter_parts = vec![self.level.clone()];

        let mut names: Vec<&String> = self.subsystems.keys().collect();
        names.sort();
        for name in names {
            let level = &self.subsystems[name];
            match LoggingSubsystem::parse(name) {
                Some(subsystem) => {
                    for prefix in subsystem.module_prefix().split(',') {
                        filter_parts.push(format!("{}={}", prefix.trim(), level));
                    }
                }
                // Allow custom module specifications
                None => filter_parts.push(format!("{}={}", name, level)),
            }
        }

        filter_parts.join(",")
    }

    /// Initialize the logger with this configuration
    pub fn initialize_logger(&self) -> Result<(), String> {
        let filter_string = self.build_filter_string();
        debug!("Using logging filter: {}", filter_string);

        let mut builder = Builder::new();
        builder.parse_env("RUST_LOG");
        builder.filter(None, Self::parse_log_level(&self.level));

        for (name, level) in &self.subsystems {
            let level_filter = Self::parse_log_level(level);
            match LoggingSubsystem::parse(name) {
                Some(subsystem) => {
                    for prefix in subsystem.module_prefix().split(',') {
                        builder.filter(Some(prefix.trim()), level_filter);
                    }
                }
                None => {
                    builder.filter(Some(name), level_filter);
                }
            }
        }

        builder.write_style(if self.colors { WriteStyle::Auto } else { WriteStyle::Never });

        match self.target.to_lowercase().as_str() {
            "stdout" => {
                builder.target(Target::Stdout);
            }
            "stderr" => {
                builder.target(Target::Stderr);
            }
            _ => return Err(format!("Unknown logging target: {}", self.target)),
        }

        let include_module_path = self.include_module_path;
        let include_line_numbers = self.include_line_numbers;
        let timestamps = self.timestamps;

        builder.format(move |buf, record| {
            let mut output = String::new();

            if timestamps {
                output.push_str(&format!("[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
            }

            output.push_str(&format!("[{}] ", record.level()));

            if include_module_path {
                if let Some(module) = record.module_path() {
                    output.push_str(&format!("[{}] ", module));
                }
            }

            if include_line_numbers {
                if let (Some(file), Some(line)) = (record.file(), record.line()) {
                    output.push_str(&format!("[{}:{}] ", file, line));
                }
            }

            output.push_str(&format!("{}", record.args()));

            writeln!(buf, "{}", output)
        });

        builder.try_init()
            .map_err(|e| format!("Failed to initialize logger: {}", e))?;

        info!("Logging initialized with filter: {}", filter_string);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_string_expands_subsystems() {
        let mut config = LoggingConfig::default();
        config.subsystems.insert("sonos".to_string(), "debug".to_string());
        config.subsystems.insert("webhook".to_string(), "warn".to_string());
        config.subsystems.insert("my_crate::module".to_string(), "trace".to_string());

        assert_eq!(
            config.build_filter_string(),
            "info,my_crate::module=trace,sonosdisplay::sonos=debug,sonosdisplay::webhook=warn,rocket=warn"
        );
    }

    #[test]
    fn test_cli_flags() {
        let mut config = LoggingConfig::default();
        config.apply_cli_flags(true, false);
        assert_eq!(config.level, "debug");

        let mut quiet = LoggingConfig { level: "warn".to_string(), ..LoggingConfig::default() };
        quiet.apply_cli_flags(false, true);
        assert_eq!(quiet.level, "info");

        let mut unchanged = LoggingConfig::default();
        unchanged.apply_cli_flags(false, false);
        assert_eq!(unchanged.level, "info");
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: LoggingConfig = serde_json::from_str(r#"{ "level": "debug" }"#).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.target, "stdout");
        assert!(config.timestamps);
        assert!(config.subsystems.is_empty());
    }
}
