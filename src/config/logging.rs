//! Logging settings of the tool itself.
//!
//! Not to be confused with the node-side `log` section of a cache document.
//! Logs go to stderr by default so `create --dry-run` output on stdout can be
//! piped as-is.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ProvisionError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,

    /// Include the module path of each event.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
            output: LogOutput::Stderr,
            with_target: false,
        }
    }
}

/// Matches `s` case-insensitively against `choices`.
fn parse_choice<T: Copy>(kind: &str, s: &str, choices: &[(&str, T)]) -> Result<T, ProvisionError> {
    let wanted = s.trim().to_lowercase();
    choices
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, value)| *value)
        .ok_or_else(|| ProvisionError::config(format!("Unknown log {}: {}", kind, s)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as an `EnvFilter` directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(
            "level",
            s,
            &[
                ("trace", LogLevel::Trace),
                ("debug", LogLevel::Debug),
                ("info", LogLevel::Info),
                ("warn", LogLevel::Warn),
                ("warning", LogLevel::Warn),
                ("error", LogLevel::Error),
            ],
        )
    }
}

/// Line format: one JSON object per event, or human-readable text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Text,
}

impl FromStr for LogFormat {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("format", s, &[("json", LogFormat::Json), ("text", LogFormat::Text)])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
}

impl FromStr for LogOutput {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(
            "output",
            s,
            &[("stdout", LogOutput::Stdout), ("stderr", LogOutput::Stderr)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_stdout_free() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.output, LogOutput::Stderr);
        assert!(!config.with_target);
    }

    #[test]
    fn test_level_parse_and_directive() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(" warning ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::default().as_str(), "info");

        let err = "loud".parse::<LogLevel>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: Unknown log level: loud");
    }

    #[test]
    fn test_format_and_output_parse() {
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("stdout".parse::<LogOutput>().unwrap(), LogOutput::Stdout);
        assert!("file".parse::<LogOutput>().is_err());
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_kebab_case_yaml() {
        let config: LoggingConfig =
            serde_yaml::from_str("level: trace\nformat: json\nwith-target: true\n").unwrap();
        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stderr);
        assert!(config.with_target);
    }
}
