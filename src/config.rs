//! Configuration management for the ATS scorer
//!
//! Scoring weights and detection tables are not configuration; they are
//! constants next to the code that applies them.

use crate::error::{AtsScorerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Resumes larger than this are rejected before parsing
    pub max_file_size_mb: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Console => "console",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
        };
        write!(f, "{}", name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig {
                max_file_size_mb: 10,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from `config_path`, writing defaults there on first run
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| AtsScorerError::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AtsScorerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("ats-scorer")
            .join("config.toml")
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.input.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Set a single value by dotted key, e.g. `output.format`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "input.max_file_size_mb" => {
                self.input.max_file_size_mb = value.parse().map_err(|_| {
                    AtsScorerError::Configuration(format!("Expected a whole number of megabytes, got '{}'", value))
                })?;
            }
            "output.format" => {
                self.output.format = crate::cli::parse_output_format(value)
                    .map_err(AtsScorerError::Configuration)?;
            }
            "output.detailed" => self.output.detailed = parse_bool(key, value)?,
            "output.color_output" => self.output.color_output = parse_bool(key, value)?,
            _ => {
                return Err(AtsScorerError::Configuration(format!(
                    "Unknown configuration key: {}. Supported: input.max_file_size_mb, output.format, output.detailed, output.color_output",
                    key
                )));
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(AtsScorerError::Configuration(format!("Expected true or false for {}, got '{}'", key, value))),
    }
}
