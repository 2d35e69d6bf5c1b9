//! CLI interface for the ATS scorer

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const RESUME_EXTENSIONS: [&str; 1] = ["pdf"];
pub const JOB_DESCRIPTION_EXTENSIONS: [&str; 3] = ["txt", "md", "pdf"];

#[derive(Parser)]
#[command(name = "ats-scorer")]
#[command(about = "Rule-based ATS compatibility scoring for PDF resumes")]
#[command(long_about = "Score a PDF resume for content completeness, ATS-friendly formatting and job description keyword overlap")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a resume, optionally against a job description
    Score {
        /// Path to resume PDF
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file (TXT, MD, PDF)
        #[arg(short, long, conflicts_with = "job_text")]
        job: Option<PathBuf>,

        /// Job description given inline
        #[arg(long)]
        job_text: Option<String>,

        /// Output format: console, json, markdown (defaults to config)
        #[arg(short, long)]
        output: Option<String>,

        /// Include the feature checklist and layout summary
        #[arg(short, long)]
        detailed: bool,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "output.format")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        "markdown" | "md" => Ok(crate::config::OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
