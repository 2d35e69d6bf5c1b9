//! ATS resume scorer library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{AtsScorerError, Result};
pub use input::ResumeDocument;
pub use processing::{analyze, AnalysisResult, Analyzer};
