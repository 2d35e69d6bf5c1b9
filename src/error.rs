//! Error handling for the ATS scorer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtsScorerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be opened or its text layer could not be read.
    #[error("Text extraction error: {0}")]
    Extraction(String),

    /// The document could not be reopened for layout inspection.
    #[error("Format inspection error: {0}")]
    FormatInspection(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

impl AtsScorerError {
    pub fn is_extraction(&self) -> bool {
        matches!(self, AtsScorerError::Extraction(_))
    }

    pub fn is_format_inspection(&self) -> bool {
        matches!(self, AtsScorerError::FormatInspection(_))
    }
}

pub type Result<T> = std::result::Result<T, AtsScorerError>;

/// Regex compilation only fails on a broken pattern table
impl From<regex::Error> for AtsScorerError {
    fn from(err: regex::Error) -> Self {
        AtsScorerError::Processing(format!("Invalid pattern: {}", err))
    }
}
