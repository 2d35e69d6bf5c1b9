//! The resume document handed to the scoring pipeline

use crate::error::{AtsScorerError, Result};
use std::borrow::Cow;
use std::path::PathBuf;

/// A PDF resume, addressed either by file path or by an in-memory buffer.
///
/// The pipeline only ever reads from it. A path-backed document is read
/// once per analysis; the file handle is closed before `read_bytes` returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeDocument {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ResumeDocument {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ResumeDocument::Path(path.into())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        ResumeDocument::Bytes(bytes.into())
    }

    /// Load the document contents.
    ///
    /// Failing to open the file is an extraction failure: no text can be
    /// read from a document that cannot be opened.
    pub fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            ResumeDocument::Path(path) => std::fs::read(path).map(Cow::Owned).map_err(|e| {
                AtsScorerError::Extraction(format!("Failed to open '{}': {}", path.display(), e))
            }),
            ResumeDocument::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
        }
    }

    /// Human-readable name for logs and reports
    pub fn display_name(&self) -> String {
        match self {
            ResumeDocument::Path(path) => path.display().to_string(),
            ResumeDocument::Bytes(bytes) => format!("<in-memory PDF, {} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ResumeDocument {
    fn from(path: PathBuf) -> Self {
        ResumeDocument::Path(path)
    }
}

impl From<Vec<u8>> for ResumeDocument {
    fn from(bytes: Vec<u8>) -> Self {
        ResumeDocument::Bytes(bytes)
    }
}
