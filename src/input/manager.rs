//! Input manager for loading resumes and job descriptions from disk

use crate::error::{AtsScorerError, Result};
use crate::input::document::ResumeDocument;
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::path::Path;

pub struct InputManager {
    max_file_size: u64,
}

impl InputManager {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Load a resume PDF into memory, enforcing the size limit
    pub fn load_resume(&self, path: &Path) -> Result<ResumeDocument> {
        self.check_file(path)?;

        let file_type = self.detect_file_type(path)?;
        if file_type != FileType::Pdf {
            return Err(AtsScorerError::UnsupportedFormat(format!(
                "Resume must be a PDF: {}",
                path.display()
            )));
        }

        info!("Loading resume: {}", path.display());
        let bytes = std::fs::read(path)?;
        Ok(ResumeDocument::from_bytes(bytes))
    }

    /// Read a job description as plain text
    pub fn read_job_description(&self, path: &Path) -> Result<String> {
        self.check_file(path)?;

        let text = match self.detect_file_type(path)? {
            FileType::Pdf => {
                info!("Extracting job description from PDF: {}", path.display());
                PdfExtractor.extract(path)?
            }
            FileType::Text => {
                info!("Reading plain text job description: {}", path.display());
                PlainTextExtractor.extract(path)?
            }
            FileType::Markdown => {
                info!("Processing markdown job description: {}", path.display());
                MarkdownExtractor.extract(path)?
            }
            FileType::Unknown => {
                return Err(AtsScorerError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    path.display()
                )));
            }
        };

        Ok(text)
    }

    fn check_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(AtsScorerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let size = std::fs::metadata(path)?.len();
        if size > self.max_file_size {
            return Err(AtsScorerError::InvalidInput(format!(
                "File too large: {} ({} bytes, limit {} bytes)",
                path.display(),
                size,
                self.max_file_size
            )));
        }

        Ok(())
    }

    fn detect_file_type(&self, path: &Path) -> Result<FileType> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| AtsScorerError::InvalidInput(format!("File has no extension: {}", path.display())))?;

        Ok(FileType::from_extension(extension))
    }
}
