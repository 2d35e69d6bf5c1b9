//! Text extraction from various file formats

use crate::error::{AtsScorerError, Result};
use crate::input::file_detector::looks_like_pdf;
use log::debug;
use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<String>;
}

pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract the text of every page, in page order.
    ///
    /// Pages without a text layer come back as empty strings.
    pub fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        if !looks_like_pdf(bytes) {
            return Err(AtsScorerError::Extraction(
                "Document is not a PDF (missing %PDF header)".to_string(),
            ));
        }

        // pdf-extract panics on some malformed fonts and streams
        let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes));

        match outcome {
            Ok(Ok(pages)) => {
                debug!("Extracted text from {} PDF pages", pages.len());
                Ok(pages)
            }
            Ok(Err(e)) => Err(AtsScorerError::Extraction(format!("Failed to extract text from PDF: {}", e))),
            Err(_) => Err(AtsScorerError::Extraction(
                "PDF text layer could not be decoded".to_string(),
            )),
        }
    }

    /// Concatenate page texts with no separator
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<String> {
        Ok(self.extract_pages(bytes)?.concat())
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| {
            AtsScorerError::Extraction(format!("Failed to open '{}': {}", path.display(), e))
        })?;
        self.extract_bytes(&bytes)
    }
}

/// Raw text of a PDF held in memory: every page, in order, no separators
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    PdfExtractor.extract_bytes(bytes)
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path)?;
        Ok(content)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = std::fs::read_to_string(path)?;
        Ok(self.markdown_to_text(&markdown_content))
    }
}

impl MarkdownExtractor {
    /// Keep the readable text of a Markdown document, one block per line
    pub fn markdown_to_text(&self, markdown: &str) -> String {
        let mut text = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak | Event::Rule => text.push('\n'),
                Event::End(
                    Tag::Paragraph | Tag::Heading(..) | Tag::Item | Tag::CodeBlock(_) | Tag::BlockQuote | Tag::TableRow,
                ) => text.push('\n'),
                _ => {}
            }
        }

        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
