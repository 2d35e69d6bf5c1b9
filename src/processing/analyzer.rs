//! Scoring pipeline combining content, format and keyword analysis

use crate::error::Result;
use crate::input::document::ResumeDocument;
use crate::input::layout_extractor::LayoutExtractor;
use crate::input::text_extractor::extract_text;
use crate::processing::features::{FeatureDetector, FeatureSet};
use crate::processing::format_inspector::FormatInspector;
use crate::processing::keyword_matcher::KeywordMatcher;
use crate::processing::layout::DocumentLayout;
use crate::processing::scoring::{content_score, total_score};
use crate::processing::text_processor::ProcessedText;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Final result of scoring one resume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Weighted total, rounded to two decimals
    pub total_score: f64,
    /// 0-50
    pub content_score: u32,
    /// 0-100
    pub format_score: u32,
    /// 0-100
    pub keyword_score: f64,
    pub matched_keywords: Vec<String>,
    pub format_issues: Vec<String>,
    pub missing_features: Vec<String>,
}

/// Structure counts surfaced in detailed reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSummary {
    pub pages: usize,
    pub fonts: Vec<String>,
    pub blocks: usize,
    pub images: usize,
    pub pages_with_tables: usize,
}

impl From<&DocumentLayout> for LayoutSummary {
    fn from(layout: &DocumentLayout) -> Self {
        Self {
            pages: layout.page_count(),
            fonts: layout.fonts().into_iter().collect(),
            blocks: layout.block_count(),
            images: layout.pages.iter().map(|p| p.image_count).sum(),
            pages_with_tables: layout.pages.iter().filter(|p| p.has_table).count(),
        }
    }
}

/// The result plus the intermediate signals it was derived from
#[derive(Debug, Clone, Serialize)]
pub struct DetailedAnalysis {
    pub result: AnalysisResult,
    pub features: FeatureSet,
    pub layout: LayoutSummary,
    pub word_count: usize,
    pub processing_time_ms: u64,
}

/// Scoring engine. Holds compiled detector tables and can be reused across
/// documents.
pub struct Analyzer {
    feature_detector: FeatureDetector,
    format_inspector: FormatInspector,
    keyword_matcher: KeywordMatcher,
}

impl Analyzer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            feature_detector: FeatureDetector::new()?,
            format_inspector: FormatInspector::new()?,
            keyword_matcher: KeywordMatcher::new()?,
        })
    }

    pub fn analyze(&self, document: &ResumeDocument, job_description: Option<&str>) -> Result<AnalysisResult> {
        Ok(self.analyze_detailed(document, job_description)?.result)
    }

    pub fn analyze_detailed(
        &self,
        document: &ResumeDocument,
        job_description: Option<&str>,
    ) -> Result<DetailedAnalysis> {
        let start_time = Instant::now();
        info!("Analyzing resume {}", document.display_name());

        let bytes = document.read_bytes()?;

        // 1. Text
        let text = ProcessedText::new(extract_text(&bytes)?);
        debug!("Extracted {} words", text.word_count);

        // 2. Content
        let features = self.feature_detector.detect(&text.normalized);
        let content = content_score(&features);
        debug!("Content score: {} ({} features present)", content, features.present_count());

        // 3. Format
        let layout = LayoutExtractor::extract(&bytes)?;
        let format = self.format_inspector.inspect(&layout, &text.raw, &text.normalized);
        debug!("Format score: {} ({} issues)", format.score, format.issues.len());

        // 4. Keywords
        let keywords = self.keyword_matcher.match_job_description(job_description, &text.normalized);

        let total = total_score(content, format.score, keywords.keyword_score);
        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!("Resume scored {:.2} in {}ms", total, processing_time_ms);

        Ok(DetailedAnalysis {
            result: AnalysisResult {
                total_score: total,
                content_score: content,
                format_score: format.score,
                keyword_score: keywords.keyword_score,
                matched_keywords: keywords.matched_keywords,
                format_issues: format.issues,
                missing_features: features.missing_features(),
            },
            features,
            layout: LayoutSummary::from(&layout),
            word_count: text.word_count,
            processing_time_ms,
        })
    }
}

/// Score a resume with a freshly built [`Analyzer`]
pub fn analyze(document: &ResumeDocument, job_description: Option<&str>) -> Result<AnalysisResult> {
    Analyzer::new()?.analyze(document, job_description)
}
