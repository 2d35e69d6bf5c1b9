//! Report structures wrapping an analysis result

use crate::processing::analyzer::{AnalysisResult, DetailedAnalysis, LayoutSummary};
use crate::processing::features::FeatureSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Everything a formatter needs to render one scored resume
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    /// Scores and issues, serialized inline under their own field names
    #[serde(flatten)]
    pub result: AnalysisResult,

    pub band: ScoreBand,

    pub metadata: ReportMetadata,

    /// Feature checklist and layout summary, present in detailed reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ReportDetails>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub scorer_version: String,
    pub resume_file: String,
    pub job_description_provided: bool,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDetails {
    pub features: FeatureSet,
    pub layout: LayoutSummary,
    pub word_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(total_score: f64) -> Self {
        if total_score >= 80.0 {
            ScoreBand::Excellent
        } else if total_score >= 65.0 {
            ScoreBand::Good
        } else if total_score >= 50.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Poor => "Poor",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl ScoreReport {
    pub fn from_analysis(
        analysis: DetailedAnalysis,
        resume_file: &str,
        job_description_provided: bool,
        include_details: bool,
    ) -> Self {
        let details = include_details.then(|| ReportDetails {
            features: analysis.features,
            layout: analysis.layout,
            word_count: analysis.word_count,
        });

        Self {
            band: ScoreBand::from_score(analysis.result.total_score),
            result: analysis.result,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                scorer_version: env!("CARGO_PKG_VERSION").to_string(),
                resume_file: resume_file.to_string(),
                job_description_provided,
                processing_time_ms: analysis.processing_time_ms,
            },
            details,
        }
    }
}
