//! Job description keyword overlap

use crate::error::Result;
use crate::processing::text_processor::normalize;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Controlled vocabulary of technical terms looked for in job descriptions
pub const TECH_KEYWORDS: [&str; 13] = [
    "python",
    "sql",
    "power bi",
    "azure",
    "aws",
    "machine learning",
    "data analysis",
    "excel",
    "r",
    "git",
    "spark",
    "hadoop",
    "tableau",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub keyword_score: f64,
    /// Deduplicated, in order of first appearance in the job description
    pub matched_keywords: Vec<String>,
}

pub struct KeywordMatcher {
    vocabulary: Regex,
}

impl KeywordMatcher {
    pub fn new() -> Result<Self> {
        let alternatives = TECH_KEYWORDS
            .iter()
            .map(|keyword| regex::escape(keyword))
            .collect::<Vec<_>>()
            .join("|");
        let vocabulary = Regex::new(&format!(r"\b(?:{})\b", alternatives))?;

        Ok(Self { vocabulary })
    }

    /// Distinct vocabulary terms in a job description, first appearance first
    pub fn job_keywords(&self, job_description: &str) -> Vec<String> {
        let normalized = normalize(job_description);
        let mut keywords: Vec<String> = Vec::new();

        for found in self.vocabulary.find_iter(&normalized) {
            if !keywords.iter().any(|k| k == found.as_str()) {
                keywords.push(found.as_str().to_string());
            }
        }

        keywords
    }

    /// Score how many of the job's technical terms the resume mentions.
    ///
    /// A missing or blank job description is a neutral result, not an error.
    /// Resume matches are plain substring checks, so short terms such as
    /// "r" match inside longer words.
    pub fn match_job_description(&self, job_description: Option<&str>, normalized_resume: &str) -> MatchResult {
        let job_description = match job_description {
            Some(text) if !text.trim().is_empty() => text,
            _ => return MatchResult::default(),
        };

        let wanted = self.job_keywords(job_description);
        if wanted.is_empty() {
            debug!("Job description names no known technical keywords");
            return MatchResult::default();
        }

        let matched_keywords: Vec<String> = wanted
            .iter()
            .filter(|keyword| normalized_resume.contains(keyword.as_str()))
            .cloned()
            .collect();

        let keyword_score = matched_keywords.len() as f64 / wanted.len() as f64 * 100.0;
        debug!(
            "Matched {}/{} job keywords: {:?}",
            matched_keywords.len(),
            wanted.len(),
            matched_keywords
        );

        MatchResult {
            keyword_score,
            matched_keywords,
        }
    }
}
