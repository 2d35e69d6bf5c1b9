//! Content scoring and final score aggregation

use crate::processing::features::{Feature, FeatureSet};

/// Starting content score before deductions
pub const CONTENT_BASE_SCORE: i32 = 50;

/// Points lost when a feature is missing. Unlisted features cost nothing.
pub const CONTENT_WEIGHTS: [(Feature, i32); 6] = [
    (Feature::Email, 10),
    (Feature::Phone, 10),
    (Feature::Experience, 10),
    (Feature::Education, 5),
    (Feature::Skills, 10),
    (Feature::Projects, 5),
];

pub const CONTENT_WEIGHT: f64 = 0.4;
pub const FORMAT_WEIGHT: f64 = 0.3;
pub const KEYWORD_WEIGHT: f64 = 0.3;

pub fn content_weight(feature: Feature) -> i32 {
    CONTENT_WEIGHTS
        .iter()
        .find(|(f, _)| *f == feature)
        .map_or(0, |(_, weight)| *weight)
}

/// Content completeness in `[0, 50]`.
///
/// The base equals the sum of all weights, so a resume with every weighted
/// feature scores 50, not 100.
pub fn content_score(features: &FeatureSet) -> u32 {
    let score = features
        .iter()
        .filter(|(_, present)| !present)
        .fold(CONTENT_BASE_SCORE, |score, (feature, _)| score - content_weight(feature));

    score.max(0) as u32
}

/// Weighted total, rounded to two decimals
pub fn total_score(content: u32, format: u32, keyword: f64) -> f64 {
    let total = f64::from(content) * CONTENT_WEIGHT + f64::from(format) * FORMAT_WEIGHT + keyword * KEYWORD_WEIGHT;
    round2(total)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
