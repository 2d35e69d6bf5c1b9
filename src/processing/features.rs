//! Resume feature detection
//!
//! Every feature is a presence check over normalized (lowercased,
//! whitespace-collapsed) resume text. The detector table below is the whole
//! policy; nothing else decides what counts as present.

use crate::error::Result;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Email,
    Phone,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    ExtracurricularActivities,
    Summary,
    Achievements,
    Metrics,
}

impl Feature {
    /// Every feature, in reporting order
    pub const ALL: [Feature; 11] = [
        Feature::Email,
        Feature::Phone,
        Feature::Experience,
        Feature::Education,
        Feature::Skills,
        Feature::Projects,
        Feature::Certifications,
        Feature::ExtracurricularActivities,
        Feature::Summary,
        Feature::Achievements,
        Feature::Metrics,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Feature::Email => "email",
            Feature::Phone => "phone",
            Feature::Experience => "has_experience",
            Feature::Education => "has_education",
            Feature::Skills => "has_skills",
            Feature::Projects => "has_projects",
            Feature::Certifications => "has_certifications",
            Feature::ExtracurricularActivities => "has_extracurricular_activities",
            Feature::Summary => "has_summary",
            Feature::Achievements => "has_achievements",
            Feature::Metrics => "has_metrics",
        }
    }

    /// Key without the `has_` prefix, underscores as spaces, title-cased
    pub fn display_name(&self) -> String {
        let key = self.key();
        key.strip_prefix("has_")
            .unwrap_or(key)
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// How a feature is recognised in normalized text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    /// Regular expression that must match somewhere
    Pattern(&'static str),
    /// Any of these literal substrings
    AnyTerm(&'static [&'static str]),
}

pub const FEATURE_DETECTORS: [(Feature, Detector); 11] = [
    (Feature::Email, Detector::Pattern(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")),
    (Feature::Phone, Detector::Pattern(r"\+?[\d\s\-\(\)]{10,}")),
    (Feature::Experience, Detector::AnyTerm(&["experience"])),
    (Feature::Education, Detector::AnyTerm(&["education"])),
    (Feature::Skills, Detector::AnyTerm(&["skills"])),
    (Feature::Projects, Detector::AnyTerm(&["projects"])),
    (Feature::Certifications, Detector::AnyTerm(&["certifications"])),
    (Feature::ExtracurricularActivities, Detector::AnyTerm(&["extracurricular activities"])),
    (Feature::Summary, Detector::AnyTerm(&["summary", "objective", "profile"])),
    (Feature::Achievements, Detector::AnyTerm(&["achieved", "improved", "increased", "reduced"])),
    (Feature::Metrics, Detector::Pattern(r"\d+%|\$\d+|[\d,]+\+")),
];

/// Presence flags for every feature. All keys are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSet {
    flags: [bool; 11],
}

impl FeatureSet {
    pub fn get(&self, feature: Feature) -> bool {
        self.flags[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, present: bool) {
        self.flags[feature.index()] = present;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, bool)> + '_ {
        Feature::ALL.iter().map(move |f| (*f, self.get(*f)))
    }

    /// Display names of absent features, in reporting order
    pub fn missing_features(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, present)| !present)
            .map(|(feature, _)| feature.display_name())
            .collect()
    }

    pub fn present_count(&self) -> usize {
        self.flags.iter().filter(|present| **present).count()
    }
}

impl Serialize for FeatureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Feature::ALL.len()))?;
        for (feature, present) in self.iter() {
            map.serialize_entry(feature.key(), &present)?;
        }
        map.end()
    }
}

enum CompiledDetector {
    Pattern(Regex),
    AnyTerm(&'static [&'static str]),
}

impl CompiledDetector {
    fn matches(&self, text: &str) -> bool {
        match self {
            CompiledDetector::Pattern(regex) => regex.is_match(text),
            CompiledDetector::AnyTerm(terms) => terms.iter().any(|term| text.contains(term)),
        }
    }
}

/// Runs the detector table over normalized text
pub struct FeatureDetector {
    detectors: Vec<(Feature, CompiledDetector)>,
}

impl FeatureDetector {
    pub fn new() -> Result<Self> {
        let detectors = FEATURE_DETECTORS
            .iter()
            .map(|(feature, detector)| -> Result<(Feature, CompiledDetector)> {
                let compiled = match detector {
                    Detector::Pattern(pattern) => CompiledDetector::Pattern(Regex::new(pattern)?),
                    Detector::AnyTerm(terms) => CompiledDetector::AnyTerm(*terms),
                };
                Ok((*feature, compiled))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { detectors })
    }

    pub fn detect(&self, normalized_text: &str) -> FeatureSet {
        let mut features = FeatureSet::default();
        for (feature, detector) in &self.detectors {
            features.set(*feature, detector.matches(normalized_text));
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::text_processor::normalize;

    fn detect(text: &str) -> FeatureSet {
        FeatureDetector::new().unwrap().detect(&normalize(text))
    }

    #[test]
    fn test_detector_table_covers_every_feature_once() {
        let covered: Vec<Feature> = FEATURE_DETECTORS.iter().map(|(f, _)| *f).collect();
        assert_eq!(covered, Feature::ALL.to_vec());
    }

    #[test]
    fn test_empty_text_has_all_keys_false() {
        let features = detect("");
        assert_eq!(features.iter().count(), 11);
        assert!(features.iter().all(|(_, present)| !present));
        assert_eq!(features.missing_features().len(), 11);
    }

    #[test]
    fn test_contact_and_sections() {
        let features = detect(
            "Jane Doe\njane@example.com | 555-123-4567\nExperience\nEducation\nSkills: Python",
        );

        assert!(features.get(Feature::Email));
        assert!(features.get(Feature::Phone));
        assert!(features.get(Feature::Experience));
        assert!(features.get(Feature::Education));
        assert!(features.get(Feature::Skills));
        assert!(!features.get(Feature::Projects));
        assert!(!features.get(Feature::Certifications));
        assert!(!features.get(Feature::ExtracurricularActivities));
    }

    #[test]
    fn test_email_requires_alphabetic_tld() {
        assert!(!detect("reach me at jane@localhost").get(Feature::Email));
        assert!(!detect("user@host.c0m").get(Feature::Email));
        assert!(detect("first.last+cv@mail.co.uk").get(Feature::Email));
    }

    #[test]
    fn test_phone_needs_ten_characters() {
        assert!(!detect("call 555-1234").get(Feature::Phone));
        assert!(detect("+1 (555) 123 4567").get(Feature::Phone));
    }

    #[test]
    fn test_summary_achievements_and_metrics() {
        let features = detect("Professional Profile. Reduced costs by 30% and served 1,000+ users.");
        assert!(features.get(Feature::Summary));
        assert!(features.get(Feature::Achievements));
        assert!(features.get(Feature::Metrics));

        assert!(detect("Saved $5000 annually").get(Feature::Metrics));
        assert!(!detect("Led a team of engineers").get(Feature::Metrics));
    }

    #[test]
    fn test_multi_word_section_name() {
        assert!(detect("EXTRACURRICULAR\n ACTIVITIES").get(Feature::ExtracurricularActivities));
        assert!(!detect("extracurricular work").get(Feature::ExtracurricularActivities));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Feature::Email.display_name(), "Email");
        assert_eq!(Feature::ExtracurricularActivities.display_name(), "Extracurricular Activities");
        assert_eq!(Feature::Metrics.display_name(), "Metrics");
    }

    #[test]
    fn test_serializes_keys_in_order() {
        let mut features = FeatureSet::default();
        features.set(Feature::Phone, true);
        let json = serde_json::to_string(&features).unwrap();

        assert!(json.starts_with(r#"{"email":false,"phone":true,"has_experience":false"#));
        assert!(json.ends_with(r#""has_metrics":false}"#));
    }
}
