//! ATS formatting checks
//!
//! Each check appends a fixed message and deducts a fixed penalty from a
//! base of 100. Image, table and column checks stop at the first offending
//! page; contact placement is reported for every offending block.

use crate::error::Result;
use crate::processing::layout::DocumentLayout;
use crate::processing::text_processor::word_count;
use log::debug;
use regex::Regex;

pub const FORMAT_BASE_SCORE: i32 = 100;

pub const MAX_FONTS: usize = 3;
/// Fraction of the page height treated as header or footer
pub const MARGIN_BAND: f64 = 0.1;
/// Left-edge spread, in points, that signals more than one column
pub const COLUMN_SPREAD_THRESHOLD: f64 = 300.0;
pub const BULLET_CHARS: [char; 4] = ['•', '-', '*', '·'];
pub const REQUIRED_SECTIONS: [&str; 3] = ["experience", "education", "skills"];
pub const MIN_WORDS: usize = 200;
pub const MAX_WORDS: usize = 1000;

const CONTACT_PATTERN: &str = r"\S+@\S+|\d{10}";

pub const TOO_MANY_FONTS: &str = "Too many fonts used (recommend 1-2)";
pub const CONTACT_IN_HEADER: &str = "Contact info in header (may be skipped by ATS)";
pub const CONTACT_IN_FOOTER: &str = "Contact info in footer (may be skipped by ATS)";
pub const CONTAINS_IMAGES: &str = "Contains images (ATS may not read content)";
pub const CONTAINS_TABLES: &str = "Contains tables (ATS may skip structured data)";
pub const MULTI_COLUMN: &str = "Multi-column layout detected (ATS may misread order)";
pub const NO_BULLETS: &str = "No bullet points found";
pub const TOO_SHORT: &str = "Resume too short (< 200 words)";
pub const TOO_LONG: &str = "Resume too long (> 1000 words)";

pub const FONT_PENALTY: i32 = 10;
pub const CONTACT_PENALTY: i32 = 5;
pub const IMAGE_PENALTY: i32 = 15;
pub const TABLE_PENALTY: i32 = 10;
pub const COLUMN_PENALTY: i32 = 15;
pub const BULLET_PENALTY: i32 = 10;
pub const SECTION_PENALTY: i32 = 5;
pub const SHORT_PENALTY: i32 = 20;
pub const LONG_PENALTY: i32 = 10;

/// Issues in detection order plus the clamped score
#[derive(Debug, Clone, PartialEq)]
pub struct FormatReport {
    pub issues: Vec<String>,
    pub score: u32,
}

struct Tally {
    issues: Vec<String>,
    score: i32,
}

impl Tally {
    fn flag(&mut self, issue: impl Into<String>, penalty: i32) {
        let issue = issue.into();
        debug!("Format issue (-{}): {}", penalty, issue);
        self.issues.push(issue);
        self.score -= penalty;
    }
}

pub struct FormatInspector {
    contact_regex: Regex,
}

impl FormatInspector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            contact_regex: Regex::new(CONTACT_PATTERN)?,
        })
    }

    pub fn inspect(&self, layout: &DocumentLayout, raw_text: &str, normalized_text: &str) -> FormatReport {
        let mut tally = Tally {
            issues: Vec::new(),
            score: FORMAT_BASE_SCORE,
        };

        if layout.fonts().len() > MAX_FONTS {
            tally.flag(TOO_MANY_FONTS, FONT_PENALTY);
        }

        for page in &layout.pages {
            for block in page.blocks.iter().filter(|b| self.contact_regex.is_match(&b.text)) {
                if block.y0 < MARGIN_BAND * page.height {
                    tally.flag(CONTACT_IN_HEADER, CONTACT_PENALTY);
                } else if block.y0 > (1.0 - MARGIN_BAND) * page.height {
                    tally.flag(CONTACT_IN_FOOTER, CONTACT_PENALTY);
                }
            }
        }

        if layout.pages.iter().any(|page| page.has_images()) {
            tally.flag(CONTAINS_IMAGES, IMAGE_PENALTY);
        }

        if layout.pages.iter().any(|page| page.has_table) {
            tally.flag(CONTAINS_TABLES, TABLE_PENALTY);
        }

        if layout
            .pages
            .iter()
            .filter_map(|page| page.left_edge_spread())
            .any(|spread| spread > COLUMN_SPREAD_THRESHOLD)
        {
            tally.flag(MULTI_COLUMN, COLUMN_PENALTY);
        }

        if !raw_text.contains(&BULLET_CHARS[..]) {
            tally.flag(NO_BULLETS, BULLET_PENALTY);
        }

        let missing: Vec<&str> = REQUIRED_SECTIONS
            .iter()
            .copied()
            .filter(|section| !normalized_text.contains(section))
            .collect();
        if !missing.is_empty() {
            tally.flag(
                format!("Missing sections: {}", missing.join(", ")),
                SECTION_PENALTY * missing.len() as i32,
            );
        }

        let words = word_count(normalized_text);
        if words < MIN_WORDS {
            tally.flag(TOO_SHORT, SHORT_PENALTY);
        } else if words > MAX_WORDS {
            tally.flag(TOO_LONG, LONG_PENALTY);
        }

        FormatReport {
            issues: tally.issues,
            score: tally.score.max(0) as u32,
        }
    }
}
