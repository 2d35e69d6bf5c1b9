//! Page layout model used by the format inspector
//!
//! All coordinates are in PDF points with the origin at the top-left corner
//! of the page's visible box, y growing downwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Spans further below the previous line than this many font sizes start a new block
const LINE_GAP_RATIO: f64 = 1.6;
/// Left-edge drift (in font sizes) tolerated between lines of one block
const INDENT_RATIO: f64 = 1.5;
/// Horizontal gap (in font sizes) that reads as a word break between spans
const WORD_GAP_RATIO: f64 = 0.2;
/// Horizontal gap (in font sizes) past which spans on one baseline belong to different columns
const COLUMN_GAP_RATIO: f64 = 3.0;
/// Minimum length for a path segment to count as a ruling line
const MIN_RULE_LENGTH: f64 = 10.0;
/// Snapping tolerance when intersecting rules
const RULE_TOLERANCE: f64 = 2.0;

/// A run of glyphs drawn contiguously on one baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub size: f64,
    pub x: f64,
    pub baseline: f64,
    pub width: f64,
    pub text: String,
}

impl TextSpan {
    pub fn top(&self) -> f64 {
        self.baseline - self.size * 0.8
    }

    pub fn bottom(&self) -> f64 {
        self.baseline + self.size * 0.2
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A paragraph-like group of spans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub text: String,
}

/// A painted straight segment, normalised so that `x0 <= x1` and `y0 <= y1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rule {
    pub fn between(from: (f64, f64), to: (f64, f64)) -> Self {
        Self {
            x0: from.0.min(to.0),
            y0: from.1.min(to.1),
            x1: from.0.max(to.0),
            y1: from.1.max(to.1),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.y1 - self.y0 <= RULE_TOLERANCE && self.x1 - self.x0 >= MIN_RULE_LENGTH
    }

    pub fn is_vertical(&self) -> bool {
        self.x1 - self.x0 <= RULE_TOLERANCE && self.y1 - self.y0 >= MIN_RULE_LENGTH
    }

    fn crosses(&self, vertical: &Rule) -> bool {
        let x = (vertical.x0 + vertical.x1) / 2.0;
        let y = (self.y0 + self.y1) / 2.0;
        x >= self.x0 - RULE_TOLERANCE
            && x <= self.x1 + RULE_TOLERANCE
            && y >= vertical.y0 - RULE_TOLERANCE
            && y <= vertical.y1 + RULE_TOLERANCE
    }
}

/// Everything drawn on one page, before spans are grouped into blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub spans: Vec<TextSpan>,
    pub rules: Vec<Rule>,
    /// Fonts that showed any string, whitespace-only strings included
    pub fonts: BTreeSet<String>,
    pub image_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// 1-based page number
    pub number: u32,
    pub width: f64,
    pub height: f64,
    pub blocks: Vec<TextBlock>,
    pub fonts: BTreeSet<String>,
    pub image_count: usize,
    pub has_table: bool,
}

impl PageLayout {
    pub fn from_content(number: u32, width: f64, height: f64, content: PageContent) -> Self {
        Self {
            number,
            width,
            height,
            blocks: group_blocks(&content.spans),
            fonts: content.fonts,
            image_count: content.image_count,
            has_table: detect_table(&content.rules),
        }
    }

    pub fn has_images(&self) -> bool {
        self.image_count > 0
    }

    /// Distance between the leftmost and rightmost block left edges
    pub fn left_edge_spread(&self) -> Option<f64> {
        let mut edges = self.blocks.iter().map(|b| b.x0);
        let first = edges.next()?;
        let (min, max) = edges.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)));
        Some(max - min)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    /// Distinct font names across every page
    pub fn fonts(&self) -> BTreeSet<String> {
        self.pages.iter().flat_map(|p| p.fonts.iter().cloned()).collect()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|p| p.blocks.len()).sum()
    }
}

struct BlockBuilder {
    block: TextBlock,
    last_x: f64,
    last_right: f64,
    last_baseline: f64,
    last_size: f64,
}

enum Placement {
    SameLine,
    NextLine,
    Elsewhere,
}

impl BlockBuilder {
    fn start(span: &TextSpan) -> Self {
        Self {
            block: TextBlock {
                x0: span.x,
                y0: span.top(),
                x1: span.right(),
                y1: span.bottom(),
                text: span.text.clone(),
            },
            last_x: span.x,
            last_right: span.right(),
            last_baseline: span.baseline,
            last_size: span.size,
        }
    }

    fn place(&self, span: &TextSpan) -> Placement {
        let tolerance = span.size.max(self.last_size).max(1.0);
        let dy = span.baseline - self.last_baseline;

        if dy.abs() <= 0.5 * tolerance {
            if span.x >= self.last_x - 1.0 && span.x - self.last_right <= COLUMN_GAP_RATIO * tolerance {
                Placement::SameLine
            } else {
                Placement::Elsewhere
            }
        } else if dy > 0.0 && dy <= LINE_GAP_RATIO * tolerance && (span.x - self.block.x0).abs() <= INDENT_RATIO * tolerance {
            Placement::NextLine
        } else {
            Placement::Elsewhere
        }
    }

    fn push(&mut self, span: &TextSpan, placement: Placement) {
        match placement {
            Placement::SameLine => {
                let gap = span.x - self.last_right;
                let text = &self.block.text;
                if gap > WORD_GAP_RATIO * span.size
                    && !text.ends_with(char::is_whitespace)
                    && !span.text.starts_with(char::is_whitespace)
                {
                    self.block.text.push(' ');
                }
            }
            _ => self.block.text.push('\n'),
        }
        self.block.text.push_str(&span.text);

        self.block.x0 = self.block.x0.min(span.x);
        self.block.y0 = self.block.y0.min(span.top());
        self.block.x1 = self.block.x1.max(span.right());
        self.block.y1 = self.block.y1.max(span.bottom());
        self.last_x = span.x;
        self.last_right = span.right();
        self.last_baseline = span.baseline;
        self.last_size = span.size;
    }

    fn finish(self) -> Option<TextBlock> {
        if self.block.text.trim().is_empty() {
            None
        } else {
            Some(self.block)
        }
    }
}

/// Group spans, in drawing order, into blocks of consecutive lines.
///
/// Blank spans never start a block; they only extend the current one.
pub fn group_blocks(spans: &[TextSpan]) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<BlockBuilder> = None;

    for span in spans {
        if span.is_blank() {
            if let Some(builder) = current.as_mut() {
                if !builder.block.text.ends_with(char::is_whitespace) {
                    builder.block.text.push(' ');
                }
            }
            continue;
        }

        match current.as_ref().map(|builder| builder.place(span)) {
            Some(Placement::Elsewhere) | None => {
                if let Some(block) = current.take().and_then(BlockBuilder::finish) {
                    blocks.push(block);
                }
                current = Some(BlockBuilder::start(span));
            }
            Some(placement) => {
                if let Some(builder) = current.as_mut() {
                    builder.push(span, placement);
                }
            }
        }
    }

    if let Some(block) = current.and_then(BlockBuilder::finish) {
        blocks.push(block);
    }

    blocks
}

/// Whether the ruling lines on a page form a grid of at least two cells
pub fn detect_table(rules: &[Rule]) -> bool {
    let horizontals: Vec<&Rule> = rules.iter().filter(|r| r.is_horizontal()).collect();
    let verticals: Vec<&Rule> = rules.iter().filter(|r| r.is_vertical()).collect();

    if horizontals.len() < 2 || verticals.len() < 2 {
        return false;
    }

    let rows = distinct_positions(
        horizontals
            .iter()
            .filter(|h| verticals.iter().filter(|v| h.crosses(v)).count() >= 2)
            .map(|h| (h.y0 + h.y1) / 2.0),
    );
    let columns = distinct_positions(
        verticals
            .iter()
            .filter(|v| horizontals.iter().filter(|h| h.crosses(v)).count() >= 2)
            .map(|v| (v.x0 + v.x1) / 2.0),
    );

    rows >= 2 && columns >= 2 && (rows - 1) * (columns - 1) >= 2
}

fn distinct_positions(positions: impl Iterator<Item = f64>) -> usize {
    let mut sorted: Vec<f64> = positions.collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup_by(|a, b| (*a - *b).abs() <= RULE_TOLERANCE);
    sorted.len()
}
