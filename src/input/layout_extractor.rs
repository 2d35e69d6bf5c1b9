//! PDF layout extraction
//!
//! Glyph positions and painted lines come from `pdf_extract`'s rendering
//! callbacks, which decode every string through its font's /ToUnicode map
//! or /Encoding and advance by the font's real widths. Those callbacks do
//! not say which font drew a glyph or where images go, so font names and
//! image placements are read from the content streams directly.

use crate::error::{AtsScorerError, Result};
use crate::processing::layout::{DocumentLayout, PageContent, PageLayout, Rule, TextSpan};
use log::{debug, warn};
use pdf_extract::content::{Content, Operation};
use pdf_extract::{
    ColorSpace, Dictionary, Document, MediaBox, Object, ObjectId, OutputDev, OutputError, Path, PathOp, Transform,
};
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{self, AssertUnwindSafe};

/// US Letter, used when a page declares no usable box
const DEFAULT_PAGE_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];
/// Advance, as a fraction of the font size, for fonts without a width table
const AVERAGE_GLYPH_WIDTH: f64 = 0.5;
/// A glyph further than this many font sizes past the previous one starts a new span
const GLYPH_GAP_RATIO: f64 = 0.1;
const MAX_FORM_DEPTH: usize = 8;
const MAX_TREE_DEPTH: usize = 32;

type DeviceResult = std::result::Result<(), OutputError>;

pub struct LayoutExtractor;

impl LayoutExtractor {
    /// Parse `bytes` and build the layout of every page
    pub fn extract(bytes: &[u8]) -> Result<DocumentLayout> {
        let doc = Document::load_mem(bytes).map_err(|e| {
            AtsScorerError::FormatInspection(format!("Failed to open PDF for layout inspection: {}", e))
        })?;

        let mut pages = Vec::new();
        for (number, page_id) in doc.get_pages() {
            let page = doc
                .get_object(page_id)
                .and_then(Object::as_dict)
                .map_err(|e| AtsScorerError::FormatInspection(format!("Page {} is unreadable: {}", number, e)))?;
            pages.push((number, page_id, page_box(&doc, page)));
        }

        let mut collector = GlyphCollector::new(pages.iter().map(|&(number, _, bounds)| (number, bounds)).collect());
        // pdf-extract panics on some malformed fonts and streams
        match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::output_doc(&doc, &mut collector))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(AtsScorerError::FormatInspection(format!("Failed to lay out PDF pages: {}", e)));
            }
            Err(_) => {
                return Err(AtsScorerError::FormatInspection(
                    "PDF page content could not be interpreted".to_string(),
                ));
            }
        }
        let mut drawn = collector.finish();

        let mut layouts = Vec::with_capacity(pages.len());
        for (number, page_id, [llx, lly, urx, ury]) in pages {
            let mut content = drawn.remove(&number).unwrap_or_default();
            let marks = scan_page(&doc, number, page_id);
            content.fonts = marks.fonts;
            content.image_count = marks.images;
            layouts.push(PageLayout::from_content(number, urx - llx, ury - lly, content));
        }

        debug!("Extracted layout for {} pages", layouts.len());
        Ok(DocumentLayout { pages: layouts })
    }
}

/// Receives decoded glyphs and painted paths, page by page
struct GlyphCollector {
    page_boxes: BTreeMap<u32, [f64; 4]>,
    /// User-space point that maps to the top-left page corner
    origin: (f64, f64),
    page: Option<u32>,
    content: PageContent,
    span: Option<TextSpan>,
    pages: BTreeMap<u32, PageContent>,
}

impl GlyphCollector {
    fn new(page_boxes: BTreeMap<u32, [f64; 4]>) -> Self {
        Self {
            page_boxes,
            origin: (0.0, 0.0),
            page: None,
            content: PageContent::default(),
            span: None,
            pages: BTreeMap::new(),
        }
    }

    fn finish(mut self) -> BTreeMap<u32, PageContent> {
        self.close_page();
        self.pages
    }

    /// Map `(x, y)` through `transform` into top-left page coordinates
    fn to_page(&self, transform: &Transform, x: f64, y: f64) -> (f64, f64) {
        let px = x * transform.m11 + y * transform.m21 + transform.m31;
        let py = x * transform.m12 + y * transform.m22 + transform.m32;
        (px - self.origin.0, self.origin.1 - py)
    }

    fn flush_span(&mut self) {
        if let Some(span) = self.span.take() {
            if !span.text.is_empty() {
                self.content.spans.push(span);
            }
        }
    }

    fn close_page(&mut self) {
        self.flush_span();
        if let Some(number) = self.page.take() {
            self.pages.insert(number, std::mem::take(&mut self.content));
        }
    }

    fn add_path(&mut self, ctm: &Transform, path: &Path) {
        let mut current = None;
        let mut start = None;

        for op in &path.ops {
            match *op {
                PathOp::MoveTo(x, y) => {
                    let point = self.to_page(ctm, x, y);
                    current = Some(point);
                    start = Some(point);
                }
                PathOp::LineTo(x, y) => {
                    let to = self.to_page(ctm, x, y);
                    if let Some(from) = current {
                        self.content.rules.push(Rule::between(from, to));
                    }
                    current = Some(to);
                }
                // curves never form ruling lines
                PathOp::CurveTo(_, _, _, _, x, y) => current = Some(self.to_page(ctm, x, y)),
                PathOp::Rect(x, y, w, h) => {
                    let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)]
                        .map(|(cx, cy)| self.to_page(ctm, cx, cy));
                    for i in 0..4 {
                        self.content.rules.push(Rule::between(corners[i], corners[(i + 1) % 4]));
                    }
                    current = Some(corners[0]);
                    start = Some(corners[0]);
                }
                PathOp::Close => {
                    if let (Some(from), Some(to)) = (current, start) {
                        self.content.rules.push(Rule::between(from, to));
                        current = Some(to);
                    }
                }
            }
        }
    }
}

impl OutputDev for GlyphCollector {
    fn begin_page(&mut self, page_num: u32, media_box: &MediaBox, _art_box: Option<(f64, f64, f64, f64)>) -> DeviceResult {
        self.close_page();
        let [llx, _, _, ury] = self
            .page_boxes
            .get(&page_num)
            .copied()
            .unwrap_or([media_box.llx, media_box.lly, media_box.urx, media_box.ury]);
        self.origin = (llx, ury);
        self.page = Some(page_num);
        Ok(())
    }

    fn end_page(&mut self) -> DeviceResult {
        self.close_page();
        Ok(())
    }

    fn output_character(&mut self, trm: &Transform, width: f64, spacing: f64, font_size: f64, char: &str) -> DeviceResult {
        let size = font_size * trm.m21.hypot(trm.m22);
        if char.is_empty() || !size.is_finite() || size <= 0.0 {
            return Ok(());
        }

        let (x, baseline) = self.to_page(trm, 0.0, 0.0);
        let glyph = if width > 0.0 { width } else { AVERAGE_GLYPH_WIDTH };
        let advance = ((glyph * font_size + spacing) * trm.m11.hypot(trm.m12)).max(0.0);

        let continues = self.span.as_ref().is_some_and(|span| {
            (baseline - span.baseline).abs() <= 0.5 * span.size.max(size)
                && x >= span.x - 1.0
                && x <= span.right() + GLYPH_GAP_RATIO * size
        });
        if !continues {
            self.flush_span();
            self.span = Some(TextSpan {
                size,
                x,
                baseline,
                width: 0.0,
                text: String::new(),
            });
        }

        if let Some(span) = self.span.as_mut() {
            span.text.push_str(char);
            span.width = span.width.max(x + advance - span.x);
            span.size = span.size.max(size);
        }
        Ok(())
    }

    fn begin_word(&mut self) -> DeviceResult {
        Ok(())
    }

    fn end_word(&mut self) -> DeviceResult {
        Ok(())
    }

    fn end_line(&mut self) -> DeviceResult {
        self.flush_span();
        Ok(())
    }

    fn stroke(&mut self, ctm: &Transform, _colorspace: &ColorSpace, _color: &[f64], path: &Path) -> DeviceResult {
        self.add_path(ctm, path);
        Ok(())
    }

    fn fill(&mut self, ctm: &Transform, _colorspace: &ColorSpace, _color: &[f64], path: &Path) -> DeviceResult {
        self.add_path(ctm, path);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct PageMarks {
    fonts: BTreeSet<String>,
    images: usize,
}

/// Fonts that show text on a page and the images it places
fn scan_page(doc: &Document, number: u32, page_id: ObjectId) -> PageMarks {
    let resources = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .ok()
        .and_then(|page| inherited(doc, page, b"Resources"))
        .and_then(|o| o.as_dict().ok());

    let operations = match doc.get_page_content(page_id).map(|c| Content::decode(&c)) {
        Ok(Ok(content)) => content.operations,
        Ok(Err(e)) | Err(e) => {
            warn!("Skipping undecodable content on page {}: {}", number, e);
            Vec::new()
        }
    };

    let mut scanner = MarkScanner {
        doc,
        marks: PageMarks::default(),
    };
    scanner.run(&operations, resources, 0);
    scanner.marks
}

struct MarkScanner<'a> {
    doc: &'a Document,
    marks: PageMarks,
}

impl<'a> MarkScanner<'a> {
    fn run(&mut self, operations: &[Operation], resources: Option<&'a Dictionary>, depth: usize) {
        let mut font: Option<String> = None;
        let mut saved = Vec::new();

        for op in operations {
            let operands = op.operands.as_slice();
            let shown = match op.operator.as_str() {
                "q" => {
                    saved.push(font.clone());
                    false
                }
                "Q" => {
                    if let Some(state) = saved.pop() {
                        font = state;
                    }
                    false
                }
                "Tf" => {
                    if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                        font = Some(self.font_name(resources, name));
                    }
                    false
                }
                "Tj" | "'" | "TJ" => operands.first().is_some_and(shows_text),
                "\"" => operands.get(2).is_some_and(shows_text),
                "Do" => {
                    if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                        self.draw_xobject(name, resources, depth);
                    }
                    false
                }
                "BI" => {
                    self.marks.images += 1;
                    false
                }
                _ => false,
            };

            if shown {
                if let Some(name) = &font {
                    self.marks.fonts.insert(name.clone());
                }
            }
        }
    }

    fn draw_xobject(&mut self, name: &[u8], resources: Option<&'a Dictionary>, depth: usize) {
        let doc = self.doc;
        let stream = match resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|o| resolve(doc, o))
        {
            Some(Object::Stream(stream)) => stream,
            _ => return,
        };

        match stream.dict.get(b"Subtype").and_then(Object::as_name) {
            Ok(b"Image") => self.marks.images += 1,
            Ok(b"Form") if depth < MAX_FORM_DEPTH => {
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|o| resolve(doc, o))
                    .and_then(|o| o.as_dict().ok())
                    .or(resources);
                let bytes = stream.decompressed_content().unwrap_or_else(|_| stream.content.clone());

                match Content::decode(&bytes) {
                    Ok(content) => self.run(&content.operations, form_resources, depth + 1),
                    Err(e) => warn!("Skipping undecodable form XObject: {}", e),
                }
            }
            _ => {}
        }
    }

    fn font_name(&self, resources: Option<&'a Dictionary>, resource_name: &[u8]) -> String {
        let doc = self.doc;
        let base_font = resources
            .and_then(|r| r.get(b"Font").ok())
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|fonts| fonts.get(resource_name).ok())
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|font| font.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok());

        match base_font {
            Some(name) => strip_subset_prefix(&String::from_utf8_lossy(name)).to_string(),
            None => String::from_utf8_lossy(resource_name).into_owned(),
        }
    }
}

/// Any non-empty string operand, including each piece of a TJ array
fn shows_text(obj: &Object) -> bool {
    match obj {
        Object::String(bytes, _) => !bytes.is_empty(),
        Object::Array(items) => items.iter().any(shows_text),
        _ => false,
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_TREE_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Look up a page attribute, following `Parent` links for inheritable keys
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value);
        }
        node = node
            .get(b"Parent")
            .ok()
            .and_then(|parent| resolve(doc, parent))
            .and_then(|parent| parent.as_dict().ok())?;
    }
    None
}

/// The visible page box as `[llx, lly, urx, ury]`
fn page_box(doc: &Document, page: &Dictionary) -> [f64; 4] {
    [b"CropBox".as_slice(), b"MediaBox".as_slice()]
        .iter()
        .filter_map(|key| inherited(doc, page, key))
        .filter_map(|obj| obj.as_array().ok())
        .filter_map(|values| {
            let v: Vec<f64> = values.iter().filter_map(number).collect();
            (v.len() == 4).then(|| [v[0].min(v[2]), v[1].min(v[3]), v[0].max(v[2]), v[1].max(v[3])])
        })
        .find(|[llx, lly, urx, ury]| urx > llx && ury > lly)
        .unwrap_or(DEFAULT_PAGE_BOX)
}

/// Subset fonts carry a six-letter tag, e.g. `ABCDEF+Calibri`
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}
