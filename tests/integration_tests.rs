//! Integration tests for the ATS scorer

use ats_scorer::input::text_extractor::{extract_text, PdfExtractor};
use ats_scorer::input::{InputManager, ResumeDocument};
use ats_scorer::processing::{analyze, Analyzer};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::io::Write;
use tempfile::TempDir;

const STANDARD_FONTS: [&str; 5] = ["Helvetica", "Times-Roman", "Courier", "Helvetica-Bold", "Times-Bold"];

/// Letter-sized pages sharing one resource dictionary
fn build_pdf(pages: Vec<Vec<Operation>>, resources: impl FnOnce(&mut Document) -> Dictionary) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let resources = resources(&mut doc);
    let resources_id = doc.add_object(resources);

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn standard_fonts(doc: &mut Document, fonts: &[&str]) -> Dictionary {
    let mut font_dict = Dictionary::new();
    for (i, base_font) in fonts.iter().enumerate() {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => *base_font,
            "Encoding" => "WinAnsiEncoding",
        });
        font_dict.set(format!("F{}", i + 1), font_id);
    }
    font_dict
}

/// One page; fonts are registered as F1, F2, ... and the optional image as Im1
fn resume_pdf(operations: Vec<Operation>, fonts: &[&str], with_image: bool) -> Vec<u8> {
    build_pdf(vec![operations], |doc| {
        let mut resources = dictionary! { "Font" => standard_fonts(doc, fonts) };
        if with_image {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 1,
                    "Height" => 1,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![0],
            ));
            resources.set("XObject", dictionary! { "Im1" => image_id });
        }
        resources
    })
}

/// Glyph ids sit 29 below the code point; only the ToUnicode map recovers the text
const GLYPH_SHIFT: u16 = 29;

const IDENTITY_UCS_CMAP: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
1 beginbfrange
<0003> <0061> <0020>
endbfrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end
";

/// Subset TrueType font behind Identity-H, the way most word processors embed fonts
fn identity_h_font(doc: &mut Document) -> ObjectId {
    let to_unicode = doc.add_object(Stream::new(dictionary! {}, IDENTITY_UCS_CMAP.to_vec()));
    let descriptor = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => "QWERTY+Carlito",
        "Flags" => 32,
        "FontBBox" => vec![(-500).into(), (-250).into(), 1200.into(), 950.into()],
        "ItalicAngle" => 0,
        "Ascent" => 750,
        "Descent" => -250,
        "CapHeight" => 640,
        "StemV" => 80,
    });
    let descendant = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "QWERTY+Carlito",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor,
        "DW" => 500,
    });
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "QWERTY+Carlito",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![descendant.into()],
        "ToUnicode" => to_unicode,
    })
}

fn glyph_ids(text: &str) -> Object {
    let bytes = text
        .encode_utf16()
        .flat_map(|unit| (unit - GLYPH_SHIFT).to_be_bytes())
        .collect();
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn show(font: &str, size: i64, x: i64, y: i64, string: Object) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![string]),
        Operation::new("ET", vec![]),
    ]
}

/// Lines drawn top-down from y=700 in PDF space, 30 points apart
fn lines(lines: &[(&str, &str)]) -> Vec<Operation> {
    lines
        .iter()
        .enumerate()
        .flat_map(|(i, (font, text))| show(font, 11, 72, 700 - 30 * i as i64, Object::string_literal(*text)))
        .collect()
}

fn clean_resume() -> Vec<u8> {
    let ops = lines(&[
        ("F1", "Jane Doe"),
        ("F1", "jane@example.com | 555-123-4567"),
        ("F1", "Experience"),
        ("F1", "- Built reporting pipelines in Python"),
        ("F1", "Education"),
        ("F1", "BSc Computer Science"),
        ("F1", "Skills"),
        ("F1", "- Python, Excel"),
        ("F1", "Projects"),
        ("F1", "- Open source dashboard"),
    ]);
    resume_pdf(ops, &["Helvetica"], false)
}

#[test]
fn test_clean_resume_against_job_description() {
    let document = ResumeDocument::from_bytes(clean_resume());
    let result = analyze(&document, Some("Looking for Python and SQL skills")).unwrap();

    assert_eq!(result.content_score, 50);
    assert_eq!(result.format_issues, vec!["Resume too short (< 200 words)"]);
    assert_eq!(result.format_score, 80);
    assert_eq!(result.keyword_score, 50.0);
    assert_eq!(result.matched_keywords, vec!["python"]);
    assert_eq!(result.total_score, 20.0 + 24.0 + 15.0);
    assert_eq!(
        result.missing_features,
        vec!["Certifications", "Extracurricular Activities", "Summary", "Achievements", "Metrics"]
    );
}

#[test]
fn test_many_fonts_and_image_are_flagged_in_order() {
    let mut ops = lines(&[
        ("F1", "Experience"),
        ("F2", "Education"),
        ("F3", "Skills"),
        ("F4", "- Python"),
        ("F5", "Projects"),
    ]);
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("cm", vec![40.into(), 0.into(), 0.into(), 40.into(), 72.into(), 300.into()]));
    ops.push(Operation::new("Do", vec!["Im1".into()]));
    ops.push(Operation::new("Q", vec![]));

    let document = ResumeDocument::from_bytes(resume_pdf(ops, &STANDARD_FONTS, true));
    let result = analyze(&document, None).unwrap();

    assert_eq!(
        result.format_issues,
        vec![
            "Too many fonts used (recommend 1-2)",
            "Contains images (ATS may not read content)",
            "Resume too short (< 200 words)",
        ]
    );
    assert_eq!(result.format_score, 55);
}

#[test]
fn test_contact_line_in_page_header() {
    let ops = show("F1", 10, 72, 770, Object::string_literal("jane@example.com"))
        .into_iter()
        .chain(lines(&[("F1", "- Experience"), ("F1", "Education"), ("F1", "Skills")]))
        .collect();

    let document = ResumeDocument::from_bytes(resume_pdf(ops, &["Helvetica"], false));
    let result = analyze(&document, None).unwrap();

    assert_eq!(result.format_issues[0], "Contact info in header (may be skipped by ATS)");
}

#[test]
fn test_contact_line_in_identity_h_font_is_found_in_header() {
    let mut ops = show("F1", 10, 72, 770, glyph_ids("jane@example.com"));
    for (i, line) in ["- Experience", "Education", "Skills"].iter().enumerate() {
        ops.extend(show("F1", 11, 72, 700 - 30 * i as i64, glyph_ids(line)));
    }
    let bytes = build_pdf(vec![ops], |doc| {
        let font = identity_h_font(doc);
        dictionary! { "Font" => dictionary! { "F1" => font } }
    });

    let text = extract_text(&bytes).unwrap();
    assert!(text.contains("jane@example.com"));

    let result = analyze(&ResumeDocument::from_bytes(bytes), None).unwrap();
    assert_eq!(result.format_issues[0], "Contact info in header (may be skipped by ATS)");
    assert!(!result.format_issues.iter().any(|issue| issue.starts_with("Missing sections")));
}

#[test]
fn test_sidebar_sharing_baselines_is_multi_column() {
    let mut ops = Vec::new();
    for row in 0..6 {
        let y = 600 - 14 * row;
        ops.extend(show("F1", 10, 40, y, Object::string_literal("Left sidebar text")));
        ops.extend(show("F1", 10, 400, y, Object::string_literal("Right column text")));
    }
    let document = ResumeDocument::from_bytes(resume_pdf(ops, &["Helvetica"], false));
    let result = analyze(&document, None).unwrap();

    assert!(result
        .format_issues
        .contains(&"Multi-column layout detected (ATS may misread order)".to_string()));
}

#[test]
fn test_page_texts_are_concatenated_in_order_without_separator() {
    let first = show("F1", 11, 72, 700, Object::string_literal("Experience at Acme"));
    let second = show("F1", 11, 72, 700, Object::string_literal("Education at State"));
    let bytes = build_pdf(vec![first, second], |doc| dictionary! { "Font" => standard_fonts(doc, &["Helvetica"]) });

    let pages = PdfExtractor.extract_pages(&bytes).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages[0].contains("Acme") && !pages[0].contains("State"));
    assert!(pages[1].contains("State"));

    let text = extract_text(&bytes).unwrap();
    assert_eq!(text, pages.concat());
    assert_eq!(text.len(), pages[0].len() + pages[1].len());
    assert!(text.find("Acme").unwrap() < text.find("State").unwrap());

    let detailed = Analyzer::new()
        .unwrap()
        .analyze_detailed(&ResumeDocument::from_bytes(bytes), None)
        .unwrap();
    assert_eq!(detailed.layout.pages, 2);
}

#[test]
fn test_empty_job_description_is_neutral() {
    let document = ResumeDocument::from_bytes(clean_resume());
    let analyzer = Analyzer::new().unwrap();

    let without = analyzer.analyze(&document, None).unwrap();
    let empty = analyzer.analyze(&document, Some("")).unwrap();

    assert_eq!(without, empty);
    assert_eq!(empty.keyword_score, 0.0);
    assert!(empty.matched_keywords.is_empty());
    assert_eq!(empty.total_score, 20.0 + 24.0);
}

#[test]
fn test_unopenable_document_is_extraction_error() {
    let garbage = ResumeDocument::from_bytes(b"definitely not a pdf".to_vec());
    assert!(analyze(&garbage, None).unwrap_err().is_extraction());

    let truncated = ResumeDocument::from_bytes(clean_resume()[..200].to_vec());
    assert!(analyze(&truncated, None).unwrap_err().is_extraction());
}

#[test]
fn test_path_document_and_input_manager() {
    let dir = TempDir::new().unwrap();
    let resume_path = dir.path().join("jane.pdf");
    std::fs::write(&resume_path, clean_resume()).unwrap();

    let job_path = dir.path().join("job.md");
    let mut job_file = std::fs::File::create(&job_path).unwrap();
    writeln!(job_file, "## Requirements\n\n- **Python**\n- `Tableau`").unwrap();

    let manager = InputManager::new(10 * 1024 * 1024);
    let loaded = manager.load_resume(&resume_path).unwrap();
    let job_description = manager.read_job_description(&job_path).unwrap();

    let from_manager = analyze(&loaded, Some(&job_description)).unwrap();
    let from_path = analyze(&ResumeDocument::from_path(&resume_path), Some(&job_description)).unwrap();

    assert_eq!(from_manager, from_path);
    assert_eq!(from_path.matched_keywords, vec!["python"]);
    assert_eq!(from_path.keyword_score, 50.0);
}

#[test]
fn test_input_manager_limits() {
    let dir = TempDir::new().unwrap();
    let resume_path = dir.path().join("jane.pdf");
    std::fs::write(&resume_path, clean_resume()).unwrap();

    let tiny_limit = InputManager::new(16);
    assert!(tiny_limit.load_resume(&resume_path).is_err());

    let manager = InputManager::new(10 * 1024 * 1024);
    assert!(manager.load_resume(&dir.path().join("missing.pdf")).is_err());

    let unknown = dir.path().join("job.xyz");
    std::fs::write(&unknown, "python").unwrap();
    assert!(manager.read_job_description(&unknown).is_err());
}
