//! Integration tests for the careerdoc rendering pipeline.
//!
//! These tests exercise the full path from a request to PDF bytes.
//! They verify:
//! - JSON requests deserialize and validate
//! - The document always has its three pages
//! - Content streams carry the expected text
//! - Strict domain validation and the new-page overflow policy
//! - A header image is embedded once and drawn on every page that shows it
//! - The page template is drawn under the last page, or skipped when absent

use std::io::Cursor;
use std::sync::Arc;

use careerdoc::font::StandardFont;
use careerdoc::image_loader::load_image;
use careerdoc::layout::{
    Color, DrawCommand, LayoutElement, LayoutPage, OverflowPolicy, RenderOptions, TextLine,
};
use careerdoc::model::{AiContent, DomainCatalog, PrescriptionRequest, Status};
use careerdoc::pdf::{Metadata, PdfWriter};
use careerdoc::table::{BuildError, DomainValidation};
use careerdoc::template::PageTemplate;
use careerdoc::text::TextSpan;
use careerdoc::{load_template, render, render_json, CareerDocError, RenderContext};
use miniz_oxide::inflate::decompress_to_vec_zlib;

// ─── Helpers ────────────────────────────────────────────────────

fn catalog() -> DomainCatalog {
    DomainCatalog::builtin().expect("built-in catalog parses")
}

fn request(domains: &[&str]) -> PrescriptionRequest {
    PrescriptionRequest {
        name: "Asha Menon".to_string(),
        status: Status::JobSeeker,
        domains: domains.iter().map(|d| d.to_string()).collect(),
        ai_content: AiContent {
            intro_line: "You are a strong fit for <b>analytics</b>.".to_string(),
            domain_bullets: vec![
                "<b>Finance</b>: forecasting and risk.".to_string(),
                "<b>Retail</b>: pricing and demand.".to_string(),
            ],
            projects_bullet: "Build <b>three projects</b>.".to_string(),
            final_sentence: "All the best.".to_string(),
            domains_title: String::new(),
            error: None,
        },
    }
}

fn as_text(pdf: &[u8]) -> String {
    String::from_utf8_lossy(pdf).into_owned()
}

/// Inflate every Flate stream in the file. Image streams come back as
/// binary noise, which is fine for substring checks.
fn content_streams(pdf: &[u8]) -> String {
    let mut out = String::new();
    let mut rest = pdf;
    while let Some(start) = find(rest, b"stream\n") {
        let body = &rest[start + 7..];
        let Some(end) = find(body, b"\nendstream") else {
            break;
        };
        if let Ok(inflated) = decompress_to_vec_zlib(&body[..end]) {
            out.push_str(&String::from_utf8_lossy(&inflated));
            out.push('\n');
        }
        rest = &body[end + 10..];
    }
    out
}

fn page_count(pdf: &[u8]) -> usize {
    let text = as_text(pdf);
    let start = text.find("/Count ").expect("page tree has a count") + 7;
    text[start..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|n| n.parse().ok())
        .expect("count is numeric")
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn png_data_uri(width: u32, height: u32) -> String {
    use base64::Engine;
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

    let img = RgbaImage::from_pixel(width, height, Rgba([20, 40, 120, 255]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(buf)
    )
}

/// A plain PDF with one line of text per page.
fn text_pdf(texts: &[&str]) -> Vec<u8> {
    let pages: Vec<LayoutPage> = texts
        .iter()
        .map(|text| LayoutPage {
            width: 595.28,
            height: 841.89,
            elements: vec![LayoutElement {
                x: 60.0,
                y: 500.0,
                width: 300.0,
                height: 11.0,
                draw: DrawCommand::Text {
                    lines: vec![TextLine {
                        x: 60.0,
                        y: 500.0,
                        spans: vec![TextSpan {
                            text: text.to_string(),
                            font: StandardFont::TimesRoman,
                            font_size: 11.0,
                            x_offset: 0.0,
                            width: 300.0,
                        }],
                    }],
                    color: Color::BLACK,
                },
            }],
        })
        .collect();
    PdfWriter::new().write(&pages, &Metadata::default())
}

// ─── Document structure ─────────────────────────────────────────

#[test]
fn test_render_produces_valid_three_page_pdf() {
    let catalog = catalog();
    let ctx = RenderContext::new(&catalog);
    let pdf = render(&request(&["Finance", "Retail"]), &ctx).unwrap();

    assert!(pdf.starts_with(b"%PDF-1.7"));
    assert!(pdf.ends_with(b"%%EOF\n"));

    let text = as_text(&pdf);
    assert!(text.contains("/Count 3"));
    assert!(text.contains("/Title (Career Prescription - Asha Menon)"));
    assert!(text.contains("/Subject (Finance & Retail)"));
    assert!(text.contains("/BaseFont /Times-Roman"));
    assert!(text.contains("/BaseFont /Times-Bold"));
}

#[test]
fn test_content_streams_carry_document_text() {
    let catalog = catalog();
    let ctx = RenderContext::new(&catalog);
    let pdf = render(&request(&["Finance"]), &ctx).unwrap();
    let streams = content_streams(&pdf);

    assert!(streams.contains("(Hi Asha Menon,) Tj"));
    assert!(streams.contains("(Job Seeker) Tj"));
    assert!(streams.contains("(Actual projects will be revealed during placement training) Tj"));
    // No header configured: the error line is drawn instead.
    assert!(streams.contains("(ERROR: header image not found!) Tj"));
}

#[test]
fn test_empty_ai_content_still_renders() {
    let catalog = catalog();
    let ctx = RenderContext::new(&catalog);
    let mut req = request(&["Healthcare"]);
    req.ai_content = AiContent::default();

    let pdf = render(&req, &ctx).unwrap();
    assert!(as_text(&pdf).contains("/Count 3"));
    assert!(as_text(&pdf).contains("/Subject (Healthcare)"));
}

// ─── JSON input ─────────────────────────────────────────────────

#[test]
fn test_render_json_request() {
    let catalog = catalog();
    let ctx = RenderContext::new(&catalog);
    let json = r#"{
        "name": "Ravi Kumar",
        "status": "Student",
        "domains": ["Supply Chain"],
        "aiContent": {
            "intro_line": "Hello <b>Ravi</b>",
            "domain_bullets": ["<b>Supply Chain</b> analytics"]
        }
    }"#;
    let pdf = render_json(json, &ctx).unwrap();
    let streams = content_streams(&pdf);
    assert!(streams.contains("(Hi Ravi Kumar,) Tj"));
    assert!(streams.contains("(Student) Tj"));
}

#[test]
fn test_malformed_json_carries_hint() {
    let catalog = catalog();
    let ctx = RenderContext::new(&catalog);
    let err = render_json(r#"{"name": "A", "domains": [}"#, &ctx).unwrap_err();
    assert!(matches!(err, CareerDocError::ParseError { .. }));
    assert!(err.to_string().contains("Hint:"));
}

#[test]
fn test_ai_error_key_is_rejected() {
    let err = AiContent::from_json(r#"{"error": "rate limited"}"#).unwrap_err();
    assert!(matches!(err, CareerDocError::AiContent(ref m) if m == "rate limited"));
}

#[test]
fn test_request_with_ai_error_is_not_rendered() {
    let catalog = catalog();
    let ctx = RenderContext::new(&catalog);
    let json = r#"{
        "name": "Ravi",
        "status": "Student",
        "domains": ["Finance"],
        "aiContent": {"error": "API Key not configured"}
    }"#;
    match render_json(json, &ctx) {
        Err(CareerDocError::AiContent(message)) => assert_eq!(message, "API Key not configured"),
        other => panic!("expected AI content error, got {:?}", other.map(|pdf| pdf.len())),
    }
}

#[test]
fn test_null_ai_fields_render_as_empty() {
    let catalog = catalog();
    let ctx = RenderContext::new(&catalog);
    let json = r#"{
        "name": "Ravi",
        "domains": ["Retail"],
        "aiContent": {
            "intro_line": null,
            "domain_bullets": "<b>Retail</b> pricing",
            "projects_bullet": null
        }
    }"#;
    let pdf = render_json(json, &ctx).unwrap();
    assert_eq!(page_count(&pdf), 3);
}

// ─── Validation ─────────────────────────────────────────────────

#[test]
fn test_request_validation_reports_all_problems() {
    let catalog = catalog();
    let ctx = RenderContext::new(&catalog);
    let mut req = request(&["Finance", "Retail", "Healthcare", "E-Commerce"]);
    req.name = "  ".to_string();

    match render(&req, &ctx).unwrap_err() {
        CareerDocError::Validation(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(errors.iter().any(|e| e == "Name is required"));
            assert!(errors.iter().any(|e| e == "Select at most 3 domains"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_unknown_domain_lenient_vs_strict() {
    let catalog = catalog();
    let req = request(&["Finance", "Astrology"]);

    let lenient = RenderContext::new(&catalog);
    assert!(render(&req, &lenient).is_ok());

    let strict = RenderContext::new(&catalog).with_validation(DomainValidation::Strict);
    match render(&req, &strict).unwrap_err() {
        CareerDocError::Build(BuildError::UnknownDomain(d)) => assert_eq!(d, "Astrology"),
        other => panic!("expected unknown domain, got {:?}", other),
    }
}

// ─── Overflow policy ────────────────────────────────────────────

#[test]
fn test_new_page_policy_adds_pages_for_long_content() {
    let catalog = catalog();
    let mut req = request(&["Finance", "Healthcare", "E-Commerce"]);
    req.ai_content.domain_bullets = (0..12)
        .map(|i| {
            format!(
                "<b>Point {}</b>: a long explanation of how this domain uses forecasting, \
                 dashboards, experimentation and stakeholder reporting in daily work.",
                i
            )
        })
        .collect();

    let overflow = RenderContext::new(&catalog);
    let pdf = render(&req, &overflow).unwrap();
    assert_eq!(page_count(&pdf), 3);

    let new_page = RenderContext::new(&catalog).with_options(RenderOptions {
        overflow: OverflowPolicy::NewPage,
        ..RenderOptions::default()
    });
    let pdf = render(&req, &new_page).unwrap();
    assert!(page_count(&pdf) > 3);
}

// ─── Header image ───────────────────────────────────────────────

#[test]
fn test_header_image_embedded_once() {
    let catalog = catalog();
    let header = Arc::new(load_image(&png_data_uri(40, 8)).unwrap());
    let ctx = RenderContext::new(&catalog).with_header(Some(header));
    let pdf = render(&request(&["Finance"]), &ctx).unwrap();

    let text = as_text(&pdf);
    assert_eq!(text.matches("/Subtype /Image").count(), 1);
    let streams = content_streams(&pdf);
    assert_eq!(streams.matches("/Im0 Do").count(), 2);
    assert!(!streams.contains("ERROR: header image not found!"));
}

// ─── Page template ──────────────────────────────────────────────

#[test]
fn test_template_page_drawn_under_last_page() {
    let catalog = catalog();
    let template = PageTemplate::from_bytes(&text_pdf(&["Cover", "Terms", "Stock closing page"]))
        .unwrap();
    let ctx = RenderContext::new(&catalog).with_template(Some(Arc::new(template)));
    let pdf = render(&request(&["Finance"]), &ctx).unwrap();

    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 3);

    let last = String::from_utf8_lossy(&doc.get_page_content(pages[&3]).unwrap()).into_owned();
    assert!(last.starts_with("q\n/Tpl0 Do\nQ\n"));
    // The border is still drawn on top.
    assert!(last.contains(" re\n"));
    assert!(as_text(&pdf).contains("(Stock closing page) Tj"));

    let first = String::from_utf8_lossy(&doc.get_page_content(pages[&1]).unwrap()).into_owned();
    assert!(!first.contains("/Tpl0 Do"));
}

#[test]
fn test_missing_template_leaves_border_only_page() {
    let catalog = catalog();
    let missing = std::env::temp_dir().join("careerdoc-no-such-template.pdf");
    let template = load_template(&missing);
    assert!(template.is_none());

    let ctx = RenderContext::new(&catalog).with_template(template);
    let pdf = render(&request(&["Finance"]), &ctx).unwrap();
    assert_eq!(page_count(&pdf), 3);
    assert!(!content_streams(&pdf).contains("/Tpl0 Do"));
}

#[test]
fn test_short_template_is_ignored() {
    let path = std::env::temp_dir().join(format!(
        "careerdoc-two-page-template-{}.pdf",
        std::process::id()
    ));
    std::fs::write(&path, text_pdf(&["Cover", "Terms"])).unwrap();
    let template = load_template(&path);
    std::fs::remove_file(&path).ok();
    assert!(template.is_none());
}
