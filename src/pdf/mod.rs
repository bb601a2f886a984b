//! # PDF Serializer
//!
//! Takes laid-out pages and writes a PDF 1.7 file.
//!
//! The writer covers exactly what the prescription needs: standard Type1
//! fonts in WinAnsiEncoding, stroked and filled rectangles, lines, text, and
//! image XObjects. Layout already works in PDF user space, so coordinates
//! are written as they are.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;
use std::sync::Arc;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, LoadedImage};
use crate::layout::{Color, DrawCommand, LayoutElement, LayoutPage};

/// Windows-1252 codes 0x80..=0x9F and the characters they stand for.
const WINANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// Document information dictionary entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Font and its object id; the index is the `/F{n}` resource name.
    font_objects: Vec<(StandardFont, usize)>,
    /// Distinct images and their XObject ids; the index is `/Im{n}`.
    image_objects: Vec<(Arc<LoadedImage>, usize)>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn font_index(&self, font: StandardFont) -> usize {
        self.font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }

    fn image_index(&self, image: &Arc<LoadedImage>) -> Option<usize> {
        self.image_objects
            .iter()
            .position(|(img, _)| Arc::ptr_eq(img, image))
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, images, then page objects and content streams
        for _ in 0..3 {
            builder.push(Vec::new());
        }

        self.register_fonts(&mut builder, pages);
        self.register_images(&mut builder, pages);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in pages {
            let content = self.build_content_stream(page, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            let content_obj_id = builder.push(content_data);

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width,
                page.height,
                content_obj_id,
                self.build_resource_dict(page, &builder)
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.push(Self::info_dict(metadata).into_bytes());
        self.serialize(&builder, info_obj_id)
    }

    fn info_dict(metadata: &Metadata) -> String {
        let mut info = String::from("<< ");
        let entries = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Creator", &metadata.creator),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                let _ = write!(info, "/{} ({}) ", key, Self::encode_text(value));
            }
        }
        let _ = write!(
            info,
            "/Producer (careerdoc {}) >>",
            env!("CARGO_PKG_VERSION")
        );
        info
    }

    /// One Type1 font object per standard font used anywhere in the
    /// document, in a fixed order. Times-Roman is always present.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut fonts: BTreeSet<StandardFont> = BTreeSet::new();
        fonts.insert(StandardFont::TimesRoman);
        for element in pages.iter().flat_map(|p| &p.elements) {
            if let DrawCommand::Text { lines, .. } = &element.draw {
                fonts.extend(lines.iter().flat_map(|l| l.spans.iter().map(|s| s.font)));
            }
        }

        for font in fonts {
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let obj_id = builder.push(dict.into_bytes());
            builder.font_objects.push((font, obj_id));
        }
    }

    /// Create XObjects for each distinct image. The same header drawn on
    /// several pages is embedded once.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        for element in pages.iter().flat_map(|p| &p.elements) {
            if let DrawCommand::Image { image } = &element.draw {
                if builder.image_index(image).is_none() {
                    let obj_id = Self::write_image_xobject(builder, image);
                    builder.image_objects.push((Arc::clone(image), obj_id));
                }
            }
        }
    }

    /// Write a single image as one or two XObjects. Returns the main id.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace {} \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space.pdf_name(),
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.push(obj_data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed = compress_to_vec_zlib(alpha_data, 6);
                    let mut smask: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask,
                        "<< /Type /XObject /Subtype /Image \
                         /Width {} /Height {} \
                         /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 \
                         /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed.len()
                    );
                    smask.extend_from_slice(&compressed);
                    smask.extend_from_slice(b"\nendstream");
                    builder.push(smask)
                });

                let compressed = compress_to_vec_zlib(rgb, 6);
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed);
                obj_data.extend_from_slice(b"\nendstream");
                builder.push(obj_data)
            }
        }
    }

    fn build_resource_dict(&self, page: &LayoutPage, builder: &PdfBuilder) -> String {
        let fonts = builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut used: Vec<usize> = page
            .elements
            .iter()
            .filter_map(|el| match &el.draw {
                DrawCommand::Image { image } => builder.image_index(image),
                _ => None,
            })
            .collect();
        used.sort_unstable();
        used.dedup();

        if used.is_empty() {
            return format!("/Font << {} >>", fonts);
        }
        let xobjects = used
            .iter()
            .map(|&i| format!("/Im{} {} 0 R", i, builder.image_objects[i].1))
            .collect::<Vec<_>>()
            .join(" ");
        format!("/Font << {} >> /XObject << {} >>", fonts, xobjects)
    }

    /// Build the content stream for a single page.
    fn build_content_stream(&self, page: &LayoutPage, builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        for element in &page.elements {
            self.write_element(&mut stream, element, builder);
        }
        stream
    }

    /// Write a single layout element as PDF operators.
    fn write_element(&self, stream: &mut String, element: &LayoutElement, builder: &PdfBuilder) {
        let (x, y, w, h) = (element.x, element.y, element.width, element.height);
        match &element.draw {
            DrawCommand::Rect {
                fill,
                stroke,
                line_width,
            } => {
                if let Some(c) = fill {
                    let _ = write!(
                        stream,
                        "q\n{} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        Self::color_components(c),
                        x,
                        y,
                        w,
                        h
                    );
                }
                if let Some(c) = stroke {
                    let _ = write!(
                        stream,
                        "q\n{} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        Self::color_components(c),
                        line_width,
                        x,
                        y,
                        w,
                        h
                    );
                }
            }

            DrawCommand::Line { color, line_width } => {
                let _ = write!(
                    stream,
                    "q\n{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    Self::color_components(color),
                    line_width,
                    x,
                    y,
                    x + w,
                    y + h
                );
            }

            DrawCommand::Text { lines, color } => {
                let _ = write!(stream, "BT\n{} rg\n", Self::color_components(color));
                for line in lines {
                    for span in line.spans.iter().filter(|s| !s.text.trim().is_empty()) {
                        let _ = write!(
                            stream,
                            "/F{} {:.1} Tf\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\n",
                            builder.font_index(span.font),
                            span.font_size,
                            line.x + span.x_offset,
                            line.y,
                            Self::encode_text(&span.text)
                        );
                    }
                }
                stream.push_str("ET\n");
            }

            DrawCommand::Image { image } => match builder.image_index(image) {
                Some(idx) => {
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        w, h, x, y, idx
                    );
                }
                None => {
                    let _ = write!(
                        stream,
                        "q\n0.9 0.9 0.9 rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        x, y, w, h
                    );
                }
            },
        }
    }

    fn color_components(c: &Color) -> String {
        format!("{:.3} {:.3} {:.3}", c.r, c.g, c.b)
    }

    /// Encode text for a literal string in WinAnsiEncoding. Characters with
    /// no WinAnsi code become `?`.
    fn encode_text(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte.
    ///
    /// WinAnsiEncoding is Windows-1252: 0x20..=0x7E and 0xA0..=0xFF map
    /// directly, 0x80..=0x9F hold smart quotes, bullets, dashes and a few
    /// letters.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        WINANSI_HIGH
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|&(_, code)| code)
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}
