//! # Page Composition
//!
//! Builds the three pages of a prescription as flat lists of positioned
//! draw commands, ready for the PDF writer.
//!
//! Composition walks a [`LayoutCursor`] down each page. Every block is
//! measured first (paragraphs through the text layout, tables through
//! [`table::Table::measure`]), then drawn with its top-left corner at the
//! cursor, then the cursor advances past it. What happens when a block
//! does not fit is decided by the [`OverflowPolicy`]:
//!
//! 1. `Overflow`: place it anyway and log a warning
//! 2. `NewPage`: open a continuation page (border and header included); a
//!    table splits only between row groups and repeats its header row
//!
//! All coordinates are PDF user space (origin bottom-left, `y` up).

pub mod copy;
pub mod cursor;
pub mod page_break;
pub mod table;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::font::{FontContext, StandardFont};
use crate::image_loader::LoadedImage;
use crate::model::{AiContent, DomainCatalog, Status};
use crate::richtext::RichText;
use crate::table::TableAssembly;
use crate::text::{Paragraph, ParagraphStyle, TextLayout, TextSpan};

pub use cursor::{Gap, LayoutCursor, LayoutError, Margins, PageGeometry, Spacing};
pub use page_break::{decide_break, BreakDecision, OverflowPolicy};
pub use table::{CellPadding, MeasuredTable, Table, TableCell};

/// Header image height before aspect scaling.
const HEADER_HEIGHT: f64 = 100.0;
/// Gap between the page top and the header image.
const HEADER_TOP: f64 = 10.0;
/// Space reserved below the header image (rule included).
const HEADER_RESERVE: f64 = 30.0;
/// Reserved height when the header image is unavailable.
const HEADER_FALLBACK_RESERVE: f64 = 100.0;
/// Offset between the reserved header area and the first block.
const HEADER_CLEARANCE: f64 = 15.0;
/// Horizontal offsets of the colon and value in labeled rows.
const LABEL_COLON_OFFSET: f64 = 140.0;
const LABEL_VALUE_OFFSET: f64 = 155.0;
/// Baseline offset of a row label below the row top.
const LABEL_BASELINE: f64 = 10.0;
const REVEAL_BOX_HEIGHT: f64 = 30.0;
const REVEAL_BOX_CLEARANCE: f64 = 5.0;

const SERVICE_COLUMNS: [f64; 2] = [0.32, 0.68];
const CAREER_COLUMNS: [f64; 5] = [0.18, 0.15, 0.25, 0.20, 0.22];

/// An RGB color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
}

/// A single laid-out page.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

/// A positioned element. `(x, y)` is the bottom-left corner of its box.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// A rectangle covering the element box.
    Rect {
        fill: Option<Color>,
        stroke: Option<Color>,
        line_width: f64,
    },
    /// A straight line from `(x, y)` to `(x + width, y + height)`.
    Line { color: Color, line_width: f64 },
    /// Lines of text with absolute baselines.
    Text { lines: Vec<TextLine>, color: Color },
    /// An image scaled to the element box.
    Image { image: Arc<LoadedImage> },
}

/// One line of text. `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub spans: Vec<TextSpan>,
}

/// Options that shape composition.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub overflow: OverflowPolicy,
    pub geometry: PageGeometry,
    pub spacing: Spacing,
}

/// Everything page composition reads.
#[derive(Debug, Clone)]
pub struct PrescriptionDocument<'a> {
    pub name: &'a str,
    pub status: Status,
    /// AI content with `domains_title` already resolved.
    pub content: &'a AiContent,
    pub table: &'a TableAssembly,
    pub catalog: &'a DomainCatalog,
    pub header: Option<Arc<LoadedImage>>,
}

/// Place a measured paragraph with its top-left corner at `(x, top)`.
pub(crate) fn paragraph_element(
    paragraph: &Paragraph,
    x: f64,
    top: f64,
    color: Color,
) -> LayoutElement {
    let style = paragraph.style;
    let lines = paragraph
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| TextLine {
            x: x + line.indent,
            y: top - style.font_size - i as f64 * style.leading,
            spans: line.spans.clone(),
        })
        .collect();
    let height = paragraph.height();
    LayoutElement {
        x,
        y: top - height,
        width: paragraph.max_line_width(),
        height,
        draw: DrawCommand::Text { lines, color },
    }
}

/// A single unwrapped line of text at a given baseline.
fn text_line_element(
    text: &str,
    font: StandardFont,
    font_size: f64,
    x: f64,
    baseline: f64,
    color: Color,
) -> LayoutElement {
    let width = font.metrics().measure_string(text, font_size, 0.0);
    LayoutElement {
        x,
        y: baseline,
        width,
        height: font_size,
        draw: DrawCommand::Text {
            lines: vec![TextLine {
                x,
                y: baseline,
                spans: vec![TextSpan {
                    text: text.to_string(),
                    font,
                    font_size,
                    x_offset: 0.0,
                    width,
                }],
            }],
            color,
        },
    }
}

fn rule_element(x1: f64, x2: f64, y: f64, line_width: f64) -> LayoutElement {
    LayoutElement {
        x: x1,
        y,
        width: x2 - x1,
        height: 0.0,
        draw: DrawCommand::Line {
            color: Color::BLACK,
            line_width,
        },
    }
}

/// Lays out a prescription into pages.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    options: RenderOptions,
}

impl LayoutEngine {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn layout(&self, doc: &PrescriptionDocument) -> Result<Vec<LayoutPage>, LayoutError> {
        let mut composer = PageComposer::new(&self.options, doc.header.clone());

        compose_overview(&mut composer, doc)?;
        composer.open_page(true);
        compose_tables(&mut composer, doc)?;
        composer.open_page(false);

        let pages = composer.finish();
        debug!(pages = pages.len(), "layout complete");
        Ok(pages)
    }
}

/// Page 1: greeting, company copy, candidate details, roadmap, outcomes
/// and the AI-written prescription.
fn compose_overview(c: &mut PageComposer, doc: &PrescriptionDocument) -> Result<(), LayoutError> {
    let content = doc.content;
    let title = RichText::parse(&content.domains_title);

    c.heading(&format!("{}{},", copy::GREETING_PREFIX, doc.name))?;
    c.body(&RichText::parse(copy::INTRO), Gap::Paragraph)?;

    c.heading(copy::ABOUT_US_HEADING)?;
    c.body(&RichText::parse(copy::ABOUT_US), Gap::Paragraph)?;
    c.body(&RichText::parse(copy::INSTRUCTION), Gap::Heading)?;

    let status = doc.status.to_string();
    c.labeled_row(copy::LABEL_NAME, &RichText::plain(doc.name))?;
    c.labeled_row(copy::LABEL_STATUS, &RichText::plain(&status))?;
    c.labeled_row(copy::LABEL_TECHNOLOGIES, &RichText::plain(copy::TECHNOLOGIES))?;
    c.labeled_row(copy::LABEL_SECTORS, &title)?;

    c.advance(Gap::Paragraph)?;
    c.heading(copy::ROADMAP_HEADING)?;
    for step in copy::ROADMAP_STEPS {
        c.body(&RichText::plain(step), Gap::Bullet)?;
    }

    c.advance(Gap::Paragraph)?;
    c.heading(copy::OUTCOMES_HEADING)?;
    let domain_outcome = copy::domain_knowledge_outcome(&title.plain_text());
    let mut outcomes: Vec<&str> = copy::OUTCOMES_BEFORE_DOMAINS.to_vec();
    outcomes.push(&domain_outcome);
    outcomes.extend(copy::OUTCOMES_AFTER_DOMAINS);
    for item in outcomes {
        c.bullet(&RichText::plain(item), Gap::Bullet)?;
    }

    c.advance(Gap::Paragraph)?;
    c.heading(copy::PRESCRIPTION_HEADING)?;
    c.body(&RichText::parse(&content.intro_line), Gap::Paragraph)?;
    for bullet in content.domain_bullets.iter().filter(|b| !b.trim().is_empty()) {
        c.bullet(&RichText::parse(bullet), Gap::Bullet)?;
    }
    if !content.projects_bullet.trim().is_empty() {
        c.bullet(&RichText::parse(&content.projects_bullet), Gap::Paragraph)?;
    }
    if !content.final_sentence.trim().is_empty() {
        c.body(&RichText::parse(&content.final_sentence), Gap::None)?;
    }
    Ok(())
}

/// Page 2: services table, career prescription table and the reveal box.
fn compose_tables(c: &mut PageComposer, doc: &PrescriptionDocument) -> Result<(), LayoutError> {
    let title = &doc.content.domains_title;

    c.headed_table(copy::SERVICES_HEADING, &services_table(title), Gap::Section)?;
    c.headed_table(
        &copy::career_table_heading(title),
        &career_table(doc.table, doc.catalog),
        Gap::Section,
    )?;

    c.reveal_box(copy::REVEAL_TEXT)
}

fn header_row(labels: &[&str]) -> Vec<TableCell> {
    labels
        .iter()
        .map(|label| TableCell::text(RichText::bold(label)))
        .collect()
}

pub fn services_table(domains_title: &str) -> Table {
    let mut rows = vec![header_row(&copy::SERVICES_HEADER)];
    for (service, details) in copy::services_rows(domains_title) {
        rows.push(vec![
            TableCell::text(RichText::bold(service)),
            TableCell::text(RichText::parse(&details)),
        ]);
    }
    Table {
        column_fractions: SERVICE_COLUMNS.to_vec(),
        padding: CellPadding {
            top: 10.0,
            right: 5.0,
            bottom: 10.0,
            left: 8.0,
        },
        header_rows: 1,
        rows,
        border_width: 1.0,
    }
}

/// The career prescription table: one row per role record, the domain
/// label printed once per group and spanning the group's rows.
pub fn career_table(assembly: &TableAssembly, catalog: &DomainCatalog) -> Table {
    let mut rows = vec![header_row(&copy::CAREER_HEADER)];
    let mut last_domain: Option<&str> = None;
    for record in &assembly.rows {
        let domain_cell = if last_domain == Some(record.domain_label.as_str()) {
            TableCell::Covered
        } else {
            last_domain = Some(&record.domain_label);
            TableCell::spanning(
                RichText::bold(catalog.display_name(&record.domain_label)),
                assembly.span(&record.domain_label),
            )
        };
        rows.push(vec![
            domain_cell,
            TableCell::text(RichText::plain(&record.role_title)),
            TableCell::text(RichText::plain(&record.challenge)),
            TableCell::text(RichText::plain(&record.skills)),
            TableCell::text(RichText::plain(&record.companies)),
        ]);
    }
    Table {
        column_fractions: CAREER_COLUMNS.to_vec(),
        padding: CellPadding {
            top: 8.0,
            right: 6.0,
            bottom: 8.0,
            left: 6.0,
        },
        header_rows: 1,
        rows,
        border_width: 1.0,
    }
}

/// Mutable state while composing: the finished pages, the page being
/// filled, and its cursor.
struct PageComposer<'a> {
    options: &'a RenderOptions,
    header: Option<Arc<LoadedImage>>,
    fonts: FontContext,
    text: TextLayout,
    pages: Vec<LayoutPage>,
    cursor: LayoutCursor,
    page_top: f64,
}

impl<'a> PageComposer<'a> {
    fn new(options: &'a RenderOptions, header: Option<Arc<LoadedImage>>) -> Self {
        let geometry = options.geometry;
        let mut composer = Self {
            options,
            header,
            fonts: FontContext::new(),
            text: TextLayout::new(),
            pages: Vec::new(),
            cursor: LayoutCursor::at(geometry, geometry.height),
            page_top: geometry.height,
        };
        composer.open_page(true);
        composer
    }

    /// Start a new page with its border and, optionally, the header.
    fn open_page(&mut self, with_header: bool) {
        let geometry = self.options.geometry;
        self.pages.push(LayoutPage {
            width: geometry.width,
            height: geometry.height,
            elements: Vec::new(),
        });
        self.draw_border();
        let reserved = if with_header { self.draw_header() } else { 0.0 };
        self.cursor = LayoutCursor::new(geometry, reserved, HEADER_CLEARANCE)
            .with_spacing(self.options.spacing);
        self.page_top = self.cursor.y();
        debug!(page = self.pages.len(), top = self.page_top, "opened page");
    }

    fn finish(self) -> Vec<LayoutPage> {
        self.pages
    }

    fn push(&mut self, element: LayoutElement) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn fresh_page(&self) -> bool {
        self.cursor.y() >= self.page_top
    }

    fn draw_border(&mut self) {
        let g = self.options.geometry;
        let inset = g.margins.page_border;
        self.push(LayoutElement {
            x: inset,
            y: inset,
            width: g.width - 2.0 * inset,
            height: g.height - 2.0 * inset,
            draw: DrawCommand::Rect {
                fill: None,
                stroke: Some(Color::BLACK),
                line_width: 2.0,
            },
        });
    }

    /// Draw the header image and its rule. Returns the reserved height.
    fn draw_header(&mut self) -> f64 {
        let g = self.options.geometry;
        let Some(image) = self.header.clone() else {
            self.push(text_line_element(
                copy::HEADER_MISSING,
                StandardFont::TimesBold,
                12.0,
                g.left(),
                g.height - 50.0,
                Color::RED,
            ));
            return HEADER_FALLBACK_RESERVE;
        };

        let aspect = image.aspect_ratio();
        let mut height = HEADER_HEIGHT;
        let mut width = height * aspect;
        if width > g.width {
            width = g.width;
            height = width / aspect;
        }
        let x = (g.width - width) / 2.0;
        let y = g.height - height - HEADER_TOP;
        self.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Image { image },
        });
        self.push(rule_element(g.left(), g.right(), y - 5.0, 1.0));
        height + HEADER_RESERVE
    }

    /// Apply the overflow policy to an unbreakable block of height `h`.
    fn make_room(&mut self, h: f64) {
        let decision = decide_break(
            self.options.overflow,
            self.cursor.remaining_height(),
            &[h],
            false,
            self.fresh_page(),
        );
        match decision {
            BreakDecision::MoveToNextPage => self.open_page(true),
            BreakDecision::Overflow => self.warn_overflow(h),
            BreakDecision::Place | BreakDecision::Split { .. } => {}
        }
    }

    fn warn_overflow(&self, h: f64) {
        warn!(
            page = self.pages.len(),
            y = self.cursor.y(),
            height = h,
            "block runs past the bottom margin"
        );
    }

    fn advance(&mut self, gap: Gap) -> Result<(), LayoutError> {
        self.cursor.advance(gap).map(|_| ())
    }

    fn paragraph(
        &mut self,
        text: &RichText,
        style: ParagraphStyle,
        gap: Gap,
    ) -> Result<(), LayoutError> {
        let width = self.cursor.available_width();
        let paragraph = self.text.layout_paragraph(&self.fonts, text, width, style);
        let h = paragraph.height();
        self.make_room(h);
        if !paragraph.lines.is_empty() {
            let element =
                paragraph_element(&paragraph, self.cursor.left(), self.cursor.y(), Color::BLACK);
            self.push(element);
        }
        self.cursor.place(h, gap)?;
        Ok(())
    }

    fn heading(&mut self, text: &str) -> Result<(), LayoutError> {
        self.paragraph(&RichText::bold(text), ParagraphStyle::body(), Gap::Heading)
    }

    fn body(&mut self, text: &RichText, gap: Gap) -> Result<(), LayoutError> {
        self.paragraph(text, ParagraphStyle::body(), gap)
    }

    fn bullet(&mut self, text: &RichText, gap: Gap) -> Result<(), LayoutError> {
        let text = text.clone().prefixed(copy::BULLET_PREFIX);
        self.paragraph(&text, ParagraphStyle::bullet(), gap)
    }

    /// "Label : value" row. The row is as tall as the wrapped value, and at
    /// least one line.
    fn labeled_row(&mut self, label: &str, value: &RichText) -> Result<(), LayoutError> {
        let left = self.cursor.left();
        let value_x = left + LABEL_VALUE_OFFSET;
        let width = self.cursor.right() - value_x;
        let style = ParagraphStyle::body();
        let paragraph = self.text.layout_paragraph(&self.fonts, value, width, style);
        // An empty value still occupies one line so labels never collide.
        let h = paragraph.height().max(style.leading);
        self.make_room(h);

        let top = self.cursor.y();
        let baseline = top - LABEL_BASELINE;
        let font = StandardFont::TimesBold;
        self.push(text_line_element(label, font, style.font_size, left, baseline, Color::BLACK));
        self.push(text_line_element(
            ":",
            font,
            style.font_size,
            left + LABEL_COLON_OFFSET,
            baseline,
            Color::BLACK,
        ));
        if !paragraph.lines.is_empty() {
            self.push(paragraph_element(&paragraph, value_x, top, Color::BLACK));
        }
        self.cursor.place(h, Gap::TableRow)?;
        Ok(())
    }

    /// A heading followed by its table. Under `NewPage` the heading moves
    /// with the table's header row and first row group, so it is never
    /// left alone at the bottom of a page.
    fn headed_table(&mut self, heading: &str, table: &Table, gap: Gap) -> Result<(), LayoutError> {
        if self.options.overflow == OverflowPolicy::NewPage && !self.fresh_page() {
            let width = self.cursor.available_width();
            let title = self.text.layout_paragraph(
                &self.fonts,
                &RichText::bold(heading),
                width,
                ParagraphStyle::body(),
            );
            let measured = table.measure(width, &self.fonts);
            let first_group = measured
                .row_groups()
                .first()
                .map(|g| measured.rows_height(g.clone()))
                .unwrap_or(0.0);
            let needed = title.height()
                + self.cursor.spacing().resolve(Gap::Heading)
                + measured.header_height()
                + first_group;
            if !self.cursor.fits(needed) {
                debug!(needed, "heading moves with its table to the next page");
                self.open_page(true);
            }
        }
        self.heading(heading)?;
        self.table(table, gap)
    }

    /// Place a table, splitting between row groups when the policy allows.
    fn table(&mut self, table: &Table, gap: Gap) -> Result<(), LayoutError> {
        let measured = table.measure(self.cursor.available_width(), &self.fonts);
        let groups = measured.row_groups();
        let mut remaining = &groups[..];

        loop {
            let heights: Vec<f64> = remaining
                .iter()
                .map(|g| measured.rows_height(g.clone()))
                .collect();
            let room = self.cursor.remaining_height() - measured.header_height();
            let decision = decide_break(
                self.options.overflow,
                room,
                &heights,
                true,
                self.fresh_page(),
            );
            let take = match decision {
                BreakDecision::Place => remaining.len(),
                BreakDecision::Overflow => {
                    self.warn_overflow(measured.header_height() + heights.iter().sum::<f64>());
                    remaining.len()
                }
                BreakDecision::MoveToNextPage => {
                    self.open_page(true);
                    continue;
                }
                BreakDecision::Split {
                    items_on_current_page,
                } => items_on_current_page.min(remaining.len()),
            };

            let body = match take {
                0 => measured.header_rows..measured.header_rows,
                n => remaining[0].start..remaining[n - 1].end,
            };
            let (elements, h) = measured.render(self.cursor.left(), self.cursor.y(), body);
            for element in elements {
                self.push(element);
            }
            remaining = &remaining[take..];

            if remaining.is_empty() {
                self.cursor.place(h, gap)?;
                return Ok(());
            }
            self.cursor.place(h, Gap::None)?;
            debug!(rows_left = remaining.len(), "table continues on next page");
            self.open_page(true);
        }
    }

    /// The fixed-height closing box. The only block guarded against the
    /// bottom margin under the default policy.
    fn reveal_box(&mut self, text: &str) -> Result<(), LayoutError> {
        if self.options.overflow == OverflowPolicy::NewPage
            && !self.cursor.fits(REVEAL_BOX_HEIGHT)
            && !self.fresh_page()
        {
            self.open_page(true);
        }
        if self.cursor.guard_fixed_box(REVEAL_BOX_HEIGHT, REVEAL_BOX_CLEARANCE) {
            debug!(y = self.cursor.y(), "reveal box lifted above bottom margin");
        }

        let left = self.cursor.left();
        let width = self.cursor.available_width();
        let top = self.cursor.y();
        self.push(LayoutElement {
            x: left,
            y: top - REVEAL_BOX_HEIGHT,
            width,
            height: REVEAL_BOX_HEIGHT,
            draw: DrawCommand::Rect {
                fill: None,
                stroke: Some(Color::BLACK),
                line_width: 1.0,
            },
        });

        let font = StandardFont::TimesBold;
        let size = ParagraphStyle::body().font_size;
        let text_width = self.fonts.measure_string(text, font, size);
        self.push(text_line_element(
            text,
            font,
            size,
            left + (width - text_width) / 2.0,
            top - REVEAL_BOX_HEIGHT / 2.0 - 4.0,
            Color::BLACK,
        ));
        self.cursor.place(REVEAL_BOX_HEIGHT, Gap::None)?;
        Ok(())
    }
}
