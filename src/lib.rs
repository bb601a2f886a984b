//! # careerdoc
//!
//! Generates a three-page career prescription PDF from a candidate's name,
//! status, chosen career domains and a block of model-written text.
//!
//! Two pieces carry the document's structure. The **domain table builder**
//! turns the selected domains into the rows of the career table and the
//! number of rows each domain spans. The **layout cursor** walks each page
//! from below the header towards the bottom margin, placing measured blocks
//! one after another. Everything else (text measurement, tables, the PDF
//! writer) exists to feed those two.
//!
//! ## Architecture
//!
//! ```text
//! PrescriptionRequest (JSON)
//!       ↓
//!   [model]      : request, AI content, domain catalog
//!       ↓
//!   [table]      : selection → rows + span map
//!       ↓
//!   [richtext]   : <b> markup → bold/plain segments
//!   [text]       : line breaking with Times metrics
//!       ↓
//!   [layout]     : cursor-driven page composition
//!       ↓
//!   [pdf]        : serialize to PDF bytes
//!       ↓
//!   [template]   : stock page drawn under the last page
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod prompt;
pub mod richtext;
pub mod table;
pub mod telemetry;
pub mod template;
pub mod text;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

pub use error::CareerDocError;

use image_loader::LoadedImage;
use layout::{LayoutEngine, PrescriptionDocument, RenderOptions};
use model::{DomainCatalog, PrescriptionRequest};
use pdf::{Metadata, PdfWriter};
use table::DomainValidation;
use template::PageTemplate;

/// Shared, read-only inputs for rendering: the catalog, the header image,
/// the page template and the policies chosen by configuration.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub catalog: &'a DomainCatalog,
    pub header: Option<Arc<LoadedImage>>,
    pub template: Option<Arc<PageTemplate>>,
    pub validation: DomainValidation,
    pub options: RenderOptions,
}

impl<'a> RenderContext<'a> {
    pub fn new(catalog: &'a DomainCatalog) -> Self {
        Self {
            catalog,
            header: None,
            template: None,
            validation: DomainValidation::default(),
            options: RenderOptions::default(),
        }
    }

    pub fn with_header(mut self, header: Option<Arc<LoadedImage>>) -> Self {
        self.header = header;
        self
    }

    pub fn with_template(mut self, template: Option<Arc<PageTemplate>>) -> Self {
        self.template = template;
        self
    }

    pub fn with_validation(mut self, validation: DomainValidation) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Context as configured: header loaded from disk, validation and
    /// overflow policies from the environment.
    pub fn from_config(config: &config::AppConfig, catalog: &'a DomainCatalog) -> Self {
        Self::new(catalog)
            .with_header(load_header(&config.header_image))
            .with_template(load_template(&config.template_path))
            .with_validation(config.domain_validation)
            .with_options(RenderOptions {
                overflow: config.overflow,
                ..RenderOptions::default()
            })
    }
}

/// Load the header image. A missing or unreadable header is not fatal: the
/// pages carry an error line in its place.
pub fn load_header(path: &Path) -> Option<Arc<LoadedImage>> {
    match image_loader::load_image_file(path) {
        Ok(image) => {
            debug!(path = %path.display(), width = image.width_px, height = image.height_px, "loaded header image");
            Some(Arc::new(image))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "header image unavailable");
            None
        }
    }
}

/// Load the page template. Without one the last page is border only.
pub fn load_template(path: &Path) -> Option<Arc<PageTemplate>> {
    match PageTemplate::load(path) {
        Ok(template) => {
            debug!(path = %path.display(), pages = template.page_count(), "loaded page template");
            Some(Arc::new(template))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "page template unavailable, last page is border only");
            None
        }
    }
}

/// The built-in catalog, or the one at `path`.
pub fn load_catalog(path: Option<&Path>) -> Result<DomainCatalog, CareerDocError> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            DomainCatalog::from_json(&json)
        }
        None => DomainCatalog::builtin(),
    }
}

/// Render a prescription to PDF bytes.
///
/// This is the primary entry point: validate the request, build the career
/// table, lay out the pages, serialize them and draw the page template
/// under the last page when one is configured.
pub fn render(
    request: &PrescriptionRequest,
    ctx: &RenderContext,
) -> Result<Vec<u8>, CareerDocError> {
    request.validate()?;
    request.ai_content.ensure_generated()?;
    let assembly = table::build_checked(&request.domains, ctx.catalog, ctx.validation)?;
    let content = request.resolved_ai_content();

    let doc = PrescriptionDocument {
        name: &request.name,
        status: request.status,
        content: &content,
        table: &assembly,
        catalog: ctx.catalog,
        header: ctx.header.clone(),
    };
    let pages = LayoutEngine::new(ctx.options).layout(&doc)?;

    let metadata = Metadata {
        title: Some(format!("Career Prescription - {}", request.name)),
        author: Some("Analytics Avenue".to_string()),
        subject: Some(richtext::RichText::parse(&content.domains_title).plain_text()),
        creator: Some("careerdoc".to_string()),
    };
    let pdf = PdfWriter::new().write(&pages, &metadata);

    let Some(template) = &ctx.template else {
        return Ok(pdf);
    };
    match template.underlay(&pdf, pages.len() as u32) {
        Ok(merged) => Ok(merged),
        Err(e) => {
            warn!(error = %e, "page template could not be applied, last page is border only");
            Ok(pdf)
        }
    }
}

/// Render a prescription request given as JSON.
pub fn render_json(json: &str, ctx: &RenderContext) -> Result<Vec<u8>, CareerDocError> {
    let request = PrescriptionRequest::from_json(json)?;
    render(&request, ctx)
}
