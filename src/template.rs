//! # Page Template
//!
//! The last page of a prescription is a stock page taken from a template
//! PDF (its third page). The generated page keeps its border; the template
//! page is imported as a form XObject and drawn underneath it.
//!
//! Importing copies every object the template page's resources reach into
//! the generated document under fresh ids, so nothing from the template's
//! own page tree comes along.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

use crate::layout::cursor::{A4_HEIGHT, A4_WIDTH};

/// 1-based page of the template that is imported.
pub const TEMPLATE_PAGE: u32 = 3;

/// Resource name of the imported page inside the target page.
const FORM_NAME: &str = "Tpl0";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unreadable PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("page {wanted} requested but the document has {available} pages")]
    MissingPage { wanted: u32, available: usize },
}

/// A loaded template document and the id of its third page.
pub struct PageTemplate {
    doc: Document,
    page_id: ObjectId,
    page_count: usize,
}

impl fmt::Debug for PageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageTemplate")
            .field("page_id", &self.page_id)
            .field("page_count", &self.page_count)
            .finish()
    }
}

impl PageTemplate {
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        Self::from_document(Document::load(path)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TemplateError> {
        Self::from_document(Document::load_mem(bytes)?)
    }

    fn from_document(doc: Document) -> Result<Self, TemplateError> {
        let pages = doc.get_pages();
        let page_id = *pages
            .get(&TEMPLATE_PAGE)
            .ok_or(TemplateError::MissingPage {
                wanted: TEMPLATE_PAGE,
                available: pages.len(),
            })?;
        Ok(Self {
            doc,
            page_id,
            page_count: pages.len(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Draw the template page underneath page `target` (1-based) of `pdf`
    /// and return the rewritten file.
    pub fn underlay(&self, pdf: &[u8], target: u32) -> Result<Vec<u8>, TemplateError> {
        let mut doc = Document::load_mem(pdf)?;
        let pages = doc.get_pages();
        let target_id = *pages.get(&target).ok_or(TemplateError::MissingPage {
            wanted: target,
            available: pages.len(),
        })?;

        let content = self.doc.get_page_content(self.page_id)?;
        let mut importer = Importer::new(&self.doc);
        let resources = match inherited(&self.doc, self.page_id, b"Resources") {
            Some(resources) => importer.import(&mut doc, &resources),
            None => Object::Dictionary(Dictionary::new()),
        };
        let bbox = match inherited(&self.doc, self.page_id, b"MediaBox") {
            Some(media_box) => importer.import(&mut doc, &media_box),
            None => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(A4_WIDTH as f32),
                Object::Real(A4_HEIGHT as f32),
            ]),
        };

        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => bbox,
                "Resources" => resources,
            },
            content,
        );
        let form_id = doc.add_object(form);
        let draw = format!("q\n/{} Do\nQ\n", FORM_NAME).into_bytes();
        let draw_id = doc.add_object(Stream::new(Dictionary::new(), draw));

        let page = doc.get_object_mut(target_id)?.as_dict_mut()?;
        let mut contents = vec![Object::Reference(draw_id)];
        match page.get(b"Contents") {
            Ok(Object::Array(items)) => contents.extend(items.iter().cloned()),
            Ok(other) => contents.push(other.clone()),
            Err(_) => {}
        }
        page.set("Contents", contents);

        let resources = page.get_mut(b"Resources")?.as_dict_mut()?;
        if !resources.has(b"XObject") {
            resources.set("XObject", Dictionary::new());
        }
        resources
            .get_mut(b"XObject")?
            .as_dict_mut()?
            .set(FORM_NAME, Object::Reference(form_id));

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }
}

/// Look up a page attribute, following `Parent` links for inherited ones.
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Deep-copies objects from one document into another, renumbering
/// references as it goes.
struct Importer<'a> {
    src: &'a Document,
    ids: HashMap<ObjectId, ObjectId>,
}

impl<'a> Importer<'a> {
    fn new(src: &'a Document) -> Self {
        Self {
            src,
            ids: HashMap::new(),
        }
    }

    fn import(&mut self, dst: &mut Document, obj: &Object) -> Object {
        match obj {
            Object::Reference(id) => Object::Reference(self.import_reference(dst, *id)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.import(dst, item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.import_dictionary(dst, dict)),
            Object::Stream(stream) => {
                let dict = self.import_dictionary(dst, &stream.dict);
                Object::Stream(Stream::new(dict, stream.content.clone()))
            }
            other => other.clone(),
        }
    }

    fn import_dictionary(&mut self, dst: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            // Page tree links would drag the template's pages along.
            if key.as_slice() == b"Parent" {
                continue;
            }
            copy.set(key.clone(), self.import(dst, value));
        }
        copy
    }

    fn import_reference(&mut self, dst: &mut Document, id: ObjectId) -> ObjectId {
        if let Some(&mapped) = self.ids.get(&id) {
            return mapped;
        }
        dst.max_id += 1;
        let new_id = (dst.max_id, 0);
        // Registered before recursing so cycles terminate.
        self.ids.insert(id, new_id);
        let copied = match self.src.get_object(id) {
            Ok(obj) => self.import(dst, obj),
            Err(_) => Object::Null,
        };
        dst.objects.insert(new_id, copied);
        new_id
    }
}
