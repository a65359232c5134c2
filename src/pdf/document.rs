use crate::error::{Error, Result};
use crate::pdf::copy::{rewrite_references, PageCopy};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;

/// A4 portrait, used for blank pages when nothing better is known
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 595.28, 841.89];

/// Page attributes a page may inherit from its ancestors in the page tree
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

// Guards against cyclic Parent chains
const MAX_TREE_DEPTH: usize = 64;

pub struct PdfDocument {
    pub doc: Document,
    pub name: String,
    /// Target IDs already assigned to copied objects, per copy batch
    imported: BTreeMap<u64, BTreeMap<ObjectId, ObjectId>>,
}

impl PdfDocument {
    /// Parse a document from an in-memory buffer
    pub fn load_mem(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        match Document::load_mem(bytes) {
            Ok(doc) => Ok(PdfDocument {
                doc,
                name,
                imported: BTreeMap::new(),
            }),
            Err(source) => Err(Error::Parse { name, source }),
        }
    }

    /// Create an empty document with a catalog and an empty page tree
    pub fn create(name: impl Into<String>) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(vec![])),
                ("Count", Object::Integer(0)),
            ])),
        );
        let catalog_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        PdfDocument {
            doc,
            name: name.into(),
            imported: BTreeMap::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page object IDs in zero-based page order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        // get_pages() is keyed by 1-based page number, so values are in order
        self.doc.get_pages().into_values().collect()
    }

    /// Append an empty page at the end of the document.
    ///
    /// The page takes the size of the current last page, falling back to A4.
    pub fn append_blank_page(&mut self) -> Result<ObjectId> {
        let pages_id = self.root_pages_id()?;

        let media_box = self
            .page_ids()
            .last()
            .and_then(|&last| inherited_attribute(&self.doc, last, b"MediaBox"))
            .map(|obj| resolve(&self.doc, obj).clone())
            .filter(|obj| matches!(obj, Object::Array(items) if items.len() == 4))
            .unwrap_or_else(|| {
                Object::Array(DEFAULT_MEDIA_BOX.iter().map(|&v| v.into()).collect())
            });

        let page_id = self.doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("MediaBox", media_box),
            ("Resources", Object::Dictionary(Dictionary::new())),
        ]));
        self.attach_page(pages_id, page_id)?;

        Ok(page_id)
    }

    /// Bind a detached page copy to this document and append it as the last page.
    ///
    /// Objects shared with pages bound earlier from the same copy batch keep
    /// the ID they got then; everything else gets a fresh ID. References that
    /// point outside the copy become `null`.
    pub fn add_page(&mut self, copy: PageCopy) -> Result<ObjectId> {
        let pages_id = self.root_pages_id()?;

        let imported = self.imported.entry(copy.batch_id()).or_default();
        let mut fresh = Vec::new();
        for old_id in copy.reachable_ids() {
            // The page itself is always new, even if bound before
            if old_id == copy.root || !imported.contains_key(&old_id) {
                imported.insert(old_id, self.doc.new_object_id());
                fresh.push(old_id);
            }
        }

        for old_id in fresh {
            if let Some(object) = copy.object(old_id) {
                let mut object = object.clone();
                rewrite_references(&mut object, imported);
                self.doc.objects.insert(imported[&old_id], object);
            }
        }

        let page_id = imported[&copy.root];
        self.doc
            .get_dictionary_mut(page_id)
            .map_err(|e| Error::Malformed(format!("copied page is not a dictionary: {}", e)))?
            .set("Parent", Object::Reference(pages_id));
        self.attach_page(pages_id, page_id)?;

        Ok(page_id)
    }

    /// Serialize the document to a byte buffer
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        if let Err(e) = self.doc.save_to(&mut buffer) {
            return Err(Error::Serialize {
                name: self.name.clone(),
                source: e.into(),
            });
        }
        Ok(buffer)
    }

    fn root_pages_id(&self) -> Result<ObjectId> {
        let catalog = self
            .doc
            .catalog()
            .map_err(|e| Error::Malformed(format!("{}: no catalog: {}", self.name, e)))?;
        catalog
            .get(b"Pages")
            .and_then(Object::as_reference)
            .map_err(|e| Error::Malformed(format!("{}: no page tree: {}", self.name, e)))
    }

    fn attach_page(&mut self, pages_id: ObjectId, page_id: ObjectId) -> Result<()> {
        // Kids may be inline or an indirect reference to an array
        let kids_id = match self
            .doc
            .get_dictionary(pages_id)
            .and_then(|pages| pages.get(b"Kids"))
        {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(Object::Array(_)) => None,
            _ => {
                return Err(Error::Malformed(format!(
                    "{}: page tree root has no Kids array",
                    self.name
                )))
            }
        };

        let kids = match kids_id {
            Some(id) => self.doc.get_object_mut(id),
            None => self
                .doc
                .get_dictionary_mut(pages_id)
                .and_then(|pages| pages.get_mut(b"Kids")),
        };
        match kids {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
            _ => {
                return Err(Error::Malformed(format!(
                    "{}: page tree Kids is not an array",
                    self.name
                )))
            }
        }

        let pages = self
            .doc
            .get_dictionary_mut(pages_id)
            .map_err(|e| Error::Malformed(format!("page tree root: {}", e)))?;
        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages.set("Count", Object::Integer(count + 1));

        Ok(())
    }
}

/// Look up `key` on a page, walking up the page tree for inheritable attributes
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Follow a chain of indirect references to the object they name
fn resolve<'a>(doc: &'a Document, mut object: &'a Object) -> &'a Object {
    for _ in 0..MAX_TREE_DEPTH {
        match object {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(target) => object = target,
                Err(_) => break,
            },
            _ => break,
        }
    }
    object
}
