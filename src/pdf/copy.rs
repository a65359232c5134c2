use crate::error::{Error, Result};
use crate::pdf::document::{inherited_attribute, PdfDocument, INHERITABLE_KEYS};
use lopdf::{Object, ObjectId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_BATCH: AtomicU64 = AtomicU64::new(0);

/// A page copied out of a source document but not yet placed in a target.
///
/// Pages copied by one [`copy_pages`] call share a single snapshot of the
/// objects they reference, still keyed by their IDs in the source. Nothing
/// is shared with the source itself. [`PdfDocument::add_page`] assigns
/// target IDs and reuses them for objects already bound from the same call.
#[derive(Debug, Clone)]
pub struct PageCopy {
    pub(crate) root: ObjectId,
    batch: Arc<CopyBatch>,
}

#[derive(Debug)]
struct CopyBatch {
    id: u64,
    objects: BTreeMap<ObjectId, Object>,
}

impl PageCopy {
    /// Identifies the [`copy_pages`] call this page came from
    pub(crate) fn batch_id(&self) -> u64 {
        self.batch.id
    }

    pub(crate) fn object(&self, id: ObjectId) -> Option<&Object> {
        self.batch.objects.get(&id)
    }

    /// IDs of the snapshot objects this page needs, the page dictionary first.
    ///
    /// Other pages of the same batch are not followed.
    pub(crate) fn reachable_ids(&self) -> Vec<ObjectId> {
        let mut seen = BTreeSet::new();
        let mut reachable = Vec::new();
        let mut pending = vec![self.root];

        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(object) = self.batch.objects.get(&id) else {
                continue;
            };
            if id != self.root && matches!(object.type_name(), Ok(b"Page")) {
                continue;
            }
            collect_references(object, &mut pending);
            reachable.push(id);
        }

        reachable
    }
}

/// Copy the pages at the given zero-based indices, in the order given
pub fn copy_pages(source: &PdfDocument, indices: &[usize]) -> Result<Vec<PageCopy>> {
    let page_ids = source.page_ids();
    let mut objects = BTreeMap::new();
    let mut roots = Vec::with_capacity(indices.len());

    for &index in indices {
        let page_id = *page_ids.get(index).ok_or(Error::PageOutOfRange {
            index,
            count: page_ids.len(),
        })?;
        copy_page_into(source, page_id, &mut objects)?;
        roots.push(page_id);
    }

    let batch = Arc::new(CopyBatch {
        id: NEXT_BATCH.fetch_add(1, Ordering::Relaxed),
        objects,
    });
    Ok(roots
        .into_iter()
        .map(|root| PageCopy {
            root,
            batch: Arc::clone(&batch),
        })
        .collect())
}

fn copy_page_into(
    source: &PdfDocument,
    page_id: ObjectId,
    objects: &mut BTreeMap<ObjectId, Object>,
) -> Result<()> {
    let doc = &source.doc;
    let mut page = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::Malformed(format!("{}: page {:?}: {}", source.name, page_id, e)))?
        .clone();

    // The copy must stand on its own once detached from the source page tree
    page.remove(b"Parent");
    for key in INHERITABLE_KEYS {
        if !page.has(key) {
            if let Some(value) = inherited_attribute(doc, page_id, key) {
                page.set(key.to_vec(), value.clone());
            }
        }
    }

    let mut pending = Vec::new();
    let page = Object::Dictionary(page);
    collect_references(&page, &mut pending);
    objects.insert(page_id, page);

    while let Some(id) = pending.pop() {
        if objects.contains_key(&id) {
            continue;
        }
        let Ok(object) = doc.get_object(id) else {
            // Dangling reference; becomes null when the copy is bound
            continue;
        };
        if is_foreign_tree_node(object) {
            continue;
        }
        collect_references(object, &mut pending);
        objects.insert(id, object.clone());
    }

    Ok(())
}

/// Catalogs, page tree nodes and other pages are never pulled into a copy
fn is_foreign_tree_node(object: &Object) -> bool {
    matches!(
        object.type_name(),
        Ok(b"Catalog") | Ok(b"Pages") | Ok(b"Page")
    )
}

fn collect_references(object: &Object, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => items.iter().for_each(|item| collect_references(item, out)),
        Object::Dictionary(dict) => dict.iter().for_each(|(_, v)| collect_references(v, out)),
        Object::Stream(stream) => stream
            .dict
            .iter()
            .for_each(|(_, v)| collect_references(v, out)),
        _ => {}
    }
}

/// Rewrite every reference through `id_map`; unmapped references become `null`
pub(crate) fn rewrite_references(object: &mut Object, id_map: &BTreeMap<ObjectId, ObjectId>) {
    match object {
        Object::Reference(id) => {
            *object = match id_map.get(id) {
                Some(&new_id) => Object::Reference(new_id),
                None => Object::Null,
            };
        }
        Object::Array(items) => items
            .iter_mut()
            .for_each(|item| rewrite_references(item, id_map)),
        Object::Dictionary(dict) => dict
            .iter_mut()
            .for_each(|(_, v)| rewrite_references(v, id_map)),
        Object::Stream(stream) => stream
            .dict
            .iter_mut()
            .for_each(|(_, v)| rewrite_references(v, id_map)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{labeled_pdf, page_label};

    #[test]
    fn test_copy_preserves_index_order() {
        let source = PdfDocument::load_mem("in.pdf", &labeled_pdf(&["a", "b", "c", "d"])).unwrap();
        let copies = copy_pages(&source, &[3, 1]).unwrap();

        let mut target = PdfDocument::create("out.pdf");
        for copy in copies {
            target.add_page(copy).unwrap();
        }

        assert_eq!(target.page_count(), 2);
        assert_eq!(page_label(&target, 0).as_deref(), Some("d"));
        assert_eq!(page_label(&target, 1).as_deref(), Some("b"));
    }

    #[test]
    fn test_copy_out_of_range() {
        let source = PdfDocument::load_mem("in.pdf", &labeled_pdf(&["a", "b"])).unwrap();
        let err = copy_pages(&source, &[0, 2]).unwrap_err();
        assert!(matches!(err, Error::PageOutOfRange { index: 2, count: 2 }));
    }

    #[test]
    fn test_copy_is_detached_from_source_tree() {
        let source = PdfDocument::load_mem("in.pdf", &labeled_pdf(&["a", "b"])).unwrap();
        let copy = copy_pages(&source, &[0]).unwrap().remove(0);

        let page = copy.object(copy.root).unwrap().as_dict().unwrap();
        assert!(!page.has(b"Parent"));
        // MediaBox is inherited in the fixture and must be materialized
        assert!(page.has(b"MediaBox"));
        assert!(copy
            .reachable_ids()
            .into_iter()
            .all(|id| id == copy.root || !is_foreign_tree_node(copy.object(id).unwrap())));
    }

    #[test]
    fn test_copy_survives_source_changes() {
        let mut source = PdfDocument::load_mem("in.pdf", &labeled_pdf(&["a"])).unwrap();
        let copy = copy_pages(&source, &[0]).unwrap().remove(0);

        let page_id = source.page_ids()[0];
        source
            .doc
            .get_dictionary_mut(page_id)
            .unwrap()
            .set("Rotate", Object::Integer(90));

        assert!(!copy.object(copy.root).unwrap().as_dict().unwrap().has(b"Rotate"));
    }

    #[test]
    fn test_shared_resources_bound_once() {
        let source =
            PdfDocument::load_mem("in.pdf", &labeled_pdf(&["a", "b", "c", "d", "e", "f"])).unwrap();
        let copies = copy_pages(&source, &[0, 2, 4]).unwrap();
        assert!(copies.iter().all(|c| c.batch_id() == copies[0].batch_id()));

        let mut target = PdfDocument::create("out.pdf");
        for copy in copies {
            target.add_page(copy).unwrap();
        }

        let fonts = target
            .doc
            .objects
            .values()
            .filter(|obj| matches!(obj.type_name(), Ok(b"Font")))
            .count();
        assert_eq!(fonts, 1);
        assert_eq!(target.page_count(), 3);
        assert_eq!(page_label(&target, 2).as_deref(), Some("e"));
    }

    #[test]
    fn test_separate_calls_do_not_share() {
        let source = PdfDocument::load_mem("in.pdf", &labeled_pdf(&["a", "b"])).unwrap();
        let first = copy_pages(&source, &[0]).unwrap().remove(0);
        let second = copy_pages(&source, &[0]).unwrap().remove(0);
        assert_ne!(first.batch_id(), second.batch_id());

        let mut target = PdfDocument::create("out.pdf");
        let first_id = target.add_page(first).unwrap();
        let second_id = target.add_page(second).unwrap();

        assert_ne!(first_id, second_id);
        assert_eq!(target.page_count(), 2);
    }

    #[test]
    fn test_same_page_twice_in_one_call() {
        let source = PdfDocument::load_mem("in.pdf", &labeled_pdf(&["a", "b"])).unwrap();
        let copies = copy_pages(&source, &[1, 1]).unwrap();

        let mut target = PdfDocument::create("out.pdf");
        for copy in copies {
            target.add_page(copy).unwrap();
        }

        assert_eq!(target.page_count(), 2);
        assert_eq!(page_label(&target, 0).as_deref(), Some("b"));
        assert_eq!(page_label(&target, 1).as_deref(), Some("b"));
    }

    #[test]
    fn test_rewrite_drops_unmapped_references() {
        let mut object = Object::Array(vec![
            Object::Reference((1, 0)),
            Object::Reference((2, 0)),
            Object::Integer(7),
        ]);
        let id_map = BTreeMap::from([((1, 0), (10, 0))]);
        rewrite_references(&mut object, &id_map);

        let items = object.as_array().unwrap();
        assert!(matches!(items[0], Object::Reference((10, 0))));
        assert!(matches!(items[1], Object::Null));
        assert!(matches!(items[2], Object::Integer(7)));
    }
}
