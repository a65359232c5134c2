//! PDF fixtures for unit tests.

use crate::pdf::PdfDocument;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};

/// Build a PDF with one page per label, each page showing its label as text.
///
/// `MediaBox` lives on the page tree root so pages inherit it.
pub fn labeled_pdf(labels: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
    )]));

    let mut kids = Vec::new();
    for label in labels {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*label)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Reference(resources_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            ),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Like [`labeled_pdf`], but the page tree root's `Kids` array is its own object
pub fn labeled_pdf_with_indirect_kids(labels: &[&str]) -> Vec<u8> {
    let mut doc = Document::load_mem(&labeled_pdf(labels)).unwrap();
    let pages_id = doc
        .catalog()
        .unwrap()
        .get(b"Pages")
        .and_then(Object::as_reference)
        .unwrap();

    let kids = doc
        .get_dictionary(pages_id)
        .unwrap()
        .get(b"Kids")
        .unwrap()
        .clone();
    let kids_id = doc.add_object(kids);
    doc.get_dictionary_mut(pages_id)
        .unwrap()
        .set("Kids", Object::Reference(kids_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// The label drawn on the page at `index`, or `None` for a page without content
pub fn page_label(doc: &PdfDocument, index: usize) -> Option<String> {
    let page_id = *doc.page_ids().get(index)?;
    let contents = doc.doc.get_dictionary(page_id).ok()?.get(b"Contents").ok()?;
    let stream = doc.doc.get_object(contents.as_reference().ok()?).ok()?.as_stream().ok()?;
    let content = Content::decode(&stream.content).ok()?;

    content
        .operations
        .iter()
        .find(|op| op.operator == "Tj")
        .and_then(|op| op.operands.first())
        .and_then(|operand| match operand {
            Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
}

/// Labels of every page in order; blank pages show up as `None`
pub fn labels(doc: &PdfDocument) -> Vec<Option<String>> {
    (0..doc.page_count()).map(|i| page_label(doc, i)).collect()
}
