//! In-memory PDF fixtures. Page `n` (1-based) has a MediaBox width of
//! `600 + n` so tests can tell pages apart after slicing.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::outline::{write_outline, OutlineEntry};

pub fn blank_document(num_pages: u32) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for i in 1..=num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {}", i))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (600 + i as i64).into(), 800.into()],
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => num_pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn save(doc: &mut Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub fn blank_pdf(num_pages: u32) -> Vec<u8> {
    save(&mut blank_document(num_pages))
}

pub fn pdf_with_outline(num_pages: u32, outline: &[(u32, &str, u32)]) -> Vec<u8> {
    let mut doc = blank_document(num_pages);
    write_outline(&mut doc, &entries(outline)).unwrap();
    save(&mut doc)
}

pub fn entries(outline: &[(u32, &str, u32)]) -> Vec<OutlineEntry> {
    outline
        .iter()
        .map(|&(level, title, page)| OutlineEntry::new(level, title, page))
        .collect()
}

/// MediaBox widths in page order.
pub fn page_widths(doc: &Document) -> Vec<i64> {
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_dictionary(*id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

/// 1-based page numbers in the fixture each page came from.
pub fn original_pages(doc: &Document) -> Vec<i64> {
    page_widths(doc).into_iter().map(|w| w - 600).collect()
}
