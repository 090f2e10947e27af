use anyhow::{Context, Result};
use lopdf::{Dictionary, Document, Object};
use std::collections::BTreeSet;

pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    /// Parse a PDF held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).context("Failed to parse PDF")?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Copy the given 1-indexed pages into a new document, keeping their
    /// original order. Any existing outline is dropped.
    pub fn retain_pages(&self, pages: &[u32]) -> Result<Document> {
        let mut new_doc = self.doc.clone();
        let total = self.page_count();

        for &page in pages {
            if page == 0 || page > total {
                anyhow::bail!("Page {} is out of range (1-{})", page, total);
            }
        }

        catalog_mut(&mut new_doc)?.remove(b"Outlines");

        let keep: BTreeSet<u32> = pages.iter().copied().collect();
        let pages_to_delete: Vec<u32> = (1..=total).filter(|num| !keep.contains(num)).collect();
        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
        }

        Ok(new_doc)
    }

    /// Serialize a document to bytes, dropping objects nothing refers to.
    pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
        doc.prune_objects();
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).context("Failed to serialize PDF")?;
        Ok(buffer)
    }
}

pub fn catalog_mut(doc: &mut Document) -> Result<&mut Dictionary> {
    let root_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .context("Document trailer has no catalog")?;
    doc.get_dictionary_mut(root_id)
        .context("Failed to get document catalog")
}
