use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::outline::{write_outline, OutlineEntry};
use super::ranges::{resolve_ranges, PageRange};
use super::PdfDocument;
use crate::selection::SelectionSet;

/// A new PDF holding only the pages of the selected bookmarks.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub bytes: Vec<u8>,
    pub page_count: u32,
    /// Rebuilt outline with pages renumbered for the new document. Levels are
    /// the original ones even where the written tree had to flatten them.
    pub outline: Vec<OutlineEntry>,
}

/// Copy the pages owned by the selected bookmarks into a new document.
///
/// Returns `Ok(None)` when there is nothing to extract: no selected index
/// addresses an entry, no selected entry matches a resolved range, or every
/// matched range lies outside the document. Only a source that cannot be
/// parsed or a result that cannot be written is an error.
pub fn extract_by_selection(
    bytes: &[u8],
    entries: &[OutlineEntry],
    selection: &SelectionSet,
) -> Result<Option<Extraction>> {
    let mut selected: Vec<&OutlineEntry> = selection
        .valid_indices(entries.len())
        .map(|i| &entries[i])
        .collect();
    if selected.is_empty() {
        debug!("No selected index addresses a bookmark");
        return Ok(None);
    }
    selected.sort_by_key(|entry| entry.start_page);

    let source = PdfDocument::from_bytes(bytes)?;
    let total_pages = source.page_count();
    let ranges = resolve_ranges(entries, total_pages);

    // First range wins when several entries look identical
    let mut by_key: HashMap<(u32, &str, u32), &PageRange> = HashMap::new();
    for range in &ranges {
        let entry = range.entry;
        by_key
            .entry((entry.level, entry.title.as_str(), entry.start_page))
            .or_insert(range);
    }

    let matched: Vec<&PageRange> = selected
        .iter()
        .filter_map(|entry| {
            let found = by_key
                .get(&(entry.level, entry.title.as_str(), entry.start_page))
                .copied();
            if found.is_none() {
                debug!("Bookmark {:?} has no resolved range", entry.title);
            }
            found
        })
        .collect();
    if matched.is_empty() {
        return Ok(None);
    }

    let (included, page_map) = collect_pages(&matched, total_pages);
    if included.is_empty() {
        debug!("Selected bookmarks cover no pages of the document");
        return Ok(None);
    }

    let outline: Vec<OutlineEntry> = matched
        .iter()
        .map(|range| {
            let start_page = page_map.get(&range.start).copied().unwrap_or(1);
            OutlineEntry::new(range.entry.level, range.entry.title.clone(), start_page)
        })
        .collect();

    let keep: Vec<u32> = included.iter().map(|&p| p as u32 + 1).collect();
    let mut new_doc = source.retain_pages(&keep)?;
    write_outline(&mut new_doc, &outline)?;
    let bytes = PdfDocument::to_bytes(&mut new_doc)?;

    Ok(Some(Extraction {
        bytes,
        page_count: included.len() as u32,
        outline,
    }))
}

/// Walk the ranges in order and collect each page once, skipping pages the
/// document does not have. Returns the 0-based pages in output order and the
/// map from original 0-based page to new 1-based page.
fn collect_pages(ranges: &[&PageRange], total_pages: u32) -> (Vec<i64>, BTreeMap<i64, u32>) {
    let mut included = Vec::new();
    let mut page_map = BTreeMap::new();

    for range in ranges {
        for page in range.start..=range.end {
            if page < 0 || page >= i64::from(total_pages) {
                debug!("Skipping page {} outside the document", page + 1);
                continue;
            }
            if page_map.contains_key(&page) {
                continue;
            }
            included.push(page);
            page_map.insert(page, included.len() as u32);
        }
    }

    (included, page_map)
}
