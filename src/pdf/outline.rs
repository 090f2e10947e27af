use anyhow::{Context, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::document::catalog_mut;
use super::PdfDocument;

/// One bookmark in outline traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Nesting depth, 1 for top-level bookmarks.
    pub level: u32,
    pub title: String,
    /// 1-based page the bookmark points at.
    pub start_page: u32,
}

impl OutlineEntry {
    pub fn new(level: u32, title: impl Into<String>, start_page: u32) -> Self {
        OutlineEntry {
            level,
            title: title.into(),
            start_page,
        }
    }
}

/// Read the bookmark outline of a PDF held in memory.
///
/// A document that cannot be parsed is treated the same as one without
/// bookmarks: both yield an empty list.
pub fn read_outline(bytes: &[u8]) -> Vec<OutlineEntry> {
    let result = PdfDocument::from_bytes(bytes).and_then(|pdf| read_outline_from_doc(&pdf.doc));
    match result {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not read outline: {:#}", e);
            Vec::new()
        }
    }
}

pub fn read_outline_from_doc(doc: &Document) -> Result<Vec<OutlineEntry>> {
    let catalog = doc
        .catalog()
        .with_context(|| "Failed to get document catalog")?;

    let outlines = match catalog.get(b"Outlines") {
        Ok(Object::Reference(r)) => match doc.get_dictionary(*r) {
            Ok(d) => d,
            _ => return Ok(Vec::new()),
        },
        Ok(Object::Dictionary(d)) => d,
        _ => return Ok(Vec::new()), // No outlines/bookmarks
    };

    let first_ref = match outlines.get(b"First") {
        Ok(Object::Reference(r)) => *r,
        _ => return Ok(Vec::new()),
    };

    let walker = OutlineWalker {
        doc,
        page_map: build_page_map(doc),
    };
    let mut entries = Vec::new();
    let mut visited = HashSet::new();
    walker.walk(first_ref, 1, &mut visited, &mut entries);

    Ok(entries)
}

struct OutlineWalker<'a> {
    doc: &'a Document,
    page_map: HashMap<ObjectId, u32>,
}

impl OutlineWalker<'_> {
    fn walk(
        &self,
        first_id: ObjectId,
        level: u32,
        visited: &mut HashSet<ObjectId>,
        entries: &mut Vec<OutlineEntry>,
    ) {
        let mut current_id = Some(first_id);

        while let Some(id) = current_id {
            if !visited.insert(id) {
                warn!("Outline item {:?} is linked more than once; stopping", id);
                break;
            }

            let dict = match self.doc.get_dictionary(id) {
                Ok(d) => d,
                Err(_) => break,
            };

            let title = self.title(dict);
            match self.destination_page(dict) {
                Some(start_page) => entries.push(OutlineEntry {
                    level,
                    title,
                    start_page,
                }),
                None => debug!("Skipping bookmark {:?} without a page destination", title),
            }

            if let Ok(Object::Reference(child_ref)) = dict.get(b"First") {
                self.walk(*child_ref, level + 1, visited, entries);
            }

            current_id = match dict.get(b"Next") {
                Ok(Object::Reference(r)) => Some(*r),
                _ => None,
            };
        }
    }

    fn title(&self, dict: &Dictionary) -> String {
        let obj = match dict.get(b"Title") {
            Ok(Object::Reference(r)) => self.doc.get_object(*r).ok(),
            Ok(obj) => Some(obj),
            Err(_) => None,
        };
        match obj {
            Some(Object::String(bytes, _)) => decode_text_string(bytes),
            _ => String::new(),
        }
    }

    fn destination_page(&self, dict: &Dictionary) -> Option<u32> {
        if let Ok(dest) = dict.get(b"Dest") {
            return self.resolve_destination(dest, 0);
        }

        let action = match dict.get(b"A") {
            Ok(Object::Reference(r)) => self.doc.get_dictionary(*r).ok()?,
            Ok(Object::Dictionary(d)) => d,
            _ => return None,
        };
        match action.get(b"S") {
            Ok(Object::Name(kind)) if kind == b"GoTo" => {
                self.resolve_destination(action.get(b"D").ok()?, 0)
            }
            _ => None,
        }
    }

    fn resolve_destination(&self, dest: &Object, depth: u32) -> Option<u32> {
        // Named destinations may point at other names; cap the chain.
        if depth > 8 {
            return None;
        }
        match dest {
            Object::String(name, _) | Object::Name(name) => self.resolve_named(name, depth),
            Object::Array(arr) => match arr.first() {
                Some(Object::Reference(page_ref)) => self.page_map.get(page_ref).copied(),
                _ => None,
            },
            // Named destination values may be a dictionary with a /D entry
            Object::Dictionary(d) => self.resolve_destination(d.get(b"D").ok()?, depth + 1),
            Object::Reference(r) => {
                let obj = self.doc.get_object(*r).ok()?;
                self.resolve_destination(obj, depth + 1)
            }
            _ => None,
        }
    }

    fn resolve_named(&self, name: &[u8], depth: u32) -> Option<u32> {
        let catalog = self.doc.catalog().ok()?;

        if let Ok(Object::Reference(names_ref)) = catalog.get(b"Names") {
            if let Ok(names_dict) = self.doc.get_dictionary(*names_ref) {
                if let Ok(Object::Reference(dests_ref)) = names_dict.get(b"Dests") {
                    let mut seen = HashSet::new();
                    if let Some(dest) = self.search_name_tree(*dests_ref, name, &mut seen) {
                        return self.resolve_destination(dest, depth + 1);
                    }
                }
            }
        }

        // Older documents keep a plain /Dests dictionary in the catalog
        if let Ok(Object::Reference(dests_ref)) = catalog.get(b"Dests") {
            if let Ok(dests_dict) = self.doc.get_dictionary(*dests_ref) {
                if let Ok(dest) = dests_dict.get(name) {
                    return self.resolve_destination(dest, depth + 1);
                }
            }
        }

        None
    }

    fn search_name_tree(
        &self,
        node_id: ObjectId,
        name: &[u8],
        seen: &mut HashSet<ObjectId>,
    ) -> Option<&Object> {
        if !seen.insert(node_id) {
            return None;
        }
        let dict = self.doc.get_dictionary(node_id).ok()?;

        if let Ok(Object::Array(names)) = dict.get(b"Names") {
            for pair in names.chunks_exact(2) {
                if let Object::String(key, _) = &pair[0] {
                    if key == name {
                        return Some(&pair[1]);
                    }
                }
            }
        }

        if let Ok(Object::Array(kids)) = dict.get(b"Kids") {
            for kid in kids {
                if let Object::Reference(kid_ref) = kid {
                    if let Some(dest) = self.search_name_tree(*kid_ref, name, seen) {
                        return Some(dest);
                    }
                }
            }
        }

        None
    }
}

fn build_page_map(doc: &Document) -> HashMap<ObjectId, u32> {
    doc.get_pages()
        .into_iter()
        .map(|(num, id)| (id, num))
        .collect()
}

/// Replace the document's outline with `entries`.
///
/// Each entry nests under the closest preceding entry with a lower level, so
/// a selection that skips a parent still produces a well-formed tree. Entries
/// pointing past the last page are left out.
pub fn write_outline(doc: &mut Document, entries: &[OutlineEntry]) -> Result<Option<ObjectId>> {
    let pages = doc.get_pages();
    let items: Vec<(&OutlineEntry, ObjectId)> = entries
        .iter()
        .filter_map(|entry| match pages.get(&entry.start_page) {
            Some(page_id) => Some((entry, *page_id)),
            None => {
                warn!(
                    "Bookmark {:?} points at missing page {}",
                    entry.title, entry.start_page
                );
                None
            }
        })
        .collect();

    if items.is_empty() {
        let catalog = catalog_mut(doc)?;
        catalog.remove(b"Outlines");
        return Ok(None);
    }

    // parents[i] is the index of the item that i nests under
    let mut parents: Vec<Option<usize>> = Vec::with_capacity(items.len());
    let mut stack: Vec<usize> = Vec::new();
    for (i, (entry, _)) in items.iter().enumerate() {
        while let Some(&top) = stack.last() {
            if items[top].0.level >= entry.level {
                stack.pop();
            } else {
                break;
            }
        }
        parents.push(stack.last().copied());
        stack.push(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut roots = Vec::new();
    for (i, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    // Children always follow their parent, so a reverse pass sees them first
    let mut descendants = vec![0i64; items.len()];
    for i in (0..items.len()).rev() {
        let count: i64 = children[i].iter().map(|&c| 1 + descendants[c]).sum();
        descendants[i] = count;
    }

    let outlines_id = doc.new_object_id();
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (i, (entry, page_id)) in items.iter().enumerate() {
        let parent_id = parents[i].map(|p| ids[p]).unwrap_or(outlines_id);
        let siblings = match parents[i] {
            Some(p) => &children[p],
            None => &roots,
        };
        let pos = siblings.iter().position(|&s| s == i).unwrap_or(0);

        let mut node = dictionary! {
            "Title" => encode_text_string(&entry.title),
            "Parent" => parent_id,
            "Dest" => vec![Object::Reference(*page_id), "Fit".into()],
        };
        if pos > 0 {
            node.set("Prev", ids[siblings[pos - 1]]);
        }
        if let Some(&next) = siblings.get(pos + 1) {
            node.set("Next", ids[next]);
        }
        if let (Some(&first), Some(&last)) = (children[i].first(), children[i].last()) {
            node.set("First", ids[first]);
            node.set("Last", ids[last]);
            node.set("Count", descendants[i]);
        }
        doc.objects.insert(ids[i], Object::Dictionary(node));
    }

    let root = dictionary! {
        "Type" => "Outlines",
        "First" => ids[roots[0]],
        "Last" => ids[roots[roots.len() - 1]],
        "Count" => items.len() as i64,
    };
    doc.objects.insert(outlines_id, Object::Dictionary(root));

    let catalog = catalog_mut(doc)?;
    catalog.set("Outlines", outlines_id);
    catalog.set("PageMode", "UseOutlines");

    Ok(Some(outlines_id))
}

/// Label used when listing bookmarks for selection: full-width indentation
/// per level, with a marker for second and deeper levels.
pub fn display_title(entry: &OutlineEntry) -> String {
    let indent = "\u{3000}".repeat(entry.level.saturating_sub(1) as usize);
    let marker = match entry.level {
        2 => "■",
        l if l >= 3 => "●",
        _ => "",
    };
    format!("{}{} {}", indent, marker, entry.title)
}

fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(rest).into_owned()
    } else {
        // PDFDocEncoding / Latin-1 (simplified)
        bytes.iter().map(|&b| b as char).collect()
    }
}

fn encode_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
