use anyhow::{anyhow, Result};
use std::collections::BTreeSet;

/// Indices of chosen bookmarks, 0-based into the full outline.
///
/// Ranges are clamped to the outline while parsing. Single indices are not
/// checked here; anything out of range is dropped when the selection is
/// applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    indices: BTreeSet<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum IndexRef {
    Number(i64),
    End,
}

impl SelectionSet {
    pub fn from_indices<I: IntoIterator<Item = i64>>(indices: I) -> Self {
        SelectionSet {
            indices: indices.into_iter().collect(),
        }
    }

    /// Parse a selection like "0,2,5-7" or "3-end". `end` is the last index
    /// of an outline with `entry_count` entries.
    pub fn parse(s: &str, entry_count: usize) -> Result<Self> {
        let last = entry_count as i64 - 1;
        let mut indices = BTreeSet::new();

        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(anyhow!("Empty selection in {:?}", s));
            }

            let resolve = |r: IndexRef| match r {
                IndexRef::Number(n) => n,
                IndexRef::End => last,
            };

            match part.find('-') {
                Some(0) => return Err(anyhow!("Invalid selection: {}", part)),
                Some(dash_pos) => {
                    let start = resolve(parse_index_ref(&part[..dash_pos])?);
                    let end = resolve(parse_index_ref(&part[dash_pos + 1..])?);
                    // Ranges only expand over indices the outline has
                    let lo = start.min(end).max(0);
                    let hi = start.max(end).min(last);
                    if lo <= hi {
                        indices.extend(lo..=hi);
                    }
                }
                None => {
                    indices.insert(resolve(parse_index_ref(part)?));
                }
            }
        }

        Ok(SelectionSet { indices })
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.indices.iter().copied()
    }

    /// Indices that address an entry of an outline with `len` entries.
    pub fn valid_indices(&self, len: usize) -> impl Iterator<Item = usize> + '_ {
        self.iter()
            .filter_map(move |i| usize::try_from(i).ok().filter(|&i| i < len))
    }
}

fn parse_index_ref(s: &str) -> Result<IndexRef> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        Ok(IndexRef::End)
    } else {
        s.parse::<u32>()
            .map(|n| IndexRef::Number(i64::from(n)))
            .map_err(|_| anyhow!("Invalid bookmark index: {}", s))
    }
}
