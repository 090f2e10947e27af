use super::outline::OutlineEntry;

/// Pages a bookmark owns: from its own start page up to the page before the
/// next bookmark starts. Both ends are 0-based and inclusive.
///
/// Nothing is clamped. Two bookmarks on the same page give the first one an
/// `end` before its `start`, and an outline that is not in page order gives
/// ranges that overlap or run backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange<'a> {
    pub entry: &'a OutlineEntry,
    pub start: i64,
    pub end: i64,
}

impl PageRange<'_> {
    /// May be zero or negative for a degenerate range.
    pub fn page_count(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// Resolve the page range of every entry, in outline order.
pub fn resolve_ranges(entries: &[OutlineEntry], total_pages: u32) -> Vec<PageRange<'_>> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let end = match entries.get(i + 1) {
                Some(next) => i64::from(next.start_page) - 2,
                None => i64::from(total_pages) - 1,
            };
            PageRange {
                entry,
                start: i64::from(entry.start_page) - 1,
                end,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::entries;

    fn spans(ranges: &[PageRange]) -> Vec<(i64, i64)> {
        ranges.iter().map(|r| (r.start, r.end)).collect()
    }

    #[test]
    fn test_basic_outline() {
        let outline = entries(&[(1, "A", 1), (2, "B", 3), (1, "C", 6)]);
        let ranges = resolve_ranges(&outline, 10);
        assert_eq!(spans(&ranges), vec![(0, 1), (2, 4), (5, 9)]);
        assert_eq!(
            ranges.iter().map(PageRange::page_count).collect::<Vec<_>>(),
            vec![2, 3, 5]
        );
        assert_eq!(ranges[1].entry.title, "B");
    }

    #[test]
    fn test_each_range_ends_before_next_start() {
        let outline = entries(&[(1, "a", 1), (1, "b", 4), (2, "c", 9), (2, "d", 9), (1, "e", 20)]);
        let ranges = resolve_ranges(&outline, 25);
        for (i, range) in ranges.iter().enumerate() {
            match outline.get(i + 1) {
                Some(next) => assert_eq!(range.end, i64::from(next.start_page) - 2),
                None => assert_eq!(range.end, 24),
            }
        }
    }

    #[test]
    fn test_shared_start_page_is_degenerate() {
        let outline = entries(&[(1, "A", 3), (2, "B", 3)]);
        let ranges = resolve_ranges(&outline, 5);
        assert_eq!(spans(&ranges), vec![(2, 1), (2, 4)]);
        assert_eq!(ranges[0].page_count(), 0);
    }

    #[test]
    fn test_out_of_order_outline_is_not_sorted() {
        let outline = entries(&[(1, "Late", 8), (1, "Early", 2)]);
        let ranges = resolve_ranges(&outline, 10);
        assert_eq!(spans(&ranges), vec![(7, 0), (1, 9)]);
        assert_eq!(ranges[0].page_count(), -6);
    }

    #[test]
    fn test_empty_outline() {
        assert!(resolve_ranges(&[], 4).is_empty());
    }
}
