use crate::commands::read_input;
use crate::pdf::outline::{display_title, read_outline};
use crate::pdf::ranges::resolve_ranges;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let bytes = read_input(path.as_ref())?;
    let entries = read_outline(&bytes);

    if entries.is_empty() {
        println!("No bookmarks found.");
        return Ok(());
    }

    let total_pages = PdfDocument::from_bytes(&bytes)?.page_count();
    for (i, range) in resolve_ranges(&entries, total_pages).iter().enumerate() {
        println!(
            "[{}] {} (p. {}, {} pages)",
            i,
            display_title(range.entry),
            range.entry.start_page,
            range.page_count()
        );
    }

    Ok(())
}
