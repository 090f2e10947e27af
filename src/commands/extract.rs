use crate::commands::{default_output, read_input, write_output, EXTRACTED_SUFFIX};
use crate::pdf::extract::extract_by_selection;
use crate::pdf::outline::read_outline;
use crate::selection::SelectionSet;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(input: P, selection: &str, output: Option<&Path>) -> Result<()> {
    let input = input.as_ref();
    let bytes = read_input(input)?;

    let entries = read_outline(&bytes);
    if entries.is_empty() {
        anyhow::bail!("No bookmarks found in {}", input.display());
    }

    let selection = SelectionSet::parse(selection, entries.len())?;
    let Some(extraction) = extract_by_selection(&bytes, &entries, &selection)? else {
        anyhow::bail!("Nothing to extract; select at least one bookmark entry");
    };

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, EXTRACTED_SUFFIX));
    write_output(&output, &extraction.bytes)?;

    println!(
        "Extracted {} bookmark(s), {} page(s) to {}",
        extraction.outline.len(),
        extraction.page_count,
        output.display()
    );

    Ok(())
}
