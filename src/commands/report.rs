use crate::commands::{default_output, read_input, write_output, REPORT_SUFFIX};
use crate::pdf::report::create_report;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(input: P, output: Option<&Path>) -> Result<()> {
    let input = input.as_ref();
    let bytes = read_input(input)?;
    let workbook = create_report(&bytes)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, REPORT_SUFFIX));
    write_output(&output, &workbook)?;

    println!("Wrote page-count report to {}", output.display());

    Ok(())
}
