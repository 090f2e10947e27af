pub mod extract;
pub mod report;
pub mod toc;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const EXTRACTED_SUFFIX: &str = "_extracted.pdf";
pub const REPORT_SUFFIX: &str = "_report.xlsx";

/// Output path next to `input`, named after its stem plus `suffix`.
pub fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    input.with_file_name(format!("{}{}", stem, suffix))
}

pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read PDF: {}", path.display()))
}

pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("docs/manual.pdf"), EXTRACTED_SUFFIX),
            PathBuf::from("docs/manual_extracted.pdf")
        );
        assert_eq!(
            default_output(Path::new("manual.pdf"), REPORT_SUFFIX),
            PathBuf::from("manual_report.xlsx")
        );
    }
}
