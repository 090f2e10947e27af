use anyhow::{Context, Result};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook};
use serde::Serialize;
use tracing::warn;

use super::outline::{read_outline_from_doc, OutlineEntry};
use super::ranges::resolve_ranges;
use super::PdfDocument;

pub const PAGE_COUNT_HEADER: &str = "ページ数";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// One cell per outline level; a title sits in its own level's column.
    pub levels: Vec<String>,
    pub page_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<ReportRow>,
}

/// Tabulate the page count of every bookmark, in outline order.
///
/// A row repeats the titles of the enclosing bookmarks still in effect and
/// leaves deeper levels blank. Counts are not clamped, so an outline whose
/// bookmarks are out of page order shows up as zero or negative counts.
pub fn build_report_table(entries: &[OutlineEntry], total_pages: u32) -> ReportTable {
    let max_level = entries.iter().map(|e| e.level).max().unwrap_or(1).max(1) as usize;

    let mut headers: Vec<String> = (1..=max_level).map(|l| format!("Level {}", l)).collect();
    headers.push(PAGE_COUNT_HEADER.to_string());

    let mut hierarchy = vec![String::new(); max_level];
    let rows = resolve_ranges(entries, total_pages)
        .iter()
        .map(|range| {
            let level = (range.entry.level as usize).max(1);
            hierarchy[level - 1] = range.entry.title.clone();
            for slot in &mut hierarchy[level..] {
                slot.clear();
            }
            ReportRow {
                levels: hierarchy.clone(),
                page_count: range.page_count(),
            }
        })
        .collect();

    ReportTable { headers, rows }
}

/// Write the table as a single-sheet XLSX workbook. The creation time is
/// pinned so the same table always gives the same bytes.
pub fn render_xlsx(table: &ReportTable) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column(col)?, header, &header_format)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let row_num = u32::try_from(i + 1).context("Too many report rows")?;
        for (col, title) in row.levels.iter().enumerate() {
            if !title.is_empty() {
                worksheet.write_string(row_num, column(col)?, title)?;
            }
        }
        worksheet.write_number(row_num, column(row.levels.len())?, row.page_count as f64)?;
    }

    workbook
        .save_to_buffer()
        .context("Failed to write report workbook")
}

fn column(index: usize) -> Result<u16> {
    u16::try_from(index).context("Too many outline levels for one worksheet")
}

/// Tabulate a PDF held in memory. An outline that cannot be read is
/// reported as an empty one; only an unparseable document is an error.
pub fn report_table(bytes: &[u8]) -> Result<ReportTable> {
    let pdf = PdfDocument::from_bytes(bytes)?;
    let entries = read_outline_from_doc(&pdf.doc).unwrap_or_else(|e| {
        warn!("Could not read outline: {:#}", e);
        Vec::new()
    });
    Ok(build_report_table(&entries, pdf.page_count()))
}

/// Build the page-count workbook for a PDF held in memory.
pub fn create_report(bytes: &[u8]) -> Result<Vec<u8>> {
    render_xlsx(&report_table(bytes)?)
}
