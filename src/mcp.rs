use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::commands::{default_output, read_input, write_output, EXTRACTED_SUFFIX, REPORT_SUFFIX};
use crate::pdf::extract::extract_by_selection;
use crate::pdf::outline::{display_title, read_outline};
use crate::pdf::ranges::resolve_ranges;
use crate::pdf::report::{render_xlsx, report_table, ReportRow};
use crate::pdf::PdfDocument;
use crate::selection::SelectionSet;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExtractBookmarksRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "0-based bookmark indices as returned by pdf_bookmarks")]
    pub indices: Vec<i64>,
    #[schemars(description = "Output file path (default: <name>_extracted.pdf next to the source)")]
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BookmarkReportRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Output file path (default: <name>_report.xlsx next to the source)")]
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookmarkServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl BookmarkServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for BookmarkServer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

fn output_path(requested: Option<String>, source: &str, suffix: &str) -> String {
    requested.unwrap_or_else(|| {
        default_output(Path::new(source), suffix)
            .display()
            .to_string()
    })
}

#[tool_router]
impl BookmarkServer {
    #[tool(description = "List the bookmarks (outline) of a PDF with their index, level, start page and the number of pages each one spans")]
    fn pdf_bookmarks(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let bytes = match read_input(Path::new(&path)) {
            Ok(b) => b,
            Err(e) => return format!("Error: {}", e),
        };
        let entries = read_outline(&bytes);
        if entries.is_empty() {
            return "Error: No bookmarks found in this PDF".to_string();
        }
        let total_pages = match PdfDocument::from_bytes(&bytes) {
            Ok(doc) => doc.page_count(),
            Err(e) => return format!("Error: {}", e),
        };

        let result: Vec<BookmarkResult> = resolve_ranges(&entries, total_pages)
            .iter()
            .enumerate()
            .map(|(index, range)| BookmarkResult {
                index,
                level: range.entry.level,
                title: range.entry.title.clone(),
                label: display_title(range.entry),
                start_page: range.entry.start_page,
                page_count: range.page_count(),
            })
            .collect();
        to_json(&result)
    }

    #[tool(description = "Create a new PDF containing only the pages of the selected bookmarks, with a rebuilt outline")]
    fn pdf_extract_bookmarks(&self, Parameters(req): Parameters<ExtractBookmarksRequest>) -> String {
        let bytes = match read_input(Path::new(&req.path)) {
            Ok(b) => b,
            Err(e) => return format!("Error: {}", e),
        };
        let entries = read_outline(&bytes);
        let selection = SelectionSet::from_indices(req.indices);

        let extraction = match extract_by_selection(&bytes, &entries, &selection) {
            Ok(Some(x)) => x,
            Ok(None) => return "Error: Please select at least one bookmark entry".to_string(),
            Err(e) => return format!("Error: {:#}", e),
        };

        let output = output_path(req.output, &req.path, EXTRACTED_SUFFIX);
        if let Err(e) = write_output(Path::new(&output), &extraction.bytes) {
            return format!("Error: {}", e);
        }

        to_json(&ExtractBookmarksResult {
            output_path: output,
            page_count: extraction.page_count,
            bookmarks: extraction
                .outline
                .into_iter()
                .map(|e| OutlineEntryResult {
                    level: e.level,
                    title: e.title,
                    page: e.start_page,
                })
                .collect(),
        })
    }

    #[tool(description = "Write an XLSX spreadsheet with the page count of every bookmark, one column per outline level")]
    fn pdf_bookmark_report(&self, Parameters(req): Parameters<BookmarkReportRequest>) -> String {
        let bytes = match read_input(Path::new(&req.path)) {
            Ok(b) => b,
            Err(e) => return format!("Error: {}", e),
        };
        let table = match report_table(&bytes) {
            Ok(t) => t,
            Err(e) => return format!("Error: {:#}", e),
        };

        let workbook = match render_xlsx(&table) {
            Ok(w) => w,
            Err(e) => return format!("Error: {:#}", e),
        };
        let output = output_path(req.output, &req.path, REPORT_SUFFIX);
        if let Err(e) = write_output(Path::new(&output), &workbook) {
            return format!("Error: {}", e);
        }

        to_json(&BookmarkReportResult {
            output_path: output,
            headers: table.headers,
            rows: table.rows,
        })
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BookmarkResult {
    pub index: usize,
    pub level: u32,
    pub title: String,
    pub label: String,
    pub start_page: u32,
    pub page_count: i64,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct OutlineEntryResult {
    pub level: u32,
    pub title: String,
    pub page: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExtractBookmarksResult {
    pub output_path: String,
    pub page_count: u32,
    pub bookmarks: Vec<OutlineEntryResult>,
}

#[derive(Debug, Serialize)]
pub struct BookmarkReportResult {
    pub output_path: String,
    pub headers: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ServerHandler for BookmarkServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF bookmark tools. Use pdf_bookmarks to list the outline with indices, \
                 pdf_extract_bookmarks to build a new PDF from selected bookmark indices, and \
                 pdf_bookmark_report to write an XLSX of page counts per bookmark."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = BookmarkServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::pdf_with_outline;

    fn write_fixture(dir: &Path) -> String {
        let path = dir.join("book.pdf");
        std::fs::write(&path, pdf_with_outline(10, &[(1, "A", 1), (2, "B", 3), (1, "C", 6)]))
            .unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_bookmarks_tool_lists_page_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let json = BookmarkServer::new().pdf_bookmarks(Parameters(PathRequest { path }));
        let result: Vec<BookmarkResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(
            result.iter().map(|b| b.page_count).collect::<Vec<_>>(),
            vec![2, 3, 5]
        );
        assert_eq!(result[1].label, "\u{3000}■ B");
    }

    #[test]
    fn test_extract_tool_reports_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let reply = BookmarkServer::new().pdf_extract_bookmarks(Parameters(ExtractBookmarksRequest {
            path,
            indices: vec![-1, 17],
            output: None,
        }));
        assert!(reply.starts_with("Error: Please select"));
    }

    #[test]
    fn test_extract_tool_writes_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let json = BookmarkServer::new().pdf_extract_bookmarks(Parameters(ExtractBookmarksRequest {
            path,
            indices: vec![1],
            output: None,
        }));
        let result: ExtractBookmarksResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.page_count, 3);
        assert!(result.output_path.ends_with("book_extracted.pdf"));
        assert!(Path::new(&result.output_path).exists());
    }

    #[test]
    fn test_report_tool_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());
        let output = dir.path().join("out.xlsx").display().to_string();

        let json = BookmarkServer::new().pdf_bookmark_report(Parameters(BookmarkReportRequest {
            path,
            output: Some(output.clone()),
        }));
        let result: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(result["rows"].as_array().unwrap().len(), 3);
        assert!(std::fs::read(&output).unwrap().starts_with(b"PK"));
    }
}
