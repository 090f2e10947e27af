use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shiori")]
#[command(about = "Slice PDFs by bookmark and report page counts per bookmark")]
#[command(version)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// List bookmarks with their index, start page and page count
    #[command(alias = "bookmarks")]
    Toc {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Write a new PDF holding only the pages of the selected bookmarks
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Bookmark indices as listed by `toc` (e.g., "0,2,5-7,9-end")
        selection: String,

        /// Output file (default: <name>_extracted.pdf next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a spreadsheet of page counts per bookmark
    Report {
        /// PDF file to summarize
        path: PathBuf,

        /// Output file (default: <name>_report.xlsx next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
