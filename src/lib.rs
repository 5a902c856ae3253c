//! # pdf-outline
//!
//! Heuristic title and heading outline extraction from PDF documents.
//!
//! Given a PDF, this library infers a document title and a flat, ordered list
//! of headings (levels H1–H3 with 1-indexed page numbers) from layout signals
//! alone: font size relative to the document average, boldness and common
//! section-numbering patterns. Embedded bookmarks and tagged structure are not
//! consulted.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{extract_outline, render};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     let result = extract_outline("report.pdf");
//!     let json = render::to_json(&result, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Layout**: [`PdfParser`] turns each page into blocks, lines and styled
//!   spans ([`PageLayout`]). Any other [`LayoutSource`] can stand in for it.
//! - **Statistics**: the mean font size over every span of the document.
//! - **Title**: the metadata title when usable, else the best-scoring line
//!   on page one.
//! - **Headings**: each line is tested against the numbering patterns, then
//!   bold and size thresholds, and assigned a level.
//! - **Assembly**: duplicate `(text, page)` pairs are dropped and headings
//!   are ordered by page.
//!
//! A document that cannot be processed yields the fixed degraded record
//! (`"Error Processing Document"`, empty outline) instead of an error.

pub mod batch;
pub mod error;
pub mod model;
pub mod outline;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{BatchOptions, BatchProcessor, BatchSummary, FileReport};
pub use error::{Error, Result};
pub use model::{
    Heading, HeadingLevel, LayoutDocument, LayoutSource, Metadata, OutlineResult, PageLayout,
    TextBlock, TextLine, TextSpan, ERROR_TITLE,
};
pub use outline::{HeuristicConfig, OutlineExtractor};
pub use parser::{ParseOptions, PdfParser};
pub use render::JsonFormat;

use std::path::Path;

/// Extract the outline of a PDF file with default settings.
///
/// Never fails: a document that cannot be processed yields
/// [`OutlineResult::degraded`].
///
/// # Example
///
/// ```no_run
/// use pdf_outline::extract_outline;
///
/// let result = extract_outline("report.pdf");
/// for heading in &result.outline {
///     println!("{} {} (p. {})", heading.level, heading.text, heading.page);
/// }
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> OutlineResult {
    OutlineExtractor::new().process_file(path)
}

/// Extract the outline of an in-memory PDF with default settings.
pub fn extract_outline_bytes(data: &[u8]) -> OutlineResult {
    OutlineExtractor::new().process_bytes(data)
}

/// Extract the outline of a PDF file, propagating failures.
pub fn try_extract_outline<P: AsRef<Path>>(path: P) -> Result<OutlineResult> {
    OutlineExtractor::new().extract_file(path)
}

/// Parse a PDF file into its page layouts.
pub fn parse_layout<P: AsRef<Path>>(path: P) -> Result<LayoutDocument> {
    PdfParser::open(path)?.parse()
}
