//! Outline inference: title location, heading detection and assembly.
//!
//! The pipeline for one document is strictly two-pass: every page is
//! materialized and the font statistics computed before any line is
//! classified, since all size thresholds are relative to the document mean.

mod config;
mod dedup;
mod heading;
mod patterns;
mod stats;
mod title;

pub use config::HeuristicConfig;
pub use dedup::dedup_and_order;
pub use heading::{DetectionBasis, HeadingDetector, LevelClassifier, LineFeatures};
pub use patterns::{PatternKind, PatternMatch, PatternTable, SECTION_KEYWORDS};
pub use stats::FontStatistics;
pub use title::{TitleCandidate, TitleLocator, TitleSource};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{LayoutSource, OutlineResult, PageLayout};
use crate::parser::{ParseOptions, PdfParser};

/// Extracts a title and heading outline from documents.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{HeuristicConfig, OutlineExtractor};
///
/// let extractor = OutlineExtractor::new()
///     .with_config(HeuristicConfig::new().with_detection_ratios(1.15, 1.35));
/// let result = extractor.process_file("report.pdf");
/// println!("{}: {} headings", result.title, result.outline.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct OutlineExtractor {
    config: HeuristicConfig,
    parse_options: ParseOptions,
}

impl OutlineExtractor {
    /// Create an extractor with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom heuristic thresholds.
    pub fn with_config(mut self, config: HeuristicConfig) -> Self {
        self.config = config;
        self
    }

    /// Use custom layout extraction options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// The heuristic thresholds in use.
    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Run the pipeline, propagating any failure.
    pub fn extract<S: LayoutSource + ?Sized>(&self, source: &S) -> Result<OutlineResult> {
        let pages = load_pages(source)?;
        let (title, title_source) =
            TitleLocator::new(&self.config).locate_with_first_page(source, pages.first());
        log::debug!("Title from {:?}: {:?}", title_source, title);

        let stats = FontStatistics::from_pages(&pages, self.config.default_font_size);
        log::debug!(
            "{} pages, {} spans, average font size {:.2}",
            pages.len(),
            stats.span_count,
            stats.avg_font_size
        );

        let detector = HeadingDetector::new(&self.config, stats);
        let headings: Vec<_> = pages
            .iter()
            .flat_map(|page| detector.detect_page(page))
            .collect();
        let detected = headings.len();
        let outline = dedup_and_order(headings);
        log::debug!("{} headings detected, {} after dedup", detected, outline.len());

        Ok(OutlineResult::new(title, outline))
    }

    /// Run the pipeline; any failure or panic yields the degraded record.
    pub fn process<S: LayoutSource + ?Sized>(&self, source: &S) -> OutlineResult {
        guarded(|| self.extract(source)).unwrap_or_else(|e| {
            log::error!("Error processing document: {}", e);
            OutlineResult::degraded()
        })
    }

    /// Parse a PDF file and extract its outline.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<OutlineResult> {
        let parser = PdfParser::open_with_options(path, self.parse_options.clone())?;
        self.extract(&parser)
    }

    /// Parse a PDF file and extract its outline, degrading on failure.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> OutlineResult {
        let path = path.as_ref();
        guarded(|| self.extract_file(path)).unwrap_or_else(|e| {
            log::error!("Error processing PDF {}: {}", path.display(), e);
            OutlineResult::degraded()
        })
    }

    /// Parse PDF bytes and extract the outline.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<OutlineResult> {
        let parser = PdfParser::from_bytes_with_options(data, self.parse_options.clone())?;
        self.extract(&parser)
    }

    /// Parse PDF bytes and extract the outline, degrading on failure.
    pub fn process_bytes(&self, data: &[u8]) -> OutlineResult {
        guarded(|| self.extract_bytes(data)).unwrap_or_else(|e| {
            log::error!("Error processing PDF bytes: {}", e);
            OutlineResult::degraded()
        })
    }
}

/// Materialize every page; the font baseline needs all of them.
fn load_pages<S: LayoutSource + ?Sized>(source: &S) -> Result<Vec<PageLayout>> {
    (0..source.page_count()).map(|i| source.page(i)).collect()
}

/// Run a pipeline step, turning a panic into an error.
fn guarded<F>(f: F) -> Result<OutlineResult>
where
    F: FnOnce() -> Result<OutlineResult>,
{
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(Error::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
