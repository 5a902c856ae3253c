//! Directory batch processing.
//!
//! Every `*.pdf` in an input directory is run through the outline pipeline
//! and written as `<stem>.json` into an output directory. Documents are
//! independent, so they are processed on the rayon thread pool unless
//! sequential mode is requested. Per-document failures never abort a batch:
//! extraction failures become the degraded record and write failures are
//! counted in the summary.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::Result;
use crate::outline::{HeuristicConfig, OutlineExtractor};
use crate::parser::ParseOptions;
use crate::render::{to_json, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Process documents in parallel
    pub parallel: bool,
    /// JSON output format
    pub format: JsonFormat,
    /// Heuristic thresholds
    pub config: HeuristicConfig,
    /// Layout extraction options
    pub parse_options: ParseOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            format: JsonFormat::Pretty,
            config: HeuristicConfig::default(),
            parse_options: ParseOptions::default(),
        }
    }
}

impl BatchOptions {
    /// Create batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process documents one at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the JSON output format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the heuristic thresholds.
    pub fn with_config(mut self, config: HeuristicConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the layout extraction options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }
}

/// Outcome for one input document.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub title: String,
    pub headings: usize,
    /// The document could not be processed and the degraded record was written
    pub degraded: bool,
    /// Set when the JSON file could not be written
    pub write_error: Option<String>,
}

impl FileReport {
    /// Whether the output file was written.
    pub fn is_written(&self) -> bool {
        self.write_error.is_none()
    }
}

/// Summary of a batch run, reports in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    /// Number of documents processed.
    pub fn processed(&self) -> usize {
        self.reports.len()
    }

    /// Number of documents that yielded the degraded record.
    pub fn degraded(&self) -> usize {
        self.reports.iter().filter(|r| r.degraded).count()
    }

    /// Number of output files that could not be written.
    pub fn write_failures(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_written()).count()
    }

    /// Check if nothing was processed.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// Runs the outline pipeline over a directory of PDFs.
#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    options: BatchOptions,
    extractor: OutlineExtractor,
}

impl BatchProcessor {
    /// Create a processor.
    pub fn new(options: BatchOptions) -> Self {
        let extractor = OutlineExtractor::new()
            .with_config(options.config.clone())
            .with_parse_options(options.parse_options.clone());
        Self { options, extractor }
    }

    /// The options in use.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// List `*.pdf` files (extension case-insensitive) in sorted order.
    pub fn discover_inputs<P: AsRef<Path>>(input_dir: P) -> Result<Vec<PathBuf>> {
        let mut inputs = Vec::new();
        for entry in fs::read_dir(input_dir)? {
            let path = entry?.path();
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"));
            if is_pdf && path.is_file() {
                inputs.push(path);
            }
        }
        inputs.sort();
        Ok(inputs)
    }

    /// Output path for an input document.
    pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        output_dir.join(format!("{}.json", stem))
    }

    /// Process every PDF in `input_dir`, writing results into `output_dir`.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
    ) -> Result<BatchSummary> {
        self.run_with_progress(input_dir, output_dir, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_done` as each document finishes.
    pub fn run_with_progress<P, Q, F>(
        &self,
        input_dir: P,
        output_dir: Q,
        on_done: F,
    ) -> Result<BatchSummary>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        F: Fn(&FileReport) + Send + Sync,
    {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(input_dir)?;
        fs::create_dir_all(output_dir)?;

        let inputs = Self::discover_inputs(input_dir)?;
        if inputs.is_empty() {
            log::warn!("No PDF files found in {}", input_dir.display());
            return Ok(BatchSummary::default());
        }
        log::info!(
            "Processing {} PDF files from {}",
            inputs.len(),
            input_dir.display()
        );

        let process = |input: &PathBuf| {
            let report = self.process_one(input, output_dir);
            on_done(&report);
            report
        };
        let reports: Vec<FileReport> = if self.options.parallel {
            inputs.par_iter().map(process).collect()
        } else {
            inputs.iter().map(process).collect()
        };

        let summary = BatchSummary { reports };
        log::info!(
            "Processed {} files ({} degraded, {} write failures)",
            summary.processed(),
            summary.degraded(),
            summary.write_failures()
        );
        Ok(summary)
    }

    /// Extract one document and write its JSON.
    pub fn process_one(&self, input: &Path, output_dir: &Path) -> FileReport {
        log::info!("Processing {}", input.display());
        let result = self.extractor.process_file(input);
        let output = Self::output_path(input, output_dir);

        let write_error = to_json(&result, self.options.format)
            .and_then(|json| fs::write(&output, json).map_err(Into::into))
            .err()
            .map(|e| {
                log::error!("Failed to write {}: {}", output.display(), e);
                e.to_string()
            });

        if write_error.is_none() {
            log::info!(
                "Wrote {} ({} headings)",
                output.display(),
                result.outline.len()
            );
        }

        FileReport {
            input: input.to_path_buf(),
            output,
            headings: result.outline.len(),
            degraded: result.is_degraded(),
            title: result.title,
            write_error,
        }
    }
}
