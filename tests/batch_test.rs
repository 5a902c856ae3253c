//! Integration tests for directory batch processing.

mod common;

use std::fs;

use pdf_outline::{BatchOptions, BatchProcessor, JsonFormat, OutlineResult};
use tempfile::TempDir;

use common::{build_pdf, report_pages};

fn read_result(path: &std::path::Path) -> OutlineResult {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_batch_writes_one_json_per_pdf() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("input");
    let output = root.path().join("output");
    fs::create_dir_all(&input).unwrap();

    fs::write(
        input.join("annual.pdf"),
        build_pdf(&report_pages(), Some("Annual Report 2024")),
    )
    .unwrap();
    fs::write(input.join("untitled.PDF"), build_pdf(&report_pages(), None)).unwrap();
    fs::write(input.join("corrupt.pdf"), b"%PDF-1.4\ngarbage").unwrap();
    fs::write(input.join("readme.txt"), b"not a pdf").unwrap();

    let summary = BatchProcessor::default().run(&input, &output).unwrap();
    assert_eq!(summary.processed(), 3);
    assert_eq!(summary.degraded(), 1);
    assert_eq!(summary.write_failures(), 0);

    let annual = read_result(&output.join("annual.json"));
    assert_eq!(annual.title, "Annual Report 2024");
    assert_eq!(annual.outline.len(), 5);

    let untitled = read_result(&output.join("untitled.json"));
    assert_eq!(untitled.title, "Quarterly Field Report");

    let corrupt = read_result(&output.join("corrupt.json"));
    assert!(corrupt.is_degraded());

    assert!(!output.join("readme.json").exists());
}

#[test]
fn test_reports_follow_sorted_input_order() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("in");
    let output = root.path().join("out");
    fs::create_dir_all(&input).unwrap();
    for name in ["c.pdf", "a.pdf", "b.pdf"] {
        fs::write(input.join(name), build_pdf(&report_pages(), None)).unwrap();
    }

    let summary = BatchProcessor::default().run(&input, &output).unwrap();
    let names: Vec<_> = summary
        .reports
        .iter()
        .map(|r| r.output.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.json", "b.json", "c.json"]);
}

#[test]
fn test_sequential_compact_output() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("in");
    let output = root.path().join("out");
    fs::create_dir_all(&input).unwrap();
    fs::write(
        input.join("report.pdf"),
        build_pdf(&report_pages(), Some("Annual Report 2024")),
    )
    .unwrap();

    let processor = BatchProcessor::new(
        BatchOptions::new()
            .sequential()
            .with_format(JsonFormat::Compact),
    );
    let summary = processor.run(&input, &output).unwrap();
    assert_eq!(summary.processed(), 1);

    let json = fs::read_to_string(output.join("report.json")).unwrap();
    assert!(!json.contains('\n'));
    assert!(json.starts_with(r#"{"title":"Annual Report 2024","outline":[{"level":"H1""#));
}

#[test]
fn test_write_failure_is_counted() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("in");
    let output = root.path().join("out");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("blocked.pdf"), build_pdf(&report_pages(), None)).unwrap();
    // A directory where the output file should go makes the write fail.
    fs::create_dir_all(output.join("blocked.json")).unwrap();

    let summary = BatchProcessor::default().run(&input, &output).unwrap();
    assert_eq!(summary.processed(), 1);
    assert_eq!(summary.write_failures(), 1);
    assert!(!summary.reports[0].is_written());
}
