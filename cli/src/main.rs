//! pdf-outline CLI - title and heading outline extraction tool

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_outline::{
    render, BatchOptions, BatchProcessor, HeuristicConfig, JsonFormat, OutlineExtractor,
};

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(version)]
#[command(
    about = "Extract a title and H1-H3 heading outline from PDF files",
    long_about = None
)]
struct Cli {
    /// Directory scanned for *.pdf files
    #[arg(long, value_name = "DIR", default_value = "./input", env = "PDF_OUTLINE_INPUT")]
    input_dir: PathBuf,

    /// Directory receiving one <stem>.json per document
    #[arg(long, value_name = "DIR", default_value = "./output", env = "PDF_OUTLINE_OUTPUT")]
    output_dir: PathBuf,

    /// JSON file overriding heuristic thresholds
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Output compact JSON
    #[arg(long, global = true)]
    compact: bool,

    /// Process documents one at a time
    #[arg(long)]
    sequential: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of a single PDF
    File {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let format = if cli.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Some(Commands::File { input, output }) => {
            cmd_file(&input, output.as_deref(), config, format)
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_batch(
            &cli.input_dir,
            &cli.output_dir,
            config,
            format,
            cli.sequential,
        ),
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<HeuristicConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let config = HeuristicConfig::from_json_file(path)?;
            log::info!("Loaded heuristic config from {}", path.display());
            Ok(config)
        }
        None => Ok(HeuristicConfig::default()),
    }
}

fn cmd_batch(
    input_dir: &Path,
    output_dir: &Path,
    config: HeuristicConfig,
    format: JsonFormat,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = BatchOptions::new().with_config(config).with_format(format);
    if sequential {
        options = options.sequential();
    }
    let processor = BatchProcessor::new(options);

    fs::create_dir_all(input_dir)?;
    let total = BatchProcessor::discover_inputs(input_dir)?.len();
    if total == 0 {
        println!(
            "{} {}",
            "No PDF files found in".yellow(),
            input_dir.display()
        );
        fs::create_dir_all(output_dir)?;
        return Ok(());
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let summary = processor.run_with_progress(input_dir, output_dir, |report| {
        let name = report
            .input
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        pb.set_message(name);
        pb.inc(1);
    })?;
    pb.finish_with_message("Done!");

    println!("\n{}", "Outlines:".green().bold());
    let count = summary.reports.len();
    for (i, report) in summary.reports.iter().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        let name = report.output.file_name().unwrap_or_default().to_string_lossy();
        let status = if let Some(ref err) = report.write_error {
            format!("write failed: {}", err).red()
        } else if report.degraded {
            "degraded".yellow()
        } else {
            format!("{} headings", report.headings).normal()
        };
        println!("  {} {} ({})", branch.dimmed(), name, status);
    }

    println!(
        "\n{} {} processed, {} degraded, {} write failures",
        "Done!".green().bold(),
        summary.processed(),
        summary.degraded(),
        summary.write_failures()
    );

    Ok(())
}

fn cmd_file(
    input: &Path,
    output: Option<&Path>,
    config: HeuristicConfig,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = OutlineExtractor::new()
        .with_config(config)
        .process_file(input);
    if result.is_degraded() {
        log::warn!("{} could not be processed", input.display());
    }

    if let Some(path) = output {
        let mut writer = io::BufWriter::new(fs::File::create(path)?);
        render::write_json(&result, format, &mut writer)?;
        writer.flush()?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        render::write_json(&result, format, io::stdout().lock())?;
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdf-outline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF title and heading outline extraction tool");
    println!();
    println!("License: MIT");
}
