//! Batch processing command for multiple lab report files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, error, warn};

use labrep_core::{PureOcrEngine, ReportParser, ReportResult, TextRecognizer};

use super::process::{OutputFormat, format_report, read_text};
use super::{InputKind, build_parser, load_config, load_engine};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    outcome: Result<ReportResult, String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let parser = build_parser(&config)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| InputKind::from_path(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // The engine is loaded once and shared by every worker.
    let needs_ocr = files
        .iter()
        .any(|p| InputKind::from_path(p) == Some(InputKind::Image));
    let engine = if needs_ocr {
        Some(load_engine(args.model_dir.as_deref(), &config)?)
    } else {
        None
    };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.max(1))
        .build()?;

    let results: Vec<ProcessResult> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let file_start = Instant::now();
                let outcome = process_single_file(path, &parser, engine.as_ref())
                    .map_err(|e| e.to_string());
                pb.inc(1);
                ProcessResult {
                    path: path.clone(),
                    outcome,
                    processing_time_ms: file_start.elapsed().as_millis() as u64,
                }
            })
            .collect()
    });

    pb.finish_and_clear();

    let failed: Vec<&ProcessResult> = results.iter().filter(|r| r.outcome.is_err()).collect();

    if let Some(first) = failed.first() {
        let message = first.outcome.as_ref().err().map(String::as_str).unwrap_or("");
        if args.continue_on_error {
            for result in &failed {
                warn!(
                    "Failed to process {}: {}",
                    result.path.display(),
                    result.outcome.as_ref().err().map(String::as_str).unwrap_or("")
                );
            }
        } else {
            error!("Failed to process {}: {}", first.path.display(), message);
            anyhow::bail!("Processing failed for {}: {}", first.path.display(), message);
        }
    }

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Ok(report) = &result.outcome {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("report");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_report(report, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.outcome.as_ref().err().map(String::as_str).unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    parser: &ReportParser,
    engine: Option<&PureOcrEngine>,
) -> anyhow::Result<ReportResult> {
    let text = match InputKind::from_path(path) {
        Some(InputKind::Text) => read_text(path)?,
        Some(InputKind::Image) => {
            let Some(engine) = engine else {
                anyhow::bail!("OCR engine not loaded");
            };
            engine
                .recognize_file(path)
                .map_err(|e| anyhow::anyhow!("OCR failed: {}", e))?
                .text
        }
        None => anyhow::bail!("Unsupported file format: {}", path.display()),
    };

    Ok(parser.parse(&text).report)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "reported_date",
        "month",
        "serum_creatinine",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time_ms = result.processing_time_ms.to_string();

        match &result.outcome {
            Ok(report) => wtr.write_record([
                filename,
                "success",
                report.reported_date.as_display(),
                report.month.as_display(),
                report.serum_creatinine.as_display(),
                time_ms.as_str(),
                "",
            ])?,
            Err(message) => wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                time_ms.as_str(),
                message.as_str(),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}
