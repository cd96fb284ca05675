//! Process command - extract fields from a single lab report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use labrep_core::models::config::LabrepConfig;
use labrep_core::{ExtractionResult, FieldKind, ReportParser, ReportResult, TextRecognizer};

use super::{InputKind, build_parser, load_config, load_engine};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (OCR text or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Show which layout matched each field
    #[arg(long)]
    show_matches: bool,

    /// Print the recognized OCR text to stderr
    #[arg(long)]
    ocr_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let parser = build_parser(&config)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let Some(kind) = InputKind::from_path(&args.input) else {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    };

    info!("Processing file: {}", args.input.display());

    let text = match kind {
        InputKind::Text => read_text(&args.input)?,
        InputKind::Image => {
            let engine = load_engine(args.model_dir.as_deref(), &config)?;
            recognize_image(&args.input, &engine, &config)?
        }
    };

    if args.ocr_text {
        eprintln!("{}", style("OCR text:").dim());
        eprintln!("{}", text);
    }

    let result = parser.parse(&text);

    let output = format_report(&result.report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_matches {
        print_matches(&parser, &text, &result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read OCR text, replacing invalid UTF-8 rather than failing.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Run OCR on an image file with a spinner.
fn recognize_image(
    path: &Path,
    engine: &dyn TextRecognizer,
    config: &LabrepConfig,
) -> anyhow::Result<String> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message(format!("Running OCR ({})...", engine.name()));
    let result = engine
        .recognize_file(path)
        .map_err(|e| anyhow::anyhow!("OCR failed: {}", e))?;

    pb.finish_and_clear();

    debug!(
        "OCR detected {} text boxes in {}ms (row tolerance {})",
        result.boxes.len(),
        result.processing_time_ms,
        config.ocr.row_tolerance
    );

    if result.text.trim().is_empty() {
        warn!("No text detected in {}", path.display());
    }

    Ok(result.text)
}

fn print_matches(parser: &ReportParser, text: &str, result: &ExtractionResult) {
    println!();
    for field in FieldKind::ALL {
        let candidates = parser.candidates(text, field);
        let Some((winner, shadowed)) = candidates.split_first() else {
            println!("{} {}: no layout matched", style("ℹ").yellow(), field);
            continue;
        };
        println!(
            "{} {}: '{}' via {} at {}..{}",
            style("ℹ").blue(),
            field,
            winner.value,
            winner.pattern,
            winner.position.0,
            winner.position.1
        );
        for m in shadowed {
            println!("    also matched {}: '{}'", m.pattern, m.value);
        }
    }
    println!(
        "{} Extraction time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );
}

pub fn format_report(report: &ReportResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(report.format_text()),
    }
}

fn format_csv(report: &ReportResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["reported_date", "month", "serum_creatinine"])?;
    wtr.write_record([
        report.reported_date.as_display(),
        report.month.as_display(),
        report.serum_creatinine.as_display(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labrep_core::ExtractedField;
    use pretty_assertions::assert_eq;

    fn sample() -> ReportResult {
        labrep_core::assemble(
            ExtractedField::found("12/11/2022"),
            ExtractedField::found("november"),
            ExtractedField::NotFound,
        )
    }

    #[test]
    fn test_format_json() {
        let json = format_report(&sample(), OutputFormat::Json).unwrap();
        assert_eq!(
            json,
            r#"{"reportedDate":"12/11/2022","month":"november","serumCreatinine":"Not found"}"#
        );
    }

    #[test]
    fn test_format_csv() {
        let csv = format_report(&sample(), OutputFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "reported_date,month,serum_creatinine\n12/11/2022,november,Not found\n"
        );
    }

    #[test]
    fn test_format_text() {
        let text = format_report(&sample(), OutputFormat::Text).unwrap();
        assert!(text.contains("Serum creatinine: Not found"));
    }
}
