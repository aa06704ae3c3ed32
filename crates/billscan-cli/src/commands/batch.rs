//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use billscan_core::invoice::{BillParser, OrderParser, ParseReport};
use billscan_core::models::config::PdfConfig;
use billscan_core::store::{store_orders, MemoryOrderStore, UploadSummary};

use super::config::load_config;
use super::process::{build_parser, format_report, read_document_text, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
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

    /// Text that starts every invoice section (overrides config)
    #[arg(long)]
    marker: Option<String>,

    /// Reference date for ambiguous dates, as YYYY-MM-DD (default: today)
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// Store all orders and report how many were new
    #[arg(long)]
    store: bool,

    /// Owner to store orders under (overrides config)
    #[arg(long)]
    owner: Option<String>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    report: Option<ParseReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
        })
        .collect();
    files.sort();

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

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(build_parser(&config, args.marker.as_deref(), args.reference_date));
    let pdf_config = Arc::new(config.pdf.clone());

    let mut pending = stream::iter(files)
        .map(|path| {
            let parser = Arc::clone(&parser);
            let pdf_config = Arc::clone(&pdf_config);
            tokio::task::spawn_blocking(move || process_single_file(path, &parser, &pdf_config))
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(joined) = pending.next().await {
        let result = joined?;
        overall_pb.inc(1);

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                overall_pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), error_msg);
            }
        }
        results.push(result);
    }

    overall_pb.finish_and_clear();
    results.sort_by(|a, b| a.path.cmp(&b.path));

    let successful: Vec<_> = results.iter().filter(|r| r.report.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(report) = &result.report {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("orders");
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
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if args.store {
        let owner = args.owner.as_deref().unwrap_or(&config.store.owner);
        let mut store = MemoryOrderStore::new();
        let mut upload = UploadSummary::default();
        for report in successful.iter().filter_map(|r| r.report.as_ref()) {
            let summary = store_orders(&mut store, owner, &report.orders)?;
            upload.uploaded += summary.uploaded;
            upload.skipped += summary.skipped;
        }
        println!(
            "   {} orders stored, {} duplicates skipped",
            style(upload.uploaded).green(),
            style(upload.skipped).yellow()
        );
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(path: PathBuf, parser: &BillParser, config: &PdfConfig) -> ProcessResult {
    let file_start = Instant::now();

    let outcome = read_document_text(&path, config)
        .and_then(|text| parser.parse(&text).map_err(anyhow::Error::from));

    let processing_time_ms = file_start.elapsed().as_millis() as u64;
    match outcome {
        Ok(report) => ProcessResult {
            path,
            report: Some(report),
            error: None,
            processing_time_ms,
        },
        Err(e) => ProcessResult {
            path,
            report: None,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "orders",
        "segments",
        "dropped_segments",
        "items",
        "total_amount",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(report) = &result.report {
            let items: usize = report.orders.iter().map(|o| o.line_items.len()).sum();
            let total = report
                .orders
                .iter()
                .try_fold(Decimal::ZERO, |acc, o| acc.checked_add(o.total_amount))
                .map_or_else(|| "overflow".to_string(), |t| t.to_string());
            wtr.write_record([
                filename,
                "success",
                &report.orders.len().to_string(),
                &report.segment_count.to_string(),
                &report.dropped_segments.len().to_string(),
                &items.to_string(),
                total.as_str(),
                &report.warnings.len().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
