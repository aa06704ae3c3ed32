//! Process command - extract orders from a single invoice file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use billscan_core::invoice::{BillParser, OrderParser, ParseReport};
use billscan_core::models::config::{BillscanConfig, PdfConfig};
use billscan_core::pdf::{PdfExtractor, PdfProcessor, PdfType};
use billscan_core::store::{store_orders, MemoryOrderStore};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or TXT holding already extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Text that starts every invoice section (overrides config)
    #[arg(long)]
    marker: Option<String>,

    /// Reference date for ambiguous dates, as YYYY-MM-DD (default: today)
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// Store the orders and report how many were new
    #[arg(long)]
    store: bool,

    /// Owner to store orders under (overrides config)
    #[arg(long)]
    owner: Option<String>,

    /// Print extraction warnings
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per line item
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

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading document...");
    pb.set_position(10);
    let text = read_document_text(&args.input, &config.pdf)?;

    pb.set_message("Extracting orders...");
    pb.set_position(50);
    let parser = build_parser(&config, args.marker.as_deref(), args.reference_date);
    let report = parser.parse(&text)?;

    pb.finish_and_clear();

    let output = format_report(&report, args.format)?;

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

    if args.show_warnings && !report.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &report.warnings {
            eprintln!("  - {}", warning);
        }
    }

    if args.store {
        let owner = args.owner.as_deref().unwrap_or(&config.store.owner);
        let mut store = MemoryOrderStore::new();
        let summary = store_orders(&mut store, owner, &report.orders)?;
        eprintln!(
            "{} Stored {} orders, skipped {} duplicates",
            style("✓").green(),
            summary.uploaded,
            summary.skipped
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build a parser from config plus command-line overrides.
pub fn build_parser(
    config: &BillscanConfig,
    marker: Option<&str>,
    reference_date: Option<NaiveDate>,
) -> BillParser {
    let mut parser = BillParser::from_config(&config.extraction);
    if let Some(marker) = marker {
        parser = parser.with_marker(marker);
    }
    if let Some(date) = reference_date {
        parser = parser.with_reference_date(date);
    }
    parser
}

/// Read the text of a PDF or a plain text file.
pub fn read_document_text(path: &Path, config: &PdfConfig) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let text = match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor = PdfExtractor::from_config(config);
            extractor.load(&data)?;
            debug!("PDF has {} pages", extractor.page_count());

            let pdf_type = extractor.analyze();
            debug!("PDF type: {:?}", pdf_type);
            if pdf_type == PdfType::Image {
                anyhow::bail!("PDF contains only images; no text can be extracted");
            }

            extractor.extract_text()?
        }
        "txt" => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    if text.trim().is_empty() {
        anyhow::bail!("No text could be extracted from {}", path.display());
    }

    Ok(text)
}

pub fn format_report(report: &ParseReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_csv(report: &ParseReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "order_number",
        "invoice_id",
        "order_date",
        "customer_name",
        "address",
        "city",
        "state",
        "pincode",
        "item_name",
        "size",
        "quantity",
        "color",
        "unit_price",
        "item_order_number",
        "order_total",
        "hsn_code",
    ])?;

    for order in &report.orders {
        for item in &order.line_items {
            wtr.write_record([
                &order.order_number,
                &order.invoice_id,
                &order.formatted_date(),
                &order.address.name,
                &order.address.format(),
                &order.address.city,
                &order.address.state,
                &order.address.pincode,
                &item.name,
                &item.size,
                &item.quantity.to_string(),
                &item.color,
                &item.unit_price.to_string(),
                &item.order_number,
                &order.total_amount.to_string(),
                &order.hsn_code,
            ])?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &ParseReport) -> String {
    let mut output = String::new();

    for order in &report.orders {
        output.push_str(&format!("Order: {}\n", order.order_number));
        output.push_str(&format!("Invoice: {}\n", order.invoice_id));
        output.push_str(&format!("Date: {}\n", order.formatted_date()));
        output.push_str(&format!("Customer: {}\n", order.address.name));
        output.push_str(&format!("  {}\n", order.address.format()));
        output.push_str("Items:\n");
        for item in &order.line_items {
            output.push_str(&format!(
                "  - {} ({}, {}) x{} @ Rs. {}\n",
                item.name, item.size, item.color, item.quantity, item.unit_price
            ));
        }
        output.push_str(&format!("Total: Rs. {}\n", order.total_amount));
        output.push_str(&format!("HSN: {}\n\n", order.hsn_code));
    }

    output.push_str(&format!(
        "{} orders from {} sections ({} dropped)\n",
        report.orders.len(),
        report.segment_count,
        report.dropped_segments.len()
    ));

    output
}
