//! Document parser: segmentation, per-segment assembly and grouping.

use std::time::Instant;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::order::{
    AddressBlock, InvoiceRecord, LineItem, Order, RecordMetadata, FREE_SIZE, UNKNOWN_ID,
};

use super::grouper::OrderGrouper;
use super::rules::{
    extract_address, extract_hsn_code, extract_invoice_id, extract_item_candidates,
    extract_order_date, extract_order_id, extract_total_amount, CandidateSource, PriceResolver,
    PriceSource,
};
use super::segment::{segments, Segment};
use super::{RecordAssembler, Result};

/// Name of the item synthesized for sections with a total but no products.
pub const PLACEHOLDER_ITEM_NAME: &str = "Product";

/// Result of parsing one document.
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    /// Orders, one per canonical order number, in encounter order.
    pub orders: Vec<Order>,
    /// Records of the sections that were kept.
    pub records: Vec<InvoiceRecord>,
    /// Number of non-empty sections found.
    pub segment_count: usize,
    /// Indices of sections that yielded neither items nor a total.
    pub dropped_segments: Vec<usize>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for order parsing.
pub trait OrderParser {
    /// Parse all orders from document text.
    fn parse(&self, text: &str) -> Result<ParseReport>;
}

/// Rule-based parser for marketplace invoice exports.
#[derive(Debug, Clone)]
pub struct BillParser {
    marker: String,
    address_window: usize,
    default_hsn_code: String,
    default_unit_price: Decimal,
    prices: PriceResolver,
    reference_date: Option<NaiveDate>,
}

impl BillParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            marker: config.invoice_marker.clone(),
            address_window: config.address_window,
            default_hsn_code: config.default_hsn_code.clone(),
            default_unit_price: config.default_unit_price,
            prices: PriceResolver::new(config.price_search_radius, config.default_unit_price),
            reference_date: None,
        }
    }

    /// Set the section marker.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Fix the date used to disambiguate `N/M/YYYY` dates and to fill in
    /// missing ones. Defaults to today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    fn reference_date(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(|| Local::now().date_naive())
    }

    fn build_items(&self, text: &str, order_id: &str, metadata: &mut RecordMetadata) -> Vec<LineItem> {
        let mut printed_total: Option<Option<Decimal>> = None;

        extract_item_candidates(text)
            .into_iter()
            .map(|candidate| {
                let unit_price = match candidate.source {
                    CandidateSource::Generic => {
                        let total = *printed_total.get_or_insert_with(|| extract_total_amount(text));
                        total
                            .filter(|t| *t > Decimal::ZERO)
                            .unwrap_or(self.default_unit_price)
                    }
                    CandidateSource::Row | CandidateSource::SkuSection => {
                        let resolved = self.prices.resolve(text, &candidate);
                        if resolved.source == PriceSource::Default {
                            metadata.warnings.push(format!(
                                "no price found for '{}', using {}",
                                candidate.name, resolved.value
                            ));
                        }
                        resolved.value
                    }
                };

                LineItem {
                    order_number: candidate.order_number.unwrap_or_else(|| order_id.to_string()),
                    name: candidate.name,
                    size: FREE_SIZE.to_string(),
                    quantity: candidate.quantity,
                    color: candidate.color,
                    unit_price,
                }
            })
            .collect()
    }

    fn assemble_at(&self, segment: &Segment<'_>, reference: NaiveDate) -> Option<InvoiceRecord> {
        let text = segment.text;
        let mut metadata = RecordMetadata::default();

        let extracted = extract_address(text, self.address_window);
        if extracted.is_none() {
            metadata.warnings.push("no BILL TO / SHIP TO section".to_string());
        }
        let (address, missing) = AddressBlock::from_extracted(extracted.unwrap_or_default());
        metadata.missing_fields.extend(missing);

        let mut or_missing = |value: Option<String>, field: &str, fallback: &str| {
            value.unwrap_or_else(|| {
                metadata.missing_fields.push(field.to_string());
                fallback.to_string()
            })
        };

        let order_id = or_missing(extract_order_id(text), "order_id", UNKNOWN_ID);
        let invoice_id = or_missing(extract_invoice_id(text), "invoice_id", UNKNOWN_ID);
        let hsn_code = or_missing(extract_hsn_code(text), "hsn_code", self.default_hsn_code.as_str());

        let order_date = extract_order_date(text, reference).unwrap_or_else(|| {
            metadata.missing_fields.push("order_date".to_string());
            reference
        });

        let mut line_items = self.build_items(text, &order_id, &mut metadata);

        let items_total = line_items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?));
        let total_amount = match items_total {
            Some(total) if total > Decimal::ZERO => total,
            Some(_) => extract_total_amount(text).unwrap_or(Decimal::ZERO),
            None => {
                metadata
                    .warnings
                    .push("line item totals overflow, using the printed total".to_string());
                extract_total_amount(text).unwrap_or(Decimal::ZERO)
            }
        };

        if line_items.is_empty() && total_amount > Decimal::ZERO {
            debug!(segment = segment.index, %total_amount, "No items found, adding placeholder");
            line_items.push(LineItem {
                name: PLACEHOLDER_ITEM_NAME.to_string(),
                size: FREE_SIZE.to_string(),
                quantity: 1,
                color: String::new(),
                unit_price: total_amount,
                order_number: String::new(),
            });
            metadata.placeholder_item = true;
            metadata
                .warnings
                .push("no line items found, placeholder item added".to_string());
        }

        if line_items.is_empty() {
            return None;
        }

        Some(InvoiceRecord {
            order_id,
            invoice_id,
            order_date,
            address,
            line_items,
            total_amount,
            hsn_code,
            segment_index: segment.index,
            metadata,
        })
    }
}

impl Default for BillParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordAssembler for BillParser {
    fn assemble(&self, segment: &Segment<'_>) -> Option<InvoiceRecord> {
        self.assemble_at(segment, self.reference_date())
    }
}

impl OrderParser for BillParser {
    fn parse(&self, text: &str) -> Result<ParseReport> {
        let start = Instant::now();

        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyText);
        }

        if self.marker.is_empty() || !text.contains(&self.marker) {
            return Err(ExtractionError::NoSegments {
                marker: self.marker.clone(),
            });
        }

        info!("Parsing orders from {} characters of text", text.len());

        let reference = self.reference_date();
        let mut grouper = OrderGrouper::new();
        let mut records = Vec::new();
        let mut dropped_segments = Vec::new();
        let mut warnings = Vec::new();
        let mut segment_count = 0;

        for segment in segments(text, &self.marker) {
            segment_count += 1;

            match self.assemble_at(&segment, reference) {
                Some(record) => {
                    debug!(
                        segment = segment.index,
                        order = %record.order_id,
                        items = record.line_items.len(),
                        total = %record.total_amount,
                        "Assembled invoice record"
                    );
                    warnings.extend(
                        record
                            .metadata
                            .warnings
                            .iter()
                            .map(|w| format!("segment {}: {}", segment.index, w)),
                    );
                    grouper.push(record.clone());
                    records.push(record);
                }
                None => {
                    warn!(segment = segment.index, "Segment has no line items and no total, dropping");
                    dropped_segments.push(segment.index);
                }
            }
        }

        if segment_count == 0 {
            return Err(ExtractionError::NoSegments {
                marker: self.marker.clone(),
            });
        }

        if records.is_empty() {
            warnings.push(format!("all {} segments were dropped", segment_count));
        }

        let unknown = records.iter().filter(|r| r.order_id == UNKNOWN_ID).count();
        if unknown > 1 {
            warnings.push(format!(
                "{} segments without an order id were merged into one order",
                unknown
            ));
        }

        warnings.extend(
            grouper
                .overflowed()
                .iter()
                .map(|order| format!("order {}: total overflow, later section totals not added", order)),
        );

        let orders = grouper.finish();

        info!(
            "Parsed {} orders from {} segments ({} dropped) in {}ms",
            orders.len(),
            segment_count,
            dropped_segments.len(),
            start.elapsed().as_millis()
        );

        Ok(ParseReport {
            orders,
            records,
            segment_count,
            dropped_segments,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
