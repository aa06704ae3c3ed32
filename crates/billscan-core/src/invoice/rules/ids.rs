//! Order, invoice and HSN identifier extraction.

use super::patterns::{HSN_PATTERNS, INVOICE_ID_PATTERNS, ORDER_ID_PATTERNS};
use super::{ranked_captures, ranked_first, ExtractionMatch, FieldExtractor};

/// Order identifier extractor.
///
/// Labeled forms (`Order ID:`, `Order No.`, `Order:`) win over a bare
/// number of twelve or more digits.
#[derive(Debug, Default)]
pub struct OrderIdExtractor;

impl OrderIdExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for OrderIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        ranked_first(text, &ORDER_ID_PATTERNS)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ranked_captures(text, &ORDER_ID_PATTERNS)
    }
}

/// Invoice identifier extractor.
#[derive(Debug, Default)]
pub struct InvoiceIdExtractor;

impl InvoiceIdExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for InvoiceIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        ranked_first(text, &INVOICE_ID_PATTERNS)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ranked_captures(text, &INVOICE_ID_PATTERNS)
    }
}

/// HSN (harmonized system) code extractor.
#[derive(Debug, Default)]
pub struct HsnCodeExtractor;

impl HsnCodeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for HsnCodeExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        ranked_first(text, &HSN_PATTERNS)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ranked_captures(text, &HSN_PATTERNS)
    }
}

/// Extract the order identifier from a section.
pub fn extract_order_id(text: &str) -> Option<String> {
    OrderIdExtractor::new().extract(text).map(|m| m.value)
}

/// Extract the invoice identifier from a section.
pub fn extract_invoice_id(text: &str) -> Option<String> {
    InvoiceIdExtractor::new().extract(text).map(|m| m.value)
}

/// Extract the HSN code from a section.
pub fn extract_hsn_code(text: &str) -> Option<String> {
    HsnCodeExtractor::new().extract(text).map(|m| m.value)
}
