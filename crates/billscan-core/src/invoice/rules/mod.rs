//! Rule-based field extractors for marketplace invoices.

pub mod address;
pub mod amounts;
pub mod dates;
pub mod ids;
pub mod items;
pub mod patterns;
pub mod price;

pub use address::{extract_address, AddressExtractor};
pub use amounts::{extract_total_amount, parse_rupee_amount, CurrencyAmountExtractor};
pub use dates::{extract_order_date, resolve_numeric_date, DateExtractor};
pub use ids::{extract_hsn_code, extract_invoice_id, extract_order_id, HsnCodeExtractor, InvoiceIdExtractor, OrderIdExtractor};
pub use items::{extract_item_candidates, CandidateSource, ItemCandidate, UNSPECIFIED_COLOR};
pub use price::{PriceResolver, PriceSource, ResolvedPrice};

use regex::Regex;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            confidence: self.confidence,
            position: self.position,
            source: self.source,
        }
    }
}

/// All first-group captures of a ranked pattern list, in rank order.
///
/// Within one pattern, matches are in document order.
pub(crate) fn ranked_captures(text: &str, patterns: &[(Regex, f32)]) -> Vec<ExtractionMatch<String>> {
    let mut results = Vec::new();

    for (pattern, confidence) in patterns {
        for caps in pattern.captures_iter(text) {
            let (Some(full), Some(group)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = group.as_str().trim();
            if value.is_empty() {
                continue;
            }
            results.push(
                ExtractionMatch::new(value.to_string(), *confidence, full.as_str())
                    .with_position(full.start(), full.end()),
            );
        }
    }

    results
}

/// First capture of the highest-ranked pattern that matches.
pub(crate) fn ranked_first(text: &str, patterns: &[(Regex, f32)]) -> Option<ExtractionMatch<String>> {
    patterns.iter().find_map(|(pattern, confidence)| {
        let caps = pattern.captures(text)?;
        let full = caps.get(0)?;
        let value = caps.get(1)?.as_str().trim();
        (!value.is_empty()).then(|| {
            ExtractionMatch::new(value.to_string(), *confidence, full.as_str())
                .with_position(full.start(), full.end())
        })
    })
}

/// Clamp a byte offset down to the nearest char boundary.
pub(crate) fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Clamp a byte offset up to the nearest char boundary.
pub(crate) fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::patterns::ORDER_ID_PATTERNS;

    #[test]
    fn test_ranked_first_prefers_rank_over_position() {
        let text = "123456789012345678 appears first, Order ID: 42";
        let found = ranked_first(text, &ORDER_ID_PATTERNS).unwrap();
        assert_eq!(found.value, "42");
        assert_eq!(found.confidence, 0.95);
    }

    #[test]
    fn test_ranked_captures_lists_every_rank() {
        let text = "Order ID: 42 and 123456789012345678";
        let all = ranked_captures(text, &ORDER_ID_PATTERNS);
        assert_eq!(all.first().map(|m| m.value.as_str()), Some("42"));
        assert!(all.iter().any(|m| m.value == "123456789012345678"));
    }

    #[test]
    fn test_char_boundaries() {
        let text = "a₹b";
        // '₹' occupies bytes 1..4
        assert_eq!(floor_char_boundary(text, 2), 1);
        assert_eq!(ceil_char_boundary(text, 2), 4);
        assert_eq!(floor_char_boundary(text, 99), text.len());
    }
}
