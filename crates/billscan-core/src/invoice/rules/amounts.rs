//! Rupee amount parsing and section total extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{CURRENCY_AMOUNT, LABELED_TOTAL_PATTERNS, TOTAL_KEYWORD};
use super::{ExtractionMatch, FieldExtractor};

/// Extractor for amounts carrying a currency prefix (`₹`, `Rs`, `Rs.`).
#[derive(Debug, Default)]
pub struct CurrencyAmountExtractor;

impl CurrencyAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for CurrencyAmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        CURRENCY_AMOUNT
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let amount = parse_rupee_amount(caps.get(1)?.as_str())?;
                Some(
                    ExtractionMatch::new(amount, 0.8, full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }
}

/// Parse an Indian-formatted amount (e.g. "1,299.50" or "1,00,000").
///
/// Commas are grouping separators only; the decimal point is always `.`.
pub fn parse_rupee_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Find a section total printed on the invoice.
///
/// The first line mentioning "total" together with a positive currency
/// amount wins; failing that, labeled totals (`Total Amount`, `Grand Total`,
/// `Final Amount`, `Amount`) are tried in that order. Zero amounts never
/// count as a total.
pub fn extract_total_amount(text: &str) -> Option<Decimal> {
    let extractor = CurrencyAmountExtractor::new();
    let positive = |amount: &Decimal| *amount > Decimal::ZERO;

    let from_total_line = text
        .lines()
        .filter(|line| TOTAL_KEYWORD.is_match(line))
        .find_map(|line| extractor.extract(line).map(|m| m.value).filter(positive));

    if from_total_line.is_some() {
        return from_total_line;
    }

    LABELED_TOTAL_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|caps| parse_rupee_amount(&caps[1]))
            .find(positive)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_rupee_amount() {
        assert_eq!(parse_rupee_amount("299"), Some(dec("299")));
        assert_eq!(parse_rupee_amount("1,299.50"), Some(dec("1299.50")));
        assert_eq!(parse_rupee_amount("1,00,000"), Some(dec("100000")));
        assert_eq!(parse_rupee_amount(" 45.5 "), Some(dec("45.5")));
        assert_eq!(parse_rupee_amount("abc"), None);
    }

    #[test]
    fn test_currency_amounts() {
        let extractor = CurrencyAmountExtractor::new();
        let all = extractor.extract_all("Price ₹299 shipping Rs. 40 and rs 1,050.00");
        let values: Vec<Decimal> = all.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![dec("299"), dec("40"), dec("1050.00")]);
    }

    #[test]
    fn test_total_line_preferred() {
        let text = "Amount: 100\nSub line ₹50\nTotal payable ₹598.00";
        assert_eq!(extract_total_amount(text), Some(dec("598.00")));
    }

    #[test]
    fn test_labeled_total_without_currency() {
        assert_eq!(extract_total_amount("Grand Total: 1,499"), Some(dec("1499")));
        assert_eq!(extract_total_amount("Final Amount 750"), Some(dec("750")));
    }

    #[test]
    fn test_zero_total_line_is_skipped() {
        let text = "Total Discount Rs. 0\nGrand Total Rs. 750\n";
        assert_eq!(extract_total_amount(text), Some(dec("750")));
    }

    #[test]
    fn test_zero_labeled_total_is_skipped() {
        assert_eq!(extract_total_amount("Grand Total: 0.00"), None);
        assert_eq!(extract_total_amount("Grand Total: 0\nFinal Amount 420"), Some(dec("420")));
    }

    #[test]
    fn test_no_total() {
        assert_eq!(extract_total_amount("nothing to see"), None);
    }
}
