//! Unit price resolution for a located product.

use regex::Regex;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::amounts::parse_rupee_amount;
use super::items::ItemCandidate;
use super::patterns::{FALLBACK_AMOUNT_PATTERNS, PRICE_PATTERNS, TOTAL_KEYWORD};
use super::{ceil_char_boundary, floor_char_boundary};

/// Anchors shorter than this match too much to be useful.
const MIN_ANCHOR_CHARS: usize = 4;

/// How far back on a line a "total" label is looked for.
const TOTAL_LABEL_LOOKBACK: usize = 24;

/// Index of the bare-number entry in [`PRICE_PATTERNS`].
const BARE_NUMBER_PATTERN: usize = 3;

/// Where a resolved price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// An amount near a mention of the product.
    Nearby,
    /// Derived from amounts anywhere in the section.
    SectionFallback,
    /// The configured default.
    Default,
}

/// A resolved unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrice {
    pub value: Decimal,
    pub source: PriceSource,
}

/// Unit price resolver.
///
/// Always produces a price: a nearby amount in `[50, 5000]`, an amount
/// derived from the section, or the default.
#[derive(Debug, Clone)]
pub struct PriceResolver {
    radius: usize,
    default_price: Decimal,
}

impl PriceResolver {
    pub const MIN_PRICE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
    pub const MAX_PRICE: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);

    pub fn new(radius: usize, default_price: Decimal) -> Self {
        Self {
            radius,
            default_price,
        }
    }

    /// Resolve the unit price of `candidate` within `text`.
    pub fn resolve(&self, text: &str, candidate: &ItemCandidate) -> ResolvedPrice {
        let quantity = Decimal::from(candidate.quantity.max(1));

        if let Some(value) = self.nearby_price(text, candidate, quantity) {
            debug!(item = %candidate.name, price = %value, "Price found near product");
            return ResolvedPrice {
                value,
                source: PriceSource::Nearby,
            };
        }

        if let Some(value) = section_fallback_price(text, quantity) {
            debug!(item = %candidate.name, price = %value, "Price derived from section amounts");
            return ResolvedPrice {
                value,
                source: PriceSource::SectionFallback,
            };
        }

        debug!(item = %candidate.name, price = %self.default_price, "Using default price");
        ResolvedPrice {
            value: self.default_price,
            source: PriceSource::Default,
        }
    }

    fn nearby_price(&self, text: &str, candidate: &ItemCandidate, quantity: Decimal) -> Option<Decimal> {
        let mut best: Option<(usize, Decimal)> = None;

        for anchor in anchor_patterns(candidate) {
            for found in anchor.find_iter(text) {
                let start = floor_char_boundary(text, found.start().saturating_sub(self.radius));
                let end = ceil_char_boundary(text, found.end().saturating_add(self.radius));
                let window = &text[start..end];

                for (index, pattern) in PRICE_PATTERNS.iter().enumerate() {
                    for caps in pattern.captures_iter(window) {
                        let Some(amount) = caps.get(1) else {
                            continue;
                        };
                        let position = start + amount.start();

                        if index == BARE_NUMBER_PATTERN && is_part_of_token(text, position, start + amount.end()) {
                            continue;
                        }

                        let Some(mut value) = parse_rupee_amount(amount.as_str()) else {
                            continue;
                        };

                        // A line total covers every unit on the row
                        if has_total_label(text, position) {
                            value = (value / quantity).round_dp(2);
                        }

                        if value < Self::MIN_PRICE || value > Self::MAX_PRICE {
                            continue;
                        }

                        let distance = position.abs_diff(found.start());
                        trace!(anchor = found.as_str(), %value, distance, "Price candidate");

                        if best.map_or(true, |(d, _)| distance < d) {
                            best = Some((distance, value));
                        }
                    }
                }
            }
        }

        best.map(|(_, value)| value)
    }
}

fn anchor_patterns(candidate: &ItemCandidate) -> Vec<Regex> {
    let mut patterns: Vec<Regex> = candidate
        .anchors()
        .into_iter()
        .filter(|anchor| anchor.chars().count() >= MIN_ANCHOR_CHARS)
        .filter_map(|anchor| Regex::new(&format!("(?i){}", regex::escape(anchor))).ok())
        .collect();

    if let Ok(size_qty) = Regex::new(&format!(r"(?i)Free\s?Size\s+{}\b", candidate.quantity)) {
        patterns.push(size_qty);
    }

    patterns
}

/// True when the amount is labeled as a total earlier on its line.
fn has_total_label(text: &str, position: usize) -> bool {
    let line_start = text[..position].rfind('\n').map_or(0, |i| i + 1);
    let lookback = floor_char_boundary(text, position.saturating_sub(TOTAL_LABEL_LOOKBACK));
    let from = line_start.max(lookback);
    TOTAL_KEYWORD.is_match(&text[from..position])
}

/// Bare numbers glued to `/`, `-` or `.` belong to dates, phone numbers or
/// identifiers rather than prices.
fn is_part_of_token(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let mut after = text[end..].chars();
    let next = after.next();
    let next_next = after.next();

    matches!(before, Some('/' | '-' | '.' | '_'))
        || matches!(next, Some('/' | '-' | '_'))
        || (next == Some('.') && next_next.is_some_and(|c| c.is_ascii_digit()))
}

/// Derive a unit price from currency amounts anywhere in the section.
///
/// Amounts in `[50, 10000]` are divided by the quantity; the first result in
/// `[50, 2000]` wins. Failing that, the smallest amount in `[100, 1000]`.
fn section_fallback_price(text: &str, quantity: Decimal) -> Option<Decimal> {
    let amounts: Vec<Decimal> = FALLBACK_AMOUNT_PATTERNS
        .iter()
        .flat_map(|pattern| {
            pattern
                .captures_iter(text)
                .filter_map(|caps| parse_rupee_amount(&caps[1]))
                .collect::<Vec<_>>()
        })
        .filter(|amount| *amount >= Decimal::from(50) && *amount <= Decimal::from(10_000))
        .collect();

    let per_unit = amounts.iter().find_map(|amount| {
        let unit = (*amount / quantity).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        (unit >= Decimal::from(50) && unit <= Decimal::from(2000)).then_some(unit)
    });

    per_unit.or_else(|| {
        amounts
            .into_iter()
            .filter(|amount| *amount >= Decimal::from(100) && *amount <= Decimal::from(1000))
            .min()
    })
}
