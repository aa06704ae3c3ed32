//! Order date extraction.

use chrono::NaiveDate;

use super::patterns::{ISO_DATE, LABELED_DATE_PATTERNS, NUMERIC_DATE, NUMERIC_DATE_PARTS, TEXT_DATE};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
///
/// Ambiguous `N/M/YYYY` tokens are resolved against a reference date,
/// normally today.
pub struct DateExtractor {
    reference: NaiveDate,
}

impl DateExtractor {
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    fn numeric_matches(&self, text: &str, pattern: &regex::Regex, confidence: f32) -> Vec<ExtractionMatch<NaiveDate>> {
        pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let date = resolve_numeric_date(caps.get(1)?.as_str(), self.reference)?;
                Some(
                    ExtractionMatch::new(date, confidence, full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }

    fn iso_matches(&self, text: &str) -> Vec<ExtractionMatch<NaiveDate>> {
        ISO_DATE
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let year: i32 = caps[1].parse().ok()?;
                let month: u32 = caps[2].parse().ok()?;
                let day: u32 = caps[3].parse().ok()?;
                let date = NaiveDate::from_ymd_opt(year, month, day)?;
                Some(
                    ExtractionMatch::new(date, 0.9, full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }

    fn text_matches(&self, text: &str) -> Vec<ExtractionMatch<NaiveDate>> {
        TEXT_DATE
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let day: u32 = caps[1].parse().ok()?;
                let month = month_to_number(&caps[2])?;
                let year: i32 = caps[3].parse().ok()?;
                let date = NaiveDate::from_ymd_opt(year, month, day)?;
                Some(
                    ExtractionMatch::new(date, 0.8, full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        for (pattern, confidence) in LABELED_DATE_PATTERNS.iter() {
            if let Some(found) = self.numeric_matches(text, pattern, *confidence).into_iter().next() {
                return Some(found);
            }
        }

        if let Some(found) = self.numeric_matches(text, &NUMERIC_DATE, 0.7).into_iter().next() {
            return Some(found);
        }

        if let Some(found) = self.iso_matches(text).into_iter().next() {
            return Some(found);
        }

        self.text_matches(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for (pattern, confidence) in LABELED_DATE_PATTERNS.iter() {
            results.extend(self.numeric_matches(text, pattern, *confidence));
        }
        results.extend(self.numeric_matches(text, &NUMERIC_DATE, 0.7));
        results.extend(self.iso_matches(text));
        results.extend(self.text_matches(text));

        // Labeled and bare patterns overlap; keep the first hit per position
        let mut seen = Vec::new();
        results.retain(|m| {
            let key = (m.value, m.position.map(|(_, end)| end));
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });

        results
    }
}

/// Extract the order date from a section.
pub fn extract_order_date(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    DateExtractor::new(reference).extract(text).map(|m| m.value)
}

/// Resolve an `N/M/YYYY` token (any of `/`, `-`, `.` as separator).
///
/// A first component above 12 can only be a day. Otherwise both the
/// DD/MM and MM/DD readings are built and the one closer to `reference`
/// wins; for documents far from `reference` this guess can be wrong.
pub fn resolve_numeric_date(token: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let caps = NUMERIC_DATE_PARTS.captures(token.trim())?;
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    if first > 12 {
        return NaiveDate::from_ymd_opt(year, second, first);
    }

    let day_first = NaiveDate::from_ymd_opt(year, second, first);
    let month_first = NaiveDate::from_ymd_opt(year, first, second);

    match (day_first, month_first) {
        (Some(dd), Some(mm)) => {
            let diff_dd = (reference - dd).num_days().abs();
            let diff_mm = (reference - mm).num_days().abs();
            Some(if diff_dd < diff_mm { dd } else { mm })
        }
        (dd, mm) => dd.or(mm),
    }
}

fn month_to_number(month: &str) -> Option<u32> {
    let number = match month.to_lowercase().as_str() {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    };
    Some(number)
}
