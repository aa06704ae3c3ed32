//! Customer address extraction from the `BILL TO / SHIP TO` block.

use regex::Regex;
use tracing::trace;

use super::patterns::{
    BILL_TO_MARKER, CITY_BEFORE_DASH_PINCODE, CITY_BEFORE_PINCODE, CITY_BETWEEN_COMMAS,
    PINCODE, STATE_ABBREVIATION, STATE_NAME,
};
use super::{floor_char_boundary, ExtractionMatch, FieldExtractor};
use crate::models::order::ExtractedAddress;

/// Lines following the name line that may belong to the address.
const MAX_ADDRESS_LINES: usize = 4;

/// Address block extractor.
pub struct AddressExtractor {
    window: usize,
}

impl AddressExtractor {
    /// Create an extractor reading `window` characters after the marker.
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    fn parse_block(&self, text: &str, marker_end: usize) -> ExtractedAddress {
        let window_end = floor_char_boundary(text, marker_end.saturating_add(self.window));
        let mut block = &text[marker_end..window_end];

        // Nothing after the pincode belongs to the address
        if let Some(pin) = PINCODE.find(block) {
            block = &block[..pin.end()];
        }

        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some((first, rest)) = lines.split_first() else {
            return ExtractedAddress::default();
        };

        let (name, first_remainder) = split_name(first);

        let mut address_lines: Vec<&str> = Vec::new();
        if let Some(remainder) = first_remainder {
            address_lines.push(remainder);
        }
        address_lines.extend(rest.iter().take(MAX_ADDRESS_LINES));

        let address_text = address_lines.join(", ");
        trace!(name = ?name, address = %address_text, "Parsing address block");

        let pincode = PINCODE.captures(&address_text).map(|caps| caps[1].to_string());
        let state_match = find_state(&address_text);
        let state = state_match.as_ref().map(|(full, _)| full.clone());
        let city = find_city(&address_text, &address_lines, state_match.as_ref());

        let mut parts = address_text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty());
        let address_line = parts.next().map(str::to_string);
        let area = parts.next().map(str::to_string);

        ExtractedAddress {
            name: name.filter(|n| !n.is_empty()),
            address_line,
            area,
            city,
            state,
            pincode,
        }
    }
}

impl FieldExtractor for AddressExtractor {
    type Output = ExtractionMatch<ExtractedAddress>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let marker = BILL_TO_MARKER.find(text)?;
        Some(self.to_match(text, marker))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        BILL_TO_MARKER
            .find_iter(text)
            .map(|marker| self.to_match(text, marker))
            .collect()
    }
}

impl AddressExtractor {
    fn to_match(&self, text: &str, marker: regex::Match<'_>) -> ExtractionMatch<ExtractedAddress> {
        let address = self.parse_block(text, marker.end());
        let resolved = [
            address.name.is_some(),
            address.address_line.is_some(),
            address.area.is_some(),
            address.city.is_some(),
            address.state.is_some(),
            address.pincode.is_some(),
        ]
        .iter()
        .filter(|found| **found)
        .count();

        ExtractionMatch::new(address, resolved as f32 / 6.0, marker.as_str())
            .with_position(marker.start(), marker.end())
    }
}

/// Extract the customer address following the first bill/ship-to marker.
///
/// Returns `None` when the section has no marker at all.
pub fn extract_address(text: &str, window: usize) -> Option<ExtractedAddress> {
    AddressExtractor::new(window).extract(text).map(|m| m.value)
}

/// Split the first block line into name and the rest of the line.
///
/// "Jane Doe - 12 Palm St" and "Jane Doe, 12 Palm St" both carry the
/// address on the name line.
fn split_name(line: &str) -> (Option<String>, Option<&str>) {
    let dash = line.find(" - ").map(|i| (i, 3));
    let comma = line.find(',').map(|i| (i, 1));

    let separator = match (dash, comma) {
        (Some(d), Some(c)) => Some(if d.0 < c.0 { d } else { c }),
        (d, c) => d.or(c),
    };

    match separator {
        Some((index, len)) => {
            let name = line[..index].trim().to_string();
            let rest = line[index + len..].trim();
            (Some(name), (!rest.is_empty()).then_some(rest))
        }
        None => {
            let name: String = line.chars().filter(|c| *c != '-' && *c != ',').collect();
            (Some(name.trim().to_string()), None)
        }
    }
}

/// Find the state, returning the full name and the text as printed.
fn find_state(text: &str) -> Option<(String, String)> {
    if let Some(caps) = STATE_NAME.captures(text) {
        let printed = caps[1].to_string();
        return Some((canonical_state_name(&printed), printed));
    }

    STATE_ABBREVIATION
        .captures(text)
        .and_then(|caps| {
            let printed = caps[1].to_string();
            expand_state_abbreviation(&printed).map(|full| (full.to_string(), printed))
        })
}

fn find_city(
    text: &str,
    lines: &[&str],
    state: Option<&(String, String)>,
) -> Option<String> {
    let is_state = |candidate: &str| {
        state.is_some_and(|(full, printed)| {
            candidate.eq_ignore_ascii_case(full) || candidate.eq_ignore_ascii_case(printed)
        })
    };

    let accept = |candidate: &str| {
        let candidate = candidate.trim().trim_end_matches(',').trim();
        (!candidate.is_empty() && !is_state(candidate)).then(|| candidate.to_string())
    };

    let before_state = state.and_then(|(_, printed)| {
        Regex::new(&format!(r"(?i)([A-Za-z ]+?)\s*,\s*{}", regex::escape(printed))).ok()
    });

    let mut strategies: Vec<&Regex> = vec![&*CITY_BEFORE_DASH_PINCODE];
    if let Some(pattern) = before_state.as_ref() {
        strategies.push(pattern);
    }
    strategies.push(&*CITY_BETWEEN_COMMAS);
    strategies.push(&*CITY_BEFORE_PINCODE);

    let from_patterns = strategies.into_iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1).and_then(|m| accept(m.as_str())))
    });

    if from_patterns.is_some() {
        return from_patterns;
    }

    // The city usually ends the second-to-last address line
    if lines.len() >= 2 {
        let line = lines[lines.len() - 2];
        let last = line
            .split(',')
            .flat_map(|part| part.split(" - "))
            .last()
            .map(str::trim)
            .unwrap_or_default();
        if last.chars().count() > 2 && !PINCODE.is_match(last) {
            return accept(last);
        }
    }

    None
}

fn canonical_state_name(printed: &str) -> String {
    printed
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn expand_state_abbreviation(abbr: &str) -> Option<&'static str> {
    let name = match abbr {
        "AP" => "Andhra Pradesh",
        "AR" => "Arunachal Pradesh",
        "AS" => "Assam",
        "BR" => "Bihar",
        "CG" => "Chhattisgarh",
        "DL" => "Delhi",
        "GA" => "Goa",
        "GJ" => "Gujarat",
        "HP" => "Himachal Pradesh",
        "HR" => "Haryana",
        "JH" => "Jharkhand",
        "KA" => "Karnataka",
        "KL" => "Kerala",
        "MH" => "Maharashtra",
        "ML" => "Meghalaya",
        "MN" => "Manipur",
        "MP" => "Madhya Pradesh",
        "MZ" => "Mizoram",
        "NL" => "Nagaland",
        "OR" => "Odisha",
        "PB" => "Punjab",
        "RJ" => "Rajasthan",
        "SK" => "Sikkim",
        "TN" => "Tamil Nadu",
        "TR" => "Tripura",
        "UK" => "Uttarakhand",
        "UP" => "Uttar Pradesh",
        "WB" => "West Bengal",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_single_line_block() {
        let text = "TAX INVOICE\nBILL TO / SHIP TO Jane Doe - 12 Palm St, Green Park, Mumbai, Maharashtra, 400001\nOrder No. 1";
        let address = extract_address(text, 500).unwrap();

        assert_eq!(
            address,
            ExtractedAddress {
                name: some("Jane Doe"),
                address_line: some("12 Palm St"),
                area: some("Green Park"),
                city: some("Mumbai"),
                state: some("Maharashtra"),
                pincode: some("400001"),
            }
        );
    }

    #[test]
    fn test_multi_line_block() {
        let text = "BILL TO / SHIP TO\nRavi Kumar\n4 Lake Road, Salt Lake\nKolkata, West Bengal - 700091\nPurchase Order No. 5";
        let address = extract_address(text, 500).unwrap();

        assert_eq!(address.name, some("Ravi Kumar"));
        assert_eq!(address.address_line, some("4 Lake Road"));
        assert_eq!(address.area, some("Salt Lake"));
        assert_eq!(address.city, some("Kolkata"));
        assert_eq!(address.state, some("West Bengal"));
        assert_eq!(address.pincode, some("700091"));
    }

    #[test]
    fn test_state_abbreviation_expanded() {
        let text = "SHIP TO\nAsha\nPlot 9, Baner, Pune, MH 411045";
        let address = extract_address(text, 500).unwrap();

        assert_eq!(address.state, some("Maharashtra"));
        assert_eq!(address.city, some("Pune"));
        assert_eq!(address.pincode, some("411045"));
    }

    #[test]
    fn test_lowercase_words_are_not_abbreviations() {
        let text = "BILL TO\nMeera\nup the hill, near temple";
        let address = extract_address(text, 500).unwrap();
        assert_eq!(address.state, None);
    }

    #[test]
    fn test_no_marker() {
        assert_eq!(extract_address("Order ID: 1\nJane Doe, Mumbai", 500), None);
    }

    #[test]
    fn test_missing_fields_are_none() {
        let text = "BILL TO\nJane Doe";
        let address = extract_address(text, 500).unwrap();

        assert_eq!(address.name, some("Jane Doe"));
        assert_eq!(address.pincode, None);
        assert_eq!(address.state, None);
        assert_eq!(address.city, None);
    }

    #[test]
    fn test_block_stops_after_pincode() {
        let text = "BILL TO\nJane\n1 Road, Area, Surat, Gujarat, 395007\nHSN 6214 Kolkata, West Bengal";
        let address = extract_address(text, 500).unwrap();
        assert_eq!(address.state, some("Gujarat"));
        assert_eq!(address.city, some("Surat"));
    }

    #[test]
    fn test_window_respects_utf8() {
        let text = format!("BILL TO\n{}", "₹".repeat(400));
        assert!(extract_address(&text, 500).is_some());
    }

    #[test]
    fn test_confidence_reflects_resolved_fields() {
        let extractor = AddressExtractor::new(500);
        let found = extractor.extract("BILL TO\nJane Doe").unwrap();
        assert!(found.confidence > 0.0 && found.confidence < 0.5);
    }
}
