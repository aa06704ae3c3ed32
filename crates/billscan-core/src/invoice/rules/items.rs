//! Product line detection.
//!
//! Row families are tried in order and never mixed: the first family that
//! yields an accepted row supplies every item of the section. Sections
//! without recognizable rows fall back to SKU codes under a product
//! heading, then to a single generic `Item:` mention.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::patterns::{
    GENERIC_ITEM, ITEM_ROW_KEYWORD_NAME, ITEM_ROW_SIZE_QTY_COLOR, ITEM_ROW_WITH_SUBORDER,
    NON_PRODUCT_KEYWORDS, PRODUCT_SECTION_HEADING, SKU_PATTERNS, TOTAL_KEYWORD,
};
use super::floor_char_boundary;

/// Longest plausible product name.
const MAX_NAME_CHARS: usize = 100;

/// How far below the product heading SKU codes are looked for.
const SKU_SECTION_CHARS: usize = 500;

/// Colour used when the layout carries none.
pub const UNSPECIFIED_COLOR: &str = "Not specified";

/// Which strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// A `<name> Free Size <qty> <colour> [<order no>]` row.
    Row,
    /// A SKU code below a product heading.
    SkuSection,
    /// A generic `Item:`/`Product:` mention.
    Generic,
}

/// A product mention found in a section, before pricing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCandidate {
    pub name: String,
    pub quantity: u32,
    pub color: String,
    /// Per-item order number printed on the row, if any.
    pub order_number: Option<String>,
    /// SKU code for section-fallback candidates.
    pub sku: Option<String>,
    pub source: CandidateSource,
}

impl ItemCandidate {
    /// Literal text that locates this product in the section.
    pub fn anchors(&self) -> Vec<&str> {
        let mut anchors = Vec::new();
        match self.source {
            CandidateSource::SkuSection => {
                if let Some(sku) = &self.sku {
                    anchors.push(sku.as_str());
                }
            }
            CandidateSource::Row | CandidateSource::Generic => {
                anchors.push(self.name.as_str());
                if let Some(number) = &self.order_number {
                    anchors.push(number.as_str());
                }
            }
        }
        anchors
    }
}

/// Find the product lines of a section.
pub fn extract_item_candidates(text: &str) -> Vec<ItemCandidate> {
    let families: [(&str, &Regex); 3] = [
        ("row with sub-order", &*ITEM_ROW_WITH_SUBORDER),
        ("keyword row", &*ITEM_ROW_KEYWORD_NAME),
        ("size/qty/colour row", &*ITEM_ROW_SIZE_QTY_COLOR),
    ];

    for (family, pattern) in families {
        let rows: Vec<ItemCandidate> = pattern
            .captures_iter(text)
            .filter_map(|caps| row_candidate(&caps))
            .collect();

        if !rows.is_empty() {
            debug!(family, count = rows.len(), "Line items matched");
            return rows;
        }
    }

    let skus = sku_candidates(text);
    if !skus.is_empty() {
        debug!(count = skus.len(), "Line items taken from SKU section");
        return skus;
    }

    generic_candidate(text).into_iter().collect()
}

fn row_candidate(caps: &Captures<'_>) -> Option<ItemCandidate> {
    let name = caps.get(1)?.as_str().trim();
    if !is_product_name(name) {
        trace!(name, "Rejected row");
        return None;
    }

    let quantity: u32 = caps.get(2)?.as_str().parse().ok()?;
    if quantity == 0 {
        return None;
    }

    Some(ItemCandidate {
        name: name.to_string(),
        quantity,
        color: caps.get(3).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        order_number: caps.get(4).map(|m| m.as_str().to_string()),
        sku: None,
        source: CandidateSource::Row,
    })
}

fn is_product_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= MAX_NAME_CHARS
        && !NON_PRODUCT_KEYWORDS.is_match(name)
}

/// The lines below the product heading, up to a blank line or a total.
fn product_section(text: &str) -> Option<&str> {
    let heading = PRODUCT_SECTION_HEADING.find(text)?;
    let line_end = text[heading.end()..].find('\n')? + heading.end() + 1;

    let end = floor_char_boundary(text, line_end + SKU_SECTION_CHARS);
    let mut section = &text[line_end..end];

    if let Some(blank) = section.find("\n\n") {
        section = &section[..blank];
    }
    if let Some(total) = TOTAL_KEYWORD.find(section) {
        section = &section[..total.start()];
    }

    Some(section)
}

fn sku_candidates(text: &str) -> Vec<ItemCandidate> {
    let Some(section) = product_section(text) else {
        return Vec::new();
    };

    for pattern in SKU_PATTERNS.iter() {
        let found: Vec<ItemCandidate> = pattern
            .captures_iter(section)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let sku = caps.get(1)?.as_str().to_string();
                let name = name_near_sku(section, full.start(), full.end())
                    .unwrap_or_else(|| format!("Product {}", sku));

                Some(ItemCandidate {
                    name,
                    quantity: 1,
                    color: UNSPECIFIED_COLOR.to_string(),
                    order_number: None,
                    sku: Some(sku),
                    source: CandidateSource::SkuSection,
                })
            })
            .collect();

        if !found.is_empty() {
            return found;
        }
    }

    Vec::new()
}

/// The rest of the SKU's line, or the line above it.
fn name_near_sku(section: &str, start: usize, end: usize) -> Option<String> {
    let line_start = section[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = section[end..].find('\n').map_or(section.len(), |i| end + i);

    let clean = |s: &str| {
        let name = s.trim().trim_matches(|c: char| matches!(c, '-' | ':' | '|' | ',')).trim();
        let letters = name.chars().filter(|c| c.is_alphabetic()).count();
        (letters >= 3 && is_product_name(name)).then(|| name.to_string())
    };

    let same_line = format!("{} {}", &section[line_start..start], &section[end..line_end]);
    if let Some(name) = clean(&same_line) {
        return Some(name);
    }

    if line_start == 0 {
        return None;
    }

    section[..line_start - 1]
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| clean(line))
}

fn generic_candidate(text: &str) -> Option<ItemCandidate> {
    let caps = GENERIC_ITEM.captures(text)?;
    let name = caps.get(1)?.as_str().trim();
    if !is_product_name(name) {
        return None;
    }

    Some(ItemCandidate {
        name: name.to_string(),
        quantity: 1,
        color: UNSPECIFIED_COLOR.to_string(),
        order_number: None,
        sku: None,
        source: CandidateSource::Generic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_row_with_suborder() {
        let text = "Product Details\nSKU Size Qty Color Order No.\nStyleStole Free Size 2 Red 123456789012345_1\nTotal Rs.598";
        let items = extract_item_candidates(text);

        assert_eq!(
            items,
            vec![ItemCandidate {
                name: "StyleStole".to_string(),
                quantity: 2,
                color: "Red".to_string(),
                order_number: Some("123456789012345_1".to_string()),
                sku: None,
                source: CandidateSource::Row,
            }]
        );
    }

    #[test]
    fn test_multiple_rows_keep_document_order() {
        let text = "Cotton Kurti Set Free Size 1 Blue 111111111111111_1\nSilk Dupatta Free Size 3 Light Pink 111111111111111_2";
        let items = extract_item_candidates(text);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Cotton Kurti Set");
        assert_eq!(items[1].name, "Silk Dupatta");
        assert_eq!(items[1].quantity, 3);
        assert_eq!(items[1].color, "Light Pink");
    }

    #[test]
    fn test_rows_mentioning_totals_rejected() {
        let text = "Invoice Total Free Size 1 Red 123456789012345_1";
        assert!(extract_item_candidates(text).is_empty());
    }

    #[test]
    fn test_row_without_order_number() {
        let text = "Floral Printed Stole Freesize 1 Green";
        let items = extract_item_candidates(text);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Floral Printed Stole");
        assert_eq!(items[0].color, "Green");
        assert_eq!(items[0].order_number, None);
    }

    #[test]
    fn test_families_are_not_mixed() {
        // The second line only fits the loose family and must not be added
        let text = "StyleStole Free Size 2 Red 123456789012345_1\nPlain Scarf Free Size 1 Blue";
        let items = extract_item_candidates(text);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "StyleStole");
    }

    #[test]
    fn test_sku_section_fallback() {
        let text = "Product Details\nCotton Dupatta SKU: DUP-001\nSilk Stole\nSKU: STL-9\n\nTotal ₹500";
        let items = extract_item_candidates(text);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Cotton Dupatta");
        assert_eq!(items[0].sku.as_deref(), Some("DUP-001"));
        assert_eq!(items[1].name, "Silk Stole");
        assert_eq!(items[1].color, UNSPECIFIED_COLOR);
        assert_eq!(items[1].source, CandidateSource::SkuSection);
    }

    #[test]
    fn test_sku_without_name_gets_placeholder_name() {
        let text = "Description\nSKU: 42AB";
        let items = extract_item_candidates(text);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Product 42AB");
    }

    #[test]
    fn test_generic_item_fallback() {
        let items = extract_item_candidates("Item: Handloom Shawl\nPaid");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Handloom Shawl");
        assert_eq!(items[0].source, CandidateSource::Generic);
    }

    #[test]
    fn test_nothing_found() {
        assert!(extract_item_candidates("Order ID: 1\nTotal Rs. 300").is_empty());
    }

    #[test]
    fn test_anchors_by_source() {
        let row = ItemCandidate {
            name: "StyleStole".to_string(),
            quantity: 1,
            color: String::new(),
            order_number: Some("1_1".to_string()),
            sku: None,
            source: CandidateSource::Row,
        };
        assert_eq!(row.anchors(), vec!["StyleStole", "1_1"]);

        let sku = ItemCandidate {
            sku: Some("DUP-001".to_string()),
            source: CandidateSource::SkuSection,
            ..row
        };
        assert_eq!(sku.anchors(), vec!["DUP-001"]);
    }
}
