//! Order and invoice record models produced by the extraction pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Size label used by the marketplace for all observed items.
pub const FREE_SIZE: &str = "Free Size";

/// Placeholder for an order or invoice identifier that could not be found.
pub const UNKNOWN_ID: &str = "UNKNOWN";

/// Customer address block with every field resolved.
///
/// Fields that could not be extracted hold the `Unknown ...` sentinels; the
/// record's [`RecordMetadata::missing_fields`] says which ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBlock {
    /// Customer name.
    pub name: String,

    /// First address line (house, street).
    pub address_line: String,

    /// Area or locality.
    pub area: String,

    /// City name.
    pub city: String,

    /// Full state name.
    pub state: String,

    /// Six digit postal code.
    pub pincode: String,
}

impl AddressBlock {
    pub const UNKNOWN_NAME: &'static str = "Unknown Customer";
    pub const UNKNOWN_ADDRESS: &'static str = "Unknown Address";
    pub const UNKNOWN_AREA: &'static str = "Unknown Area";
    pub const UNKNOWN_CITY: &'static str = "Unknown City";
    pub const UNKNOWN_STATE: &'static str = "Unknown State";
    pub const UNKNOWN_PINCODE: &'static str = "000000";

    /// Address with every field set to its sentinel.
    pub fn unknown() -> Self {
        Self::from_extracted(ExtractedAddress::default()).0
    }

    /// Substitute sentinels for missing fields.
    ///
    /// Returns the block and the names of the fields that were substituted.
    pub fn from_extracted(extracted: ExtractedAddress) -> (Self, Vec<String>) {
        let mut missing = Vec::new();
        let mut resolve = |value: Option<String>, field: &str, sentinel: &str| {
            value.unwrap_or_else(|| {
                missing.push(field.to_string());
                sentinel.to_string()
            })
        };

        let block = Self {
            name: resolve(extracted.name, "name", Self::UNKNOWN_NAME),
            address_line: resolve(extracted.address_line, "address_line", Self::UNKNOWN_ADDRESS),
            area: resolve(extracted.area, "area", Self::UNKNOWN_AREA),
            city: resolve(extracted.city, "city", Self::UNKNOWN_CITY),
            state: resolve(extracted.state, "state", Self::UNKNOWN_STATE),
            pincode: resolve(extracted.pincode, "pincode", Self::UNKNOWN_PINCODE),
        };

        (block, missing)
    }

    /// Format as a single line.
    pub fn format(&self) -> String {
        format!(
            "{}, {}, {}, {} - {}",
            self.address_line, self.area, self.city, self.state, self.pincode
        )
    }
}

impl Default for AddressBlock {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Address fields as found by the extractor, before sentinel substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

/// A single product line on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name as printed.
    pub name: String,

    /// Size label.
    pub size: String,

    /// Quantity, always at least 1.
    pub quantity: u32,

    /// Colour (free text, may be empty).
    pub color: String,

    /// Unit price in rupees.
    pub unit_price: Decimal,

    /// Marketplace per-item order number (e.g. `123456789012345_1`).
    pub order_number: String,
}

impl LineItem {
    /// Line total (unit price times quantity), `None` on overflow.
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// One parsed invoice section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Order identifier, possibly with a `_N` sub-order suffix.
    pub order_id: String,

    /// Invoice identifier.
    pub invoice_id: String,

    /// Order or invoice date.
    pub order_date: NaiveDate,

    /// Customer address.
    pub address: AddressBlock,

    /// Product lines, never empty.
    pub line_items: Vec<LineItem>,

    /// Total amount for this section.
    pub total_amount: Decimal,

    /// HSN (harmonized system) code.
    pub hsn_code: String,

    /// Position of the section in the document.
    pub segment_index: usize,

    /// Extraction metadata.
    pub metadata: RecordMetadata,
}

/// Metadata about how a record was extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Fields replaced by a sentinel or default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,

    /// Warnings raised while assembling the record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// True when the only line item is a synthesized placeholder.
    #[serde(default)]
    pub placeholder_item: bool,
}

/// A logical order built from one or more invoice records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Canonical order number (sub-order suffix stripped).
    pub order_number: String,

    /// Invoice identifier of the first contributing record.
    pub invoice_id: String,

    /// Customer address of the first contributing record.
    pub address: AddressBlock,

    /// Date of the first contributing record.
    pub order_date: NaiveDate,

    /// Items of all contributing records, in encounter order.
    pub line_items: Vec<LineItem>,

    /// Sum of the contributing records' totals.
    pub total_amount: Decimal,

    /// HSN code of the first contributing record.
    pub hsn_code: String,

    /// Number of invoice records merged into this order.
    pub segment_count: usize,
}

impl Order {
    /// Order date as `DD.MM.YYYY`.
    pub fn formatted_date(&self) -> String {
        self.order_date.format("%d.%m.%Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_address() {
        let addr = AddressBlock::unknown();
        assert_eq!(addr.name, "Unknown Customer");
        assert_eq!(addr.address_line, "Unknown Address");
        assert_eq!(addr.area, "Unknown Area");
        assert_eq!(addr.city, "Unknown City");
        assert_eq!(addr.state, "Unknown State");
        assert_eq!(addr.pincode, "000000");
    }

    #[test]
    fn test_partial_address_reports_missing() {
        let extracted = ExtractedAddress {
            name: Some("Jane Doe".to_string()),
            city: Some("Mumbai".to_string()),
            pincode: Some("400001".to_string()),
            ..Default::default()
        };

        let (block, missing) = AddressBlock::from_extracted(extracted);
        assert_eq!(block.name, "Jane Doe");
        assert_eq!(block.state, "Unknown State");
        assert_eq!(missing, vec!["address_line", "area", "state"]);
    }

    #[test]
    fn test_line_total() {
        let item = LineItem {
            name: "Kurti".to_string(),
            size: FREE_SIZE.to_string(),
            quantity: 3,
            color: "Blue".to_string(),
            unit_price: Decimal::new(24950, 2),
            order_number: String::new(),
        };
        assert_eq!(item.line_total(), Some(Decimal::new(74850, 2)));

        let huge = LineItem {
            unit_price: Decimal::MAX,
            ..item
        };
        assert_eq!(huge.line_total(), None);
    }

    #[test]
    fn test_formatted_date() {
        let order = Order {
            order_number: "1".to_string(),
            invoice_id: "INV1".to_string(),
            address: AddressBlock::unknown(),
            order_date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
            line_items: Vec::new(),
            total_amount: Decimal::ZERO,
            hsn_code: "6214".to_string(),
            segment_count: 1,
        };
        assert_eq!(order.formatted_date(), "05.07.2025");
    }
}
