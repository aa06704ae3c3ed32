//! Invoice text extraction module.

mod grouper;
mod parser;
pub mod rules;
pub mod segment;

pub use grouper::{canonical_order_number, group_records, OrderGrouper};
pub use parser::{BillParser, OrderParser, ParseReport, PLACEHOLDER_ITEM_NAME};
pub use segment::{segments, Segment, Segments};

use crate::error::ExtractionError;
use crate::models::order::InvoiceRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for turning one invoice section into a record.
pub trait RecordAssembler {
    /// Build the record for a section, or `None` when it holds neither
    /// line items nor a total.
    fn assemble(&self, segment: &Segment<'_>) -> Option<InvoiceRecord>;
}
