//! Core library for reseller invoice processing.
//!
//! This crate provides:
//! - PDF text extraction
//! - Invoice field extraction (addresses, dates, line items, prices, totals)
//! - Grouping of invoice sections into orders
//! - Duplicate-skipping order storage

pub mod error;
pub mod models;
pub mod pdf;
pub mod invoice;
pub mod store;

pub use error::{BillscanError, ExtractionError, PdfError, Result, StoreError};
pub use models::config::BillscanConfig;
pub use models::order::{AddressBlock, ExtractedAddress, InvoiceRecord, LineItem, Order, RecordMetadata};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, PdfType};
pub use invoice::{group_records, BillParser, OrderParser, ParseReport, RecordAssembler};
pub use store::{store_orders, MemoryOrderStore, OrderStore, StoreOutcome, UploadSummary};

/// Read a PDF and return its text, pages in order.
pub fn extract_pdf_text(data: &[u8], config: &models::config::PdfConfig) -> Result<String> {
    let mut extractor = PdfExtractor::from_config(config);
    extractor.load(data)?;
    Ok(extractor.extract_text()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::PdfConfig;

    #[test]
    fn test_extract_pdf_text_rejects_garbage() {
        let result = extract_pdf_text(b"%PDF-nonsense", &PdfConfig::default());
        assert!(matches!(result, Err(BillscanError::Pdf(PdfError::Parse(_)))));
    }
}
