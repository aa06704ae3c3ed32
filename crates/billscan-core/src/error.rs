//! Error types for the billscan-core library.

use thiserror::Error;

/// Main error type for the billscan library.
#[derive(Error, Debug)]
pub enum BillscanError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Order storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to invoice extraction.
///
/// Field-level and segment-level misses never surface here; only a document
/// with nothing extractable at all is an error.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractionError {
    /// The document text is empty or whitespace only.
    #[error("document text is empty")]
    EmptyText,

    /// No invoice marker (or no non-empty section after it) was found.
    #[error("no '{marker}' sections found in document")]
    NoSegments { marker: String },
}

/// Errors raised by order storage backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Owner identifier was empty.
    #[error("owner identifier must not be empty")]
    MissingOwner,
}

/// Result type for the billscan library.
pub type Result<T> = std::result::Result<T, BillscanError>;
