//! Configuration structures for the billscan pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BillscanError, Result};

/// Main configuration for the billscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillscanConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Order storage configuration.
    pub store: StoreConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider a PDF as text-based.
    pub min_text_length: usize,

    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            max_pages: 0,
        }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Text that starts every invoice section.
    pub invoice_marker: String,

    /// Characters read after the BILL TO marker.
    pub address_window: usize,

    /// Characters searched on each side of a product mention for its price.
    pub price_search_radius: usize,

    /// Unit price used when no price can be found.
    pub default_unit_price: Decimal,

    /// HSN code used when none is printed.
    pub default_hsn_code: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            invoice_marker: "TAX INVOICE".to_string(),
            address_window: 500,
            price_search_radius: 200,
            default_unit_price: Decimal::from(299),
            default_hsn_code: "6214".to_string(),
        }
    }
}

/// Order storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Owner identifier attached to stored orders.
    pub owner: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            owner: "local".to_string(),
        }
    }
}

impl BillscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| BillscanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| BillscanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BillscanConfig =
            serde_json::from_str(r#"{"extraction": {"invoice_marker": "INVOICE"}}"#).unwrap();

        assert_eq!(config.extraction.invoice_marker, "INVOICE");
        assert_eq!(config.extraction.price_search_radius, 200);
        assert_eq!(config.extraction.default_unit_price, Decimal::from(299));
        assert_eq!(config.pdf.min_text_length, 50);
        assert_eq!(config.store.owner, "local");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BillscanConfig::default();
        config.store.owner = "seller-42".to_string();
        config.save(&path).unwrap();

        let loaded = BillscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.store.owner, "seller-42");
        assert_eq!(loaded.extraction.default_hsn_code, "6214");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = BillscanConfig::from_file(&path);
        assert!(matches!(result, Err(BillscanError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BillscanConfig::from_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(BillscanError::Io(_))));
    }
}
