//! Order storage.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::invoice::canonical_order_number;
use crate::models::order::Order;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// What happened to an order handed to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The order was new and has been stored.
    Stored,
    /// An order with the same number already existed for this owner.
    Duplicate,
}

/// Counts from storing a batch of orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub skipped: usize,
}

impl UploadSummary {
    pub fn record(&mut self, outcome: StoreOutcome) {
        match outcome {
            StoreOutcome::Stored => self.uploaded += 1,
            StoreOutcome::Duplicate => self.skipped += 1,
        }
    }
}

/// Trait for order storage backends.
///
/// Saving is idempotent per `(owner, canonical order number)`: an order
/// that is already present is reported as a duplicate and left untouched.
pub trait OrderStore {
    fn save(&mut self, owner: &str, order: &Order) -> Result<StoreOutcome>;

    /// Check whether an order is already stored for an owner.
    fn contains(&self, owner: &str, order_number: &str) -> bool;
}

/// In-process order store.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: HashMap<(String, String), Order>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Look up a stored order.
    pub fn get(&self, owner: &str, order_number: &str) -> Option<&Order> {
        self.orders.get(&key(owner, order_number))
    }

    /// All orders stored for an owner, sorted by order number.
    pub fn orders_for(&self, owner: &str) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self
            .orders
            .iter()
            .filter(|((o, _), _)| o == owner)
            .map(|(_, order)| order)
            .collect();
        orders.sort_by(|a, b| a.order_number.cmp(&b.order_number));
        orders
    }
}

fn key(owner: &str, order_number: &str) -> (String, String) {
    (
        owner.to_string(),
        canonical_order_number(order_number).to_string(),
    )
}

impl OrderStore for MemoryOrderStore {
    fn save(&mut self, owner: &str, order: &Order) -> Result<StoreOutcome> {
        if owner.trim().is_empty() {
            return Err(StoreError::MissingOwner);
        }

        let key = key(owner, &order.order_number);
        if self.orders.contains_key(&key) {
            debug!("Order {} already stored for {}", key.1, owner);
            return Ok(StoreOutcome::Duplicate);
        }

        self.orders.insert(key, order.clone());
        Ok(StoreOutcome::Stored)
    }

    fn contains(&self, owner: &str, order_number: &str) -> bool {
        self.orders.contains_key(&key(owner, order_number))
    }
}

/// Save every order, skipping duplicates.
pub fn store_orders<S: OrderStore + ?Sized>(
    store: &mut S,
    owner: &str,
    orders: &[Order],
) -> Result<UploadSummary> {
    let mut summary = UploadSummary::default();
    for order in orders {
        summary.record(store.save(owner, order)?);
    }

    info!(
        "Stored orders for {}: {} uploaded, {} skipped",
        owner, summary.uploaded, summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::AddressBlock;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn order(number: &str) -> Order {
        Order {
            order_number: number.to_string(),
            invoice_id: "INV-001".to_string(),
            address: AddressBlock::unknown(),
            order_date: NaiveDate::from_ymd_opt(2025, 7, 18).unwrap(),
            line_items: Vec::new(),
            total_amount: Decimal::from(598),
            hsn_code: "6214".to_string(),
            segment_count: 1,
        }
    }

    #[test]
    fn test_duplicates_are_skipped() {
        let mut store = MemoryOrderStore::new();
        let orders = vec![order("111"), order("222"), order("111")];

        let summary = store_orders(&mut store, "seller", &orders).unwrap();
        assert_eq!(summary, UploadSummary { uploaded: 2, skipped: 1 });
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_second_upload_skips_everything() {
        let mut store = MemoryOrderStore::new();
        let orders = vec![order("111"), order("222")];

        store_orders(&mut store, "seller", &orders).unwrap();
        let again = store_orders(&mut store, "seller", &orders).unwrap();
        assert_eq!(again, UploadSummary { uploaded: 0, skipped: 2 });
    }

    #[test]
    fn test_duplicate_does_not_overwrite() {
        let mut store = MemoryOrderStore::new();
        store.save("seller", &order("111")).unwrap();

        let mut changed = order("111");
        changed.total_amount = Decimal::from(1);
        assert_eq!(store.save("seller", &changed).unwrap(), StoreOutcome::Duplicate);
        assert_eq!(
            store.get("seller", "111").unwrap().total_amount,
            Decimal::from(598)
        );
    }

    #[test]
    fn test_owners_are_separate() {
        let mut store = MemoryOrderStore::new();
        assert_eq!(store.save("a", &order("111")).unwrap(), StoreOutcome::Stored);
        assert_eq!(store.save("b", &order("111")).unwrap(), StoreOutcome::Stored);
        assert_eq!(store.orders_for("a").len(), 1);
        assert!(store.contains("b", "111"));
    }

    #[test]
    fn test_suborder_number_matches_canonical() {
        let mut store = MemoryOrderStore::new();
        store.save("seller", &order("987654321098765")).unwrap();
        assert!(store.contains("seller", "987654321098765_2"));
    }

    #[test]
    fn test_empty_owner_rejected() {
        let mut store = MemoryOrderStore::new();
        assert!(matches!(
            store.save("  ", &order("111")),
            Err(StoreError::MissingOwner)
        ));
        assert!(store.is_empty());
    }
}
