//! Merging invoice records into orders.

use std::collections::HashMap;

use tracing::warn;

use crate::models::order::{InvoiceRecord, Order};

/// Strip one trailing `_<digits>` sub-order suffix.
///
/// `"987654321098765_2"` becomes `"987654321098765"`; anything else is
/// returned unchanged.
pub fn canonical_order_number(order_id: &str) -> &str {
    match order_id.rsplit_once('_') {
        Some((base, suffix)) if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) => base,
        _ => order_id,
    }
}

/// Groups records sharing a canonical order number, in encounter order.
#[derive(Debug, Default)]
pub struct OrderGrouper {
    orders: Vec<Order>,
    index: HashMap<String, usize>,
    overflowed: Vec<String>,
}

impl OrderGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into its order.
    ///
    /// The first record of an order supplies its address, date, invoice id
    /// and HSN code; later records only add items and their total. A total
    /// that would overflow is left at its last value and the order is
    /// reported by [`OrderGrouper::overflowed`].
    pub fn push(&mut self, record: InvoiceRecord) {
        let key = canonical_order_number(&record.order_id).to_string();

        match self.index.get(&key) {
            Some(&position) => {
                let order = &mut self.orders[position];
                order.line_items.extend(record.line_items);
                order.segment_count += 1;
                match order.total_amount.checked_add(record.total_amount) {
                    Some(total) => order.total_amount = total,
                    None => {
                        warn!(order = %order.order_number, "Order total overflowed, section total not added");
                        if !self.overflowed.contains(&order.order_number) {
                            self.overflowed.push(order.order_number.clone());
                        }
                    }
                }
            }
            None => {
                self.index.insert(key.clone(), self.orders.len());
                self.orders.push(Order {
                    order_number: key,
                    invoice_id: record.invoice_id,
                    address: record.address,
                    order_date: record.order_date,
                    line_items: record.line_items,
                    total_amount: record.total_amount,
                    hsn_code: record.hsn_code,
                    segment_count: 1,
                });
            }
        }
    }

    /// Number of distinct orders so far.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders whose total could not absorb a section total.
    pub fn overflowed(&self) -> &[String] {
        &self.overflowed
    }

    pub fn finish(self) -> Vec<Order> {
        self.orders
    }
}

impl Extend<InvoiceRecord> for OrderGrouper {
    fn extend<I: IntoIterator<Item = InvoiceRecord>>(&mut self, records: I) {
        for record in records {
            self.push(record);
        }
    }
}

/// Group records into orders.
pub fn group_records(records: impl IntoIterator<Item = InvoiceRecord>) -> Vec<Order> {
    let mut grouper = OrderGrouper::new();
    grouper.extend(records);
    grouper.finish()
}
