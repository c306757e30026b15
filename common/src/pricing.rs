//! Delivery-fee policy and order totals.
//!
//! The client computes these for display and submits them with the order; the
//! server recomputes them from the line items and rejects mismatches.

use serde::{Deserialize, Serialize};

/// Subtotals at or above this amount (₹200) ship free.
pub const FREE_DELIVERY_THRESHOLD: u64 = 20_000;

/// Flat fee (₹30) charged below the free-delivery threshold.
pub const FLAT_DELIVERY_FEE: u64 = 3_000;

/// Delivery fee owed for a given subtotal.
pub fn delivery_fee(subtotal: u64) -> u64 {
    if subtotal >= FREE_DELIVERY_THRESHOLD {
        0
    } else {
        FLAT_DELIVERY_FEE
    }
}

/// Price of one line: unit price times quantity.
pub fn line_total(price: u64, quantity: u32) -> u64 {
    price.saturating_mul(u64::from(quantity))
}

/// Sum of `price × quantity` over `(price, quantity)` pairs.
pub fn subtotal_of(lines: impl IntoIterator<Item = (u64, u32)>) -> u64 {
    lines
        .into_iter()
        .fold(0u64, |acc, (price, qty)| acc.saturating_add(line_total(price, qty)))
}

/// Subtotal, delivery fee and grand total of an order, all in paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub total: u64,
}

impl OrderTotals {
    pub fn for_subtotal(subtotal: u64) -> Self {
        let delivery_fee = delivery_fee(subtotal);
        Self {
            subtotal,
            delivery_fee,
            total: subtotal.saturating_add(delivery_fee),
        }
    }

    pub fn for_lines(lines: impl IntoIterator<Item = (u64, u32)>) -> Self {
        Self::for_subtotal(subtotal_of(lines))
    }

    /// Amount still needed to reach free delivery, if any.
    pub fn free_delivery_shortfall(&self) -> Option<u64> {
        (self.subtotal < FREE_DELIVERY_THRESHOLD).then(|| FREE_DELIVERY_THRESHOLD - self.subtotal)
    }
}
