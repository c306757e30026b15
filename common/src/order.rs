use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{OrderId, ProductId, UserId};
use crate::pricing::OrderTotals;
use crate::user::Address;
use crate::validation::{FieldError, Validate, Violations};

/// Order status as stored. Any string is accepted; the six known values get
/// their own variants and everything else is carried verbatim in `Other`.
///
/// No transition graph is enforced. The only ordering is the display
/// progression `pending → confirmed → preparing → out_for_delivery →
/// delivered`, with `cancelled` as a side exit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, OrderStatus::Other(_))
    }

    /// Position in the five-stage display progression; `None` for
    /// `cancelled` and unknown values.
    pub fn progress_index(&self) -> Option<usize> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::OutForDelivery => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled | OrderStatus::Other(_) => None,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => OrderStatus::Pending,
            "confirmed" => OrderStatus::Confirmed,
            "preparing" => OrderStatus::Preparing,
            "out_for_delivery" => OrderStatus::OutForDelivery,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(value),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        OrderStatus::from(value.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer pays. No gateway is involved; UPI is recorded only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    Upi,
}

/// Requested delivery slot: `"asap"` or an opaque scheduled marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeliveryTime {
    #[default]
    Asap,
    Scheduled(String),
}

impl From<String> for DeliveryTime {
    fn from(value: String) -> Self {
        if value == "asap" {
            DeliveryTime::Asap
        } else {
            DeliveryTime::Scheduled(value)
        }
    }
}

impl From<DeliveryTime> for String {
    fn from(value: DeliveryTime) -> Self {
        match value {
            DeliveryTime::Asap => "asap".to_string(),
            DeliveryTime::Scheduled(s) => s,
        }
    }
}

/// Line snapshot captured at order time, decoupled from the live product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price in paise at order time.
    pub price: u64,
    pub quantity: u32,
    pub unit: String,
}

impl Validate for OrderItem {
    fn validate(&self) -> Vec<FieldError> {
        let mut v = Violations::new();
        v.not_blank("productId", self.product_id.as_str());
        v.not_blank("name", &self.name);
        v.not_blank("unit", &self.unit);
        if self.quantity == 0 {
            v.push("quantity", "must be at least 1");
        }
        v.into_errors()
    }
}

/// A placed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub total: u64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub delivery_address: Address,
    #[serde(default)]
    pub special_instructions: Option<String>,
    pub delivery_time: DeliveryTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Totals recomputed from the line items (ignores the stored aggregates).
    pub fn computed_totals(&self) -> OrderTotals {
        OrderTotals::for_lines(self.items.iter().map(|i| (i.price, i.quantity)))
    }

    /// Sum of line quantities.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Order creation body for `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: u64,
    #[serde(default)]
    pub delivery_fee: u64,
    pub total: u64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub delivery_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub delivery_time: DeliveryTime,
}

impl NewOrder {
    /// Build the stored order; `created_at` and `updated_at` both get `now`.
    pub fn into_order(self, id: OrderId, now: DateTime<Utc>) -> Order {
        Order {
            id,
            user_id: self.user_id,
            items: self.items,
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            total: self.total,
            status: self.status,
            payment_method: self.payment_method,
            delivery_address: self.delivery_address,
            special_instructions: self.special_instructions,
            delivery_time: self.delivery_time,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for NewOrder {
    fn validate(&self) -> Vec<FieldError> {
        let mut v = Violations::new();
        v.not_blank("userId", self.user_id.as_str());
        if self.items.is_empty() {
            v.push("items", "must contain at least one item");
        }
        for (i, item) in self.items.iter().enumerate() {
            v.nested(&format!("items[{i}]"), item);
        }
        v.nested("deliveryAddress", &self.delivery_address);

        let expected = OrderTotals::for_lines(self.items.iter().map(|i| (i.price, i.quantity)));
        if self.subtotal != expected.subtotal {
            v.push(
                "subtotal",
                format!("expected {} from items, got {}", expected.subtotal, self.subtotal),
            );
        }
        if self.delivery_fee != expected.delivery_fee {
            v.push(
                "deliveryFee",
                format!(
                    "expected {} for subtotal {}, got {}",
                    expected.delivery_fee, expected.subtotal, self.delivery_fee
                ),
            );
        }
        if self.total != self.subtotal.saturating_add(self.delivery_fee) {
            v.push("total", "must equal subtotal + deliveryFee");
        }
        v.into_errors()
    }
}

/// Partial order update for `PATCH /api/orders/{id}`.
///
/// `id`, `userId` and the timestamps are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,
    #[serde(
        default,
        deserialize_with = "crate::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub special_instructions: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<DeliveryTime>,
}

impl OrderPatch {
    pub fn status(status: impl Into<OrderStatus>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    /// Shallow-merge the provided fields over `order` and stamp `updated_at`.
    pub fn apply(self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(items) = self.items {
            order.items = items;
        }
        if let Some(subtotal) = self.subtotal {
            order.subtotal = subtotal;
        }
        if let Some(delivery_fee) = self.delivery_fee {
            order.delivery_fee = delivery_fee;
        }
        if let Some(total) = self.total {
            order.total = total;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(payment_method) = self.payment_method {
            order.payment_method = payment_method;
        }
        if let Some(address) = self.delivery_address {
            order.delivery_address = address;
        }
        if let Some(instructions) = self.special_instructions {
            order.special_instructions = instructions;
        }
        if let Some(delivery_time) = self.delivery_time {
            order.delivery_time = delivery_time;
        }
        order.updated_at = now;
    }
}

impl Validate for OrderPatch {
    fn validate(&self) -> Vec<FieldError> {
        let mut v = Violations::new();
        if let Some(items) = &self.items {
            if items.is_empty() {
                v.push("items", "must contain at least one item");
            }
            for (i, item) in items.iter().enumerate() {
                v.nested(&format!("items[{i}]"), item);
            }
        }
        if let Some(address) = &self.delivery_address {
            v.nested("deliveryAddress", address);
        }
        v.into_errors()
    }
}
