//! Order-tracking view model.

use ruralcart_common::identity::OrderId;
use ruralcart_common::order::{Order, OrderStatus};

use crate::api::{ApiClient, ClientError};

/// One row of the progress display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStep {
    pub status: OrderStatus,
    pub label: &'static str,
    pub completed: bool,
    pub active: bool,
    pub upcoming: bool,
}

const STEPS: [(OrderStatus, &str); 4] = [
    (OrderStatus::Confirmed, "Order Confirmed"),
    (OrderStatus::Preparing, "Order Prepared"),
    (OrderStatus::OutForDelivery, "Out for Delivery"),
    (OrderStatus::Delivered, "Delivered"),
];

/// Progress rows for `status`.
///
/// Steps up to and including the current status are completed; the current
/// one is also active. `pending`, `cancelled` and unknown statuses show every
/// step as upcoming.
pub fn progress_steps(status: &OrderStatus) -> Vec<ProgressStep> {
    let reached = status.progress_index().unwrap_or(0);
    STEPS
        .iter()
        .enumerate()
        .map(|(i, (step, label))| {
            let position = i + 1;
            ProgressStep {
                status: step.clone(),
                label: *label,
                completed: position <= reached,
                active: position == reached,
                upcoming: position > reached,
            }
        })
        .collect()
}

/// One-line description of a status.
pub fn status_caption(status: &OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "Order received, waiting for confirmation",
        OrderStatus::Confirmed => "Order confirmed and being prepared",
        OrderStatus::Preparing => "Your order is being prepared",
        OrderStatus::OutForDelivery => "On the way! Will be delivered soon",
        OrderStatus::Delivered => "Order delivered successfully",
        OrderStatus::Cancelled => "Order has been cancelled",
        OrderStatus::Other(_) => "Status unknown",
    }
}

/// Heading of the tracking screen.
pub fn headline(status: &OrderStatus) -> &'static str {
    match status {
        OrderStatus::OutForDelivery => "On the way!",
        other => status_caption(other),
    }
}

/// Sub-heading of the tracking screen.
pub fn detail(status: &OrderStatus) -> &'static str {
    match status {
        OrderStatus::OutForDelivery => "Your order will be delivered in 15-20 minutes",
        _ => "We'll keep you updated on your order progress",
    }
}

/// Follows one order by re-fetching it on demand.
#[derive(Debug, Clone)]
pub struct OrderTracker {
    api: ApiClient,
    order_id: OrderId,
    last: Option<Order>,
}

impl OrderTracker {
    pub fn new(api: ApiClient, order_id: OrderId) -> Self {
        Self {
            api,
            order_id,
            last: None,
        }
    }

    /// Start from an order already in hand, e.g. the one checkout returned.
    pub fn from_order(api: ApiClient, order: Order) -> Self {
        Self {
            api,
            order_id: order.id.clone(),
            last: Some(order),
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn order(&self) -> Option<&Order> {
        self.last.as_ref()
    }

    /// Fetch the latest copy of the order. On failure the previous copy is kept.
    pub async fn refresh(&mut self) -> Result<&Order, ClientError> {
        let order = self.api.order(&self.order_id).await?;
        Ok(self.last.insert(order))
    }

    /// Progress rows for the last fetched copy; empty before the first fetch.
    pub fn steps(&self) -> Vec<ProgressStep> {
        self.last
            .as_ref()
            .map(|o| progress_steps(&o.status))
            .unwrap_or_default()
    }
}
