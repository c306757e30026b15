use serde::{Deserialize, Serialize};

use crate::currency::format_rupees_exact;
use crate::order::{Order, OrderStatus};

/// An outbound text message to a customer's phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
}

/// Confirmation sent once an order has been stored.
pub fn order_confirmation(order: &Order) -> SmsMessage {
    SmsMessage {
        to: order.delivery_address.phone.clone(),
        body: format!(
            "RuralCart: Order #{} confirmed. Total {}. Expected delivery in 30-45 mins.",
            order.id,
            format_rupees_exact(order.total)
        ),
    }
}

/// Status text for a customer, if the status has one.
///
/// `pending` and unknown statuses have nothing to tell the customer.
pub fn status_text(status: &OrderStatus) -> Option<&'static str> {
    match status {
        OrderStatus::Confirmed => Some("Your order is confirmed and will be prepared shortly."),
        OrderStatus::Preparing => Some("Your order is being packed."),
        OrderStatus::OutForDelivery => {
            Some("Your order is out for delivery. The delivery person will call you.")
        }
        OrderStatus::Delivered => Some("Your order has been delivered. Thank you for shopping with RuralCart!"),
        OrderStatus::Cancelled => Some("Your order has been cancelled. Contact support with any questions."),
        OrderStatus::Pending | OrderStatus::Other(_) => None,
    }
}

/// Status update for the order's current status, if it warrants one.
pub fn status_update(order: &Order) -> Option<SmsMessage> {
    status_text(&order.status).map(|text| SmsMessage {
        to: order.delivery_address.phone.clone(),
        body: format!("RuralCart: Order #{} - {text}", order.id),
    })
}
