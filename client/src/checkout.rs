//! Checkout: turn the session cart into an order and place it.

use ruralcart_common::currency::format_rupees;
use ruralcart_common::order::{DeliveryTime, NewOrder, Order, OrderStatus, PaymentMethod};
use ruralcart_common::pricing::OrderTotals;
use ruralcart_common::user::{Address, User};

use crate::api::{ApiClient, ClientError};
use crate::persist::ClientStore;
use crate::state::ClientState;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("login required")]
    LoginRequired,

    #[error("empty cart")]
    EmptyCart,

    #[error(transparent)]
    Api(#[from] ClientError),
}

/// Choices the customer makes on the checkout screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub payment_method: PaymentMethod,
    pub special_instructions: String,
    pub delivery_time: DeliveryTime,
}

/// A successfully placed order and where to track it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order: Order,
    pub tracking_path: String,
}

pub fn tracking_path(order: &Order) -> String {
    format!("/order/{}", order.id)
}

/// Used when the user has not saved an address yet.
fn placeholder_address(user: &User) -> Address {
    Address {
        label: "Home".to_string(),
        full: "Please update your address".to_string(),
        phone: user.phone.clone(),
    }
}

/// Assemble the order payload from the session state.
pub fn build_order(state: &ClientState, form: &CheckoutForm) -> Result<NewOrder, CheckoutError> {
    let user = state.user.as_ref().ok_or(CheckoutError::LoginRequired)?;
    if state.cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let totals = state.cart.totals();
    let instructions = form.special_instructions.trim();

    Ok(NewOrder {
        user_id: user.id.clone(),
        items: state.cart.order_items(),
        subtotal: totals.subtotal,
        delivery_fee: totals.delivery_fee,
        total: totals.total,
        status: OrderStatus::Pending,
        payment_method: form.payment_method,
        delivery_address: user
            .address
            .clone()
            .unwrap_or_else(|| placeholder_address(user)),
        special_instructions: (!instructions.is_empty()).then(|| instructions.to_string()),
        delivery_time: form.delivery_time.clone(),
    })
}

/// Place the session cart as an order.
///
/// On success the cart is cleared and the order becomes the current order.
/// On any failure the session is left untouched.
pub async fn place_order(
    api: &ApiClient,
    store: &mut ClientStore,
    form: &CheckoutForm,
) -> Result<PlacedOrder, CheckoutError> {
    let new = build_order(store.state(), form)?;
    let order = api.create_order(&new).await?;
    tracing::info!(order = %order.id, total = order.total, "order placed");

    store.clear_cart();
    store.set_current_order(order.clone());
    Ok(PlacedOrder {
        tracking_path: tracking_path(&order),
        order,
    })
}

/// Display strings for the order summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
    /// e.g. "Add ₹50 more for free delivery".
    pub free_delivery_hint: Option<String>,
}

impl OrderSummary {
    pub fn new(totals: &OrderTotals) -> Self {
        Self {
            subtotal: format_rupees(totals.subtotal),
            delivery_fee: if totals.delivery_fee == 0 {
                "FREE".to_string()
            } else {
                format_rupees(totals.delivery_fee)
            },
            total: format_rupees(totals.total),
            free_delivery_hint: totals
                .free_delivery_shortfall()
                .map(|short| format!("Add {} more for free delivery", format_rupees(short))),
        }
    }

    /// Label of the place-order button.
    pub fn place_order_label(&self) -> String {
        format!("Place Order - {}", self.total)
    }
}
