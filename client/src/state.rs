use serde::{Deserialize, Serialize};

use ruralcart_common::identity::ProductId;
use ruralcart_common::order::Order;
use ruralcart_common::product::Product;
use ruralcart_common::user::User;

use crate::cart::Cart;

/// Session state held by the storefront, independent of any screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    pub user: Option<User>,
    pub cart: Cart,
    /// Most recently placed order. Not persisted.
    pub current_order: Option<Order>,
}

/// The part of [`ClientState`] that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub cart: Cart,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_persisted(persisted: PersistedState) -> Self {
        Self {
            user: persisted.user,
            cart: persisted.cart,
            current_order: None,
        }
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            user: self.user.clone(),
            cart: self.cart.clone(),
        }
    }

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn clear_user(&mut self) {
        self.user = None;
    }

    /// See [`Cart::add`].
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) -> bool {
        self.cart.add(product, quantity)
    }

    pub fn remove_from_cart(&mut self, product: &ProductId) {
        self.cart.remove(product);
    }

    pub fn update_cart_item_quantity(&mut self, product: &ProductId, quantity: u32) {
        self.cart.set_quantity(product, quantity);
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn set_current_order(&mut self, order: Order) {
        self.current_order = Some(order);
    }

    pub fn clear_current_order(&mut self) {
        self.current_order = None;
    }

    pub fn cart_total(&self) -> u64 {
        self.cart.total()
    }

    pub fn cart_item_count(&self) -> u64 {
        self.cart.item_count()
    }
}
