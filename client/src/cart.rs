use serde::{Deserialize, Serialize};

use ruralcart_common::identity::ProductId;
use ruralcart_common::order::OrderItem;
use ruralcart_common::pricing::{self, OrderTotals};
use ruralcart_common::product::Product;

/// A product snapshot plus a quantity. Name, price and unit are captured when
/// the line is first added and do not follow later catalogue changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: u64,
    pub quantity: u32,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartItem {
    fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity,
            unit: product.unit.clone(),
            image_url: product.image_url.clone(),
        }
    }

    pub fn line_total(&self) -> u64 {
        pricing::line_total(self.price, self.quantity)
    }
}

/// Cart lines in the order they were first added.
///
/// Totals are derived from the lines on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, product: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product)
    }

    /// Add `quantity` of `product`, merging into an existing line for the
    /// same product. Returns whether the cart changed: adding zero is a no-op
    /// and out-of-stock products are refused.
    pub fn add(&mut self, product: &Product, quantity: u32) -> bool {
        if !product.in_stock {
            tracing::warn!(product = %product.id, "out of stock, not added to cart");
            return false;
        }
        if quantity == 0 {
            return false;
        }
        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.items.push(CartItem::snapshot(product, quantity)),
        }
        true
    }

    pub fn remove(&mut self, product: &ProductId) {
        self.items.retain(|i| &i.product_id != product);
    }

    /// Set a line's quantity exactly; zero removes the line.
    pub fn set_quantity(&mut self, product: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product);
        } else if let Some(line) = self.items.iter_mut().find(|i| &i.product_id == product) {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of price × quantity over all lines.
    pub fn total(&self) -> u64 {
        pricing::subtotal_of(self.items.iter().map(|i| (i.price, i.quantity)))
    }

    /// Sum of quantities over all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn totals(&self) -> OrderTotals {
        OrderTotals::for_subtotal(self.total())
    }

    /// The lines as order items.
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.items
            .iter()
            .map(|i| OrderItem {
                product_id: i.product_id.clone(),
                name: i.name.clone(),
                price: i.price,
                quantity: i.quantity,
                unit: i.unit.clone(),
            })
            .collect()
    }
}
