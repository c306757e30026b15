//! Entity repositories.
//!
//! Handlers only see the object-safe [`Storage`] trait; the process picks a
//! backend once at startup ([`MemoryStorage`] or the durable [`FileStorage`])
//! and shares it behind an `Arc`.

mod file;
mod memory;
pub mod seed;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde::{Deserialize, Serialize};

use ruralcart_common::category::{Category, NewCategory};
use ruralcart_common::identity::{CategoryId, OrderId, ProductId, UserId};
use ruralcart_common::order::{NewOrder, Order, OrderPatch};
use ruralcart_common::product::{NewProduct, Product, ProductPatch};
use ruralcart_common::user::{NewUser, User, UserPatch};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Full contents of a store. Orders are kept oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
}

/// Row counts, reported by the health endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub users: usize,
    pub categories: usize,
    pub products: usize,
    pub orders: usize,
}

/// Repository over every persisted entity.
///
/// Lookups return `None` instead of failing. Creates assign a fresh id (and
/// timestamps for orders) and return an independent copy of the stored row.
/// Updates shallow-merge a patch and fail with [`StoreError::NotFound`] when
/// the id is absent.
pub trait Storage: Send + Sync {
    // Users
    fn user(&self, id: &UserId) -> Option<User>;
    fn user_by_phone(&self, phone: &str) -> Option<User>;
    fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    fn update_user(&self, id: &UserId, patch: UserPatch) -> Result<User, StoreError>;

    // Categories
    fn categories(&self) -> Vec<Category>;
    fn category(&self, id: &CategoryId) -> Option<Category>;
    fn create_category(&self, new: NewCategory) -> Result<Category, StoreError>;

    // Products
    fn products(&self) -> Vec<Product>;
    fn products_by_category(&self, category: &CategoryId) -> Vec<Product>;
    fn product(&self, id: &ProductId) -> Option<Product>;
    fn create_product(&self, new: NewProduct) -> Result<Product, StoreError>;
    fn update_product(&self, id: &ProductId, patch: ProductPatch) -> Result<Product, StoreError>;

    // Orders, most recent first
    fn orders(&self) -> Vec<Order>;
    fn orders_by_user(&self, user: &UserId) -> Vec<Order>;
    fn order(&self, id: &OrderId) -> Option<Order>;
    fn create_order(&self, new: NewOrder) -> Result<Order, StoreError>;
    fn update_order(&self, id: &OrderId, patch: OrderPatch) -> Result<Order, StoreError>;

    fn counts(&self) -> StoreCounts;
}
