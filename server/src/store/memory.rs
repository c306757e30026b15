use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use ruralcart_common::category::{Category, NewCategory};
use ruralcart_common::identity::{CategoryId, OrderId, ProductId, UserId};
use ruralcart_common::order::{NewOrder, Order, OrderPatch};
use ruralcart_common::product::{NewProduct, Product, ProductPatch};
use ruralcart_common::user::{NewUser, User, UserPatch};

use super::{seed, Snapshot, Storage, StoreCounts, StoreError};

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// An order plus its insertion sequence, which breaks timestamp ties.
#[derive(Debug, Clone)]
struct OrderRecord {
    seq: u64,
    order: Order,
}

/// In-memory store with one concurrent map per entity.
///
/// Every update runs under the map's per-key lock, so two concurrent patches
/// of the same row apply one after the other. Unique fields (user phone,
/// category slug) are claimed through an index map entry; when both maps are
/// needed the index is always locked before the entity map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    users: DashMap<UserId, User>,
    phones: DashMap<String, UserId>,
    categories: DashMap<CategoryId, Category>,
    slugs: DashMap<String, CategoryId>,
    products: DashMap<ProductId, Product>,
    orders: DashMap<OrderId, OrderRecord>,
    next_order_seq: AtomicU64,
}

impl MemoryStorage {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the sample catalogue.
    pub fn seeded() -> Result<Self, StoreError> {
        Self::from_snapshot(seed::sample_data())
    }

    /// Rebuild a store from a snapshot, keeping the snapshot's ids and order
    /// sequence.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        let store = Self::new();
        for user in snapshot.users {
            match store.phones.entry(user.phone.clone()) {
                Entry::Occupied(_) => {
                    return Err(StoreError::Conflict(format!(
                        "phone {} appears twice in snapshot",
                        user.phone
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(user.id.clone());
                }
            }
            store.users.insert(user.id.clone(), user);
        }
        for category in snapshot.categories {
            match store.slugs.entry(category.slug.clone()) {
                Entry::Occupied(_) => {
                    return Err(StoreError::Conflict(format!(
                        "category slug {} appears twice in snapshot",
                        category.slug
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(category.id.clone());
                }
            }
            store.categories.insert(category.id.clone(), category);
        }
        for product in snapshot.products {
            store.products.insert(product.id.clone(), product);
        }
        for order in snapshot.orders {
            let seq = store.next_order_seq.fetch_add(1, Ordering::Relaxed);
            store.orders.insert(order.id.clone(), OrderRecord { seq, order });
        }
        Ok(store)
    }

    /// Copy out the full contents.
    pub fn snapshot(&self) -> Snapshot {
        let mut orders: Vec<OrderRecord> = self.orders.iter().map(|r| r.value().clone()).collect();
        orders.sort_by_key(|r| r.seq);
        Snapshot {
            users: sorted_by_id(self.users.iter().map(|u| u.value().clone()), |u| u.id.0.clone()),
            categories: self.categories(),
            products: self.products(),
            orders: orders.into_iter().map(|r| r.order).collect(),
        }
    }

    fn recent_first(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut records: Vec<OrderRecord> = self
            .orders
            .iter()
            .filter(|r| keep(&r.order))
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| {
            b.order
                .created_at
                .cmp(&a.order.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        records.into_iter().map(|r| r.order).collect()
    }

    // Rollback of a single write, for backends that commit after applying.
    // Nothing else may write concurrently with these.

    pub(super) fn forget_user(&self, user: &User) {
        self.phones.remove_if(&user.phone, |_, owner| owner == &user.id);
        self.users.remove(&user.id);
    }

    pub(super) fn restore_user(&self, before: User) {
        let current = self.users.get(&before.id).map(|u| u.phone.clone());
        if let Some(current) = current.filter(|phone| phone != &before.phone) {
            self.phones.remove_if(&current, |_, owner| owner == &before.id);
            self.phones.insert(before.phone.clone(), before.id.clone());
        }
        self.users.insert(before.id.clone(), before);
    }

    pub(super) fn forget_category(&self, category: &Category) {
        self.slugs.remove_if(&category.slug, |_, owner| owner == &category.id);
        self.categories.remove(&category.id);
    }

    pub(super) fn forget_product(&self, id: &ProductId) {
        self.products.remove(id);
    }

    pub(super) fn restore_product(&self, before: Product) {
        self.products.insert(before.id.clone(), before);
    }

    pub(super) fn forget_order(&self, id: &OrderId) {
        self.orders.remove(id);
    }

    pub(super) fn restore_order(&self, before: Order) {
        if let Some(mut record) = self.orders.get_mut(&before.id) {
            record.order = before;
        }
    }

    fn patch_user(&self, id: &UserId, patch: UserPatch) -> Result<User, StoreError> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        patch.apply(&mut user);
        Ok(user.value().clone())
    }
}

fn sorted_by_id<T>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> String) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|r| key(r));
    rows
}

impl Storage for MemoryStorage {
    fn user(&self, id: &UserId) -> Option<User> {
        self.users.get(id).map(|u| u.value().clone())
    }

    fn user_by_phone(&self, phone: &str) -> Option<User> {
        let id = self.phones.get(phone).map(|id| id.value().clone())?;
        self.user(&id)
    }

    fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        match self.phones.entry(new.phone.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "phone {} is already registered",
                new.phone
            ))),
            Entry::Vacant(slot) => {
                let user = new.into_user(UserId(fresh_id()));
                self.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id.clone());
                Ok(user)
            }
        }
    }

    fn update_user(&self, id: &UserId, patch: UserPatch) -> Result<User, StoreError> {
        let Some(phone) = patch.phone.clone() else {
            return self.patch_user(id, patch);
        };
        match self.phones.entry(phone.clone()) {
            Entry::Occupied(owner) if owner.get() != id => Err(StoreError::Conflict(format!(
                "phone {phone} is already registered"
            ))),
            Entry::Occupied(owner) => {
                drop(owner);
                self.patch_user(id, patch)
            }
            Entry::Vacant(slot) => {
                let mut user = self
                    .users
                    .get_mut(id)
                    .ok_or_else(|| StoreError::not_found("user", id))?;
                let old_phone = user.phone.clone();
                patch.apply(&mut user);
                let updated = user.value().clone();
                drop(user);
                slot.insert(id.clone());
                self.phones.remove_if(&old_phone, |_, owner| owner == id);
                Ok(updated)
            }
        }
    }

    fn categories(&self) -> Vec<Category> {
        sorted_by_id(self.categories.iter().map(|c| c.value().clone()), |c| c.id.0.clone())
    }

    fn category(&self, id: &CategoryId) -> Option<Category> {
        self.categories.get(id).map(|c| c.value().clone())
    }

    fn create_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        match self.slugs.entry(new.slug.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "category slug {} is taken",
                new.slug
            ))),
            Entry::Vacant(slot) => {
                let category = new.into_category(CategoryId(fresh_id()));
                self.categories.insert(category.id.clone(), category.clone());
                slot.insert(category.id.clone());
                Ok(category)
            }
        }
    }

    fn products(&self) -> Vec<Product> {
        sorted_by_id(self.products.iter().map(|p| p.value().clone()), |p| p.id.0.clone())
    }

    fn products_by_category(&self, category: &CategoryId) -> Vec<Product> {
        sorted_by_id(
            self.products
                .iter()
                .filter(|p| &p.category_id == category)
                .map(|p| p.value().clone()),
            |p| p.id.0.clone(),
        )
    }

    fn product(&self, id: &ProductId) -> Option<Product> {
        self.products.get(id).map(|p| p.value().clone())
    }

    fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let product = new.into_product(ProductId(fresh_id()));
        self.products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    fn update_product(&self, id: &ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        let mut product = self
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("product", id))?;
        patch.apply(&mut product);
        Ok(product.value().clone())
    }

    fn orders(&self) -> Vec<Order> {
        self.recent_first(|_| true)
    }

    fn orders_by_user(&self, user: &UserId) -> Vec<Order> {
        self.recent_first(|o| &o.user_id == user)
    }

    fn order(&self, id: &OrderId) -> Option<Order> {
        self.orders.get(id).map(|r| r.order.clone())
    }

    fn create_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let order = new.into_order(OrderId(fresh_id()), Utc::now());
        let seq = self.next_order_seq.fetch_add(1, Ordering::Relaxed);
        self.orders.insert(
            order.id.clone(),
            OrderRecord {
                seq,
                order: order.clone(),
            },
        );
        Ok(order)
    }

    fn update_order(&self, id: &OrderId, patch: OrderPatch) -> Result<Order, StoreError> {
        let mut record = self
            .orders
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("order", id))?;
        patch.apply(&mut record.order, Utc::now());
        Ok(record.order.clone())
    }

    fn counts(&self) -> StoreCounts {
        StoreCounts {
            users: self.users.len(),
            categories: self.categories.len(),
            products: self.products.len(),
            orders: self.orders.len(),
        }
    }
}
