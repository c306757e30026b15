use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ruralcart_common::category::{Category, NewCategory};
use ruralcart_common::identity::{CategoryId, OrderId, ProductId, UserId};
use ruralcart_common::order::{NewOrder, Order, OrderPatch};
use ruralcart_common::product::{NewProduct, Product, ProductPatch};
use ruralcart_common::user::{NewUser, User, UserPatch};

use super::{seed, MemoryStorage, Snapshot, Storage, StoreCounts, StoreError};

/// Durable store: a [`MemoryStorage`] whose contents are written to a JSON
/// snapshot after every successful write.
///
/// The snapshot is replaced atomically (temp file + rename). Writes are
/// serialized; if the snapshot cannot be written the in-memory change is
/// rolled back before the caller gets the I/O error, so a failed write never
/// leaves a row that the next restart would lose.
#[derive(Debug)]
pub struct FileStorage {
    inner: MemoryStorage,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Load the snapshot at `path`, or create it (optionally seeded) when absent.
    pub fn open(path: impl Into<PathBuf>, seed_if_missing: bool) -> Result<Self, StoreError> {
        let path = path.into();
        let (snapshot, fresh) = if path.exists() {
            let data = fs::read_to_string(&path)?;
            (serde_json::from_str::<Snapshot>(&data)?, false)
        } else if seed_if_missing {
            (seed::sample_data(), true)
        } else {
            (Snapshot::default(), true)
        };

        let store = Self {
            inner: MemoryStorage::from_snapshot(snapshot)?,
            path,
            write_lock: Mutex::new(()),
        };
        if fresh {
            store.persist()?;
            tracing::info!(path = %store.path.display(), "created store snapshot");
        } else {
            tracing::info!(path = %store.path.display(), "loaded store snapshot");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the snapshot. Callers hold the write lock, or own the store
    /// outright as `open` does.
    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&self.inner.snapshot())?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Persist an applied change, or run `undo` and return the write error.
    /// Callers hold the write lock.
    fn commit<T>(
        &self,
        result: Result<T, StoreError>,
        undo: impl FnOnce(&MemoryStorage, &T),
    ) -> Result<T, StoreError> {
        let value = result?;
        if let Err(e) = self.persist() {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "failed to persist store snapshot, change rolled back"
            );
            undo(&self.inner, &value);
            return Err(e);
        }
        Ok(value)
    }
}

impl Storage for FileStorage {
    fn user(&self, id: &UserId) -> Option<User> {
        self.inner.user(id)
    }

    fn user_by_phone(&self, phone: &str) -> Option<User> {
        self.inner.user_by_phone(phone)
    }

    fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let _guard = self.lock();
        self.commit(self.inner.create_user(new), |inner, user| inner.forget_user(user))
    }

    fn update_user(&self, id: &UserId, patch: UserPatch) -> Result<User, StoreError> {
        let _guard = self.lock();
        let before = self.inner.user(id);
        self.commit(self.inner.update_user(id, patch), |inner, _| {
            if let Some(before) = before {
                inner.restore_user(before);
            }
        })
    }

    fn categories(&self) -> Vec<Category> {
        self.inner.categories()
    }

    fn category(&self, id: &CategoryId) -> Option<Category> {
        self.inner.category(id)
    }

    fn create_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let _guard = self.lock();
        self.commit(self.inner.create_category(new), |inner, category| {
            inner.forget_category(category)
        })
    }

    fn products(&self) -> Vec<Product> {
        self.inner.products()
    }

    fn products_by_category(&self, category: &CategoryId) -> Vec<Product> {
        self.inner.products_by_category(category)
    }

    fn product(&self, id: &ProductId) -> Option<Product> {
        self.inner.product(id)
    }

    fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let _guard = self.lock();
        self.commit(self.inner.create_product(new), |inner, product| {
            inner.forget_product(&product.id)
        })
    }

    fn update_product(&self, id: &ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        let _guard = self.lock();
        let before = self.inner.product(id);
        self.commit(self.inner.update_product(id, patch), |inner, _| {
            if let Some(before) = before {
                inner.restore_product(before);
            }
        })
    }

    fn orders(&self) -> Vec<Order> {
        self.inner.orders()
    }

    fn orders_by_user(&self, user: &UserId) -> Vec<Order> {
        self.inner.orders_by_user(user)
    }

    fn order(&self, id: &OrderId) -> Option<Order> {
        self.inner.order(id)
    }

    fn create_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let _guard = self.lock();
        self.commit(self.inner.create_order(new), |inner, order| inner.forget_order(&order.id))
    }

    fn update_order(&self, id: &OrderId, patch: OrderPatch) -> Result<Order, StoreError> {
        let _guard = self.lock();
        let before = self.inner.order(id);
        self.commit(self.inner.update_order(id, patch), |inner, _| {
            if let Some(before) = before {
                inner.restore_order(before);
            }
        })
    }

    fn counts(&self) -> StoreCounts {
        self.inner.counts()
    }
}
