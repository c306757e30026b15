//! Local persistence of the session's user and cart.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use ruralcart_common::identity::ProductId;
use ruralcart_common::order::Order;
use ruralcart_common::product::Product;
use ruralcart_common::user::User;

use crate::cart::Cart;
use crate::state::{ClientState, PersistedState};

/// Key the session is stored under.
pub const STORAGE_NAMESPACE: &str = "ruralcart-store";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("state storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value storage, in the manner of browser local storage.
pub trait StateStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn save(&self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStateStorage {
    dir: PathBuf,
}

impl FileStateStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<platform data dir>/ruralcart`, falling back to the temp dir.
    pub fn default_location() -> Self {
        let base = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join("ruralcart"))
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStorage for FileStateStorage {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStateStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStateStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStateStorage {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// [`ClientState`] bound to a storage backend.
///
/// Every change to the user or the cart is written through. A failed write is
/// logged and the in-memory state is kept; [`ClientStore::flush`] reports it.
pub struct ClientStore {
    state: ClientState,
    storage: Box<dyn StateStorage>,
}

impl std::fmt::Debug for ClientStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ClientStore {
    /// Restore the saved session, starting empty if there is none or it
    /// cannot be read.
    pub fn open(storage: impl StateStorage + 'static) -> Self {
        let state = match Self::restore(&storage) {
            Ok(Some(persisted)) => ClientState::from_persisted(persisted),
            Ok(None) => ClientState::new(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable saved session");
                ClientState::new()
            }
        };
        Self {
            state,
            storage: Box::new(storage),
        }
    }

    fn restore(storage: &dyn StateStorage) -> Result<Option<PersistedState>, PersistError> {
        match storage.load(STORAGE_NAMESPACE)? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn cart(&self) -> &Cart {
        &self.state.cart
    }

    pub fn current_order(&self) -> Option<&Order> {
        self.state.current_order.as_ref()
    }

    pub fn cart_total(&self) -> u64 {
        self.state.cart_total()
    }

    pub fn cart_item_count(&self) -> u64 {
        self.state.cart_item_count()
    }

    /// Write the persisted part of the state now.
    pub fn flush(&self) -> Result<(), PersistError> {
        let data = serde_json::to_string(&self.state.persisted())?;
        self.storage.save(STORAGE_NAMESPACE, &data)
    }

    fn write_through(&self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "failed to save session");
        }
    }

    pub fn set_user(&mut self, user: User) {
        self.state.set_user(user);
        self.write_through();
    }

    pub fn clear_user(&mut self) {
        self.state.clear_user();
        self.write_through();
    }

    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) -> bool {
        let added = self.state.add_to_cart(product, quantity);
        if added {
            self.write_through();
        }
        added
    }

    pub fn remove_from_cart(&mut self, product: &ProductId) {
        self.state.remove_from_cart(product);
        self.write_through();
    }

    pub fn update_cart_item_quantity(&mut self, product: &ProductId, quantity: u32) {
        self.state.update_cart_item_quantity(product, quantity);
        self.write_through();
    }

    pub fn clear_cart(&mut self) {
        self.state.clear_cart();
        self.write_through();
    }

    pub fn set_current_order(&mut self, order: Order) {
        self.state.set_current_order(order);
    }

    pub fn clear_current_order(&mut self) {
        self.state.clear_current_order();
    }

    /// Log out: drop user, cart and current order, and save the empty state.
    pub fn clear(&mut self) {
        self.state = ClientState::new();
        self.write_through();
    }
}
