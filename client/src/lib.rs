//! Client side of RuralCart: the session store (user + cart), its local
//! persistence, a typed HTTP client, and the checkout and order-tracking
//! logic behind the storefront screens.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod persist;
pub mod session;
pub mod state;
pub mod tracking;

pub use api::{ApiClient, ClientError};
pub use cart::{Cart, CartItem};
pub use checkout::{CheckoutError, CheckoutForm, PlacedOrder};
pub use persist::{ClientStore, FileStateStorage, MemoryStateStorage, PersistError, StateStorage};
pub use state::ClientState;
