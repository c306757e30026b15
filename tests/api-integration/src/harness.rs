//! Scenario harness: a server plus customer sessions with their own local
//! state, the way several phones would use the storefront.

use std::sync::Arc;

use ruralcart_client::persist::{ClientStore, MemoryStateStorage};
use ruralcart_client::{session, ApiClient, ClientError};
use ruralcart_common::identity::ProductId;
use ruralcart_common::user::{Address, User};

use crate::{RecordingGateway, TestServer};

/// One customer's device.
pub struct Customer {
    pub api: ApiClient,
    pub store: ClientStore,
}

impl Customer {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            store: ClientStore::open(MemoryStateStorage::new()),
        }
    }

    pub async fn login(&mut self, phone: &str) -> Result<User, ClientError> {
        session::login(&self.api, &mut self.store, phone).await
    }

    pub async fn register(&mut self, name: &str, phone: &str, village: &str) -> Result<User, ClientError> {
        let address = Address {
            label: "Home".into(),
            full: village.into(),
            phone: phone.into(),
        };
        session::register(&self.api, &mut self.store, name, phone, Some(address)).await
    }

    /// Fetch a product from the catalogue and put `quantity` of it in the
    /// cart. `Ok(false)` when the cart refused it.
    pub async fn add(&mut self, product: &str, quantity: u32) -> Result<bool, ClientError> {
        let product = self.api.product(&ProductId::from(product)).await?;
        Ok(self.store.add_to_cart(&product, quantity))
    }
}

/// Seeded server with the sample customer Rajesh logged in and a second
/// customer, Meena, not yet registered.
pub struct TestHarness {
    pub server: TestServer,
    pub sms: Arc<RecordingGateway>,
    pub rajesh: Customer,
    pub meena: Customer,
}

impl TestHarness {
    pub async fn setup() -> Self {
        let sms = Arc::new(RecordingGateway::default());
        let server = TestServer::start(sms.clone()).await;
        let mut rajesh = Customer::new(server.api.clone());
        rajesh
            .login("+919876543210")
            .await
            .expect("seeded user logs in");
        let meena = Customer::new(server.api.clone());
        Self {
            server,
            sms,
            rajesh,
            meena,
        }
    }
}
