//! End-to-end tests for the storefront API.
//!
//! [`TestServer`] runs the real router on an ephemeral local port; tests drive
//! it through [`ruralcart_client`] the way the storefront does.

pub mod harness;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use ruralcart_client::ApiClient;
use ruralcart_common::message::SmsMessage;
use ruralcart_server::notify::NotifyError;
use ruralcart_server::store::{MemoryStorage, Storage};
use ruralcart_server::{router, serve, AppState, Notifier, SmsGateway};

static TRACING: Once = Once::new();

/// Route server logs to the test output when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var_os("RUST_LOG").is_some() {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        }
    });
}

/// SMS gateway that records messages instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<SmsMessage>>,
}

impl RecordingGateway {
    pub fn sent(&self) -> Vec<SmsMessage> {
        self.sent.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }
}

/// SMS gateway that always fails.
#[derive(Debug, Default)]
pub struct DownGateway;

#[async_trait]
impl SmsGateway for DownGateway {
    async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected {
            to: message.to.clone(),
            reason: "gateway down".into(),
        })
    }
}

/// A running server plus a client pointed at it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub api: ApiClient,
    pub store: Arc<dyn Storage>,
    task: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    /// Seeded in-memory store, SMS messages recorded into `gateway`.
    pub async fn start(gateway: Arc<dyn SmsGateway>) -> Self {
        let store = Arc::new(MemoryStorage::seeded().expect("seed store"));
        Self::with_store(store, gateway).await
    }

    pub async fn seeded() -> Self {
        Self::start(Arc::new(RecordingGateway::default())).await
    }

    pub async fn with_store(store: Arc<dyn Storage>, gateway: Arc<dyn SmsGateway>) -> Self {
        init_tracing();
        let state = AppState::new(Arc::clone(&store), Notifier::new(gateway));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let task = tokio::spawn(serve(listener, router(Arc::new(state))));
        let api = ApiClient::new(&format!("http://{addr}")).expect("client");
        Self {
            addr,
            api,
            store,
            task,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Poll `check` until it returns true or `attempts` × 20ms have passed.
pub async fn eventually(attempts: usize, mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..attempts {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    check()
}
