//! RuralCart storefront API.
//!
//! An axum router over a [`Storage`](store::Storage) backend, with
//! best-effort SMS notifications for order events.

pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod notify;
pub mod store;

use std::sync::Arc;

use axum::http::Method;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use notify::{Notifier, SmsGateway};
pub use store::{Storage, StoreError};

/// Shared by every handler.
pub struct AppState {
    pub store: Arc<dyn Storage>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(store: Arc<dyn Storage>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// State for a config: its storage backend and a logging SMS gateway.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StoreError> {
        Ok(Self::new(
            config.open_store()?,
            Notifier::logging(config.sms_latency()),
        ))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers(Any);

    http::routes()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` until the listener fails.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router).await
}
