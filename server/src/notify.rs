//! Best-effort SMS notifications.
//!
//! Messages are sent on their own tokio task after the store write has
//! committed. Callers never wait for delivery and a failed send only shows up
//! in the logs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use ruralcart_common::message::{self, SmsMessage};
use ruralcart_common::order::Order;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("gateway rejected message to {to}: {reason}")]
    Rejected { to: String, reason: String },

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Something that can deliver a text message.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError>;
}

/// Development gateway: waits a simulated network latency, then logs the message.
#[derive(Debug, Clone)]
pub struct LogGateway {
    latency: Duration,
}

impl LogGateway {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl SmsGateway for LogGateway {
    async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        tracing::info!(to = %message.to, body = %message.body, "sms sent");
        Ok(())
    }
}

/// Fire-and-forget dispatcher shared by the handlers.
#[derive(Clone)]
pub struct Notifier {
    gateway: Arc<dyn SmsGateway>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}

impl Notifier {
    pub fn new(gateway: Arc<dyn SmsGateway>) -> Self {
        Self { gateway }
    }

    pub fn logging(latency: Duration) -> Self {
        Self::new(Arc::new(LogGateway::new(latency)))
    }

    /// Send the order confirmation in the background.
    pub fn order_placed(&self, order: &Order) -> JoinHandle<()> {
        self.dispatch(message::order_confirmation(order))
    }

    /// Send a status update in the background, if the order's status has one.
    pub fn status_changed(&self, order: &Order) -> Option<JoinHandle<()>> {
        message::status_update(order).map(|msg| self.dispatch(msg))
    }

    fn dispatch(&self, message: SmsMessage) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            if let Err(e) = gateway.send(&message).await {
                tracing::warn!(to = %message.to, error = %e, "sms notification failed");
            }
        })
    }
}
