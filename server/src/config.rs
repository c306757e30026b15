use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::store::{FileStorage, MemoryStorage, Storage, StoreError};

/// Runtime settings for the storefront API.
#[derive(Parser, Debug, Clone)]
#[command(name = "ruralcart-server", about = "RuralCart storefront API")]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// HTTP port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Keep data in this JSON file instead of memory only.
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Start without the sample catalogue.
    #[arg(long)]
    pub no_seed: bool,

    /// Simulated SMS gateway latency in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub sms_latency_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            data_file: None,
            no_seed: false,
            sms_latency_ms: 500,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn sms_latency(&self) -> Duration {
        Duration::from_millis(self.sms_latency_ms)
    }

    /// Build the configured storage backend.
    pub fn open_store(&self) -> Result<Arc<dyn Storage>, StoreError> {
        let seed = !self.no_seed;
        Ok(match &self.data_file {
            Some(path) => Arc::new(FileStorage::open(path, seed)?),
            None if seed => Arc::new(MemoryStorage::seeded()?),
            None => Arc::new(MemoryStorage::new()),
        })
    }
}
