pub mod config;
pub mod crediting_service;
mod error;
pub mod market_service;
pub mod models;
pub mod routes;
pub mod utils;

pub use error::{AppError, Result};
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ecovault_dashboards=debug,tower_http=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
