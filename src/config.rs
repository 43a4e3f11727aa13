use std::{net::SocketAddr, path::PathBuf, time::Duration};

use crate::{
    crediting_service::ConversionMode, market_service::CachePolicy, AppError, Result,
};

pub const CREDITING_BIND_ADDR: &str = "127.0.0.1:8000";
pub const MARKET_BIND_ADDR: &str = "127.0.0.1:8001";
const DEFAULT_WORKBOOK: &str = "crediting_data.xlsx";
const DEFAULT_MARKET_URL: &str = "https://coinmarketcap.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    pub workbook_path: PathBuf,
    pub conversion_mode: ConversionMode,
    pub market_url: String,
    pub cache_policy: CachePolicy,
}

impl Config {
    pub fn from_env(default_bind: &str) -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok(), default_bind)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        default_bind: &str,
    ) -> Result<Self> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| default_bind.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::ConfigError(format!("BIND_ADDR: {e}")))?;
        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| AppError::ConfigError(format!("REQUEST_TIMEOUT_SECS: {e}")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let workbook_path = lookup("CREDITING_WORKBOOK")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK));
        let conversion_mode = match lookup("PRICE_CONVERSION_MODE") {
            Some(raw) => raw.parse()?,
            None => ConversionMode::default(),
        };
        let market_url = lookup("MARKET_URL").unwrap_or_else(|| DEFAULT_MARKET_URL.to_string());
        let cache_policy = match lookup("MARKET_CACHE") {
            Some(raw) => raw.parse()?,
            None => CachePolicy::default(),
        };
        Ok(Self {
            bind_addr,
            request_timeout: Duration::from_secs(request_timeout),
            workbook_path,
            conversion_mode,
            market_url,
            cache_policy,
        })
    }
}
