use std::{future::Future, str::FromStr, sync::Arc};

use serde::Serialize;
use tokio::sync::OnceCell;

use crate::{
    models::{Listing, QuoteUnit},
    AppError, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    /// Keep the first successful fetch per quote unit until the process exits.
    /// There is no TTL and no invalidation.
    #[default]
    Process,
    Disabled,
}
impl FromStr for CachePolicy {
    type Err = AppError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "process" => Ok(Self::Process),
            "disabled" => Ok(Self::Disabled),
            other => Err(AppError::ConfigError(format!(
                "MARKET_CACHE: expected 'process' or 'disabled', got '{other}'"
            ))),
        }
    }
}

/// One slot per quote unit. Concurrent misses on a slot share a single load;
/// a failed load leaves the slot empty.
pub struct ListingCache {
    policy: CachePolicy,
    slots: [OnceCell<Arc<Listing>>; 3],
}

impl ListingCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            slots: std::array::from_fn(|_| OnceCell::new()),
        }
    }
    pub fn cached(&self, unit: QuoteUnit) -> Option<Arc<Listing>> {
        self.slots[unit.slot()].get().cloned()
    }

    pub async fn get_or_load<F, Fut>(&self, unit: QuoteUnit, load: F) -> Result<Arc<Listing>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Listing>>,
    {
        match self.policy {
            CachePolicy::Disabled => Ok(Arc::new(load().await?)),
            CachePolicy::Process => self.slots[unit.slot()]
                .get_or_try_init(|| async move { load().await.map(Arc::new) })
                .await
                .cloned(),
        }
    }
}
