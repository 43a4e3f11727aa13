mod crediting;
mod market;
pub use crediting::*;
pub use market::*;

use std::sync::Arc;

use crate::crediting_service::CreditingService;
use crate::market_service::MarketService;

#[derive(Clone)]
pub struct CreditingState {
    pub crediting_service: Arc<CreditingService>,
}
impl CreditingState {
    pub fn new(crediting_service: CreditingService) -> Self {
        Self {
            crediting_service: Arc::new(crediting_service),
        }
    }
}

#[derive(Clone)]
pub struct MarketState {
    pub market_service: Arc<MarketService>,
}
impl MarketState {
    pub fn new(market_service: MarketService) -> Self {
        Self {
            market_service: Arc::new(market_service),
        }
    }
}
