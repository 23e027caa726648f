//! Currency conversion abstractions

use super::error::PricingError;
use async_trait::async_trait;

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Returns how many units of `quote` one unit of `base` buys.
    async fn fetch_exchange_rate(&self, base: &str, quote: &str) -> Result<f64, PricingError>;
}
