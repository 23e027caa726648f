//! Gold price abstractions and the combined market feed

use super::currency::CurrencyRateProvider;
use super::error::PricingError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Grams in one troy ounce.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

#[async_trait]
pub trait GoldPriceProvider: Send + Sync {
    /// Spot price of one gram of pure gold in the provider's currency.
    async fn fetch_gold_price_per_gram(&self) -> Result<f64, PricingError>;
}

/// Feed values a batch of prices is computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketQuote {
    pub gold_per_gram: f64,
    pub exchange_rate: f64,
}

/// Gold spot price and exchange rate sources, paired with the currencies
/// prices are quoted in.
pub struct PriceFeed {
    gold: Arc<dyn GoldPriceProvider>,
    rates: Arc<dyn CurrencyRateProvider>,
    base_currency: String,
    target_currency: String,
}

impl PriceFeed {
    pub fn new(
        gold: Arc<dyn GoldPriceProvider>,
        rates: Arc<dyn CurrencyRateProvider>,
        base_currency: &str,
        target_currency: &str,
    ) -> Self {
        Self {
            gold,
            rates,
            base_currency: base_currency.to_uppercase(),
            target_currency: target_currency.to_uppercase(),
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn target_currency(&self) -> &str {
        &self.target_currency
    }

    /// Fetches the gold price first, then the exchange rate.
    pub async fn fetch_quote(&self) -> Result<MarketQuote, PricingError> {
        let gold_per_gram = self.gold.fetch_gold_price_per_gram().await?;
        let exchange_rate = self
            .rates
            .fetch_exchange_rate(&self.base_currency, &self.target_currency)
            .await?;
        debug!(gold_per_gram, exchange_rate, "Fetched market quote");
        Ok(MarketQuote {
            gold_per_gram,
            exchange_rate,
        })
    }
}
