use super::util::{RETRY_DELAY_MS, with_retry};
use crate::core::{GoldPriceProvider, PricingError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Spot gold prices from gold-api.com, quoted in USD per troy ounce.
pub struct GoldApiProvider {
    base_url: String,
    grams_per_ounce: f64,
    client: reqwest::Client,
    retries: usize,
}

impl GoldApiProvider {
    pub fn new(base_url: &str, grams_per_ounce: f64, client: reqwest::Client) -> Self {
        GoldApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            grams_per_ounce,
            client,
            retries: 0,
        }
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }
}

#[derive(Debug, Deserialize)]
struct GoldSpotResponse {
    price: Option<f64>,
}

#[async_trait]
impl GoldPriceProvider for GoldApiProvider {
    #[instrument(name = "GoldSpotFetch", skip(self))]
    async fn fetch_gold_price_per_gram(&self) -> Result<f64, PricingError> {
        let url = format!("{}/price/XAU", self.base_url);
        debug!("Requesting gold spot price from {}", url);

        let client = &self.client;
        let request_url = url.as_str();
        let response = with_retry(
            || async move { client.get(request_url).send().await },
            self.retries,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| PricingError::upstream(format!("Request error: {e} for URL: {url}")))?;

        if !response.status().is_success() {
            return Err(PricingError::upstream(format!(
                "HTTP error: {} for gold spot price",
                response.status()
            )));
        }

        let text = response.text().await.map_err(|e| {
            PricingError::upstream(format!("Failed to read gold price response: {e}"))
        })?;
        let data: GoldSpotResponse = serde_json::from_str(&text).map_err(|e| {
            PricingError::upstream(format!("Failed to parse gold price response: {e}"))
        })?;

        let spot = data
            .price
            .filter(|price| price.is_finite() && *price > 0.0)
            .ok_or_else(|| PricingError::upstream("No gold price found in response"))?;

        Ok(spot / self.grams_per_ounce)
    }
}
