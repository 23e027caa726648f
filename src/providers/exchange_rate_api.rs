use super::util::{RETRY_DELAY_MS, with_retry};
use crate::core::{CurrencyRateProvider, PricingError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Latest exchange rates from exchangerate-api.com.
pub struct ExchangeRateApiProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
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
struct LatestRatesResponse {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self))]
    async fn fetch_exchange_rate(&self, base: &str, quote: &str) -> Result<f64, PricingError> {
        let url = format!("{}/v4/latest/{}", self.base_url, base.to_uppercase());
        debug!("Requesting exchange rates from {}", url);

        let client = &self.client;
        let request_url = url.as_str();
        let response = with_retry(
            || async move { client.get(request_url).send().await },
            self.retries,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| {
            PricingError::upstream(format!("Request error: {e} for currency pair: {base}{quote}"))
        })?;

        if !response.status().is_success() {
            return Err(PricingError::upstream(format!(
                "HTTP error: {} for currency pair: {base}{quote}",
                response.status()
            )));
        }

        let text = response.text().await.map_err(|e| {
            PricingError::upstream(format!("Failed to read rate response for {base}{quote}: {e}"))
        })?;
        let data: LatestRatesResponse = serde_json::from_str(&text).map_err(|e| {
            PricingError::upstream(format!("Failed to parse JSON response for {base}{quote}: {e}"))
        })?;

        data.rates
            .get(&quote.to_uppercase())
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .ok_or_else(|| PricingError::upstream(format!("Failed to fetch {base} to {quote} rate")))
    }
}
