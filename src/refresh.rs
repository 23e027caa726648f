//! Recomputes stored product prices from the current market feed.

use crate::core::pricing::compute_price;
use crate::core::{MarketQuote, PriceFeed, PriceUpdate, PricingError, Product, ProductStore};
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshFailure {
    pub product_id: String,
    pub error: String,
}

/// Outcome of one pass over the product store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<RefreshFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RefreshReport {
    fn new(total: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
            started_at,
            finished_at: started_at,
        }
    }

    fn record_failure(&mut self, product_id: &str, error: &PricingError) {
        self.failed += 1;
        self.failures.push(RefreshFailure {
            product_id: product_id.to_string(),
            error: error.to_string(),
        });
    }

    fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }
}

pub struct PriceRefresher {
    store: Arc<dyn ProductStore>,
    feed: Arc<PriceFeed>,
    reuse_quotes: bool,
}

impl PriceRefresher {
    pub fn new(store: Arc<dyn ProductStore>, feed: Arc<PriceFeed>, reuse_quotes: bool) -> Self {
        Self {
            store,
            feed,
            reuse_quotes,
        }
    }

    /// Recomputes and stores the price of every product.
    ///
    /// Each product is handled on its own: a failure is logged and recorded
    /// in the report, and the product keeps its previous price. Only a
    /// failure to list the products fails the whole call.
    pub async fn refresh_all_prices(&self) -> Result<RefreshReport, PricingError> {
        let started_at = Utc::now();
        let products = self.store.list_products().await.map_err(|e| {
            error!(error = %e, "Failed to list products for price refresh");
            PricingError::Store(e)
        })?;
        info!(count = products.len(), "Refreshing product prices");

        let mut report = RefreshReport::new(products.len(), started_at);

        let shared_quote = if self.reuse_quotes && !products.is_empty() {
            match self.feed.fetch_quote().await {
                Ok(quote) => Some(quote),
                Err(e) => {
                    warn!(error = %e, "Market feed unavailable; no product prices were updated");
                    for product in &products {
                        report.record_failure(&product.id, &e);
                    }
                    return Ok(report.finish());
                }
            }
        } else {
            None
        };

        for product in &products {
            match self.refresh_product(product, shared_quote).await {
                Ok(update) => {
                    report.succeeded += 1;
                    info!(
                        product_id = %product.id,
                        old_price = ?product.price,
                        new_price = update.price,
                        "Updated product price"
                    );
                }
                Err(e) => {
                    warn!(product_id = %product.id, error = %e, "Failed to update product price");
                    report.record_failure(&product.id, &e);
                }
            }
        }

        let report = report.finish();
        info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            "Price refresh finished"
        );
        Ok(report)
    }

    async fn refresh_product(
        &self,
        product: &Product,
        shared_quote: Option<MarketQuote>,
    ) -> Result<PriceUpdate, PricingError> {
        let quote = match shared_quote {
            Some(quote) => quote,
            None => self.feed.fetch_quote().await?,
        };

        let breakdown = compute_price(
            product.karat,
            product.weight,
            product.making_charges,
            quote.gold_per_gram,
            quote.exchange_rate,
        )?;
        debug!(product_id = %product.id, ?breakdown, "Computed product price");

        let update = PriceUpdate {
            price: breakdown.total,
            gold_price: breakdown.per_gram_target,
            updated_at: Utc::now(),
        };
        if !self.store.update_price(&product.id, &update).await? {
            return Err(PricingError::Store(anyhow!(
                "product {} no longer exists",
                product.id
            )));
        }
        Ok(update)
    }
}

/// Runs a refresh every `period`, starting immediately. Runs never overlap.
pub fn spawn_periodic_refresh(refresher: Arc<PriceRefresher>, period: Duration) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "Scheduling periodic price refresh");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = refresher.refresh_all_prices().await {
                error!(error = %e, "Scheduled price refresh failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CurrencyRateProvider, GoldPriceProvider};
    use crate::store::memory::MemoryProductStore;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Gold feed that fails on the listed (1-based) calls.
    struct ScriptedGold {
        per_gram: f64,
        failing_calls: HashSet<usize>,
        calls: AtomicUsize,
    }

    impl ScriptedGold {
        fn new(per_gram: f64) -> Self {
            Self {
                per_gram,
                failing_calls: HashSet::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_on(mut self, calls: &[usize]) -> Self {
            self.failing_calls = calls.iter().copied().collect();
            self
        }
    }

    #[async_trait]
    impl GoldPriceProvider for ScriptedGold {
        async fn fetch_gold_price_per_gram(&self) -> Result<f64, PricingError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing_calls.contains(&call) {
                return Err(PricingError::upstream("No gold price found in response"));
            }
            Ok(self.per_gram)
        }
    }

    struct FixedRate(f64);

    #[async_trait]
    impl CurrencyRateProvider for FixedRate {
        async fn fetch_exchange_rate(&self, _base: &str, _quote: &str) -> Result<f64, PricingError> {
            Ok(self.0)
        }
    }

    fn product(id: &str, karat: u8, weight: f64, making_charges: f64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Item {id}"),
            karat,
            weight,
            making_charges,
            price: None,
            gold_price: None,
            last_price_update: None,
        }
    }

    fn refresher(
        store: &MemoryProductStore,
        gold: Arc<ScriptedGold>,
        reuse_quotes: bool,
    ) -> PriceRefresher {
        let feed = PriceFeed::new(gold, Arc::new(FixedRate(30.0)), "USD", "EGP");
        PriceRefresher::new(Arc::new(store.clone()), Arc::new(feed), reuse_quotes)
    }

    #[tokio::test]
    async fn test_refresh_updates_price_fields() {
        let store = MemoryProductStore::with_products([product("a", 18, 5.0, 50.0)]);
        let gold = Arc::new(ScriptedGold::new(100.0));

        let report = refresher(&store, gold, true).refresh_all_prices().await.unwrap();
        assert_eq!((report.total, report.succeeded, report.failed), (1, 1, 0));

        let stored = store.get_product("a").await.unwrap().unwrap();
        assert_eq!(stored.price, Some(11300.0));
        assert_eq!(stored.gold_price, Some(2250.0));
        assert!(stored.last_price_update.is_some());
        assert_eq!(stored.karat, 18);
        assert_eq!(stored.weight, 5.0);
        assert_eq!(stored.making_charges, 50.0);
    }

    #[tokio::test]
    async fn test_failure_on_second_product_does_not_stop_batch() {
        let store = MemoryProductStore::with_products([
            product("a", 18, 5.0, 50.0),
            product("b", 21, 3.0, 0.0),
            product("c", 24, 1.0, 10.0),
        ]);
        let gold = Arc::new(ScriptedGold::new(100.0).failing_on(&[2]));

        let report = refresher(&store, gold, false).refresh_all_prices().await.unwrap();
        assert_eq!((report.total, report.succeeded, report.failed), (3, 2, 1));
        assert_eq!(report.failures[0].product_id, "b");
        assert!(report.failures[0].error.contains("upstream unavailable"));

        assert_eq!(store.get_product("a").await.unwrap().unwrap().price, Some(11300.0));
        assert_eq!(store.get_product("b").await.unwrap().unwrap().price, None);
        assert_eq!(store.get_product("c").await.unwrap().unwrap().price, Some(3010.0));
    }

    #[tokio::test]
    async fn test_invalid_product_is_skipped() {
        let store = MemoryProductStore::with_products([
            product("a", 18, 5.0, 50.0),
            product("b", 0, 3.0, 0.0),
            product("c", 24, 1.0, 10.0),
        ]);
        let gold = Arc::new(ScriptedGold::new(100.0));

        let report = refresher(&store, gold, true).refresh_all_prices().await.unwrap();
        assert_eq!((report.succeeded, report.failed), (2, 1));
        assert!(report.failures[0].error.starts_with("validation failed"));
        assert!(store.get_product("b").await.unwrap().unwrap().last_price_update.is_none());
    }

    #[tokio::test]
    async fn test_shared_quote_failure_leaves_all_products_untouched() {
        let store = MemoryProductStore::with_products([
            product("a", 18, 5.0, 50.0),
            product("b", 22, 2.0, 0.0),
        ]);
        let gold = Arc::new(ScriptedGold::new(100.0).failing_on(&[1]));

        let report = refresher(&store, gold.clone(), true)
            .refresh_all_prices()
            .await
            .unwrap();
        assert_eq!((report.total, report.succeeded, report.failed), (2, 0, 2));
        assert_eq!(gold.calls.load(Ordering::SeqCst), 1);
        for stored in store.list_products().await.unwrap() {
            assert!(stored.price.is_none());
            assert!(stored.last_price_update.is_none());
        }
    }

    #[tokio::test]
    async fn test_feed_fetch_count_per_mode() {
        let products = [product("a", 18, 1.0, 0.0), product("b", 18, 2.0, 0.0), product("c", 18, 3.0, 0.0)];

        let store = MemoryProductStore::with_products(products.clone());
        let gold = Arc::new(ScriptedGold::new(100.0));
        refresher(&store, gold.clone(), true).refresh_all_prices().await.unwrap();
        assert_eq!(gold.calls.load(Ordering::SeqCst), 1);

        let store = MemoryProductStore::with_products(products);
        let gold = Arc::new(ScriptedGold::new(100.0));
        refresher(&store, gold.clone(), false).refresh_all_prices().await.unwrap();
        assert_eq!(gold.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_repeated_refresh_is_idempotent() {
        let store = MemoryProductStore::with_products([
            product("a", 18, 5.0, 50.0),
            product("b", 14, 7.3, 120.5),
        ]);
        let gold = Arc::new(ScriptedGold::new(97.31));
        let refresher = refresher(&store, gold, true);

        refresher.refresh_all_prices().await.unwrap();
        let first: Vec<_> = store
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.id, p.price, p.gold_price))
            .collect();

        refresher.refresh_all_prices().await.unwrap();
        let second: Vec<_> = store
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.id, p.price, p.gold_price))
            .collect();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_store_skips_feed() {
        let store = MemoryProductStore::new();
        let gold = Arc::new(ScriptedGold::new(100.0));

        let report = refresher(&store, gold.clone(), true).refresh_all_prices().await.unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(gold.calls.load(Ordering::SeqCst), 0);
    }
}
