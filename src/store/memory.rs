use crate::core::{PriceUpdate, Product, ProductStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory product store keyed by product id
#[derive(Clone, Default)]
pub struct MemoryProductStore {
    inner: Arc<Mutex<BTreeMap<String, Product>>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products
            .into_iter()
            .map(|product| (product.id.clone(), product))
            .collect();
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let products = self.inner.lock().await;
        Ok(products.values().cloned().collect())
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        let products = self.inner.lock().await;
        Ok(products.get(id).cloned())
    }

    async fn create_product(&self, product: Product) -> Result<bool> {
        let mut products = self.inner.lock().await;
        match products.entry(product.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                debug!("Store CREATE for product: {}", product.id);
                slot.insert(product);
                Ok(true)
            }
        }
    }

    async fn update_price(&self, id: &str, update: &PriceUpdate) -> Result<bool> {
        let mut products = self.inner.lock().await;
        match products.get_mut(id) {
            Some(product) => {
                product.apply_price_update(update);
                debug!("Store UPDATE price for product: {}", id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
