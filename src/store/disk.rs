use crate::core::{PriceUpdate, Product, ProductStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

const PRODUCTS_PARTITION: &str = "products";

/// Product store persisted in a fjall keyspace, one JSON document per product.
pub struct DiskProductStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    /// Held across read-modify-write sequences.
    writes: Mutex<()>,
}

impl DiskProductStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path.join("products"))
            .open()
            .with_context(|| format!("Failed to open product store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PRODUCTS_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open products partition")?;

        Ok(Self {
            keyspace,
            partition,
            writes: Mutex::new(()),
        })
    }

    fn read(&self, id: &str) -> Result<Option<Product>> {
        match self.partition.get(id.as_bytes())? {
            Some(value) => {
                let product = serde_json::from_slice(&value)
                    .with_context(|| format!("Corrupt product record: {id}"))?;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    fn write(&self, product: &Product) -> Result<()> {
        self.partition
            .insert(product.id.as_bytes(), serde_json::to_vec(product)?)?;
        self.keyspace.persist(PersistMode::SyncData)?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for DiskProductStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.partition
            .iter()
            .map(|entry| -> Result<Product> {
                let (key, value) = entry?;
                serde_json::from_slice(&value).with_context(|| {
                    format!("Corrupt product record: {}", String::from_utf8_lossy(&key))
                })
            })
            .collect()
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        self.read(id)
    }

    async fn create_product(&self, product: Product) -> Result<bool> {
        let _guard = self.writes.lock().await;
        if self.partition.contains_key(product.id.as_bytes())? {
            return Ok(false);
        }
        self.write(&product)?;
        debug!("Store CREATE for product: {}", product.id);
        Ok(true)
    }

    async fn update_price(&self, id: &str, update: &PriceUpdate) -> Result<bool> {
        let _guard = self.writes.lock().await;
        let Some(mut product) = self.read(id)? else {
            return Ok(false);
        };
        product.apply_price_update(update);
        self.write(&product)?;
        debug!("Store UPDATE price for product: {}", id);
        Ok(true)
    }
}
