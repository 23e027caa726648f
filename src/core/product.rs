//! Product records and the store they live in

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub karat: u8,
    /// Grams.
    pub weight: f64,
    #[serde(default)]
    pub making_charges: f64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub gold_price: Option<f64>,
    #[serde(default)]
    pub last_price_update: Option<DateTime<Utc>>,
}

/// Computed price fields written back by a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub price: f64,
    pub gold_price: f64,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn apply_price_update(&mut self, update: &PriceUpdate) {
        self.price = Some(update.price);
        self.gold_price = Some(update.gold_price);
        self.last_price_update = Some(update.updated_at);
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn get_product(&self, id: &str) -> Result<Option<Product>>;

    /// Inserts a product unless its id is taken. Returns `false` when a
    /// product with the same id already exists.
    async fn create_product(&self, product: Product) -> Result<bool>;

    /// Writes the price fields of an existing product. Returns `false` when
    /// no product has the given id.
    async fn update_price(&self, id: &str, update: &PriceUpdate) -> Result<bool>;
}
