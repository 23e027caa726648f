pub mod disk;
pub mod memory;

use crate::core::ProductStore;
use crate::core::config::AppConfig;
use anyhow::Result;
use disk::DiskProductStore;
use memory::MemoryProductStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Opens the product store selected by the config: on disk when `data_path`
/// is set, in memory otherwise.
pub fn open_product_store(config: &AppConfig) -> Result<Arc<dyn ProductStore>> {
    match config.data_path() {
        Some(path) => {
            info!("Using product store at {}", path.display());
            Ok(Arc::new(DiskProductStore::open(&path)?))
        }
        None => {
            warn!("No data_path configured; products are kept in memory only");
            Ok(Arc::new(MemoryProductStore::new()))
        }
    }
}
