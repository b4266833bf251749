//! Business logic services

pub mod fleet;
pub mod inventory;

use std::sync::Arc;

use crate::{config::StorageConfig, error::AppResult, repository};

pub use inventory::{InventoryService, Saved};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub inventory: InventoryService,
}

impl Services {
    /// Connect the configured store and load the inventory
    pub async fn new(storage: &StorageConfig) -> AppResult<Self> {
        let store = repository::connect(storage).await?;
        Ok(Self::with_store(store, &storage.key).await)
    }

    /// Build services on top of an existing store
    pub async fn with_store(store: Arc<dyn repository::KeyValueStore>, key: &str) -> Self {
        Self {
            inventory: InventoryService::open(store, key).await,
        }
    }
}
