//! Key-value persistence for the inventory blob

pub mod file;
pub mod memory;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::{StorageBackend, StorageConfig},
    error::PersistenceError,
};

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Whole-value string store. Values are read and written in full.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Cheap liveness check for readiness endpoints
    async fn ping(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Build the configured backend
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, PersistenceError> {
    let store: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::File => Arc::new(FileStore::open(&config.data_dir).await?),
        StorageBackend::Redis => Arc::new(RedisStore::new(&config.redis_url).await?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::info!("Using {:?} storage backend", config.backend);
    Ok(store)
}
