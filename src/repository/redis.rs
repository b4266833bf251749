//! Redis-backed store

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};

use super::KeyValueStore;
use crate::error::PersistenceError;

#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    /// Create a new Redis store and check the server answers
    pub async fn new(url: &str) -> Result<Self, PersistenceError> {
        let client = Client::open(url)?;
        let store = Self { client };
        store.ping().await?;
        Ok(store)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, PersistenceError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(PersistenceError::Unavailable(format!(
                "unexpected PING reply: {}",
                pong
            )))
        }
    }
}
