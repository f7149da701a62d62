// src/services/storage.rs
use async_trait::async_trait;
use redis::Client;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::errors::{NotifyError, NotifyResult};

/// Minimal durable key-value capability the engine persists through.
///
/// Only two logical records live behind this: `notificationSettings`
/// (JSON-encoded settings) and `devicePushToken` (plain string). Everything
/// above this trait is unit-testable against [`MemoryStore`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> NotifyResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> NotifyResult<()>;
    async fn remove(&self, key: &str) -> NotifyResult<()>;
}

/// Storage keys for the engine's two durable records.
pub struct StorageKeys;

impl StorageKeys {
    pub const NOTIFICATION_SETTINGS: &'static str = "notificationSettings";
    pub const DEVICE_PUSH_TOKEN: &'static str = "devicePushToken";
}

/// Redis-backed store for deployments with a shared durable layer.
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    pub fn new(redis_url: &str) -> NotifyResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| NotifyError::StorageConnection(e.to_string()))?;
        Ok(Self { client })
    }

    async fn get_connection(&self) -> NotifyResult<redis::aio::Connection> {
        self.client
            .get_async_connection()
            .await
            .map_err(|e| NotifyError::StorageConnection(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> NotifyResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| NotifyError::StorageOperation(e.to_string()))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> NotifyResult<()> {
        let mut conn = self.get_connection().await?;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| NotifyError::StorageOperation(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> NotifyResult<()> {
        let mut conn = self.get_connection().await?;
        let _: () = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| NotifyError::StorageOperation(e.to_string()))?;
        Ok(())
    }
}

/// In-memory store for tests and local development.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> NotifyResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> NotifyResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> NotifyResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.set(StorageKeys::DEVICE_PUSH_TOKEN, "tok-123").await.unwrap();
        assert_eq!(
            store.get(StorageKeys::DEVICE_PUSH_TOKEN).await.unwrap(),
            Some("tok-123".to_string())
        );

        store.remove(StorageKeys::DEVICE_PUSH_TOKEN).await.unwrap();
        assert_eq!(store.get(StorageKeys::DEVICE_PUSH_TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = MemoryStore::new();
        store.set("k", "a").await.unwrap();
        store.set("k", "b").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("b".to_string()));
    }
}
