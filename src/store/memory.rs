//! In-memory `KeyValueStore`: used by tests and ephemeral sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::KeyValueStore;
use crate::error::StoreError;

/// A `HashMap` behind an async lock.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);
        assert!(store.get("user-storage").await.unwrap().is_none());

        store.set("user-storage", b"{}").await.unwrap();
        assert_eq!(store.get("user-storage").await.unwrap().unwrap(), b"{}");

        store.set("user-storage", b"[1]").await.unwrap();
        assert_eq!(store.get("user-storage").await.unwrap().unwrap(), b"[1]");
        assert_eq!(store.len().await, 1);

        assert!(store.remove("user-storage").await.unwrap());
        assert!(!store.remove("user-storage").await.unwrap());
        assert!(store.get("user-storage").await.unwrap().is_none());
    }
}
