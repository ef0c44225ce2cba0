//! `KeyValueStore` trait: the single persistence seam.
//!
//! State containers serialize themselves to bytes and hand them to this
//! interface without knowing the underlying storage technology.

use async_trait::async_trait;

use crate::error::StoreError;

/// Backend-agnostic keyed byte storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the bytes stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether anything was removed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}
