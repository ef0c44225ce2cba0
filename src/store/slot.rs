//! Keyed JSON slots and the shared state containers that live in them.
//!
//! Each slot is stored as `{"state": <T>, "version": N}`. A slot that is
//! missing, undecodable, or written under a different version loads as
//! `T::default()` (first-launch state) and is overwritten on the next write.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::traits::KeyValueStore;
use crate::error::StoreError;

/// Fixed slot identifiers.
pub mod slot_keys {
    /// Profile, onboarding progress, and settings.
    pub const USER: &str = "user-storage";
    /// Health records.
    pub const HEALTH: &str = "health-storage";
    /// Assistant chat history.
    pub const CHAT: &str = "chat-storage";
}

/// Current schema version written into every slot envelope.
pub const SCHEMA_VERSION: u32 = 0;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    state: &'a T,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

/// Serialize `state` into a versioned slot envelope.
pub fn encode_slot<T: Serialize>(state: &T) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec(&EnvelopeRef {
        state,
        version: SCHEMA_VERSION,
    })?)
}

/// Decode a slot envelope. Returns `Ok(None)` when the envelope was written
/// under a different schema version.
pub fn decode_slot<T: DeserializeOwned>(bytes: &[u8]) -> Result<Option<T>, StoreError> {
    let envelope: Envelope<T> = serde_json::from_slice(bytes)?;
    if envelope.version != SCHEMA_VERSION {
        return Ok(None);
    }
    Ok(Some(envelope.state))
}

/// Load a slot, falling back to `T::default()` on any failure.
pub async fn load_slot<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let bytes = match store.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(slot = key, "Slot empty, using defaults");
            return T::default();
        }
        Err(e) => {
            warn!(slot = key, error = %e, "Failed to read slot, using defaults");
            return T::default();
        }
    };

    match decode_slot(&bytes) {
        Ok(Some(state)) => state,
        Ok(None) => {
            warn!(
                slot = key,
                expected = SCHEMA_VERSION,
                "Slot written under another schema version, using defaults"
            );
            T::default()
        }
        Err(e) => {
            warn!(slot = key, error = %e, "Failed to decode slot, using defaults");
            T::default()
        }
    }
}

/// A process-wide state container persisted to one slot.
///
/// Cloning yields another handle to the same state. All mutations go through
/// [`SharedState::update`], which serializes writers so the persisted order
/// matches the mutation order.
pub struct SharedState<T> {
    key: &'static str,
    state: Arc<RwLock<T>>,
    write_lock: Arc<Mutex<()>>,
    store: Arc<dyn KeyValueStore>,
}

impl<T> Clone for SharedState<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            state: Arc::clone(&self.state),
            write_lock: Arc::clone(&self.write_lock),
            store: Arc::clone(&self.store),
        }
    }
}

impl<T> SharedState<T>
where
    T: Serialize + DeserializeOwned + Default + Send + Sync,
{
    /// Load the container from its slot.
    pub async fn load(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        let state = load_slot(store.as_ref(), key).await;
        Self::with_state(store, key, state)
    }

    /// Wrap an existing value without reading the store.
    pub fn with_state(store: Arc<dyn KeyValueStore>, key: &'static str, state: T) -> Self {
        Self {
            key,
            state: Arc::new(RwLock::new(state)),
            write_lock: Arc::new(Mutex::new(())),
            store,
        }
    }

    /// The slot this container persists to.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Read the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.state.read().await;
        f(&*guard)
    }

    /// Mutate the state and persist the result. Persistence failures are
    /// logged; in-memory state stays authoritative.
    pub async fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let _writer = self.write_lock.lock().await;
        let (result, encoded) = {
            let mut guard = self.state.write().await;
            let result = f(&mut *guard);
            (result, encode_slot(&*guard))
        };

        match encoded {
            Ok(bytes) => {
                if let Err(e) = self.store.set(self.key, &bytes).await {
                    warn!(slot = self.key, error = %e, "Failed to persist slot");
                }
            }
            Err(e) => warn!(slot = self.key, error = %e, "Failed to serialize slot"),
        }
        result
    }

    /// Write the current state to the store, surfacing any failure.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let _writer = self.write_lock.lock().await;
        let bytes = {
            let guard = self.state.read().await;
            encode_slot(&*guard)?
        };
        self.store.set(self.key, &bytes).await
    }
}

impl<T> SharedState<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + Send + Sync,
{
    /// Clone the current state.
    pub async fn snapshot(&self) -> T {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    fn memory() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn envelope_layout() {
        let bytes = encode_slot(&Counter { value: 3 }).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["state"]["value"], 3);
        assert_eq!(json["version"], SCHEMA_VERSION);
    }

    #[test]
    fn decode_rejects_other_versions() {
        let bytes = br#"{"state":{"value":1},"version":7}"#;
        let decoded: Option<Counter> = decode_slot(bytes).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn decode_accepts_missing_version_as_zero() {
        let bytes = br#"{"state":{"value":1}}"#;
        let decoded: Option<Counter> = decode_slot(bytes).unwrap();
        assert_eq!(decoded, Some(Counter { value: 1 }));
    }

    #[tokio::test]
    async fn load_falls_back_on_corrupt_slot() {
        let store = memory();
        store.set("counter", b"not json").await.unwrap();
        let loaded: Counter = load_slot(store.as_ref(), "counter").await;
        assert_eq!(loaded, Counter::default());
    }

    #[tokio::test]
    async fn update_persists_and_reloads() {
        let store = memory();
        let shared: SharedState<Counter> = SharedState::load(Arc::clone(&store), "counter").await;

        let after = shared
            .update(|c| {
                c.value += 2;
                c.value
            })
            .await;
        assert_eq!(after, 2);

        let reloaded: SharedState<Counter> = SharedState::load(store, "counter").await;
        assert_eq!(reloaded.snapshot().await, Counter { value: 2 });
    }

    #[tokio::test]
    async fn clones_share_state() {
        let shared: SharedState<Counter> = SharedState::load(memory(), "counter").await;
        let other = shared.clone();
        other.update(|c| c.value = 9).await;
        assert_eq!(shared.read(|c| c.value).await, 9);
    }
}
