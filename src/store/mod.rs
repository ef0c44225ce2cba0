//! Persistence layer: keyed JSON slots over a pluggable key-value store.

pub mod libsql_backend;
pub mod memory;
mod migrations;
pub mod slot;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
pub use slot::{SharedState, slot_keys};
pub use traits::KeyValueStore;
