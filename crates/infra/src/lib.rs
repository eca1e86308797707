//! Infrastructure layer: durable storage slots, the job store, config.

pub mod config;
pub mod slot;
pub mod store;

pub use config::StoreConfig;
pub use slot::{DurableSlot, FileSlot, InMemorySlot, SlotError};
pub use store::{JobStore, PersistenceStatus, STORAGE_KEY, StoreError};
