//! Durable key-value slots.
//!
//! A slot stores one text value per key and survives process restarts
//! (for the file-backed implementation). The job store depends only on the
//! [`DurableSlot`] trait, so tests can hand it an in-memory slot.

pub mod file;
pub mod memory;

use std::sync::Arc;

pub use file::FileSlot;
pub use memory::InMemorySlot;

/// Slot read/write failure.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("invalid slot key {0:?}")]
    InvalidKey(String),
    #[error("slot io error for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("slot unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous key-value storage for a serialized collection.
pub trait DurableSlot {
    /// Read the value stored under `key`; `Ok(None)` when nothing was stored yet.
    fn read(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), SlotError>;
}

impl<S> DurableSlot for Arc<S>
where
    S: DurableSlot + ?Sized,
{
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        (**self).write(key, value)
    }
}
