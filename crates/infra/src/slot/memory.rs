use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{DurableSlot, SlotError};

/// In-memory slot for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySlot {
    inner: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl InMemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-seeded with one value, as if written by an earlier session.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let slot = Self::new();
        if let Ok(mut map) = slot.inner.write() {
            map.insert(key.into(), value.into());
        }
        slot
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DurableSlot for InMemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        let map = self
            .inner
            .read()
            .map_err(|_| SlotError::Unavailable("in-memory slot lock poisoned".to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| SlotError::Unavailable("in-memory slot lock poisoned".to_string()))?;
        map.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
