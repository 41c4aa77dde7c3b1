//! Key-value slots the store persists into.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::StoreError;

/// A durable string-blob store keyed by fixed names.
///
/// `set` must not return until the value would survive a process restart.
pub trait DurableSlot {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes every key held by the slot.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Process-local slot with no durability. Handy for previews and tests.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: RefCell<HashMap<String, String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a slot with an existing blob, as if written by an earlier run.
    pub fn with_value(key: &str, value: &str) -> Self {
        let slot = Self::new();
        slot.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        slot
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl DurableSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.values.borrow_mut().clear();
        Ok(())
    }
}
