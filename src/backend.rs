//! Asynchronous key-value backends the note store persists through.
//!
//! A backend stores one JSON document per string key and replaces it
//! whole on every write. [`KvBackend::update`] is the only way the store
//! mutates a value: the read, the transformation and the write happen as
//! one atomic step, so writers that do not share a store instance still
//! cannot interleave on the same key.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;

use crate::error::StoreError;

/// Transformation applied to the current value of a key.
///
/// Returns the replacement value, or `None` to leave the key untouched.
pub type Mutation =
    Box<dyn FnOnce(Option<JsonValue>) -> Result<Option<JsonValue>, StoreError> + Send>;

#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Returns the value under `key`, or `None` if nothing was stored.
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError>;

    /// Replaces the value under `key`.
    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError>;

    /// Atomically reads `key`, applies `mutation` and stores its result.
    ///
    /// Returns `true` if a new value was written. If `mutation` fails the
    /// stored value is left as it was.
    async fn update(&self, key: &str, mutation: Mutation) -> Result<bool, StoreError>;
}

/// In-process backend. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, JsonValue>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn update(&self, key: &str, mutation: Mutation) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock();
        match mutation(entries.get(key).cloned())? {
            Some(value) => {
                entries.insert(key.to_string(), value);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl<B: KvBackend + ?Sized> KvBackend for std::sync::Arc<B> {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }

    async fn update(&self, key: &str, mutation: Mutation) -> Result<bool, StoreError> {
        (**self).update(key, mutation).await
    }
}
