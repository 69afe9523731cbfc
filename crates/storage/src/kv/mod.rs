use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::repository::{KeyValueStore, StorageError};

mod grade_repo;
mod identity_repo;
mod purge_repo;
mod quiz_repo;
mod release_repo;
mod result_repo;

/// Typed repositories layered over a single `KeyValueStore`.
#[derive(Clone)]
pub struct KvRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(value) = self.store.get(key).await? else {
            tracing::debug!(key, "store key missing");
            return Ok(None);
        };
        serde_json::from_value(value).map(Some).map_err(ser)
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        tracing::debug!(key, "writing store key");
        self.store.set(key, to_value(value)?).await
    }
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, StorageError> {
    serde_json::to_value(value).map_err(ser)
}
