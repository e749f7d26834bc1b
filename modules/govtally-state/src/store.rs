//! EntityStore — the persistence seam.
//!
//! Load-by-id and upsert, nothing else. Implementations must preserve write
//! ordering per (namespace, id); batching across ids is allowed.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::entities::Entity;

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Load the raw body for an id, or None if it was never saved.
    async fn get(&self, namespace: &str, id: &str) -> Result<Option<Value>>;

    /// Insert or replace the body for an id.
    async fn put(&self, namespace: &str, id: &str, value: Value) -> Result<()>;
}

/// Load a typed entity by id.
pub async fn load<E: Entity>(store: &dyn EntityStore, id: &str) -> Result<Option<E>> {
    match store.get(E::NAMESPACE, id).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Upsert a typed entity under its own id.
pub async fn save<E: Entity>(store: &dyn EntityStore, entity: &E) -> Result<()> {
    let value = serde_json::to_value(entity)?;
    store.put(E::NAMESPACE, entity.id(), value).await
}
