//! In-memory entity store for tests and local tooling.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::store::EntityStore;

#[derive(Default)]
pub struct MemoryStore {
    entities: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities in a namespace.
    pub async fn count(&self, namespace: &str) -> usize {
        self.entities
            .read()
            .await
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .count()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, namespace: &str, id: &str) -> Result<Option<Value>> {
        let entities = self.entities.read().await;
        Ok(entities.get(&(namespace.to_string(), id.to_string())).cloned())
    }

    async fn put(&self, namespace: &str, id: &str, value: Value) -> Result<()> {
        let mut entities = self.entities.write().await;
        entities.insert((namespace.to_string(), id.to_string()), value);
        Ok(())
    }
}
