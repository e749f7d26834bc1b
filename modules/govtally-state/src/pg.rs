//! Postgres-backed entity store. One table, `(namespace, id)` primary key,
//! JSONB body. Upserts replace the whole body.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::store::EntityStore;

#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn get(&self, namespace: &str, id: &str) -> Result<Option<Value>> {
        let row = sqlx::query_as::<_, (Value,)>(
            r#"
            SELECT data FROM entities
            WHERE namespace = $1 AND id = $2
            "#,
        )
        .bind(namespace)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(data,)| data))
    }

    async fn put(&self, namespace: &str, id: &str, value: Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO entities (namespace, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (namespace, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(namespace)
        .bind(id)
        .bind(&value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
