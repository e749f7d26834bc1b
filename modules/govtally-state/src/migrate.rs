use anyhow::Result;
use sqlx::PgPool;

/// Create the entities table if it does not exist.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entities (
            namespace  TEXT         NOT NULL,
            id         TEXT         NOT NULL,
            data       JSONB        NOT NULL,
            updated_at TIMESTAMPTZ  NOT NULL DEFAULT now(),
            PRIMARY KEY (namespace, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
