//! EventLog — append-only chain event log backed by Postgres.
//!
//! Appends are accepted only in chain order (block number, transaction
//! index, log index). Gap-free reads are guaranteed internally: consumers
//! never see BIGSERIAL gaps from rolled-back or in-flight transactions.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::types::{AppendEvent, StoredEvent};

/// Anything the router can replay events out of, in sequence order.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn read_from(&self, seq_start: i64, limit: usize) -> Result<Vec<StoredEvent>>;
    async fn latest_seq(&self) -> Result<i64>;
}

#[async_trait]
impl<S: EventSource + ?Sized> EventSource for std::sync::Arc<S> {
    async fn read_from(&self, seq_start: i64, limit: usize) -> Result<Vec<StoredEvent>> {
        (**self).read_from(seq_start, limit).await
    }

    async fn latest_seq(&self) -> Result<i64> {
        (**self).latest_seq().await
    }
}

/// Create the chain_events table if it does not exist.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chain_events (
            seq          BIGSERIAL    PRIMARY KEY,
            ts           TIMESTAMPTZ  NOT NULL DEFAULT now(),
            block_number BIGINT       NOT NULL,
            tx_index     INT          NOT NULL,
            log_index    INT          NOT NULL,
            tx_hash      TEXT         NOT NULL,
            tx_from      TEXT         NOT NULL,
            event_type   TEXT         NOT NULL,
            payload      JSONB        NOT NULL,
            schema_v     SMALLINT     NOT NULL DEFAULT 1,
            UNIQUE (block_number, tx_index, log_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Append-only event log. The single source of truth for the indexer.
#[derive(Clone)]
pub struct EventLog {
    pool: PgPool,
}

impl EventLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one decoded event. Returns the assigned sequence number.
    ///
    /// The log enforces emission order: an event at or before the last
    /// stored chain position is rejected. Seq therefore increases with
    /// chain position, and replaying by seq replays in chain order.
    pub async fn append(&self, event: AppendEvent) -> Result<i64> {
        if let Some(last) = self.last_position().await? {
            if event.position() <= last {
                bail!(
                    "out-of-order append: position {:?} is not after {:?}",
                    event.position(),
                    last
                );
            }
        }

        let row = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO chain_events
                (block_number, tx_index, log_index, tx_hash, tx_from, event_type, payload, schema_v)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING seq
            "#,
        )
        .bind(event.block_number as i64)
        .bind(event.tx_index as i32)
        .bind(event.log_index as i32)
        .bind(&event.tx_hash)
        .bind(&event.tx_from)
        .bind(&event.event_type)
        .bind(&event.payload)
        .bind(event.schema_v)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Read events in flat sequence order starting from `seq_start` (inclusive).
    ///
    /// **Gap-free guarantee:** If concurrent transactions created a momentary
    /// gap, this returns events only up to the gap boundary. The next call
    /// picks up where it left off once the gap closes.
    pub async fn read_from(&self, seq_start: i64, limit: usize) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query_as::<_, StoredEvent>(
            r#"
            SELECT seq, ts, block_number, tx_index, log_index, tx_hash, tx_from,
                   event_type, payload, schema_v
            FROM chain_events
            WHERE seq >= $1
            ORDER BY seq ASC
            LIMIT $2
            "#,
        )
        .bind(seq_start)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        // Enforce gap-free: stop at the first gap in the sequence.
        let mut result = Vec::with_capacity(rows.len());
        let mut expected_seq = seq_start;

        for row in rows {
            if row.seq != expected_seq {
                break;
            }
            expected_seq = row.seq + 1;
            result.push(row);
        }

        Ok(result)
    }

    /// Read a single event by sequence number.
    pub async fn read_event(&self, seq: i64) -> Result<Option<StoredEvent>> {
        let row = sqlx::query_as::<_, StoredEvent>(
            r#"
            SELECT seq, ts, block_number, tx_index, log_index, tx_hash, tx_from,
                   event_type, payload, schema_v
            FROM chain_events
            WHERE seq = $1
            "#,
        )
        .bind(seq)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Read events filtered by event type, in sequence order.
    pub async fn read_by_type(
        &self,
        event_type: &str,
        seq_start: i64,
        limit: usize,
    ) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query_as::<_, StoredEvent>(
            r#"
            SELECT seq, ts, block_number, tx_index, log_index, tx_hash, tx_from,
                   event_type, payload, schema_v
            FROM chain_events
            WHERE event_type = $1 AND seq >= $2
            ORDER BY seq ASC
            LIMIT $3
            "#,
        )
        .bind(event_type)
        .bind(seq_start)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The latest committed sequence number, or 0 if the table is empty.
    pub async fn latest_seq(&self) -> Result<i64> {
        let row = sqlx::query_as::<_, (Option<i64>,)>("SELECT MAX(seq) FROM chain_events")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0.unwrap_or(0))
    }

    async fn last_position(&self) -> Result<Option<(u64, u32, u32)>> {
        let row = sqlx::query_as::<_, (i64, i32, i32)>(
            r#"
            SELECT block_number, tx_index, log_index
            FROM chain_events
            ORDER BY seq DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(b, t, l)| (b as u64, t as u32, l as u32)))
    }
}

#[async_trait]
impl EventSource for EventLog {
    async fn read_from(&self, seq_start: i64, limit: usize) -> Result<Vec<StoredEvent>> {
        EventLog::read_from(self, seq_start, limit).await
    }

    async fn latest_seq(&self) -> Result<i64> {
        EventLog::latest_seq(self).await
    }
}

// ---------------------------------------------------------------------------
// sqlx::FromRow for StoredEvent
// ---------------------------------------------------------------------------

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredEvent {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(StoredEvent {
            seq: row.try_get("seq")?,
            ts: row.try_get("ts")?,
            block_number: row.try_get::<i64, _>("block_number")? as u64,
            tx_index: row.try_get::<i32, _>("tx_index")? as u32,
            log_index: row.try_get::<i32, _>("log_index")? as u32,
            tx_hash: row.try_get("tx_hash")?,
            tx_from: row.try_get("tx_from")?,
            event_type: row.try_get("event_type")?,
            payload: row.try_get("payload")?,
            schema_v: row.try_get("schema_v")?,
        })
    }
}
