//! In-memory event log for tests and local tooling.
//!
//! Same ordering contract as the Postgres-backed log: appends must arrive
//! in chain order, seq starts at 1 and never has gaps.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::store::EventSource;
use crate::types::{AppendEvent, StoredEvent};

#[derive(Default)]
pub struct MemoryEventLog {
    events: RwLock<Vec<StoredEvent>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one decoded event. Returns the assigned sequence number.
    pub async fn append(&self, event: AppendEvent) -> Result<i64> {
        let mut events = self.events.write().await;

        if let Some(last) = events.last() {
            if event.position() <= last.position() {
                bail!(
                    "out-of-order append: position {:?} is not after {:?}",
                    event.position(),
                    last.position()
                );
            }
        }

        let seq = events.len() as i64 + 1;
        events.push(StoredEvent {
            seq,
            ts: fixed_ts(),
            block_number: event.block_number,
            tx_index: event.tx_index,
            log_index: event.log_index,
            tx_hash: event.tx_hash,
            tx_from: event.tx_from,
            event_type: event.event_type,
            payload: event.payload,
            schema_v: event.schema_v,
        });

        Ok(seq)
    }
}

#[async_trait]
impl EventSource for MemoryEventLog {
    async fn read_from(&self, seq_start: i64, limit: usize) -> Result<Vec<StoredEvent>> {
        let events = self.events.read().await;
        let start = (seq_start.max(1) - 1) as usize;

        Ok(events.iter().skip(start).take(limit).cloned().collect())
    }

    async fn latest_seq(&self) -> Result<i64> {
        Ok(self.events.read().await.len() as i64)
    }
}

/// Deterministic stand-in for the Postgres `now()` default. Replays must not
/// depend on wall-clock time.
fn fixed_ts() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}
