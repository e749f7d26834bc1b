//! EventRouter — strictly ordered replay of the event log into the reducer.
//!
//! Single consumer, one event at a time, no concurrency: tallies are
//! read-then-incremented, so two events touching the same proposal or voter
//! must never interleave. The checkpoint entity records the last fully
//! applied seq after every event; a fatal reducer or store error halts the
//! loop and a restart resumes from the checkpoint.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error};

use govtally_events::EventSource;
use govtally_state::{load, save, EntityStore, IndexerCheckpoint};

use crate::reducer::VoteReducer;

pub struct EventRouter<S: EventSource> {
    source: S,
    reducer: VoteReducer,
    store: Arc<dyn EntityStore>,
    batch_size: usize,
}

impl<S: EventSource> EventRouter<S> {
    pub fn new(
        source: S,
        reducer: VoteReducer,
        store: Arc<dyn EntityStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            source,
            reducer,
            store,
            batch_size,
        }
    }

    /// Replay events from `seq_start` in order. Returns the last seq applied.
    pub async fn replay_from(&self, seq_start: i64) -> Result<i64> {
        let mut cursor = seq_start;
        let mut last_applied = seq_start.saturating_sub(1);

        loop {
            let events = self.source.read_from(cursor, self.batch_size).await?;
            if events.is_empty() {
                break;
            }

            for event in &events {
                self.reducer.apply(event).await?;
                last_applied = event.seq;
                self.write_checkpoint(last_applied).await?;
            }

            cursor = last_applied + 1;

            if events.len() < self.batch_size {
                break;
            }
        }

        Ok(last_applied)
    }

    /// Replay everything newer than the stored checkpoint.
    pub async fn resume(&self) -> Result<i64> {
        let checkpoint = self.checkpoint().await?;
        self.replay_from(checkpoint + 1).await
    }

    /// Tail the log: resume, then poll for new events until a fatal error.
    /// Partial application is never papered over — the first fatal error
    /// stops ingestion with the failing state intact for the operator.
    pub async fn run(&self, poll_interval: Duration) -> Result<()> {
        loop {
            match self.resume().await {
                Ok(last_applied) => {
                    debug!(last_applied, "Replay caught up");
                }
                Err(e) => {
                    error!(error = %e, "Ingestion halted on fatal error");
                    return Err(e);
                }
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// The last fully applied seq, or 0 if nothing was ever applied.
    pub async fn checkpoint(&self) -> Result<i64> {
        let checkpoint =
            load::<IndexerCheckpoint>(self.store.as_ref(), IndexerCheckpoint::INDEXER_ID).await?;

        Ok(checkpoint.map(|c| c.last_applied_seq).unwrap_or(0))
    }

    async fn write_checkpoint(&self, seq: i64) -> Result<()> {
        let mut checkpoint = IndexerCheckpoint::new();
        checkpoint.last_applied_seq = seq;
        save(self.store.as_ref(), &checkpoint).await
    }
}
