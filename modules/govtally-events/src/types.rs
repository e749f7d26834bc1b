//! Core types for the chain event log. Domain-agnostic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event as stored in Postgres. Returned by all read methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub seq: i64,
    pub ts: DateTime<Utc>,
    pub block_number: u64,
    pub tx_index: u32,
    pub log_index: u32,
    pub tx_hash: String,
    pub tx_from: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub schema_v: i16,
}

impl StoredEvent {
    /// Chain position. Total order across the whole log.
    pub fn position(&self) -> (u64, u32, u32) {
        (self.block_number, self.tx_index, self.log_index)
    }
}

/// An event to be appended. The ingestion driver decodes the log entry and
/// supplies its chain position; the store assigns seq and ts.
#[derive(Debug, Clone)]
pub struct AppendEvent {
    pub block_number: u64,
    pub tx_index: u32,
    pub log_index: u32,
    pub tx_hash: String,
    pub tx_from: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub schema_v: i16,
}

impl AppendEvent {
    /// Create an event from anything that serializes to JSON.
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            block_number: 0,
            tx_index: 0,
            log_index: 0,
            tx_hash: String::new(),
            tx_from: String::new(),
            event_type: event_type.into(),
            payload,
            schema_v: 1,
        }
    }

    pub fn at(mut self, block_number: u64, tx_index: u32, log_index: u32) -> Self {
        self.block_number = block_number;
        self.tx_index = tx_index;
        self.log_index = log_index;
        self
    }

    pub fn with_tx(mut self, tx_hash: impl Into<String>, tx_from: impl Into<String>) -> Self {
        self.tx_hash = tx_hash.into();
        self.tx_from = tx_from.into();
        self
    }

    pub fn with_schema_v(mut self, v: i16) -> Self {
        self.schema_v = v;
        self
    }

    pub fn position(&self) -> (u64, u32, u32) {
        (self.block_number, self.tx_index, self.log_index)
    }
}
