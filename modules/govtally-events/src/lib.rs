//! Append-only log of decoded chain events.
//!
//! Stores opaque JSONB payloads keyed by chain position (block number,
//! transaction index, log index). Appends must arrive in emission order;
//! reads are sequential and gap-free. Zero knowledge of proposals, votes,
//! or any derived entity.
//!
//! Producers provide their own event types that serialize to
//! `serde_json::Value`.

pub mod memory;
pub mod store;
pub mod types;

pub use memory::MemoryEventLog;
pub use store::{migrate, EventLog, EventSource};
pub use types::{AppendEvent, StoredEvent};
