//! Derived governance state: entities and the store they live in.
//!
//! Entities are plain serde structs addressed by `(namespace, id)`. The
//! `EntityStore` trait is the persistence seam: the reducer only ever does
//! load-by-id and upsert through it, so any key-value backend with per-id
//! write ordering qualifies.

pub mod entities;
pub mod memory;
pub mod migrate;
pub mod pg;
pub mod store;

pub use entities::{
    DynamicQuorumParams, Entity, IndexerCheckpoint, Proposal, Vote, Voter,
};
pub use memory::MemoryStore;
pub use migrate::migrate;
pub use pg::PgEntityStore;
pub use store::{load, save, EntityStore};
