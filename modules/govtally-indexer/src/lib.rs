//! Core governance indexer: identity resolution, the vote reducer, dynamic
//! quorum math, and the ordered replay loop over the chain event log.

pub mod quorum;
pub mod reducer;
pub mod resolver;
pub mod router;

pub use reducer::{ApplyResult, VoteReducer};
pub use resolver::IdentityResolver;
pub use router::EventRouter;
