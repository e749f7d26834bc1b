//! Entity schemas for the derived governance view.
//!
//! References between entities are weak: a Vote holds the voter's and
//! proposal's string ids, never the structs themselves. Resolution goes
//! back through the store.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use govtally_common::types::{u128_dec, ProposalStatus};

/// A persistable entity. `NAMESPACE` scopes ids per entity type.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const NAMESPACE: &'static str;

    fn id(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Voter
// ---------------------------------------------------------------------------

/// A delegate address that can cast votes. Created on first sighting,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voter {
    /// Lowercase hex address.
    pub id: String,
    /// Monotonic count of distinct votes this address has cast.
    pub total_votes_count: u64,
    /// Delegated token ids, the weight proxy at vote time.
    pub nouns_represented: Vec<String>,
}

impl Voter {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            total_votes_count: 0,
            nouns_represented: Vec::new(),
        }
    }
}

impl Entity for Voter {
    const NAMESPACE: &'static str = "voter";

    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// A governance item votes accumulate against.
///
/// `created_block` and the BPS/coefficient snapshot are immutable once the
/// proposal exists; only the tallies, `status`, and `quorum_votes` mutate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Decimal string of the on-chain proposal number.
    pub id: String,
    pub status: ProposalStatus,
    #[serde(with = "u128_dec")]
    pub for_votes: u128,
    #[serde(with = "u128_dec")]
    pub against_votes: u128,
    #[serde(with = "u128_dec")]
    pub abstain_votes: u128,
    #[serde(with = "u128_dec")]
    pub total_supply: u128,
    pub min_quorum_votes_bps: u32,
    pub max_quorum_votes_bps: u32,
    /// Fixed-point, 6 decimals.
    pub quorum_coefficient: u64,
    /// Derived. Static until the dynamic-quorum start block covers this
    /// proposal, then recomputed on every vote.
    #[serde(with = "u128_dec")]
    pub quorum_votes: u128,
    pub created_block: u64,
}

impl Proposal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ProposalStatus::Pending,
            for_votes: 0,
            against_votes: 0,
            abstain_votes: 0,
            total_supply: 0,
            min_quorum_votes_bps: 0,
            max_quorum_votes_bps: 0,
            quorum_coefficient: 0,
            quorum_votes: 0,
            created_block: 0,
        }
    }
}

impl Entity for Proposal {
    const NAMESPACE: &'static str = "proposal";

    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// Vote
// ---------------------------------------------------------------------------

/// One voter's position on one proposal. Id is `{voter}-{proposal}`, so a
/// repeat vote or a re-delivered event replaces the row instead of adding
/// a second one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: String,
    /// Proposal id (weak reference).
    pub proposal: String,
    /// Voter id (weak reference).
    pub voter: String,
    #[serde(with = "u128_dec")]
    pub votes_raw: u128,
    #[serde(with = "u128_dec")]
    pub votes: u128,
    /// true iff support_detailed == 1.
    pub support: bool,
    /// Raw on-chain support value: 0 against, 1 for, 2 abstain.
    pub support_detailed: u8,
    /// None when the event carried an empty string. Unset and empty are
    /// distinct downstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub block_number: u64,
    /// Snapshot of the voter's represented tokens at vote time, not a live
    /// reference.
    pub nouns: Vec<String>,
}

impl Vote {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            proposal: String::new(),
            voter: String::new(),
            votes_raw: 0,
            votes: 0,
            support: false,
            support_detailed: 0,
            reason: None,
            block_number: 0,
            nouns: Vec::new(),
        }
    }
}

impl Entity for Vote {
    const NAMESPACE: &'static str = "vote";

    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// DynamicQuorumParams
// ---------------------------------------------------------------------------

/// Process-wide singleton controlling when quorum becomes dynamic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicQuorumParams {
    pub id: String,
    /// Quorum is static before this block, dynamic for proposals created
    /// after it. None means dynamic quorum never activated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_quorum_start_block: Option<u64>,
}

impl DynamicQuorumParams {
    pub const LATEST_ID: &'static str = "LATEST";

    pub fn latest() -> Self {
        Self {
            id: Self::LATEST_ID.to_string(),
            dynamic_quorum_start_block: None,
        }
    }
}

impl Entity for DynamicQuorumParams {
    const NAMESPACE: &'static str = "dynamic_quorum_params";

    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// IndexerCheckpoint
// ---------------------------------------------------------------------------

/// Last fully applied log position. Written after every event so a restart
/// resumes exactly where processing stopped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerCheckpoint {
    pub id: String,
    pub last_applied_seq: i64,
}

impl IndexerCheckpoint {
    pub const INDEXER_ID: &'static str = "indexer";

    pub fn new() -> Self {
        Self {
            id: Self::INDEXER_ID.to_string(),
            last_applied_seq: 0,
        }
    }
}

impl Default for IndexerCheckpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for IndexerCheckpoint {
    const NAMESPACE: &'static str = "indexer_checkpoint";

    fn id(&self) -> &str {
        &self.id
    }
}
