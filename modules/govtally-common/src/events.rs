//! Governance event enum — decoded contract events, one variant per log type.
//!
//! `VoteCast` is the only variant the reducer acts on. The lifecycle and
//! admin variants are carried through the log for completeness and audit,
//! and classified as no-ops downstream.
//!
//! Events serialize to `serde_json::Value` for the generic event log; the
//! `type` tag becomes the `event_type` column.

use serde::{Deserialize, Serialize};

use crate::types::u128_dec;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GovernanceEvent {
    // -----------------------------------------------------------------------
    // Voting — the one state-mutating event
    // -----------------------------------------------------------------------
    VoteCast {
        voter: String,
        proposal_id: u64,
        /// 0 = against, 1 = for, 2 = abstain. Anything else is malformed
        /// but still recorded.
        support: u8,
        #[serde(with = "u128_dec")]
        votes: u128,
        /// Empty string on-chain means "no reason given".
        #[serde(default)]
        reason: String,
    },

    // -----------------------------------------------------------------------
    // Proposal lifecycle — reducer: no-op on all of these
    // -----------------------------------------------------------------------
    ProposalCreated {
        proposal_id: u64,
        proposer: String,
        start_block: u64,
        end_block: u64,
        #[serde(default)]
        description: String,
    },

    ProposalCreatedWithRequirements {
        proposal_id: u64,
        proposer: String,
        start_block: u64,
        end_block: u64,
        #[serde(with = "u128_dec")]
        proposal_threshold: u128,
        #[serde(with = "u128_dec")]
        quorum_votes: u128,
        #[serde(default)]
        description: String,
    },

    ProposalCanceled {
        proposal_id: u64,
    },

    ProposalQueued {
        proposal_id: u64,
        eta: u64,
    },

    ProposalExecuted {
        proposal_id: u64,
    },

    ProposalVetoed {
        proposal_id: u64,
    },

    // -----------------------------------------------------------------------
    // Governance parameter changes — no-op
    // -----------------------------------------------------------------------
    ProposalThresholdBpsSet {
        old_proposal_threshold_bps: u32,
        new_proposal_threshold_bps: u32,
    },

    QuorumVotesBpsSet {
        old_quorum_votes_bps: u32,
        new_quorum_votes_bps: u32,
    },

    VotingDelaySet {
        old_voting_delay: u64,
        new_voting_delay: u64,
    },

    VotingPeriodSet {
        old_voting_period: u64,
        new_voting_period: u64,
    },

    // -----------------------------------------------------------------------
    // Admin changes — no-op
    // -----------------------------------------------------------------------
    NewAdmin {
        old_admin: String,
        new_admin: String,
    },

    NewPendingAdmin {
        old_pending_admin: String,
        new_pending_admin: String,
    },

    NewImplementation {
        old_implementation: String,
        new_implementation: String,
    },

    NewVetoer {
        old_vetoer: String,
        new_vetoer: String,
    },
}

impl GovernanceEvent {
    /// The serde tag, used as the `event_type` column in the log.
    pub fn event_type(&self) -> &'static str {
        match self {
            GovernanceEvent::VoteCast { .. } => "vote_cast",
            GovernanceEvent::ProposalCreated { .. } => "proposal_created",
            GovernanceEvent::ProposalCreatedWithRequirements { .. } => {
                "proposal_created_with_requirements"
            }
            GovernanceEvent::ProposalCanceled { .. } => "proposal_canceled",
            GovernanceEvent::ProposalQueued { .. } => "proposal_queued",
            GovernanceEvent::ProposalExecuted { .. } => "proposal_executed",
            GovernanceEvent::ProposalVetoed { .. } => "proposal_vetoed",
            GovernanceEvent::ProposalThresholdBpsSet { .. } => "proposal_threshold_bps_set",
            GovernanceEvent::QuorumVotesBpsSet { .. } => "quorum_votes_bps_set",
            GovernanceEvent::VotingDelaySet { .. } => "voting_delay_set",
            GovernanceEvent::VotingPeriodSet { .. } => "voting_period_set",
            GovernanceEvent::NewAdmin { .. } => "new_admin",
            GovernanceEvent::NewPendingAdmin { .. } => "new_pending_admin",
            GovernanceEvent::NewImplementation { .. } => "new_implementation",
            GovernanceEvent::NewVetoer { .. } => "new_vetoer",
        }
    }

    /// Serialize for storage. The enum has no non-serializable fields, so
    /// this cannot fail at runtime.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("GovernanceEvent serializes to JSON")
    }

    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(payload.clone())
    }
}
