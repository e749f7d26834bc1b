//! VoteReducer — projection of chain events into derived governance state.
//!
//! One event at a time, in log order. Each event is either acted upon
//! (`VoteCast`) or ignored (lifecycle and admin events). The reducer holds
//! no state between calls; everything lives in the entity store.
//!
//! Idempotency: votes are keyed by `{voter}-{proposal}`. Re-applying an
//! event replaces the prior Vote row and retracts its prior tally
//! contribution before adding the new one, so a re-delivery after a
//! partial failure never double-counts.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, error, warn};

use govtally_common::error::GovTallyError;
use govtally_common::events::GovernanceEvent;
use govtally_common::types::{
    vote_id, ProposalStatus, SUPPORT_ABSTAIN, SUPPORT_AGAINST, SUPPORT_FOR,
};
use govtally_events::StoredEvent;
use govtally_state::{save, EntityStore, Proposal, Vote};

use crate::quorum::{self, QuorumParams};
use crate::resolver::IdentityResolver;

// ---------------------------------------------------------------------------
// VoteReducer
// ---------------------------------------------------------------------------

/// Result of applying a single event.
#[derive(Debug)]
pub enum ApplyResult {
    /// The event mutated derived state.
    Applied,
    /// The event required no state change (lifecycle, admin).
    NoOp,
    /// The event payload could not be deserialized.
    DeserializeError(String),
}

pub struct VoteReducer {
    store: Arc<dyn EntityStore>,
}

impl VoteReducer {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Apply a single event to the derived view. Idempotent.
    pub async fn apply(&self, event: &StoredEvent) -> Result<ApplyResult> {
        let parsed = match GovernanceEvent::from_payload(&event.payload) {
            Ok(e) => e,
            Err(e) => {
                warn!(seq = event.seq, error = %e, "Failed to deserialize event payload");
                return Ok(ApplyResult::DeserializeError(e.to_string()));
            }
        };

        match parsed {
            GovernanceEvent::VoteCast {
                voter,
                proposal_id,
                support,
                votes,
                reason,
            } => {
                self.apply_vote_cast(event, &voter, proposal_id, support, votes, reason)
                    .await
            }
            other => {
                debug!(
                    seq = event.seq,
                    event_type = other.event_type(),
                    "No-op (lifecycle or admin event)"
                );
                Ok(ApplyResult::NoOp)
            }
        }
    }

    async fn apply_vote_cast(
        &self,
        event: &StoredEvent,
        voter_address: &str,
        proposal_id: u64,
        support: u8,
        votes: u128,
        reason: String,
    ) -> Result<ApplyResult> {
        let store = self.store.as_ref();
        let resolver = IdentityResolver::new(store);

        let mut proposal = resolver.get_or_create_proposal(proposal_id).await?;

        let vote_key = vote_id(voter_address, proposal_id);
        let prior_vote = resolver.get_or_create_vote(&vote_key, false, false).await?;

        // A vote from an address never registered as a delegate should not
        // be possible. Surface it, then force-create the voter and record
        // the vote anyway — the ledger stays complete.
        if resolver
            .get_or_create_voter(voter_address, false)
            .await?
            .is_none()
        {
            error!(
                voter = %voter_address,
                tx_hash = %event.tx_hash,
                "Voter not found on VoteCast; force-creating"
            );
        }
        let mut voter = resolver
            .get_or_create_voter(voter_address, true)
            .await?
            .ok_or_else(|| anyhow!("voter {voter_address} missing after get-or-create"))?;

        let mut vote = resolver
            .get_or_create_vote(&vote_key, true, false)
            .await?
            .ok_or_else(|| anyhow!("vote {vote_key} missing after get-or-create"))?;

        vote.proposal = proposal.id.clone();
        vote.voter = voter.id.clone();
        vote.votes_raw = votes;
        vote.votes = votes;
        vote.support = support == SUPPORT_FOR;
        vote.support_detailed = support;
        vote.nouns = voter.nouns_represented.clone();
        vote.block_number = event.block_number;
        vote.reason = if reason.is_empty() { None } else { Some(reason) };

        save(store, &vote).await?;

        // Replace, don't add: if this vote id already contributed, retract
        // that contribution before crediting the new weight.
        if let Some(prior) = &prior_vote {
            retract_tally(&mut proposal, prior)?;
        }
        accumulate_tally(&mut proposal, support, votes)?;

        let params = resolver.get_or_create_dynamic_quorum_params().await?;
        let using_dynamic_quorum = params
            .dynamic_quorum_start_block
            .is_some_and(|start| start < proposal.created_block);

        if using_dynamic_quorum {
            proposal.quorum_votes = quorum::dynamic_quorum_votes(
                proposal.against_votes,
                proposal.total_supply,
                &QuorumParams {
                    min_quorum_votes_bps: proposal.min_quorum_votes_bps,
                    max_quorum_votes_bps: proposal.max_quorum_votes_bps,
                    quorum_coefficient: proposal.quorum_coefficient,
                },
            )?;
        }

        // Activation is normally driven by the block-threshold event; the
        // first vote activating here guards against that having been missed.
        if proposal.status == ProposalStatus::Pending {
            proposal.status = ProposalStatus::Active;
        }

        save(store, &proposal).await?;

        if prior_vote.is_none() {
            voter.total_votes_count += 1;
        }
        save(store, &voter).await?;

        Ok(ApplyResult::Applied)
    }
}

// ---------------------------------------------------------------------------
// Tally arithmetic — checked, never wrapping
// ---------------------------------------------------------------------------

/// Credit exactly one accumulator. Support values outside {0,1,2} are a
/// documented contract gap: the Vote row is kept, the tallies are not
/// touched.
fn accumulate_tally(
    proposal: &mut Proposal,
    support: u8,
    votes: u128,
) -> Result<(), GovTallyError> {
    let bucket = match support {
        SUPPORT_AGAINST => &mut proposal.against_votes,
        SUPPORT_FOR => &mut proposal.for_votes,
        SUPPORT_ABSTAIN => &mut proposal.abstain_votes,
        other => {
            warn!(
                proposal = %proposal.id,
                support = other,
                "Malformed support value; vote recorded without tally impact"
            );
            return Ok(());
        }
    };

    *bucket = bucket.checked_add(votes).ok_or_else(|| {
        GovTallyError::TallyOverflow(format!(
            "proposal {} accumulator for support {}",
            proposal.id, support
        ))
    })?;

    Ok(())
}

/// Undo the contribution a prior Vote row made. A malformed prior support
/// value never credited a bucket, so there is nothing to retract.
fn retract_tally(proposal: &mut Proposal, prior: &Vote) -> Result<(), GovTallyError> {
    let bucket = match prior.support_detailed {
        SUPPORT_AGAINST => &mut proposal.against_votes,
        SUPPORT_FOR => &mut proposal.for_votes,
        SUPPORT_ABSTAIN => &mut proposal.abstain_votes,
        _ => return Ok(()),
    };

    *bucket = bucket.checked_sub(prior.votes).ok_or_else(|| {
        GovTallyError::TallyOverflow(format!(
            "proposal {} retraction below zero for vote {}",
            proposal.id, prior.id
        ))
    })?;

    Ok(())
}
