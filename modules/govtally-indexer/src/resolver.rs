//! IdentityResolver — canonical ids and get-or-create semantics.
//!
//! The sole construction path for Voter, Proposal, Vote, and the dynamic
//! quorum singleton. A constructed entity is NOT persisted unless asked;
//! the caller saves exactly once per logical mutation, which keeps write
//! amplification at one upsert per entity per event.

use anyhow::Result;

use govtally_common::types::{proposal_key, voter_id};
use govtally_state::{load, save, DynamicQuorumParams, EntityStore, Proposal, Vote, Voter};

pub struct IdentityResolver<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    /// Load a voter by address, optionally constructing a zero-valued one.
    /// Returns None only when the voter is unknown and `create_if_missing`
    /// is false.
    pub async fn get_or_create_voter(
        &self,
        address: &str,
        create_if_missing: bool,
    ) -> Result<Option<Voter>> {
        let id = voter_id(address);
        if let Some(voter) = load::<Voter>(self.store, &id).await? {
            return Ok(Some(voter));
        }
        if !create_if_missing {
            return Ok(None);
        }

        Ok(Some(Voter::new(id)))
    }

    /// Load or construct a proposal with zeroed tallies and Pending status.
    pub async fn get_or_create_proposal(&self, proposal_id: u64) -> Result<Proposal> {
        let id = proposal_key(proposal_id);
        match load::<Proposal>(self.store, &id).await? {
            Some(proposal) => Ok(proposal),
            None => Ok(Proposal::new(id)),
        }
    }

    /// Load a vote by id, optionally constructing an empty one.
    /// `save_immediately` persists the fresh row for callers with no
    /// further mutations.
    pub async fn get_or_create_vote(
        &self,
        id: &str,
        create_if_missing: bool,
        save_immediately: bool,
    ) -> Result<Option<Vote>> {
        if let Some(vote) = load::<Vote>(self.store, id).await? {
            return Ok(Some(vote));
        }
        if !create_if_missing {
            return Ok(None);
        }

        let vote = Vote::new(id);
        if save_immediately {
            save(self.store, &vote).await?;
        }

        Ok(Some(vote))
    }

    /// The process-wide singleton. Dynamic quorum is off until a saved row
    /// says otherwise.
    pub async fn get_or_create_dynamic_quorum_params(&self) -> Result<DynamicQuorumParams> {
        match load::<DynamicQuorumParams>(self.store, DynamicQuorumParams::LATEST_ID).await? {
            Some(params) => Ok(params),
            None => Ok(DynamicQuorumParams::latest()),
        }
    }
}
