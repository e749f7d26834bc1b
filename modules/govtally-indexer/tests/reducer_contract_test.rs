//! Reducer contract tests.
//!
//! These run the full apply path against the in-memory store: entity
//! creation on demand, tally accumulation, dynamic quorum recomputation,
//! status transitions, and the idempotency guarantees the checkpoint
//! recovery story depends on.

use std::sync::Arc;

use chrono::Utc;

use govtally_common::error::GovTallyError;
use govtally_common::events::GovernanceEvent;
use govtally_common::types::{vote_id, ProposalStatus};
use govtally_events::StoredEvent;
use govtally_indexer::{ApplyResult, IdentityResolver, VoteReducer};
use govtally_state::{
    load, save, DynamicQuorumParams, Entity, EntityStore, MemoryStore, Proposal, Vote, Voter,
};

const VOTER_A: &str = "0xAAa1111111111111111111111111111111111111";
const VOTER_B: &str = "0xBbB2222222222222222222222222222222222222";

/// Build a StoredEvent the way the log would hand it to the router.
fn stored_event(seq: i64, block_number: u64, event: &GovernanceEvent) -> StoredEvent {
    StoredEvent {
        seq,
        ts: Utc::now(),
        block_number,
        tx_index: 0,
        log_index: seq as u32,
        tx_hash: format!("0xtx{seq:04}"),
        tx_from: VOTER_A.to_ascii_lowercase(),
        event_type: event.event_type().to_string(),
        payload: event.to_payload(),
        schema_v: 1,
    }
}

fn vote_cast(
    seq: i64,
    voter: &str,
    proposal_id: u64,
    support: u8,
    votes: u128,
    reason: &str,
) -> StoredEvent {
    stored_event(
        seq,
        100 + seq as u64,
        &GovernanceEvent::VoteCast {
            voter: voter.to_string(),
            proposal_id,
            support,
            votes,
            reason: reason.to_string(),
        },
    )
}

/// Seed a proposal with a quorum snapshot, as proposal creation would have.
async fn seed_proposal(store: &MemoryStore, proposal_id: u64, total_supply: u128) {
    let resolver = IdentityResolver::new(store);
    let mut proposal = resolver.get_or_create_proposal(proposal_id).await.unwrap();
    proposal.total_supply = total_supply;
    proposal.min_quorum_votes_bps = 1_000;
    proposal.max_quorum_votes_bps = 2_000;
    proposal.quorum_coefficient = 1_000_000;
    proposal.created_block = 50;
    save(store, &proposal).await.unwrap();
}

async fn seed_voter(store: &MemoryStore, address: &str, nouns: &[&str]) {
    let mut voter = Voter::new(address.to_ascii_lowercase());
    voter.nouns_represented = nouns.iter().map(|n| n.to_string()).collect();
    save(store, &voter).await.unwrap();
}

async fn enable_dynamic_quorum(store: &MemoryStore, start_block: u64) {
    let mut params = DynamicQuorumParams::latest();
    params.dynamic_quorum_start_block = Some(start_block);
    save(store, &params).await.unwrap();
}

async fn get_proposal(store: &MemoryStore, proposal_id: u64) -> Proposal {
    load::<Proposal>(store, &proposal_id.to_string())
        .await
        .unwrap()
        .expect("proposal should exist")
}

// =========================================================================
// Two votes on a fresh proposal
// =========================================================================

#[tokio::test]
async fn first_vote_activates_pending_proposal() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 1_000).await;
    seed_voter(&store, VOTER_A, &["noun-7"]).await;

    let reducer = VoteReducer::new(store.clone());
    let result = reducer.apply(&vote_cast(1, VOTER_A, 1, 1, 50, "")).await.unwrap();
    assert!(matches!(result, ApplyResult::Applied));

    let proposal = get_proposal(&store, 1).await;
    assert_eq!(proposal.for_votes, 50);
    assert_eq!(proposal.against_votes, 0);
    assert_eq!(proposal.status, ProposalStatus::Active);
}

#[tokio::test]
async fn against_vote_recomputes_dynamic_quorum() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 1_000).await;
    seed_voter(&store, VOTER_A, &[]).await;
    seed_voter(&store, VOTER_B, &[]).await;
    // Start block 10 < created block 50, so quorum is dynamic.
    enable_dynamic_quorum(&store, 10).await;

    let reducer = VoteReducer::new(store.clone());
    reducer.apply(&vote_cast(1, VOTER_A, 1, 1, 50, "")).await.unwrap();
    reducer.apply(&vote_cast(2, VOTER_B, 1, 0, 30, "")).await.unwrap();

    let proposal = get_proposal(&store, 1).await;
    assert_eq!(proposal.for_votes, 50);
    assert_eq!(proposal.against_votes, 30);
    // 30 of 1_000 = 300 bps opposition; coefficient 1.0 lifts the 1_000 bps
    // floor to 1_300 bps of 1_000 supply.
    assert_eq!(proposal.quorum_votes, 130);
}

#[tokio::test]
async fn quorum_stays_static_when_start_block_unset() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 1_000).await;
    seed_voter(&store, VOTER_A, &[]).await;

    let reducer = VoteReducer::new(store.clone());
    reducer.apply(&vote_cast(1, VOTER_A, 1, 0, 30, "")).await.unwrap();

    let proposal = get_proposal(&store, 1).await;
    assert_eq!(proposal.against_votes, 30);
    assert_eq!(proposal.quorum_votes, 0, "stored static value must survive");
}

#[tokio::test]
async fn quorum_stays_static_for_proposals_created_before_start_block() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 1_000).await;
    seed_voter(&store, VOTER_A, &[]).await;
    // Start block 50 is NOT strictly before created block 50.
    enable_dynamic_quorum(&store, 50).await;

    let reducer = VoteReducer::new(store.clone());
    reducer.apply(&vote_cast(1, VOTER_A, 1, 0, 30, "")).await.unwrap();

    let proposal = get_proposal(&store, 1).await;
    assert_eq!(proposal.quorum_votes, 0);
}

// =========================================================================
// Tally conservation
// =========================================================================

#[tokio::test]
async fn tallies_conserve_weights_and_malformed_support_is_excluded() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 10_000).await;
    seed_voter(&store, VOTER_A, &[]).await;
    seed_voter(&store, VOTER_B, &[]).await;

    let reducer = VoteReducer::new(store.clone());
    reducer.apply(&vote_cast(1, VOTER_A, 1, 1, 50, "")).await.unwrap();
    reducer.apply(&vote_cast(2, VOTER_B, 1, 2, 20, "")).await.unwrap();
    // Malformed support value: recorded, never tallied.
    reducer
        .apply(&vote_cast(3, "0xCC3333333333333333333333333333333333cCcC", 1, 7, 999, ""))
        .await
        .unwrap();

    let proposal = get_proposal(&store, 1).await;
    assert_eq!(
        proposal.for_votes + proposal.against_votes + proposal.abstain_votes,
        70
    );

    // The malformed vote still produced a Vote row.
    assert_eq!(store.count(Vote::NAMESPACE).await, 3);
}

// =========================================================================
// Vote row shape
// =========================================================================

#[tokio::test]
async fn empty_reason_is_unset_not_empty_string() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 1_000).await;
    seed_voter(&store, VOTER_A, &[]).await;

    let reducer = VoteReducer::new(store.clone());
    reducer.apply(&vote_cast(1, VOTER_A, 1, 1, 50, "")).await.unwrap();

    let key = vote_id(VOTER_A, 1);
    let vote = load::<Vote>(store.as_ref(), &key).await.unwrap().unwrap();
    assert_eq!(vote.reason, None);

    // The raw body must not carry the key at all — unset and empty are
    // distinct downstream.
    let raw = store.get(Vote::NAMESPACE, &key).await.unwrap().unwrap();
    assert!(raw.get("reason").is_none());
}

#[tokio::test]
async fn nonempty_reason_is_preserved() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 1_000).await;
    seed_voter(&store, VOTER_A, &[]).await;

    let reducer = VoteReducer::new(store.clone());
    reducer
        .apply(&vote_cast(1, VOTER_A, 1, 0, 50, "treasury risk"))
        .await
        .unwrap();

    let vote = load::<Vote>(store.as_ref(), &vote_id(VOTER_A, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(vote.reason.as_deref(), Some("treasury risk"));
    assert!(!vote.support);
    assert_eq!(vote.support_detailed, 0);
}

#[tokio::test]
async fn vote_snapshots_voter_nouns_and_block() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 1_000).await;
    seed_voter(&store, VOTER_A, &["noun-7", "noun-40"]).await;

    let reducer = VoteReducer::new(store.clone());
    reducer.apply(&vote_cast(1, VOTER_A, 1, 1, 2, "")).await.unwrap();

    let vote = load::<Vote>(store.as_ref(), &vote_id(VOTER_A, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(vote.nouns, vec!["noun-7", "noun-40"]);
    assert_eq!(vote.block_number, 101);
    assert_eq!(vote.proposal, "1");
    assert_eq!(vote.voter, VOTER_A.to_ascii_lowercase());
    assert_eq!(vote.votes_raw, 2);
    assert_eq!(vote.votes, 2);
}

// =========================================================================
// Unknown-voter anomaly
// =========================================================================

#[tokio::test]
async fn unknown_voter_is_force_created_and_vote_recorded() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 1_000).await;
    // No seed_voter: the address was never registered as a delegate.

    let reducer = VoteReducer::new(store.clone());
    let result = reducer.apply(&vote_cast(1, VOTER_A, 1, 1, 50, "")).await.unwrap();
    assert!(matches!(result, ApplyResult::Applied));

    let voter = load::<Voter>(store.as_ref(), &VOTER_A.to_ascii_lowercase())
        .await
        .unwrap()
        .expect("voter must be force-created");
    assert_eq!(voter.total_votes_count, 1);
    assert!(voter.nouns_represented.is_empty());

    let proposal = get_proposal(&store, 1).await;
    assert_eq!(proposal.for_votes, 50);
}

// =========================================================================
// Idempotency and replace semantics
// =========================================================================

#[tokio::test]
async fn redelivered_event_does_not_double_count() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 1_000).await;
    seed_voter(&store, VOTER_A, &[]).await;

    let reducer = VoteReducer::new(store.clone());
    let event = vote_cast(1, VOTER_A, 1, 1, 50, "");
    reducer.apply(&event).await.unwrap();
    reducer.apply(&event).await.unwrap();

    let proposal = get_proposal(&store, 1).await;
    assert_eq!(proposal.for_votes, 50);

    let voter = load::<Voter>(store.as_ref(), &VOTER_A.to_ascii_lowercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(voter.total_votes_count, 1);
}

#[tokio::test]
async fn repeat_vote_replaces_and_moves_weight_between_buckets() {
    let store = Arc::new(MemoryStore::new());
    seed_proposal(&store, 1, 1_000).await;
    seed_voter(&store, VOTER_A, &[]).await;

    let reducer = VoteReducer::new(store.clone());
    reducer.apply(&vote_cast(1, VOTER_A, 1, 1, 50, "")).await.unwrap();
    reducer.apply(&vote_cast(2, VOTER_A, 1, 0, 50, "changed my mind")).await.unwrap();

    let proposal = get_proposal(&store, 1).await;
    assert_eq!(proposal.for_votes, 0);
    assert_eq!(proposal.against_votes, 50);

    // One voter, one proposal: still a single Vote row.
    assert_eq!(store.count(Vote::NAMESPACE).await, 1);
    let vote = load::<Vote>(store.as_ref(), &vote_id(VOTER_A, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(vote.support_detailed, 0);
    assert_eq!(vote.reason.as_deref(), Some("changed my mind"));
}

// =========================================================================
// Overflow is fatal
// =========================================================================

#[tokio::test]
async fn tally_overflow_aborts_instead_of_wrapping() {
    let store = Arc::new(MemoryStore::new());
    let mut proposal = Proposal::new("1");
    proposal.for_votes = u128::MAX - 10;
    save(store.as_ref(), &proposal).await.unwrap();
    seed_voter(&store, VOTER_A, &[]).await;

    let reducer = VoteReducer::new(store.clone());
    let err = reducer
        .apply(&vote_cast(1, VOTER_A, 1, 1, 100, ""))
        .await
        .expect_err("overflow must halt ingestion");

    assert!(matches!(
        err.downcast_ref::<GovTallyError>(),
        Some(GovTallyError::TallyOverflow(_))
    ));
}

// =========================================================================
// Classification
// =========================================================================

#[tokio::test]
async fn lifecycle_and_admin_events_are_noops() {
    let store = Arc::new(MemoryStore::new());
    let reducer = VoteReducer::new(store.clone());

    let events = [
        GovernanceEvent::ProposalCreated {
            proposal_id: 1,
            proposer: VOTER_A.to_string(),
            start_block: 10,
            end_block: 20,
            description: "do the thing".to_string(),
        },
        GovernanceEvent::ProposalCanceled { proposal_id: 1 },
        GovernanceEvent::ProposalQueued { proposal_id: 1, eta: 99 },
        GovernanceEvent::ProposalExecuted { proposal_id: 1 },
        GovernanceEvent::ProposalVetoed { proposal_id: 1 },
        GovernanceEvent::QuorumVotesBpsSet {
            old_quorum_votes_bps: 1_000,
            new_quorum_votes_bps: 1_200,
        },
        GovernanceEvent::NewAdmin {
            old_admin: VOTER_A.to_string(),
            new_admin: VOTER_B.to_string(),
        },
    ];

    for (i, event) in events.iter().enumerate() {
        let result = reducer.apply(&stored_event(i as i64 + 1, 100, event)).await.unwrap();
        assert!(
            matches!(result, ApplyResult::NoOp),
            "{} should be a no-op",
            event.event_type()
        );
    }

    // Nothing was created or mutated.
    assert_eq!(store.count(Proposal::NAMESPACE).await, 0);
    assert_eq!(store.count(Voter::NAMESPACE).await, 0);
    assert_eq!(store.count(Vote::NAMESPACE).await, 0);
}

#[tokio::test]
async fn garbage_payload_reports_deserialize_error() {
    let store = Arc::new(MemoryStore::new());
    let reducer = VoteReducer::new(store.clone());

    let mut event = vote_cast(1, VOTER_A, 1, 1, 50, "");
    event.payload = serde_json::json!({"type": "vote_cast", "votes": 12});

    let result = reducer.apply(&event).await.unwrap();
    assert!(matches!(result, ApplyResult::DeserializeError(_)));
    assert_eq!(store.count(Vote::NAMESPACE).await, 0);
}
