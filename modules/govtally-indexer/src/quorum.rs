//! Dynamic quorum — the threshold rises with against-votes to resist
//! last-minute opposition swings.
//!
//! Formula (all fixed point):
//!   against_bps  = 10_000 * against_votes / total_supply
//!   adjustment   = coefficient * against_bps / 1_000_000
//!   quorum_bps   = min(max_bps, min_bps + adjustment)
//!   quorum_votes = quorum_bps * total_supply / 10_000

use govtally_common::error::GovTallyError;
use govtally_common::types::{BPS_DENOMINATOR, COEFFICIENT_SCALE};

/// Per-proposal quorum inputs, snapshotted at proposal creation and
/// immutable afterwards.
#[derive(Debug, Clone, Copy)]
pub struct QuorumParams {
    pub min_quorum_votes_bps: u32,
    pub max_quorum_votes_bps: u32,
    /// Fixed point, 6 decimals: 1_000_000 = 1.0.
    pub quorum_coefficient: u64,
}

/// Pure and deterministic; non-decreasing in `against_votes` for fixed
/// other inputs. Checked arithmetic throughout — overflow halts ingestion
/// instead of wrapping.
pub fn dynamic_quorum_votes(
    against_votes: u128,
    total_supply: u128,
    params: &QuorumParams,
) -> Result<u128, GovTallyError> {
    if total_supply == 0 {
        return Ok(0);
    }

    let against_bps = BPS_DENOMINATOR
        .checked_mul(against_votes)
        .ok_or_else(|| overflow("against-votes share"))?
        / total_supply;

    let adjustment_bps = (params.quorum_coefficient as u128)
        .checked_mul(against_bps)
        .ok_or_else(|| overflow("coefficient adjustment"))?
        / COEFFICIENT_SCALE;

    let quorum_bps = (params.min_quorum_votes_bps as u128)
        .checked_add(adjustment_bps)
        .ok_or_else(|| overflow("adjusted quorum bps"))?
        .min(params.max_quorum_votes_bps as u128);

    let quorum_votes = quorum_bps
        .checked_mul(total_supply)
        .ok_or_else(|| overflow("quorum votes"))?
        / BPS_DENOMINATOR;

    Ok(quorum_votes)
}

fn overflow(context: &str) -> GovTallyError {
    GovTallyError::TallyOverflow(format!("dynamic quorum: {context}"))
}
