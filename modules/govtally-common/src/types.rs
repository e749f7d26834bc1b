use serde::{Deserialize, Serialize};

// --- Proposal lifecycle ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Active,
    Canceled,
    Queued,
    Executed,
    Vetoed,
    Defeated,
    Succeeded,
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposalStatus::Pending => write!(f, "pending"),
            ProposalStatus::Active => write!(f, "active"),
            ProposalStatus::Canceled => write!(f, "canceled"),
            ProposalStatus::Queued => write!(f, "queued"),
            ProposalStatus::Executed => write!(f, "executed"),
            ProposalStatus::Vetoed => write!(f, "vetoed"),
            ProposalStatus::Defeated => write!(f, "defeated"),
            ProposalStatus::Succeeded => write!(f, "succeeded"),
        }
    }
}

// --- Vote support values ---

/// Raw support values as emitted on-chain.
pub const SUPPORT_AGAINST: u8 = 0;
pub const SUPPORT_FOR: u8 = 1;
pub const SUPPORT_ABSTAIN: u8 = 2;

// --- Fixed-point scales ---

/// Basis-point denominator: 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// The quorum coefficient is fixed-point with 6 decimals: 1_000_000 = 1.0.
pub const COEFFICIENT_SCALE: u128 = 1_000_000;

// --- Identity derivation ---

/// Canonical voter id: the address, lowercased. Chain clients disagree on
/// hex casing; the derived view must not.
pub fn voter_id(address: &str) -> String {
    address.to_ascii_lowercase()
}

/// Canonical proposal id: decimal string of the on-chain proposal number.
pub fn proposal_key(proposal_id: u64) -> String {
    proposal_id.to_string()
}

/// Canonical vote id: one row per voter per proposal. A repeat vote (or a
/// re-delivered event) lands on the same id and replaces the prior row.
pub fn vote_id(address: &str, proposal_id: u64) -> String {
    format!("{}-{}", voter_id(address), proposal_id)
}

// --- u128 JSON encoding ---

/// Vote weights and supplies are uint256 on-chain; we hold them as u128 and
/// serialize as decimal strings so JSON consumers never lose precision.
pub mod u128_dec {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u128>()
            .map_err(|e| de::Error::custom(format!("invalid u128 string '{raw}': {e}")))
    }
}
