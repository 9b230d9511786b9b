// Protocol constants and the greylisting blast-radius policy.

use serde::{Deserialize, Serialize};

/// Per-node trust threshold (successful interactions with one peer).
pub const DEFAULT_TRUST_THRESHOLD: u64 = 20;

/// A node counts as trusted once its total interactions exceed
/// `trust_threshold * TRUSTED_INTERACTION_MULTIPLIER`.
pub const TRUSTED_INTERACTION_MULTIPLIER: u64 = 10;

/// Hard bound on trust walk length.
pub const MAX_HOPS: u32 = 20;

/// Confidence at which a walk stops and reports `verified`.
pub const VERIFIED_CONFIDENCE: f64 = 0.99;

/// Confidence floor for `likely_verified`.
pub const LIKELY_VERIFIED_CONFIDENCE: f64 = 0.7;

/// Confidence added when a walk reaches a trusted participant.
pub const TRUSTED_PATH_BOOST: f64 = 0.5;

/// Multiplier applied to confidence on every failed corroboration.
pub const CORROBORATION_DECAY: f64 = 0.8;

/// Who gets greylisted when a broadcast uncovers a payload divergence.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PunishmentScope {
    /// Every registered participant of the transaction being broadcast.
    #[default]
    TransactionParticipants,

    /// Only the participant whose local chain diverged from the ledger.
    ConflictingNode,
}

impl PunishmentScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            PunishmentScope::TransactionParticipants => "transaction_participants",
            PunishmentScope::ConflictingNode => "conflicting_node",
        }
    }
}
