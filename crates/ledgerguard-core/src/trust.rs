// TRUST VERIFICATION WALK
// Bounded stochastic corroboration walk over participants' local chains
//
// SAFETY INVARIANTS:
// 1. A walk never takes more than MAX_HOPS hops
// 2. Confidence stays within [0, 1]
// 3. An offline network pauses verification before any hop is spent
// 4. No node is visited twice and the verifier never hops to itself
// 5. The walk only reads state; it never mutates the network

use crate::network::Network;
use crate::node::NetworkNode;
use crate::policy::{
    CORROBORATION_DECAY, LIKELY_VERIFIED_CONFIDENCE, MAX_HOPS, TRUSTED_PATH_BOOST,
    VERIFIED_CONFIDENCE,
};
use crate::transaction::Transaction;
use log::debug;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Network unavailable; no hop budget consumed
    VerificationPaused,

    /// The verifier has nothing in its chain to start from
    NoTransactionHistory,

    /// Confidence >= 0.99
    Verified,

    /// Confidence >= 0.7
    LikelyVerified,

    Unverified,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::VerificationPaused => "verification_paused",
            VerificationStatus::NoTransactionHistory => "no_transaction_history",
            VerificationStatus::Verified => "verified",
            VerificationStatus::LikelyVerified => "likely_verified",
            VerificationStatus::Unverified => "unverified",
        }
    }

    /// Classify a final walk confidence.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= VERIFIED_CONFIDENCE {
            VerificationStatus::Verified
        } else if confidence >= LIKELY_VERIFIED_CONFIDENCE {
            VerificationStatus::LikelyVerified
        } else {
            VerificationStatus::Unverified
        }
    }

    /// Whether a driver may go on to attempt a transaction.
    /// A node with no history is allowed to bootstrap.
    pub fn permits_interaction(&self) -> bool {
        !matches!(
            self,
            VerificationStatus::Unverified | VerificationStatus::VerificationPaused
        )
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single trust walk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationResult {
    pub status: VerificationStatus,

    /// Corroboration strength in [0, 1]
    pub confidence: f64,

    /// Hops taken, at most MAX_HOPS
    pub hops: u32,

    /// Set when the walk reached a participant with enough recorded interactions
    pub trusted_path_found: bool,

    /// Network availability observed at the start of the walk
    pub network_available: bool,
}

impl VerificationResult {
    fn start(network_available: bool) -> Self {
        VerificationResult {
            status: VerificationStatus::Unverified,
            confidence: 0.0,
            hops: 0,
            trusted_path_found: false,
            network_available,
        }
    }
}

impl NetworkNode {
    /// Run a trust verification walk from this node.
    ///
    /// Starts from a random transaction in the local chain and hops between
    /// its participants, raising confidence when the next node corroborates
    /// the current transaction and decaying it when it does not. Reaching a
    /// trusted participant short-circuits the walk.
    ///
    /// `target` is the peer the caller intends to interact with; it is
    /// recorded in the logs but does not steer the walk.
    pub fn verify_trust<R: Rng + ?Sized>(
        &self,
        target: &NetworkNode,
        network: &Network,
        rng: &mut R,
    ) -> VerificationResult {
        let mut result = VerificationResult::start(network.is_online());

        if !result.network_available {
            result.status = VerificationStatus::VerificationPaused;
            debug!("trust walk {} -> {} paused: network offline", self.id(), target.id());
            return result;
        }

        let Some(mut tx) = self.chain().values().choose(rng) else {
            result.status = VerificationStatus::NoTransactionHistory;
            debug!("trust walk {} -> {}: no transaction history", self.id(), target.id());
            return result;
        };

        let mut visited: HashSet<&str> = HashSet::new();

        while result.confidence < VERIFIED_CONFIDENCE && result.hops < MAX_HOPS {
            result.hops += 1;

            let known = known_participants(tx, network);

            if known.iter().any(|n| n.is_trusted(self.trust_threshold())) {
                result.trusted_path_found = true;
                result.confidence = (result.confidence + TRUSTED_PATH_BOOST).min(1.0);
                break;
            }

            let candidates: Vec<&NetworkNode> = known
                .into_iter()
                .filter(|n| n.id() != self.id() && !visited.contains(n.id()))
                .collect();

            let Some(next) = candidates.choose(rng).copied() else {
                break;
            };
            visited.insert(next.id());

            if next.corroborates(tx) {
                result.confidence = 1.0 - 0.5f64.powi(result.hops as i32);
            } else {
                result.confidence *= CORROBORATION_DECAY;
            }

            match next.chain().values().choose(rng) {
                Some(following) => tx = following,
                None => break,
            }
        }

        result.status = VerificationStatus::from_confidence(result.confidence);
        debug!(
            "trust walk {} -> {}: {} (confidence {:.4}, {} hops, trusted path {})",
            self.id(),
            target.id(),
            result.status,
            result.confidence,
            result.hops,
            result.trusted_path_found
        );
        result
    }
}

/// Participants of `tx` that the network has registered, in canonical order.
fn known_participants<'n>(tx: &Transaction, network: &'n Network) -> Vec<&'n NetworkNode> {
    tx.participants()
        .iter()
        .filter_map(|id| network.node(id))
        .collect()
}
