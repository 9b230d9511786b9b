// NETWORK NODE
// Local view of a participant: its chain cache, peer counters and greylist flag
//
// SAFETY INVARIANTS:
// 1. The local chain is only ever appended to
// 2. Counters and the greylist flag change only through the Network
// 3. `adversarial` is measurement-only; no decision in this crate reads it

use crate::policy::{DEFAULT_TRUST_THRESHOLD, TRUSTED_INTERACTION_MULTIPLIER};
use crate::transaction::Transaction;
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct NetworkNode {
    /// Unique node identifier
    id: String,

    /// Sybil marker, read only by external measurement
    adversarial: bool,

    /// Transactions as last known to this node, keyed by id
    chain: BTreeMap<String, Transaction>,

    /// Punitive flag set by the Network on a detected inconsistency
    greylisted: bool,

    /// Diagnostics only: transaction ids on which this node's chain diverged
    known_discrepancies: BTreeSet<String>,

    /// Successful interactions per peer id (absent = 0)
    successful_interactions: HashMap<String, u64>,

    trust_threshold: u64,
}

impl NetworkNode {
    pub fn new(id: impl Into<String>, adversarial: bool) -> Self {
        NetworkNode {
            id: id.into(),
            adversarial,
            chain: BTreeMap::new(),
            greylisted: false,
            known_discrepancies: BTreeSet::new(),
            successful_interactions: HashMap::new(),
            trust_threshold: DEFAULT_TRUST_THRESHOLD,
        }
    }

    pub fn with_trust_threshold(mut self, trust_threshold: u64) -> Self {
        self.trust_threshold = trust_threshold;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_adversarial(&self) -> bool {
        self.adversarial
    }

    pub fn is_greylisted(&self) -> bool {
        self.greylisted
    }

    pub fn trust_threshold(&self) -> u64 {
        self.trust_threshold
    }

    pub fn chain(&self) -> &BTreeMap<String, Transaction> {
        &self.chain
    }

    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }

    pub fn transaction(&self, tx_id: &str) -> Option<&Transaction> {
        self.chain.get(tx_id)
    }

    pub fn known_discrepancies(&self) -> &BTreeSet<String> {
        &self.known_discrepancies
    }

    pub fn interactions_with(&self, peer_id: &str) -> u64 {
        self.successful_interactions.get(peer_id).copied().unwrap_or(0)
    }

    pub fn total_interactions(&self) -> u64 {
        self.successful_interactions.values().sum()
    }

    /// Seed the local chain with history that never went through a
    /// broadcast. Once the node is registered use `Network::seed_history`.
    pub fn seed_history(&mut self, tx: Transaction) {
        self.record_transaction(tx);
    }

    pub(crate) fn record_transaction(&mut self, tx: Transaction) {
        self.chain.insert(tx.id().to_string(), tx);
    }

    /// Trusted once total recorded interactions exceed `threshold * 10`.
    pub fn is_trusted(&self, threshold: u64) -> bool {
        self.total_interactions() > threshold.saturating_mul(TRUSTED_INTERACTION_MULTIPLIER)
    }

    /// True if this node holds `tx.id` with an identical payload.
    pub fn corroborates(&self, tx: &Transaction) -> bool {
        self.chain
            .get(tx.id())
            .map(|local| local.same_payload(tx))
            .unwrap_or(false)
    }

    /// Interaction eligibility. Non-greylisted peers always pass; a
    /// greylisted peer passes only if this node already has at least
    /// `trust_threshold` successful interactions with it.
    pub fn should_interact_with(&self, other: &NetworkNode) -> bool {
        if !other.greylisted {
            return true;
        }
        let history = self.interactions_with(&other.id);
        let allowed = history >= self.trust_threshold;
        debug!(
            "{} -> greylisted {}: {} prior interactions, threshold {}, allowed={}",
            self.id, other.id, history, self.trust_threshold, allowed
        );
        allowed
    }

    pub(crate) fn record_interaction(&mut self, peer_id: &str) {
        *self.successful_interactions.entry(peer_id.to_string()).or_insert(0) += 1;
    }

    /// Greylist this node and wipe its earned interaction history.
    pub(crate) fn greylist(&mut self) {
        self.greylisted = true;
        self.successful_interactions.clear();
    }

    pub(crate) fn note_discrepancy(&mut self, tx_id: &str) {
        self.known_discrepancies.insert(tx_id.to_string());
    }
}
