// NETWORK: REGISTRY, LEDGER & BROADCAST PROTOCOL
// Authoritative ledger plus the consistency-checked broadcast that feeds it
//
// SAFETY INVARIANTS:
// 1. A transaction id is committed at most once (replays are refused forever)
// 2. Nothing is committed while offline or when any participant is greylisted
// 3. A ledger entry is the single source of truth for its payload
// 4. Divergence found in any participant's chain greylists the punished set
//    and wipes their interaction counters before the rejection is returned
// 5. On commit, every registered participant's chain and counters are updated

use crate::error::{BroadcastRejection, NetworkError};
use crate::node::NetworkNode;
use crate::policy::PunishmentScope;
use crate::transaction::Transaction;
use crate::trust::VerificationResult;
use log::{debug, info, warn};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug)]
pub struct Network {
    /// Registered nodes by id
    nodes: BTreeMap<String, NetworkNode>,

    /// Global ledger: transaction id → committed transaction
    ledger: BTreeMap<String, Transaction>,

    /// Ids barred from any further broadcast
    global_greylist: BTreeSet<String>,

    online: bool,

    punishment_scope: PunishmentScope,
}

impl Network {
    pub fn new() -> Self {
        Network {
            nodes: BTreeMap::new(),
            ledger: BTreeMap::new(),
            global_greylist: BTreeSet::new(),
            online: true,
            punishment_scope: PunishmentScope::default(),
        }
    }

    pub fn with_punishment_scope(mut self, scope: PunishmentScope) -> Self {
        self.punishment_scope = scope;
        self
    }

    pub fn punishment_scope(&self) -> PunishmentScope {
        self.punishment_scope
    }

    // ------------------------------------------------------------------
    // Availability
    // ------------------------------------------------------------------

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn simulate_network_issue(&mut self, online: bool) {
        if self.online != online {
            info!("network is now {}", if online { "online" } else { "offline" });
        }
        self.online = online;
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// Register a node, replacing (and returning) any node with the same id.
    pub fn add_node(&mut self, node: NetworkNode) -> Option<NetworkNode> {
        self.nodes.insert(node.id().to_string(), node)
    }

    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.nodes.get(id)
    }

    /// Write `tx` straight into a registered node's chain, bypassing the
    /// ledger and every broadcast check. Replaces any local entry with the
    /// same id; counters are untouched.
    pub fn seed_history(&mut self, node_id: &str, tx: Transaction) -> Result<(), NetworkError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| NetworkError::UnknownNode(node_id.to_string()))?;
        debug!("seeding {} into the chain of {} outside the ledger", tx.id(), node_id);
        node.record_transaction(tx);
        Ok(())
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NetworkNode> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    // ------------------------------------------------------------------
    // Ledger & greylist
    // ------------------------------------------------------------------

    pub fn transaction(&self, tx_id: &str) -> Option<&Transaction> {
        self.ledger.get(tx_id)
    }

    pub fn ledger(&self) -> &BTreeMap<String, Transaction> {
        &self.ledger
    }

    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }

    pub fn global_greylist(&self) -> &BTreeSet<String> {
        &self.global_greylist
    }

    pub fn is_globally_greylisted(&self, id: &str) -> bool {
        self.global_greylist.contains(id)
    }

    // ------------------------------------------------------------------
    // Trust walk by id
    // ------------------------------------------------------------------

    /// Look both nodes up and run `verifier`'s trust walk towards `target`.
    pub fn verify_trust<R: Rng + ?Sized>(
        &self,
        verifier: &str,
        target: &str,
        rng: &mut R,
    ) -> Result<VerificationResult, NetworkError> {
        let verifier = self
            .node(verifier)
            .ok_or_else(|| NetworkError::UnknownNode(verifier.to_string()))?;
        let target = self
            .node(target)
            .ok_or_else(|| NetworkError::UnknownNode(target.to_string()))?;
        Ok(verifier.verify_trust(target, self, rng))
    }

    // ------------------------------------------------------------------
    // Broadcast
    // ------------------------------------------------------------------

    /// Broadcast with the rejection collapsed to a boolean.
    pub fn broadcast_transaction(&mut self, tx: Transaction) -> bool {
        self.try_broadcast(tx).is_ok()
    }

    /// Validate `tx` against the ledger and every participant's chain, then
    /// commit it and push it to the participants.
    pub fn try_broadcast(&mut self, tx: Transaction) -> Result<(), BroadcastRejection> {
        if !self.online {
            debug!("broadcast {} rejected: network offline", tx.id());
            return Err(BroadcastRejection::NetworkOffline);
        }

        if self.ledger.contains_key(tx.id()) {
            debug!("broadcast {} rejected: replay of committed id", tx.id());
            return Err(BroadcastRejection::DuplicateTransaction(tx.id().to_string()));
        }

        if let Some(flagged) = tx
            .participants()
            .iter()
            .find(|p| self.global_greylist.contains(p.as_str()))
        {
            debug!("broadcast {} rejected: {} on global greylist", tx.id(), flagged);
            return Err(BroadcastRejection::GloballyGreylisted(flagged.clone()));
        }

        for participant in tx.participants() {
            let Some(node) = self.nodes.get(participant) else {
                continue;
            };

            if node.is_greylisted() {
                debug!("broadcast {} rejected: {} is greylisted", tx.id(), participant);
                return Err(BroadcastRejection::NodeGreylisted(participant.clone()));
            }

            if let Some(conflict) = self.first_divergence(node) {
                let punished = self.handle_inconsistency(&tx, participant, &conflict);
                return Err(BroadcastRejection::InconsistentChain {
                    node_id: participant.clone(),
                    tx_id: conflict,
                    punished,
                });
            }
        }

        self.commit(tx);
        Ok(())
    }

    /// First id in `node`'s chain whose payload disagrees with the ledger.
    fn first_divergence(&self, node: &NetworkNode) -> Option<String> {
        node.chain()
            .iter()
            .find(|(id, local)| {
                self.ledger
                    .get(id.as_str())
                    .map(|committed| !committed.same_payload(local))
                    .unwrap_or(false)
            })
            .map(|(id, _)| id.clone())
    }

    /// Collective punishment: greylist the punished set, add it to the global
    /// greylist and wipe its interaction counters. Returns the punished ids.
    fn handle_inconsistency(
        &mut self,
        tx: &Transaction,
        conflicting_node: &str,
        conflicting_tx: &str,
    ) -> Vec<String> {
        if let Some(node) = self.nodes.get_mut(conflicting_node) {
            node.note_discrepancy(conflicting_tx);
        }

        let targets: Vec<String> = match self.punishment_scope {
            PunishmentScope::TransactionParticipants => tx.participants().to_vec(),
            PunishmentScope::ConflictingNode => vec![conflicting_node.to_string()],
        };

        let mut punished = Vec::with_capacity(targets.len());
        for id in targets {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.greylist();
                self.global_greylist.insert(id.clone());
                punished.push(id);
            }
        }

        warn!(
            "chain of {} diverges from ledger on {}; broadcast of {} greylisted {:?}",
            conflicting_node,
            conflicting_tx,
            tx.id(),
            punished
        );
        punished
    }

    fn commit(&mut self, tx: Transaction) {
        for participant in tx.participants() {
            let Some(node) = self.nodes.get_mut(participant) else {
                continue;
            };
            node.record_transaction(tx.clone());
            for other in tx.participants() {
                if other != participant {
                    node.record_interaction(other);
                }
            }
        }

        info!(
            "committed {} ({} participants, ledger size {})",
            tx.id(),
            tx.participants().len(),
            self.ledger.len() + 1
        );
        self.ledger.insert(tx.id().to_string(), tx);
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}
