// ANTI-GAMING ROUND DRIVER
// One interaction fully resolves (churn, trust walk, broadcast) before the next
//
// The driver is the only place that reads the sybil marker: it decides when an
// adversary tampers with a payload. The engine itself never sees the marker.

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::population::build_network;
use crate::stats::{InteractionStats, SimulationReport};
use ledgerguard_core::{BroadcastRejection, Network, Transaction, VerificationStatus};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde_json::json;

/// What happened in a single round.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    /// Network offline; the round ends before any interaction
    VerificationPaused,

    /// A party is greylisted or the walk came back unverified
    Declined(VerificationStatus),

    Committed(String),

    Rejected(BroadcastRejection),
}

pub struct Simulation<R: Rng = StdRng> {
    config: SimulationConfig,
    network: Network,
    node_ids: Vec<String>,
    stats: InteractionStats,
    rounds_run: u64,
    rng: R,
}

impl Simulation<StdRng> {
    /// Simulation drawing from an entropy-seeded generator; runs are not
    /// reproducible.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(config: SimulationConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let network = build_network(&config);
        let node_ids = network.node_ids().map(str::to_string).collect();

        Ok(Simulation {
            config,
            network,
            node_ids,
            stats: InteractionStats::default(),
            rounds_run: 0,
            rng,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn stats(&self) -> &InteractionStats {
        &self.stats
    }

    /// Run every configured round and report.
    pub fn run(&mut self) -> Result<SimulationReport> {
        info!(
            "starting anti-gaming run: {} nodes ({} sybils), {} rounds",
            self.config.total_nodes(),
            self.config.sybil_nodes,
            self.config.rounds
        );

        for round in 0..self.config.rounds {
            self.step(round)?;
        }

        let report = self.report();
        info!(
            "run complete: {} greylisted ({} sybils), ledger size {}",
            report.greylisted, report.sybils_greylisted, report.ledger_size
        );
        Ok(report)
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport::from_network(&self.network, &self.stats, self.rounds_run)
    }

    /// Play one round.
    pub fn step(&mut self, round: u64) -> Result<RoundOutcome> {
        self.rounds_run += 1;
        self.churn();

        let picked = index::sample(&mut self.rng, self.node_ids.len(), 2);
        let initiator = self.node_ids[picked.index(0)].clone();
        let peer = self.node_ids[picked.index(1)].clone();

        let verification = self.network.verify_trust(&initiator, &peer, &mut self.rng)?;
        if verification.status == VerificationStatus::VerificationPaused {
            debug!("round {}: verification paused", round);
            return Ok(RoundOutcome::VerificationPaused);
        }
        self.stats.trust_verifications += 1;

        let (Some(a), Some(b)) = (self.network.node(&initiator), self.network.node(&peer)) else {
            return Ok(RoundOutcome::Declined(verification.status));
        };
        if a.is_greylisted()
            || b.is_greylisted()
            || !a.should_interact_with(b)
            || !verification.status.permits_interaction()
        {
            debug!(
                "round {}: {} -> {} declined ({})",
                round, initiator, peer, verification.status
            );
            return Ok(RoundOutcome::Declined(verification.status));
        }
        let sybil_involved = a.is_adversarial() || b.is_adversarial();

        self.stats.interactions_attempted += 1;

        let value = if sybil_involved && self.rng.gen_bool(self.config.malicious_payload_probability) {
            "malicious"
        } else {
            "test"
        };
        let tx_id = format!("tx_{}_{}_{}", round, short_id(&initiator), short_id(&peer));
        let tx = Transaction::new(tx_id.clone(), [initiator, peer], json!({ "value": value }));

        match self.network.try_broadcast(tx) {
            Ok(()) => {
                self.stats.interactions_successful += 1;
                Ok(RoundOutcome::Committed(tx_id))
            }
            Err(rejection) => {
                debug!("round {}: {} rejected: {}", round, tx_id, rejection);
                self.stats.record_rejection(rejection.kind());
                Ok(RoundOutcome::Rejected(rejection))
            }
        }
    }

    /// Availability churn: a chance of an outage each round, and a chance of
    /// recovery while offline.
    fn churn(&mut self) {
        if self.rng.gen_bool(self.config.outage_probability) {
            self.network.simulate_network_issue(false);
            self.stats.network_issues += 1;
        } else if !self.network.is_online() && self.rng.gen_bool(self.config.recovery_probability) {
            self.network.simulate_network_issue(true);
        }
    }
}

/// First four characters of a node id, used to build transaction ids.
fn short_id(id: &str) -> String {
    id.chars().take(4).collect()
}
