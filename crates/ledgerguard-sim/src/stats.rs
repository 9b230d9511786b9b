// Run counters and the end-of-run report

use ledgerguard_core::Network;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct InteractionStats {
    pub interactions_attempted: u64,
    pub interactions_successful: u64,
    /// Every rejected broadcast, whatever the reason
    pub greylist_events: u64,
    pub trust_verifications: u64,
    pub network_issues: u64,
    /// Rejected broadcasts by `BroadcastRejection::kind`
    pub rejections: BTreeMap<String, u64>,
}

impl InteractionStats {
    pub fn record_rejection(&mut self, kind: &str) {
        self.greylist_events += 1;
        *self.rejections.entry(kind.to_string()).or_insert(0) += 1;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub rounds: u64,
    pub total_nodes: usize,
    pub honest_nodes: usize,
    pub sybil_nodes: usize,
    pub greylisted: usize,
    pub sybils_greylisted: usize,
    pub honest_greylisted: usize,
    pub ledger_size: usize,
    pub stats: InteractionStats,
    /// Percentage of attempted interactions that committed
    pub success_rate: Option<f64>,
    /// Percentage of sybils greylisted
    pub sybil_detection_rate: Option<f64>,
    /// Percentage of honest nodes greylisted
    pub false_positive_rate: Option<f64>,
}

impl SimulationReport {
    pub fn from_network(network: &Network, stats: &InteractionStats, rounds: u64) -> Self {
        let total_nodes = network.node_count();
        let sybil_nodes = network.nodes().filter(|n| n.is_adversarial()).count();
        let honest_nodes = total_nodes - sybil_nodes;
        let greylisted = network.nodes().filter(|n| n.is_greylisted()).count();
        let sybils_greylisted = network
            .nodes()
            .filter(|n| n.is_greylisted() && n.is_adversarial())
            .count();
        let honest_greylisted = greylisted - sybils_greylisted;

        SimulationReport {
            rounds,
            total_nodes,
            honest_nodes,
            sybil_nodes,
            greylisted,
            sybils_greylisted,
            honest_greylisted,
            ledger_size: network.ledger_len(),
            stats: stats.clone(),
            success_rate: percentage(stats.interactions_successful, stats.interactions_attempted),
            sybil_detection_rate: percentage(sybils_greylisted as u64, sybil_nodes as u64),
            false_positive_rate: percentage(honest_greylisted as u64, honest_nodes as u64),
        }
    }
}

fn percentage(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64 * 100.0)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Anti-Gaming Simulation Results ===")?;
        writeln!(f, "Rounds: {}", self.rounds)?;
        writeln!(f, "Total nodes: {} ({} sybils)", self.total_nodes, self.sybil_nodes)?;
        writeln!(
            f,
            "Nodes greylisted: {} ({} sybils)",
            self.greylisted, self.sybils_greylisted
        )?;
        writeln!(f, "Ledger size: {}", self.ledger_size)?;
        writeln!(f, "Greylist events: {}", self.stats.greylist_events)?;
        for (kind, count) in &self.stats.rejections {
            writeln!(f, "  {}: {}", kind, count)?;
        }
        writeln!(f, "Network issues simulated: {}", self.stats.network_issues)?;
        writeln!(f, "Trust verifications: {}", self.stats.trust_verifications)?;
        if let Some(rate) = self.success_rate {
            writeln!(f, "Interaction success rate: {:.1}%", rate)?;
        }
        if let Some(rate) = self.sybil_detection_rate {
            writeln!(f, "Sybil detection rate: {:.1}%", rate)?;
        }
        if let Some(rate) = self.false_positive_rate {
            writeln!(f, "False positive rate: {:.2}%", rate)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerguard_core::{NetworkNode, Transaction};
    use serde_json::json;

    fn sample_network() -> Network {
        let mut network = Network::new();
        for id in ["honest_0", "honest_1", "honest_2"] {
            network.add_node(NetworkNode::new(id, false));
        }
        network.add_node(NetworkNode::new("sybil_0", true));
        network
    }

    #[test]
    fn test_percentage_handles_empty_denominator() {
        assert_eq!(percentage(3, 0), None);
        assert_eq!(percentage(1, 4), Some(25.0));
    }

    #[test]
    fn test_record_rejection_tallies_by_kind() {
        let mut stats = InteractionStats::default();
        stats.record_rejection("duplicate_transaction");
        stats.record_rejection("inconsistent_chain");
        stats.record_rejection("inconsistent_chain");
        assert_eq!(stats.greylist_events, 3);
        assert_eq!(stats.rejections["inconsistent_chain"], 2);
    }

    #[test]
    fn test_report_counts_greylisted_by_marker() {
        let mut network = sample_network();
        let payload = json!({ "value": "test" });
        assert!(network.broadcast_transaction(Transaction::new("shared", ["honest_0", "honest_1"], payload.clone())));
        network
            .seed_history("sybil_0", Transaction::new("shared", ["honest_0", "honest_1"], json!({ "value": "malicious" })))
            .unwrap();
        assert!(!network.broadcast_transaction(Transaction::new("t2", ["sybil_0", "honest_2"], payload)));

        let stats = InteractionStats {
            interactions_attempted: 2,
            interactions_successful: 1,
            ..InteractionStats::default()
        };
        let report = SimulationReport::from_network(&network, &stats, 2);

        assert_eq!(report.total_nodes, 4);
        assert_eq!(report.sybil_nodes, 1);
        assert_eq!(report.greylisted, 2);
        assert_eq!(report.sybils_greylisted, 1);
        assert_eq!(report.honest_greylisted, 1);
        assert_eq!(report.ledger_size, 1);
        assert_eq!(report.success_rate, Some(50.0));
        assert_eq!(report.sybil_detection_rate, Some(100.0));
        assert!((report.false_positive_rate.unwrap() - 100.0 / 3.0).abs() < 1e-9);

        let rendered = report.to_string();
        assert!(rendered.contains("Nodes greylisted: 2 (1 sybils)"));
        assert!(rendered.contains("Interaction success rate: 50.0%"));
    }

    #[test]
    fn test_report_without_attempts_omits_success_rate() {
        let network = sample_network();
        let report = SimulationReport::from_network(&network, &InteractionStats::default(), 0);
        assert_eq!(report.success_rate, None);
        assert!(!report.to_string().contains("success rate"));
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["success_rate"].is_null());
    }
}
