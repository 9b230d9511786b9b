use crate::config::SimulationConfig;
use ledgerguard_core::{Network, NetworkNode};
use log::info;

/// Build the network: `honest_{i}` nodes followed by `sybil_{i}` nodes.
pub fn build_network(config: &SimulationConfig) -> Network {
    let mut network = Network::new().with_punishment_scope(config.punishment_scope);

    for i in 0..config.honest_nodes {
        network.add_node(
            NetworkNode::new(format!("honest_{}", i), false)
                .with_trust_threshold(config.trust_threshold),
        );
    }
    for i in 0..config.sybil_nodes {
        network.add_node(
            NetworkNode::new(format!("sybil_{}", i), true)
                .with_trust_threshold(config.trust_threshold),
        );
    }

    info!(
        "population ready: {} nodes ({} sybils), punishment scope {}",
        network.node_count(),
        config.sybil_nodes,
        config.punishment_scope.as_str()
    );
    network
}
