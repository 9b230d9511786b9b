// Trust verification walk: deterministic scenarios and bound properties

use ledgerguard_core::policy::MAX_HOPS;
use ledgerguard_core::{Network, NetworkNode, Transaction, VerificationStatus};
use proptest::prelude::*;
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

/// Always picks the first candidate (chains iterate in id order).
fn first_pick() -> StepRng {
    StepRng::new(0, 0)
}

fn commit(network: &mut Network, id: &str, parts: &[&str]) {
    let tx = Transaction::new(id, parts.iter().copied(), json!({ "value": "test" }));
    assert!(network.broadcast_transaction(tx), "commit of {} failed", id);
}

#[test]
fn test_single_corroboration_is_unverified() {
    let mut network = Network::new();
    for id in ["a", "b"] {
        network.add_node(NetworkNode::new(id, false));
    }
    commit(&mut network, "t1", &["a", "b"]);

    let result = network.verify_trust("a", "b", &mut first_pick()).unwrap();

    // hop 1: b corroborates (0.5); hop 2: nobody left to visit
    assert_eq!(result.hops, 2);
    assert_eq!(result.confidence, 0.5);
    assert_eq!(result.status, VerificationStatus::Unverified);
    assert!(!result.trusted_path_found);
}

#[test]
fn test_two_corroborations_are_likely_verified() {
    let mut network = Network::new();
    for id in ["a", "b", "c"] {
        network.add_node(NetworkNode::new(id, false));
    }
    commit(&mut network, "t1-ab", &["a", "b"]);
    commit(&mut network, "t0-bc", &["b", "c"]);

    let result = network.verify_trust("a", "c", &mut first_pick()).unwrap();

    assert_eq!(result.hops, 3);
    assert_eq!(result.confidence, 0.75);
    assert_eq!(result.status, VerificationStatus::LikelyVerified);
}

#[test]
fn test_long_corroborated_path_is_verified() {
    let mut network = Network::new();
    for i in 0..8 {
        network.add_node(NetworkNode::new(format!("n{}", i), false));
    }
    // edge i links n{i} and n{i+1}; ids descend so each node walks forward
    for i in 0..7 {
        let (from, to) = (format!("n{}", i), format!("n{}", i + 1));
        commit(&mut network, &format!("tx-{}", 9 - i), &[from.as_str(), to.as_str()]);
    }

    let result = network.verify_trust("n0", "n7", &mut first_pick()).unwrap();

    assert_eq!(result.hops, 7);
    assert!((result.confidence - (1.0 - 0.5f64.powi(7))).abs() < 1e-12);
    assert_eq!(result.status, VerificationStatus::Verified);
}

#[test]
fn test_uncorroborated_hop_decays_confidence() {
    let mut network = Network::new();
    let mut b = NetworkNode::new("b", false);
    // b alone holds t0; c never saw it
    b.seed_history(Transaction::new("t0", ["b", "c"], json!({ "value": "test" })));
    network.add_node(NetworkNode::new("a", false));
    network.add_node(b);
    network.add_node(NetworkNode::new("c", false));
    commit(&mut network, "t1", &["a", "b"]);

    let result = network.verify_trust("a", "c", &mut first_pick()).unwrap();

    // hop 1: b corroborates t1 (0.5); hop 2: c does not hold t0 (0.5 * 0.8)
    assert_eq!(result.hops, 2);
    assert!((result.confidence - 0.4).abs() < 1e-12);
    assert_eq!(result.status, VerificationStatus::Unverified);
}

#[test]
fn test_walk_stops_at_hop_cap() {
    let len = 30;
    let mut nodes: Vec<NetworkNode> = (0..len)
        .map(|i| NetworkNode::new(format!("n{:02}", i), false))
        .collect();
    // each link is known only to its lower end, so no hop corroborates
    for i in 0..len - 1 {
        let (from, to) = (format!("n{:02}", i), format!("n{:02}", i + 1));
        nodes[i].seed_history(Transaction::new(format!("link-{:02}", i), [from, to], json!({})));
    }
    let mut network = Network::new();
    for node in nodes {
        network.add_node(node);
    }

    let result = network
        .verify_trust("n00", &format!("n{:02}", len - 1), &mut first_pick())
        .unwrap();

    assert_eq!(result.hops, MAX_HOPS);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.status, VerificationStatus::Unverified);
    assert!(!result.trusted_path_found);
}

#[test]
fn test_trusted_participant_short_circuits() {
    let mut network = Network::new();
    network.add_node(NetworkNode::new("a", false).with_trust_threshold(0));
    network.add_node(NetworkNode::new("b", false));
    commit(&mut network, "t1", &["a", "b"]);

    // with threshold 0 any participant holding an interaction is trusted
    let result = network.verify_trust("a", "b", &mut first_pick()).unwrap();

    assert!(result.trusted_path_found);
    assert_eq!(result.hops, 1);
    assert_eq!(result.confidence, 0.5);
    assert_eq!(result.status, VerificationStatus::Unverified);
}

#[test]
fn test_walk_does_not_mutate_network() {
    let mut network = Network::new();
    for id in ["a", "b", "c"] {
        network.add_node(NetworkNode::new(id, false));
    }
    commit(&mut network, "t1", &["a", "b"]);
    commit(&mut network, "t2", &["b", "c"]);

    let before: Vec<(String, usize, u64)> = network
        .nodes()
        .map(|n| (n.id().to_string(), n.chain_len(), n.total_interactions()))
        .collect();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        network.verify_trust("a", "c", &mut rng).unwrap();
    }
    let after: Vec<(String, usize, u64)> = network
        .nodes()
        .map(|n| (n.id().to_string(), n.chain_len(), n.total_interactions()))
        .collect();
    assert_eq!(before, after);
    assert_eq!(network.ledger_len(), 2);
}

proptest! {
    #[test]
    fn prop_walk_stays_within_bounds(
        node_count in 2usize..12,
        edges in prop::collection::vec((0usize..12, 0usize..12), 1..60),
        seed in any::<u64>(),
    ) {
        let mut network = Network::new();
        for i in 0..node_count {
            network.add_node(NetworkNode::new(format!("n{}", i), false).with_trust_threshold(1));
        }
        for (k, (x, y)) in edges.iter().enumerate() {
            let parts = [format!("n{}", x % node_count), format!("n{}", y % node_count)];
            network.broadcast_transaction(Transaction::new(format!("tx{}", k), parts, json!({ "k": k })));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        for i in 0..node_count {
            let verifier = format!("n{}", i);
            let target = format!("n{}", (i + 1) % node_count);
            let result = network.verify_trust(&verifier, &target, &mut rng).unwrap();
            prop_assert!(result.hops <= MAX_HOPS);
            prop_assert!((0.0..=1.0).contains(&result.confidence));
            prop_assert_eq!(result.status == VerificationStatus::Verified, result.confidence >= 0.99);
        }
    }

    #[test]
    fn prop_offline_always_pauses(seed in any::<u64>(), history in 0usize..5) {
        let mut network = Network::new();
        let mut a = NetworkNode::new("a", false);
        for k in 0..history {
            a.seed_history(Transaction::new(format!("t{}", k), ["a", "b"], json!(k)));
        }
        network.add_node(a);
        network.add_node(NetworkNode::new("b", false));
        network.simulate_network_issue(false);

        let result = network.verify_trust("a", "b", &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(result.status, VerificationStatus::VerificationPaused);
        prop_assert_eq!(result.hops, 0);
        prop_assert_eq!(result.confidence, 0.0);
    }
}
