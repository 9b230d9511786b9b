use thiserror::Error;

/// Why a broadcast was refused.
///
/// Every variant leaves the ledger untouched. Only `InconsistentChain`
/// mutates state: by the time it is returned the punished nodes have already
/// been greylisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastRejection {
    #[error("network is offline")]
    NetworkOffline,

    #[error("transaction {0} is already in the ledger")]
    DuplicateTransaction(String),

    #[error("participant {0} is on the global greylist")]
    GloballyGreylisted(String),

    #[error("participant {0} is greylisted")]
    NodeGreylisted(String),

    #[error("chain of {node_id} diverges from the ledger on {tx_id}; greylisted {punished:?}")]
    InconsistentChain {
        node_id: String,
        tx_id: String,
        punished: Vec<String>,
    },
}

impl BroadcastRejection {
    /// Stable label used for tallies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BroadcastRejection::NetworkOffline => "network_offline",
            BroadcastRejection::DuplicateTransaction(_) => "duplicate_transaction",
            BroadcastRejection::GloballyGreylisted(_) => "globally_greylisted",
            BroadcastRejection::NodeGreylisted(_) => "node_greylisted",
            BroadcastRejection::InconsistentChain { .. } => "inconsistent_chain",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("node {0} is not registered")]
    UnknownNode(String),
}
