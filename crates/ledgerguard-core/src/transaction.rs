use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An exchange between two or more participants.
///
/// Immutable once built: there are no mutating methods. Two transactions
/// sharing an id are compared with [`Transaction::same_payload`] to detect
/// tampering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: String,
    participants: Vec<String>,
    payload: Value,
    created_at: DateTime<Utc>,
}

impl Transaction {
    /// Build a transaction. Participants are stored sorted and de-duplicated
    /// so lookups are order-independent.
    pub fn new<I, S>(id: impl Into<String>, participants: I, payload: Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut participants: Vec<String> = participants.into_iter().map(Into::into).collect();
        participants.sort();
        participants.dedup();

        Transaction {
            id: id.into(),
            participants,
            payload,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Participant ids in canonical (sorted) order.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn involves(&self, node_id: &str) -> bool {
        self.participants.binary_search_by(|p| p.as_str().cmp(node_id)).is_ok()
    }

    /// Payload equality, the only comparison the consistency checks use.
    pub fn same_payload(&self, other: &Transaction) -> bool {
        self.payload == other.payload
    }
}
