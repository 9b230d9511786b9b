// LEDGERGUARD CORE: TRUST & CONSISTENCY ENGINE
// Local trust-propagation walk + collective greylisting over a shared ledger
//
// SAFETY INVARIANTS:
// 1. The Network is the single source of truth for committed payloads
// 2. Node chains are append-only caches, pushed to by the Network only on commit
// 3. Protocol logic never reads the adversarial marker (sybil-agnostic)
// 4. Every rejection is a value (status or tagged error), never a panic
// 5. Randomness is always injected by the caller

// === Entity Model ===
pub mod transaction;
pub mod node;
pub mod network;

// === Protocols ===
pub mod trust;
pub mod policy;

// === Errors ===
pub mod error;

// === Re-exports for harness access ===
pub use error::{BroadcastRejection, NetworkError};
pub use network::Network;
pub use node::NetworkNode;
pub use policy::PunishmentScope;
pub use transaction::Transaction;
pub use trust::{VerificationResult, VerificationStatus};
