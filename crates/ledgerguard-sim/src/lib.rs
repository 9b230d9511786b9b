//! Anti-gaming simulation harness for the LedgerGuard engine.
//!
//! Generates an honest/sybil population, drives repeated interaction rounds
//! with availability churn and malicious payload injection, and reports how
//! many sybils (and honest nodes) ended up greylisted.
//!
//! The harness uses only the engine's public surface: building nodes and a
//! network, running a trust walk, broadcasting, and reading flags/counters.

pub mod config;
pub mod error;
pub mod population;
pub mod runner;
pub mod stats;

pub use crate::config::SimulationConfig;
pub use crate::error::{Result, SimError};
pub use crate::population::build_network;
pub use crate::runner::{RoundOutcome, Simulation};
pub use crate::stats::{InteractionStats, SimulationReport};
