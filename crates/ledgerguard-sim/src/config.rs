// Simulation parameters, layered: defaults < optional file < LEDGERGUARD_* env vars

use crate::error::{Result, SimError};
use ledgerguard_core::policy::DEFAULT_TRUST_THRESHOLD;
use ledgerguard_core::PunishmentScope;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "LEDGERGUARD";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub honest_nodes: usize,
    pub sybil_nodes: usize,
    pub rounds: u64,

    /// Per-round chance of taking the network offline
    pub outage_probability: f64,

    /// Per-round chance of coming back online while offline
    pub recovery_probability: f64,

    /// Chance that a transaction involving a sybil carries a malicious payload
    pub malicious_payload_probability: f64,

    pub trust_threshold: u64,
    pub punishment_scope: PunishmentScope,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            honest_nodes: 9900,
            sybil_nodes: 100,
            rounds: 1000,
            outage_probability: 0.01,
            recovery_probability: 0.1,
            malicious_payload_probability: 0.3,
            trust_threshold: DEFAULT_TRUST_THRESHOLD,
            punishment_scope: PunishmentScope::default(),
        }
    }
}

impl SimulationConfig {
    /// Load defaults, then `path` if given (format by extension), then
    /// `LEDGERGUARD_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .add_source(::config::Config::try_from(&SimulationConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }

        let loaded: SimulationConfig = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    pub fn total_nodes(&self) -> usize {
        self.honest_nodes + self.sybil_nodes
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_nodes() < 2 {
            return Err(SimError::InvalidConfig(format!(
                "need at least 2 nodes to interact, got {}",
                self.total_nodes()
            )));
        }

        let probabilities = [
            ("outage_probability", self.outage_probability),
            ("recovery_probability", self.recovery_probability),
            ("malicious_payload_probability", self.malicious_payload_probability),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }

        Ok(())
    }
}
