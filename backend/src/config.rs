//! Model configuration
//!
//! A [`ModelConfig`] is the single immutable description of a model run. It
//! is loaded from JSON, validated once, and then used to build the runtime
//! objects: the [`StateSpace`], one fixed [`ParameterSet`] or one PSA
//! [`ParameterGenerator`] per therapy, and the seed derivation.
//!
//! # Example
//! ```
//! use markov_cohort_core_rs::config::ModelConfig;
//!
//! let json = r#"{
//!     "states": ["WELL", "SICK", "DEAD"],
//!     "initial_state": "WELL",
//!     "milestone_state": "SICK",
//!     "transition_counts": [[80, 15, 5], [0, 70, 30], [0, 0, 1]],
//!     "state_costs": [100.0, 800.0, 0.0],
//!     "state_utilities": [0.9, 0.6, 0.0],
//!     "annual_discount_rate": 0.03,
//!     "cycles_per_year": 2,
//!     "horizon": 20,
//!     "population_size": 100,
//!     "num_cohorts": 3,
//!     "therapies": [{"name": "SOC", "treatment_cost": 0.0}]
//! }"#;
//!
//! let config = ModelConfig::from_json_str(json).unwrap();
//! assert_eq!(config.per_cycle_discount_rate(), 0.015);
//! let outcomes = config.simulate(config.therapy("SOC").unwrap(), false).unwrap();
//! assert_eq!(outcomes.num_cohorts(), 3);
//! ```

use crate::models::{
    EconomicInputs, ParameterError, ParameterSet, StateSpace, StateSpaceError, TherapyEffect,
    TransitionCounts, TransitionError,
};
use crate::psa::{ParameterGenerator, PsaConfig, PsaInputs};
use crate::rng::{HashedSeeds, SeedDerivation, SequentialSeeds};
use crate::simulation::{MultiCohort, MultiCohortOutcomes, SimulationError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Unknown therapy: {0}")]
    UnknownTherapy(String),

    #[error(transparent)]
    StateSpace(#[from] StateSpaceError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// One treatment strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapyConfig {
    pub name: String,

    /// Treatment cost per cycle while treated
    pub treatment_cost: f64,

    /// Fraction by which the therapy reduces progression out of each
    /// treatable state; `None` leaves the base matrix unchanged
    #[serde(default)]
    pub relative_risk: Option<f64>,

    /// States whose outgoing transitions the therapy slows
    #[serde(default)]
    pub treatable_states: Vec<String>,
}

/// How per-patient and per-cohort seeds are derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum SeedConfig {
    /// SHA-256 of (cohort, patient) with an optional salt
    Hashed {
        #[serde(default)]
        salt: u64,
    },
    /// `cohort_id * population_size + patient_index`
    Sequential,
}

impl Default for SeedConfig {
    fn default() -> Self {
        SeedConfig::Hashed { salt: 0 }
    }
}

fn default_alpha() -> f64 {
    0.05
}

/// Complete description of a model run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// State names in matrix order; the last one is absorbing
    pub states: Vec<String>,
    pub initial_state: String,
    pub milestone_state: String,

    /// Observed transition counts, one row per state
    pub transition_counts: Vec<Vec<u64>>,

    /// Cost per cycle in each state
    pub state_costs: Vec<f64>,
    /// Utility weight per cycle in each state
    pub state_utilities: Vec<f64>,

    pub annual_discount_rate: f64,
    pub cycles_per_year: u32,

    /// Maximum cycles per patient
    pub horizon: usize,
    pub population_size: usize,
    pub num_cohorts: usize,

    /// Significance level for reported intervals
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    pub therapies: Vec<TherapyConfig>,

    #[serde(default)]
    pub psa: PsaConfig,

    #[serde(default)]
    pub seeds: SeedConfig,
}

impl ModelConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ModelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field and build every therapy's parameters once
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycles_per_year == 0 {
            return Err(ConfigError::Invalid("cycles_per_year must be > 0".to_string()));
        }
        if !self.annual_discount_rate.is_finite() || self.annual_discount_rate < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "annual_discount_rate must be >= 0, got {}",
                self.annual_discount_rate
            )));
        }
        if self.horizon == 0 {
            return Err(ConfigError::Invalid("horizon must be > 0".to_string()));
        }
        if self.population_size == 0 {
            return Err(ConfigError::Invalid("population_size must be > 0".to_string()));
        }
        if self.num_cohorts == 0 {
            return Err(ConfigError::Invalid("num_cohorts must be > 0".to_string()));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        for (what, cv) in [
            ("psa.cost_cv", self.psa.cost_cv),
            ("psa.utility_cv", self.psa.utility_cv),
            ("psa.treatment_cost_cv", self.psa.treatment_cost_cv),
        ] {
            if !cv.is_finite() || cv <= 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be > 0, got {}", what, cv)));
            }
        }

        if self.therapies.is_empty() {
            return Err(ConfigError::Invalid("Must have at least one therapy".to_string()));
        }
        let mut names = HashSet::new();
        for therapy in &self.therapies {
            if !names.insert(therapy.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate therapy name: {}",
                    therapy.name
                )));
            }
            self.parameter_set(therapy)?;
        }

        Ok(())
    }

    /// Discount rate applied per cycle
    pub fn per_cycle_discount_rate(&self) -> f64 {
        self.annual_discount_rate / self.cycles_per_year as f64
    }

    pub fn therapy(&self, name: &str) -> Result<&TherapyConfig, ConfigError> {
        self.therapies
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ConfigError::UnknownTherapy(name.to_string()))
    }

    pub fn state_space(&self) -> Result<StateSpace, ConfigError> {
        Ok(StateSpace::new(self.states.clone(), &self.milestone_state)?)
    }

    fn therapy_effect(
        &self,
        states: &StateSpace,
        therapy: &TherapyConfig,
    ) -> Result<Option<TherapyEffect>, ConfigError> {
        let Some(relative_risk) = therapy.relative_risk else {
            return Ok(None);
        };
        let treatable_states = therapy
            .treatable_states
            .iter()
            .map(|name| states.require(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(TherapyEffect {
            treatable_states,
            relative_risk,
        }))
    }

    /// Fixed parameters of one therapy: normalized counts, therapy effect,
    /// point-estimate costs and utilities
    pub fn parameter_set(&self, therapy: &TherapyConfig) -> Result<ParameterSet, ConfigError> {
        let states = self.state_space()?;
        let initial_state = states.require(&self.initial_state)?;

        let base = TransitionCounts::new(self.transition_counts.clone())?.normalize()?;
        let transition = match self.therapy_effect(&states, therapy)? {
            Some(effect) => effect.apply(&base)?,
            None => base,
        };
        let economics = EconomicInputs::new(
            self.state_costs.clone(),
            self.state_utilities.clone(),
            therapy.treatment_cost,
            self.per_cycle_discount_rate(),
        )?;

        Ok(ParameterSet::new(states, initial_state, transition)?.with_economics(economics)?)
    }

    /// PSA generator of one therapy, fitted around the point estimates
    pub fn parameter_generator(
        &self,
        therapy: &TherapyConfig,
    ) -> Result<ParameterGenerator, ConfigError> {
        let states = self.state_space()?;
        let initial_state = states.require(&self.initial_state)?;
        let effect = self.therapy_effect(&states, therapy)?;

        Ok(ParameterGenerator::new(PsaInputs {
            initial_state,
            counts: TransitionCounts::new(self.transition_counts.clone())?,
            state_costs: self.state_costs.clone(),
            state_utilities: self.state_utilities.clone(),
            treatment_cost: therapy.treatment_cost,
            discount_rate: self.per_cycle_discount_rate(),
            effect,
            psa: self.psa,
            states,
        })?)
    }

    pub fn seed_derivation(&self) -> Box<dyn SeedDerivation> {
        match self.seeds {
            SeedConfig::Hashed { salt } => Box::new(HashedSeeds::with_salt(salt)),
            SeedConfig::Sequential => Box::new(SequentialSeeds::new(self.population_size)),
        }
    }

    /// Cohort ids `0..num_cohorts`
    ///
    /// Every therapy uses the same ids, so patient `i` of cohort `k` draws
    /// the same random stream under each therapy (common random numbers).
    pub fn cohort_ids(&self) -> Vec<u64> {
        (0..self.num_cohorts as u64).collect()
    }

    /// Run all cohorts of one therapy, with fixed parameters or, if
    /// `resample` is set, a fresh PSA draw per cohort
    pub fn simulate(
        &self,
        therapy: &TherapyConfig,
        resample: bool,
    ) -> Result<MultiCohortOutcomes, ConfigError> {
        let config_hash = self.config_hash()?;
        info!(
            therapy = %therapy.name,
            resample,
            config_hash = %config_hash,
            "simulating therapy"
        );

        let seeds = self.seed_derivation();
        let outcomes = if resample {
            MultiCohort::new(
                self.cohort_ids(),
                self.population_size,
                self.parameter_generator(therapy)?,
            )?
            .simulate(self.horizon, seeds.as_ref())?
        } else {
            MultiCohort::new(
                self.cohort_ids(),
                self.population_size,
                self.parameter_set(therapy)?,
            )?
            .simulate(self.horizon, seeds.as_ref())?
        };
        Ok(outcomes)
    }

    // ========================================================================
    // Config Hashing
    // ========================================================================

    /// Deterministic SHA-256 of the canonical JSON form (sorted keys)
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        use serde_json::Value;
        use std::collections::BTreeMap;

        fn canonicalize(value: Value) -> Value {
            match value {
                Value::Object(map) => {
                    let sorted: BTreeMap<String, Value> =
                        map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                    Value::Object(sorted.into_iter().collect())
                }
                Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
                other => other,
            }
        }

        let canonical = canonicalize(serde_json::to_value(self)?);
        let json = serde_json::to_string(&canonical)?;

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}
