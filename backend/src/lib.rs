//! Markov Cohort Core - Rust Engine
//!
//! Monte-Carlo simulation of patient cohorts through a discrete-time Markov
//! chain of health states, with half-cycle-corrected accrual of survival,
//! time-to-milestone, discounted cost and discounted utility, and economic
//! comparison of treatment strategies.
//!
//! # Architecture
//!
//! - **models**: Domain types (StateSpace, TransitionMatrix, ParameterSet)
//! - **core**: Pure per-cycle accrual and discounting arithmetic
//! - **simulation**: Patient → Cohort → MultiCohort engine
//! - **psa**: Parameter resampling for probabilistic sensitivity analysis
//! - **stats**: Summary, difference and alive-path statistics
//! - **econ**: Cost-effectiveness and cost-benefit analysis
//! - **config**: JSON model configuration
//! - **rng**: Deterministic random number generation and seed derivation
//!
//! # Critical Invariants
//!
//! 1. Every transition row sums to 1 within 1e-9; the last state is absorbing
//! 2. All randomness is deterministic (seeded RNG, one stream per patient)
//! 3. Outcomes are immutable once produced
//! 4. A degenerate ICER is an explicit value, never NaN or infinity

// Module declarations
pub mod config;
pub mod core;
pub mod econ;
pub mod models;
pub mod psa;
pub mod rng;
pub mod simulation;
pub mod stats;

// Re-exports for convenience
pub use config::{ConfigError, ModelConfig, SeedConfig, TherapyConfig};
pub use self::core::accrual::{event_time, present_value, transition_accrual, CycleAccrual};
pub use econ::{
    CostBenefitAnalysis, CostEffectivenessAnalysis, Dominance, EconError, FrontierEntry, Icer,
    Strategy,
};
pub use models::{
    EconomicInputs, ParameterError, ParameterSet, StateId, StateSpace, StateSpaceError,
    TherapyEffect, TransitionCounts, TransitionError, TransitionMatrix,
};
pub use psa::{FitError, ParameterGenerator, PsaConfig, PsaInputs};
pub use rng::{HashedSeeds, RngManager, SeedDerivation, SequentialSeeds};
pub use simulation::{
    Cohort, CohortOutcomes, MultiCohort, MultiCohortOutcomes, ParameterSource, Patient,
    PatientRecord, SimulationError,
};
pub use stats::{AlivePath, DifferenceStat, Interval, StatsError, SummaryStat};
