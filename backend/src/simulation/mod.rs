//! Simulation engine: patient → cohort → multi-cohort
//!
//! ```text
//! MultiCohort::simulate
//!   for each cohort index i:
//!     params = source.parameters_for(i, seeds.parameter_seed(i))
//!     Cohort::simulate
//!       for each patient j:
//!         Patient(seed = seeds.patient_seed(cohort_id, j)).simulate(horizon)
//!         fold outcomes
//!   aggregate cohort means
//! ```
//!
//! Everything is single-threaded and synchronous; a run either completes for
//! every cohort or returns the first error.

pub mod cohort;
pub mod multi_cohort;
pub mod patient;

use crate::models::{ParameterError, StateSpaceError, TransitionError};
use crate::psa::FitError;
use crate::stats::StatsError;
use thiserror::Error;

pub use cohort::{Cohort, CohortOutcomes};
pub use multi_cohort::{
    CohortIntervals, CohortSummary, MultiCohort, MultiCohortOutcomes, ParameterSource,
};
pub use patient::{Patient, PatientRecord};

/// Simulation error types
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Population size must be positive, got {0}")]
    InvalidPopulation(usize),

    #[error("Horizon must be at least one cycle")]
    InvalidHorizon,

    #[error("Multi-cohort run needs at least one cohort")]
    NoCohorts,

    #[error("Cohort index {0} out of range")]
    CohortOutOfRange(usize),

    #[error("State space error: {0}")]
    StateSpace(#[from] StateSpaceError),

    #[error("Transition matrix error: {0}")]
    Transition(#[from] TransitionError),

    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Distribution fit error: {0}")]
    Fit(#[from] FitError),

    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),
}
