//! Domain models for the cohort simulator

pub mod health_state;
pub mod parameters;
pub mod transition;

// Re-exports
pub use health_state::{StateId, StateSpace, StateSpaceError};
pub use parameters::{EconomicInputs, ParameterError, ParameterSet};
pub use transition::{
    TherapyEffect, TransitionCounts, TransitionError, TransitionMatrix, ROW_SUM_TOLERANCE,
};
