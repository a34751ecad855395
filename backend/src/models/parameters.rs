//! Parameter sets
//!
//! A [`ParameterSet`] is the immutable bundle a cohort is simulated with:
//! the state space, initial state, transition matrix and (optionally) the
//! economic inputs used for cost/utility accrual. Nothing can mutate it after
//! construction; PSA produces a fresh set per cohort instead.

use crate::models::health_state::{StateId, StateSpace};
use crate::models::transition::TransitionMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling a parameter set
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("Transition matrix has {matrix} states, state space has {space}")]
    StateCountMismatch { matrix: usize, space: usize },

    #[error("{what} has {actual} entries, expected one per state ({expected})")]
    VectorLength {
        what: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("Initial state cannot be the absorbing state")]
    AbsorbingInitialState,

    #[error("Invalid {what}: {value}")]
    InvalidValue { what: &'static str, value: f64 },
}

/// Per-cycle costs, utilities and discounting
///
/// All amounts are per simulation cycle; `discount_rate` is the per-cycle
/// rate (annual rate divided by cycles per year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicInputs {
    state_costs: Vec<f64>,
    state_utilities: Vec<f64>,
    treatment_cost: f64,
    discount_rate: f64,
}

impl EconomicInputs {
    pub fn new(
        state_costs: Vec<f64>,
        state_utilities: Vec<f64>,
        treatment_cost: f64,
        discount_rate: f64,
    ) -> Result<Self, ParameterError> {
        if let Some(&bad) = state_costs.iter().find(|c| !c.is_finite() || **c < 0.0) {
            return Err(ParameterError::InvalidValue {
                what: "state cost",
                value: bad,
            });
        }
        if let Some(&bad) = state_utilities.iter().find(|u| !u.is_finite()) {
            return Err(ParameterError::InvalidValue {
                what: "state utility",
                value: bad,
            });
        }
        if !treatment_cost.is_finite() || treatment_cost < 0.0 {
            return Err(ParameterError::InvalidValue {
                what: "treatment cost",
                value: treatment_cost,
            });
        }
        if !discount_rate.is_finite() || discount_rate < 0.0 {
            return Err(ParameterError::InvalidValue {
                what: "discount rate",
                value: discount_rate,
            });
        }
        if state_costs.len() != state_utilities.len() {
            return Err(ParameterError::VectorLength {
                what: "state utilities",
                actual: state_utilities.len(),
                expected: state_costs.len(),
            });
        }

        Ok(Self {
            state_costs,
            state_utilities,
            treatment_cost,
            discount_rate,
        })
    }

    pub fn state_cost(&self, state: StateId) -> f64 {
        self.state_costs[state.index()]
    }

    pub fn state_utility(&self, state: StateId) -> f64 {
        self.state_utilities[state.index()]
    }

    pub fn state_costs(&self) -> &[f64] {
        &self.state_costs
    }

    pub fn state_utilities(&self) -> &[f64] {
        &self.state_utilities
    }

    pub fn treatment_cost(&self) -> f64 {
        self.treatment_cost
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }
}

/// Immutable per-run model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    states: StateSpace,
    initial_state: StateId,
    transition: TransitionMatrix,
    economics: Option<EconomicInputs>,
}

impl ParameterSet {
    /// Parameters for survival/milestone outcomes only (no cost tracking)
    pub fn new(
        states: StateSpace,
        initial_state: StateId,
        transition: TransitionMatrix,
    ) -> Result<Self, ParameterError> {
        if transition.num_states() != states.len() {
            return Err(ParameterError::StateCountMismatch {
                matrix: transition.num_states(),
                space: states.len(),
            });
        }
        if states.is_absorbing(initial_state) {
            return Err(ParameterError::AbsorbingInitialState);
        }

        Ok(Self {
            states,
            initial_state,
            transition,
            economics: None,
        })
    }

    /// Enable cost/utility accrual
    pub fn with_economics(mut self, economics: EconomicInputs) -> Result<Self, ParameterError> {
        if economics.state_costs.len() != self.states.len() {
            return Err(ParameterError::VectorLength {
                what: "state costs",
                actual: economics.state_costs.len(),
                expected: self.states.len(),
            });
        }
        self.economics = Some(economics);
        Ok(self)
    }

    pub fn states(&self) -> &StateSpace {
        &self.states
    }

    pub fn initial_state(&self) -> StateId {
        self.initial_state
    }

    pub fn transition(&self) -> &TransitionMatrix {
        &self.transition
    }

    pub fn economics(&self) -> Option<&EconomicInputs> {
        self.economics.as_ref()
    }
}
