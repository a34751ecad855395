//! Parameter resampler for probabilistic sensitivity analysis (PSA)
//!
//! Each call to [`ParameterGenerator::generate`] draws one complete, internally
//! consistent [`ParameterSet`]:
//!
//! 1. one Dirichlet row per non-absorbing state (absorbing row stays identity)
//! 2. the therapy effect, if any, applied to the drawn matrix
//! 3. one Gamma (or constant 0) cost per state
//! 4. one Beta (or constant 0) utility per state
//! 5. one Gamma (or constant 0) per-cycle treatment cost
//!
//! Draws happen in this fixed order from a single stream seeded by the
//! caller, so the same seed always yields the same parameter set.

pub mod fit;

use crate::models::{
    EconomicInputs, ParameterError, ParameterSet, StateId, StateSpace, TherapyEffect,
    TransitionCounts, TransitionMatrix,
};
use crate::rng::RngManager;
use crate::simulation::{ParameterSource, SimulationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use fit::{BetaFit, DirichletRow, FitError, GammaFit, ParamDistribution};

/// Assumed coefficients of variation for the fitted distributions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PsaConfig {
    /// σ/μ of per-state costs
    pub cost_cv: f64,
    /// σ/μ of per-state utilities
    pub utility_cv: f64,
    /// σ/μ of the per-cycle treatment cost
    pub treatment_cost_cv: f64,
}

impl Default for PsaConfig {
    fn default() -> Self {
        Self {
            cost_cv: 0.2,
            utility_cv: 0.25,
            treatment_cost_cv: 0.2,
        }
    }
}

/// Point estimates the generator is fitted around
#[derive(Debug, Clone)]
pub struct PsaInputs {
    pub states: StateSpace,
    pub initial_state: StateId,
    pub counts: TransitionCounts,
    pub state_costs: Vec<f64>,
    pub state_utilities: Vec<f64>,
    pub treatment_cost: f64,
    /// Per-cycle discount rate (not resampled)
    pub discount_rate: f64,
    pub effect: Option<TherapyEffect>,
    pub psa: PsaConfig,
}

/// Draws fresh parameter sets from fitted distributions
#[derive(Debug, Clone)]
pub struct ParameterGenerator {
    states: StateSpace,
    initial_state: StateId,
    rows: Vec<DirichletRow>,
    costs: Vec<ParamDistribution>,
    utilities: Vec<ParamDistribution>,
    treatment_cost: ParamDistribution,
    discount_rate: f64,
    effect: Option<TherapyEffect>,
}

impl ParameterGenerator {
    /// Fit every distribution; any fit failure is returned immediately
    pub fn new(inputs: PsaInputs) -> Result<Self, SimulationError> {
        let n = inputs.states.len();
        if inputs.counts.num_states() != n {
            return Err(ParameterError::StateCountMismatch {
                matrix: inputs.counts.num_states(),
                space: n,
            }
            .into());
        }
        for (what, len) in [
            ("state costs", inputs.state_costs.len()),
            ("state utilities", inputs.state_utilities.len()),
        ] {
            if len != n {
                return Err(ParameterError::VectorLength {
                    what,
                    actual: len,
                    expected: n,
                }
                .into());
            }
        }

        let rows = inputs
            .states
            .alive_states()
            .map(|s| DirichletRow::new(s.index(), inputs.counts.row(s.index())))
            .collect::<Result<Vec<_>, _>>()?;

        let costs = inputs
            .state_costs
            .iter()
            .map(|&c| ParamDistribution::cost(c, inputs.psa.cost_cv))
            .collect::<Result<Vec<_>, _>>()?;

        let utilities = inputs
            .state_utilities
            .iter()
            .map(|&u| ParamDistribution::utility(u, inputs.psa.utility_cv))
            .collect::<Result<Vec<_>, _>>()?;

        let treatment_cost =
            ParamDistribution::cost(inputs.treatment_cost, inputs.psa.treatment_cost_cv)?;

        Ok(Self {
            states: inputs.states,
            initial_state: inputs.initial_state,
            rows,
            costs,
            utilities,
            treatment_cost,
            discount_rate: inputs.discount_rate,
            effect: inputs.effect,
        })
    }

    /// Draw one parameter set from a stream seeded with `seed`
    pub fn generate(&self, seed: u64) -> Result<ParameterSet, SimulationError> {
        let mut rng = RngManager::new(seed);
        let n = self.states.len();

        let mut matrix_rows: Vec<Vec<f64>> =
            self.rows.iter().map(|r| r.sample(&mut rng)).collect();
        let mut absorbing_row = vec![0.0; n];
        absorbing_row[n - 1] = 1.0;
        matrix_rows.push(absorbing_row);

        let mut matrix = TransitionMatrix::from_rows(matrix_rows)?;
        if let Some(effect) = &self.effect {
            matrix = effect.apply(&matrix)?;
        }

        let state_costs = self.costs.iter().map(|d| d.sample(&mut rng)).collect();
        let state_utilities = self.utilities.iter().map(|d| d.sample(&mut rng)).collect();
        let treatment_cost = self.treatment_cost.sample(&mut rng);

        let economics =
            EconomicInputs::new(state_costs, state_utilities, treatment_cost, self.discount_rate)?;
        let params = ParameterSet::new(self.states.clone(), self.initial_state, matrix)?
            .with_economics(economics)?;

        debug!(seed, treatment_cost, "drew PSA parameter set");
        Ok(params)
    }
}

impl ParameterSource for ParameterGenerator {
    fn parameters_for(&self, _: usize, seed: u64) -> Result<ParameterSet, SimulationError> {
        self.generate(seed)
    }
}
