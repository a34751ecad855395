//! Economic evaluation of competing strategies
//!
//! - [`CostEffectivenessAnalysis`]: incremental cost and effect against a
//!   reference strategy, ICERs, and the cost-effectiveness frontier
//! - [`CostBenefitAnalysis`]: net monetary benefit as a function of the
//!   willingness-to-pay (WTP) per unit of effect
//!
//! In both analyses the first strategy is the reference. Observations of a
//! strategy are typically the discounted costs and utilities of one cohort,
//! or the cohort means of a multi-cohort run.

pub mod cba;
pub mod cea;
pub mod icer;

use crate::stats::StatsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cba::{CostBenefitAnalysis, NmbPoint};
pub use cea::{CostEffectivenessAnalysis, Dominance, FrontierEntry, IncrementalOutcome};
pub use icer::{Icer, EFFECT_TOLERANCE};

/// Economic evaluation errors
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    #[error("Strategy {0} has no observations")]
    EmptyStrategy(String),

    #[error("Strategy {name}: {costs} costs but {effects} effects")]
    UnpairedObservations {
        name: String,
        costs: usize,
        effects: usize,
    },

    #[error("Strategy {name} has a non-finite observation: {value}")]
    NonFinite { name: String, value: f64 },

    #[error("Comparison needs at least two strategies, got {0}")]
    TooFewStrategies(usize),

    #[error("Paired analysis: strategy {name} has {actual} observations, reference has {expected}")]
    PairedCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Strategy index {0} out of range")]
    StrategyOutOfRange(usize),

    #[error("The reference strategy has no increment against itself")]
    ReferenceStrategy,

    #[error("Invalid willingness-to-pay range [{min}, {max}]")]
    InvalidWtpRange { min: f64, max: f64 },

    #[error("A curve needs at least two points, got {0}")]
    TooFewPoints(usize),

    #[error("Bootstrap produced no usable ratio out of {0} resamples")]
    DegenerateBootstrap(usize),

    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// A named set of cost and effect observations
///
/// `costs[i]` and `effects[i]` belong to the same observation.
///
/// # Example
/// ```
/// use markov_cohort_core_rs::econ::Strategy;
///
/// let soc = Strategy::new("SOC", vec![100.0, 120.0], vec![2.0, 2.2]).unwrap();
/// assert_eq!(soc.mean_cost(), 110.0);
/// assert!((soc.mean_effect() - 2.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    name: String,
    costs: Vec<f64>,
    effects: Vec<f64>,
}

impl Strategy {
    pub fn new(name: &str, costs: Vec<f64>, effects: Vec<f64>) -> Result<Self, EconError> {
        if costs.is_empty() || effects.is_empty() {
            return Err(EconError::EmptyStrategy(name.to_string()));
        }
        if costs.len() != effects.len() {
            return Err(EconError::UnpairedObservations {
                name: name.to_string(),
                costs: costs.len(),
                effects: effects.len(),
            });
        }
        if let Some(&value) = costs.iter().chain(&effects).find(|v| !v.is_finite()) {
            return Err(EconError::NonFinite {
                name: name.to_string(),
                value,
            });
        }

        Ok(Self {
            name: name.to_string(),
            costs,
            effects,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn effects(&self) -> &[f64] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Always false; construction rejects empty strategies
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn mean_cost(&self) -> f64 {
        mean(&self.costs)
    }

    pub fn mean_effect(&self) -> f64 {
        mean(&self.effects)
    }

    /// Net monetary benefit of each observation at `wtp`
    pub fn nmb_observations(&self, wtp: f64) -> Vec<f64> {
        self.effects
            .iter()
            .zip(&self.costs)
            .map(|(e, c)| wtp * e - c)
            .collect()
    }
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// Shared checks of both analyses
fn validate_strategies(strategies: &[Strategy], paired: bool) -> Result<(), EconError> {
    if strategies.len() < 2 {
        return Err(EconError::TooFewStrategies(strategies.len()));
    }
    if paired {
        let expected = strategies[0].len();
        if let Some(s) = strategies.iter().find(|s| s.len() != expected) {
            return Err(EconError::PairedCountMismatch {
                name: s.name.clone(),
                expected,
                actual: s.len(),
            });
        }
    }
    Ok(())
}

/// Index of a non-reference strategy
fn comparator_index(strategies: &[Strategy], index: usize) -> Result<usize, EconError> {
    if index >= strategies.len() {
        return Err(EconError::StrategyOutOfRange(index));
    }
    if index == 0 {
        return Err(EconError::ReferenceStrategy);
    }
    Ok(index)
}
