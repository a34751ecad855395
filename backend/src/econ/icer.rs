//! Incremental cost-effectiveness ratio
//!
//! The ratio `Δcost / Δeffect` is only reported as a number when it has an
//! unambiguous reading. Quadrants of the cost-effectiveness plane:
//!
//! ```text
//!               Δcost > 0
//!   Dominated   |   Ratio (more costly, more effective)
//!  -------------+-------------  Δeffect
//!   Tradeoff    |   Dominant
//!               Δcost <= 0
//! ```

use crate::econ::{EconError, Strategy};
use crate::rng::RngManager;
use crate::stats::summary::{check_alpha, percentile_sorted, sorted_copy};
use crate::stats::Interval;
use serde::{Deserialize, Serialize};

/// Incremental effects smaller than this count as zero
pub const EFFECT_TOLERANCE: f64 = 1e-12;

/// ICER of a strategy against a comparator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Icer {
    /// More costly and more effective: cost per unit of effect gained
    Ratio(f64),
    /// Less costly and less effective: savings per unit of effect forgone.
    /// Not a cost-effectiveness claim.
    Tradeoff(f64),
    /// More costly, not more effective
    Dominated,
    /// Not more costly, not less effective
    Dominant,
    /// No difference in cost or effect
    Undefined,
}

impl Icer {
    /// Classify the increments of a strategy over its comparator
    ///
    /// # Example
    /// ```
    /// use markov_cohort_core_rs::econ::Icer;
    ///
    /// assert_eq!(Icer::from_increments(5000.0, 0.5), Icer::Ratio(10_000.0));
    /// assert_eq!(Icer::from_increments(500.0, -0.1), Icer::Dominated);
    /// assert_eq!(Icer::from_increments(0.0, 0.0), Icer::Undefined);
    /// ```
    pub fn from_increments(delta_cost: f64, delta_effect: f64) -> Self {
        if delta_effect.abs() < EFFECT_TOLERANCE {
            if delta_cost > 0.0 {
                Icer::Dominated
            } else if delta_cost < 0.0 {
                Icer::Dominant
            } else {
                Icer::Undefined
            }
        } else if delta_effect > 0.0 {
            if delta_cost > 0.0 {
                Icer::Ratio(delta_cost / delta_effect)
            } else {
                Icer::Dominant
            }
        } else if delta_cost >= 0.0 {
            Icer::Dominated
        } else {
            Icer::Tradeoff(delta_cost / delta_effect)
        }
    }

    /// The numeric ratio, for the two quadrants that have one
    pub fn value(&self) -> Option<f64> {
        match self {
            Icer::Ratio(r) | Icer::Tradeoff(r) => Some(*r),
            _ => None,
        }
    }
}

/// Bootstrap percentile interval of `Δcost / Δeffect`
///
/// Paired strategies resample observation indices jointly; independent
/// strategies resample each strategy on its own. Resamples whose incremental
/// effect is within [`EFFECT_TOLERANCE`] of zero are dropped.
pub(crate) fn bootstrap_ratio_interval(
    strategy: &Strategy,
    reference: &Strategy,
    paired: bool,
    alpha: f64,
    n_bootstrap: usize,
    seed: u64,
) -> Result<Interval, EconError> {
    check_alpha(alpha)?;
    if n_bootstrap == 0 {
        return Err(EconError::DegenerateBootstrap(0));
    }

    let mut rng = RngManager::new(seed);
    let mut ratios = Vec::with_capacity(n_bootstrap);
    for _ in 0..n_bootstrap {
        let (x_cost, x_effect, y_cost, y_effect) = if paired {
            resample_paired(strategy, reference, &mut rng)
        } else {
            let (xc, xe) = resample(strategy, &mut rng);
            let (yc, ye) = resample(reference, &mut rng);
            (xc, xe, yc, ye)
        };
        let delta_effect = x_effect - y_effect;
        if delta_effect.abs() >= EFFECT_TOLERANCE {
            ratios.push((x_cost - y_cost) / delta_effect);
        }
    }

    if ratios.is_empty() {
        return Err(EconError::DegenerateBootstrap(n_bootstrap));
    }
    let sorted = sorted_copy(&ratios);
    Ok(Interval::new(
        percentile_sorted(&sorted, 100.0 * alpha / 2.0),
        percentile_sorted(&sorted, 100.0 * (1.0 - alpha / 2.0)),
    ))
}

/// Mean cost and effect of one bootstrap resample
fn resample(strategy: &Strategy, rng: &mut RngManager) -> (f64, f64) {
    let n = strategy.len();
    let (mut cost, mut effect) = (0.0, 0.0);
    for _ in 0..n {
        let i = rng.range(0, n as i64) as usize;
        cost += strategy.costs()[i];
        effect += strategy.effects()[i];
    }
    (cost / n as f64, effect / n as f64)
}

fn resample_paired(x: &Strategy, y: &Strategy, rng: &mut RngManager) -> (f64, f64, f64, f64) {
    let n = x.len();
    let mut sums = (0.0, 0.0, 0.0, 0.0);
    for _ in 0..n {
        let i = rng.range(0, n as i64) as usize;
        sums.0 += x.costs()[i];
        sums.1 += x.effects()[i];
        sums.2 += y.costs()[i];
        sums.3 += y.effects()[i];
    }
    let n = n as f64;
    (sums.0 / n, sums.1 / n, sums.2 / n, sums.3 / n)
}
