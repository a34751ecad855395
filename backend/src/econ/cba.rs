//! Cost-benefit analysis (CBA) by net monetary benefit
//!
//! `NMB(λ) = λ · effect − cost` for a willingness-to-pay `λ`. The incremental
//! NMB of a strategy over the reference is linear in `λ`, so a curve over
//! the WTP range is fully determined by its two end points; its uncertainty
//! band is not, and is evaluated at every point.

use crate::econ::{comparator_index, validate_strategies, EconError, Strategy};
use crate::stats::{DifferenceStat, Interval};
use serde::{Deserialize, Serialize};

/// One point of an incremental NMB curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NmbPoint {
    pub wtp: f64,
    pub mean: f64,
    pub interval: Interval,
}

/// Net-monetary-benefit comparison over a willingness-to-pay range
///
/// # Example
/// ```
/// use markov_cohort_core_rs::econ::{CostBenefitAnalysis, Strategy};
///
/// let soc = Strategy::new("SOC", vec![1000.0, 1000.0], vec![5.0, 5.0]).unwrap();
/// let dmt = Strategy::new("DMT", vec![3000.0, 3000.0], vec![6.0, 6.0]).unwrap();
/// let cba = CostBenefitAnalysis::new(vec![soc, dmt], (0.0, 5000.0), true).unwrap();
///
/// assert_eq!(cba.nmb(1, 2000.0).unwrap(), 9000.0);
/// assert_eq!(cba.best_strategy(1000.0), 0);
/// assert_eq!(cba.best_strategy(3000.0), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CostBenefitAnalysis {
    strategies: Vec<Strategy>,
    wtp_range: (f64, f64),
    paired: bool,
}

impl CostBenefitAnalysis {
    pub fn new(
        strategies: Vec<Strategy>,
        wtp_range: (f64, f64),
        paired: bool,
    ) -> Result<Self, EconError> {
        let (min, max) = wtp_range;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min >= max {
            return Err(EconError::InvalidWtpRange { min, max });
        }
        validate_strategies(&strategies, paired)?;
        Ok(Self {
            strategies,
            wtp_range,
            paired,
        })
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn wtp_range(&self) -> (f64, f64) {
        self.wtp_range
    }

    /// Mean NMB of strategy `index` at `wtp`
    pub fn nmb(&self, index: usize, wtp: f64) -> Result<f64, EconError> {
        let s = self
            .strategies
            .get(index)
            .ok_or(EconError::StrategyOutOfRange(index))?;
        Ok(wtp * s.mean_effect() - s.mean_cost())
    }

    /// Incremental NMB of strategy `index` over the reference at `n_points`
    /// evenly spaced WTP values, with t confidence intervals
    pub fn incremental_nmb_curve(
        &self,
        index: usize,
        n_points: usize,
        alpha: f64,
    ) -> Result<Vec<NmbPoint>, EconError> {
        let index = comparator_index(&self.strategies, index)?;
        if n_points < 2 {
            return Err(EconError::TooFewPoints(n_points));
        }

        let (min, max) = self.wtp_range;
        let step = (max - min) / (n_points - 1) as f64;
        let (strategy, reference) = (&self.strategies[index], &self.strategies[0]);
        let name = format!("Incremental NMB of {}", strategy.name());

        (0..n_points)
            .map(|k| {
                let wtp = if k == n_points - 1 { max } else { min + step * k as f64 };
                let x = strategy.nmb_observations(wtp);
                let y = reference.nmb_observations(wtp);
                let diff = if self.paired {
                    DifferenceStat::paired(&name, &x, &y)?
                } else {
                    DifferenceStat::independent(&name, &x, &y)?
                };
                Ok(NmbPoint {
                    wtp,
                    mean: diff.mean(),
                    interval: diff.confidence_interval(alpha)?,
                })
            })
            .collect()
    }

    /// Index of the strategy with the highest mean NMB at `wtp`; ties go to
    /// the earlier strategy
    pub fn best_strategy(&self, wtp: f64) -> usize {
        let mut best = 0;
        let mut best_nmb = f64::NEG_INFINITY;
        for (i, s) in self.strategies.iter().enumerate() {
            let nmb = wtp * s.mean_effect() - s.mean_cost();
            if nmb > best_nmb {
                best = i;
                best_nmb = nmb;
            }
        }
        best
    }
}
