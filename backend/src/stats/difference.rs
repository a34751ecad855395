//! Difference statistics between a sample and a reference sample
//!
//! - **Paired**: observations share an index (same cohort / same patient
//!   seed), so the statistic is a [`SummaryStat`] of `x_i - y_i`.
//! - **Independent**: means are differenced; the confidence interval uses the
//!   Welch–Satterthwaite t approximation and the prediction interval uses
//!   percentiles of randomly re-paired differences.

use crate::rng::RngManager;
use crate::stats::summary::{
    check_alpha, percentile_sorted, sorted_copy, t_critical, Interval, StatsError, SummaryStat,
};

/// Seed for re-pairing independent samples; fixed so intervals are reproducible
const REPAIRING_SEED: u64 = 1;

/// Mean difference `x - y_ref` with intervals
#[derive(Debug, Clone)]
pub enum DifferenceStat {
    Paired(SummaryStat),
    Independent {
        x: SummaryStat,
        y_ref: SummaryStat,
        /// Sorted differences of randomly re-paired observations
        repaired: Vec<f64>,
    },
}

impl DifferenceStat {
    /// Difference of paired observations
    ///
    /// # Example
    /// ```
    /// use markov_cohort_core_rs::stats::DifferenceStat;
    ///
    /// let diff = DifferenceStat::paired("cost", &[10.0, 12.0, 14.0], &[9.0, 10.0, 11.0]).unwrap();
    /// assert_eq!(diff.mean(), 2.0);
    /// ```
    pub fn paired(name: &str, x: &[f64], y_ref: &[f64]) -> Result<Self, StatsError> {
        if x.len() != y_ref.len() {
            return Err(StatsError::LengthMismatch {
                x: x.len(),
                y: y_ref.len(),
            });
        }
        let diffs: Vec<f64> = x.iter().zip(y_ref).map(|(a, b)| a - b).collect();
        Ok(DifferenceStat::Paired(SummaryStat::new(name, &diffs)?))
    }

    /// Difference of independent samples
    pub fn independent(name: &str, x: &[f64], y_ref: &[f64]) -> Result<Self, StatsError> {
        let x_stat = SummaryStat::new(name, x)?;
        let y_stat = SummaryStat::new(name, y_ref)?;

        let n = x.len().max(y_ref.len());
        let mut rng = RngManager::new(REPAIRING_SEED);
        let diffs: Vec<f64> = (0..n)
            .map(|_| {
                let i = rng.range(0, x.len() as i64) as usize;
                let j = rng.range(0, y_ref.len() as i64) as usize;
                x[i] - y_ref[j]
            })
            .collect();

        Ok(DifferenceStat::Independent {
            x: x_stat,
            y_ref: y_stat,
            repaired: sorted_copy(&diffs),
        })
    }

    pub fn mean(&self) -> f64 {
        match self {
            DifferenceStat::Paired(stat) => stat.mean(),
            DifferenceStat::Independent { x, y_ref, .. } => x.mean() - y_ref.mean(),
        }
    }

    /// t confidence interval of the mean difference
    pub fn confidence_interval(&self, alpha: f64) -> Result<Interval, StatsError> {
        match self {
            DifferenceStat::Paired(stat) => stat.confidence_interval(alpha),
            DifferenceStat::Independent { x, y_ref, .. } => {
                check_alpha(alpha)?;
                if x.count() < 2 || y_ref.count() < 2 {
                    return Err(StatsError::TooFewObservations(x.name().to_string()));
                }

                let vx = x.stdev().powi(2) / x.count() as f64;
                let vy = y_ref.stdev().powi(2) / y_ref.count() as f64;
                let se = (vx + vy).sqrt();
                let mean = self.mean();
                if se == 0.0 {
                    return Ok(Interval::new(mean, mean));
                }

                // Welch–Satterthwaite degrees of freedom
                let df = (vx + vy).powi(2)
                    / (vx.powi(2) / (x.count() - 1) as f64
                        + vy.powi(2) / (y_ref.count() - 1) as f64);
                let half = t_critical(alpha, df) * se;
                Ok(Interval::new(mean - half, mean + half))
            }
        }
    }

    /// Percentile interval of individual differences
    pub fn prediction_interval(&self, alpha: f64) -> Result<Interval, StatsError> {
        match self {
            DifferenceStat::Paired(stat) => stat.percentile_interval(alpha),
            DifferenceStat::Independent { repaired, .. } => {
                check_alpha(alpha)?;
                Ok(Interval::new(
                    percentile_sorted(repaired, 100.0 * alpha / 2.0),
                    percentile_sorted(repaired, 100.0 * (1.0 - alpha / 2.0)),
                ))
            }
        }
    }
}
