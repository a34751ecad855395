//! Summary statistics over a finalized sample
//!
//! Intervals come in two flavours:
//! - **confidence interval** of the mean (Student t, `n - 1` degrees of freedom)
//! - **prediction / projection interval**: the empirical `alpha/2` and
//!   `1 - alpha/2` percentiles of the observations themselves

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// Errors from computing statistics
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("{0}: no observations")]
    EmptySample(String),

    #[error("Significance level {0} outside (0, 1)")]
    InvalidAlpha(f64),

    #[error("{0}: at least two observations needed")]
    TooFewObservations(String),

    #[error("Paired samples differ in length: {x} vs {y}")]
    LengthMismatch { x: usize, y: usize },
}

/// Closed interval `[lower, upper]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

pub(crate) fn check_alpha(alpha: f64) -> Result<(), StatsError> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(StatsError::InvalidAlpha(alpha))
    }
}

/// Two-sided Student t critical value `t_{1 - alpha/2, df}`
pub(crate) fn t_critical(alpha: f64, df: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => dist.inverse_cdf(1.0 - alpha / 2.0),
        Err(_) => f64::NAN,
    }
}

/// Linear-interpolated percentile of sorted data, `p` in [0, 100]
pub(crate) fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let w = rank - lower as f64;
        sorted[lower] * (1.0 - w) + sorted[upper] * w
    }
}

pub(crate) fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Mean, dispersion and intervals of one sample
///
/// # Example
/// ```
/// use markov_cohort_core_rs::stats::SummaryStat;
///
/// let stat = SummaryStat::new("survival", &[1.5, 2.5, 3.5, 4.5]).unwrap();
/// assert_eq!(stat.mean(), 3.0);
/// let pi = stat.percentile_interval(0.5).unwrap();
/// assert_eq!((pi.lower, pi.upper), (2.25, 3.75));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStat {
    name: String,
    sorted: Vec<f64>,
    mean: f64,
    stdev: f64,
}

impl SummaryStat {
    pub fn new(name: &str, data: &[f64]) -> Result<Self, StatsError> {
        if data.is_empty() {
            return Err(StatsError::EmptySample(name.to_string()));
        }

        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let stdev = if data.len() > 1 {
            let ss: f64 = data.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        Ok(Self {
            name: name.to_string(),
            sorted: sorted_copy(data),
            mean,
            stdev,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> usize {
        self.sorted.len()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation (`n - 1` denominator)
    pub fn stdev(&self) -> f64 {
        self.stdev
    }

    pub fn standard_error(&self) -> f64 {
        self.stdev / (self.count() as f64).sqrt()
    }

    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    /// `p`-th percentile, `p` in [0, 100]
    pub fn percentile(&self, p: f64) -> f64 {
        percentile_sorted(&self.sorted, p.clamp(0.0, 100.0))
    }

    /// Half-width of the t confidence interval
    pub fn t_half_length(&self, alpha: f64) -> Result<f64, StatsError> {
        check_alpha(alpha)?;
        if self.count() < 2 {
            return Err(StatsError::TooFewObservations(self.name.clone()));
        }
        let df = (self.count() - 1) as f64;
        Ok(t_critical(alpha, df) * self.standard_error())
    }

    /// Student t confidence interval of the mean
    pub fn confidence_interval(&self, alpha: f64) -> Result<Interval, StatsError> {
        let half = self.t_half_length(alpha)?;
        Ok(Interval::new(self.mean - half, self.mean + half))
    }

    /// Empirical `[alpha/2, 1 - alpha/2]` percentile interval of the observations
    pub fn percentile_interval(&self, alpha: f64) -> Result<Interval, StatsError> {
        check_alpha(alpha)?;
        Ok(Interval::new(
            self.percentile(100.0 * alpha / 2.0),
            self.percentile(100.0 * (1.0 - alpha / 2.0)),
        ))
    }
}
