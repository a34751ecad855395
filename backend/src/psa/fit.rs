//! Distribution fitting for probabilistic sensitivity analysis
//!
//! Costs are Gamma-distributed and utilities Beta-distributed, each fitted by
//! the method of moments to a point estimate and an assumed coefficient of
//! variation. A point estimate of exactly zero becomes a constant, since
//! neither distribution can represent an exact zero.
//!
//! Transition rows are Dirichlet-distributed with the observed counts as
//! concentrations. A zero count is a structural zero: that entry is always 0.

use crate::rng::RngManager;
use rand_distr::{Beta, Distribution, Gamma};
use thiserror::Error;

/// Errors from fitting a distribution to moments
#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("{family} fit needs a positive mean, got {mean}")]
    NonPositiveMean { family: &'static str, mean: f64 },

    #[error("{family} fit needs a positive standard deviation, got {stdev}")]
    NonPositiveStdev { family: &'static str, stdev: f64 },

    #[error("Beta fit needs a mean in (0, 1), got {0}")]
    MeanOutsideUnitInterval(f64),

    #[error("Beta fit: variance {variance} must be below mean * (1 - mean) = {limit}")]
    VarianceTooLarge { variance: f64, limit: f64 },

    #[error("Dirichlet row {0} has no positive concentration")]
    EmptyDirichletRow(usize),

    #[error("Invalid {family} parameters: {reason}")]
    Distribution { family: &'static str, reason: String },
}

fn check_moments(family: &'static str, mean: f64, stdev: f64) -> Result<(), FitError> {
    if !(mean > 0.0) || !mean.is_finite() {
        return Err(FitError::NonPositiveMean { family, mean });
    }
    if !(stdev > 0.0) || !stdev.is_finite() {
        return Err(FitError::NonPositiveStdev { family, stdev });
    }
    Ok(())
}

/// Gamma(shape, scale) matched to a mean and standard deviation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaFit {
    pub shape: f64,
    pub scale: f64,
}

impl GammaFit {
    /// Method of moments: shape = μ²/σ², scale = σ²/μ
    ///
    /// # Example
    /// ```
    /// use markov_cohort_core_rs::psa::GammaFit;
    ///
    /// let fit = GammaFit::from_moments(1000.0, 200.0).unwrap();
    /// assert!((fit.shape - 25.0).abs() < 1e-9);
    /// assert!((fit.shape * fit.scale - 1000.0).abs() < 1e-9);
    /// ```
    pub fn from_moments(mean: f64, stdev: f64) -> Result<Self, FitError> {
        check_moments("Gamma", mean, stdev)?;
        let variance = stdev * stdev;
        Ok(Self {
            shape: mean * mean / variance,
            scale: variance / mean,
        })
    }
}

/// Beta(a, b) matched to a mean and standard deviation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaFit {
    pub a: f64,
    pub b: f64,
}

impl BetaFit {
    pub fn from_moments(mean: f64, stdev: f64) -> Result<Self, FitError> {
        check_moments("Beta", mean, stdev)?;
        if mean >= 1.0 {
            return Err(FitError::MeanOutsideUnitInterval(mean));
        }
        let variance = stdev * stdev;
        let limit = mean * (1.0 - mean);
        if variance >= limit {
            return Err(FitError::VarianceTooLarge { variance, limit });
        }

        let common = limit / variance - 1.0;
        Ok(Self {
            a: mean * common,
            b: (1.0 - mean) * common,
        })
    }
}

/// A sampled scalar parameter
#[derive(Debug, Clone)]
pub enum ParamDistribution {
    Constant(f64),
    Gamma(Gamma<f64>),
    Beta(Beta<f64>),
}

impl ParamDistribution {
    /// Gamma fitted to (mean, mean * cv), or the constant 0 for a zero mean
    pub fn cost(mean: f64, cv: f64) -> Result<Self, FitError> {
        if mean == 0.0 {
            return Ok(ParamDistribution::Constant(0.0));
        }
        let fit = GammaFit::from_moments(mean, mean * cv)?;
        let dist = Gamma::new(fit.shape, fit.scale).map_err(|e| FitError::Distribution {
            family: "Gamma",
            reason: e.to_string(),
        })?;
        Ok(ParamDistribution::Gamma(dist))
    }

    /// Beta fitted to (mean, mean * cv), or the constant 0 for a zero mean
    pub fn utility(mean: f64, cv: f64) -> Result<Self, FitError> {
        if mean == 0.0 {
            return Ok(ParamDistribution::Constant(0.0));
        }
        let fit = BetaFit::from_moments(mean, mean * cv)?;
        let dist = Beta::new(fit.a, fit.b).map_err(|e| FitError::Distribution {
            family: "Beta",
            reason: e.to_string(),
        })?;
        Ok(ParamDistribution::Beta(dist))
    }

    pub fn sample(&self, rng: &mut RngManager) -> f64 {
        match self {
            ParamDistribution::Constant(value) => *value,
            ParamDistribution::Gamma(dist) => dist.sample(rng),
            ParamDistribution::Beta(dist) => dist.sample(rng),
        }
    }
}

/// Dirichlet distribution over one transition row, allowing structural zeros
#[derive(Debug, Clone)]
pub struct DirichletRow {
    /// One Gamma(α_j, 1) per positive concentration, `None` for structural zeros
    components: Vec<Option<Gamma<f64>>>,
    /// Mean proportions α_j / Σα, used if every draw underflows to zero
    mean: Vec<f64>,
}

impl DirichletRow {
    pub fn new(row_index: usize, concentrations: &[u64]) -> Result<Self, FitError> {
        let total: u64 = concentrations.iter().sum();
        if total == 0 {
            return Err(FitError::EmptyDirichletRow(row_index));
        }

        let mut components = Vec::with_capacity(concentrations.len());
        for &alpha in concentrations {
            if alpha == 0 {
                components.push(None);
            } else {
                let gamma = Gamma::new(alpha as f64, 1.0).map_err(|e| FitError::Distribution {
                    family: "Dirichlet",
                    reason: e.to_string(),
                })?;
                components.push(Some(gamma));
            }
        }
        let mean = concentrations
            .iter()
            .map(|&a| a as f64 / total as f64)
            .collect();

        Ok(Self { components, mean })
    }

    /// One probability row; sums to 1 by construction
    pub fn sample(&self, rng: &mut RngManager) -> Vec<f64> {
        let draws: Vec<f64> = self
            .components
            .iter()
            .map(|c| c.as_ref().map_or(0.0, |g| g.sample(rng)))
            .collect();

        let total: f64 = draws.iter().sum();
        if total > 0.0 {
            draws.into_iter().map(|d| d / total).collect()
        } else {
            self.mean.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_fit_rejects_non_positive_mean() {
        assert_eq!(
            GammaFit::from_moments(-5.0, 1.0).unwrap_err(),
            FitError::NonPositiveMean { family: "Gamma", mean: -5.0 }
        );
        assert!(matches!(
            GammaFit::from_moments(5.0, 0.0),
            Err(FitError::NonPositiveStdev { .. })
        ));
    }

    #[test]
    fn test_beta_fit_moments() {
        let fit = BetaFit::from_moments(0.8, 0.2).unwrap();
        let mean = fit.a / (fit.a + fit.b);
        let var = fit.a * fit.b / ((fit.a + fit.b).powi(2) * (fit.a + fit.b + 1.0));
        assert!((mean - 0.8).abs() < 1e-12);
        assert!((var - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_beta_fit_rejects_excess_variance() {
        assert!(matches!(
            BetaFit::from_moments(0.5, 0.6),
            Err(FitError::VarianceTooLarge { .. })
        ));
        assert_eq!(
            BetaFit::from_moments(1.2, 0.1).unwrap_err(),
            FitError::MeanOutsideUnitInterval(1.2)
        );
    }

    #[test]
    fn test_zero_mean_is_constant() {
        let mut rng = RngManager::new(3);
        assert_eq!(ParamDistribution::cost(0.0, 0.2).unwrap().sample(&mut rng), 0.0);
        assert_eq!(ParamDistribution::utility(0.0, 0.25).unwrap().sample(&mut rng), 0.0);
    }

    #[test]
    fn test_negative_utility_fails_fit() {
        assert!(ParamDistribution::utility(-0.1, 0.25).is_err());
    }

    #[test]
    fn test_gamma_sample_mean_near_target() {
        let dist = ParamDistribution::cost(3875.0, 0.2).unwrap();
        let mut rng = RngManager::new(11);
        let n = 20_000;
        let mean = (0..n).map(|_| dist.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!((mean - 3875.0).abs() / 3875.0 < 0.02, "mean {}", mean);
    }

    #[test]
    fn test_dirichlet_row_keeps_structural_zeros() {
        let row = DirichletRow::new(0, &[70, 28, 0, 0, 3]).unwrap();
        let mut rng = RngManager::new(5);
        for _ in 0..200 {
            let p = row.sample(&mut rng);
            assert_eq!(p[2], 0.0);
            assert_eq!(p[3], 0.0);
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dirichlet_rejects_empty_row() {
        assert_eq!(
            DirichletRow::new(4, &[0, 0]).unwrap_err(),
            FitError::EmptyDirichletRow(4)
        );
    }
}
