//! Multi-cohort driver
//!
//! Repeats cohort simulation across many cohorts and aggregates the cohort
//! means into across-cohort statistics.
//!
//! - With a fixed [`ParameterSet`] the spread of cohort means reflects
//!   sampling (first-order) uncertainty only.
//! - With a PSA [`ParameterGenerator`](crate::psa::ParameterGenerator) every
//!   cohort draws its own parameters, so the spread also reflects parameter
//!   (second-order) uncertainty.

use crate::models::parameters::ParameterSet;
use crate::rng::SeedDerivation;
use crate::simulation::cohort::{Cohort, CohortOutcomes};
use crate::simulation::SimulationError;
use crate::stats::{AlivePath, Interval, StatsError, SummaryStat};
use tracing::{info, warn};

/// Supplies the parameter set of each cohort in a multi-cohort run
pub trait ParameterSource {
    /// Parameters for the cohort at `cohort_index`; `seed` comes from
    /// [`SeedDerivation::parameter_seed`].
    fn parameters_for(&self, cohort_index: usize, seed: u64)
        -> Result<ParameterSet, SimulationError>;
}

impl ParameterSource for ParameterSet {
    fn parameters_for(&self, _: usize, _: u64) -> Result<ParameterSet, SimulationError> {
        Ok(self.clone())
    }
}

/// Mean outcomes of one cohort
///
/// A mean is `None` when the cohort recorded no observation of that outcome
/// (e.g. nobody died within the horizon).
#[derive(Debug, Clone)]
pub struct CohortSummary {
    pub cohort_id: u64,
    pub mean_survival_time: Option<f64>,
    pub mean_time_to_milestone: Option<f64>,
    pub mean_cost: Option<f64>,
    pub mean_utility: Option<f64>,
}

impl CohortSummary {
    fn from_outcomes(outcomes: &CohortOutcomes) -> Self {
        Self {
            cohort_id: outcomes.cohort_id(),
            mean_survival_time: outcomes.survival_stat().ok().map(|s| s.mean()),
            mean_time_to_milestone: outcomes.milestone_stat().ok().map(|s| s.mean()),
            mean_cost: outcomes.cost_stat().ok().map(|s| s.mean()),
            mean_utility: outcomes.utility_stat().ok().map(|s| s.mean()),
        }
    }
}

/// Survival and milestone intervals of a single cohort
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CohortIntervals {
    pub survival: Interval,
    pub milestone: Interval,
}

/// Many cohorts simulated under fixed or resampled parameters
pub struct MultiCohort<S: ParameterSource> {
    cohort_ids: Vec<u64>,
    population_size: usize,
    source: S,
}

impl<S: ParameterSource> MultiCohort<S> {
    pub fn new(
        cohort_ids: Vec<u64>,
        population_size: usize,
        source: S,
    ) -> Result<Self, SimulationError> {
        if cohort_ids.is_empty() {
            return Err(SimulationError::NoCohorts);
        }
        if population_size == 0 {
            return Err(SimulationError::InvalidPopulation(population_size));
        }
        Ok(Self {
            cohort_ids,
            population_size,
            source,
        })
    }

    pub fn num_cohorts(&self) -> usize {
        self.cohort_ids.len()
    }

    /// Simulate all cohorts in order; any failure aborts the whole run
    pub fn simulate(
        &self,
        horizon: usize,
        seeds: &dyn SeedDerivation,
    ) -> Result<MultiCohortOutcomes, SimulationError> {
        if horizon == 0 {
            return Err(SimulationError::InvalidHorizon);
        }
        info!(
            cohorts = self.cohort_ids.len(),
            population = self.population_size,
            horizon,
            "starting multi-cohort run"
        );

        let mut cohorts = Vec::with_capacity(self.cohort_ids.len());
        for (index, &id) in self.cohort_ids.iter().enumerate() {
            let params = self
                .source
                .parameters_for(index, seeds.parameter_seed(index))?;
            let cohort = Cohort::new(id, self.population_size, params)?;
            cohorts.push(cohort.simulate(horizon, seeds)?);
        }

        let outcomes = MultiCohortOutcomes::new(cohorts);
        info!(
            cohorts = outcomes.num_cohorts(),
            "multi-cohort run complete"
        );
        Ok(outcomes)
    }
}

/// Outcomes of a multi-cohort run (read-only)
#[derive(Debug, Clone)]
pub struct MultiCohortOutcomes {
    cohorts: Vec<CohortOutcomes>,
    summaries: Vec<CohortSummary>,
}

impl MultiCohortOutcomes {
    fn new(cohorts: Vec<CohortOutcomes>) -> Self {
        let summaries: Vec<CohortSummary> =
            cohorts.iter().map(CohortSummary::from_outcomes).collect();

        for summary in &summaries {
            if summary.mean_survival_time.is_none() {
                warn!(
                    cohort_id = summary.cohort_id,
                    "no deaths within horizon; cohort excluded from mean survival statistics"
                );
            }
            if summary.mean_time_to_milestone.is_none() {
                warn!(
                    cohort_id = summary.cohort_id,
                    "milestone never reached; cohort excluded from milestone statistics"
                );
            }
        }

        Self { cohorts, summaries }
    }

    pub fn num_cohorts(&self) -> usize {
        self.cohorts.len()
    }

    pub fn cohorts(&self) -> &[CohortOutcomes] {
        &self.cohorts
    }

    pub fn summaries(&self) -> &[CohortSummary] {
        &self.summaries
    }

    /// Alive-count paths, one per cohort
    pub fn survival_curves(&self) -> Vec<&AlivePath> {
        self.cohorts.iter().map(|c| c.alive()).collect()
    }

    fn defined(&self, pick: impl Fn(&CohortSummary) -> Option<f64>) -> Vec<f64> {
        self.summaries.iter().filter_map(pick).collect()
    }

    /// Cohort mean survival times (cohorts without deaths omitted)
    pub fn mean_survival_times(&self) -> Vec<f64> {
        self.defined(|s| s.mean_survival_time)
    }

    pub fn mean_milestone_times(&self) -> Vec<f64> {
        self.defined(|s| s.mean_time_to_milestone)
    }

    pub fn mean_costs(&self) -> Vec<f64> {
        self.defined(|s| s.mean_cost)
    }

    pub fn mean_utilities(&self) -> Vec<f64> {
        self.defined(|s| s.mean_utility)
    }

    pub fn stat_mean_survival_time(&self) -> Result<SummaryStat, StatsError> {
        SummaryStat::new("Average survival time", &self.mean_survival_times())
    }

    pub fn stat_mean_milestone_time(&self) -> Result<SummaryStat, StatsError> {
        SummaryStat::new("Average time to milestone", &self.mean_milestone_times())
    }

    pub fn stat_mean_cost(&self) -> Result<SummaryStat, StatsError> {
        SummaryStat::new("Average cost", &self.mean_costs())
    }

    pub fn stat_mean_utility(&self) -> Result<SummaryStat, StatsError> {
        SummaryStat::new("Average utility", &self.mean_utilities())
    }

    fn cohort(&self, index: usize) -> Result<&CohortOutcomes, SimulationError> {
        self.cohorts
            .get(index)
            .ok_or(SimulationError::CohortOutOfRange(index))
    }

    /// t confidence intervals of one cohort's mean survival and milestone times
    pub fn cohort_confidence_intervals(
        &self,
        index: usize,
        alpha: f64,
    ) -> Result<CohortIntervals, SimulationError> {
        let cohort = self.cohort(index)?;
        Ok(CohortIntervals {
            survival: cohort.survival_stat()?.confidence_interval(alpha)?,
            milestone: cohort.milestone_stat()?.confidence_interval(alpha)?,
        })
    }

    /// Percentile prediction intervals of one cohort's survival and milestone times
    pub fn cohort_prediction_intervals(
        &self,
        index: usize,
        alpha: f64,
    ) -> Result<CohortIntervals, SimulationError> {
        let cohort = self.cohort(index)?;
        Ok(CohortIntervals {
            survival: cohort.survival_stat()?.percentile_interval(alpha)?,
            milestone: cohort.milestone_stat()?.percentile_interval(alpha)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StateSpace, TransitionCounts};
    use crate::rng::HashedSeeds;

    fn params() -> ParameterSet {
        let space = StateSpace::new(
            vec!["WELL".into(), "SICK".into(), "DEAD".into()],
            "SICK",
        )
        .unwrap();
        let matrix = TransitionCounts::new(vec![vec![5, 4, 1], vec![0, 6, 4], vec![0, 0, 1]])
            .unwrap()
            .normalize()
            .unwrap();
        let start = space.require("WELL").unwrap();
        ParameterSet::new(space, start, matrix).unwrap()
    }

    #[test]
    fn test_requires_cohorts() {
        let err = MultiCohort::new(vec![], 10, params()).err().unwrap();
        assert!(matches!(err, SimulationError::NoCohorts));
    }

    #[test]
    fn test_fixed_parameters_cohorts_differ_by_seed() {
        let multi = MultiCohort::new((0..5).collect(), 200, params()).unwrap();
        let outcomes = multi.simulate(40, &HashedSeeds::default()).unwrap();

        assert_eq!(outcomes.num_cohorts(), 5);
        let means = outcomes.mean_survival_times();
        assert_eq!(means.len(), 5);
        assert!(means.windows(2).any(|w| w[0] != w[1]));

        let stat = outcomes.stat_mean_survival_time().unwrap();
        let pi = stat.percentile_interval(0.05).unwrap();
        assert!(pi.lower <= stat.mean() && stat.mean() <= pi.upper);
    }

    #[test]
    fn test_cohort_intervals() {
        let multi = MultiCohort::new(vec![10, 11], 300, params()).unwrap();
        let outcomes = multi.simulate(40, &HashedSeeds::default()).unwrap();

        let ci = outcomes.cohort_confidence_intervals(0, 0.05).unwrap();
        let pi = outcomes.cohort_prediction_intervals(0, 0.05).unwrap();
        assert!(pi.survival.width() > ci.survival.width());
        assert!(matches!(
            outcomes.cohort_confidence_intervals(2, 0.05),
            Err(SimulationError::CohortOutOfRange(2))
        ));
    }

    #[test]
    fn test_no_economics_means_no_cost_stats() {
        let multi = MultiCohort::new(vec![0], 20, params()).unwrap();
        let outcomes = multi.simulate(10, &HashedSeeds::default()).unwrap();
        assert!(outcomes.mean_costs().is_empty());
        assert!(outcomes.stat_mean_cost().is_err());
    }
}
