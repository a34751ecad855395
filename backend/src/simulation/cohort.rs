//! Cohort aggregator
//!
//! Runs `population_size` independent patients under one parameter set and
//! folds their outcomes into a [`CohortOutcomes`]. Patient `i` of cohort `id`
//! is seeded with `seeds.patient_seed(id, i)`.

use crate::models::parameters::ParameterSet;
use crate::rng::SeedDerivation;
use crate::simulation::patient::{Patient, PatientRecord};
use crate::simulation::SimulationError;
use crate::stats::{AlivePath, StatsError, SummaryStat};
use tracing::debug;

/// A cohort of patients sharing one parameter set
#[derive(Debug, Clone)]
pub struct Cohort {
    id: u64,
    population_size: usize,
    parameters: ParameterSet,
}

impl Cohort {
    pub fn new(
        id: u64,
        population_size: usize,
        parameters: ParameterSet,
    ) -> Result<Self, SimulationError> {
        if population_size == 0 {
            return Err(SimulationError::InvalidPopulation(population_size));
        }
        Ok(Self {
            id,
            population_size,
            parameters,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Simulate every patient for at most `horizon` cycles
    pub fn simulate(
        &self,
        horizon: usize,
        seeds: &dyn SeedDerivation,
    ) -> Result<CohortOutcomes, SimulationError> {
        if horizon == 0 {
            return Err(SimulationError::InvalidHorizon);
        }

        let mut accumulator = OutcomeAccumulator::new(
            self.population_size,
            self.parameters.economics().is_some(),
        );
        for index in 0..self.population_size {
            let seed = seeds.patient_seed(self.id, index);
            let record = Patient::new(seed, &self.parameters).simulate(horizon);
            accumulator.extract(&record);
        }

        let outcomes = accumulator.finish(self.id, self.population_size);
        debug!(
            cohort_id = self.id,
            population = self.population_size,
            deaths = outcomes.survival_times.len(),
            milestones = outcomes.milestone_times.len(),
            "cohort simulated"
        );
        Ok(outcomes)
    }
}

/// Running collections filled one patient at a time
struct OutcomeAccumulator {
    track_economics: bool,
    survival_times: Vec<f64>,
    milestone_times: Vec<f64>,
    costs: Vec<f64>,
    utilities: Vec<f64>,
}

impl OutcomeAccumulator {
    fn new(capacity: usize, track_economics: bool) -> Self {
        let econ_capacity = if track_economics { capacity } else { 0 };
        Self {
            track_economics,
            survival_times: Vec::with_capacity(capacity),
            milestone_times: Vec::with_capacity(capacity),
            costs: Vec::with_capacity(econ_capacity),
            utilities: Vec::with_capacity(econ_capacity),
        }
    }

    fn extract(&mut self, record: &PatientRecord) {
        if let Some(t) = record.survival_time() {
            self.survival_times.push(t);
        }
        if let Some(t) = record.time_to_milestone() {
            self.milestone_times.push(t);
        }
        if self.track_economics {
            self.costs.push(record.discounted_cost());
            self.utilities.push(record.discounted_utility());
        }
    }

    fn finish(self, cohort_id: u64, population_size: usize) -> CohortOutcomes {
        let alive = AlivePath::new(population_size, &self.survival_times);
        CohortOutcomes {
            cohort_id,
            population_size,
            survival_times: self.survival_times,
            milestone_times: self.milestone_times,
            costs: self.costs,
            utilities: self.utilities,
            alive,
        }
    }
}

/// Outcomes of one simulated cohort (read-only)
///
/// Sequences are in patient order. Statistics are computed on request.
#[derive(Debug, Clone)]
pub struct CohortOutcomes {
    cohort_id: u64,
    population_size: usize,
    survival_times: Vec<f64>,
    milestone_times: Vec<f64>,
    costs: Vec<f64>,
    utilities: Vec<f64>,
    alive: AlivePath,
}

impl CohortOutcomes {
    pub fn cohort_id(&self) -> u64 {
        self.cohort_id
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Survival times of patients who died within the horizon
    pub fn survival_times(&self) -> &[f64] {
        &self.survival_times
    }

    /// Times to milestone of patients who reached it within the horizon
    pub fn milestone_times(&self) -> &[f64] {
        &self.milestone_times
    }

    /// Discounted cost per patient (empty without economic inputs)
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    /// Discounted utility per patient (empty without economic inputs)
    pub fn utilities(&self) -> &[f64] {
        &self.utilities
    }

    pub fn alive(&self) -> &AlivePath {
        &self.alive
    }

    pub fn deaths(&self) -> usize {
        self.survival_times.len()
    }

    pub fn survival_stat(&self) -> Result<SummaryStat, StatsError> {
        SummaryStat::new("Survival time", &self.survival_times)
    }

    pub fn milestone_stat(&self) -> Result<SummaryStat, StatsError> {
        SummaryStat::new("Time to milestone", &self.milestone_times)
    }

    pub fn cost_stat(&self) -> Result<SummaryStat, StatsError> {
        SummaryStat::new("Discounted cost", &self.costs)
    }

    pub fn utility_stat(&self) -> Result<SummaryStat, StatsError> {
        SummaryStat::new("Discounted utility", &self.utilities)
    }
}
