//! Patient simulator
//!
//! Advances one patient through discrete cycles:
//!
//! ```text
//! For cycle k while alive and k < horizon:
//! 1. Sample next state from the current row (patient's own RNG stream)
//! 2. Entering the absorbing state → survival_time = k + 0.5
//! 3. First entry to the milestone → time_to_milestone = k + 0.5
//! 4. Accrue discounted cost/utility (if economics enabled); treatment
//!    stops once the milestone was reached in an earlier cycle
//! 5. Advance state
//! ```
//!
//! # Critical Invariants
//!
//! - `survival_time` is set exactly once, on entry to the absorbing state,
//!   and the patient is not simulated further
//! - `time_to_milestone` is set at most once and never overwritten
//! - Same seed + same parameters → identical trajectory and outcomes

use crate::core::accrual::{event_time, transition_accrual};
use crate::models::health_state::StateId;
use crate::models::parameters::ParameterSet;
use crate::rng::RngManager;

/// Transient per-patient state
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    current_state: StateId,
    cycles: usize,
    survival_time: Option<f64>,
    time_to_milestone: Option<f64>,
    discounted_cost: f64,
    discounted_utility: f64,
    /// States occupied at the end of each cycle, starting with the initial state
    trajectory: Vec<StateId>,
}

impl PatientRecord {
    pub fn new(initial_state: StateId) -> Self {
        Self {
            current_state: initial_state,
            cycles: 0,
            survival_time: None,
            time_to_milestone: None,
            discounted_cost: 0.0,
            discounted_utility: 0.0,
            trajectory: vec![initial_state],
        }
    }

    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    /// Number of cycles simulated
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn survival_time(&self) -> Option<f64> {
        self.survival_time
    }

    pub fn time_to_milestone(&self) -> Option<f64> {
        self.time_to_milestone
    }

    pub fn discounted_cost(&self) -> f64 {
        self.discounted_cost
    }

    pub fn discounted_utility(&self) -> f64 {
        self.discounted_utility
    }

    pub fn trajectory(&self) -> &[StateId] {
        &self.trajectory
    }

    pub fn is_alive(&self) -> bool {
        self.survival_time.is_none()
    }

    /// Apply the transition sampled in `cycle`
    fn record_transition(&mut self, cycle: usize, next: StateId, params: &ParameterSet) {
        let states = params.states();
        let milestone_reached = self.time_to_milestone.is_some();

        if states.is_absorbing(next) && self.survival_time.is_none() {
            self.survival_time = Some(event_time(cycle));
        }
        if next == states.milestone() && self.time_to_milestone.is_none() {
            self.time_to_milestone = Some(event_time(cycle));
        }

        if let Some(accrual) =
            transition_accrual(self.current_state, next, cycle, milestone_reached, params)
        {
            self.discounted_cost += accrual.cost;
            self.discounted_utility += accrual.utility;
        }

        self.current_state = next;
        self.cycles = cycle + 1;
        self.trajectory.push(next);
    }
}

/// One simulated patient bound to a parameter set and its own RNG stream
pub struct Patient<'a> {
    seed: u64,
    params: &'a ParameterSet,
}

impl<'a> Patient<'a> {
    /// Create a patient whose randomness comes only from `seed`
    pub fn new(seed: u64, params: &'a ParameterSet) -> Self {
        Self { seed, params }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulate until death or until `horizon` cycles have elapsed
    pub fn simulate(&self, horizon: usize) -> PatientRecord {
        let mut rng = RngManager::new(self.seed);
        let matrix = self.params.transition();
        let mut record = PatientRecord::new(self.params.initial_state());

        let mut cycle = 0;
        while record.is_alive() && cycle < horizon {
            let next = matrix.sample_next(record.current_state(), &mut rng);
            record.record_transition(cycle, next, self.params);
            cycle += 1;
        }

        record
    }
}
