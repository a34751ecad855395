//! Per-transition accrual
//!
//! The cost and utility of one cycle are a pure function of the state before
//! the transition, the state after it, the cycle index, whether the milestone
//! was reached earlier, and the parameter set.
//! Nothing here holds running totals; the patient simulator sums the returned
//! [`CycleAccrual`] values.
//!
//! # Conventions
//!
//! - Events detected at the end of cycle `k` happen at `k + 0.5`
//!   (half-cycle correction).
//! - Cycle `k` is discounted over `k + 1` periods at the per-cycle rate.
//! - State cost/utility of a cycle is the average of the pre- and
//!   post-transition states.
//! - Treatment is charged in full while the patient is on it, half on the
//!   cycle the patient first reaches the milestone, and not at all once the
//!   milestone has been reached (treatment discontinued).

use crate::models::health_state::StateId;
use crate::models::parameters::ParameterSet;

/// Time of an event detected during cycle `cycle`, half-cycle corrected
///
/// # Example
/// ```
/// use markov_cohort_core_rs::core::event_time;
///
/// assert_eq!(event_time(0), 0.5);
/// assert_eq!(event_time(4), 4.5);
/// ```
pub fn event_time(cycle: usize) -> f64 {
    cycle as f64 + 0.5
}

/// Present value of a single payment made after `periods` discount periods
///
/// # Example
/// ```
/// use markov_cohort_core_rs::core::present_value;
///
/// let pv = present_value(100.0, 0.10, 2);
/// assert!((pv - 100.0 / 1.21).abs() < 1e-9);
/// assert_eq!(present_value(100.0, 0.0, 7), 100.0);
/// ```
pub fn present_value(payment: f64, rate: f64, periods: u32) -> f64 {
    payment / (1.0 + rate).powi(periods as i32)
}

/// Discounted cost and utility accrued over one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CycleAccrual {
    pub cost: f64,
    pub utility: f64,
}

impl CycleAccrual {
    /// Undiscounted amounts for the transition `from` → `to`
    fn undiscounted(
        from: StateId,
        to: StateId,
        milestone_reached: bool,
        params: &ParameterSet,
    ) -> Option<Self> {
        let econ = params.economics()?;

        let state_cost = 0.5 * (econ.state_cost(from) + econ.state_cost(to));
        let utility = 0.5 * (econ.state_utility(from) + econ.state_utility(to));

        let milestone = params.states().milestone();
        let treatment_share = if milestone_reached || from == milestone {
            0.0
        } else if to == milestone {
            0.5
        } else {
            1.0
        };

        Some(Self {
            cost: state_cost + treatment_share * econ.treatment_cost(),
            utility,
        })
    }
}

/// Discounted (cost, utility) of the transition `from` → `to` in cycle `cycle`
///
/// `milestone_reached` tells whether the patient entered the milestone state
/// in an earlier cycle; treatment is no longer charged from then on, nor for
/// a cycle that starts in the milestone state.
/// Returns `None` when the parameter set carries no economic inputs.
pub fn transition_accrual(
    from: StateId,
    to: StateId,
    cycle: usize,
    milestone_reached: bool,
    params: &ParameterSet,
) -> Option<CycleAccrual> {
    let raw = CycleAccrual::undiscounted(from, to, milestone_reached, params)?;
    let rate = params.economics()?.discount_rate();
    let periods = (cycle + 1) as u32;

    Some(CycleAccrual {
        cost: present_value(raw.cost, rate, periods),
        utility: present_value(raw.utility, rate, periods),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EconomicInputs, StateSpace, TransitionCounts};

    /// WELL → SEVERE → LATE → DEAD; SEVERE is the milestone
    fn params(rate: f64) -> ParameterSet {
        let space = StateSpace::new(
            vec!["WELL".into(), "SEVERE".into(), "LATE".into(), "DEAD".into()],
            "SEVERE",
        )
        .unwrap();
        let start = space.require("WELL").unwrap();
        let matrix = TransitionCounts::new(vec![
            vec![2, 1, 0, 1],
            vec![0, 1, 1, 1],
            vec![0, 0, 1, 1],
            vec![0, 0, 0, 1],
        ])
        .unwrap()
        .normalize()
        .unwrap();
        let econ = EconomicInputs::new(
            vec![100.0, 300.0, 500.0, 0.0],
            vec![0.8, 0.4, 0.2, 0.0],
            50.0,
            rate,
        )
        .unwrap();
        ParameterSet::new(space, start, matrix)
            .unwrap()
            .with_economics(econ)
            .unwrap()
    }

    fn ids(p: &ParameterSet) -> (StateId, StateId, StateId, StateId) {
        let s = p.states();
        (
            s.require("WELL").unwrap(),
            s.require("SEVERE").unwrap(),
            s.require("LATE").unwrap(),
            s.require("DEAD").unwrap(),
        )
    }

    #[test]
    fn test_stay_charges_full_treatment() {
        let p = params(0.0);
        let (well, _, _, _) = ids(&p);
        let acc = transition_accrual(well, well, 0, false, &p).unwrap();
        assert_eq!(acc.cost, 150.0);
        assert_eq!(acc.utility, 0.8);
    }

    #[test]
    fn test_reaching_milestone_halves_treatment() {
        let p = params(0.0);
        let (well, severe, _, _) = ids(&p);
        let acc = transition_accrual(well, severe, 0, false, &p).unwrap();
        assert_eq!(acc.cost, 0.5 * (100.0 + 300.0) + 25.0);
        assert!((acc.utility - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_no_treatment_after_milestone() {
        let p = params(0.0);
        let (_, severe, late, dead) = ids(&p);
        assert_eq!(transition_accrual(severe, severe, 3, true, &p).unwrap().cost, 300.0);
        assert_eq!(transition_accrual(severe, late, 3, true, &p).unwrap().cost, 400.0);
        assert_eq!(transition_accrual(late, late, 4, true, &p).unwrap().cost, 500.0);
        assert_eq!(transition_accrual(late, dead, 5, true, &p).unwrap().cost, 250.0);
    }

    #[test]
    fn test_cycle_starting_in_milestone_is_untreated() {
        let p = params(0.0);
        let (_, severe, _, _) = ids(&p);
        assert_eq!(transition_accrual(severe, severe, 0, false, &p).unwrap().cost, 300.0);
    }

    #[test]
    fn test_death_before_milestone_charges_full_treatment() {
        let p = params(0.0);
        let (well, _, _, dead) = ids(&p);
        let acc = transition_accrual(well, dead, 0, false, &p).unwrap();
        assert_eq!(acc.cost, 50.0 + 50.0);
    }

    #[test]
    fn test_discounting_compounds_over_cycle_plus_one() {
        let p = params(0.015);
        let (well, _, _, _) = ids(&p);
        let acc = transition_accrual(well, well, 2, false, &p).unwrap();
        let factor = 1.015f64.powi(3);
        assert!((acc.cost - 150.0 / factor).abs() < 1e-9);
        assert!((acc.utility - 0.8 / factor).abs() < 1e-12);
    }

    #[test]
    fn test_no_economics_no_accrual() {
        let p = params(0.0);
        let bare = ParameterSet::new(p.states().clone(), p.initial_state(), p.transition().clone())
            .unwrap();
        let (well, _, _, _) = ids(&bare);
        assert!(transition_accrual(well, well, 0, false, &bare).is_none());
    }
}
