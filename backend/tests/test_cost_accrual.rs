//! Cost Accrual Tests - Discounting and Half-Cycle Averaging
//!
//! Critical invariants tested:
//! - A patient's discounted totals equal the sum of per-cycle accruals
//! - Costs of a cycle average the pre- and post-transition states
//! - Treatment cost stops once the milestone is reached, even after the
//!   patient moves on to a later alive state
//! - Death before the milestone is charged a full cycle of treatment
//! - Discounting compounds over cycle + 1 periods

use approx::assert_relative_eq;
use markov_cohort_core_rs::core::{present_value, transition_accrual};
use markov_cohort_core_rs::{EconomicInputs, ParameterSet, Patient, StateSpace, TransitionMatrix};

// ============================================================================
// Test Helpers
// ============================================================================

fn states() -> StateSpace {
    StateSpace::new(
        ["WELL", "SICK", "LATE", "DEAD"].iter().map(|s| s.to_string()).collect(),
        "SICK",
    )
    .unwrap()
}

fn with_rows(rows: Vec<Vec<f64>>, treatment_cost: f64, rate: f64) -> ParameterSet {
    let states = states();
    let econ = EconomicInputs::new(
        vec![1000.0, 5000.0, 8000.0, 0.0],
        vec![0.9, 0.5, 0.3, 0.0],
        treatment_cost,
        rate,
    )
    .unwrap();
    let start = states.require("WELL").unwrap();
    ParameterSet::new(states, start, TransitionMatrix::from_rows(rows).unwrap())
        .unwrap()
        .with_economics(econ)
        .unwrap()
}

/// WELL → SICK → LATE → DEAD, one step per cycle; SICK is the milestone
fn chain(treatment_cost: f64, rate: f64) -> ParameterSet {
    with_rows(
        vec![
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
            vec![0.0, 0.0, 0.0, 1.0],
        ],
        treatment_cost,
        rate,
    )
}

/// WELL → DEAD in the first cycle, before the milestone
fn early_death(treatment_cost: f64) -> ParameterSet {
    with_rows(
        vec![
            vec![0.0, 0.0, 0.0, 1.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
        ],
        treatment_cost,
        0.0,
    )
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_undiscounted_chain_totals() {
    let record = Patient::new(1, &chain(0.0, 0.0)).simulate(10);
    // WELL→SICK 3000, SICK→LATE 6500, LATE→DEAD 4000
    assert_relative_eq!(record.discounted_cost(), 13_500.0, max_relative = 1e-12);
    assert_relative_eq!(record.discounted_utility(), 0.7 + 0.4 + 0.15, max_relative = 1e-12);
}

#[test]
fn test_treatment_halved_then_stopped() {
    let with = Patient::new(1, &chain(400.0, 0.0)).simulate(10);
    let without = Patient::new(1, &chain(0.0, 0.0)).simulate(10);
    // half a cycle of treatment on the way into SICK, none in LATE afterwards
    assert_relative_eq!(
        with.discounted_cost() - without.discounted_cost(),
        200.0,
        max_relative = 1e-12
    );
}

#[test]
fn test_death_before_milestone_charges_full_cycle() {
    let record = Patient::new(1, &early_death(400.0)).simulate(10);
    assert_eq!(record.survival_time(), Some(0.5));
    assert_eq!(record.time_to_milestone(), None);
    assert_relative_eq!(record.discounted_cost(), 500.0 + 400.0, max_relative = 1e-12);
}

#[test]
fn test_discounted_chain_totals() {
    let rate = 0.015;
    let record = Patient::new(1, &chain(400.0, rate)).simulate(10);
    let expected = present_value(3000.0 + 200.0, rate, 1)
        + present_value(6500.0, rate, 2)
        + present_value(4000.0, rate, 3);
    assert_relative_eq!(record.discounted_cost(), expected, max_relative = 1e-12);

    let expected_utility =
        present_value(0.7, rate, 1) + present_value(0.4, rate, 2) + present_value(0.15, rate, 3);
    assert_relative_eq!(record.discounted_utility(), expected_utility, max_relative = 1e-12);
}

#[test]
fn test_totals_equal_sum_of_accruals() {
    let params = chain(400.0, 0.03);
    let record = Patient::new(77, &params).simulate(10);
    let milestone = params.states().milestone();

    let trajectory = record.trajectory();
    let (mut cost, mut utility) = (0.0, 0.0);
    for (cycle, pair) in trajectory.windows(2).enumerate() {
        let reached = trajectory[1..=cycle].contains(&milestone);
        let accrual = transition_accrual(pair[0], pair[1], cycle, reached, &params).unwrap();
        cost += accrual.cost;
        utility += accrual.utility;
    }
    assert_relative_eq!(record.discounted_cost(), cost, max_relative = 1e-12);
    assert_relative_eq!(record.discounted_utility(), utility, max_relative = 1e-12);
}

#[test]
fn test_discounting_reduces_totals() {
    let plain = Patient::new(3, &chain(400.0, 0.0)).simulate(10);
    let discounted = Patient::new(3, &chain(400.0, 0.05)).simulate(10);
    assert!(discounted.discounted_cost() < plain.discounted_cost());
    assert!(discounted.discounted_utility() < plain.discounted_utility());
}
