//! PSA Tests - Parameter Resampling
//!
//! Critical invariants tested:
//! - Every resampled matrix is row-stochastic with the absorbing row intact
//! - Structural zeros of the count matrix stay zero in every draw
//! - Draw means converge to the point estimates
//! - Multi-cohort runs with a generator draw distinct parameters per cohort

use markov_cohort_core_rs::models::ROW_SUM_TOLERANCE;
use markov_cohort_core_rs::rng::HashedSeeds;
use markov_cohort_core_rs::{
    ModelConfig, MultiCohort, ParameterGenerator, PsaConfig, PsaInputs, StateSpace,
    TherapyEffect, TransitionCounts,
};

// ============================================================================
// Test Helpers
// ============================================================================

const COUNTS: [[u64; 5]; 5] = [
    [70, 28, 0, 0, 3],
    [0, 62, 32, 2, 3],
    [0, 0, 62, 24, 8],
    [0, 0, 0, 100, 22],
    [0, 0, 0, 0, 1],
];

fn inputs(relative_risk: Option<f64>) -> PsaInputs {
    let states = StateSpace::new(
        ["PREDEM", "MILD", "MODERATE", "SEVERE", "ADJ_DEATH"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        "SEVERE",
    )
    .unwrap();
    let initial_state = states.require("PREDEM").unwrap();
    let effect = relative_risk.map(|rr| TherapyEffect {
        treatable_states: states.alive_states().take(3).collect(),
        relative_risk: rr,
    });

    PsaInputs {
        initial_state,
        counts: TransitionCounts::new(COUNTS.iter().map(|r| r.to_vec()).collect()).unwrap(),
        state_costs: vec![3875.0, 3875.0, 25000.0, 25000.0, 0.0],
        state_utilities: vec![0.83, 0.78, 0.69, 0.27, 0.0],
        treatment_cost: 28000.0,
        discount_rate: 0.015,
        effect,
        psa: PsaConfig::default(),
        states,
    }
}

// ============================================================================
// Matrix invariants
// ============================================================================

#[test]
fn test_resampled_rows_stay_stochastic() {
    for rr in [None, Some(0.3)] {
        let generator = ParameterGenerator::new(inputs(rr)).unwrap();
        for seed in 0..200 {
            let params = generator.generate(seed).unwrap();
            let rows = params.transition().rows();
            for (r, row) in rows.iter().enumerate() {
                let sum: f64 = row.iter().sum();
                assert!((sum - 1.0).abs() <= ROW_SUM_TOLERANCE, "seed {} row {}", seed, r);
                for (c, &p) in row.iter().enumerate() {
                    if COUNTS[r][c] == 0 {
                        assert_eq!(p, 0.0, "structural zero ({}, {}) drawn", r, c);
                    }
                }
            }
            assert_eq!(rows[4], vec![0.0, 0.0, 0.0, 0.0, 1.0]);
        }
    }
}

#[test]
fn test_rows_vary_between_draws() {
    let generator = ParameterGenerator::new(inputs(None)).unwrap();
    let a = generator.generate(1).unwrap();
    let b = generator.generate(2).unwrap();
    assert_ne!(a.transition().rows()[0], b.transition().rows()[0]);
}

// ============================================================================
// Distribution moments
// ============================================================================

#[test]
fn test_draw_means_near_point_estimates() {
    let generator = ParameterGenerator::new(inputs(None)).unwrap();
    let n = 4000;
    let mut p_stay = 0.0;
    let mut cost = 0.0;
    let mut utility = 0.0;
    let mut treatment = 0.0;
    for seed in 0..n {
        let params = generator.generate(seed).unwrap();
        let econ = params.economics().unwrap();
        p_stay += params.transition().rows()[0][0];
        cost += econ.state_costs()[2];
        utility += econ.state_utilities()[0];
        treatment += econ.treatment_cost();
    }
    let n = n as f64;

    assert!((p_stay / n - 70.0 / 101.0).abs() < 0.01);
    assert!((cost / n - 25000.0).abs() / 25000.0 < 0.02);
    assert!((utility / n - 0.83).abs() < 0.015);
    assert!((treatment / n - 28000.0).abs() / 28000.0 < 0.02);
}

#[test]
fn test_utilities_stay_in_unit_interval() {
    let generator = ParameterGenerator::new(inputs(None)).unwrap();
    for seed in 0..500 {
        let params = generator.generate(seed).unwrap();
        let econ = params.economics().unwrap();
        assert!(econ.state_utilities().iter().all(|u| (0.0..=1.0).contains(u)));
        assert!(econ.state_costs().iter().all(|&c| c >= 0.0));
        assert_eq!(econ.discount_rate(), 0.015);
    }
}

// ============================================================================
// Multi-cohort with resampling
// ============================================================================

#[test]
fn test_multi_cohort_resamples_per_cohort() {
    let generator = ParameterGenerator::new(inputs(Some(0.3))).unwrap();
    let multi = MultiCohort::new((0..6).collect(), 150, generator).unwrap();
    let outcomes = multi.simulate(40, &HashedSeeds::default()).unwrap();

    assert_eq!(outcomes.num_cohorts(), 6);
    let costs = outcomes.mean_costs();
    assert_eq!(costs.len(), 6);
    assert!(costs.windows(2).all(|w| w[0] != w[1]));

    let stat = outcomes.stat_mean_utility().unwrap();
    let pi = stat.percentile_interval(0.05).unwrap();
    assert!(pi.lower < pi.upper);
}

#[test]
fn test_config_generator_matches_direct_construction() {
    let json = r#"{
        "states": ["PREDEM", "MILD", "MODERATE", "SEVERE", "ADJ_DEATH"],
        "initial_state": "PREDEM",
        "milestone_state": "SEVERE",
        "transition_counts": [
            [70, 28, 0, 0, 3],
            [0, 62, 32, 2, 3],
            [0, 0, 62, 24, 8],
            [0, 0, 0, 100, 22],
            [0, 0, 0, 0, 1]
        ],
        "state_costs": [3875.0, 3875.0, 25000.0, 25000.0, 0.0],
        "state_utilities": [0.83, 0.78, 0.69, 0.27, 0.0],
        "annual_discount_rate": 0.03,
        "cycles_per_year": 2,
        "horizon": 20,
        "population_size": 50,
        "num_cohorts": 2,
        "therapies": [{
            "name": "DMT_30",
            "treatment_cost": 28000.0,
            "relative_risk": 0.3,
            "treatable_states": ["PREDEM", "MILD", "MODERATE"]
        }]
    }"#;
    let config = ModelConfig::from_json_str(json).unwrap();
    let from_config = config
        .parameter_generator(config.therapy("DMT_30").unwrap())
        .unwrap();
    let direct = ParameterGenerator::new(inputs(Some(0.3))).unwrap();

    for seed in [0, 5, 99] {
        assert_eq!(from_config.generate(seed).unwrap(), direct.generate(seed).unwrap());
    }
}
