//! Economic Evaluation Tests - CEA and CBA
//!
//! Critical invariants tested:
//! - ICER sign convention: only more-costly/more-effective strategies get a
//!   plain ratio; a cost-saving, effect-losing strategy is never reported as
//!   cost-effective
//! - Zero incremental effect never produces NaN or infinity
//! - Frontier excludes strictly and extendedly dominated strategies
//! - Incremental NMB is linear in willingness-to-pay

use markov_cohort_core_rs::econ::{
    CostBenefitAnalysis, CostEffectivenessAnalysis, Dominance, EconError, Icer, Strategy,
};
use markov_cohort_core_rs::rng::HashedSeeds;
use markov_cohort_core_rs::ModelConfig;

// ============================================================================
// Test Helpers
// ============================================================================

fn point(name: &str, cost: f64, effect: f64) -> Strategy {
    Strategy::new(name, vec![cost, cost], vec![effect, effect]).unwrap()
}

fn noisy(name: &str, cost: f64, effect: f64, n: usize) -> Strategy {
    let costs = (0..n).map(|i| cost + ((i * 37) % 11) as f64 * 10.0 - 50.0).collect();
    let effects = (0..n).map(|i| effect + ((i * 13) % 7) as f64 * 0.01 - 0.03).collect();
    Strategy::new(name, costs, effects).unwrap()
}

// ============================================================================
// ICER
// ============================================================================

#[test]
fn test_icer_positive_when_costlier_and_better() {
    let cea = CostEffectivenessAnalysis::new(
        vec![point("SOC", 1000.0, 5.0), point("DMT", 4000.0, 5.5)],
        true,
    )
    .unwrap();
    match cea.icer(1).unwrap() {
        Icer::Ratio(r) => assert!((r - 6000.0).abs() < 1e-9),
        other => panic!("expected a ratio, got {:?}", other),
    }
}

#[test]
fn test_icer_costlier_and_not_better_is_dominated() {
    for effect in [4.5, 5.0] {
        let cea = CostEffectivenessAnalysis::new(
            vec![point("SOC", 1000.0, 5.0), point("DMT", 4000.0, effect)],
            true,
        )
        .unwrap();
        assert_eq!(cea.icer(1).unwrap(), Icer::Dominated);
    }
}

#[test]
fn test_icer_cost_saving_effect_losing_is_not_a_ratio() {
    let cea = CostEffectivenessAnalysis::new(
        vec![point("SOC", 1000.0, 5.0), point("CHEAP", 500.0, 4.0)],
        true,
    )
    .unwrap();
    let icer = cea.icer(1).unwrap();
    assert!(!matches!(icer, Icer::Ratio(_)));
    assert_eq!(icer, Icer::Tradeoff(500.0));
}

#[test]
fn test_identical_strategies_icer_undefined() {
    let cea = CostEffectivenessAnalysis::new(
        vec![point("SOC", 1000.0, 5.0), point("COPY", 1000.0, 5.0)],
        true,
    )
    .unwrap();
    assert_eq!(cea.icer(1).unwrap(), Icer::Undefined);
    let outcomes = cea.incremental_outcomes(0.05).unwrap();
    assert_eq!(outcomes[0].icer, Icer::Undefined);
    assert!(outcomes[0].delta_cost.is_finite());
}

#[test]
fn test_icer_interval_brackets_estimate() {
    let cea = CostEffectivenessAnalysis::new(
        vec![noisy("SOC", 1000.0, 5.0, 200), noisy("DMT", 3000.0, 6.0, 200)],
        false,
    )
    .unwrap();
    let estimate = cea.icer(1).unwrap().value().unwrap();
    let interval = cea.icer_interval(1, 0.05, 500, 42).unwrap();
    assert!(interval.contains(estimate));
    assert_eq!(interval, cea.icer_interval(1, 0.05, 500, 42).unwrap());
}

// ============================================================================
// Frontier
// ============================================================================

#[test]
fn test_frontier_membership() {
    let cea = CostEffectivenessAnalysis::new(
        vec![
            point("SOC", 0.0, 10.0),
            point("LOW", 1000.0, 10.4),
            point("MID", 2000.0, 11.0),
            point("BAD", 2500.0, 10.5),
            point("HIGH", 6000.0, 12.0),
        ],
        true,
    )
    .unwrap();
    let frontier = cea.frontier();
    let on: Vec<&str> = frontier
        .iter()
        .filter(|e| e.on_frontier)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(on, vec!["SOC", "MID", "HIGH"]);
    assert_eq!(frontier[1].dominance, Dominance::Extended);
    assert_eq!(frontier[3].dominance, Dominance::Strict);

    // ICERs increase along the frontier
    let icers: Vec<f64> = frontier
        .iter()
        .filter_map(|e| e.icer.and_then(|i| i.value()))
        .collect();
    assert_eq!(icers.len(), 2);
    assert!(icers[0] < icers[1]);
}

// ============================================================================
// CBA
// ============================================================================

#[test]
fn test_incremental_nmb_linear_in_wtp() {
    let cba = CostBenefitAnalysis::new(
        vec![noisy("SOC", 1000.0, 5.0, 60), noisy("DMT", 3000.0, 6.0, 60)],
        (0.0, 10_000.0),
        true,
    )
    .unwrap();
    let curve = cba.incremental_nmb_curve(1, 21, 0.05).unwrap();

    let slope = (curve[20].mean - curve[0].mean) / (curve[20].wtp - curve[0].wtp);
    for p in &curve {
        let linear = curve[0].mean + slope * (p.wtp - curve[0].wtp);
        assert!((p.mean - linear).abs() < 1e-6);
        assert!(p.interval.contains(p.mean));
    }
    assert!((slope - 1.0).abs() < 1e-9);
    assert!((curve[0].mean + 2000.0).abs() < 1e-9);
}

#[test]
fn test_best_strategy_switches_at_icer() {
    let cba = CostBenefitAnalysis::new(
        vec![point("SOC", 1000.0, 5.0), point("DMT", 3000.0, 6.0)],
        (0.0, 5000.0),
        true,
    )
    .unwrap();
    assert_eq!(cba.best_strategy(1999.0), 0);
    assert_eq!(cba.best_strategy(2001.0), 1);
}

#[test]
fn test_unpaired_counts_rejected_when_paired() {
    let err = CostBenefitAnalysis::new(
        vec![noisy("SOC", 1.0, 1.0, 10), noisy("DMT", 1.0, 1.0, 12)],
        (0.0, 1.0),
        true,
    )
    .unwrap_err();
    assert!(matches!(err, EconError::PairedCountMismatch { expected: 10, actual: 12, .. }));
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_simulated_strategies_compare() {
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
        "horizon": 40,
        "population_size": 300,
        "num_cohorts": 1,
        "therapies": [
            {"name": "SOC", "treatment_cost": 1020.0},
            {
                "name": "DMT_30",
                "treatment_cost": 28000.0,
                "relative_risk": 0.3,
                "treatable_states": ["PREDEM", "MILD", "MODERATE"]
            }
        ]
    }"#;
    let config = ModelConfig::from_json_str(json).unwrap();
    let seeds = HashedSeeds::default();

    let mut strategies = Vec::new();
    for therapy in &config.therapies {
        let params = config.parameter_set(therapy).unwrap();
        let outcomes = markov_cohort_core_rs::Cohort::new(0, config.population_size, params)
            .unwrap()
            .simulate(config.horizon, &seeds)
            .unwrap();
        strategies.push(
            Strategy::new(
                &therapy.name,
                outcomes.costs().to_vec(),
                outcomes.utilities().to_vec(),
            )
            .unwrap(),
        );
    }

    let cea = CostEffectivenessAnalysis::new(strategies, true).unwrap();
    let outcomes = cea.incremental_outcomes(config.alpha).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].delta_cost > 0.0);
    assert!(outcomes[0].delta_effect > 0.0);
    assert!(matches!(outcomes[0].icer, Icer::Ratio(r) if r > 0.0));
}
