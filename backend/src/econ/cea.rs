//! Cost-effectiveness analysis (CEA)
//!
//! Strategies are compared on mean cost and mean effect. The frontier is
//! built in two passes over the strategies sorted by effect:
//!
//! 1. **strict dominance**: drop any strategy for which another costs no more
//!    and is at least as effective (one of the two strictly)
//! 2. **extended dominance**: among the rest, repeatedly drop a strategy
//!    whose ICER against its lower neighbour exceeds the ICER of its upper
//!    neighbour against it (a mix of the two neighbours does better)
//!
//! The remaining strategies have increasing ICERs along the frontier.

use crate::econ::icer::{bootstrap_ratio_interval, Icer};
use crate::econ::{comparator_index, validate_strategies, EconError, Strategy};
use crate::stats::{DifferenceStat, Interval};
use serde::{Deserialize, Serialize};

/// How a strategy relates to the cost-effectiveness frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dominance {
    /// On the frontier
    None,
    /// Another strategy is cheaper and at least as effective
    Strict,
    /// A mix of two frontier strategies is cheaper and at least as effective
    Extended,
}

/// One strategy's position relative to the frontier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierEntry {
    pub name: String,
    pub mean_cost: f64,
    pub mean_effect: f64,
    pub dominance: Dominance,
    pub on_frontier: bool,
    /// ICER against the previous frontier strategy; `None` off the frontier
    /// and for the least effective frontier strategy
    pub icer: Option<Icer>,
}

/// Increments of one strategy over the reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncrementalOutcome {
    pub name: String,
    pub delta_cost: f64,
    pub delta_cost_interval: Interval,
    pub delta_effect: f64,
    pub delta_effect_interval: Interval,
    pub icer: Icer,
}

/// Cost-effectiveness comparison of two or more strategies
///
/// # Example
/// ```
/// use markov_cohort_core_rs::econ::{CostEffectivenessAnalysis, Icer, Strategy};
///
/// let soc = Strategy::new("SOC", vec![1000.0, 1100.0], vec![5.0, 5.5]).unwrap();
/// let dmt = Strategy::new("DMT", vec![3000.0, 3100.0], vec![6.0, 6.5]).unwrap();
/// let cea = CostEffectivenessAnalysis::new(vec![soc, dmt], true).unwrap();
///
/// assert_eq!(cea.icer(1).unwrap(), Icer::Ratio(2000.0));
/// assert!(cea.frontier().iter().all(|e| e.on_frontier));
/// ```
#[derive(Debug, Clone)]
pub struct CostEffectivenessAnalysis {
    strategies: Vec<Strategy>,
    paired: bool,
}

impl CostEffectivenessAnalysis {
    /// The first strategy is the reference. With `paired`, every strategy
    /// must have as many observations as the reference.
    pub fn new(strategies: Vec<Strategy>, paired: bool) -> Result<Self, EconError> {
        validate_strategies(&strategies, paired)?;
        Ok(Self { strategies, paired })
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn reference(&self) -> &Strategy {
        &self.strategies[0]
    }

    pub fn is_paired(&self) -> bool {
        self.paired
    }

    fn difference(&self, name: &str, x: &[f64], y_ref: &[f64]) -> Result<DifferenceStat, EconError> {
        let stat = if self.paired {
            DifferenceStat::paired(name, x, y_ref)?
        } else {
            DifferenceStat::independent(name, x, y_ref)?
        };
        Ok(stat)
    }

    /// ICER of strategy `index` against the reference
    pub fn icer(&self, index: usize) -> Result<Icer, EconError> {
        let index = comparator_index(&self.strategies, index)?;
        let (s, r) = (&self.strategies[index], self.reference());
        Ok(Icer::from_increments(
            s.mean_cost() - r.mean_cost(),
            s.mean_effect() - r.mean_effect(),
        ))
    }

    /// Increments and t confidence intervals of every non-reference strategy
    pub fn incremental_outcomes(&self, alpha: f64) -> Result<Vec<IncrementalOutcome>, EconError> {
        let reference = self.reference();
        (1..self.strategies.len())
            .map(|index| {
                let s = &self.strategies[index];
                let cost = self.difference(
                    &format!("Incremental cost of {}", s.name()),
                    s.costs(),
                    reference.costs(),
                )?;
                let effect = self.difference(
                    &format!("Incremental effect of {}", s.name()),
                    s.effects(),
                    reference.effects(),
                )?;
                Ok(IncrementalOutcome {
                    name: s.name().to_string(),
                    delta_cost: cost.mean(),
                    delta_cost_interval: cost.confidence_interval(alpha)?,
                    delta_effect: effect.mean(),
                    delta_effect_interval: effect.confidence_interval(alpha)?,
                    icer: self.icer(index)?,
                })
            })
            .collect()
    }

    /// Bootstrap percentile interval of the ICER of strategy `index`
    pub fn icer_interval(
        &self,
        index: usize,
        alpha: f64,
        n_bootstrap: usize,
        seed: u64,
    ) -> Result<Interval, EconError> {
        let index = comparator_index(&self.strategies, index)?;
        bootstrap_ratio_interval(
            &self.strategies[index],
            self.reference(),
            self.paired,
            alpha,
            n_bootstrap,
            seed,
        )
    }

    /// Frontier position of every strategy, in input order
    pub fn frontier(&self) -> Vec<FrontierEntry> {
        let points: Vec<(f64, f64)> = self
            .strategies
            .iter()
            .map(|s| (s.mean_cost(), s.mean_effect()))
            .collect();
        let dominance = classify(&points);

        // Frontier strategies in order of increasing effect
        let mut frontier: Vec<usize> = (0..points.len())
            .filter(|&i| dominance[i] == Dominance::None)
            .collect();
        frontier.sort_by(|&a, &b| by_effect_then_cost(points[a], points[b]).then(a.cmp(&b)));

        let mut icers: Vec<Option<Icer>> = vec![None; points.len()];
        for pair in frontier.windows(2) {
            let (lo, hi) = (points[pair[0]], points[pair[1]]);
            icers[pair[1]] = Some(Icer::from_increments(hi.0 - lo.0, hi.1 - lo.1));
        }

        self.strategies
            .iter()
            .zip(points)
            .zip(dominance)
            .zip(icers)
            .map(|(((s, (cost, effect)), dominance), icer)| FrontierEntry {
                name: s.name().to_string(),
                mean_cost: cost,
                mean_effect: effect,
                dominance,
                on_frontier: dominance == Dominance::None,
                icer,
            })
            .collect()
    }
}

fn by_effect_then_cost(a: (f64, f64), b: (f64, f64)) -> std::cmp::Ordering {
    a.1.total_cmp(&b.1).then(a.0.total_cmp(&b.0))
}

/// Dominance of each `(cost, effect)` point
///
/// Strategies with identical means share one point and one classification.
fn classify(points: &[(f64, f64)]) -> Vec<Dominance> {
    let mut dominance = vec![Dominance::None; points.len()];

    for (i, &(ci, ei)) in points.iter().enumerate() {
        let strictly = points
            .iter()
            .any(|&(cj, ej)| cj <= ci && ej >= ei && (cj < ci || ej > ei));
        if strictly {
            dominance[i] = Dominance::Strict;
        }
    }

    // Distinct surviving points, sorted by effect (and therefore by cost)
    let mut hull: Vec<(f64, f64)> = points
        .iter()
        .zip(&dominance)
        .filter(|(_, d)| **d == Dominance::None)
        .map(|(p, _)| *p)
        .collect();
    hull.sort_by(|a, b| by_effect_then_cost(*a, *b));
    hull.dedup();

    let mut extended = Vec::new();
    loop {
        let position = hull.windows(3).position(|w| {
            let left = (w[1].0 - w[0].0) / (w[1].1 - w[0].1);
            let right = (w[2].0 - w[1].0) / (w[2].1 - w[1].1);
            left > right
        });
        match position {
            Some(p) => extended.push(hull.remove(p + 1)),
            None => break,
        }
    }

    for (i, point) in points.iter().enumerate() {
        if extended.contains(point) {
            dominance[i] = Dominance::Extended;
        }
    }
    dominance
}
