//! Population-alive trajectory
//!
//! A right-continuous step function over simulation time: starts at the
//! initial population size and drops by one at each recorded death time.

use serde::{Deserialize, Serialize};

/// Number of living patients over time
///
/// # Example
/// ```
/// use markov_cohort_core_rs::stats::AlivePath;
///
/// let path = AlivePath::new(3, &[2.5, 0.5]);
/// assert_eq!(path.count_at(0.0), 3);
/// assert_eq!(path.count_at(0.5), 2);
/// assert_eq!(path.count_at(2.5), 1);
/// assert_eq!(path.final_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlivePath {
    initial_size: usize,
    /// Death times, ascending
    death_times: Vec<f64>,
}

impl AlivePath {
    pub fn new(initial_size: usize, death_times: &[f64]) -> Self {
        let mut death_times = death_times.to_vec();
        death_times.sort_by(|a, b| a.total_cmp(b));
        Self {
            initial_size,
            death_times,
        }
    }

    pub fn initial_size(&self) -> usize {
        self.initial_size
    }

    /// Living patients at time `t` (deaths at exactly `t` already counted)
    pub fn count_at(&self, t: f64) -> usize {
        let dead = self.death_times.partition_point(|&d| d <= t);
        self.initial_size.saturating_sub(dead)
    }

    /// Living patients after the last recorded death
    pub fn final_count(&self) -> usize {
        self.initial_size.saturating_sub(self.death_times.len())
    }

    /// Step points `(time, count)` starting at `(0, initial_size)`; deaths at
    /// the same time collapse into one step.
    pub fn steps(&self) -> Vec<(f64, usize)> {
        let mut steps = vec![(0.0, self.initial_size)];
        let mut alive = self.initial_size;
        for &t in &self.death_times {
            alive = alive.saturating_sub(1);
            match steps.last_mut() {
                Some(last) if last.0 == t => last.1 = alive,
                _ => steps.push((t, alive)),
            }
        }
        steps
    }
}
