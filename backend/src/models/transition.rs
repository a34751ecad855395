//! Transition matrices
//!
//! Raw transition counts are normalized into a row-stochastic probability
//! matrix; a therapy-adjusted matrix is derived from a baseline matrix and a
//! relative-risk reduction.
//!
//! # Critical Invariants
//!
//! 1. Every row of a [`TransitionMatrix`] sums to 1 (within [`ROW_SUM_TOLERANCE`])
//! 2. Every entry lies in [0, 1]
//! 3. The last (absorbing) row is the identity row

use crate::models::health_state::StateId;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for the row-sums-to-one invariant
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Errors from building or transforming transition matrices
#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("Transition matrix is empty")]
    Empty,

    #[error("Transition matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare { row: usize, len: usize, expected: usize },

    #[error("Row {0} sums to zero, outgoing distribution undefined")]
    ZeroRow(usize),

    #[error("Row {row} sums to {sum}, expected 1")]
    RowSum { row: usize, sum: f64 },

    #[error("Entry ({row}, {col}) = {value} is not a probability")]
    InvalidProbability { row: usize, col: usize, value: f64 },

    #[error("Absorbing row must be the identity row")]
    AbsorbingRowNotIdentity,

    #[error("Relative risk {0} outside [0, 1]")]
    InvalidRelativeRisk(f64),

    #[error("Row index {0} out of range")]
    RowOutOfRange(usize),
}

/// Raw transition counts between states (row = from, column = to)
///
/// Counts are also the Dirichlet concentrations used when resampling rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionCounts {
    rows: Vec<Vec<u64>>,
}

impl TransitionCounts {
    pub fn new(rows: Vec<Vec<u64>>) -> Result<Self, TransitionError> {
        check_square(&rows)?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> &[u64] {
        &self.rows[index]
    }

    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    /// Divide each row by its row sum
    ///
    /// Fails if any row sums to zero.
    ///
    /// # Example
    /// ```
    /// use markov_cohort_core_rs::TransitionCounts;
    ///
    /// let counts = TransitionCounts::new(vec![vec![3, 1], vec![0, 1]]).unwrap();
    /// let matrix = counts.normalize().unwrap();
    /// assert_eq!(matrix.rows()[0], vec![0.75, 0.25]);
    /// ```
    pub fn normalize(&self) -> Result<TransitionMatrix, TransitionError> {
        let mut rows = Vec::with_capacity(self.rows.len());
        for (index, row) in self.rows.iter().enumerate() {
            let total: u64 = row.iter().sum();
            if total == 0 {
                return Err(TransitionError::ZeroRow(index));
            }
            let total = total as f64;
            rows.push(row.iter().map(|&c| c as f64 / total).collect());
        }
        TransitionMatrix::from_rows(rows)
    }
}

/// Row-stochastic transition probability matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionMatrix {
    rows: Vec<Vec<f64>>,
}

impl TransitionMatrix {
    /// Build a matrix from probability rows, validating every invariant
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, TransitionError> {
        check_square(&rows)?;

        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                // Allow float noise just outside [0, 1] from diagonal recomputation
                if !value.is_finite()
                    || value < -ROW_SUM_TOLERANCE
                    || value > 1.0 + ROW_SUM_TOLERANCE
                {
                    return Err(TransitionError::InvalidProbability { row: r, col: c, value });
                }
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(TransitionError::RowSum { row: r, sum });
            }
        }

        let last = rows.len() - 1;
        if (rows[last][last] - 1.0).abs() > ROW_SUM_TOLERANCE {
            return Err(TransitionError::AbsorbingRowNotIdentity);
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    /// Probability of moving `from` → `to` in one cycle
    pub fn probability(&self, from: StateId, to: StateId) -> f64 {
        self.rows[from.index()][to.index()]
    }

    /// Derive a therapy-adjusted matrix
    ///
    /// Each treatable row has every off-diagonal entry scaled by
    /// `(1 - relative_risk)`; its diagonal becomes `1 - sum(off-diagonal)`.
    /// Other rows are copied unchanged.
    ///
    /// # Example
    /// ```
    /// use markov_cohort_core_rs::{TransitionCounts, StateSpace};
    ///
    /// let counts = TransitionCounts::new(vec![
    ///     vec![6, 2, 2],
    ///     vec![0, 8, 2],
    ///     vec![0, 0, 1],
    /// ]).unwrap();
    /// let base = counts.normalize().unwrap();
    /// let space = StateSpace::new(vec!["A".into(), "B".into(), "D".into()], "B").unwrap();
    ///
    /// let treated = base.apply_effectiveness(&[space.id("A").unwrap()], 0.5).unwrap();
    /// assert!((treated.rows()[0][1] - 0.1).abs() < 1e-12);
    /// assert!((treated.rows()[0][0] - 0.8).abs() < 1e-12);
    /// assert_eq!(treated.rows()[1], base.rows()[1]);
    /// ```
    pub fn apply_effectiveness(
        &self,
        treatable_rows: &[StateId],
        relative_risk: f64,
    ) -> Result<TransitionMatrix, TransitionError> {
        if !(0.0..=1.0).contains(&relative_risk) {
            return Err(TransitionError::InvalidRelativeRisk(relative_risk));
        }
        if let Some(bad) = treatable_rows.iter().find(|s| s.index() >= self.rows.len()) {
            return Err(TransitionError::RowOutOfRange(bad.index()));
        }

        let mut rows = self.rows.clone();
        for state in treatable_rows {
            let s = state.index();
            let row = &mut rows[s];
            let mut off_diagonal = 0.0;
            for (next, p) in row.iter_mut().enumerate() {
                if next != s {
                    *p *= 1.0 - relative_risk;
                    off_diagonal += *p;
                }
            }
            row[s] = 1.0 - off_diagonal;
        }

        TransitionMatrix::from_rows(rows)
    }

    /// Sample the state after one cycle
    ///
    /// Draws one uniform variate and walks the cumulative row of `from`.
    /// Zero-probability states are never returned.
    pub fn sample_next(&self, from: StateId, rng: &mut RngManager) -> StateId {
        let row = &self.rows[from.index()];
        let u = rng.next_f64();

        let mut cumulative = 0.0;
        let mut last_possible = from.index();
        for (next, &p) in row.iter().enumerate() {
            if p <= 0.0 {
                continue;
            }
            cumulative += p;
            last_possible = next;
            if u < cumulative {
                return StateId::from_index(next);
            }
        }

        // Cumulative sum fell short of u by rounding
        StateId::from_index(last_possible)
    }
}

/// A therapy's effect on transitions: relative risk reduction applied to the
/// listed rows via [`TransitionMatrix::apply_effectiveness`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapyEffect {
    pub treatable_states: Vec<StateId>,
    pub relative_risk: f64,
}

impl TherapyEffect {
    pub fn apply(&self, base: &TransitionMatrix) -> Result<TransitionMatrix, TransitionError> {
        base.apply_effectiveness(&self.treatable_states, self.relative_risk)
    }
}

fn check_square<T>(rows: &[Vec<T>]) -> Result<(), TransitionError> {
    if rows.is_empty() {
        return Err(TransitionError::Empty);
    }
    let expected = rows.len();
    for (row, values) in rows.iter().enumerate() {
        if values.len() != expected {
            return Err(TransitionError::NotSquare {
                row,
                len: values.len(),
                expected,
            });
        }
    }
    Ok(())
}
