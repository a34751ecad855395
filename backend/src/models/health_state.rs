//! Health states
//!
//! A model has an ordered, fixed set of mutually exclusive disease stages.
//! States are referred to through [`StateId`] handles resolved against a
//! [`StateSpace`] lookup table; a handle's index is the matrix row/column of
//! that state.
//!
//! # Critical Invariants
//!
//! 1. The LAST state is the absorbing "dead" state
//! 2. The milestone state is a non-absorbing state
//! 3. State names are unique

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while building a state space
#[derive(Debug, Error, PartialEq)]
pub enum StateSpaceError {
    #[error("State space needs at least two states (one alive, one absorbing), got {0}")]
    TooFewStates(usize),

    #[error("Duplicate state name: {0}")]
    DuplicateState(String),

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("Milestone state {0} cannot be the absorbing state")]
    AbsorbingMilestone(String),
}

/// Typed handle to a health state (zero-based row/column index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(usize);

impl StateId {
    /// Handle for a validated row/column index
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Matrix row/column of this state
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Ordered set of health states with name lookup
///
/// # Example
/// ```
/// use markov_cohort_core_rs::StateSpace;
///
/// let space = StateSpace::new(
///     vec!["WELL".into(), "SICK".into(), "DEAD".into()],
///     "SICK",
/// ).unwrap();
///
/// assert_eq!(space.len(), 3);
/// assert_eq!(space.name(space.absorbing()), "DEAD");
/// assert_eq!(space.id("SICK"), Some(space.milestone()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpace {
    names: Vec<String>,
    lookup: HashMap<String, StateId>,
    milestone: StateId,
}

impl StateSpace {
    /// Build a state space from ordered names; the last name is absorbing.
    pub fn new(names: Vec<String>, milestone: &str) -> Result<Self, StateSpaceError> {
        if names.len() < 2 {
            return Err(StateSpaceError::TooFewStates(names.len()));
        }

        let mut lookup = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if lookup.insert(name.clone(), StateId(index)).is_some() {
                return Err(StateSpaceError::DuplicateState(name.clone()));
            }
        }

        let milestone_id = *lookup
            .get(milestone)
            .ok_or_else(|| StateSpaceError::UnknownState(milestone.to_string()))?;
        if milestone_id.0 == names.len() - 1 {
            return Err(StateSpaceError::AbsorbingMilestone(milestone.to_string()));
        }

        Ok(Self {
            names,
            lookup,
            milestone: milestone_id,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a state name
    pub fn id(&self, name: &str) -> Option<StateId> {
        self.lookup.get(name).copied()
    }

    /// Resolve a state name, failing on unknown names
    pub fn require(&self, name: &str) -> Result<StateId, StateSpaceError> {
        self.id(name)
            .ok_or_else(|| StateSpaceError::UnknownState(name.to_string()))
    }

    /// Handle for a raw index, if in range
    pub fn get(&self, index: usize) -> Option<StateId> {
        (index < self.names.len()).then_some(StateId(index))
    }

    pub fn name(&self, id: StateId) -> &str {
        &self.names[id.0]
    }

    /// The absorbing (dead) state
    pub fn absorbing(&self) -> StateId {
        StateId(self.names.len() - 1)
    }

    /// The state whose first-entry time is tracked
    pub fn milestone(&self) -> StateId {
        self.milestone
    }

    pub fn is_absorbing(&self, id: StateId) -> bool {
        id == self.absorbing()
    }

    /// All states in order
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.names.len()).map(StateId)
    }

    /// All non-absorbing states in order
    pub fn alive_states(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.names.len() - 1).map(StateId)
    }
}
