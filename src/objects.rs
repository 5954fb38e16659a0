use arrayvec::ArrayVec;
use thiserror::Error;

use crate::grid::{Grid, Position};
use crate::mover::Push;

pub const MAX_CRATES: usize = 32;

pub type Crates = ArrayVec<Position, MAX_CRATES>;

/// Ways an externally supplied state can break the at-rest invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("cannot hold {count} crates: maximum is {max}")]
    TooManyCrates { count: usize, max: usize },
    #[error("agent at {0} is not on an open cell")]
    AgentBlocked(Position),
    #[error("crate #{index} at {pos} is not on an open cell")]
    CrateBlocked { index: usize, pos: Position },
    #[error("crate #{index} at {pos} overlaps the agent")]
    CrateOnAgent { index: usize, pos: Position },
    #[error("crates #{first} and #{second} both occupy {pos}")]
    CrateOverlap {
        first: usize,
        second: usize,
        pos: Position,
    },
}

/// Positions of the agent and every crate.
///
/// A crate's index in the sequence is its identity and never changes. Only the
/// mover produces a relocated set; everything else reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSet {
    agent: Position,
    crates: Crates,
}

impl ObjectSet {
    pub fn new(agent: Position, crates: &[Position]) -> Result<Self, StateError> {
        if crates.len() > MAX_CRATES {
            return Err(StateError::TooManyCrates {
                count: crates.len(),
                max: MAX_CRATES,
            });
        }
        Ok(ObjectSet {
            agent,
            crates: crates.iter().copied().collect(),
        })
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    pub fn crates(&self) -> &[Position] {
        &self.crates
    }

    pub fn crate_count(&self) -> usize {
        self.crates.len()
    }

    /// Index of the crate standing on `pos`, if any.
    pub fn crate_at(&self, pos: Position) -> Option<usize> {
        self.crates.iter().position(|&c| c == pos)
    }

    /// Check the at-rest invariant against `grid`.
    pub fn validate(&self, grid: &Grid) -> Result<(), StateError> {
        if !grid.is_open(self.agent) {
            return Err(StateError::AgentBlocked(self.agent));
        }
        for (index, &pos) in self.crates.iter().enumerate() {
            if !grid.is_open(pos) {
                return Err(StateError::CrateBlocked { index, pos });
            }
            if pos == self.agent {
                return Err(StateError::CrateOnAgent { index, pos });
            }
            if let Some(first) = self.crates[..index].iter().position(|&c| c == pos) {
                return Err(StateError::CrateOverlap {
                    first,
                    second: index,
                    pos,
                });
            }
        }
        Ok(())
    }

    /// New set with the agent at `agent` and each push applied by crate index.
    pub(crate) fn relocate(&self, agent: Position, pushes: &[Push]) -> ObjectSet {
        let mut crates = self.crates.clone();
        for push in pushes {
            crates[push.crate_index] = push.to;
        }
        ObjectSet { agent, crates }
    }
}
