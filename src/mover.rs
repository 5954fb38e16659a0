use arrayvec::ArrayVec;
use std::fmt;
use thiserror::Error;

use crate::grid::{Direction, Grid, Position};
use crate::objects::{MAX_CRATES, ObjectSet};

/// The requested move is illegal. The state it was applied to is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("move rejected")]
pub struct Rejected;

/// One crate displaced by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Push {
    pub crate_index: usize,
    pub from: Position,
    pub to: Position,
}

impl fmt::Display for Push {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crate #{} {} -> {}", self.crate_index, self.from, self.to)
    }
}

pub type Pushes = ArrayVec<Push, MAX_CRATES>;

/// Result of an accepted move: the relocated objects and the pushes that
/// produced them, front crate first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub objects: ObjectSet,
    pub pushes: Pushes,
}

/// Move the agent one cell in `dir`, pushing any chain of crates in front of it.
///
/// The chain is resolved against the original crate positions. Each crate
/// found at the current chain head is taken out of the candidate list, so it
/// can be pushed at most once. If any crate in the chain would land on a
/// blocked or out-of-bounds cell, the whole move is rejected and nothing is
/// relocated.
pub fn apply(grid: &Grid, objects: &ObjectSet, dir: Direction) -> Result<Outcome, Rejected> {
    let target = grid.open_step(objects.agent(), dir).ok_or(Rejected)?;

    let mut remaining: ArrayVec<(usize, Position), MAX_CRATES> =
        objects.crates().iter().copied().enumerate().collect();
    let mut pushes = Pushes::new();
    let mut head = target;

    while let Some(slot) = remaining.iter().position(|&(_, pos)| pos == head) {
        let (crate_index, from) = remaining.remove(slot);
        let to = grid.open_step(from, dir).ok_or(Rejected)?;
        pushes.push(Push {
            crate_index,
            from,
            to,
        });
        head = to;
    }

    Ok(Outcome {
        objects: objects.relocate(target, &pushes),
        pushes,
    })
}
