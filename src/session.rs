use std::fmt;
use tracing::{debug, info};

use crate::grid::{Cell, Direction, Grid, Position};
use crate::mover::{self, Push, Pushes, Rejected};
use crate::objects::{ObjectSet, StateError};

/// The committed game state: a grid plus the objects standing on it.
///
/// A session is the single writer for its state. `apply` takes `&mut self`, so
/// moves are resolved one at a time and readers only ever observe the state
/// between moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    grid: Grid,
    objects: ObjectSet,
    last_pushes: Pushes,
    moves: usize,
}

impl Session {
    /// Take ownership of an initial state, failing if it breaks the at-rest invariant.
    pub fn new(grid: Grid, objects: ObjectSet) -> Result<Self, StateError> {
        objects.validate(&grid)?;
        info!(
            height = grid.height(),
            width = grid.width(),
            agent = %objects.agent(),
            crates = objects.crate_count(),
            "state loaded"
        );
        Ok(Session {
            grid,
            objects,
            last_pushes: Pushes::new(),
            moves: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn objects(&self) -> &ObjectSet {
        &self.objects
    }

    /// Number of accepted moves since the state was loaded.
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Swap in a new grid of passability, keeping the objects and move count.
    /// Fails without changing anything if the objects do not rest on the new grid.
    pub fn replace_grid(&mut self, grid: Grid) -> Result<(), StateError> {
        self.objects.validate(&grid)?;
        info!(height = grid.height(), width = grid.width(), "grid replaced");
        self.grid = grid;
        self.last_pushes.clear();
        Ok(())
    }

    /// Try to move the agent. On success the new objects are committed and the
    /// crates pushed by this move are returned; on rejection nothing changes.
    pub fn apply(&mut self, dir: Direction) -> Result<&[Push], Rejected> {
        let outcome = match mover::apply(&self.grid, &self.objects, dir) {
            Ok(outcome) => outcome,
            Err(rejected) => {
                debug!(direction = %dir, agent = %self.objects.agent(), "move rejected");
                return Err(rejected);
            }
        };

        debug_assert!(outcome.objects.validate(&self.grid).is_ok());
        self.objects = outcome.objects;
        self.last_pushes = outcome.pushes;
        self.moves += 1;

        debug!(direction = %dir, agent = %self.objects.agent(), "agent moved");
        for push in &self.last_pushes {
            debug!(%push, "crate pushed");
        }
        Ok(&self.last_pushes)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.grid();
        let objects = self.objects();
        for row in 0..grid.height() {
            let mut line = String::new();
            for col in 0..grid.width() {
                let pos = Position::new(row, col);
                let ch = if pos == objects.agent() {
                    '@'
                } else if objects.crate_at(pos).is_some() {
                    '$'
                } else {
                    match grid.cell(pos) {
                        Some(Cell::Open) => ' ',
                        _ => '#',
                    }
                };
                line.push(ch);
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Grid {
        #[rustfmt::skip]
        let ids = [
            2, 2, 2, 2, 2, 2,
            2, 0, 0, 0, 0, 2,
            2, 2, 2, 2, 2, 2,
        ];
        Grid::from_tile_ids(3, 6, &ids).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_state() {
        let objects = ObjectSet::new(Position::new(1, 1), &[Position::new(0, 3)]).unwrap();
        assert!(matches!(
            Session::new(corridor(), objects),
            Err(StateError::CrateBlocked { index: 0, .. })
        ));
    }

    #[test]
    fn test_apply_commits_and_counts() {
        let objects = ObjectSet::new(Position::new(1, 1), &[Position::new(1, 2)]).unwrap();
        let mut session = Session::new(corridor(), objects).unwrap();

        let pushes = session.apply(Direction::Right).unwrap();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].to, Position::new(1, 3));
        assert_eq!(session.objects().agent(), Position::new(1, 2));
        assert_eq!(session.moves(), 1);

        let pushes = session.apply(Direction::Left).unwrap();
        assert!(pushes.is_empty());
        assert_eq!(session.moves(), 2);
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let objects = ObjectSet::new(Position::new(1, 3), &[Position::new(1, 4)]).unwrap();
        let mut session = Session::new(corridor(), objects).unwrap();
        let snapshot = session.clone();

        assert_eq!(session.apply(Direction::Right), Err(Rejected));
        assert_eq!(session.apply(Direction::Up), Err(Rejected));
        assert_eq!(session, snapshot);
    }

    #[test]
    fn test_replace_grid() {
        let objects = ObjectSet::new(Position::new(1, 1), &[Position::new(1, 2)]).unwrap();
        let mut session = Session::new(corridor(), objects).unwrap();
        session.apply(Direction::Right).unwrap();

        let open = Grid::from_tile_ids(3, 6, &[0; 18]).unwrap();
        session.replace_grid(open.clone()).unwrap();
        assert_eq!(session.grid(), &open);
        assert_eq!(session.objects().agent(), Position::new(1, 2));
        assert_eq!(session.moves(), 1);
        assert!(session.apply(Direction::Up).is_ok());
    }

    #[test]
    fn test_replace_grid_rejects_blocked_objects() {
        let objects = ObjectSet::new(Position::new(1, 1), &[Position::new(1, 2)]).unwrap();
        let mut session = Session::new(corridor(), objects).unwrap();
        let snapshot = session.clone();

        let walls = Grid::from_tile_ids(3, 6, &[1; 18]).unwrap();
        assert_eq!(
            session.replace_grid(walls),
            Err(StateError::AgentBlocked(Position::new(1, 1)))
        );
        assert_eq!(session, snapshot);
    }

    #[test]
    fn test_display() {
        let objects = ObjectSet::new(Position::new(1, 1), &[Position::new(1, 3)]).unwrap();
        let mut session = Session::new(corridor(), objects).unwrap();
        assert_eq!(session.to_string(), "######\n#@ $ #\n######\n");

        session.apply(Direction::Right).unwrap();
        assert_eq!(session.to_string(), "######\n# @$ #\n######\n");
    }
}
