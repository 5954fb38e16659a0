use std::fmt;
use thiserror::Error;

pub const MAX_SIZE: usize = 64;

/// A cell coordinate in (row, col) order. Row grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Position { row, col }
    }

    /// Step one cell in the given direction.
    /// Returns None if the step would leave the non-negative quadrant.
    pub fn step(self, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Position { row, col })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[cfg(test)]
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

impl Direction {
    /// Unit delta in (row, col) order.
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
        }
    }

    /// Map a key to a direction. Accepts vi keys, WASD and the initials L/R/U/D.
    pub fn from_key(key: char) -> Option<Direction> {
        match key {
            'h' | 'a' | 'L' => Some(Direction::Left),
            'l' | 'd' | 'R' => Some(Direction::Right),
            'k' | 'w' | 'U' => Some(Direction::Up),
            'j' | 's' | 'D' => Some(Direction::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Open,
    Blocked,
}

impl Cell {
    /// Tile id 0 is walkable, every other id blocks.
    pub fn from_tile_id(id: u8) -> Cell {
        if id == 0 { Cell::Open } else { Cell::Blocked }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid must have at least one row and one column")]
    Empty,
    #[error("grid {height}x{width} exceeds maximum size {max}")]
    TooLarge { height: usize, width: usize, max: usize },
    #[error("expected {expected} tile ids for the grid, got {actual}")]
    TileCount { expected: usize, actual: usize },
}

/// Passability map for one playthrough. Dimensions never change once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [[Cell; MAX_SIZE]; MAX_SIZE],
    height: u8,
    width: u8,
}

impl Grid {
    /// Build a grid from row-major tile ids.
    pub fn from_tile_ids(height: usize, width: usize, ids: &[u8]) -> Result<Self, GridError> {
        if height == 0 || width == 0 {
            return Err(GridError::Empty);
        }
        if height > MAX_SIZE || width > MAX_SIZE {
            return Err(GridError::TooLarge {
                height,
                width,
                max: MAX_SIZE,
            });
        }
        if ids.len() != height * width {
            return Err(GridError::TileCount {
                expected: height * width,
                actual: ids.len(),
            });
        }

        // Cells outside height x width stay blocked; is_open bounds-checks first anyway.
        let mut cells = [[Cell::Blocked; MAX_SIZE]; MAX_SIZE];
        for (i, &id) in ids.iter().enumerate() {
            cells[i / width][i % width] = Cell::from_tile_id(id);
        }

        Ok(Grid {
            cells,
            height: height as u8,
            width: width as u8,
        })
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    pub fn cell(&self, pos: Position) -> Option<Cell> {
        if self.in_bounds(pos) {
            Some(self.cells[pos.row as usize][pos.col as usize])
        } else {
            None
        }
    }

    /// True iff `pos` is in bounds and walkable.
    pub fn is_open(&self, pos: Position) -> bool {
        self.cell(pos) == Some(Cell::Open)
    }

    /// The neighbour of `pos` in `dir`, if it exists and is open.
    pub fn open_step(&self, pos: Position, dir: Direction) -> Option<Position> {
        pos.step(dir).filter(|&next| self.is_open(next))
    }

    /// All open cells in row-major order.
    pub fn open_positions(&self) -> Vec<Position> {
        let mut open = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let pos = Position::new(row, col);
                if self.is_open(pos) {
                    open.push(pos);
                }
            }
        }
        open
    }
}
