use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::grid::{Grid, GridError, MAX_SIZE, Position};
use crate::objects::{MAX_CRATES, ObjectSet, StateError};

/// Random maps that leave too few open cells are redrawn at most this many times.
const MAX_MAP_ATTEMPTS: usize = 100;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("map has {available} free open cells but {needed} are required")]
    NotEnoughOpenCells { needed: usize, available: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// Parameters for the random initial-state generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub height: usize,
    pub width: usize,
    pub crates: usize,
    /// Tile ids drawn uniformly for interior cells. 0 is walkable.
    pub tile_choices: Vec<u8>,
    /// Tile id written around the edge of the map.
    pub border_tile: u8,
    /// Fixed seed for reproducible maps; entropy when None.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        // 640x480 window of 32px tiles at 2x scale.
        Self {
            height: 7,
            width: 10,
            crates: 5,
            tile_choices: vec![0, 2],
            border_tile: 2,
            seed: None,
        }
    }
}

/// Visual tile ids for a map. Passability is derived from these once, via `to_grid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    height: usize,
    width: usize,
    tiles: Vec<u8>,
}

impl TileMap {
    pub fn filled(height: usize, width: usize, tile: u8) -> Self {
        TileMap {
            height,
            width,
            tiles: vec![tile; height * width],
        }
    }

    fn set(&mut self, row: usize, col: usize, tile: u8) {
        self.tiles[row * self.width + col] = tile;
    }

    fn set_border(&mut self, tile: u8) {
        for col in 0..self.width {
            self.set(0, col, tile);
            self.set(self.height - 1, col, tile);
        }
        for row in 0..self.height {
            self.set(row, 0, tile);
            self.set(row, self.width - 1, tile);
        }
    }

    pub fn to_grid(&self) -> Result<Grid, GridError> {
        Grid::from_tile_ids(self.height, self.width, &self.tiles)
    }
}

/// Output of the generator: a playable grid and object placement.
#[derive(Debug, Clone)]
pub struct InitialState {
    pub grid: Grid,
    pub objects: ObjectSet,
}

pub struct Generator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        if config.height < 3 || config.width < 3 {
            return Err(GenerateError::InvalidConfig(
                "map must be at least 3x3 to leave an interior inside the border",
            ));
        }
        if config.height > MAX_SIZE || config.width > MAX_SIZE {
            return Err(GenerateError::InvalidConfig("map exceeds the maximum grid size"));
        }
        if config.crates > MAX_CRATES {
            return Err(GenerateError::InvalidConfig("too many crates requested"));
        }
        if config.tile_choices.is_empty() {
            return Err(GenerateError::InvalidConfig("tile choices must not be empty"));
        }

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Generator { config, rng })
    }

    /// Random interior tiles inside a solid border, with the agent and crates
    /// placed on distinct open cells.
    pub fn generate(&mut self) -> Result<InitialState, GenerateError> {
        let needed = self.config.crates + 1;
        let mut available = 0;

        for attempt in 1..=MAX_MAP_ATTEMPTS {
            let tiles = self.random_tiles();
            let grid = tiles.to_grid()?;
            let open = grid.open_positions();
            if open.len() >= needed {
                return self.populate(grid, open);
            }
            debug!(attempt, open = open.len(), needed, "map too closed, redrawing");
            available = available.max(open.len());
        }

        Err(GenerateError::NotEnoughOpenCells { needed, available })
    }

    /// A `height` x `width` grid whose interior is all walkable inside the border.
    pub fn blank_grid(&self, height: usize, width: usize) -> Result<Grid, GenerateError> {
        let mut tiles = TileMap::filled(height, width, 0);
        tiles.set_border(self.config.border_tile);
        Ok(tiles.to_grid()?)
    }

    /// A blank grid of the configured size with freshly placed objects.
    pub fn blank(&mut self) -> Result<InitialState, GenerateError> {
        let grid = self.blank_grid(self.config.height, self.config.width)?;
        let open = grid.open_positions();
        if open.len() < self.config.crates + 1 {
            return Err(GenerateError::NotEnoughOpenCells {
                needed: self.config.crates + 1,
                available: open.len(),
            });
        }
        self.populate(grid, open)
    }

    fn random_tiles(&mut self) -> TileMap {
        let choices = &self.config.tile_choices;
        let mut tiles = TileMap::filled(self.config.height, self.config.width, 0);
        for tile in tiles.tiles.iter_mut() {
            *tile = choices[self.rng.gen_range(0..choices.len())];
        }
        tiles.set_border(self.config.border_tile);
        tiles
    }

    /// Pick the agent and crate cells uniformly, without replacement, from `open`.
    fn populate(
        &mut self,
        grid: Grid,
        mut open: Vec<Position>,
    ) -> Result<InitialState, GenerateError> {
        let (picked, _) = open.partial_shuffle(&mut self.rng, self.config.crates + 1);
        let objects = ObjectSet::new(picked[0], &picked[1..])?;
        objects.validate(&grid)?;

        info!(
            agent = %objects.agent(),
            crates = objects.crate_count(),
            "generated initial state"
        );
        Ok(InitialState { grid, objects })
    }
}
