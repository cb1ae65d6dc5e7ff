//! Breadth-first tile graph generation.
//!
//! Starting from the root, every round spawns the neighbours of the tiles
//! discovered in the previous round. A candidate whose position coincides
//! with an existing tile is dropped, which is what folds the tree of paths
//! into the tiling of a curved space.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use warp_core::constants::TILE_EPSILON_SQ;
use warp_core::{CurvatureModel, Error, GyroVector, Result};

use crate::tile::{Coord, Direction, Tile};

/// Deepest expansion whose coords still fit the one-byte length prefix.
pub const MAX_DEPTH: u32 = 254;

/// Tile generator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of squares around each vertex.
    pub n: u32,
    /// Also spawn along the vertical axis (`F`/`B`).
    pub use_3d: bool,
    /// Number of expansion rounds.
    pub depth: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n: 8,
            use_3d: false,
            depth: 6,
        }
    }
}

impl GeneratorConfig {
    pub const fn new(n: u32, use_3d: bool, depth: u32) -> Self {
        Self { n, use_3d, depth }
    }

    pub const fn with_valence(mut self, n: u32) -> Self {
        self.n = n;
        self
    }

    pub const fn with_3d(mut self, use_3d: bool) -> Self {
        self.use_3d = use_3d;
        self
    }

    pub const fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "polygon valence must be at least 2, got {}",
                self.n
            )));
        }
        if self.depth > MAX_DEPTH {
            return Err(Error::InvalidConfiguration(format!(
                "depth {} exceeds the maximum of {MAX_DEPTH}",
                self.depth
            )));
        }
        Ok(())
    }

    /// File name of the map this configuration generates.
    pub fn map_file_name(&self) -> String {
        format!("Map{}{}.bin", self.n, if self.use_3d { "L" } else { "" })
    }
}

/// Builds the deduplicated tile list for one configuration.
pub struct TileGenerator {
    config: GeneratorConfig,
    model: CurvatureModel,
}

impl TileGenerator {
    /// Validate the configuration and derive its curvature.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let model = CurvatureModel::configure(config.n)?;
        info!(
            n = model.n(),
            k = model.k(),
            cell_width = model.cell_width(),
            "Configured curvature"
        );
        Ok(Self { config, model })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn model(&self) -> &CurvatureModel {
        &self.model
    }

    /// Directions tried around each tile, in spawn order.
    pub fn directions(&self) -> &'static [Direction] {
        if self.config.use_3d {
            &Direction::LATTICE
        } else {
            &Direction::PLANAR
        }
    }

    /// Generate the tiles, root first, in spawn order.
    ///
    /// Valences 2 and 3 are closed by hand: `n = 2` is the root and a single
    /// right neighbour, `n = 3` is one expansion round plus the tile two
    /// steps right of the root.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn generate(&self) -> Vec<Tile> {
        let mut tiles = vec![Tile::root()];
        let width = self.model.cell_width();

        match self.model.n() {
            2 => {
                tiles.push(Tile::new(
                    Coord::root().child(Direction::Right),
                    GyroVector::from_translation(Direction::Right.shift(width)),
                ));
            }
            3 => {
                self.expand(&mut tiles, 0);
                if let Some(first) = tiles.get(1).cloned() {
                    let position = first
                        .position
                        .add(self.model.curvature(), Direction::Right.shift(width));
                    tiles.push(Tile::new(first.coord.child(Direction::Right), position));
                }
            }
            _ => {
                for round in 0..self.config.depth as usize {
                    let spawned = self.expand(&mut tiles, round);
                    debug!(round, spawned, total = tiles.len(), "Expanded tile graph");
                }
            }
        }

        info!(
            n = self.model.n(),
            use_3d = self.config.use_3d,
            tiles = tiles.len(),
            "Generated tile graph"
        );
        tiles
    }

    /// Spawn neighbours of every tile at `round` steps from the root.
    ///
    /// The step back toward the parent is skipped. Returns the number of
    /// tiles added.
    fn expand(&self, tiles: &mut Vec<Tile>, round: usize) -> usize {
        let curvature = self.model.curvature();
        let width = self.model.cell_width();
        let before = tiles.len();

        // Tiles added here sit one round deeper, so they never match `round`
        let mut i = 0;
        while i < tiles.len() {
            if tiles[i].coord.depth() == round {
                let coord = tiles[i].coord.clone();
                let position = tiles[i].position;
                let last = coord.last();

                for &direction in self.directions() {
                    if last == Some(direction.opposite()) {
                        continue;
                    }
                    let candidate = position.add(curvature, direction.shift(width));
                    self.try_spawn(tiles, coord.child(direction), candidate);
                }
            }
            i += 1;
        }

        tiles.len() - before
    }

    /// Commit a tile unless its position is already taken.
    fn try_spawn(&self, tiles: &mut Vec<Tile>, coord: Coord, position: GyroVector) -> bool {
        if self.is_occupied(tiles, &position) {
            return false;
        }
        tiles.push(Tile::new(coord, position));
        true
    }

    /// Whether any tile lies within [`TILE_EPSILON_SQ`] of `position`.
    pub fn is_occupied(&self, tiles: &[Tile], position: &GyroVector) -> bool {
        let curvature = self.model.curvature();
        tiles
            .iter()
            .any(|tile| position.separation_sq(curvature, &tile.position) < TILE_EPSILON_SQ)
    }

    /// Whether stepping tile `index` in `direction` lands on an existing tile.
    pub fn occupied_after_shift(&self, tiles: &[Tile], index: usize, direction: Direction) -> bool {
        tiles.get(index).is_some_and(|tile| {
            let shifted = tile
                .position
                .add(self.model.curvature(), direction.shift(self.model.cell_width()));
            self.is_occupied(tiles, &shifted)
        })
    }
}

/// Generate the tiles for `config` in one call.
pub fn generate_tiles(config: GeneratorConfig) -> Result<Vec<Tile>> {
    Ok(TileGenerator::new(config)?.generate())
}
