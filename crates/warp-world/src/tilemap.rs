//! Loaded tile map and flat position lookup.

use glam::DVec2;
use hashbrown::HashMap;
use warp_core::{CurvatureModel, GyroUniforms, GyroVector};

use crate::tile::WorldTile;

/// Integer cell of the flat lookup grid.
type CellKey = (i64, i64);

/// The loaded tiles of one map plus the curvature they were generated for.
///
/// Lookups return the first tile, in file order, whose flat cell contains
/// the query. A hash index over quantized flat positions narrows the tiles
/// tested to those in the 3x3 block of cells around the query.
pub struct TileMap {
    model: CurvatureModel,
    tiles: Vec<WorldTile>,
    /// Tile indices, ascending, by the cell of their flat position.
    cells: HashMap<CellKey, Vec<usize>>,
}

impl TileMap {
    pub fn new(model: CurvatureModel, tiles: Vec<WorldTile>) -> Self {
        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::with_capacity(tiles.len());
        for (index, tile) in tiles.iter().enumerate() {
            cells
                .entry(cell_key(tile.flat_position, model.cell_width()))
                .or_default()
                .push(index);
        }
        Self {
            model,
            tiles,
            cells,
        }
    }

    /// A map with no tiles. Every lookup returns the identity.
    pub fn empty(model: CurvatureModel) -> Self {
        Self::new(model, Vec::new())
    }

    #[inline]
    pub fn model(&self) -> &CurvatureModel {
        &self.model
    }

    #[inline]
    pub fn n(&self) -> u32 {
        self.model.n()
    }

    #[inline]
    pub fn cell_width(&self) -> f64 {
        self.model.cell_width()
    }

    #[inline]
    pub fn klein_scale(&self) -> f64 {
        self.model.klein_scale()
    }

    pub fn tiles(&self) -> &[WorldTile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// First tile whose flat cell contains `query`.
    pub fn tile_at(&self, query: DVec2) -> Option<&WorldTile> {
        let width = self.cell_width();
        let (cx, cy) = cell_key(query, width);

        // A containing tile's corner sits in the query's cell or the one
        // below it on each axis; the upper ring absorbs quantization error.
        let mut best: Option<usize> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(indices) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                let hit = indices
                    .iter()
                    .copied()
                    .find(|&i| self.tiles[i].contains(query, width));
                if let Some(i) = hit {
                    best = Some(best.map_or(i, |b| b.min(i)));
                }
            }
        }
        best.map(|i| &self.tiles[i])
    }

    /// Gyrovector of the tile under `query`, identity if there is none.
    pub fn gyro_at(&self, query: DVec2) -> GyroVector {
        self.tile_at(query)
            .map_or(GyroVector::IDENTITY, |tile| tile.position)
    }

    /// Shader parameters for the tile under `query`.
    pub fn uniforms_at(&self, query: DVec2) -> GyroUniforms {
        self.gyro_at(query).uniforms()
    }
}

#[inline]
fn cell_key(p: DVec2, cell_width: f64) -> CellKey {
    let cell = (p / cell_width).floor();
    (cell.x as i64, cell.y as i64)
}
