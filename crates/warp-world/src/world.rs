//! Generate-then-load session over a maps directory.

use std::path::{Path, PathBuf};

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use warp_core::{CurvatureModel, Error, GyroUniforms, GyroVector, Result};

use crate::generation::{GeneratorConfig, TileGenerator};
use crate::storage::{map_path, read_tile_map, write_tile_map};
use crate::tilemap::TileMap;

/// Where maps live and how to generate the active one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub maps_dir: PathBuf,
    pub generator: GeneratorConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            maps_dir: PathBuf::from("Levels"),
            generator: GeneratorConfig::default(),
        }
    }
}

impl WorldConfig {
    pub fn with_maps_dir(mut self, maps_dir: impl Into<PathBuf>) -> Self {
        self.maps_dir = maps_dir.into();
        self
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }
}

/// The active curvature, the current map file and its loaded tiles.
pub struct TileWorld {
    maps_dir: PathBuf,
    model: CurvatureModel,
    current_map: Option<PathBuf>,
    tilemap: TileMap,
}

impl TileWorld {
    /// An empty session in flat space.
    pub fn new(maps_dir: impl Into<PathBuf>) -> Self {
        Self {
            maps_dir: maps_dir.into(),
            model: CurvatureModel::EUCLIDEAN,
            current_map: None,
            tilemap: TileMap::empty(CurvatureModel::EUCLIDEAN),
        }
    }

    /// Generate the configured map and load it.
    pub fn from_config(config: &WorldConfig) -> Result<Self> {
        let mut world = Self::new(&config.maps_dir);
        world.generate_tile_map(config.generator)?;
        world.load_tile_map()?;
        Ok(world)
    }

    /// Switch curvature. Drops the loaded tiles, which belong to the old one.
    pub fn configure(&mut self, n: u32) -> Result<()> {
        self.model = CurvatureModel::configure(n)?;
        self.tilemap = TileMap::empty(self.model);
        Ok(())
    }

    /// Generate a map, write it under the maps directory and make it current.
    ///
    /// The session adopts the curvature of `config`. The loaded tiles are
    /// dropped; call [`Self::load_tile_map`] to query the new map.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn generate_tile_map(&mut self, config: GeneratorConfig) -> Result<&Path> {
        let generator = TileGenerator::new(config)?;
        let tiles = generator.generate();
        let path = map_path(&self.maps_dir, &config);
        write_tile_map(&path, &tiles)?;

        self.model = *generator.model();
        self.tilemap = TileMap::empty(self.model);
        Ok(self.current_map.insert(path).as_path())
    }

    /// Load the current map, replacing the loaded tiles.
    ///
    /// On failure the tile map is left empty. Returns the tile count.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn load_tile_map(&mut self) -> Result<usize> {
        self.tilemap = TileMap::empty(self.model);

        let Some(path) = self.current_map.as_deref() else {
            return Err(Error::InvalidConfiguration("no current tile map".into()));
        };

        match read_tile_map(path, self.model.cell_width()) {
            Ok(tiles) => {
                info!(
                    path = %path.display(),
                    n = self.model.n(),
                    tiles = tiles.len(),
                    "Loaded tile map"
                );
                self.tilemap = TileMap::new(self.model, tiles);
                Ok(self.tilemap.len())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load tile map");
                Err(e)
            }
        }
    }

    /// Load an existing map file generated for valence `n`.
    pub fn load_tile_map_from(&mut self, path: impl Into<PathBuf>, n: u32) -> Result<usize> {
        self.configure(n)?;
        self.current_map = Some(path.into());
        self.load_tile_map()
    }

    pub fn maps_dir(&self) -> &Path {
        &self.maps_dir
    }

    pub fn model(&self) -> &CurvatureModel {
        &self.model
    }

    pub fn current_map(&self) -> Option<&Path> {
        self.current_map.as_deref()
    }

    pub fn tilemap(&self) -> &TileMap {
        &self.tilemap
    }

    /// Gyrovector of the tile under a flat position.
    pub fn gyro_at(&self, query: DVec2) -> GyroVector {
        self.tilemap.gyro_at(query)
    }

    pub fn uniforms_at(&self, query: DVec2) -> GyroUniforms {
        self.tilemap.uniforms_at(query)
    }
}
