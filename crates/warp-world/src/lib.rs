//! Tile map generation, persistence and lookup for the Warp engine.
//!
//! A map is generated by walking a curved tiling breadth first, written to
//! a compact binary file and loaded back as a flat lookup grid that
//! resolves positions to gyrovectors.

pub mod codec;
pub mod generation;
pub mod storage;
pub mod tile;
pub mod tilemap;
pub mod world;

pub use codec::{decode_tiles, decode_world_tiles, encode_tile, encode_tiles};
pub use generation::{generate_tiles, GeneratorConfig, TileGenerator, MAX_DEPTH};
pub use storage::{map_path, read_tile_map, write_tile_map};
pub use tile::{Coord, Direction, Tile, WorldTile};
pub use tilemap::TileMap;
pub use world::{TileWorld, WorldConfig};
