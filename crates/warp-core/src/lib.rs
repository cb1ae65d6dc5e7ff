//! Core math for the Warp engine.
//!
//! This crate provides the constant-curvature algebra used throughout the engine:
//! - Curvature configuration derived from the tiling valence
//! - Möbius addition and the gyrations it produces
//! - Gyrovectors (translation plus holonomy) and their composition
//! - Klein, Poincaré and unit-square model conversions
//! - Common error types

pub mod conversions;
pub mod curvature;
pub mod error;
pub mod gyrovector;
pub mod mobius;

pub use curvature::{Curvature, CurvatureModel};
pub use error::{Error, Result};
pub use gyrovector::{compose, subtract, GyroUniforms, GyroVector, Operand};

/// Engine-wide constants
pub mod constants {
    use glam::DVec3;

    /// Ambient up axis. Tiles live in the XZ plane.
    pub const UP: DVec3 = DVec3::Y;
    /// Two positions closer than this (squared gyro distance) are the same tile.
    pub const TILE_EPSILON_SQ: f64 = 1e-10;
    /// Displacements shorter than this are treated as standing still.
    pub const MIN_DISPLACEMENT: f64 = 1e-5;
    /// Bias added to the cell width to get the Klein scale, divided by `n`.
    pub const KLEIN_SCALE_BIAS: f64 = 3e-4;
}
