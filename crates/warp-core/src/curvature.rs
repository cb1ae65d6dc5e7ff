//! Curvature configuration derived from the tiling valence.
//!
//! A map is tiled with squares, `n` of them meeting at every vertex. Four
//! squares close up flat; fewer curve the space into a sphere, more into a
//! hyperbolic plane. Every algebra and conversion function takes the
//! resulting [`Curvature`] explicitly.

use std::f64::consts::{FRAC_PI_4, PI};

use serde::{Deserialize, Serialize};

use crate::constants::KLEIN_SCALE_BIAS;
use crate::error::{Error, Result};

/// Sign of the constant curvature `K`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Curvature {
    /// `K = +1`
    Spherical,
    /// `K = 0`
    #[default]
    Euclidean,
    /// `K = -1`
    Hyperbolic,
}

impl Curvature {
    /// Curvature of a tiling with `n` squares around each vertex.
    #[inline]
    pub const fn from_valence(n: u32) -> Self {
        if n < 4 {
            Self::Spherical
        } else if n == 4 {
            Self::Euclidean
        } else {
            Self::Hyperbolic
        }
    }

    /// The scalar `K`.
    #[inline]
    pub const fn k(self) -> f64 {
        match self {
            Self::Spherical => 1.0,
            Self::Euclidean => 0.0,
            Self::Hyperbolic => -1.0,
        }
    }

    /// Returns true for flat space, where every curved formula degenerates.
    #[inline]
    pub const fn is_euclidean(self) -> bool {
        matches!(self, Self::Euclidean)
    }
}

/// Curvature and cell scale shared by generation, algebra and lookup.
///
/// Built once with [`CurvatureModel::configure`] and read-only afterwards.
/// Serialized as its valence alone and rebuilt through `configure`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ValenceRepr", into = "ValenceRepr")]
pub struct CurvatureModel {
    n: u32,
    curvature: Curvature,
    cell_width: f64,
    klein_scale: f64,
}

impl CurvatureModel {
    /// The flat square tiling.
    pub const EUCLIDEAN: Self = Self {
        n: 4,
        curvature: Curvature::Euclidean,
        cell_width: 2.0,
        klein_scale: 1.0,
    };

    /// Derive the curvature constants for polygon valence `n`.
    ///
    /// `n == 4` is its own case: the general cell width formula vanishes there.
    pub fn configure(n: u32) -> Result<Self> {
        if n < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "polygon valence must be at least 2, got {n}"
            )));
        }
        if n == 4 {
            return Ok(Self::EUCLIDEAN);
        }

        let valence = f64::from(n);
        let r = (PI / valence).cos() / FRAC_PI_4.sin();
        let cell_width = (r * r - 1.0).abs().sqrt() / r;

        Ok(Self {
            n,
            curvature: Curvature::from_valence(n),
            cell_width,
            klein_scale: cell_width + KLEIN_SCALE_BIAS / valence,
        })
    }

    /// Polygon valence.
    #[inline]
    pub const fn n(&self) -> u32 {
        self.n
    }

    #[inline]
    pub const fn curvature(&self) -> Curvature {
        self.curvature
    }

    /// The scalar `K`.
    #[inline]
    pub const fn k(&self) -> f64 {
        self.curvature.k()
    }

    /// Gyro distance between neighbouring tile centres.
    #[inline]
    pub const fn cell_width(&self) -> f64 {
        self.cell_width
    }

    /// Scale from unit-square coordinates into the Klein model.
    #[inline]
    pub const fn klein_scale(&self) -> f64 {
        self.klein_scale
    }
}

impl Default for CurvatureModel {
    fn default() -> Self {
        Self::EUCLIDEAN
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct ValenceRepr {
    n: u32,
}

impl TryFrom<ValenceRepr> for CurvatureModel {
    type Error = Error;

    fn try_from(repr: ValenceRepr) -> Result<Self> {
        Self::configure(repr.n)
    }
}

impl From<CurvatureModel> for ValenceRepr {
    fn from(model: CurvatureModel) -> Self {
        Self { n: model.n }
    }
}
