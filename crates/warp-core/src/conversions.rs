//! Klein, Poincaré and unit-square model conversions.
//!
//! Gyro translations live in the Poincaré model. Meshes are authored in
//! unit-square coordinates and reach the Poincaré model through the Klein
//! model, scaled by [`CurvatureModel::klein_scale`]. All maps are the
//! identity (up to that scale) in flat space.

use glam::DVec3;

use crate::curvature::{Curvature, CurvatureModel};
use crate::mobius::{atan_k, tan_k};

/// Klein model point to Poincaré model point.
pub fn klein_to_poincare(curvature: Curvature, p: DVec3) -> DVec3 {
    if curvature.is_euclidean() {
        return p;
    }
    let k = curvature.k();
    p / ((1.0 + k * p.length_squared()).max(0.0).sqrt() + 1.0)
}

/// Poincaré model point to Klein model point.
pub fn poincare_to_klein(curvature: Curvature, p: DVec3) -> DVec3 {
    if curvature.is_euclidean() {
        return p;
    }
    let k = curvature.k();
    p * 2.0 / (1.0 - k * p.length_squared())
}

/// Carry a normal `n` at Klein point `p` over to the Poincaré model.
pub fn klein_to_poincare_normal(curvature: Curvature, p: DVec3, n: DVec3) -> DVec3 {
    if curvature.is_euclidean() {
        return n.normalize_or_zero();
    }
    let k = curvature.k();
    let scale = 1.0 + (1.0 + k * p.length_squared()).max(0.0).sqrt();
    (scale * n + (k * n.dot(p)) * p).normalize_or_zero()
}

/// Carry a normal `n` at Poincaré point `p` over to the Klein model.
pub fn poincare_to_klein_normal(curvature: Curvature, p: DVec3, n: DVec3) -> DVec3 {
    if curvature.is_euclidean() {
        return n.normalize_or_zero();
    }
    let k = curvature.k();
    ((1.0 + k * p.length_squared()) * n - (2.0 * k * n.dot(p)) * p).normalize_or_zero()
}

/// Unit-square coordinates to the Klein model.
///
/// With `tan_k_height` the vertical component is treated as an extrusion
/// height and bent by [`tan_k`] so walls stay perpendicular to the ground.
pub fn unit_to_klein(model: &CurvatureModel, p: DVec3, tan_k_height: bool) -> DVec3 {
    let mut p = p * model.klein_scale();
    if model.curvature().is_euclidean() {
        return p;
    }
    if tan_k_height {
        let horizontal = 1.0 + model.k() * (p.x * p.x + p.z * p.z);
        p.y = tan_k(model.curvature(), p.y) * horizontal.sqrt();
    }
    p
}

/// Inverse of [`unit_to_klein`].
pub fn klein_to_unit(model: &CurvatureModel, p: DVec3, tan_k_height: bool) -> DVec3 {
    let mut p = p;
    if tan_k_height && !model.curvature().is_euclidean() {
        let horizontal = 1.0 + model.k() * (p.x * p.x + p.z * p.z);
        p.y = atan_k(model.curvature(), p.y / horizontal.sqrt());
    }
    p / model.klein_scale()
}

pub fn unit_to_poincare(model: &CurvatureModel, u: DVec3, tan_k_height: bool) -> DVec3 {
    klein_to_poincare(model.curvature(), unit_to_klein(model, u, tan_k_height))
}

pub fn poincare_to_unit(model: &CurvatureModel, p: DVec3, tan_k_height: bool) -> DVec3 {
    klein_to_unit(model, poincare_to_klein(model.curvature(), p), tan_k_height)
}

/// Poincaré-model size of a radius `r` object placed at unit point `u`.
pub fn unit_to_poincare_scale(model: &CurvatureModel, u: DVec3, r: f64, tan_k_height: bool) -> f64 {
    if model.curvature().is_euclidean() {
        return r;
    }
    let u = unit_to_klein(model, u, tan_k_height);
    let p = (1.0 + model.k() * u.length_squared()).sqrt();
    r * model.klein_scale() / (p * (p + 1.0))
}

/// Conformal factor of the Poincaré model at `p`.
#[inline]
pub fn poincare_scale_factor(curvature: Curvature, p: DVec3) -> f64 {
    1.0 + curvature.k() * p.length_squared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [Curvature; 3] = [
        Curvature::Spherical,
        Curvature::Euclidean,
        Curvature::Hyperbolic,
    ];

    fn interior_points() -> [DVec3; 4] {
        [
            DVec3::new(0.1, 0.2, -0.3),
            DVec3::new(-0.45, 0.0, 0.2),
            DVec3::new(0.0, -0.6, 0.0),
            DVec3::new(0.3, 0.3, 0.3),
        ]
    }

    #[test]
    fn klein_poincare_roundtrip() {
        for curvature in ALL {
            for p in interior_points() {
                let there = klein_to_poincare(curvature, p);
                assert!(poincare_to_klein(curvature, there).abs_diff_eq(p, 1e-12));

                let back = poincare_to_klein(curvature, p);
                assert!(klein_to_poincare(curvature, back).abs_diff_eq(p, 1e-12));
            }
        }
    }

    #[test]
    fn flat_conversions_are_identity() {
        for p in interior_points() {
            assert_eq!(klein_to_poincare(Curvature::Euclidean, p), p);
            assert_eq!(poincare_to_klein(Curvature::Euclidean, p), p);
            assert_eq!(unit_to_poincare(&CurvatureModel::EUCLIDEAN, p, true), p);
            assert_eq!(poincare_to_unit(&CurvatureModel::EUCLIDEAN, p, true), p);
        }
    }

    #[test]
    fn hyperbolic_poincare_is_inside_klein() {
        let p = DVec3::new(0.5, 0.0, 0.0);
        let q = klein_to_poincare(Curvature::Hyperbolic, p);
        assert!(q.length() < p.length());
        assert!(q.length() > 0.0);
    }

    #[test]
    fn unit_roundtrip() {
        for n in [3, 4, 5, 7] {
            let model = CurvatureModel::configure(n).unwrap();
            for height in [false, true] {
                for p in interior_points() {
                    let u = p * 0.5;
                    let back = poincare_to_unit(&model, unit_to_poincare(&model, u, height), height);
                    assert!(back.abs_diff_eq(u, 1e-10), "n = {n}, height = {height}");
                }
            }
        }
    }

    #[test]
    fn normals_stay_unit() {
        for curvature in ALL {
            let p = DVec3::new(0.2, 0.1, -0.1);
            let n = DVec3::new(0.0, 2.0, 1.0);
            assert_relative_eq!(klein_to_poincare_normal(curvature, p, n).length(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(poincare_to_klein_normal(curvature, p, n).length(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn scale_follows_curvature_sign() {
        let far_point = DVec3::new(1.5, 0.0, 0.0);

        let hyperbolic = CurvatureModel::configure(6).unwrap();
        let near = unit_to_poincare_scale(&hyperbolic, DVec3::ZERO, 1.0, false);
        let far = unit_to_poincare_scale(&hyperbolic, far_point, 1.0, false);
        assert!(far > near);

        let spherical = CurvatureModel::configure(3).unwrap();
        let near = unit_to_poincare_scale(&spherical, DVec3::ZERO, 1.0, false);
        let far = unit_to_poincare_scale(&spherical, far_point, 1.0, false);
        assert!(far < near);

        assert_eq!(unit_to_poincare_scale(&CurvatureModel::EUCLIDEAN, DVec3::X, 0.7, true), 0.7);
        assert_eq!(poincare_scale_factor(Curvature::Euclidean, DVec3::X), 1.0);
    }
}
