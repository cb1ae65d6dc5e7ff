//! Möbius addition and curvature-dependent scalar helpers.
//!
//! Vectors are treated as pure quaternions; `a ⊕ b = (a + b)(1 + K·ab)⁻¹`.
//! Expanding the quaternion product gives
//!
//! ```text
//! c = K (a × b)
//! d = 1 - K (a · b)
//! a ⊕ b = (d t + c × t) / (d² + |c|²),   t = a + b
//! gyr[a, b] = normalize(-c, d)
//! ```
//!
//! Every function branches on [`Curvature::Euclidean`] before touching a
//! curved formula, so flat space never goes through a vanishing denominator.

use glam::{DQuat, DVec3};

use crate::constants::{MIN_DISPLACEMENT, UP};
use crate::curvature::Curvature;

/// Curvature-dependent tangent: `tan`, `tanh` or the identity.
#[inline]
pub fn tan_k(curvature: Curvature, x: f64) -> f64 {
    match curvature {
        Curvature::Spherical => x.tan(),
        Curvature::Euclidean => x,
        Curvature::Hyperbolic => x.tanh(),
    }
}

/// Inverse of [`tan_k`].
#[inline]
pub fn atan_k(curvature: Curvature, x: f64) -> f64 {
    match curvature {
        Curvature::Spherical => x.atan(),
        Curvature::Euclidean => x,
        Curvature::Hyperbolic => x.atanh(),
    }
}

/// The `c` and `d` terms shared by the sum and the gyration.
#[inline]
fn cross_and_denominator(k: f64, a: DVec3, b: DVec3) -> (DVec3, f64) {
    (k * a.cross(b), 1.0 - k * a.dot(b))
}

/// Normalize, falling back to the identity for a degenerate quaternion.
#[inline]
pub(crate) fn normalize_or_identity(q: DQuat) -> DQuat {
    let len_sq = q.length_squared();
    if len_sq > 0.0 && len_sq.is_finite() {
        q * len_sq.sqrt().recip()
    } else {
        DQuat::IDENTITY
    }
}

/// Möbius addition `a ⊕ b`.
///
/// Under positive curvature the denominator vanishes when `a` and `b` are
/// parallel with `a · b = 1`: the sum is the antipode of the origin and
/// comes out non-finite. Collinear steps short of that grow without bound.
pub fn mobius_add(curvature: Curvature, a: DVec3, b: DVec3) -> DVec3 {
    if curvature.is_euclidean() {
        return a + b;
    }
    let (c, d) = cross_and_denominator(curvature.k(), a, b);
    let t = a + b;
    (t * d + c.cross(t)) / (d * d + c.length_squared())
}

/// Holonomy produced by `a ⊕ b`.
pub fn mobius_gyr(curvature: Curvature, a: DVec3, b: DVec3) -> DQuat {
    if curvature.is_euclidean() {
        return DQuat::IDENTITY;
    }
    let (c, d) = cross_and_denominator(curvature.k(), a, b);
    normalize_or_identity(DQuat::from_xyzw(-c.x, -c.y, -c.z, d))
}

/// `a ⊕ b` together with its gyration, sharing the intermediate terms.
pub fn mobius_add_gyr(curvature: Curvature, a: DVec3, b: DVec3) -> (DVec3, DQuat) {
    if curvature.is_euclidean() {
        return (a + b, DQuat::IDENTITY);
    }
    let (c, d) = cross_and_denominator(curvature.k(), a, b);
    let t = a + b;
    let sum = (t * d + c.cross(t)) / (d * d + c.length_squared());
    let gyr = normalize_or_identity(DQuat::from_xyzw(-c.x, -c.y, -c.z, d));
    (sum, gyr)
}

/// Curvature-weighted squared distance between two gyro points.
pub fn mobius_dist_sq(curvature: Curvature, a: DVec3, b: DVec3) -> f64 {
    if curvature.is_euclidean() {
        return a.distance_squared(b);
    }
    let k = curvature.k();
    let a2 = a.length_squared();
    let b2 = b.length_squared();
    let ab = 2.0 * a.dot(b);
    (a2 - ab + b2) / (1.0 + k * (ab + k * a2 * b2))
}

/// Map a Euclidean displacement to a gyro translation of the same heading.
pub fn hyper_translate(curvature: Curvature, displacement: DVec3) -> DVec3 {
    let mag = displacement.length();
    if mag < MIN_DISPLACEMENT {
        return DVec3::ZERO;
    }
    displacement * (tan_k(curvature, mag) / mag)
}

/// Local up direction at gyro point `p`.
pub fn up_vector(curvature: Curvature, p: DVec3) -> DVec3 {
    if curvature.is_euclidean() {
        return UP;
    }
    let k = curvature.k();
    let u = 1.0 + k * p.length_squared();
    let v = -2.0 * k * p.y;
    (u * UP + v * p).try_normalize().unwrap_or(UP)
}

/// Projection of `v` onto `axis`, zero for a degenerate axis.
#[inline]
fn project(v: DVec3, axis: DVec3) -> DVec3 {
    let len_sq = axis.length_squared();
    if len_sq < f64::EPSILON {
        DVec3::ZERO
    } else {
        axis * (v.dot(axis) / len_sq)
    }
}

/// Twist of `q` about `axis` (the swing-twist decomposition, twist half).
pub fn swing_twist(q: DQuat, axis: DVec3) -> DQuat {
    let p = project(q.xyz(), axis);
    normalize_or_identity(DQuat::from_xyzw(p.x, p.y, p.z, q.w))
}

/// Drop the vertical Klein component of `p`, rescaling onto the ground plane.
pub fn project_to_plane(curvature: Curvature, p: DVec3) -> DVec3 {
    if curvature.is_euclidean() {
        return DVec3::new(p.x, 0.0, p.z);
    }
    let k = curvature.k();
    let m = k * p.length_squared();
    let d = 1.0 + m;
    let s = 2.0 / (1.0 - m + (d * d - 4.0 * k * p.y * p.y).sqrt());
    DVec3::new(p.x * s, 0.0, p.z * s)
}
