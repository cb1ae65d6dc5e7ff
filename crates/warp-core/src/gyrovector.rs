//! Gyrovectors: a translation in curved space plus the holonomy it carries.
//!
//! Composition is neither commutative nor associative. Every supported
//! operand pairing goes through [`compose`], whose match arms fix the
//! evaluation order for that pairing.

use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::constants::UP;
use crate::curvature::Curvature;
use crate::mobius::{
    hyper_translate, mobius_add, mobius_add_gyr, normalize_or_identity, project_to_plane,
    swing_twist, up_vector,
};

/// Position and accumulated rotation in constant-curvature space.
///
/// The rotation is renormalized on every construction, deserialization
/// included.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGyroVector")]
pub struct GyroVector {
    translation: DVec3,
    rotation: DQuat,
}

/// Field-for-field mirror of [`GyroVector`] as it appears on the wire.
#[derive(Deserialize)]
struct RawGyroVector {
    translation: DVec3,
    rotation: DQuat,
}

impl From<RawGyroVector> for GyroVector {
    fn from(raw: RawGyroVector) -> Self {
        Self::new(raw.translation, raw.rotation)
    }
}

impl Default for GyroVector {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl GyroVector {
    /// No translation, no rotation.
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    #[inline]
    pub fn new(translation: DVec3, rotation: DQuat) -> Self {
        Self {
            translation,
            rotation: normalize_or_identity(rotation),
        }
    }

    #[inline]
    pub const fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            rotation: DQuat::IDENTITY,
        }
    }

    #[inline]
    pub fn from_rotation(rotation: DQuat) -> Self {
        Self::new(DVec3::ZERO, rotation)
    }

    /// Gyro translation (Poincaré model).
    #[inline]
    pub const fn translation(&self) -> DVec3 {
        self.translation
    }

    /// Holonomy, always unit length.
    #[inline]
    pub const fn rotation(&self) -> DQuat {
        self.rotation
    }

    /// The translation seen through the rotation.
    #[inline]
    pub fn point(&self) -> DVec3 {
        self.rotation * self.translation
    }

    /// Algebraic inverse: `(-(rotation · translation), rotation⁻¹)`.
    #[inline]
    pub fn inverse(&self) -> Self {
        Self::new(-(self.rotation * self.translation), self.rotation.inverse())
    }

    /// `self ⊕ rhs`
    #[inline]
    pub fn add(self, curvature: Curvature, rhs: impl Into<Operand>) -> Self {
        compose(curvature, self, rhs)
    }

    /// `self ⊖ rhs`
    #[inline]
    pub fn sub(self, curvature: Curvature, rhs: impl Into<Operand>) -> Self {
        subtract(curvature, self, rhs)
    }

    /// Squared length of `(self ⊖ other).translation`, the tile identity metric.
    #[inline]
    pub fn separation_sq(&self, curvature: Curvature, other: &Self) -> f64 {
        self.sub(curvature, *other).translation.length_squared()
    }

    /// Move a point by this gyrovector.
    pub fn apply(&self, curvature: Curvature, point: DVec3) -> DVec3 {
        self.rotation * mobius_add(curvature, self.translation, point)
    }

    /// Move a point and its surface normal by this gyrovector.
    pub fn transform_normal(&self, curvature: Curvature, point: DVec3, normal: DVec3) -> (DVec3, DVec3) {
        let (moved, gyr) = mobius_add_gyr(curvature, self.translation, point);
        let new_point = self.rotation * moved;
        let new_normal = self.rotation * (gyr.inverse() * normal);
        (new_point, new_normal)
    }

    /// Re-derive the rotation so the local up axis matches ambient up.
    ///
    /// Keeps only the twist of the current rotation about the local up
    /// direction, so repeated movement never accumulates roll.
    pub fn align_up_vector(&mut self, curvature: Curvature) {
        let local_up = up_vector(curvature, self.translation);

        let axis = local_up.cross(UP);
        let w = (local_up.length_squared() * UP.length_squared()).sqrt() + local_up.dot(UP);
        let basis = normalize_or_identity(DQuat::from_xyzw(axis.x, axis.y, axis.z, w));

        let twist = swing_twist(self.rotation, local_up);
        self.rotation = normalize_or_identity(basis * twist);
    }

    /// One locomotion step by a Euclidean `displacement` in the local frame.
    ///
    /// The traveller is kept on or below the ground plane and upright.
    pub fn travel(self, curvature: Curvature, displacement: DVec3) -> Self {
        let delta = hyper_translate(curvature, displacement);
        let mut next = self.sub(curvature, delta);
        next.translation.y = next.translation.y.min(0.0);
        next.align_up_vector(curvature);
        next
    }

    /// Flatten onto the ground plane, dropping out-of-plane rotation.
    pub fn project_to_plane(&self, curvature: Curvature) -> Self {
        Self::new(
            project_to_plane(curvature, self.translation),
            DQuat::from_xyzw(0.0, self.rotation.y, 0.0, self.rotation.w),
        )
    }

    /// Translation and rotation interpolated independently.
    pub fn slerp(a: &Self, b: &Self, t: f64) -> Self {
        Self::new(
            a.translation.lerp(b.translation, t),
            a.rotation.slerp(b.rotation, t),
        )
    }

    /// Interpolate along `b ⊖ a`, then re-anchor at `a`.
    pub fn slerp_reverse(curvature: Curvature, a: &Self, b: &Self, t: f64) -> Self {
        let step = Self::slerp(&Self::IDENTITY, &b.sub(curvature, *a), t);
        step.add(curvature, *a)
    }

    /// Rigid transform with uniform scale 1.
    #[inline]
    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Shader-facing copy of [`Self::to_matrix`].
    #[inline]
    pub fn uniforms(&self) -> GyroUniforms {
        GyroUniforms::from(self)
    }
}

/// One side of a gyro composition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand {
    Gyro(GyroVector),
    Translation(DVec3),
    Rotation(DQuat),
}

impl Operand {
    /// Algebraic inverse of this operand.
    pub fn inverse(self) -> Self {
        match self {
            Self::Gyro(g) => Self::Gyro(g.inverse()),
            Self::Translation(d) => Self::Translation(-d),
            Self::Rotation(r) => Self::Rotation(r.inverse()),
        }
    }

    /// The operand as a full gyrovector.
    pub fn lift(self) -> GyroVector {
        match self {
            Self::Gyro(g) => g,
            Self::Translation(d) => GyroVector::from_translation(d),
            Self::Rotation(r) => GyroVector::from_rotation(r),
        }
    }
}

impl From<GyroVector> for Operand {
    fn from(g: GyroVector) -> Self {
        Self::Gyro(g)
    }
}

impl From<DVec3> for Operand {
    fn from(d: DVec3) -> Self {
        Self::Translation(d)
    }
}

impl From<DQuat> for Operand {
    fn from(r: DQuat) -> Self {
        Self::Rotation(r)
    }
}

/// `lhs ⊕ rhs` under `curvature`.
///
/// Pairings without an arm of their own (translation with translation,
/// rotation with rotation, translation with rotation) are lifted to
/// gyrovectors first.
pub fn compose(curvature: Curvature, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> GyroVector {
    match (lhs.into(), rhs.into()) {
        // Delta moved into the local frame, then added on the right
        (Operand::Gyro(g), Operand::Translation(delta)) => {
            let (translation, gyr) =
                mobius_add_gyr(curvature, g.translation, g.rotation.inverse() * delta);
            GyroVector::new(translation, g.rotation * gyr)
        }
        // Delta added on the left
        (Operand::Translation(delta), Operand::Gyro(g)) => {
            let (translation, gyr) = mobius_add_gyr(curvature, delta, g.translation);
            GyroVector::new(translation, g.rotation * gyr)
        }
        (Operand::Gyro(g), Operand::Rotation(r)) => GyroVector::new(g.translation, r * g.rotation),
        (Operand::Rotation(r), Operand::Gyro(g)) => {
            GyroVector::new(r.inverse() * g.translation, g.rotation * r)
        }
        (Operand::Gyro(a), Operand::Gyro(b)) => {
            let (translation, gyr) =
                mobius_add_gyr(curvature, a.translation, a.rotation.inverse() * b.translation);
            GyroVector::new(translation, (b.rotation * a.rotation) * gyr)
        }
        (lhs, rhs) => compose(curvature, lhs.lift(), rhs.lift()),
    }
}

/// `lhs ⊖ rhs`, defined as `lhs ⊕ inverse(rhs)`.
pub fn subtract(curvature: Curvature, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> GyroVector {
    compose(curvature, lhs, rhs.into().inverse())
}

/// Column-major transform blob for shader parameters.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GyroUniforms {
    pub transform: [[f32; 4]; 4],
}

impl GyroUniforms {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl From<&GyroVector> for GyroUniforms {
    fn from(g: &GyroVector) -> Self {
        Self {
            transform: g.to_matrix().as_mat4().to_cols_array_2d(),
        }
    }
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

    fn samples() -> Vec<GyroVector> {
        vec![
            GyroVector::IDENTITY,
            GyroVector::from_translation(DVec3::new(0.2, 0.0, -0.1)),
            GyroVector::new(
                DVec3::new(-0.15, 0.05, 0.3),
                DQuat::from_euler(glam::EulerRot::YXZ, 0.7, -0.2, 0.1),
            ),
            GyroVector::new(DVec3::new(0.3, -0.25, 0.0), DQuat::from_rotation_z(1.3)),
        ]
    }

    fn deltas() -> [DVec3; 3] {
        [
            DVec3::new(0.25, 0.0, 0.0),
            DVec3::new(0.0, 0.0, -0.3),
            DVec3::new(0.1, 0.2, 0.15),
        ]
    }

    fn assert_gyro_eq(a: &GyroVector, b: &GyroVector, eps: f64) {
        assert!(
            a.translation().abs_diff_eq(b.translation(), eps),
            "translation {} != {}",
            a.translation(),
            b.translation()
        );
        let (p, q) = (a.rotation(), b.rotation());
        assert!(
            p.abs_diff_eq(q, eps) || p.abs_diff_eq(-q, eps),
            "rotation {p} != {q}"
        );
    }

    #[test]
    fn translation_roundtrip() {
        for curvature in ALL {
            for g in samples() {
                for d in deltas() {
                    let back = g.add(curvature, d).sub(curvature, d);
                    assert_gyro_eq(&back, &g, 1e-12);
                }
            }
        }
    }

    #[test]
    fn composing_with_inverse_is_identity() {
        for curvature in ALL {
            for g in samples() {
                let id = g.add(curvature, g.inverse());
                assert_gyro_eq(&id, &GyroVector::IDENTITY, 1e-12);
            }
        }
    }

    #[test]
    fn difference_reanchors() {
        for curvature in ALL {
            for a in samples() {
                for b in samples() {
                    let back = b.sub(curvature, a).add(curvature, a);
                    assert_gyro_eq(&back, &b, 1e-12);
                }
            }
        }
    }

    #[test]
    fn explicit_arms_agree_with_lifted_form() {
        let r = DQuat::from_rotation_y(0.6);
        for curvature in ALL {
            for g in samples() {
                for d in deltas() {
                    let t = GyroVector::from_translation(d);
                    assert_gyro_eq(&compose(curvature, g, d), &compose(curvature, g, t), 1e-14);
                    assert_gyro_eq(&compose(curvature, d, g), &compose(curvature, t, g), 1e-14);
                }
                let lifted = GyroVector::from_rotation(r);
                assert_gyro_eq(&compose(curvature, g, r), &compose(curvature, g, lifted), 1e-14);
                assert_gyro_eq(&compose(curvature, r, g), &compose(curvature, lifted, g), 1e-14);
            }
        }
    }

    #[test]
    fn composition_is_order_sensitive() {
        let a = GyroVector::from_translation(DVec3::new(0.3, 0.0, 0.0));
        let b = GyroVector::from_translation(DVec3::new(0.0, 0.0, 0.3));
        let ab = a.add(Curvature::Hyperbolic, b);
        let ba = b.add(Curvature::Hyperbolic, a);
        assert!(!ab.rotation().abs_diff_eq(ba.rotation(), 1e-6));

        // Flat space commutes for pure translations
        let ab = a.add(Curvature::Euclidean, b);
        let ba = b.add(Curvature::Euclidean, a);
        assert_gyro_eq(&ab, &ba, 1e-15);
    }

    #[test]
    fn flat_composition_is_rigid_motion() {
        let g = GyroVector::new(DVec3::new(1.0, 0.0, 2.0), DQuat::from_rotation_y(0.5));
        let d = DVec3::new(0.0, 0.0, 3.0);
        let moved = g.add(Curvature::Euclidean, d);
        let expected = g.translation() + g.rotation().inverse() * d;
        assert!(moved.translation().abs_diff_eq(expected, 1e-12));
        assert!(moved.rotation().abs_diff_eq(g.rotation(), 1e-12));
    }

    #[test]
    fn rotation_only_pairings() {
        let g = samples()[2];
        let r = DQuat::from_rotation_x(0.4);
        let right = compose(Curvature::Hyperbolic, g, r);
        assert_eq!(right.translation(), g.translation());

        let left = compose(Curvature::Hyperbolic, r, g);
        assert!(left.translation().abs_diff_eq(r.inverse() * g.translation(), 1e-15));

        let both = compose(Curvature::Hyperbolic, r, r);
        assert!(both.rotation().abs_diff_eq(r * r, 1e-12));
    }

    #[test]
    fn rotation_stays_unit_over_long_chains() {
        let step = DVec3::new(0.01, 0.0, 0.013);
        let mut g = GyroVector::new(DVec3::ZERO, DQuat::from_rotation_y(0.2));
        // Turning fast enough to stay on a closed loop
        for _ in 0..5000 {
            g = g.add(Curvature::Hyperbolic, step);
            g = g.add(Curvature::Hyperbolic, DQuat::from_rotation_y(0.05));
        }
        assert_relative_eq!(g.rotation().length(), 1.0, epsilon = 1e-12);
        assert!(g.translation().is_finite());
        assert!(g.translation().length() < 1.0);
    }

    #[test]
    fn separation_is_zero_for_same_position() {
        for curvature in ALL {
            for g in samples() {
                assert!(g.separation_sq(curvature, &g) < 1e-24);
            }
        }
        let a = GyroVector::from_translation(DVec3::new(2.0, 0.0, 0.0));
        assert_eq!(a.separation_sq(Curvature::Euclidean, &GyroVector::IDENTITY), 4.0);
    }

    #[test]
    fn align_up_matches_local_up() {
        for curvature in ALL {
            for g in samples() {
                let mut aligned = g;
                aligned.align_up_vector(curvature);
                let local_up = up_vector(curvature, aligned.translation());
                assert!(
                    (aligned.rotation() * local_up).abs_diff_eq(UP, 1e-12),
                    "{curvature:?}"
                );
            }
        }
    }

    #[test]
    fn align_up_removes_roll_and_keeps_yaw() {
        let yaw = DQuat::from_rotation_y(0.9);
        let rolled = GyroVector::from_rotation(DQuat::from_rotation_z(0.3) * yaw);
        let mut aligned = rolled;
        aligned.align_up_vector(Curvature::Hyperbolic);
        let forward = aligned.rotation() * DVec3::Z;
        assert_relative_eq!(forward.y, 0.0, epsilon = 1e-12);

        let mut upright = GyroVector::from_rotation(yaw);
        upright.align_up_vector(Curvature::Spherical);
        assert!(upright.rotation().abs_diff_eq(yaw, 1e-12));
    }

    #[test]
    fn travel_never_accumulates_roll() {
        for curvature in [Curvature::Spherical, Curvature::Hyperbolic] {
            let mut g = GyroVector::from_rotation(DQuat::from_rotation_y(0.3));
            for i in 0..400 {
                let heading = f64::from(i) * 0.05;
                let step = DVec3::new(heading.sin(), 0.0, heading.cos()) * 0.02;
                g = g.travel(curvature, step);
                let local_up = up_vector(curvature, g.translation());
                assert!((g.rotation() * local_up).abs_diff_eq(UP, 1e-9));
                assert!(g.translation().y <= 0.0);
            }
        }
    }

    #[test]
    fn travel_without_movement_only_aligns() {
        let g = GyroVector::from_rotation(DQuat::from_rotation_y(1.1));
        let still = g.travel(Curvature::Hyperbolic, DVec3::new(1e-7, 0.0, 0.0));
        assert_gyro_eq(&still, &g, 1e-12);
    }

    #[test]
    fn apply_matches_composition() {
        for curvature in ALL {
            let g = GyroVector::from_translation(DVec3::new(0.1, 0.0, 0.2));
            let p = DVec3::new(-0.2, 0.0, 0.05);
            let expected = mobius_add(curvature, g.translation(), p);
            assert!(g.apply(curvature, p).abs_diff_eq(expected, 1e-15));
            let (point, normal) = g.transform_normal(curvature, p, UP);
            assert!(point.abs_diff_eq(expected, 1e-15));
            assert_relative_eq!(normal.length(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn project_to_plane_keeps_yaw_only() {
        let g = GyroVector::new(
            DVec3::new(0.2, -0.1, 0.1),
            DQuat::from_rotation_y(0.4) * DQuat::from_rotation_x(0.2),
        );
        let flat = g.project_to_plane(Curvature::Hyperbolic);
        assert_eq!(flat.translation().y, 0.0);
        assert_eq!(flat.rotation().x, 0.0);
        assert_eq!(flat.rotation().z, 0.0);
        assert_relative_eq!(flat.rotation().length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn slerp_endpoints() {
        let s = samples();
        let (a, b) = (s[2], s[3]);
        assert_gyro_eq(&GyroVector::slerp(&a, &b, 0.0), &a, 1e-12);
        assert_gyro_eq(&GyroVector::slerp(&a, &b, 1.0), &b, 1e-12);

        for curvature in ALL {
            assert_gyro_eq(&GyroVector::slerp_reverse(curvature, &a, &b, 0.0), &a, 1e-12);
            assert_gyro_eq(&GyroVector::slerp_reverse(curvature, &a, &b, 1.0), &b, 1e-12);
        }
    }

    #[test]
    fn slerp_takes_shortest_path() {
        let a = GyroVector::from_rotation(DQuat::from_rotation_y(0.1));
        let b = GyroVector::from_rotation(-DQuat::from_rotation_y(0.3));
        let mid = GyroVector::slerp(&a, &b, 0.5);
        let expected = DQuat::from_rotation_y(0.2);
        let q = mid.rotation();
        assert!(q.abs_diff_eq(expected, 1e-12) || q.abs_diff_eq(-expected, 1e-12));
    }

    #[test]
    fn uniforms_hold_the_rigid_transform() {
        let g = GyroVector::new(DVec3::new(0.5, -0.25, 0.125), DQuat::from_rotation_y(0.5));
        let uniforms = g.uniforms();
        assert_eq!(uniforms.as_bytes().len(), 64);
        assert_eq!(uniforms.transform[3], [0.5, -0.25, 0.125, 1.0]);

        let m = g.to_matrix();
        let p = DVec3::new(1.0, 2.0, 3.0);
        assert!(m.transform_point3(p).abs_diff_eq(g.rotation() * p + g.translation(), 1e-12));
        assert_eq!(GyroVector::IDENTITY.uniforms().transform, glam::Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn deserialize_renormalizes_rotation() {
        let translation = DVec3::new(0.1, 0.0, 0.2);
        let bytes = bincode::serialize(&(translation, DQuat::from_xyzw(0.0, 0.0, 0.0, 3.0))).unwrap();
        let g: GyroVector = bincode::deserialize(&bytes).unwrap();
        assert_eq!(g.translation(), translation);
        assert!(g.rotation().abs_diff_eq(DQuat::IDENTITY, 1e-15));

        let bytes = bincode::serialize(&(translation, DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0))).unwrap();
        let g: GyroVector = bincode::deserialize(&bytes).unwrap();
        assert_eq!(g.rotation(), DQuat::IDENTITY);
    }

    #[test]
    fn serde_keeps_valid_gyrovectors() {
        let g = GyroVector::new(DVec3::new(-0.3, 0.05, 0.1), DQuat::from_rotation_y(0.7));
        let back: GyroVector = bincode::deserialize(&bincode::serialize(&g).unwrap()).unwrap();
        assert!(back.translation().abs_diff_eq(g.translation(), 1e-15));
        assert!(back.rotation().abs_diff_eq(g.rotation(), 1e-15));
        assert_relative_eq!(back.rotation().length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_rotation_becomes_identity() {
        let g = GyroVector::new(DVec3::X, DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(g.rotation(), DQuat::IDENTITY);
    }
}
