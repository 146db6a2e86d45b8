//! Exact quarter-turn rotations.
//!
//! Piece rotation must be bit-exact, so these matrices are assembled from a
//! `(cos, sin)` table instead of trigonometry. Entries are always 0 or ±1.

use glam::{IVec3, Mat4, Vec3, Vec4};

use crate::types::Axis;

/// `(cos, sin)` of `turns` quarter turns.
#[inline]
fn cos_sin(turns: i32) -> (f32, f32) {
    match turns.rem_euclid(4) {
        0 => (1.0, 0.0),
        1 => (0.0, 1.0),
        2 => (-1.0, 0.0),
        _ => (0.0, -1.0),
    }
}

/// Rotation by `turns` × 90° about `axis`, right-handed.
pub fn quarter_turn(axis: Axis, turns: i32) -> Mat4 {
    let (c, s) = cos_sin(turns);
    match axis {
        Axis::X => Mat4::from_cols(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, c, s, 0.0),
            Vec4::new(0.0, -s, c, 0.0),
            Vec4::W,
        ),
        Axis::Y => Mat4::from_cols(
            Vec4::new(c, 0.0, -s, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(s, 0.0, c, 0.0),
            Vec4::W,
        ),
        Axis::Z => Mat4::from_cols(
            Vec4::new(c, s, 0.0, 0.0),
            Vec4::new(-s, c, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::W,
        ),
    }
}

/// Rotate a voxel offset: the voxel centre is rotated, then floored back.
#[inline]
pub fn rotate_voxel(m: &Mat4, offset: IVec3) -> IVec3 {
    m.transform_point3(offset.as_vec3() + Vec3::splat(0.5))
        .floor()
        .as_ivec3()
}

/// Rotate a mesh vertex and snap it to the integer lattice.
#[inline]
pub fn rotate_corner(m: &Mat4, v: Vec3) -> Vec3 {
    m.transform_point3(v).round()
}
