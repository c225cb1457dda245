//! 4x4 homogeneous transforms
//!
//! Row-major `[[f64; 4]; 4]` matrices acting on column vectors, so a chain
//! `parent · local` applies `local` first.

use crate::rig::{Axis, Vec3};

/// Row-major homogeneous transform
pub type Mat4 = [[f64; 4]; 4];

/// Identity transform.
pub fn identity() -> Mat4 {
    let mut m = [[0.0; 4]; 4];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    m
}

/// Matrix product `a · b`.
pub fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Pure translation.
pub fn translation(t: Vec3) -> Mat4 {
    let mut m = identity();
    m[0][3] = t[0];
    m[1][3] = t[1];
    m[2][3] = t[2];
    m
}

/// Elementary rotation about one axis.
///
/// # Arguments
///
/// * `axis` - Rotation axis
/// * `degrees` - Angle in degrees (right-handed)
pub fn rotation(axis: Axis, degrees: f64) -> Mat4 {
    let (s, c) = degrees.to_radians().sin_cos();
    let mut m = identity();
    match axis {
        Axis::X => {
            m[1][1] = c;
            m[1][2] = -s;
            m[2][1] = s;
            m[2][2] = c;
        }
        Axis::Y => {
            m[0][0] = c;
            m[0][2] = s;
            m[2][0] = -s;
            m[2][2] = c;
        }
        Axis::Z => {
            m[0][0] = c;
            m[0][1] = -s;
            m[1][0] = s;
            m[1][1] = c;
        }
    }
    m
}

/// Compose elementary rotations in channel order
///
/// The result is `R[order[0]] · R[order[1]] · R[order[2]]`, where the angle of
/// each factor is looked up by axis in `angles` (`[x, y, z]`, degrees).
/// Reordering the channels changes the result because rotations do not
/// commute.
pub fn rotation_from_channels(angles: Vec3, order: &[Axis]) -> Mat4 {
    order.iter().fold(identity(), |acc, &axis| {
        mul(&acc, &rotation(axis, angles[axis.index()]))
    })
}

/// Local joint transform `T(translation) · R`.
pub fn local_transform(translation_vec: Vec3, rotation_m: &Mat4) -> Mat4 {
    let mut m = *rotation_m;
    m[0][3] = translation_vec[0];
    m[1][3] = translation_vec[1];
    m[2][3] = translation_vec[2];
    m
}

/// Translation column of a transform.
pub fn origin(m: &Mat4) -> Vec3 {
    [m[0][3], m[1][3], m[2][3]]
}

/// Apply a transform to a point.
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    let mut out = [0.0; 3];
    for (i, o) in out.iter_mut().enumerate() {
        *o = m[i][0] * p[0] + m[i][1] * p[1] + m[i][2] * p[2] + m[i][3];
    }
    out
}
