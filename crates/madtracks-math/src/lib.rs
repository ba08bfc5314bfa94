#![warn(missing_docs)]

//! Coordinate and rotation math for Mad Tracks level files.
//!
//! Thin wrappers around nalgebra. The game stores positions and orientations
//! in its own axis convention (Y up, Z forward, X mirrored); host scenes use a
//! right-handed Z-up convention. This crate converts between the two and
//! between the three rotation representations the level pipeline uses:
//! direction-vector pairs, rotation matrices and axis-angle / Euler XYZ.

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 3x3 rotation matrix.
pub type Mat3 = Matrix3<f64>;

/// Tolerance constants for rotation extraction.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Below this cross-product magnitude two directions count as parallel.
    pub parallel: f64,
    /// Angular tolerance in radians used to detect the 0 and π special cases.
    pub angular: f64,
}

impl Tolerance {
    /// Tolerances used by the level importer (1e-6 parallel, 1e-8 rad angular).
    pub const DEFAULT: Self = Self {
        parallel: 1e-6,
        angular: 1e-8,
    };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Canonical forward axis of a game object, in game space.
pub fn canonical_forward() -> Vec3 {
    Vec3::z()
}

// ---------------------------------------------------------------------------
// Axis conventions
// ---------------------------------------------------------------------------

/// Convert a direction from game space to host space.
///
/// Mirrors X and swaps Y/Z. The mapping is its own inverse and is a proper
/// rotation (determinant +1), so rotations conjugated by it stay rotations.
pub fn to_host_axis(v: &Vec3) -> Vec3 {
    Vec3::new(-v.x, v.z, v.y)
}

/// Convert a direction from host space back to game space.
pub fn to_game_axis(v: &Vec3) -> Vec3 {
    Vec3::new(-v.x, v.z, v.y)
}

/// Convert a game-space position to host space, applying `scale`.
pub fn to_host_coord(v: &Vec3, scale: f64) -> Vec3 {
    to_host_axis(v) * scale
}

/// Convert a host-space position to game space, undoing `scale`.
pub fn to_game_coord(v: &Vec3, scale: f64) -> Vec3 {
    to_game_axis(v) / scale
}

/// Matrix form of [`to_host_axis`].
pub fn axis_swap_matrix() -> Mat3 {
    Mat3::new(
        -1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, //
        0.0, 1.0, 0.0,
    )
}

/// Express a game-space rotation matrix in host space (`P * m * Pᵀ`).
pub fn rotation_to_host(m: &Mat3) -> Mat3 {
    let p = axis_swap_matrix();
    p * m * p.transpose()
}

// ---------------------------------------------------------------------------
// Elementary rotations
// ---------------------------------------------------------------------------

/// Rotation about the X axis by `angle` radians.
pub fn rotation_x(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(
        1.0, 0.0, 0.0, //
        0.0, c, -s, //
        0.0, s, c,
    )
}

/// Rotation about the Y axis by `angle` radians.
pub fn rotation_y(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(
        c, 0.0, s, //
        0.0, 1.0, 0.0, //
        -s, 0.0, c,
    )
}

/// Rotation about the Z axis by `angle` radians.
pub fn rotation_z(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(
        c, -s, 0.0, //
        s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Rotation about an arbitrary axis through the origin by `angle` radians.
///
/// Uses Rodrigues' rotation formula.
pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    let (x, y, z) = (axis.as_ref().x, axis.as_ref().y, axis.as_ref().z);
    Mat3::new(
        t * x * x + c,
        t * x * y - s * z,
        t * x * z + s * y,
        t * x * y + s * z,
        t * y * y + c,
        t * y * z - s * x,
        t * x * z - s * y,
        t * y * z + s * x,
        t * z * z + c,
    )
}

/// Matrix of the Euler XYZ rotation `euler` (radians): X first, then Y, then Z.
pub fn euler_xyz_matrix(euler: &Vec3) -> Mat3 {
    rotation_z(euler.z) * rotation_y(euler.y) * rotation_x(euler.x)
}

/// Rotate `v` by the Euler XYZ rotation `euler` (radians).
pub fn rotate_euler_xyz(v: &Vec3, euler: &Vec3) -> Vec3 {
    euler_xyz_matrix(euler) * v
}

/// Decompose a rotation matrix into Euler XYZ angles (radians).
///
/// Inverse of [`euler_xyz_matrix`] up to the usual gimbal ambiguity.
pub fn euler_from_rotation_matrix(m: &Mat3) -> Vec3 {
    let (roll, pitch, yaw) = Rotation3::from_matrix_unchecked(*m).euler_angles();
    Vec3::new(roll, pitch, yaw)
}

/// Convert a vector of angles in degrees to radians.
pub fn degrees_to_radians(v: &Vec3) -> Vec3 {
    v.map(f64::to_radians)
}

// ---------------------------------------------------------------------------
// Direction vectors <-> matrices <-> axis-angle
// ---------------------------------------------------------------------------

/// Build the rotation that turns [`canonical_forward`] into `direction_at`.
///
/// The rotation axis is `forward × direction_at`. When the two are
/// (anti)parallel the cross product vanishes and `direction_up` is used as the
/// axis instead; if that is degenerate too, +Y is used. Only the forward
/// direction is matched; roll around it is not recovered from `direction_up`.
pub fn rotation_matrix_from_directions(direction_at: &Vec3, direction_up: &Vec3) -> Mat3 {
    let tol = Tolerance::DEFAULT;
    let forward = canonical_forward();
    let at = if direction_at.norm() > tol.parallel {
        direction_at.normalize()
    } else {
        forward
    };

    let cross = forward.cross(&at);
    let axis = if cross.norm() < tol.parallel {
        if direction_up.norm() > tol.parallel {
            Dir3::new_normalize(*direction_up)
        } else {
            Vec3::y_axis()
        }
    } else {
        Dir3::new_normalize(cross)
    };

    let angle = forward.dot(&at).clamp(-1.0, 1.0).acos();
    rotation_about_axis(&axis, angle)
}

/// A rotation expressed as a unit axis and an angle in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    /// Rotation axis.
    pub axis: Dir3,
    /// Rotation angle in radians, in `[0, π]`.
    pub angle: f64,
}

impl AxisAngle {
    /// Rotation matrix of this axis-angle pair.
    pub fn to_matrix(&self) -> Mat3 {
        rotation_about_axis(&self.axis, self.angle)
    }
}

/// Extract the axis-angle form of a rotation matrix.
///
/// For a near-zero angle the axis is arbitrary and `(0, 0, 1)` is returned.
/// Near π the skew-symmetric part vanishes and the axis is read from the
/// eigenvector for eigenvalue 1, i.e. a column of `(m + I) / 2`.
pub fn axis_angle_from_rotation_matrix(m: &Mat3) -> AxisAngle {
    let tol = Tolerance::DEFAULT;
    let angle = ((m.trace() - 1.0) / 2.0).clamp(-1.0, 1.0).acos();

    let axis = if angle.abs() < tol.angular {
        Vec3::z_axis()
    } else if (std::f64::consts::PI - angle).abs() < tol.angular {
        let sym = (m + Mat3::identity()) / 2.0;
        let col = (0..3)
            .max_by(|&a, &b| sym[(a, a)].total_cmp(&sym[(b, b)]))
            .unwrap_or(2);
        Dir3::new_normalize(sym.column(col).into_owned())
    } else {
        Dir3::new_normalize(Vec3::new(
            m[(2, 1)] - m[(1, 2)],
            m[(0, 2)] - m[(2, 0)],
            m[(1, 0)] - m[(0, 1)],
        ))
    };

    AxisAngle { axis, angle }
}

/// Direction vectors of an Euler XYZ rotation (radians), in host space.
///
/// Applies X, then Y, then Z to the host-space forward `(0, 1, 0)` and up
/// `(0, 0, 1)`. Returns `(direction_at, direction_up)`. This is the export
/// counterpart of [`rotation_matrix_from_directions`].
pub fn euler_to_direction_vectors(euler: &Vec3) -> (Vec3, Vec3) {
    let m = euler_xyz_matrix(euler);
    (m * Vec3::y(), m * Vec3::z())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_vec_eq<const R: usize, const C: usize>(
        a: &nalgebra::SMatrix<f64, R, C>,
        b: &nalgebra::SMatrix<f64, R, C>,
        tol: f64,
    ) {
        assert!((a - b).norm() < tol, "{a:?} != {b:?}");
    }

    #[test]
    fn test_axis_conversion_is_involution() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let host = to_host_axis(&v);
        assert_vec_eq(&host, &Vec3::new(-1.0, 3.0, 2.0), 1e-12);
        assert_vec_eq(&to_game_axis(&host), &v, 1e-12);
        assert!((axis_swap_matrix().determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_coord_scale() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let host = to_host_coord(&v, 0.5);
        assert_vec_eq(&host, &Vec3::new(-0.5, 1.5, 1.0), 1e-12);
        assert_vec_eq(&to_game_coord(&host, 0.5), &v, 1e-12);
    }

    #[test]
    fn test_rotation_about_axis() {
        // Rotate (1,0,0) by 90° about Z axis → (0,1,0)
        let axis = Vec3::z_axis();
        let m = rotation_about_axis(&axis, PI / 2.0);
        assert_vec_eq(&(m * Vec3::x()), &Vec3::y(), 1e-12);
        assert_vec_eq(&m, &rotation_z(PI / 2.0), 1e-12);
    }

    #[test]
    fn test_identity_from_canonical_forward() {
        let m = rotation_matrix_from_directions(&Vec3::new(0.0, 0.0, 1.0), &Vec3::new(0.0, 1.0, 0.0));
        assert!((m - Mat3::identity()).norm() < 1e-12);

        let aa = axis_angle_from_rotation_matrix(&m);
        assert!(aa.angle.abs() < 1e-8);
        assert_vec_eq(aa.axis.as_ref(), &Vec3::z(), 1e-12);
    }

    #[test]
    fn test_antiparallel_uses_up_axis() {
        let at = Vec3::new(0.0, 0.0, -1.0);
        let up = Vec3::new(0.0, 1.0, 0.0);
        let m = rotation_matrix_from_directions(&at, &up);
        assert_vec_eq(&(m * canonical_forward()), &at, 1e-12);
        assert_vec_eq(&(m * up), &up, 1e-12);

        let aa = axis_angle_from_rotation_matrix(&m);
        assert!((aa.angle - PI).abs() < 1e-8);
        assert!((aa.axis.as_ref().y.abs() - 1.0).abs() < 1e-9);
        assert_vec_eq(&(aa.to_matrix() * canonical_forward()), &at, 1e-9);
    }

    #[test]
    fn test_degenerate_rotation_without_up() {
        // Antiparallel with no usable up vector: falls back to +Y, still valid.
        let at = Vec3::new(0.0, 0.0, -1.0);
        let m = rotation_matrix_from_directions(&at, &Vec3::zeros());
        assert_vec_eq(&(m * canonical_forward()), &at, 1e-12);
        assert!((m.determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_axis_angle_reconstructs_direction() {
        let s = 0.5_f64.sqrt();
        let cases = [
            (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
            (Vec3::new(-s, 0.0, s), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.6, 0.0, 0.8), Vec3::new(0.0, 1.0, 0.0)),
            (
                Vec3::new(0.0, -0.035014, -0.999387),
                Vec3::new(0.0, 0.999387, -0.035014),
            ),
            (
                Vec3::new(1.0, 1.0, 1.0).normalize(),
                Vec3::new(1.0, -1.0, 0.0).normalize(),
            ),
        ];
        for (at, up) in cases {
            let m = rotation_matrix_from_directions(&at, &up);
            let aa = axis_angle_from_rotation_matrix(&m);
            let forward = aa.to_matrix() * canonical_forward();
            assert_vec_eq(&forward, &at.normalize(), 1e-4);
        }
    }

    #[test]
    fn test_euler_to_direction_vectors() {
        let (at, up) = euler_to_direction_vectors(&Vec3::zeros());
        assert_vec_eq(&at, &Vec3::y(), 1e-12);
        assert_vec_eq(&up, &Vec3::z(), 1e-12);

        // 90° about Z turns forward +Y into -X, up unchanged
        let (at, up) = euler_to_direction_vectors(&Vec3::new(0.0, 0.0, PI / 2.0));
        assert_vec_eq(&at, &Vec3::new(-1.0, 0.0, 0.0), 1e-12);
        assert_vec_eq(&up, &Vec3::z(), 1e-12);

        // 90° about X tilts forward +Y up to +Z
        let (at, up) = euler_to_direction_vectors(&Vec3::new(PI / 2.0, 0.0, 0.0));
        assert_vec_eq(&at, &Vec3::z(), 1e-12);
        assert_vec_eq(&up, &Vec3::new(0.0, -1.0, 0.0), 1e-12);
    }

    #[test]
    fn test_euler_matrix_round_trip() {
        let euler = Vec3::new(0.3, -0.4, 1.2);
        let m = euler_xyz_matrix(&euler);
        assert_vec_eq(&euler_from_rotation_matrix(&m), &euler, 1e-9);
    }

    #[test]
    fn test_game_rotation_in_host_space() {
        // Facing game +X is facing host -X; the host forward is +Y.
        let m = rotation_matrix_from_directions(&Vec3::x(), &Vec3::y());
        let host = rotation_to_host(&m);
        assert_vec_eq(&(host * Vec3::y()), &Vec3::new(-1.0, 0.0, 0.0), 1e-12);
        let (at, _) = euler_to_direction_vectors(&euler_from_rotation_matrix(&host));
        assert_vec_eq(&to_game_axis(&at), &Vec3::x(), 1e-9);
    }

    #[test]
    fn test_degrees_to_radians() {
        let r = degrees_to_radians(&Vec3::new(180.0, -45.0, 0.0));
        assert_vec_eq(&r, &Vec3::new(PI, -PI / 4.0, 0.0), 1e-12);
    }
}
