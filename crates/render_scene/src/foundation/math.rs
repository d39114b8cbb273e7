//! Math utilities and types
//!
//! Provides the fundamental math types used throughout the update core.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Compute the inverse-transpose of a matrix.
///
/// This is the matrix that transforms normal vectors correctly under
/// non-uniform scaling. Returns `None` when the matrix is singular
/// (e.g. a zero scale axis), in which case callers should keep their
/// previous normal matrix rather than upload garbage.
pub fn inverse_transpose(m: &Mat4) -> Option<Mat4> {
    m.try_inverse().map(|inv| inv.transpose())
}

/// Compose a world matrix from a position, rotation, and scale.
pub fn compose_trs(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * rotation.to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}
