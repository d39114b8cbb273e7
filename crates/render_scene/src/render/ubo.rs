//! Fixed uniform-record layouts shared with the shader interface
//!
//! Offsets are in f32 elements and must match the shader-side blocks
//! byte-for-byte. Matrices are packed as three vec4 rows with the
//! translation smuggled into the fourth lane of each row, which saves a
//! vec4 against a full 4x4 upload.

use crate::foundation::math::Mat4;

/// Per-model local uniform record layout
pub struct UboLocal;

impl UboLocal {
    /// World matrix, three packed vec4 rows
    pub const MAT_WORLD_OFFSET: usize = 0;
    /// Inverse-transpose world matrix, same packing
    pub const MAT_WORLD_IT_OFFSET: usize = 12;
    /// Lightmap UV scale/offset parameters (vec4)
    pub const LIGHTINGMAP_UV_OFFSET: usize = 24;
    /// Shadow bias and normal bias, plus two reserved lanes (vec4)
    pub const SHADOW_BIAS_OFFSET: usize = 28;
    /// Record length in f32 elements
    pub const COUNT: usize = 32;
    /// Record size in bytes
    pub const SIZE: u32 = (Self::COUNT * 4) as u32;
    /// Descriptor binding index of the record
    pub const BINDING: u32 = 0;
}

/// Per-model world-bounds record layout
pub struct UboWorldBound;

impl UboWorldBound {
    /// Bounds center (vec4)
    pub const CENTER_OFFSET: usize = 0;
    /// Bounds half-extents (vec4)
    pub const HALF_EXTENTS_OFFSET: usize = 4;
    /// Record length in f32 elements
    pub const COUNT: usize = 8;
    /// Record size in bytes
    pub const SIZE: u32 = (Self::COUNT * 4) as u32;
    /// Descriptor binding index of the record
    pub const BINDING: u32 = 1;
}

/// Descriptor binding index of the lightmap texture/sampler pair
pub const LIGHTMAP_TEXTURE_BINDING: u32 = 2;

/// Pack an affine world matrix into three vec4 rows.
///
/// Row layout: `(basis_x, t.x)`, `(basis_y, t.y)`, `(basis_z, t.z)` where
/// `basis_i` is the i-th column triple of the linear part. The same
/// packing feeds the uniform record and the per-instance attribute views.
pub fn pack_world_matrix(m: &Mat4) -> [[f32; 4]; 3] {
    [
        [m[(0, 0)], m[(1, 0)], m[(2, 0)], m[(0, 3)]],
        [m[(0, 1)], m[(1, 1)], m[(2, 1)], m[(1, 3)]],
        [m[(0, 2)], m[(1, 2)], m[(2, 2)], m[(2, 3)]],
    ]
}
