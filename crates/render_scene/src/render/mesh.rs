//! Mesh region references
//!
//! Geometry itself is owned by the asset layer; a sub-model only needs a
//! handle and the index range it draws.

/// Opaque handle to mesh geometry owned by the asset layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Contiguous region of a mesh drawn by one sub-model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRegion {
    /// Owning mesh
    pub mesh: MeshHandle,
    /// First index drawn
    pub first_index: u32,
    /// Number of indices drawn
    pub index_count: u32,
    /// Offset added to every index before vertex fetch
    pub vertex_offset: i32,
}

impl MeshRegion {
    /// Region covering `index_count` indices starting at `first_index`
    pub fn new(mesh: MeshHandle, first_index: u32, index_count: u32) -> Self {
        Self {
            mesh,
            first_index,
            index_count,
            vertex_offset: 0,
        }
    }
}
