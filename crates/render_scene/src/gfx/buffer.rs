//! GPU buffer handles and creation parameters

use bitflags::bitflags;

/// Opaque handle to a buffer owned by a [`RenderDevice`](super::RenderDevice)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

bitflags! {
    /// How a buffer is consumed by the pipeline
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Bound as a uniform buffer
        const UNIFORM = 1 << 0;
        /// Bound as a vertex buffer
        const VERTEX = 1 << 1;
        /// Bound as an index buffer
        const INDEX = 1 << 2;
        /// Destination of CPU-to-GPU transfers
        const TRANSFER_DST = 1 << 3;
    }
}

bitflags! {
    /// Where a buffer's memory lives
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryUsage: u32 {
        /// Device-local memory
        const DEVICE = 1 << 0;
        /// Host-visible memory
        const HOST = 1 << 1;
    }
}

/// Creation parameters for a GPU buffer
///
/// Buffers backing uniform records are sized exactly to the record layout;
/// the device must not round `size` up behind the caller's back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferInfo {
    /// Usage flags
    pub usage: BufferUsage,
    /// Memory placement flags
    pub memory: MemoryUsage,
    /// Total size in bytes
    pub size: u32,
    /// Stride between elements in bytes (equal to `size` for single records)
    pub stride: u32,
}

impl BufferInfo {
    /// Parameters for a device-local uniform record of `size` bytes
    pub fn uniform(size: u32) -> Self {
        Self {
            usage: BufferUsage::UNIFORM | BufferUsage::TRANSFER_DST,
            memory: MemoryUsage::DEVICE,
            size,
            stride: size,
        }
    }
}
