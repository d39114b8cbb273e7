//! The render device facade trait

use bitflags::bitflags;

use super::buffer::{BufferHandle, BufferInfo};
use super::sampler::{SamplerHandle, SamplerInfo};
use super::GfxResult;

bitflags! {
    /// Optional hardware features a device may report
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Feature: u32 {
        /// Per-instance vertex attribute arrays
        const INSTANCED_ARRAYS = 1 << 0;
        /// Indirect multi-draw submission
        const MULTI_DRAW_INDIRECT = 1 << 1;
    }
}

/// Narrow facade over the GPU device
///
/// This is the complete device surface the update core is allowed to
/// touch. Buffer uploads are synchronous from the caller's perspective;
/// a backend may queue internally but must preserve ordering per handle.
/// Allocation failures propagate as [`GfxError`](super::GfxError); the
/// core never retries, the owning caller decides.
pub trait RenderDevice {
    /// Allocate a buffer with the exact size and stride in `info`
    fn create_buffer(&mut self, info: &BufferInfo) -> GfxResult<BufferHandle>;

    /// Release a buffer; destroying an unknown handle is a no-op
    fn destroy_buffer(&mut self, handle: BufferHandle);

    /// Upload `data` to the start of the buffer
    fn update_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> GfxResult<()>;

    /// Fetch (or create) the sampler matching `info`
    fn get_sampler(&mut self, info: &SamplerInfo) -> SamplerHandle;

    /// Whether the device supports an optional feature
    fn has_feature(&self, feature: Feature) -> bool;
}
