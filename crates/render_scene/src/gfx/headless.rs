//! In-process device backend with no GPU behind it
//!
//! Backs every buffer with host memory so tests, tooling, and server-side
//! validation can run the full update pipeline and read back exactly what
//! would have reached the GPU.

use std::collections::HashMap;

use super::buffer::{BufferHandle, BufferInfo};
use super::device::{Feature, RenderDevice};
use super::sampler::{SamplerHandle, SamplerInfo};
use super::{GfxError, GfxResult};

/// CPU-backed [`RenderDevice`] implementation
#[derive(Debug)]
pub struct HeadlessDevice {
    features: Feature,
    buffers: HashMap<u64, Vec<u8>>,
    samplers: Vec<SamplerInfo>,
    next_buffer_id: u64,
    buffers_created: usize,
    buffers_destroyed: usize,
}

impl HeadlessDevice {
    /// Create a device reporting every optional feature
    pub fn new() -> Self {
        Self::with_features(Feature::all())
    }

    /// Create a device reporting only the given features
    pub fn with_features(features: Feature) -> Self {
        Self {
            features,
            buffers: HashMap::new(),
            samplers: Vec::new(),
            next_buffer_id: 1,
            buffers_created: 0,
            buffers_destroyed: 0,
        }
    }

    /// Read back the current contents of a live buffer
    pub fn buffer_data(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle.0).map(Vec::as_slice)
    }

    /// Number of currently live buffers
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Total buffers created over the device's lifetime
    pub fn buffers_created(&self) -> usize {
        self.buffers_created
    }

    /// Total buffers destroyed over the device's lifetime
    pub fn buffers_destroyed(&self) -> usize {
        self.buffers_destroyed
    }

    /// Configuration of a previously returned sampler handle
    pub fn sampler_info(&self, handle: SamplerHandle) -> Option<&SamplerInfo> {
        self.samplers.get(handle.0 as usize)
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_buffer(&mut self, info: &BufferInfo) -> GfxResult<BufferHandle> {
        if info.size == 0 {
            return Err(GfxError::InvalidOperation {
                reason: "zero-size buffer".to_string(),
            });
        }
        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        self.buffers.insert(id, vec![0; info.size as usize]);
        self.buffers_created += 1;
        log::trace!("headless: created buffer {id} ({} bytes)", info.size);
        Ok(BufferHandle(id))
    }

    fn destroy_buffer(&mut self, handle: BufferHandle) {
        if self.buffers.remove(&handle.0).is_some() {
            self.buffers_destroyed += 1;
            log::trace!("headless: destroyed buffer {}", handle.0);
        }
    }

    fn update_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> GfxResult<()> {
        let buffer = self
            .buffers
            .get_mut(&handle.0)
            .ok_or(GfxError::ResourceNotFound { id: handle.0 })?;
        if data.len() > buffer.len() {
            return Err(GfxError::InvalidOperation {
                reason: format!(
                    "upload of {} bytes exceeds buffer size {}",
                    data.len(),
                    buffer.len()
                ),
            });
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(())
    }

    fn get_sampler(&mut self, info: &SamplerInfo) -> SamplerHandle {
        let index = self
            .samplers
            .iter()
            .position(|s| s == info)
            .unwrap_or_else(|| {
                self.samplers.push(*info);
                self.samplers.len() - 1
            });
        SamplerHandle(index as u64)
    }

    fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(feature)
    }
}
