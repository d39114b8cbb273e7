//! Binding tables (descriptor sets)
//!
//! A [`DescriptorSet`] is the CPU-side record of which buffer, texture,
//! and sampler sit at each binding index. Edits are staged with the
//! `bind_*` methods and published with [`DescriptorSet::update`]; the
//! backend consumes the table when it builds the real API-level set.

use super::buffer::BufferHandle;
use super::sampler::SamplerHandle;
use super::texture::TextureHandle;

/// CPU-side binding table mirroring one GPU descriptor set
#[derive(Debug, Default)]
pub struct DescriptorSet {
    buffers: Vec<(u32, BufferHandle)>,
    textures: Vec<(u32, TextureHandle)>,
    samplers: Vec<(u32, SamplerHandle)>,
    dirty: bool,
}

impl DescriptorSet {
    /// Create an empty binding table
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a buffer at `binding`, replacing any previous buffer there
    pub fn bind_buffer(&mut self, binding: u32, buffer: BufferHandle) {
        Self::put(&mut self.buffers, binding, buffer);
        self.dirty = true;
    }

    /// Stage a texture at `binding`
    pub fn bind_texture(&mut self, binding: u32, texture: TextureHandle) {
        Self::put(&mut self.textures, binding, texture);
        self.dirty = true;
    }

    /// Stage a sampler at `binding`
    pub fn bind_sampler(&mut self, binding: u32, sampler: SamplerHandle) {
        Self::put(&mut self.samplers, binding, sampler);
        self.dirty = true;
    }

    /// Publish staged edits
    pub fn update(&mut self) {
        self.dirty = false;
    }

    /// Mark the whole table stale so the next update republishes it,
    /// e.g. after a global pipeline state change swaps set layouts
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Whether staged edits are waiting for [`DescriptorSet::update`]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Buffer currently bound at `binding`
    pub fn buffer_at(&self, binding: u32) -> Option<BufferHandle> {
        Self::get(&self.buffers, binding)
    }

    /// Texture currently bound at `binding`
    pub fn texture_at(&self, binding: u32) -> Option<TextureHandle> {
        Self::get(&self.textures, binding)
    }

    /// Sampler currently bound at `binding`
    pub fn sampler_at(&self, binding: u32) -> Option<SamplerHandle> {
        Self::get(&self.samplers, binding)
    }

    fn put<T>(slots: &mut Vec<(u32, T)>, binding: u32, value: T) {
        if let Some(slot) = slots.iter_mut().find(|(b, _)| *b == binding) {
            slot.1 = value;
        } else {
            slots.push((binding, value));
        }
    }

    fn get<T: Copy>(slots: &[(u32, T)], binding: u32) -> Option<T> {
        slots.iter().find(|(b, _)| *b == binding).map(|(_, v)| *v)
    }
}
