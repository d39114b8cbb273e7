//! Material passes
//!
//! A pass pairs the reflected interface of its compiled shader variant
//! with the batching state the update core has to manage. Pass creation,
//! shader compilation, and render-state setup happen in the material
//! system; this type is what the update core sees of the result.

use crate::gfx::{BufferHandle, MacroPatch, RenderDevice, ShaderVariant};

/// How draws produced by a pass are batched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchingScheme {
    /// One draw per sub-model
    #[default]
    None,
    /// Draws merged into hardware-instanced batches
    Instancing,
}

/// One pass of a material's pass list
#[derive(Debug, Clone, Default)]
pub struct Pass {
    shader: ShaderVariant,
    batching_scheme: BatchingScheme,
    instanced_buffer: Option<BufferHandle>,
}

impl Pass {
    /// Create a pass from its reflected shader variant
    pub fn new(shader: ShaderVariant, batching_scheme: BatchingScheme) -> Self {
        Self {
            shader,
            batching_scheme,
            instanced_buffer: None,
        }
    }

    /// Reflection for the variant selected under `patches`.
    ///
    /// The boolean patches used by this core (shadow receiving) do not
    /// change the vertex interface, so a pass carries one reflected
    /// attribute set; variant selection itself is the shader system's job.
    pub fn shader_variant(&self, _patches: &[MacroPatch]) -> &ShaderVariant {
        &self.shader
    }

    /// Batching scheme of this pass
    pub fn batching_scheme(&self) -> BatchingScheme {
        self.batching_scheme
    }

    /// Instancing batch buffer, if the batching layer assigned one
    pub fn instanced_buffer(&self) -> Option<BufferHandle> {
        self.instanced_buffer
    }

    /// Called by the batching layer when it allocates a batch buffer
    pub fn set_instanced_buffer(&mut self, buffer: BufferHandle) {
        self.instanced_buffer = Some(buffer);
    }

    /// Release the instancing batch buffer.
    ///
    /// Must run whenever the per-instance layout changes; a batch built
    /// against the old layout cannot be reused.
    pub fn destroy_instanced_buffer(&mut self, device: &mut dyn RenderDevice) {
        if let Some(handle) = self.instanced_buffer.take() {
            device.destroy_buffer(handle);
        }
    }
}

/// Ordered pass list resolved from a material
///
/// Material asset loading and pass resolution live outside this crate;
/// models consume the resolved list by value, so each sub-model owns its
/// pass instances outright.
#[derive(Debug, Clone, Default)]
pub struct Material {
    /// Passes in submission order
    pub passes: Vec<Pass>,
}

impl Material {
    /// Create a material from its resolved pass list
    pub fn new(passes: Vec<Pass>) -> Self {
        Self { passes }
    }
}
