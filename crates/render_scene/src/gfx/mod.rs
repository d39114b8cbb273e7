//! GPU device facade and shader reflection types
//!
//! The update core never talks to a graphics API directly. Everything it
//! needs from the GPU goes through the narrow [`RenderDevice`] trait, with
//! opaque handles standing in for driver objects. Backends (Vulkan, GL,
//! the in-process [`HeadlessDevice`]) implement the trait on their side.

mod buffer;
mod descriptor;
mod device;
mod format;
mod headless;
mod sampler;
mod shader;
mod texture;

pub use buffer::{BufferHandle, BufferInfo, BufferUsage, MemoryUsage};
pub use descriptor::DescriptorSet;
pub use device::{Feature, RenderDevice};
pub use format::{Format, VertexAttribute, INST_MAT_WORLD};
pub use headless::HeadlessDevice;
pub use sampler::{AddressMode, Filter, SamplerHandle, SamplerInfo};
pub use shader::{MacroPatch, ShaderVariant};
pub use texture::{BuiltinResources, Texture, TextureHandle};

use thiserror::Error;

/// Errors reported by a [`RenderDevice`] implementation
#[derive(Error, Debug)]
pub enum GfxError {
    /// Resource with the given handle id does not exist (or was destroyed)
    #[error("resource not found: {id}")]
    ResourceNotFound {
        /// The raw handle id of the missing resource
        id: u64,
    },

    /// Invalid operation attempted
    #[error("invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },

    /// Memory allocation failed
    #[error("out of memory: {requested} bytes")]
    OutOfMemory {
        /// Number of bytes that were requested
        requested: usize,
    },
}

/// Result type for device facade operations
pub type GfxResult<T> = Result<T, GfxError>;
