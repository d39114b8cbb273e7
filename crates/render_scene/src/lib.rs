//! # Render Scene
//!
//! Per-frame update core for a real-time 3D renderer: tracks which
//! renderable models changed since the last frame and turns a changed
//! model's logical state (transform, bounds, shadow parameters, lightmap
//! binding) into GPU-resident buffers and attribute layouts ready for
//! draw submission.
//!
//! ## Architecture
//!
//! - **Dirty registry**: O(1) register/unregister with index-encoded
//!   slots and epoch-based dirty membership, so a frame visits exactly
//!   the models that changed
//! - **Render model**: owns sub-models, bounds, a fixed-layout uniform
//!   record, and (when hardware instancing is available) a packed
//!   per-instance attribute block
//! - **Device facade**: the narrow [`gfx::RenderDevice`] trait is the
//!   only GPU surface this crate touches; real backends live outside,
//!   and [`gfx::HeadlessDevice`] runs the whole pipeline on the CPU
//!
//! ## Frame loop
//!
//! ```rust
//! use render_scene::prelude::*;
//!
//! let mut device = HeadlessDevice::new();
//! let mut scene = RenderScene::new();
//!
//! let mut model = RenderModel::new();
//! model.create_bounding_shape(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
//! let key = scene.add_model(model);
//! scene.attach_model(key);
//!
//! // once per frame, after transform propagation:
//! scene.update_transforms(1);
//! scene.flush(&mut device, 1);
//! ```
//!
//! Out of scope by design: asset loading, shader compilation, material
//! resolution, transform hierarchies, lighting, culling, and draw-call
//! submission. Those systems consume this crate through the handles and
//! read-side accessors it exposes.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod geometry;
pub mod gfx;
pub mod render;
pub mod scene;

pub use config::{ConfigError, SceneConfig};

/// Common imports for crate users
pub mod prelude {
    pub use crate::config::SceneConfig;
    pub use crate::foundation::math::{Mat4, Quat, Vec3, Vec4};
    pub use crate::geometry::Aabb;
    pub use crate::gfx::{
        BufferHandle, BuiltinResources, Feature, GfxError, GfxResult, HeadlessDevice,
        RenderDevice, Texture,
    };
    pub use crate::render::{
        BatchingScheme, Material, MeshHandle, MeshRegion, ModelKind, Pass, RenderModel, VisFlags,
    };
    pub use crate::scene::{ModelKey, RenderScene, SceneNode};
}
