//! Render models and their building blocks
//!
//! Everything a renderable needs between "the scene graph moved me" and
//! "my bytes are on the GPU": sub-models, passes, uniform-record layouts,
//! and the model type that ties them together.

mod mesh;
mod model;
mod pass;
mod submodel;
mod ubo;

pub use mesh::{MeshHandle, MeshRegion};
pub use model::{AttributeView, InstancedAttributeBlock, ModelKind, RenderModel, VisFlags};
pub use pass::{BatchingScheme, Material, Pass};
pub use submodel::SubModel;
pub use ubo::{pack_world_matrix, UboLocal, UboWorldBound, LIGHTMAP_TEXTURE_BINDING};
