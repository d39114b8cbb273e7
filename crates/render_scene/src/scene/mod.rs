//! Scene-side types: transform nodes, the dirty registry, and the scene
//! container that wires them to render models

mod node;
mod registry;
mod render_scene;

pub use node::SceneNode;
pub use registry::{DirtyRegistry, DirtySlot, DirtyTracked};
pub use render_scene::{ModelKey, RenderScene};
