//! Scene node transform source
//!
//! The transform hierarchy itself lives outside this crate; a node here
//! is just the slot the hierarchy (or gameplay code) writes a world-space
//! TRS into, plus the changed flag render models poll once per frame.

use crate::foundation::math::{compose_trs, Mat4, Quat, Vec3};

/// World transform of one renderable, with change tracking
#[derive(Debug, Clone)]
pub struct SceneNode {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    world_matrix: Mat4,
    changed: bool,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            world_matrix: Mat4::identity(),
            changed: false,
        }
    }
}

impl SceneNode {
    /// Create an identity node
    pub fn new() -> Self {
        Self::default()
    }

    /// World position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// World rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// World scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Move the node, raising the changed flag
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.changed = true;
    }

    /// Rotate the node, raising the changed flag
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.changed = true;
    }

    /// Scale the node, raising the changed flag
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.changed = true;
    }

    /// Whether the TRS changed since the last world-transform refresh
    pub fn has_changed_flags(&self) -> bool {
        self.changed
    }

    /// Recompose the cached world matrix and lower the changed flag
    pub fn update_world_transform(&mut self) {
        if self.changed {
            self.world_matrix = compose_trs(&self.position, &self.rotation, &self.scale);
            self.changed = false;
        }
    }

    /// Cached world matrix (valid after [`SceneNode::update_world_transform`])
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }
}
