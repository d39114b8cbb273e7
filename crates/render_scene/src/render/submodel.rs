//! Sub-models: the drawable pieces of a render model

use crate::gfx::{DescriptorSet, MacroPatch, RenderDevice};

use super::mesh::MeshRegion;
use super::pass::Pass;

/// One drawable piece of a render model
///
/// Pairs a mesh region with one material pass list. All sub-models of a
/// model share the model's transform and uniform record; what differs
/// per sub-model is geometry, passes, and binding tables.
#[derive(Debug)]
pub struct SubModel {
    mesh: MeshRegion,
    passes: Vec<Pass>,
    patches: Vec<MacroPatch>,
    descriptor_set: DescriptorSet,
    world_bound_descriptor_set: DescriptorSet,
}

impl SubModel {
    /// Create a sub-model from its mesh region, pass list, and macro patches
    pub fn new(mesh: MeshRegion, passes: Vec<Pass>, patches: Vec<MacroPatch>) -> Self {
        Self {
            mesh,
            passes,
            patches,
            descriptor_set: DescriptorSet::new(),
            world_bound_descriptor_set: DescriptorSet::new(),
        }
    }

    /// Mesh region drawn by this sub-model
    pub fn mesh(&self) -> MeshRegion {
        self.mesh
    }

    /// Point the sub-model at different geometry; bindings are unaffected
    pub fn set_mesh(&mut self, mesh: MeshRegion) {
        self.mesh = mesh;
    }

    /// Passes in submission order
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub(crate) fn passes_mut(&mut self) -> &mut [Pass] {
        &mut self.passes
    }

    /// Replace the pass list, releasing GPU buffers owned by the old one
    pub fn set_passes(&mut self, device: &mut dyn RenderDevice, passes: Vec<Pass>) {
        for pass in &mut self.passes {
            pass.destroy_instanced_buffer(device);
        }
        self.passes = passes;
    }

    /// Macro patches the current shader variants were selected with
    pub fn patches(&self) -> &[MacroPatch] {
        &self.patches
    }

    /// Adopt a new patch set (variant re-selection happens in the shader system)
    pub fn on_macro_patches_changed(&mut self, patches: Vec<MacroPatch>) {
        self.patches = patches;
    }

    /// Rebind everything after a global pipeline state change
    pub fn on_pipeline_state_changed(&mut self) {
        self.descriptor_set.invalidate();
        self.world_bound_descriptor_set.invalidate();
    }

    /// Per-frame refresh: publish any staged binding-table edits
    pub fn update(&mut self) {
        if self.descriptor_set.is_dirty() {
            self.descriptor_set.update();
        }
        if self.world_bound_descriptor_set.is_dirty() {
            self.world_bound_descriptor_set.update();
        }
    }

    /// Binding table for the local uniform record and textures
    pub fn descriptor_set(&self) -> &DescriptorSet {
        &self.descriptor_set
    }

    /// Mutable binding table
    pub fn descriptor_set_mut(&mut self) -> &mut DescriptorSet {
        &mut self.descriptor_set
    }

    /// Binding table for the world-bounds record
    pub fn world_bound_descriptor_set(&self) -> &DescriptorSet {
        &self.world_bound_descriptor_set
    }

    /// Mutable world-bounds binding table
    pub fn world_bound_descriptor_set_mut(&mut self) -> &mut DescriptorSet {
        &mut self.world_bound_descriptor_set
    }

    /// Release every GPU resource owned through the pass list
    pub fn destroy(&mut self, device: &mut dyn RenderDevice) {
        for pass in &mut self.passes {
            pass.destroy_instanced_buffer(device);
        }
        self.passes.clear();
    }
}
