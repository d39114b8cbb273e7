//! Render models: the per-frame unit of GPU state synchronization
//!
//! A [`RenderModel`] owns the drawable sub-models of one renderable, keeps
//! its world bounds in step with its transform, and pushes transform and
//! shading parameters to the GPU when (and only when) they changed. The
//! dirty registry decides *when* a model updates; this module is the
//! *what*.

use bitflags::bitflags;

use crate::foundation::math::{inverse_transpose, Mat4, Vec3, Vec4};
use crate::geometry::Aabb;
use crate::gfx::{
    BufferHandle, BufferInfo, BuiltinResources, Feature, Format, GfxResult, MacroPatch,
    RenderDevice, SamplerInfo, Texture, VertexAttribute, INST_MAT_WORLD,
};
use crate::scene::{DirtySlot, DirtyTracked, SceneNode};

use super::mesh::MeshRegion;
use super::pass::{BatchingScheme, Material};
use super::submodel::SubModel;
use super::ubo::{pack_world_matrix, UboLocal, UboWorldBound, LIGHTMAP_TEXTURE_BINDING};

const LIGHTMAP_SAMPLER: SamplerInfo = SamplerInfo::linear_clamp();
const LIGHTMAP_SAMPLER_WITH_MIP: SamplerInfo = SamplerInfo::linear_clamp_mip();

const SHADOW_RECEIVE_PATCHES: [MacroPatch; 1] = [MacroPatch {
    name: "RECEIVE_SHADOW",
    value: true,
}];

/// Kind tag consumed by downstream pipelines when they sort models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    /// Plain static or rigidly transformed model
    #[default]
    Default,
    /// Real-time skinned model
    Skinning,
    /// Skinned model with baked animation textures
    BakedSkinning,
    /// Batched 2D geometry
    Batch2d,
    /// Particle system batch
    ParticleBatch,
    /// Line geometry
    Line,
}

bitflags! {
    /// Visibility mask compared against a camera's visibility during culling
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VisFlags: u32 {
        /// Default scene layer
        const DEFAULT = 1 << 0;
        /// Editor-only helper geometry
        const GIZMOS = 1 << 1;
        /// 3D UI layer
        const UI_3D = 1 << 2;
    }
}

/// One typed window into the shared per-instance buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeView {
    /// Byte offset of the view inside the block buffer
    pub offset: usize,
    /// Format of the attribute backing this view
    pub format: Format,
}

impl AttributeView {
    /// Length of the view in bytes
    pub fn byte_len(&self) -> usize {
        self.format.size() as usize
    }
}

/// Packed per-instance vertex data shared by every sub-model of a model
///
/// The views tile the buffer exactly: view `i` starts where view `i - 1`
/// ends, and the last view ends at the buffer length. The batching layer
/// copies the buffer of every model in a batch into the actual GPU
/// instance buffer; the model only maintains the CPU image.
#[derive(Debug, Default)]
pub struct InstancedAttributeBlock {
    buffer: Vec<u8>,
    views: Vec<AttributeView>,
    attributes: Vec<VertexAttribute>,
}

impl InstancedAttributeBlock {
    /// Raw per-instance bytes in attribute order
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Views in the same order as [`InstancedAttributeBlock::attributes`]
    pub fn views(&self) -> &[AttributeView] {
        &self.views
    }

    /// Descriptors of the per-instance attributes
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Index of the view backing the attribute called `name`
    pub fn view_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|attr| attr.name == name)
    }

    /// Write float components through a view. Out-of-range indices are
    /// rejected loudly in debug builds and ignored in release builds.
    pub fn write_view_f32(&mut self, index: usize, values: &[f32]) {
        debug_assert!(index < self.views.len(), "attribute view out of range");
        let Some(view) = self.views.get(index).copied() else {
            return;
        };
        debug_assert!(view.format.is_float());
        debug_assert_eq!(values.len(), view.format.component_count() as usize);
        let mut cursor = view.offset;
        for value in values {
            self.buffer[cursor..cursor + 4].copy_from_slice(&value.to_ne_bytes());
            cursor += 4;
        }
    }

    /// Read float components back through a view
    pub fn read_view_f32(&self, index: usize) -> Vec<f32> {
        let Some(view) = self.views.get(index).copied() else {
            return Vec::new();
        };
        self.buffer[view.offset..view.offset + view.byte_len()]
            .chunks_exact(4)
            .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn rebuild(&mut self, attributes: &[VertexAttribute]) {
        let total: usize = attributes
            .iter()
            .filter(|attr| attr.is_instanced)
            .map(|attr| attr.format.size() as usize)
            .sum();
        self.buffer = vec![0; total];
        self.views.clear();
        self.attributes.clear();

        let mut offset = 0;
        for attribute in attributes.iter().filter(|attr| attr.is_instanced) {
            self.views.push(AttributeView {
                offset,
                format: attribute.format,
            });
            self.attributes.push(attribute.clone());
            offset += attribute.format.size() as usize;
        }
        debug_assert_eq!(offset, total, "attribute views must tile the buffer");
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.views.clear();
        self.attributes.clear();
    }
}

/// A renderable instance in a scene
///
/// Contains zero or more sub-models sharing one transform; each sub-model
/// pairs a mesh region with a material pass list. The model exclusively
/// owns its GPU buffers; sub-models and the batching layer only see
/// non-owning handles.
#[derive(Debug)]
pub struct RenderModel {
    kind: ModelKind,
    transform: SceneNode,
    sub_models: Vec<Option<SubModel>>,

    model_bounds: Option<Aabb>,
    world_bounds: Option<Aabb>,

    local_data: LocalRecord,
    local_buffer: Option<BufferHandle>,
    world_bound_buffer: Option<BufferHandle>,

    instanced_attributes: InstancedAttributeBlock,
    inst_mat_world_idx: Option<usize>,

    lightmap: Option<Texture>,
    lightmap_uv_param: Vec4,
    shadow_bias: f32,
    shadow_normal_bias: f32,
    receive_shadow: bool,
    cast_shadow: bool,

    enabled: bool,
    vis_flags: VisFlags,
    inited: bool,
    transform_dirty: bool,
    rescale_normal_matrix: bool,
    update_stamp: u64,

    tracker: DirtySlot,
}

/// Fixed-size local uniform record (wrapped so `Default` exists)
#[derive(Debug, Clone, Copy)]
struct LocalRecord([f32; UboLocal::COUNT]);

impl Default for LocalRecord {
    fn default() -> Self {
        Self([0.0; UboLocal::COUNT])
    }
}

impl Default for RenderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderModel {
    /// Create an empty model; call [`RenderModel::initialize`] before use
    pub fn new() -> Self {
        Self {
            kind: ModelKind::Default,
            transform: SceneNode::new(),
            sub_models: Vec::new(),
            model_bounds: None,
            world_bounds: None,
            local_data: LocalRecord::default(),
            local_buffer: None,
            world_bound_buffer: None,
            instanced_attributes: InstancedAttributeBlock::default(),
            inst_mat_world_idx: None,
            lightmap: None,
            lightmap_uv_param: Vec4::zeros(),
            shadow_bias: 0.0,
            shadow_normal_bias: 0.0,
            receive_shadow: false,
            cast_shadow: false,
            enabled: true,
            vis_flags: VisFlags::empty(),
            inited: false,
            transform_dirty: true,
            rescale_normal_matrix: true,
            update_stamp: 0,
            tracker: DirtySlot::new(),
        }
    }

    /// Prepare the model for use. Idempotent.
    pub fn initialize(&mut self) {
        if self.inited {
            return;
        }
        self.receive_shadow = true;
        self.cast_shadow = false;
        self.enabled = true;
        self.vis_flags = VisFlags::empty();
        self.inited = true;
    }

    /// Whether [`RenderModel::initialize`] has run
    pub fn inited(&self) -> bool {
        self.inited
    }

    /// Kind tag
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Set the kind tag
    pub fn set_kind(&mut self, kind: ModelKind) {
        self.kind = kind;
    }

    /// The transform this model follows
    pub fn transform(&self) -> &SceneNode {
        &self.transform
    }

    /// Mutable access for the scene graph / gameplay side
    pub fn transform_mut(&mut self) -> &mut SceneNode {
        &mut self.transform
    }

    /// Model-space bounds, if geometry has been assigned
    pub fn model_bounds(&self) -> Option<&Aabb> {
        self.model_bounds.as_ref()
    }

    /// World-space bounds, if geometry has been assigned
    pub fn world_bounds(&self) -> Option<&Aabb> {
        self.world_bounds.as_ref()
    }

    /// Local uniform record buffer, once lazily created
    pub fn local_buffer(&self) -> Option<BufferHandle> {
        self.local_buffer
    }

    /// World-bounds record buffer, once lazily created
    pub fn world_bound_buffer(&self) -> Option<BufferHandle> {
        self.world_bound_buffer
    }

    /// Frame stamp of the last [`RenderModel::update_ubos`] visit
    pub fn update_stamp(&self) -> u64 {
        self.update_stamp
    }

    /// Whether this model currently feeds an instancing batch
    pub fn is_instancing_enabled(&self) -> bool {
        self.inst_mat_world_idx.is_some()
    }

    /// View index where the per-instance world matrix starts, if any
    pub fn instance_world_matrix_slot(&self) -> Option<usize> {
        self.inst_mat_world_idx
    }

    /// Per-instance attribute block
    pub fn instanced_attributes(&self) -> &InstancedAttributeBlock {
        &self.instanced_attributes
    }

    /// Mutable per-instance attribute block, for custom instanced inputs
    pub fn instanced_attributes_mut(&mut self) -> &mut InstancedAttributeBlock {
        &mut self.instanced_attributes
    }

    /// Whether the model participates in draw submission
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable draw submission
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Visibility mask
    pub fn vis_flags(&self) -> VisFlags {
        self.vis_flags
    }

    /// Set the visibility mask
    pub fn set_vis_flags(&mut self, flags: VisFlags) {
        self.vis_flags = flags;
    }

    /// Whether the model casts shadows
    pub fn cast_shadow(&self) -> bool {
        self.cast_shadow
    }

    /// Set shadow casting
    pub fn set_cast_shadow(&mut self, value: bool) {
        self.cast_shadow = value;
    }

    /// Whether the model receives shadows
    pub fn receive_shadow(&self) -> bool {
        self.receive_shadow
    }

    /// Set shadow receiving; re-selects shader variants on every sub-model
    pub fn set_receive_shadow(&mut self, value: bool) {
        self.receive_shadow = value;
        self.on_macro_patches_changed();
    }

    /// Model-level shadow depth bias
    pub fn shadow_bias(&self) -> f32 {
        self.shadow_bias
    }

    /// Set the shadow depth bias
    pub fn set_shadow_bias(&mut self, bias: f32) {
        self.shadow_bias = bias;
    }

    /// Model-level shadow normal bias
    pub fn shadow_normal_bias(&self) -> f32 {
        self.shadow_normal_bias
    }

    /// Set the shadow normal bias
    pub fn set_shadow_normal_bias(&mut self, bias: f32) {
        self.shadow_normal_bias = bias;
    }

    /// Whether inverse-transpose matrices are rescaled before upload
    pub fn rescale_normal_matrix(&self) -> bool {
        self.rescale_normal_matrix
    }

    /// Toggle the inverse-transpose rescale (platform tunable)
    pub fn set_rescale_normal_matrix(&mut self, enabled: bool) {
        self.rescale_normal_matrix = enabled;
    }

    pub(crate) fn mark_transform_dirty(&mut self) {
        self.transform_dirty = true;
    }

    /// Sub-models in slot order, skipping empty slots
    pub fn sub_models(&self) -> impl Iterator<Item = &SubModel> + '_ {
        self.sub_models.iter().flatten()
    }

    /// Sub-model at `idx`, if one was initialized there
    pub fn sub_model(&self, idx: usize) -> Option<&SubModel> {
        self.sub_models.get(idx).and_then(Option::as_ref)
    }

    /// Mutable sub-model at `idx`
    pub fn sub_model_mut(&mut self, idx: usize) -> Option<&mut SubModel> {
        self.sub_models.get_mut(idx).and_then(Option::as_mut)
    }

    /// Create the model- and world-space bounds from min/max corners
    pub fn create_bounding_shape(&mut self, min: Vec3, max: Vec3) {
        let bounds = Aabb::from_points(min, max);
        self.model_bounds = Some(bounds);
        self.world_bounds = Some(bounds);
    }

    /// Initialize (or replace) the sub-model at `idx`.
    ///
    /// Replacement releases the previous sub-model's GPU resources before
    /// the new one claims the slot, then rebuilds bindings and the
    /// instanced attribute layout for that index.
    pub fn init_sub_model(
        &mut self,
        device: &mut dyn RenderDevice,
        idx: usize,
        mesh: MeshRegion,
        material: &Material,
    ) -> GfxResult<()> {
        self.initialize();
        if idx >= self.sub_models.len() {
            self.sub_models.resize_with(idx + 1, || None);
        }

        let patches = self.macro_patches(idx);
        let replacement = SubModel::new(mesh, material.passes.clone(), patches);
        match &mut self.sub_models[idx] {
            Some(existing) => {
                existing.destroy(device);
                *existing = replacement;
            }
            slot @ None => *slot = Some(replacement),
        }

        self.update_attributes_and_bindings(device, idx)
    }

    /// Point the sub-model at `idx` at different geometry. No-op when the
    /// slot is empty; bindings and attributes are unaffected.
    pub fn set_sub_model_mesh(&mut self, idx: usize, mesh: MeshRegion) {
        if let Some(sub) = self.sub_model_mut(idx) {
            sub.set_mesh(mesh);
        }
    }

    /// Swap the material of the sub-model at `idx`, rebuilding bindings
    /// and the instanced attribute layout for that index only.
    pub fn set_sub_model_material(
        &mut self,
        device: &mut dyn RenderDevice,
        idx: usize,
        material: &Material,
    ) -> GfxResult<()> {
        let Some(sub) = self.sub_models.get_mut(idx).and_then(Option::as_mut) else {
            return Ok(());
        };
        sub.set_passes(device, material.passes.clone());
        self.update_attributes_and_bindings(device, idx)
    }

    /// Macro patches for the sub-model at the given index
    pub fn macro_patches(&self, _sub_model_index: usize) -> Vec<MacroPatch> {
        if self.receive_shadow {
            SHADOW_RECEIVE_PATCHES.to_vec()
        } else {
            Vec::new()
        }
    }

    /// Push the current patch set to every sub-model
    pub fn on_macro_patches_changed(&mut self) {
        for idx in 0..self.sub_models.len() {
            let patches = self.macro_patches(idx);
            if let Some(sub) = self.sub_models.get_mut(idx).and_then(Option::as_mut) {
                sub.on_macro_patches_changed(patches);
            }
        }
    }

    /// Propagate a global pipeline state change to every sub-model
    pub fn on_global_pipeline_state_changed(&mut self) {
        for sub in self.sub_models.iter_mut().flatten() {
            sub.on_pipeline_state_changed();
        }
    }

    /// Poll the transform's changed flag; refresh the cached world matrix
    /// and world bounds when it is raised. Returns whether anything moved
    /// so the caller can queue this model for a GPU sync.
    pub fn update_transform(&mut self, _stamp: u64) -> bool {
        if !self.transform.has_changed_flags() {
            return false;
        }
        self.transform.update_world_transform();
        self.transform_dirty = true;
        self.refresh_world_bounds();
        true
    }

    /// Unconditionally refresh the world matrix and world bounds
    pub fn update_world_bound(&mut self) {
        self.transform.update_world_transform();
        self.transform_dirty = true;
        self.refresh_world_bounds();
    }

    fn refresh_world_bounds(&mut self) {
        if let (Some(model_bounds), Some(world_bounds)) =
            (self.model_bounds, self.world_bounds.as_mut())
        {
            *world_bounds = model_bounds.transformed(self.transform.world_matrix());
        }
    }

    /// Synchronize GPU-visible state for this visit.
    ///
    /// Always refreshes every sub-model's bindings; writes transform state
    /// only when it is stale. With instancing active the packed world
    /// matrix lands in the attribute views (the batching layer uploads the
    /// actual instance buffer); otherwise the full uniform record goes to
    /// the local buffer, with the inverse-transpose rescaled toward unit
    /// magnitude when the platform needs the precision guard.
    pub fn update_ubos(&mut self, device: &mut dyn RenderDevice, stamp: u64) -> GfxResult<()> {
        for sub in self.sub_models.iter_mut().flatten() {
            sub.update();
        }
        self.update_stamp = stamp;

        if !self.transform_dirty {
            return Ok(());
        }
        self.transform_dirty = false;

        let world = *self.transform.world_matrix();
        if let Some(idx) = self.inst_mat_world_idx {
            let rows = pack_world_matrix(&world);
            debug_assert!(
                idx + rows.len() <= self.instanced_attributes.views.len(),
                "instance world matrix views out of range"
            );
            for (i, row) in rows.iter().enumerate() {
                self.instanced_attributes.write_view_f32(idx + i, row);
            }
        } else if let Some(buffer) = self.local_buffer {
            write_packed_rows(
                &mut self.local_data.0,
                UboLocal::MAT_WORLD_OFFSET,
                &pack_world_matrix(&world),
            );

            let mut world_it = inverse_transpose(&world).unwrap_or_else(|| {
                log::debug!("singular world matrix; normal matrix kept at identity");
                Mat4::identity()
            });
            if self.rescale_normal_matrix {
                // Keeps the matrix magnitude near 1.0 so low-precision
                // normal paths on some mobile drivers do not collapse.
                let det = world_it.determinant().abs();
                if det > f32::EPSILON {
                    world_it *= 1.0 / det.sqrt();
                }
            }
            write_packed_rows(
                &mut self.local_data.0,
                UboLocal::MAT_WORLD_IT_OFFSET,
                &pack_world_matrix(&world_it),
            );

            device.update_buffer(buffer, bytemuck::cast_slice(&self.local_data.0))?;
        }
        Ok(())
    }

    /// Bind a lightmap (or the built-in empty texture) to every sub-model
    /// and store its UV parameters in the uniform record.
    pub fn update_lightingmap(
        &mut self,
        device: &mut dyn RenderDevice,
        builtins: &BuiltinResources,
        texture: Option<Texture>,
        uv_param: Vec4,
    ) {
        self.local_data.0[UboLocal::LIGHTINGMAP_UV_OFFSET..UboLocal::LIGHTINGMAP_UV_OFFSET + 4]
            .copy_from_slice(uv_param.as_slice());
        self.transform_dirty = true;
        self.lightmap = texture;
        self.lightmap_uv_param = uv_param;

        let resolved = texture.unwrap_or(builtins.empty_texture);
        let sampler = device.get_sampler(if resolved.has_mip_chain() {
            &LIGHTMAP_SAMPLER_WITH_MIP
        } else {
            &LIGHTMAP_SAMPLER
        });

        for sub in self.sub_models.iter_mut().flatten() {
            let set = sub.descriptor_set_mut();
            set.bind_texture(LIGHTMAP_TEXTURE_BINDING, resolved.handle);
            set.bind_sampler(LIGHTMAP_TEXTURE_BINDING, sampler);
            set.update();
        }
    }

    /// Currently bound lightmap, if any
    pub fn lightmap(&self) -> Option<Texture> {
        self.lightmap
    }

    /// Lightmap UV scale/offset parameters
    pub fn lightmap_uv_param(&self) -> Vec4 {
        self.lightmap_uv_param
    }

    /// Write the shadow bias pair into the uniform record
    pub fn update_local_shadow_bias(&mut self) {
        let record = &mut self.local_data.0;
        record[UboLocal::SHADOW_BIAS_OFFSET] = self.shadow_bias;
        record[UboLocal::SHADOW_BIAS_OFFSET + 1] = self.shadow_normal_bias;
        record[UboLocal::SHADOW_BIAS_OFFSET + 2] = 0.0;
        record[UboLocal::SHADOW_BIAS_OFFSET + 3] = 0.0;
        self.transform_dirty = true;
    }

    /// Tear down every sub-model and GPU buffer and reset to the
    /// just-constructed state. The model can be re-initialized afterwards.
    pub fn destroy(&mut self, device: &mut dyn RenderDevice) {
        for sub in self.sub_models.iter_mut().flatten() {
            sub.destroy(device);
        }
        self.sub_models.clear();

        if let Some(handle) = self.local_buffer.take() {
            device.destroy_buffer(handle);
        }
        if let Some(handle) = self.world_bound_buffer.take() {
            device.destroy_buffer(handle);
        }

        self.model_bounds = None;
        self.world_bounds = None;
        self.instanced_attributes.clear();
        self.inst_mat_world_idx = None;
        self.lightmap = None;
        self.local_data = LocalRecord::default();
        self.inited = false;
        self.transform_dirty = true;
        log::debug!("render model destroyed");
    }

    fn ensure_local_buffer(&mut self, device: &mut dyn RenderDevice) -> GfxResult<BufferHandle> {
        if let Some(handle) = self.local_buffer {
            return Ok(handle);
        }
        let handle = device.create_buffer(&BufferInfo::uniform(UboLocal::SIZE))?;
        log::debug!("created local uniform buffer {handle:?}");
        self.local_buffer = Some(handle);
        Ok(handle)
    }

    fn ensure_world_bound_buffer(
        &mut self,
        device: &mut dyn RenderDevice,
    ) -> GfxResult<BufferHandle> {
        if let Some(handle) = self.world_bound_buffer {
            return Ok(handle);
        }
        let handle = device.create_buffer(&BufferInfo::uniform(UboWorldBound::SIZE))?;
        log::debug!("created world-bound uniform buffer {handle:?}");
        self.world_bound_buffer = Some(handle);
        Ok(handle)
    }

    /// Rebuild bindings and the instanced attribute layout for one slot
    fn update_attributes_and_bindings(
        &mut self,
        device: &mut dyn RenderDevice,
        idx: usize,
    ) -> GfxResult<()> {
        if self.sub_models.get(idx).and_then(Option::as_ref).is_none() {
            return Ok(());
        }

        let local = self.ensure_local_buffer(device)?;
        let world_bound = self.ensure_world_bound_buffer(device)?;

        let attributes = {
            let Some(sub) = self.sub_models.get_mut(idx).and_then(Option::as_mut) else {
                return Ok(());
            };
            sub.descriptor_set_mut().bind_buffer(UboLocal::BINDING, local);
            sub.world_bound_descriptor_set_mut()
                .bind_buffer(UboWorldBound::BINDING, world_bound);

            let Some(pass) = sub.passes().first() else {
                return Ok(());
            };
            pass.shader_variant(sub.patches()).attributes.clone()
        };

        self.update_instanced_attributes(device, &attributes, idx);
        Ok(())
    }

    /// Rebuild the per-instance attribute block against a reflected
    /// attribute list. Skipped entirely when the device lacks instanced
    /// arrays, where the uniform-buffer path is the always-available fallback.
    fn update_instanced_attributes(
        &mut self,
        device: &mut dyn RenderDevice,
        attributes: &[VertexAttribute],
        idx: usize,
    ) {
        if !device.has_feature(Feature::INSTANCED_ARRAYS) {
            return;
        }

        self.instanced_attributes.rebuild(attributes);

        // The per-instance layout changed; a batch buffer built against
        // the old layout must not be reused.
        if let Some(sub) = self.sub_models.get_mut(idx).and_then(Option::as_mut) {
            if let Some(pass) = sub.passes_mut().first_mut() {
                if pass.batching_scheme() == BatchingScheme::Instancing {
                    pass.destroy_instanced_buffer(device);
                }
            }
        }

        self.inst_mat_world_idx = self.instanced_attributes.view_index(INST_MAT_WORLD);
        self.transform_dirty = true;
    }
}

impl DirtyTracked for RenderModel {
    fn dirty_slot(&self) -> &DirtySlot {
        &self.tracker
    }

    fn dirty_slot_mut(&mut self) -> &mut DirtySlot {
        &mut self.tracker
    }
}

fn write_packed_rows(record: &mut [f32], offset: usize, rows: &[[f32; 4]; 3]) {
    for (i, row) in rows.iter().enumerate() {
        let start = offset + i * 4;
        record[start..start + 4].copy_from_slice(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{HeadlessDevice, ShaderVariant, TextureHandle};
    use crate::render::mesh::MeshHandle;
    use crate::render::pass::Pass;
    use approx::assert_relative_eq;

    fn region() -> MeshRegion {
        MeshRegion::new(MeshHandle(1), 0, 36)
    }

    fn plain_material() -> Material {
        let shader = ShaderVariant::new(vec![
            VertexAttribute::new("a_position", Format::RGB32F, 0),
            VertexAttribute::new("a_normal", Format::RGB32F, 1),
        ]);
        Material::new(vec![Pass::new(shader, BatchingScheme::None)])
    }

    fn instanced_material() -> Material {
        let shader = ShaderVariant::new(vec![
            VertexAttribute::new("a_position", Format::RGB32F, 0),
            VertexAttribute::instanced(INST_MAT_WORLD, Format::RGBA32F, 3),
            VertexAttribute::instanced("a_matWorld1", Format::RGBA32F, 4),
            VertexAttribute::instanced("a_matWorld2", Format::RGBA32F, 5),
        ]);
        Material::new(vec![Pass::new(shader, BatchingScheme::Instancing)])
    }

    fn record_f32(device: &HeadlessDevice, buffer: BufferHandle) -> Vec<f32> {
        device
            .buffer_data(buffer)
            .unwrap()
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut model = RenderModel::new();
        model.initialize();
        model.set_cast_shadow(true);
        model.initialize();
        assert!(model.cast_shadow(), "re-initialize must not reset state");
    }

    #[test]
    fn test_buffers_created_lazily() {
        let mut device = HeadlessDevice::new();
        let mut model = RenderModel::new();
        model.initialize();
        assert!(model.local_buffer().is_none());

        model
            .init_sub_model(&mut device, 0, region(), &plain_material())
            .unwrap();
        assert!(model.local_buffer().is_some());
        assert!(model.world_bound_buffer().is_some());
        assert_eq!(device.buffers_created(), 2);

        // A second sub-model reuses the same record buffers.
        model
            .init_sub_model(&mut device, 1, region(), &plain_material())
            .unwrap();
        assert_eq!(device.buffers_created(), 2);
    }

    #[test]
    fn test_uniform_path_uploads_record() {
        let mut device = HeadlessDevice::with_features(Feature::empty());
        let mut model = RenderModel::new();
        model
            .init_sub_model(&mut device, 0, region(), &plain_material())
            .unwrap();

        model.transform_mut().set_position(Vec3::new(5.0, 0.0, 0.0));
        assert!(model.update_transform(1));
        model.update_ubos(&mut device, 1).unwrap();

        let record = record_f32(&device, model.local_buffer().unwrap());
        // World matrix rows carry the translation in the fourth lane.
        assert_relative_eq!(record[UboLocal::MAT_WORLD_OFFSET + 3], 5.0);
        assert_relative_eq!(record[UboLocal::MAT_WORLD_OFFSET], 1.0);
        // Translation-only transforms have an identity inverse-transpose.
        assert_relative_eq!(record[UboLocal::MAT_WORLD_IT_OFFSET], 1.0);
        assert_relative_eq!(record[UboLocal::MAT_WORLD_IT_OFFSET + 3], 0.0);
        assert_eq!(model.update_stamp(), 1);
    }

    #[test]
    fn test_clean_model_skips_upload() {
        let mut device = HeadlessDevice::with_features(Feature::empty());
        let mut model = RenderModel::new();
        model
            .init_sub_model(&mut device, 0, region(), &plain_material())
            .unwrap();
        model.update_ubos(&mut device, 1).unwrap();

        // Poison the buffer, then update again without dirtying: the
        // poison must survive because no upload happens.
        let buffer = model.local_buffer().unwrap();
        device.update_buffer(buffer, &[0xAB; 4]).unwrap();
        model.update_ubos(&mut device, 2).unwrap();
        assert_eq!(&device.buffer_data(buffer).unwrap()[..4], &[0xAB; 4]);
        assert_eq!(model.update_stamp(), 2);
    }

    #[test]
    fn test_normal_matrix_rescaled_toward_unity() {
        let mut device = HeadlessDevice::with_features(Feature::empty());
        let mut model = RenderModel::new();
        model
            .init_sub_model(&mut device, 0, region(), &plain_material())
            .unwrap();

        model.transform_mut().set_scale(Vec3::new(10.0, 10.0, 10.0));
        model.update_transform(1);
        model.update_ubos(&mut device, 1).unwrap();
        let rescaled = record_f32(&device, model.local_buffer().unwrap())
            [UboLocal::MAT_WORLD_IT_OFFSET];

        // Raw inverse-transpose diagonal would be 0.1; rescaling by
        // 1/sqrt(|det|) = 10^1.5 lifts it to sqrt(10).
        assert_relative_eq!(rescaled, 10f32.sqrt(), epsilon = 1e-3);

        // With the tunable off the raw value is uploaded.
        model.set_rescale_normal_matrix(false);
        model.transform_mut().set_scale(Vec3::new(10.0, 10.0, 10.0));
        model.update_transform(2);
        model.update_ubos(&mut device, 2).unwrap();
        let raw = record_f32(&device, model.local_buffer().unwrap())
            [UboLocal::MAT_WORLD_IT_OFFSET];
        assert_relative_eq!(raw, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_instancing_branch_writes_views_not_buffer() {
        let mut device = HeadlessDevice::new();
        let mut model = RenderModel::new();
        model
            .init_sub_model(&mut device, 0, region(), &instanced_material())
            .unwrap();
        assert!(model.is_instancing_enabled());
        assert_eq!(model.instance_world_matrix_slot(), Some(0));

        model.transform_mut().set_position(Vec3::new(5.0, 6.0, 7.0));
        model.update_transform(1);
        model.update_ubos(&mut device, 1).unwrap();

        let block = model.instanced_attributes();
        assert_eq!(block.read_view_f32(0), vec![1.0, 0.0, 0.0, 5.0]);
        assert_eq!(block.read_view_f32(1), vec![0.0, 1.0, 0.0, 6.0]);
        assert_eq!(block.read_view_f32(2), vec![0.0, 0.0, 1.0, 7.0]);

        // The uniform buffer stays untouched on the instancing path.
        let record = record_f32(&device, model.local_buffer().unwrap());
        assert_relative_eq!(record[UboLocal::MAT_WORLD_OFFSET + 3], 0.0);
    }

    #[test]
    fn test_attribute_block_tiles_exactly() {
        let mut device = HeadlessDevice::new();
        let mut model = RenderModel::new();
        let shader = ShaderVariant::new(vec![
            VertexAttribute::instanced("a_instColor", Format::RGBA32F, 3),
            VertexAttribute::instanced("a_instParams", Format::RGB32F, 4),
        ]);
        let material = Material::new(vec![Pass::new(shader, BatchingScheme::None)]);
        model
            .init_sub_model(&mut device, 0, region(), &material)
            .unwrap();

        let block = model.instanced_attributes();
        assert_eq!(block.buffer().len(), 28);
        let views = block.views();
        assert_eq!(views.len(), 2);
        assert_eq!((views[0].offset, views[0].byte_len()), (0, 16));
        assert_eq!((views[1].offset, views[1].byte_len()), (16, 12));
        // No world matrix attribute, so instancing stays off.
        assert!(!model.is_instancing_enabled());
    }

    #[test]
    fn test_missing_instancing_feature_disables_block() {
        let mut device = HeadlessDevice::with_features(Feature::empty());
        let mut model = RenderModel::new();
        model
            .init_sub_model(&mut device, 0, region(), &instanced_material())
            .unwrap();
        assert!(!model.is_instancing_enabled());
        assert!(model.instanced_attributes().buffer().is_empty());
    }

    #[test]
    fn test_material_swap_destroys_stale_batch() {
        let mut device = HeadlessDevice::new();
        let mut model = RenderModel::new();
        model
            .init_sub_model(&mut device, 0, region(), &instanced_material())
            .unwrap();

        // Simulate the batching layer assigning a batch buffer.
        let batch = device.create_buffer(&BufferInfo::uniform(64)).unwrap();
        model.sub_model_mut(0).unwrap().passes_mut()[0].set_instanced_buffer(batch);

        let destroyed_before = device.buffers_destroyed();
        model
            .set_sub_model_material(&mut device, 0, &instanced_material())
            .unwrap();
        assert!(device.buffers_destroyed() > destroyed_before);
        assert!(device.buffer_data(batch).is_none());
    }

    #[test]
    fn test_replacing_sub_model_releases_old_resources() {
        let mut device = HeadlessDevice::new();
        let mut model = RenderModel::new();
        model
            .init_sub_model(&mut device, 0, region(), &instanced_material())
            .unwrap();
        let batch = device.create_buffer(&BufferInfo::uniform(64)).unwrap();
        model.sub_model_mut(0).unwrap().passes_mut()[0].set_instanced_buffer(batch);

        model
            .init_sub_model(&mut device, 0, region(), &plain_material())
            .unwrap();
        assert!(device.buffer_data(batch).is_none());
        assert!(model.sub_model(0).is_some());
        assert_eq!(model.sub_models().count(), 1);
    }

    #[test]
    fn test_bounds_follow_transform() {
        let mut model = RenderModel::new();
        model.create_bounding_shape(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(model.world_bounds(), model.model_bounds());

        model.transform_mut().set_position(Vec3::new(5.0, 0.0, 0.0));
        assert!(model.update_transform(1));

        let world = model.world_bounds().unwrap();
        assert_relative_eq!(world.min, Vec3::new(4.0, -1.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(world.max, Vec3::new(6.0, 1.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_update_world_bound_runs_unconditionally() {
        let mut model = RenderModel::new();
        model.create_bounding_shape(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        model.transform_mut().set_position(Vec3::new(0.0, 3.0, 0.0));
        model.update_world_bound();

        let world = model.world_bounds().unwrap();
        assert_relative_eq!(world.min, Vec3::new(-1.0, 2.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(world.max, Vec3::new(1.0, 4.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_missing_bounds_skip_recompute() {
        let mut model = RenderModel::new();
        model.transform_mut().set_position(Vec3::new(5.0, 0.0, 0.0));
        assert!(model.update_transform(1));
        assert!(model.world_bounds().is_none());
    }

    #[test]
    fn test_unchanged_transform_reports_clean() {
        let mut model = RenderModel::new();
        assert!(!model.update_transform(1));
    }

    #[test]
    fn test_lightmap_binding_and_fallback() {
        let mut device = HeadlessDevice::new();
        let builtins = BuiltinResources::new(Texture::new(TextureHandle(0), 1));
        let mut model = RenderModel::new();
        model
            .init_sub_model(&mut device, 0, region(), &plain_material())
            .unwrap();

        let lightmap = Texture::new(TextureHandle(9), 5);
        model.update_lightingmap(&mut device, &builtins, Some(lightmap), Vec4::new(1.0, 1.0, 0.0, 0.0));

        let set = model.sub_model(0).unwrap().descriptor_set();
        assert_eq!(set.texture_at(LIGHTMAP_TEXTURE_BINDING), Some(TextureHandle(9)));
        let sampler = set.sampler_at(LIGHTMAP_TEXTURE_BINDING).unwrap();
        assert_eq!(
            device.sampler_info(sampler),
            Some(&LIGHTMAP_SAMPLER_WITH_MIP)
        );

        // Clearing the lightmap falls back to the empty texture and the
        // mipless sampler.
        model.update_lightingmap(&mut device, &builtins, None, Vec4::zeros());
        let set = model.sub_model(0).unwrap().descriptor_set();
        assert_eq!(set.texture_at(LIGHTMAP_TEXTURE_BINDING), Some(TextureHandle(0)));
        let sampler = set.sampler_at(LIGHTMAP_TEXTURE_BINDING).unwrap();
        assert_eq!(device.sampler_info(sampler), Some(&LIGHTMAP_SAMPLER));
        assert!(model.lightmap().is_none());
    }

    #[test]
    fn test_shadow_bias_lands_in_record() {
        let mut device = HeadlessDevice::with_features(Feature::empty());
        let mut model = RenderModel::new();
        model
            .init_sub_model(&mut device, 0, region(), &plain_material())
            .unwrap();

        model.set_shadow_bias(0.5);
        model.set_shadow_normal_bias(0.25);
        model.update_local_shadow_bias();
        model.update_ubos(&mut device, 1).unwrap();

        let record = record_f32(&device, model.local_buffer().unwrap());
        assert_relative_eq!(record[UboLocal::SHADOW_BIAS_OFFSET], 0.5);
        assert_relative_eq!(record[UboLocal::SHADOW_BIAS_OFFSET + 1], 0.25);
        assert_relative_eq!(record[UboLocal::SHADOW_BIAS_OFFSET + 2], 0.0);
    }

    #[test]
    fn test_receive_shadow_repatches_sub_models() {
        let mut device = HeadlessDevice::new();
        let mut model = RenderModel::new();
        model
            .init_sub_model(&mut device, 0, region(), &plain_material())
            .unwrap();
        assert!(!model.sub_model(0).unwrap().patches().is_empty());

        model.set_receive_shadow(false);
        assert!(model.sub_model(0).unwrap().patches().is_empty());
    }

    #[test]
    fn test_destroy_releases_everything() {
        let mut device = HeadlessDevice::new();
        let mut model = RenderModel::new();
        model.create_bounding_shape(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        model
            .init_sub_model(&mut device, 0, region(), &instanced_material())
            .unwrap();

        model.destroy(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
        assert!(!model.inited());
        assert!(model.local_buffer().is_none());
        assert!(model.world_bounds().is_none());
        assert_eq!(model.sub_models().count(), 0);
        assert!(!model.is_instancing_enabled());

        // Destroyed models can be rebuilt from scratch.
        model
            .init_sub_model(&mut device, 0, region(), &plain_material())
            .unwrap();
        assert!(model.inited());
    }

    #[test]
    fn test_zero_sub_model_visit_is_harmless() {
        let mut device = HeadlessDevice::new();
        let mut model = RenderModel::new();
        model.initialize();
        model.update_ubos(&mut device, 7).unwrap();
        assert_eq!(model.update_stamp(), 7);
        assert_eq!(device.buffers_created(), 0);
    }
}
