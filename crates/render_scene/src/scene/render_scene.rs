//! Render scene: the arena and frame-update context for models
//!
//! Owns every render model plus the dirty registry that schedules their
//! GPU syncs. The frame loop drives it in two steps per tick:
//!
//! 1. [`RenderScene::update_transforms`] after transform propagation, to
//!    queue every model whose node moved, and
//! 2. [`RenderScene::flush`] exactly once, to push queued models to the
//!    GPU and start the next epoch.

use slotmap::{new_key_type, SlotMap};

use crate::config::SceneConfig;
use crate::gfx::RenderDevice;
use crate::render::RenderModel;

use super::registry::{DirtyRegistry, DirtyTracked};

new_key_type! {
    /// Stable handle to a model owned by a render scene
    pub struct ModelKey;
}

/// Container and frame-update context for render models
#[derive(Debug)]
pub struct RenderScene {
    config: SceneConfig,
    models: SlotMap<ModelKey, RenderModel>,
    registry: DirtyRegistry<ModelKey>,
}

impl Default for RenderScene {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderScene {
    /// Create a scene with default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create a scene with explicit configuration
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            models: SlotMap::with_capacity_and_key(config.model_capacity),
            registry: DirtyRegistry::with_capacity(config.model_capacity),
            config,
        }
    }

    /// Configuration the scene was created with
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Take ownership of a model. The model is not attached yet; call
    /// [`RenderScene::attach_model`] to include it in frame updates.
    pub fn add_model(&mut self, mut model: RenderModel) -> ModelKey {
        model.set_rescale_normal_matrix(self.config.rescale_normal_matrix);
        self.models.insert(model)
    }

    /// Destroy a model's GPU resources and drop it from the scene
    pub fn remove_model(&mut self, device: &mut dyn RenderDevice, key: ModelKey) {
        self.registry.unregister(&mut self.models, key);
        if let Some(mut model) = self.models.remove(key) {
            model.destroy(device);
        }
    }

    /// Register a model for frame updates. Attaching touches no GPU
    /// resources; it only re-queues the model so its current state is
    /// uploaded on the next flush.
    pub fn attach_model(&mut self, key: ModelKey) {
        self.registry.register(&mut self.models, key);
        if let Some(model) = self.models.get_mut(key) {
            model.mark_transform_dirty();
        }
        self.registry.mark_dirty(&mut self.models, key);
    }

    /// Drop a model from frame updates, keeping its GPU resources. A
    /// pending dirty mark is discarded with the registration.
    pub fn detach_model(&mut self, key: ModelKey) {
        self.registry.unregister(&mut self.models, key);
    }

    /// Whether a model currently participates in frame updates
    pub fn is_attached(&self, key: ModelKey) -> bool {
        self.models
            .get(key)
            .map_or(false, |model| model.dirty_slot().is_registered())
    }

    /// Queue a model for the next flush (no-op when detached)
    pub fn mark_model_dirty(&mut self, key: ModelKey) {
        self.registry.mark_dirty(&mut self.models, key);
    }

    /// Whether a model is queued for the next flush
    pub fn is_model_dirty(&self, key: ModelKey) -> bool {
        self.registry.is_dirty(&self.models, key)
    }

    /// Shared access to a model
    pub fn model(&self, key: ModelKey) -> Option<&RenderModel> {
        self.models.get(key)
    }

    /// Mutable access to a model
    pub fn model_mut(&mut self, key: ModelKey) -> Option<&mut RenderModel> {
        self.models.get_mut(key)
    }

    /// All models in the scene (attached or not), for the draw-submission
    /// layer to filter by `enabled`, visibility, and bounds
    pub fn models(&self) -> impl Iterator<Item = (ModelKey, &RenderModel)> {
        self.models.iter()
    }

    /// Number of models owned by the scene
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Number of models queued for the next flush
    pub fn dirty_count(&self) -> usize {
        self.registry.dirty_len()
    }

    /// Current update epoch
    pub fn epoch(&self) -> u64 {
        self.registry.epoch()
    }

    /// Poll every attached model's transform and queue the ones that
    /// moved. Call after transform propagation for the frame completed.
    pub fn update_transforms(&mut self, stamp: u64) {
        for index in 0..self.registry.len() {
            let key = self.registry.key_at(index);
            let changed = self
                .models
                .get_mut(key)
                .map_or(false, |model| model.update_transform(stamp));
            if changed {
                self.registry.mark_dirty(&mut self.models, key);
            }
        }
    }

    /// Visit every queued model exactly once and push its state to the
    /// GPU, then start the next epoch. Per-model upload failures are
    /// logged and skipped so the flush always runs to completion.
    pub fn flush(&mut self, device: &mut dyn RenderDevice, stamp: u64) {
        self.registry.flush(&mut self.models, |model| {
            if let Err(err) = model.update_ubos(device, stamp) {
                log::error!("model update failed: {err}");
            }
        });
    }
}
