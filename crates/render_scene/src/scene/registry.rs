//! Dirty-object registry
//!
//! Tracks every live renderable and the subset that changed this frame,
//! so per-frame scheduling visits exactly the objects that need a GPU
//! sync instead of re-scanning the whole scene.
//!
//! Registration is index-encoded: each managed object carries a
//! [`DirtySlot`] holding its position in the registry's dense key array,
//! and removal swaps with the tail so both arrays stay packed with O(1)
//! updates. Dirty membership is an epoch comparison: completing a flush
//! bumps the epoch, which invalidates every previous mark without a
//! per-object reset pass.

use slotmap::{Key, SlotMap};

/// Epoch value meaning "never marked"
const EPOCH_NONE: u64 = u64::MAX;

/// Registration bookkeeping carried by every managed object
#[derive(Debug, Clone, Copy)]
pub struct DirtySlot {
    slot: Option<u32>,
    epoch: u64,
}

impl DirtySlot {
    /// An unregistered, never-marked slot
    pub const fn new() -> Self {
        Self {
            slot: None,
            epoch: EPOCH_NONE,
        }
    }

    /// Whether the owner is currently registered
    pub fn is_registered(&self) -> bool {
        self.slot.is_some()
    }
}

impl Default for DirtySlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Implemented by objects a [`DirtyRegistry`] manages
pub trait DirtyTracked {
    /// The object's registration bookkeeping
    fn dirty_slot(&self) -> &DirtySlot;

    /// Mutable access to the registration bookkeeping
    fn dirty_slot_mut(&mut self) -> &mut DirtySlot;
}

/// Registry of live objects and the per-frame dirty subset
///
/// Objects live in a caller-owned [`SlotMap`] arena; the registry only
/// stores keys. It is an explicit context object; create one per scene
/// (or per engine) and pass it where it is needed.
#[derive(Debug)]
pub struct DirtyRegistry<K: Key> {
    all: Vec<K>,
    dirty: Vec<K>,
    epoch: u64,
}

impl<K: Key> Default for DirtyRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> DirtyRegistry<K> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            all: Vec::new(),
            dirty: Vec::new(),
            epoch: 0,
        }
    }

    /// Create an empty registry with preallocated slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            all: Vec::with_capacity(capacity),
            dirty: Vec::with_capacity(capacity),
            epoch: 0,
        }
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Whether no objects are registered
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Number of objects waiting for the next flush
    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    /// Current epoch; incremented once per completed flush
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Key registered at `index` (visit order is unspecified)
    pub fn key_at(&self, index: usize) -> K {
        self.all[index]
    }

    /// Register an object. No-op if the key is dead or already registered.
    pub fn register<T: DirtyTracked>(&mut self, arena: &mut SlotMap<K, T>, key: K) {
        let Some(obj) = arena.get_mut(key) else {
            return;
        };
        if obj.dirty_slot().is_registered() {
            return;
        }
        obj.dirty_slot_mut().slot = Some(self.all.len() as u32);
        self.all.push(key);
    }

    /// Unregister an object, dropping any pending dirty membership.
    /// No-op if the key is dead or not registered.
    pub fn unregister<T: DirtyTracked>(&mut self, arena: &mut SlotMap<K, T>, key: K) {
        let (index, was_dirty) = {
            let Some(obj) = arena.get_mut(key) else {
                return;
            };
            let tracker = obj.dirty_slot_mut();
            let Some(slot) = tracker.slot else {
                return;
            };
            tracker.slot = None;
            let was_dirty = tracker.epoch == self.epoch;
            if was_dirty {
                tracker.epoch = EPOCH_NONE;
            }
            (slot as usize, was_dirty)
        };
        debug_assert_eq!(
            self.all.get(index).copied(),
            Some(key),
            "registry slot out of sync with its object"
        );

        // Swap-remove keeps every other slot stable except the moved tail,
        // whose stored index is patched here.
        self.all.swap_remove(index);
        if let Some(&moved_key) = self.all.get(index) {
            if let Some(moved) = arena.get_mut(moved_key) {
                moved.dirty_slot_mut().slot = Some(index as u32);
            }
        }

        if was_dirty {
            if let Some(pos) = self.dirty.iter().position(|&k| k == key) {
                self.dirty.swap_remove(pos);
            }
        }
    }

    /// Queue an object for the next flush.
    /// No-op if unregistered or already queued this epoch.
    pub fn mark_dirty<T: DirtyTracked>(&mut self, arena: &mut SlotMap<K, T>, key: K) {
        let Some(obj) = arena.get_mut(key) else {
            return;
        };
        let tracker = obj.dirty_slot_mut();
        if tracker.slot.is_none() || tracker.epoch == self.epoch {
            return;
        }
        tracker.epoch = self.epoch;
        self.dirty.push(key);
    }

    /// Whether an object is queued for the next flush
    pub fn is_dirty<T: DirtyTracked>(&self, arena: &SlotMap<K, T>, key: K) -> bool {
        arena.get(key).map_or(false, |obj| {
            let tracker = obj.dirty_slot();
            tracker.is_registered() && tracker.epoch == self.epoch
        })
    }

    /// Visit every queued object exactly once, then start a new epoch.
    ///
    /// The dirty set is snapshotted up front: anything marked while the
    /// flush runs lands in the new epoch and is visited by the *next*
    /// flush, so the loop length is stable.
    pub fn flush<T: DirtyTracked>(
        &mut self,
        arena: &mut SlotMap<K, T>,
        mut visit: impl FnMut(&mut T),
    ) {
        let pending = std::mem::take(&mut self.dirty);
        self.epoch += 1;
        for &key in &pending {
            if let Some(obj) = arena.get_mut(key) {
                debug_assert!(
                    obj.dirty_slot().is_registered(),
                    "dirty object lost its registry slot before flush"
                );
                visit(obj);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::DefaultKey;

    #[derive(Default)]
    struct Probe {
        tracker: DirtySlot,
        updates: usize,
    }

    impl DirtyTracked for Probe {
        fn dirty_slot(&self) -> &DirtySlot {
            &self.tracker
        }

        fn dirty_slot_mut(&mut self) -> &mut DirtySlot {
            &mut self.tracker
        }
    }

    fn setup(count: usize) -> (SlotMap<DefaultKey, Probe>, DirtyRegistry<DefaultKey>, Vec<DefaultKey>) {
        let mut arena = SlotMap::new();
        let mut registry = DirtyRegistry::new();
        let keys: Vec<_> = (0..count).map(|_| arena.insert(Probe::default())).collect();
        for &key in &keys {
            registry.register(&mut arena, key);
        }
        (arena, registry, keys)
    }

    /// Every registered object must sit exactly where its slot says.
    fn assert_slots_consistent(
        arena: &SlotMap<DefaultKey, Probe>,
        registry: &DirtyRegistry<DefaultKey>,
    ) {
        for index in 0..registry.len() {
            let key = registry.key_at(index);
            let slot = arena[key].tracker.slot;
            assert_eq!(slot, Some(index as u32));
        }
    }

    #[test]
    fn test_register_is_idempotent() {
        let (mut arena, mut registry, keys) = setup(2);
        registry.register(&mut arena, keys[0]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_index_stability_across_removals() {
        let (mut arena, mut registry, keys) = setup(5);
        assert_slots_consistent(&arena, &registry);

        registry.unregister(&mut arena, keys[1]);
        assert_slots_consistent(&arena, &registry);
        assert!(!arena[keys[1]].tracker.is_registered());

        registry.unregister(&mut arena, keys[4]);
        registry.unregister(&mut arena, keys[0]);
        assert_slots_consistent(&arena, &registry);
        assert_eq!(registry.len(), 2);

        // Re-register in a different order; slots must stay coherent.
        registry.register(&mut arena, keys[4]);
        registry.register(&mut arena, keys[1]);
        assert_slots_consistent(&arena, &registry);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_mark_twice_visits_once() {
        let (mut arena, mut registry, keys) = setup(3);
        registry.mark_dirty(&mut arena, keys[1]);
        registry.mark_dirty(&mut arena, keys[1]);
        assert_eq!(registry.dirty_len(), 1);

        registry.flush(&mut arena, |probe| probe.updates += 1);
        assert_eq!(arena[keys[0]].updates, 0);
        assert_eq!(arena[keys[1]].updates, 1);
        assert_eq!(arena[keys[2]].updates, 0);
        assert_eq!(registry.epoch(), 1);
    }

    #[test]
    fn test_flush_clears_dirty_set() {
        let (mut arena, mut registry, keys) = setup(2);
        registry.mark_dirty(&mut arena, keys[0]);
        assert!(registry.is_dirty(&arena, keys[0]));

        registry.flush(&mut arena, |_| {});
        assert_eq!(registry.dirty_len(), 0);
        assert!(!registry.is_dirty(&arena, keys[0]));

        // Marking again after the flush queues for the new epoch.
        registry.mark_dirty(&mut arena, keys[0]);
        assert!(registry.is_dirty(&arena, keys[0]));
    }

    #[test]
    fn test_unregister_clears_dirty_membership() {
        let (mut arena, mut registry, keys) = setup(3);
        registry.mark_dirty(&mut arena, keys[0]);
        registry.mark_dirty(&mut arena, keys[2]);

        registry.unregister(&mut arena, keys[2]);
        assert_eq!(registry.dirty_len(), 1);

        registry.flush(&mut arena, |probe| probe.updates += 1);
        assert_eq!(arena[keys[0]].updates, 1);
        assert_eq!(arena[keys[2]].updates, 0);
    }

    #[test]
    fn test_mark_unregistered_is_noop() {
        let (mut arena, mut registry, keys) = setup(1);
        registry.unregister(&mut arena, keys[0]);
        registry.mark_dirty(&mut arena, keys[0]);
        assert_eq!(registry.dirty_len(), 0);

        // Unregistering twice is equally harmless.
        registry.unregister(&mut arena, keys[0]);
    }

    #[test]
    fn test_epoch_increments_once_per_flush() {
        let (mut arena, mut registry, keys) = setup(1);
        assert_eq!(registry.epoch(), 0);
        registry.flush(&mut arena, |_| {});
        registry.flush(&mut arena, |_| {});
        assert_eq!(registry.epoch(), 2);

        // A stale mark from a previous epoch does not suppress a new one.
        registry.mark_dirty(&mut arena, keys[0]);
        registry.flush(&mut arena, |probe| probe.updates += 1);
        registry.mark_dirty(&mut arena, keys[0]);
        registry.flush(&mut arena, |probe| probe.updates += 1);
        assert_eq!(arena[keys[0]].updates, 2);
    }
}
