// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-trail display state.
//!
//! An instance exists for every trail the display has reached from its root.
//! Instances mirror the scene's shape below a display: each one lists the
//! instances of its node's children, in child order, and owns at most one
//! drawable for the node's own paint.

use alloc::vec::Vec;

use crate::drawable::DrawableId;
use crate::handle::{INVALID, generational_handle};
use crate::node::NodeId;
use crate::trail::Trail;

generational_handle!(
    /// A handle to one rendered occurrence of a node.
    InstanceId
);

#[derive(Debug)]
pub(crate) struct InstanceSlot {
    pub(crate) trail: Trail,
    pub(crate) node: NodeId,
    pub(crate) parent: u32,
    pub(crate) children: Vec<u32>,
    pub(crate) drawable: Option<DrawableId>,
    /// Visibility including every ancestor on the trail.
    pub(crate) visible: bool,
    /// Last sync pass that reached this instance.
    pub(crate) sync_epoch: u32,
}

#[derive(Debug, Default)]
pub(crate) struct InstanceStore {
    slots: Vec<Option<InstanceSlot>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    live: usize,
}

impl InstanceStore {
    pub(crate) fn create(&mut self, trail: Trail, parent: u32) -> InstanceId {
        let node = trail.leaf();
        let slot = InstanceSlot {
            trail,
            node,
            parent,
            children: Vec::new(),
            drawable: None,
            visible: true,
            sync_epoch: 0,
        };
        self.live += 1;
        if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.slots[i] = Some(slot);
            InstanceId::new(idx, self.generation[i])
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(INVALID);
            assert!(idx != INVALID, "instance arena is full");
            self.slots.push(Some(slot));
            self.generation.push(0);
            InstanceId::new(idx, 0)
        }
    }

    /// Frees the slot and returns its contents.
    pub(crate) fn destroy(&mut self, idx: u32) -> InstanceSlot {
        let Some(slot) = self.slots[idx as usize].take() else {
            panic!("instance {idx} destroyed twice");
        };
        self.live -= 1;
        self.free_list.push(idx);
        slot
    }

    pub(crate) fn is_alive(&self, id: InstanceId) -> bool {
        self.slots
            .get(id.idx as usize)
            .is_some_and(|slot| slot.is_some())
            && self.generation[id.idx as usize] == id.generation
    }

    pub(crate) fn validate(&self, id: InstanceId) {
        assert!(self.is_alive(id), "stale InstanceId: {id:?}");
    }

    pub(crate) fn contains(&self, idx: u32) -> bool {
        self.slots.get(idx as usize).is_some_and(Option::is_some)
    }

    pub(crate) fn id_at(&self, idx: u32) -> InstanceId {
        InstanceId::new(idx, self.generation[idx as usize])
    }

    pub(crate) fn get(&self, idx: u32) -> &InstanceSlot {
        match &self.slots[idx as usize] {
            Some(slot) => slot,
            None => panic!("instance {idx} is not alive"),
        }
    }

    pub(crate) fn get_mut(&mut self, idx: u32) -> &mut InstanceSlot {
        match &mut self.slots[idx as usize] {
            Some(slot) => slot,
            None => panic!("instance {idx} is not alive"),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeStore;

    #[test]
    fn slots_are_recycled_with_new_generation() {
        let mut nodes = NodeStore::new();
        let root = nodes.create_node();
        let mut store = InstanceStore::default();

        let first = store.create(Trail::root(root), INVALID);
        assert_eq!(store.get(first.idx).node, root);
        let _ = store.destroy(first.idx);
        assert!(!store.is_alive(first));
        assert_eq!(store.len(), 0);

        let second = store.create(Trail::root(root), INVALID);
        assert_eq!(second.idx, first.idx);
        assert!(store.is_alive(second));
        assert!(!store.is_alive(first));
    }

    #[test]
    #[should_panic(expected = "destroyed twice")]
    fn double_destroy_panics() {
        let mut nodes = NodeStore::new();
        let root = nodes.create_node();
        let mut store = InstanceStore::default();
        let id = store.create(Trail::root(root), INVALID);
        let _ = store.destroy(id.idx);
        let _ = store.destroy(id.idx);
    }
}
