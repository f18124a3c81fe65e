// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance tree reconciliation and disposal.
//!
//! The sync walks the scene from the root along the current children. Each
//! child is looked up by trail; a missing instance is created only when the
//! child would be visible, so hidden subtrees are never expanded. Instances
//! the walk does not reach are queued for disposal, and the walk emits the
//! visible drawables in paint order as the next drawable order.

use alloc::vec::Vec;

use crate::backend::Backend;
use crate::dirty;
use crate::drawable::DrawableId;
use crate::handle::INVALID;
use crate::node::NodeId;
use crate::trail::Trail;

use super::Display;

/// Counts from one sync.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct SyncStats {
    pub(super) instances_created: u32,
    pub(super) instances_dropped: u32,
    pub(super) drawables_created: u32,
}

/// Counts from one disposal flush.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct DisposeStats {
    pub(super) instances: u32,
    pub(super) drawables: u32,
}

impl<B: Backend> Display<B> {
    /// Creates the root instance. Returns `false` if it already exists.
    pub(super) fn ensure_root_instance(&mut self) -> bool {
        if self.root_instance != INVALID {
            return false;
        }
        self.root_instance = self.create_instance(Trail::root(self.root), INVALID);
        true
    }

    /// Reconciles the instance tree with the scene and stores the resulting
    /// drawable order for the next stitch.
    pub(super) fn sync_tree(&mut self) -> SyncStats {
        self.sync_epoch = self.sync_epoch.wrapping_add(1);
        if self.sync_epoch == 0 {
            self.sync_epoch = 1;
        }
        let mut stats = SyncStats::default();
        let mut order = Vec::with_capacity(self.backbone.drawable_count());
        self.sync_instance(self.root_instance, true, &mut order, &mut stats);
        self.pending_order = Some(order);
        stats
    }

    fn sync_instance(
        &mut self,
        idx: u32,
        parent_visible: bool,
        order: &mut Vec<DrawableId>,
        stats: &mut SyncStats,
    ) {
        let epoch = self.sync_epoch;
        let node = self.instances.get(idx).node;
        let visible = parent_visible && self.scene.is_visible(node);

        let was_visible = {
            let slot = self.instances.get_mut(idx);
            slot.sync_epoch = epoch;
            core::mem::replace(&mut slot.visible, visible)
        };

        // Self drawable.
        let wanted = self.scene.renderer(node);
        let mut drawable = self.instances.get(idx).drawable;
        if let Some(d) = drawable
            && Some(self.backbone.drawable_renderer(d)) != wanted
        {
            self.drawable_disposals.push(d);
            drawable = None;
        }
        if drawable.is_none()
            && visible
            && let Some(renderer) = wanted
        {
            let paint = self.backend.create_paint(renderer, node);
            drawable = Some(self.backbone.acquire_drawable(renderer, idx, paint));
            self.repaint.mark(idx, dirty::PAINT);
            stats.drawables_created += 1;
        } else if visible && !was_visible && drawable.is_some() {
            // Content may have changed while hidden.
            self.repaint.mark(idx, dirty::PAINT);
        }
        self.instances.get_mut(idx).drawable = drawable;
        if visible && let Some(d) = drawable {
            order.push(d);
        }

        // Children, in paint order.
        let trail = self.instances.get(idx).trail.clone();
        let children: Vec<NodeId> = self.scene.children(node).collect();
        let previous = core::mem::take(&mut self.instances.get_mut(idx).children);
        let mut current = Vec::with_capacity(children.len());
        for (index, child) in children.into_iter().enumerate() {
            let child_trail = trail.with_child(child, index as u32);
            let child_idx = match self.trails.get(&child_trail).copied() {
                Some(existing) => {
                    self.refresh_trail(existing, child_trail);
                    existing
                }
                None if visible => {
                    stats.instances_created += 1;
                    self.create_instance(child_trail, idx)
                }
                None => continue,
            };
            current.push(child_idx);
            self.sync_instance(child_idx, visible, order, stats);
        }

        for stale in previous {
            if self.instances.get(stale).sync_epoch != epoch {
                self.instance_disposals.push(stale);
                stats.instances_dropped += 1;
            }
        }
        self.instances.get_mut(idx).children = current;
    }

    /// Replaces a kept instance's trail when its child indices shifted.
    fn refresh_trail(&mut self, idx: u32, trail: Trail) {
        if self.instances.get(idx).trail.indices() == trail.indices() {
            return;
        }
        // Keys compare by node sequence, so the stored key must be swapped
        // out for the indices to update.
        self.trails.remove(&trail);
        self.trails.insert(trail.clone(), idx);
        self.instances.get_mut(idx).trail = trail;
    }

    fn create_instance(&mut self, trail: Trail, parent: u32) -> u32 {
        let node = trail.leaf();
        let id = self.instances.create(trail.clone(), parent);
        self.trails.insert(trail, id.idx);
        let slot = node.idx as usize;
        if self.node_instances.len() <= slot {
            self.node_instances.resize_with(slot + 1, Vec::new);
        }
        self.node_instances[slot].push(id.idx);
        id.idx
    }

    /// Disposes queued instance subtrees, then retires their drawables and
    /// any drawable replaced during the sync.
    pub(super) fn flush_disposals(&mut self) -> DisposeStats {
        let mut stats = DisposeStats::default();
        let mut stack = core::mem::take(&mut self.instance_disposals);
        while let Some(idx) = stack.pop() {
            let slot = self.instances.destroy(idx);
            if self.trails.get(&slot.trail) == Some(&idx) {
                self.trails.remove(&slot.trail);
            }
            if let Some(list) = self.node_instances.get_mut(slot.node.idx as usize) {
                list.retain(|&i| i != idx);
            }
            self.repaint.remove_key(idx);
            if let Some(d) = slot.drawable {
                self.drawable_disposals.push(d);
            }
            stack.extend(slot.children);
            stats.instances += 1;
        }
        self.instance_disposals = stack;

        for d in self.drawable_disposals.drain(..) {
            self.backbone.retire_drawable(d);
            stats.drawables += 1;
        }
        stats
    }
}
