// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounds and paint invalidation.
//!
//! Invalidation is upward: a node-local flag sets the matching `child_*` flag
//! on every ancestor, stopping at the first one that already carries it.
//! Validation is downward: starting from a root, only subtrees whose
//! `child_*` flag is set are entered, and consumed flags are cleared.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::bounds::{self, transform_bounds};
use crate::dirty;

use super::id::NodeId;
use super::store::NodeStore;

/// A bounds change observed during a validation pass, delivered to listeners
/// once the pass has finished.
struct BoundsChange {
    idx: u32,
    generation: u32,
    old: Rect,
}

/// Stale paint collected by [`NodeStore::validate_paint`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaintDamage {
    /// Nodes whose own content changed. Every path through them repaints.
    pub content: Vec<NodeId>,
    /// Nodes that repaint together with all of their descendants, along the
    /// paths through them only.
    pub subtrees: Vec<NodeId>,
}

impl PaintDamage {
    /// Whether nothing needs repainting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.subtrees.is_empty()
    }
}

impl NodeStore {
    /// Replaces the node's own extent.
    ///
    /// If the extent differs from the stored one, the node's bounds are
    /// invalidated and every ancestor learns that a descendant changed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `rect` is neither
    /// [`NOTHING`](crate::bounds::NOTHING) nor a finite rectangle with
    /// non-negative size.
    pub fn invalidate_self(&mut self, id: NodeId, rect: Rect) {
        self.validate(id);
        assert!(
            bounds::is_well_formed(rect),
            "malformed self bounds {rect:?} for {id:?}"
        );
        let i = id.idx as usize;
        if self.self_bounds[i] == rect {
            return;
        }
        self.self_bounds[i] = rect;
        self.flags[i].self_bounds = true;
        self.invalidate_bounds_raw(id.idx);
    }

    /// Marks the node's aggregate bounds stale without changing any input.
    pub fn invalidate_bounds(&mut self, id: NodeId) {
        self.validate(id);
        self.invalidate_bounds_raw(id.idx);
    }

    /// Requests a repaint of the node's own content.
    pub fn invalidate_paint(&mut self, id: NodeId) {
        self.validate(id);
        let i = id.idx as usize;
        self.flags[i].paint = true;
        for k in 0..self.parents[i].len() {
            let parent = self.parents[i][k];
            self.mark_child_paint_raw(parent);
        }
    }

    /// Requests a repaint of the node and all of its descendants.
    pub fn invalidate_subtree_paint(&mut self, id: NodeId) {
        self.validate(id);
        self.invalidate_subtree_paint_raw(id.idx);
    }

    /// Returns whether any geometry flag is set on `id`.
    #[must_use]
    pub fn is_bounds_dirty(&self, id: NodeId) -> bool {
        self.validate(id);
        self.flags[id.idx as usize].any_bounds()
    }

    /// Returns whether a bounds validation is currently running.
    ///
    /// Bounds listeners observe `true`.
    #[must_use]
    pub fn is_validating(&self) -> bool {
        self.validation_depth > 0
    }

    /// Recomputes stale bounds under `root` until no geometry flag remains.
    ///
    /// Listeners registered with
    /// [`add_bounds_listener`](Self::add_bounds_listener) fire after each pass
    /// for every node whose bounds changed, and may invalidate further
    /// geometry; the pass then re-runs. Returns the number of passes taken
    /// (zero if `root` was already clean).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the passes exceed the configured cap
    /// (see [`set_max_validation_passes`](Self::set_max_validation_passes)).
    pub fn validate_bounds(&mut self, root: NodeId) -> u32 {
        self.validate(root);
        let root_idx = root.idx;
        let mut passes = 0_u32;
        let mut changed = Vec::new();
        self.validation_depth += 1;
        while self.is_alive(root) && self.flags[root_idx as usize].any_bounds() {
            passes += 1;
            assert!(
                passes <= self.max_validation_passes,
                "bounds validation did not converge after {} passes under {root:?}",
                self.max_validation_passes
            );
            self.validate_bounds_pass(root_idx, &mut changed);
            self.notify_bounds_listeners(&mut changed);
        }
        self.validation_depth -= 1;
        passes
    }

    /// Collects the stale paint under `root`, clearing the paint flags on the
    /// way.
    ///
    /// Flags live on nodes, but a shared node is painted once per path. The
    /// result keeps the two kinds of staleness apart so the caller can tell
    /// which occurrences are affected: own content reaches every path through
    /// a node, a forced subtree only the paths through the forcing node. Each
    /// node appears at most once in each list.
    #[must_use]
    pub fn validate_paint(&mut self, root: NodeId) -> PaintDamage {
        self.validate(root);
        let mut damage = PaintDamage::default();
        self.collect_paint(root.idx, &mut damage);
        damage
    }

    /// Returns `true` if the tree structure changed since the last call.
    ///
    /// Drains the TOPOLOGY channel.
    pub fn take_structure_changed(&mut self) -> bool {
        let changed: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        !changed.is_empty()
    }

    /// Returns the live nodes whose local transform changed since the last
    /// call, in ascending slot order.
    ///
    /// Drains the TRANSFORM channel.
    pub fn take_transform_roots(&mut self) -> Vec<NodeId> {
        let roots: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .deterministic()
            .run()
            .collect();
        roots
            .into_iter()
            .filter(|&idx| self.alive[idx as usize])
            .map(|idx| self.id_at(idx))
            .collect()
    }

    // -- Internals --

    pub(crate) fn invalidate_bounds_raw(&mut self, idx: u32) {
        let i = idx as usize;
        self.flags[i].bounds = true;
        for k in 0..self.parents[i].len() {
            let parent = self.parents[i][k];
            self.invalidate_child_bounds_raw(parent);
        }
    }

    pub(crate) fn invalidate_child_bounds_raw(&mut self, idx: u32) {
        let mut stack = alloc::vec![idx];
        while let Some(n) = stack.pop() {
            let flags = &mut self.flags[n as usize];
            if flags.child_bounds {
                continue;
            }
            flags.child_bounds = true;
            stack.extend_from_slice(&self.parents[n as usize]);
        }
    }

    pub(crate) fn invalidate_subtree_paint_raw(&mut self, idx: u32) {
        let i = idx as usize;
        self.flags[i].subtree_paint = true;
        for k in 0..self.parents[i].len() {
            let parent = self.parents[i][k];
            self.mark_child_paint_raw(parent);
        }
    }

    pub(crate) fn mark_child_paint_raw(&mut self, idx: u32) {
        let mut stack = alloc::vec![idx];
        while let Some(n) = stack.pop() {
            let flags = &mut self.flags[n as usize];
            if flags.child_paint {
                continue;
            }
            flags.child_paint = true;
            stack.extend_from_slice(&self.parents[n as usize]);
        }
    }

    fn validate_bounds_pass(&mut self, idx: u32, changed: &mut Vec<BoundsChange>) {
        let i = idx as usize;

        if self.flags[i].child_bounds {
            self.flags[i].child_bounds = false;
            let mut union = bounds::NOTHING;
            for k in 0..self.children[i].len() {
                let child = self.children[i][k];
                self.validate_bounds_pass(child, changed);
                union = bounds::union(union, self.bounds[child as usize]);
            }
            if union != self.child_bounds[i] {
                self.child_bounds[i] = union;
                self.flags[i].bounds = true;
            }
        }

        let flags = self.flags[i];
        if flags.bounds || flags.self_bounds {
            self.flags[i].bounds = false;
            self.flags[i].self_bounds = false;
            let local = bounds::union(self.self_bounds[i], self.child_bounds[i]);
            let next = transform_bounds(self.transform[i], local);
            let old = self.bounds[i];
            if next != old {
                self.bounds[i] = next;
                if !self.listeners[i].is_empty() {
                    changed.push(BoundsChange {
                        idx,
                        generation: self.generation[i],
                        old,
                    });
                }
            }
        }
    }

    fn notify_bounds_listeners(&mut self, changed: &mut Vec<BoundsChange>) {
        for change in changed.drain(..) {
            let i = change.idx as usize;
            if !self.alive[i] || self.generation[i] != change.generation {
                continue;
            }
            let id = self.id_at(change.idx);
            let mut listeners = core::mem::take(&mut self.listeners[i]);
            for listener in &mut listeners {
                listener(self, id, change.old);
            }
            // Keep listeners registered during the callback; drop everything
            // if the node was destroyed underneath us.
            if self.alive[i] && self.generation[i] == change.generation {
                let added = core::mem::take(&mut self.listeners[i]);
                listeners.extend(added);
                self.listeners[i] = listeners;
            }
        }
    }

    fn collect_paint(&mut self, idx: u32, damage: &mut PaintDamage) {
        let i = idx as usize;
        let flags = self.flags[i];
        // Flags are cleared on the first visit, so a node reached along a
        // second path is skipped here.
        if !flags.any_paint() {
            return;
        }
        self.flags[i].paint = false;
        self.flags[i].subtree_paint = false;
        self.flags[i].child_paint = false;

        if flags.paint {
            damage.content.push(self.id_at(idx));
        }
        if flags.subtree_paint {
            damage.subtrees.push(self.id_at(idx));
        }
        if flags.child_paint {
            for k in 0..self.children[i].len() {
                let child = self.children[i][k];
                self.collect_paint(child, damage);
            }
        }
    }
}
