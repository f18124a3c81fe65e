// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, DAG topology, and property
//! management.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Rect};
use understory_dirty::{CycleHandling, DirtyTracker};

use crate::backend::Cursor;
use crate::bounds::NOTHING;
use crate::dirty;
use crate::renderer::Renderer;
use crate::trail::Trail;

use super::id::{INVALID, NodeId};
use super::traverse::{Children, Parents};

/// Default cap on bounds-validation re-runs before validation is declared
/// divergent.
pub const DEFAULT_MAX_VALIDATION_PASSES: u32 = 64;

/// Called with the node whose aggregate bounds changed and its previous
/// bounds. The listener may mutate the store.
pub type BoundsListener = Box<dyn FnMut(&mut NodeStore, NodeId, Rect)>;

/// Per-node dirty flags for the geometry and paint families.
///
/// A set flag implies the matching `child_*` flag is set on every ancestor.
/// Flags are only cleared by the validation pass that consumes them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeDirty {
    /// The node's own extent changed.
    pub self_bounds: bool,
    /// Some descendant's bounds are stale.
    pub child_bounds: bool,
    /// The node's aggregate bounds are stale.
    pub bounds: bool,
    /// The node's own visual content changed.
    pub paint: bool,
    /// The node and every descendant must repaint.
    pub subtree_paint: bool,
    /// Some descendant has a paint flag set.
    pub child_paint: bool,
}

impl NodeDirty {
    /// Whether any geometry flag is set.
    #[inline]
    #[must_use]
    pub const fn any_bounds(self) -> bool {
        self.self_bounds || self.child_bounds || self.bounds
    }

    /// Whether any paint flag is set.
    #[inline]
    #[must_use]
    pub const fn any_paint(self) -> bool {
        self.paint || self.subtree_paint || self.child_paint
    }
}

/// Struct-of-arrays storage for all scene nodes.
///
/// Nodes are addressed by [`NodeId`] handles. A node may have several parents
/// (the scene is a DAG); parent lists are back-references and do not own
/// anything. Destroyed nodes are recycled via a free list, and generation
/// counters prevent stale handle access.
pub struct NodeStore {
    // -- Topology --
    pub(crate) children: Vec<Vec<u32>>,
    pub(crate) parents: Vec<Vec<u32>>,

    // -- Local properties (set by callers) --
    pub(crate) transform: Vec<Affine>,
    pub(crate) self_bounds: Vec<Rect>,
    pub(crate) renderer: Vec<Option<Renderer>>,
    pub(crate) visible: Vec<bool>,
    pub(crate) cursor: Vec<Option<Cursor>>,

    // -- Computed properties (written by validation) --
    pub(crate) child_bounds: Vec<Rect>,
    pub(crate) bounds: Vec<Rect>,

    // -- Invalidation --
    pub(crate) flags: Vec<NodeDirty>,
    pub(crate) listeners: Vec<Vec<BoundsListener>>,
    pub(crate) max_validation_passes: u32,
    pub(crate) validation_depth: u32,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty channels --
    pub(crate) dirty: DirtyTracker<u32>,
}

impl fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("max_validation_passes", &self.max_validation_passes)
            .field("validation_depth", &self.validation_depth)
            .finish_non_exhaustive()
    }
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            parents: Vec::new(),
            transform: Vec::new(),
            self_bounds: Vec::new(),
            renderer: Vec::new(),
            visible: Vec::new(),
            cursor: Vec::new(),
            child_bounds: Vec::new(),
            bounds: Vec::new(),
            flags: Vec::new(),
            listeners: Vec::new(),
            max_validation_passes: DEFAULT_MAX_VALIDATION_PASSES,
            validation_depth: 0,
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    /// Sets the cap on bounds-validation passes.
    ///
    /// # Panics
    ///
    /// Panics if `passes` is zero.
    pub fn set_max_validation_passes(&mut self, passes: u32) {
        assert!(passes > 0, "validation pass cap must be at least 1");
        self.max_validation_passes = passes;
    }

    /// Returns the cap on bounds-validation passes.
    #[must_use]
    pub fn max_validation_passes(&self) -> u32 {
        self.max_validation_passes
    }

    // -- Allocation API --

    /// Creates a new node and returns its handle.
    ///
    /// The node starts with an identity transform, empty self bounds, no
    /// renderer, no cursor, no parents, and is visible.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.children[i].clear();
            self.parents[i].clear();
            self.transform[i] = Affine::IDENTITY;
            self.self_bounds[i] = NOTHING;
            self.renderer[i] = None;
            self.visible[i] = true;
            self.cursor[i] = None;
            self.child_bounds[i] = NOTHING;
            self.bounds[i] = NOTHING;
            self.flags[i] = NodeDirty::default();
            self.listeners[i].clear();
            self.alive[i] = true;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.children.push(Vec::new());
            self.parents.push(Vec::new());
            self.transform.push(Affine::IDENTITY);
            self.self_bounds.push(NOTHING);
            self.renderer.push(None);
            self.visible.push(true);
            self.cursor.push(None);
            self.child_bounds.push(NOTHING);
            self.bounds.push(NOTHING);
            self.flags.push(NodeDirty::default());
            self.listeners.push(Vec::new());
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        self.dirty.mark(idx, dirty::TOPOLOGY);

        NodeId::new(idx, self.generation[idx as usize])
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the node still has children or parents, or if the handle is
    /// stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let i = id.idx as usize;
        assert!(
            self.children[i].is_empty(),
            "cannot destroy node with children"
        );
        assert!(
            self.parents[i].is_empty(),
            "cannot destroy node that is still attached to a parent"
        );

        self.dirty.remove_key(id.idx);
        self.listeners[i].clear();

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.alive[i] = false;
        self.free_list.push(id.idx);
        self.dirty.mark(id.idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.alive[id.idx as usize]
            && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Appends `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` is already a child of
    /// `parent`, or if the edge would create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        let index = self.children[parent.idx as usize].len();
        self.insert_child(parent, index, child);
    }

    /// Inserts `child` at `index` in `parent`'s child list.
    ///
    /// A node may be a child of several parents; each edge produces a
    /// separate [`Trail`] and therefore a separate rendered occurrence.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, `index` is past the end, `child` is
    /// already a child of `parent`, or the edge would create a cycle.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            index <= self.children[p as usize].len(),
            "child index {index} out of range for {parent:?} ({} children)",
            self.children[p as usize].len()
        );
        assert!(
            !self.children[p as usize].contains(&c),
            "duplicate child {child:?} under {parent:?}"
        );
        assert!(
            !self.reaches_upward(p, c),
            "adding {child:?} under {parent:?} would create a cycle"
        );

        self.children[p as usize].insert(index, c);
        self.parents[c as usize].push(p);

        // The child's own pending state must become visible from its new
        // ancestry.
        let child_flags = self.flags[c as usize];
        self.invalidate_child_bounds_raw(p);
        if child_flags.any_paint() {
            self.mark_child_paint_raw(p);
        }
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from `parent`'s child list.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `child` is not a child of
    /// `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let index = self.children[parent.idx as usize]
            .iter()
            .position(|&c| c == child.idx);
        let Some(index) = index else {
            panic!("{child:?} is not a child of {parent:?}");
        };
        self.remove_child_at(parent, index, child);
    }

    /// Removes the child at `index`, which the caller asserts is `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the handles are stale or the child at `index` is not
    /// `expected`.
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize, expected: NodeId) {
        self.validate(parent);
        self.validate(expected);
        let p = parent.idx;
        let c = expected.idx;
        assert!(
            self.children[p as usize].get(index) == Some(&c),
            "child index mismatch: {expected:?} is not at index {index} of {parent:?}"
        );

        self.children[p as usize].remove(index);
        let parents = &mut self.parents[c as usize];
        if let Some(pos) = parents.iter().position(|&x| x == p) {
            parents.swap_remove(pos);
        }

        self.invalidate_child_bounds_raw(p);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        self.validate(parent);
        while let Some(&last) = self.children[parent.idx as usize].last() {
            let index = self.children[parent.idx as usize].len() - 1;
            let child = self.id_at(last);
            self.remove_child_at(parent, index, child);
        }
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns an iterator over the parents of a node.
    #[must_use]
    pub fn parents(&self, id: NodeId) -> Parents<'_> {
        self.validate(id);
        Parents::new(self, &self.parents[id.idx as usize])
    }

    /// Returns the number of children of a node.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.validate(id);
        self.children[id.idx as usize].len()
    }

    /// Returns the child at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `index` is out of range.
    #[must_use]
    pub fn child_at(&self, id: NodeId, index: usize) -> NodeId {
        self.validate(id);
        self.id_at(self.children[id.idx as usize][index])
    }

    /// Returns whether `child` is a direct child of `parent`.
    #[must_use]
    pub fn has_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.validate(parent);
        self.validate(child);
        self.children[parent.idx as usize].contains(&child.idx)
    }

    /// Returns the live nodes that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.alive[idx as usize] && self.parents[idx as usize].is_empty())
            .map(|idx| self.id_at(idx))
            .collect()
    }

    /// Returns the single path from a root to `id`.
    ///
    /// Operations that address "the" rendered position of a node are only
    /// meaningful when that position is unique.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or any node on the way up has more than
    /// one parent.
    #[must_use]
    pub fn unique_trail(&self, id: NodeId) -> Trail {
        self.validate(id);
        let mut path = Vec::new();
        let mut current = id.idx;
        loop {
            path.push(current);
            match self.parents[current as usize].as_slice() {
                [] => break,
                [parent] => current = *parent,
                many => panic!(
                    "{id:?} is shared: {:?} has {} parents, so its trail is ambiguous",
                    self.id_at(current),
                    many.len()
                ),
            }
        }
        path.reverse();
        let mut trail = Trail::root(self.id_at(path[0]));
        for pair in path.windows(2) {
            let index = self.children[pair[0] as usize]
                .iter()
                .position(|&c| c == pair[1])
                .unwrap_or_default();
            trail = trail.with_child(self.id_at(pair[1]), index as u32);
        }
        trail
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the local transform (node frame to parent frame).
    #[must_use]
    pub fn transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.transform[id.idx as usize]
    }

    /// Returns the node's own extent in its local frame.
    #[must_use]
    pub fn self_bounds(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.self_bounds[id.idx as usize]
    }

    /// Returns the union of the children's bounds in the node's local frame.
    ///
    /// Only valid after [`validate_bounds`](Self::validate_bounds).
    #[must_use]
    pub fn child_bounds(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.child_bounds[id.idx as usize]
    }

    /// Returns the aggregate bounds in the parent frame.
    ///
    /// Only valid after [`validate_bounds`](Self::validate_bounds).
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.bounds[id.idx as usize]
    }

    /// Returns the renderer used for the node's own paint, if any.
    #[must_use]
    pub fn renderer(&self, id: NodeId) -> Option<Renderer> {
        self.validate(id);
        self.renderer[id.idx as usize]
    }

    /// Returns whether the node is visible.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Returns the cursor requested while the pointer is over this node.
    #[must_use]
    pub fn cursor(&self, id: NodeId) -> Option<Cursor> {
        self.validate(id);
        self.cursor[id.idx as usize]
    }

    /// Returns the node's dirty flags.
    #[must_use]
    pub fn dirty_flags(&self, id: NodeId) -> NodeDirty {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the local transform.
    ///
    /// Marks the TRANSFORM channel, invalidates the node's bounds in its
    /// parent frame, and requests a repaint of the whole subtree.
    pub fn set_transform(&mut self, id: NodeId, transform: Affine) {
        self.validate(id);
        if self.transform[id.idx as usize] == transform {
            return;
        }
        self.transform[id.idx as usize] = transform;
        self.dirty.mark(id.idx, dirty::TRANSFORM);
        self.invalidate_bounds_raw(id.idx);
        self.invalidate_subtree_paint_raw(id.idx);
    }

    /// Sets the renderer for the node's own paint.
    ///
    /// `None` makes the node a pure grouping node. Changing the renderer
    /// replaces the node's drawables on the next display update.
    pub fn set_renderer(&mut self, id: NodeId, renderer: Option<Renderer>) {
        self.validate(id);
        if self.renderer[id.idx as usize] == renderer {
            return;
        }
        self.renderer[id.idx as usize] = renderer;
        self.dirty.mark(id.idx, dirty::TOPOLOGY);
    }

    /// Shows or hides the node and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        if self.visible[id.idx as usize] == visible {
            return;
        }
        self.visible[id.idx as usize] = visible;
        self.dirty.mark(id.idx, dirty::TOPOLOGY);
    }

    /// Sets the cursor requested while the pointer is over this node.
    pub fn set_cursor(&mut self, id: NodeId, cursor: Option<Cursor>) {
        self.validate(id);
        self.cursor[id.idx as usize] = cursor;
    }

    /// Registers a listener fired whenever validation changes the node's
    /// aggregate bounds.
    pub fn add_bounds_listener(&mut self, id: NodeId, listener: BoundsListener) {
        self.validate(id);
        self.listeners[id.idx as usize].push(listener);
    }

    /// Drops every bounds listener registered on the node.
    pub fn clear_bounds_listeners(&mut self, id: NodeId) {
        self.validate(id);
        self.listeners[id.idx as usize].clear();
    }

    // -- Raw-index helpers --

    /// Builds a handle for a raw slot, using the slot's current generation.
    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId::new(idx, self.generation[idx as usize])
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                INVALID
            }
        );
    }

    /// Returns `true` if `target` is `from` or an ancestor of `from`.
    fn reaches_upward(&self, from: u32, target: u32) -> bool {
        let mut stack = alloc::vec![from];
        let mut seen = BTreeSet::new();
        while let Some(n) = stack.pop() {
            if n == target {
                return true;
            }
            if seen.insert(n) {
                stack.extend_from_slice(&self.parents[n as usize]);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        assert!(store.is_alive(id));
        store.destroy_node(id);
        assert!(!store.is_alive(id));
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = NodeStore::new();
        let id1 = store.create_node();
        store.destroy_node(id1);
        let id2 = store.create_node();
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn insert_and_query_children() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let a = store.create_node();
        let b = store.create_node();
        let c = store.create_node();

        store.add_child(parent, a);
        store.add_child(parent, c);
        store.insert_child(parent, 1, b);

        let kids: Vec<_> = store.children(parent).collect();
        assert_eq!(kids, vec![a, b, c]);
        assert_eq!(store.child_at(parent, 2), c);
        assert!(store.has_child(parent, b));
    }

    #[test]
    fn shared_child_has_two_parents() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let left = store.create_node();
        let right = store.create_node();
        let shared = store.create_node();
        store.add_child(root, left);
        store.add_child(root, right);
        store.add_child(left, shared);
        store.add_child(right, shared);

        let parents: Vec<_> = store.parents(shared).collect();
        assert_eq!(parents.len(), 2);
        assert!(parents.contains(&left));
        assert!(parents.contains(&right));
        assert_eq!(store.roots(), vec![root]);
    }

    #[test]
    fn remove_child_detaches_both_directions() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        store.remove_child(parent, child);
        assert_eq!(store.child_count(parent), 0);
        assert_eq!(store.parents(child).count(), 0);
    }

    #[test]
    fn clear_children_empties_list() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        for _ in 0..3 {
            let child = store.create_node();
            store.add_child(parent, child);
        }
        store.clear_children(parent);
        assert_eq!(store.child_count(parent), 0);
    }

    #[test]
    fn unique_trail_follows_single_parents() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let mid = store.create_node();
        let other = store.create_node();
        let leaf = store.create_node();
        store.add_child(root, other);
        store.add_child(root, mid);
        store.add_child(mid, leaf);

        let trail = store.unique_trail(leaf);
        assert_eq!(trail.nodes(), &[root, mid, leaf]);
        assert_eq!(trail.indices(), &[1, 0]);
    }

    #[test]
    #[should_panic(expected = "trail is ambiguous")]
    fn unique_trail_rejects_shared_nodes() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();
        let shared = store.create_node();
        store.add_child(a, shared);
        store.add_child(b, shared);
        let _ = store.unique_trail(shared);
    }

    #[test]
    #[should_panic(expected = "duplicate child")]
    fn duplicate_child_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        store.add_child(parent, child);
    }

    #[test]
    #[should_panic(expected = "would create a cycle")]
    fn cycle_panics() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();
        let c = store.create_node();
        store.add_child(a, b);
        store.add_child(b, c);
        store.add_child(c, a);
    }

    #[test]
    #[should_panic(expected = "would create a cycle")]
    fn self_child_panics() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        store.add_child(a, a);
    }

    #[test]
    #[should_panic(expected = "child index mismatch")]
    fn remove_with_wrong_index_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let a = store.create_node();
        let b = store.create_node();
        store.add_child(parent, a);
        store.add_child(parent, b);
        store.remove_child_at(parent, 0, b);
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        store.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "still attached")]
    fn destroy_attached_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        store.destroy_node(child);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_transform() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        store.destroy_node(id);
        let _ = store.transform(id);
    }

    #[test]
    fn topology_and_property_changes_mark_structure() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        assert!(store.take_structure_changed());
        assert!(!store.take_structure_changed());

        store.set_renderer(root, Some(Renderer::Canvas));
        assert!(store.take_structure_changed());

        store.set_renderer(root, Some(Renderer::Canvas));
        assert!(!store.take_structure_changed(), "no-op set is not a change");

        store.set_visible(root, false);
        assert!(store.take_structure_changed());
    }

    #[test]
    fn set_transform_reports_transform_root() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        let _ = store.take_transform_roots();

        store.set_transform(id, Affine::translate((4.0, 0.0)));
        assert_eq!(store.take_transform_roots(), vec![id]);
        assert!(store.take_transform_roots().is_empty());
    }
}
