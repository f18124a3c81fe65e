// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame orchestrator.
//!
//! A [`Display`] renders the subtree below one root node of a [`NodeStore`].
//! It owns the scene, a [`Backend`], the instance tree mirroring the scene
//! below the root, and the [`Backbone`] holding drawables and blocks.
//!
//! Callers mutate the scene through [`Display::scene_mut`] between frames and
//! call [`Display::update_display`] once per tick. An update runs these
//! steps, in order:
//!
//! 1. Validate bounds of the root and every watched node.
//! 2. Create the root instance on the first update.
//! 3. Re-sync the instance tree if the scene's structure changed.
//! 4. Notify transform watchers for nodes whose transform changed.
//! 5. Dispose dropped instance subtrees, then their drawables.
//! 6. Stitch the new drawable order into blocks and repaint surfaces.
//! 7. Hit test the pointer and update the cursor.
//! 8. Apply a pending size change.
//! 9. Advance the frame counter and present.
//!
//! What the update did is summarized in a [`RenderChanges`], handed to
//! [`Backend::present`] and kept for [`Display::last_changes`].

mod config;
mod frame;
mod sync;

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Size};
use understory_dirty::{CycleHandling, DirtyTracker};

pub use config::DisplayConfig;

use crate::backbone::Backbone;
use crate::backend::{Backend, Cursor};
use crate::block::BlockId;
use crate::drawable::DrawableId;
use crate::handle::INVALID;
use crate::hit::{BoundsHitTester, HitTest};
use crate::instance::{InstanceId, InstanceStore};
use crate::node::{NodeId, NodeStore};
use crate::stitch::StitchOutcome;
use crate::trail::Trail;

/// Called with the watched node after its transform, or an ancestor's,
/// changed.
pub type TransformCallback = Box<dyn FnMut(&mut NodeStore, NodeId)>;

/// A handle to a transform watcher registered with
/// [`Display::watch_transform`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatchId(u32);

struct TransformWatcher {
    node: NodeId,
    /// Also fire when an ancestor on any of the node's trails moved.
    passthrough: bool,
    callback: TransformCallback,
}

/// What one [`Display::update_display`] call did.
#[derive(Clone, Debug, Default)]
pub struct RenderChanges {
    /// Frame counter value during the update.
    pub frame: u64,
    /// Whether the instance tree was re-synced.
    pub tree_synced: bool,
    /// Bounds validation passes, summed over every validated root.
    pub validation_passes: u32,
    /// Nodes whose local transform changed, in notification order.
    pub transform_roots: Vec<NodeId>,
    /// Instances created by the sync.
    pub instances_created: u32,
    /// Instances disposed.
    pub instances_disposed: u32,
    /// Drawables created by the sync.
    pub drawables_created: u32,
    /// Drawables retired.
    pub drawables_disposed: u32,
    /// The stitch pass, or the default if the order did not change.
    pub stitch: StitchOutcome,
    /// Blocks whose surface was repainted, in block order.
    pub repainted_blocks: Vec<BlockId>,
    /// Instances whose paint was marked dirty.
    pub repainted_instances: u32,
    /// The new cursor, if it changed.
    pub cursor: Option<Cursor>,
    /// The new size, if one was applied.
    pub resized: Option<Size>,
}

/// Renders the subtree below one root node.
pub struct Display<B: Backend> {
    scene: NodeStore,
    root: NodeId,
    backend: B,
    hit_tester: Box<dyn HitTest>,
    config: DisplayConfig,

    // -- Instance tree --
    instances: InstanceStore,
    trails: BTreeMap<Trail, u32>,
    /// Instance slots per node slot. May hold instances of a dead node that
    /// reused the slot until the next sync drops them.
    node_instances: Vec<Vec<u32>>,
    root_instance: u32,
    sync_epoch: u32,

    backbone: Backbone<B::Paint, B::Surface>,

    // -- Per-update queues --
    instance_disposals: Vec<u32>,
    drawable_disposals: Vec<DrawableId>,
    pending_order: Option<Vec<DrawableId>>,
    repaint: DirtyTracker<u32>,

    transform_watchers: Vec<Option<TransformWatcher>>,
    watched_bounds: Vec<NodeId>,

    // -- Window state --
    pointer: Option<Point>,
    cursor: Option<Cursor>,
    size: Size,
    pending_size: Option<Size>,

    frame: u64,
    last_changes: RenderChanges,
}

impl<B: Backend> fmt::Debug for Display<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("root", &self.root)
            .field("frame", &self.frame)
            .field("instances", &self.instances.len())
            .field("drawables", &self.backbone.drawable_count())
            .field("blocks", &self.backbone.block_count())
            .field("cursor", &self.cursor)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Display<B> {
    /// Creates a display of the subtree below `root` with the default
    /// configuration.
    ///
    /// # Panics
    ///
    /// Panics if `root` is stale.
    #[must_use]
    pub fn new(scene: NodeStore, root: NodeId, backend: B) -> Self {
        Self::with_config(scene, root, backend, DisplayConfig::new())
    }

    /// Creates a display with an explicit configuration.
    ///
    /// The configuration's validation pass cap is applied to `scene`.
    ///
    /// # Panics
    ///
    /// Panics if `root` is stale or a pass cap is zero.
    #[must_use]
    pub fn with_config(
        mut scene: NodeStore,
        root: NodeId,
        backend: B,
        config: DisplayConfig,
    ) -> Self {
        scene.validate(root);
        scene.set_max_validation_passes(config.max_validation_passes);
        assert!(
            config.max_transform_passes > 0,
            "transform pass cap must be at least 1"
        );
        Self {
            scene,
            root,
            backend,
            hit_tester: Box::new(BoundsHitTester),
            config,
            instances: InstanceStore::default(),
            trails: BTreeMap::new(),
            node_instances: Vec::new(),
            root_instance: INVALID,
            sync_epoch: 0,
            backbone: Backbone::new(),
            instance_disposals: Vec::new(),
            drawable_disposals: Vec::new(),
            pending_order: None,
            repaint: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            transform_watchers: Vec::new(),
            watched_bounds: Vec::new(),
            pointer: None,
            cursor: None,
            size: Size::ZERO,
            pending_size: Some(config.initial_size),
            frame: 0,
            last_changes: RenderChanges::default(),
        }
    }

    /// Replaces the hit tester used to resolve the cursor.
    pub fn set_hit_tester(&mut self, hit_tester: impl HitTest + 'static) {
        self.hit_tester = Box::new(hit_tester);
    }

    // -- Scene and backend --

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &NodeStore {
        &self.scene
    }

    /// Mutable access to the scene. Changes take effect on the next update.
    pub fn scene_mut(&mut self) -> &mut NodeStore {
        &mut self.scene
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The drawables and blocks.
    #[must_use]
    pub fn backbone(&self) -> &Backbone<B::Paint, B::Surface> {
        &self.backbone
    }

    /// The drawable order installed by the last update.
    pub fn drawable_order(&self) -> impl Iterator<Item = DrawableId> + '_ {
        self.backbone.drawable_order()
    }

    /// The blocks, bottom first.
    pub fn block_order(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.backbone.block_order()
    }

    /// The drawables of `block`, in paint order.
    pub fn block_drawables(&self, block: BlockId) -> impl Iterator<Item = DrawableId> + '_ {
        self.backbone.block_drawables(block)
    }

    // -- Frame state --

    /// Number of completed updates.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The cursor last pushed to the backend, or the fallback before the
    /// first update.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor.unwrap_or(self.config.fallback_cursor)
    }

    /// The size last applied.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// The pointer location, in root coordinates.
    #[must_use]
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// What the last update did.
    #[must_use]
    pub fn last_changes(&self) -> &RenderChanges {
        &self.last_changes
    }

    /// Records the pointer location, or `None` when it left the display. The
    /// cursor is recomputed on the next update.
    pub fn set_pointer(&mut self, pointer: Option<Point>) {
        self.pointer = pointer;
    }

    /// Requests a new size, applied at the end of the next update.
    pub fn set_size(&mut self, size: Size) {
        if size == self.size && self.pending_size.is_none() {
            return;
        }
        self.pending_size = Some(size);
    }

    // -- Watchers --

    /// Validates `node`'s bounds at the start of every update, so listeners
    /// on nodes outside the root's subtree still settle before sync.
    pub fn watch_bounds(&mut self, node: NodeId) {
        self.scene.validate(node);
        if !self.watched_bounds.contains(&node) {
            self.watched_bounds.push(node);
        }
    }

    /// Stops validating `node` each update.
    pub fn unwatch_bounds(&mut self, node: NodeId) {
        self.watched_bounds.retain(|&n| n != node);
    }

    /// Calls `callback` once per update round in which `node`'s transform
    /// changed.
    ///
    /// With `passthrough`, a change to any node on one of `node`'s trails
    /// below the root also fires it. Passthrough watchers are notified before
    /// direct ones. The callback may mutate the scene; transforms it changes
    /// start another round.
    pub fn watch_transform(
        &mut self,
        node: NodeId,
        passthrough: bool,
        callback: impl FnMut(&mut NodeStore, NodeId) + 'static,
    ) -> WatchId {
        self.scene.validate(node);
        let watcher = TransformWatcher {
            node,
            passthrough,
            callback: Box::new(callback),
        };
        let slot = self.transform_watchers.iter().position(Option::is_none);
        let idx = match slot {
            Some(idx) => {
                self.transform_watchers[idx] = Some(watcher);
                idx
            }
            None => {
                self.transform_watchers.push(Some(watcher));
                self.transform_watchers.len() - 1
            }
        };
        WatchId(idx as u32)
    }

    /// Removes a transform watcher. Returns `false` if it was already gone.
    pub fn unwatch_transform(&mut self, id: WatchId) -> bool {
        self.transform_watchers
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .is_some()
    }

    // -- Instances --

    /// Number of live instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Every instance of `node`, in creation order.
    #[must_use]
    pub fn instances_of(&self, node: NodeId) -> Vec<InstanceId> {
        self.node_instances
            .get(node.idx as usize)
            .into_iter()
            .flatten()
            .filter(|&&i| self.instances.get(i).node == node)
            .map(|&i| self.instances.id_at(i))
            .collect()
    }

    /// The only instance of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` has no instance, or several because it is shared.
    #[must_use]
    pub fn unique_instance(&self, node: NodeId) -> InstanceId {
        let instances = self.instances_of(node);
        match instances.as_slice() {
            [only] => *only,
            [] => panic!("{node:?} has no instance in this display"),
            _ => panic!(
                "{node:?} has {} instances; a shared node has no unique instance",
                instances.len()
            ),
        }
    }

    /// The trail of `instance`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn instance_trail(&self, instance: InstanceId) -> &Trail {
        self.instances.validate(instance);
        &self.instances.get(instance.idx).trail
    }

    /// The node `instance` renders.
    #[must_use]
    pub fn instance_node(&self, instance: InstanceId) -> NodeId {
        self.instances.validate(instance);
        self.instances.get(instance.idx).node
    }

    /// The drawable painting `instance`'s node, if it has one.
    #[must_use]
    pub fn instance_drawable(&self, instance: InstanceId) -> Option<DrawableId> {
        self.instances.validate(instance);
        self.instances.get(instance.idx).drawable
    }

    /// Whether `instance` and every ancestor instance are visible.
    #[must_use]
    pub fn is_instance_visible(&self, instance: InstanceId) -> bool {
        self.instances.validate(instance);
        self.instances.get(instance.idx).visible
    }

    /// The instance owning `drawable`.
    #[must_use]
    pub fn drawable_instance(&self, drawable: DrawableId) -> Option<InstanceId> {
        if !self.backbone.is_drawable_alive(drawable) {
            return None;
        }
        let idx = self.backbone.drawables.slot(drawable.idx).instance;
        self.instances
            .contains(idx)
            .then(|| self.instances.id_at(idx))
    }

    /// Whether `instance` is live.
    #[must_use]
    pub fn is_instance_alive(&self, instance: InstanceId) -> bool {
        self.instances.is_alive(instance)
    }
}
