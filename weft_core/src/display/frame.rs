// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The update pipeline.

use alloc::vec::Vec;

use crate::backend::{Backend, Cursor, PaintDrawable, Surface};
use crate::block::BlockId;
use crate::dirty;
use crate::hit::HitFlags;
use crate::node::{NodeId, PaintDamage};
use crate::stitch::StitchOutcome;
#[cfg(feature = "trace-rich")]
use crate::trace::{BlockChange, BlockChangeKind};
use crate::trace::{
    BoundsValidationEvent, CursorEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    StitchEvent, SyncEvent, Tracer,
};

use super::{Display, RenderChanges};

impl<B: Backend> Display<B> {
    /// Brings the backend up to date with the scene.
    ///
    /// # Panics
    ///
    /// Panics if bounds validation or transform notification exceeds its
    /// configured pass cap, if the root node was destroyed, or, with
    /// [`DisplayConfig::audit`](super::DisplayConfig::audit) set, if the
    /// block partition fails its audit.
    pub fn update_display(&mut self) {
        self.update_display_traced(&mut Tracer::none());
    }

    /// Like [`update_display`](Self::update_display), reporting each step to
    /// `tracer`.
    pub fn update_display_traced(&mut self, tracer: &mut Tracer<'_>) {
        let frame_index = self.frame;
        let mut changes = RenderChanges {
            frame: frame_index,
            ..RenderChanges::default()
        };

        // 1. Settle bounds before anything reads them.
        begin(tracer, frame_index, PhaseKind::ValidateBounds);
        let (passes, roots) = self.validate_watched_bounds();
        changes.validation_passes = passes;
        tracer.bounds_validation(&BoundsValidationEvent {
            frame_index,
            passes,
            roots,
        });
        end(tracer, frame_index, PhaseKind::ValidateBounds);

        // 2. + 3. Reconcile instances.
        begin(tracer, frame_index, PhaseKind::SyncTree);
        let created_root = self.ensure_root_instance();
        let structure_changed = self.scene.take_structure_changed();
        if created_root || structure_changed {
            let stats = self.sync_tree();
            changes.tree_synced = true;
            changes.instances_created = stats.instances_created + u32::from(created_root);
            changes.drawables_created = stats.drawables_created;
            tracer.sync(&SyncEvent {
                frame_index,
                instances_created: changes.instances_created,
                instances_dropped: stats.instances_dropped,
                drawables_created: stats.drawables_created,
                drawable_count: self.pending_order.as_ref().map_or(0, |o| o.len() as u32),
            });
        }
        end(tracer, frame_index, PhaseKind::SyncTree);

        // 4. Transform watchers.
        begin(tracer, frame_index, PhaseKind::Transforms);
        changes.validation_passes += self.notify_transforms(&mut changes.transform_roots);
        end(tracer, frame_index, PhaseKind::Transforms);

        // 5. Instances first; their drawables join the drawable queue.
        begin(tracer, frame_index, PhaseKind::Dispose);
        let disposed = self.flush_disposals();
        changes.instances_disposed = disposed.instances;
        changes.drawables_disposed = disposed.drawables;
        end(tracer, frame_index, PhaseKind::Dispose);

        // 6. Stitch and repaint.
        begin(tracer, frame_index, PhaseKind::Repaint);
        self.stitch_and_repaint(&mut changes, tracer);
        end(tracer, frame_index, PhaseKind::Repaint);

        // 7. Cursor.
        begin(tracer, frame_index, PhaseKind::Cursor);
        let cursor = self.resolve_cursor();
        if self.cursor != Some(cursor) {
            self.cursor = Some(cursor);
            self.backend.set_cursor(cursor);
            changes.cursor = Some(cursor);
            tracer.cursor(&CursorEvent {
                frame_index,
                cursor,
            });
        }
        end(tracer, frame_index, PhaseKind::Cursor);

        // 8. Size.
        begin(tracer, frame_index, PhaseKind::Resize);
        if let Some(size) = self.pending_size.take() {
            self.size = size;
            self.backend.resize(size);
            changes.resized = Some(size);
        }
        end(tracer, frame_index, PhaseKind::Resize);

        // 9. Finish the frame.
        self.frame += 1;
        tracer.frame_summary(&FrameSummary {
            frame_index,
            tree_synced: changes.tree_synced,
            validation_passes: changes.validation_passes,
            transform_roots: changes.transform_roots.len() as u32,
            instance_count: self.instances.len() as u32,
            drawable_count: self.backbone.drawable_count() as u32,
            block_count: self.backbone.block_count() as u32,
            repainted_blocks: changes.repainted_blocks.len() as u32,
        });
        self.backend.present(&changes);
        self.last_changes = changes;
    }

    /// Validates the root and every live watched node. Returns the total
    /// passes and the number of roots validated.
    fn validate_watched_bounds(&mut self) -> (u32, u32) {
        let mut passes = self.scene.validate_bounds(self.root);
        let mut roots = 1;
        let scene = &mut self.scene;
        self.watched_bounds.retain(|&node| scene.is_alive(node));
        for &node in &self.watched_bounds {
            passes += scene.validate_bounds(node);
            roots += 1;
        }
        (passes, roots)
    }

    /// Drains dirty transforms and notifies watchers until no callback
    /// changes another transform. Returns the bounds validation passes spent
    /// re-settling after callbacks.
    fn notify_transforms(&mut self, out: &mut Vec<NodeId>) -> u32 {
        let mut passes = 0;
        let mut rounds = 0_u32;
        loop {
            let roots = self.scene.take_transform_roots();
            if roots.is_empty() {
                return passes;
            }
            rounds += 1;
            assert!(
                rounds <= self.config.max_transform_passes,
                "transform notification did not settle after {} rounds",
                self.config.max_transform_passes
            );

            // Passthrough watchers first, then direct ones; each fires once.
            let mut fire = Vec::new();
            for (k, watcher) in self.transform_watchers.iter().enumerate() {
                let Some(watcher) = watcher else { continue };
                if !watcher.passthrough || !self.scene.is_alive(watcher.node) {
                    continue;
                }
                let moved = roots.contains(&watcher.node)
                    || self
                        .instances_of(watcher.node)
                        .into_iter()
                        .any(|i| roots.iter().any(|&r| self.instance_trail(i).contains(r)));
                if moved {
                    fire.push(k);
                }
            }
            for (k, watcher) in self.transform_watchers.iter().enumerate() {
                let Some(watcher) = watcher else { continue };
                if !watcher.passthrough && roots.contains(&watcher.node) {
                    fire.push(k);
                }
            }
            out.extend_from_slice(&roots);

            for k in fire {
                // A previous callback cannot remove watchers, but may destroy
                // the watched node.
                if let Some(watcher) = self.transform_watchers[k].as_mut()
                    && self.scene.is_alive(watcher.node)
                {
                    (watcher.callback)(&mut self.scene, watcher.node);
                }
            }
            passes += self.validate_watched_bounds().0;
        }
    }

    fn stitch_and_repaint(&mut self, changes: &mut RenderChanges, tracer: &mut Tracer<'_>) {
        let frame_index = changes.frame;
        let stitch = match self.pending_order.take() {
            Some(order) => {
                self.backbone.set_order(&order);
                let intervals = self.backbone.change_intervals();
                self.backbone.stitch(&intervals)
            }
            None => StitchOutcome::default(),
        };

        for &block in &stitch.created {
            let renderer = self.backbone.block_renderer(block);
            let surface = self.backend.create_surface(renderer, block);
            self.backbone.attach_surface(block, surface);
        }
        let order: Vec<BlockId> = self.backbone.block_order().collect();
        if stitch.order_changed {
            for (z, &block) in order.iter().enumerate() {
                if let Some(surface) = self.backbone.surface_mut(block) {
                    surface.set_z_index(z as u32);
                }
            }
        }
        if stitch.intervals > 0 {
            tracer.stitch(&StitchEvent {
                frame_index,
                intervals: stitch.intervals,
                added: stitch.added,
                removed: stitch.removed,
                moved: stitch.moved,
                glued: stitch.glued,
                unglued: stitch.unglued,
                reused: stitch.reused,
                created: stitch.created.len() as u32,
                disposed: stitch.disposed.len() as u32,
                block_count: order.len() as u32,
            });
        }

        let damage = self.scene.validate_paint(self.root);
        self.mark_paint(&damage);
        let dirty_instances: Vec<u32> = self
            .repaint
            .drain(dirty::PAINT)
            .deterministic()
            .run()
            .collect();
        let mut dirty_blocks = Vec::new();
        for i in dirty_instances {
            if !self.instances.contains(i) {
                continue;
            }
            let Some(d) = self.instances.get(i).drawable else {
                continue;
            };
            // Hidden drawables are unlisted and have no block.
            let Some(block) = self.backbone.drawable_block(d) else {
                continue;
            };
            if let Some(paint) = self.backbone.paint_mut(d) {
                paint.mark_dirty();
            }
            changes.repainted_instances += 1;
            dirty_blocks.push(block);
        }

        for &block in &order {
            let resized = stitch.created.contains(&block) || stitch.changed.contains(&block);
            if !resized && !dirty_blocks.contains(&block) {
                continue;
            }
            let (first, last) = self.backbone.block_extent(block);
            if let Some(surface) = self.backbone.surface_mut(block) {
                if resized {
                    surface.set_extent(first, last);
                }
                surface.repaint();
            }
            changes.repainted_blocks.push(block);
        }

        if self.config.audit
            && let Err(err) = self.backbone.audit()
        {
            panic!("block partition audit failed after frame {frame_index}: {err}");
        }

        #[cfg(feature = "trace-rich")]
        {
            let kinds = [
                (&stitch.created, BlockChangeKind::Created),
                (&stitch.disposed, BlockChangeKind::Disposed),
                (&stitch.changed, BlockChangeKind::Changed),
                (&changes.repainted_blocks, BlockChangeKind::Repainted),
            ];
            let records: Vec<BlockChange> = kinds
                .into_iter()
                .flat_map(|(blocks, kind)| {
                    blocks.iter().map(move |&block| BlockChange { block, kind })
                })
                .collect();
            if !records.is_empty() {
                tracer.block_changes(frame_index, &records);
            }
        }

        changes.stitch = stitch;
    }

    /// Marks the instances reached by `damage` for repaint. Own content
    /// reaches every instance of a node, a forced subtree only the instances
    /// below the forcing node's instances. The PAINT channel keeps one mark
    /// per instance.
    fn mark_paint(&mut self, damage: &PaintDamage) {
        let mut stack = Vec::new();
        for (nodes, subtree) in [(&damage.content, false), (&damage.subtrees, true)] {
            for &node in nodes {
                let Some(list) = self.node_instances.get(node.idx as usize) else {
                    continue;
                };
                stack.extend(
                    list.iter()
                        .copied()
                        .filter(|&i| self.instances.get(i).node == node),
                );
                while let Some(i) = stack.pop() {
                    if !self.instances.contains(i) {
                        continue;
                    }
                    let slot = self.instances.get(i);
                    if slot.visible && slot.drawable.is_some() {
                        self.repaint.mark(i, dirty::PAINT);
                    }
                    if subtree {
                        stack.extend_from_slice(&slot.children);
                    }
                }
            }
        }
    }

    fn resolve_cursor(&self) -> Cursor {
        self.pointer
            .and_then(|point| {
                self.hit_tester
                    .hit_test(&self.scene, self.root, point, HitFlags::default())
            })
            .and_then(|trail| {
                trail
                    .nodes()
                    .iter()
                    .rev()
                    .find_map(|&node| self.scene.cursor(node))
            })
            .unwrap_or(self.config.fallback_cursor)
    }
}

#[inline]
fn begin(tracer: &mut Tracer<'_>, frame_index: u64, phase: PhaseKind) {
    tracer.phase_begin(&PhaseBeginEvent { frame_index, phase });
}

#[inline]
fn end(tracer: &mut Tracer<'_>, frame_index: u64, phase: PhaseKind) {
    tracer.phase_end(&PhaseEndEvent { frame_index, phase });
}
