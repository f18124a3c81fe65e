// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental block stitching.
//!
//! Given the change intervals between the previous and the current drawable
//! order, [`Backbone::stitch`] repairs the block partition so that blocks are
//! again maximal same-renderer runs, touching only the changed spans and the
//! blocks that hold their anchors.
//!
//! The pass runs in phases:
//!
//! 1. **Removal marking.** Walk each interval's interior in the previous
//!    order. A block whose whole extent lies inside one interval loses all of
//!    its drawables and goes to the reusable pool.
//! 2. **Addition marking.** Flag each interval's interior in the current
//!    order.
//! 3. **Assignment.** Walk each interval's interior in the current order and
//!    give every same-renderer run a block: the `after` anchor's block when
//!    the run joins it, else a pooled block of the right renderer (most
//!    recently pooled first), else a new one.
//! 4. **Edges.** Where the interval meets `after`, either *glue* (the run
//!    joins a different block, which is absorbed and pooled) or *unglue*
//!    (`before` and `after` shared a block but are now separated, so `after`
//!    and its tail move to another block).
//! 5. **Extents.** Recompute first/last for every block that gained or lost
//!    drawables.
//! 6. **Disposal.** Blocks still pooled are disposed.
//! 7. **Block order.** If the partition changed, relink blocks in paint order.

use alloc::vec::Vec;

use crate::backbone::Backbone;
use crate::backend::{PaintDrawable, Surface};
use crate::block::BlockId;
use crate::drawable::DrawableId;
use crate::handle::INVALID;
use crate::interval::ChangeInterval;
use crate::renderer::Renderer;

/// What a stitch pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StitchOutcome {
    /// Number of change intervals processed.
    pub intervals: u32,
    /// Drawables that joined the order.
    pub added: u32,
    /// Drawables that left the order.
    pub removed: u32,
    /// Kept drawables that changed block.
    pub moved: u32,
    /// Blocks merged into the block before them.
    pub glued: u32,
    /// Blocks split at an `after` anchor.
    pub unglued: u32,
    /// Pooled blocks handed back out within the same pass.
    pub reused: u32,
    /// Blocks created by this pass. They have no surface yet.
    pub created: Vec<BlockId>,
    /// Blocks disposed by this pass. Their handles are stale.
    pub disposed: Vec<BlockId>,
    /// Surviving blocks whose membership may have changed.
    pub changed: Vec<BlockId>,
    /// Whether the sequence of blocks differs from before the pass.
    pub order_changed: bool,
}

impl StitchOutcome {
    /// Whether the pass changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added == 0
            && self.removed == 0
            && self.moved == 0
            && self.created.is_empty()
            && self.disposed.is_empty()
            && self.changed.is_empty()
            && !self.order_changed
    }
}

impl<P: PaintDrawable, S: Surface> Backbone<P, S> {
    /// Repairs the block partition after [`set_order`](Self::set_order).
    ///
    /// `intervals` must be ordered, non-overlapping, and anchored on
    /// drawables present in both orders (as produced by
    /// [`change_intervals`](Self::change_intervals)). Retired drawables are
    /// released at the end of the pass, even when `intervals` is empty.
    ///
    /// # Panics
    ///
    /// Panics if the intervals are malformed.
    pub fn stitch(&mut self, intervals: &[ChangeInterval]) -> StitchOutcome {
        let mut out = StitchOutcome::default();
        self.check_intervals(intervals);

        if !intervals.is_empty() {
            out.intervals = intervals.len() as u32;
            self.pool.clear();
            self.probes.clear();
            self.pending.clear();

            for interval in intervals {
                self.mark_removals(interval, &mut out);
            }
            for interval in intervals {
                self.mark_additions(interval, &mut out);
            }
            for interval in intervals {
                self.stitch_interval(interval, &mut out);
            }
            self.repair_extents(&mut out);
            self.dispose_pool(&mut out);
            if out.order_changed || !out.changed.is_empty() {
                out.order_changed = self.rebuild_block_order();
            }
            self.clear_pending(&mut out);
        }

        self.release_retired();
        out
    }

    fn check_intervals(&self, intervals: &[ChangeInterval]) {
        let mut floor_old = 0_u32;
        let mut floor_new = 0_u32;
        for (k, interval) in intervals.iter().enumerate() {
            let before = self.anchor(interval.before, k == 0, "before");
            let after = self.anchor(interval.after, k + 1 == intervals.len(), "after");

            let (old_start, new_start) = match before {
                INVALID => (0, 0),
                b => {
                    let slot = self.drawables.slot(b);
                    (slot.old_index + 1, slot.index + 1)
                }
            };
            let (old_end, new_end) = match after {
                INVALID => (self.old_order.len() as u32, self.order.len() as u32),
                a => {
                    let slot = self.drawables.slot(a);
                    (slot.old_index, slot.index)
                }
            };
            assert!(
                old_start >= floor_old && new_start >= floor_new,
                "change intervals overlap or are out of order at interval {k}"
            );
            assert!(
                old_start <= old_end && new_start <= new_end,
                "change interval {k} is inverted"
            );
            assert!(
                old_start < old_end || new_start < new_end,
                "change interval {k} is empty"
            );
            floor_old = old_end;
            floor_new = new_end;
        }
    }

    /// Resolves an anchor to a raw index, checking it is listed in both
    /// orders. `None` is only valid at the ends of the interval chain.
    fn anchor(&self, anchor: Option<DrawableId>, at_end: bool, side: &str) -> u32 {
        match anchor {
            None => {
                assert!(at_end, "open {side} anchor inside the interval chain");
                INVALID
            }
            Some(id) => {
                self.drawables.validate(id);
                let slot = self.drawables.slot(id.idx);
                assert!(
                    slot.flags.used && slot.was_listed(),
                    "change interval anchor {id:?} is not in both drawable orders"
                );
                id.idx
            }
        }
    }

    fn mark_removals(&mut self, interval: &ChangeInterval, out: &mut StitchOutcome) {
        let end = raw(interval.after);
        let mut d = match raw(interval.before) {
            INVALID => self.old_first,
            before => self.drawables.slot(before).old_next,
        };
        // A block whose first drawable was seen in this walk is wholly
        // interior once its last drawable is seen too.
        let mut opened = INVALID;
        while d != end {
            assert!(d != INVALID, "change interval runs past the previous order");
            let slot = self.drawables.slot_mut(d);
            slot.flags.pending_removal = true;
            let next = slot.old_next;
            let block = slot.block;
            self.pending.push(d);
            if block != INVALID {
                let extent = self.blocks.slot(block);
                if extent.first == d {
                    opened = block;
                }
                if extent.last == d && opened == block {
                    self.pool_block(block);
                    out.order_changed = true;
                }
            }
            d = next;
        }
    }

    fn mark_additions(&mut self, interval: &ChangeInterval, out: &mut StitchOutcome) {
        let end = raw(interval.after);
        let mut d = self.interior_start(raw(interval.before));
        while d != end {
            assert!(d != INVALID, "change interval runs past the current order");
            let slot = self.drawables.slot_mut(d);
            if !slot.flags.pending_removal {
                out.added += 1;
            }
            slot.flags.pending_addition = true;
            let next = slot.next;
            self.pending.push(d);
            d = next;
        }
    }

    fn stitch_interval(&mut self, interval: &ChangeInterval, out: &mut StitchOutcome) {
        let before = raw(interval.before);
        let after = raw(interval.after);
        let before_block = if before == INVALID {
            INVALID
        } else {
            self.drawables.block_at(before)
        };
        if before != INVALID {
            self.probes.push((before_block, before));
        }

        let mut last = before;
        let mut current = before_block;
        let mut d = self.interior_start(before);
        while d != after {
            if last == INVALID || self.gap(last, d) {
                current = self.block_for_run(d, before, after, out);
            }
            self.assign(d, current);
            last = d;
            d = self.drawables.slot(d).next;
        }

        if after == INVALID {
            return;
        }
        let after_block = self.drawables.block_at(after);
        let shares_before = before != INVALID && self.drawables.block_at(before) == after_block;
        let joins = last != INVALID && !self.gap(last, after);
        if joins {
            let last_block = self.drawables.block_at(last);
            if last_block != after_block {
                self.absorb(after, after_block, last_block);
                if shares_before {
                    // The run in between took a block of its own; `before`
                    // keeps the old one.
                    out.unglued += 1;
                } else {
                    self.pool_block(after_block);
                    out.glued += 1;
                }
                out.order_changed = true;
            }
        } else if shares_before {
            let split = self.match_block(self.drawables.renderer_at(after), out);
            self.absorb(after, after_block, split);
            out.unglued += 1;
            out.order_changed = true;
        }
        let settled = self.drawables.block_at(after);
        self.probes.push((settled, after));
    }

    /// Picks the block for the run starting at `start`.
    fn block_for_run(
        &mut self,
        start: u32,
        before: u32,
        after: u32,
        out: &mut StitchOutcome,
    ) -> u32 {
        if after != INVALID {
            let mut d = start;
            loop {
                let next = self.drawables.slot(d).next;
                if next == after {
                    if !self.gap(d, after) {
                        let after_block = self.drawables.block_at(after);
                        if before == INVALID || self.drawables.block_at(before) != after_block {
                            return after_block;
                        }
                    }
                    break;
                }
                if next == INVALID || self.gap(d, next) {
                    break;
                }
                d = next;
            }
        }
        self.match_block(self.drawables.renderer_at(start), out)
    }

    /// Takes the most recently pooled block of `renderer`, or creates one.
    fn match_block(&mut self, renderer: Renderer, out: &mut StitchOutcome) -> u32 {
        out.order_changed = true;
        let found = self
            .pool
            .iter()
            .rposition(|&b| self.blocks.slot(b).renderer == renderer);
        if let Some(position) = found {
            let block = self.pool.remove(position);
            self.blocks.slot_mut(block).used = true;
            out.reused += 1;
            block
        } else {
            let block = self.blocks.acquire(renderer);
            out.created.push(self.blocks.id_at(block));
            block
        }
    }

    fn pool_block(&mut self, block: u32) {
        let slot = self.blocks.slot_mut(block);
        if slot.used {
            slot.used = false;
            self.pool.push(block);
        }
    }

    fn assign(&mut self, d: u32, block: u32) {
        let slot = self.drawables.slot_mut(d);
        if slot.block != block {
            if slot.block != INVALID && slot.was_listed() && !slot.flags.pending_move {
                slot.flags.pending_move = true;
                self.pending.push(d);
            }
            slot.block = block;
        }
        self.probes.push((block, d));
    }

    /// Moves `start` and the contiguous run of `from` members after it into
    /// `into`. Interiors of later intervals are skipped; they are assigned
    /// when their own interval is stitched.
    fn absorb(&mut self, start: u32, from: u32, into: u32) {
        let mut d = start;
        while d != INVALID {
            let slot = self.drawables.slot(d);
            let next = slot.next;
            if !slot.flags.pending_addition {
                if slot.block != from {
                    break;
                }
                self.assign(d, into);
            }
            d = next;
        }
    }

    fn repair_extents(&mut self, out: &mut StitchOutcome) {
        let mut repaired = Vec::new();
        for k in 0..self.probes.len() {
            let (block, d) = self.probes[k];
            if block == INVALID {
                continue;
            }
            let extent = self.blocks.slot(block);
            if !extent.used || extent.repaired {
                continue;
            }
            let member = self.drawables.slot(d);
            if member.block != block || !member.flags.used {
                continue;
            }

            let mut first = d;
            loop {
                let prev = self.drawables.slot(first).prev;
                if prev == INVALID || self.drawables.block_at(prev) != block {
                    break;
                }
                first = prev;
            }
            let mut last = d;
            loop {
                let next = self.drawables.slot(last).next;
                if next == INVALID || self.drawables.block_at(next) != block {
                    break;
                }
                last = next;
            }

            let extent = self.blocks.slot_mut(block);
            let fresh = extent.first == INVALID;
            extent.repaired = true;
            extent.first = first;
            extent.last = last;
            repaired.push(block);
            if !fresh {
                out.changed.push(self.blocks.id_at(block));
            }
        }
        for block in repaired {
            self.blocks.slot_mut(block).repaired = false;
        }
    }

    fn dispose_pool(&mut self, out: &mut StitchOutcome) {
        let pool = core::mem::take(&mut self.pool);
        for &block in &pool {
            let id = self.blocks.id_at(block);
            if let Some(position) = out.created.iter().position(|&c| c == id) {
                out.created.remove(position);
            } else {
                out.disposed.push(id);
            }
            out.changed.retain(|&r| r != id);
            self.blocks.release(block);
        }
        self.pool = pool;
        self.pool.clear();
    }

    /// Relinks blocks in paint order. Returns whether the sequence changed.
    fn rebuild_block_order(&mut self) -> bool {
        let previous = core::mem::take(&mut self.block_order);
        let mut prev = INVALID;
        let mut d = self.first;
        while d != INVALID {
            let block = self.drawables.block_at(d);
            assert!(block != INVALID, "drawable {d} has no block after stitching");
            assert!(block != prev, "block {block} appears twice in a row");
            let position = self.block_order.len() as u32;
            let slot = self.blocks.slot_mut(block);
            slot.prev = prev;
            slot.next = INVALID;
            slot.index = position;
            let tail = slot.last;
            if prev != INVALID {
                self.blocks.slot_mut(prev).next = block;
            }
            self.block_order.push(block);
            prev = block;
            d = self.drawables.slot(tail).next;
        }
        self.first_block = self.block_order.first().copied().unwrap_or(INVALID);
        self.last_block = prev;
        previous != self.block_order
    }

    fn clear_pending(&mut self, out: &mut StitchOutcome) {
        let pending = core::mem::take(&mut self.pending);
        for &d in &pending {
            let slot = self.drawables.slot_mut(d);
            let flags = slot.flags;
            if flags.pending_removal && !flags.used {
                slot.block = INVALID;
                out.removed += 1;
            }
            if flags.pending_move {
                out.moved += 1;
            }
            slot.flags.pending_addition = false;
            slot.flags.pending_removal = false;
            slot.flags.pending_move = false;
        }
        self.pending = pending;
        self.pending.clear();
    }

    fn release_retired(&mut self) {
        while let Some(d) = self.retired.pop() {
            self.drawables.release(d);
        }
    }

    #[inline]
    fn gap(&self, a: u32, b: u32) -> bool {
        Renderer::needs_gap(self.drawables.renderer_at(a), self.drawables.renderer_at(b))
    }

    #[inline]
    fn interior_start(&self, before: u32) -> u32 {
        if before == INVALID {
            self.first
        } else {
            self.drawables.slot(before).next
        }
    }
}

#[inline]
fn raw(anchor: Option<DrawableId>) -> u32 {
    anchor.map_or(INVALID, |id| id.idx)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::renderer::Renderer::{Canvas, Dom, Svg};

    #[derive(Debug)]
    struct Paint(Renderer);

    impl PaintDrawable for Paint {
        fn renderer(&self) -> Renderer {
            self.0
        }
        fn mark_dirty(&mut self) {}
        fn dispose(&mut self) {}
    }

    #[derive(Debug)]
    struct Target;

    impl Surface for Target {
        fn dispose(&mut self) {}
    }

    type Spine = Backbone<Paint, Target>;

    fn make(spine: &mut Spine, renderers: &[Renderer]) -> Vec<DrawableId> {
        renderers
            .iter()
            .map(|&r| spine.acquire_drawable(r, 0, Paint(r)))
            .collect()
    }

    fn install(spine: &mut Spine, order: &[DrawableId]) -> StitchOutcome {
        spine.set_order(order);
        let intervals = spine.change_intervals();
        let out = spine.stitch(&intervals);
        for &block in &out.created {
            spine.attach_surface(block, Target);
        }
        spine.audit().unwrap();
        out
    }

    fn block_of(spine: &Spine, d: DrawableId) -> BlockId {
        spine.drawable_block(d).unwrap()
    }

    #[test]
    fn first_install_builds_maximal_runs() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Canvas, Canvas, Svg, Canvas]);
        let out = install(&mut spine, &ds);

        assert_eq!(out.created.len(), 3);
        assert_eq!(out.added, 4);
        assert!(out.order_changed);
        assert_eq!(spine.block_count(), 3);
        assert_eq!(block_of(&spine, ds[0]), block_of(&spine, ds[1]));
        let first = spine.first_block().unwrap();
        assert_eq!(spine.block_drawables(first).collect::<Vec<_>>(), vec![ds[0], ds[1]]);
        assert_eq!(spine.next_block(first), Some(block_of(&spine, ds[2])));
        assert_eq!(spine.last_block(), Some(block_of(&spine, ds[3])));
    }

    #[test]
    fn renderer_change_moves_drawable_into_the_following_block() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Canvas, Canvas, Svg]);
        let _ = install(&mut spine, &ds);
        let canvas_block = block_of(&spine, ds[0]);
        let svg_block = block_of(&spine, ds[2]);

        spine.retire_drawable(ds[1]);
        let replacement = make(&mut spine, &[Svg])[0];
        let out = install(&mut spine, &[ds[0], replacement, ds[2]]);

        assert!(out.created.is_empty());
        assert!(out.disposed.is_empty());
        assert_eq!(out.removed, 1);
        assert_eq!(out.added, 1);
        assert_eq!(spine.block_count(), 2);
        assert_eq!(block_of(&spine, ds[0]), canvas_block);
        assert_eq!(block_of(&spine, replacement), svg_block);
        assert_eq!(spine.block_extent(svg_block), (replacement, ds[2]));
        assert!(!out.order_changed);
    }

    #[test]
    fn unglue_then_glue_restores_the_original_block() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Canvas, Canvas, Canvas]);
        let _ = install(&mut spine, &ds);
        let original = block_of(&spine, ds[0]);

        let wedge = make(&mut spine, &[Svg])[0];
        let out = install(&mut spine, &[ds[0], wedge, ds[1], ds[2]]);
        assert_eq!(out.unglued, 1);
        assert_eq!(out.created.len(), 2);
        assert_eq!(spine.block_count(), 3);
        assert_eq!(block_of(&spine, ds[0]), original);
        assert_ne!(block_of(&spine, ds[1]), original);
        assert_eq!(block_of(&spine, ds[1]), block_of(&spine, ds[2]));
        assert_eq!(out.moved, 2);

        spine.retire_drawable(wedge);
        let out = install(&mut spine, &ds);
        assert_eq!(out.glued, 1);
        assert_eq!(out.disposed.len(), 2);
        assert_eq!(spine.block_count(), 1);
        for &d in &ds {
            assert_eq!(block_of(&spine, d), original);
        }
        assert_eq!(spine.blocks().len(), 1);
    }

    #[test]
    fn reinstalling_the_same_order_is_a_no_op() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Canvas, Svg, Svg, Canvas]);
        let _ = install(&mut spine, &ds);
        let blocks: Vec<_> = spine.block_order().collect();

        spine.set_order(&ds);
        let intervals = spine.change_intervals();
        assert!(intervals.is_empty());
        let out = spine.stitch(&intervals);
        assert!(out.is_noop());
        assert_eq!(spine.block_order().collect::<Vec<_>>(), blocks);
    }

    #[test]
    fn isolated_renderer_never_shares() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Dom, Dom, Canvas, Canvas]);
        let _ = install(&mut spine, &ds);
        assert_eq!(spine.block_count(), 3);
        assert_ne!(block_of(&spine, ds[0]), block_of(&spine, ds[1]));
    }

    #[test]
    fn swapping_neighbours_reuses_pooled_block() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Canvas, Svg]);
        let _ = install(&mut spine, &ds);
        let canvas = block_of(&spine, ds[0]);
        let svg = block_of(&spine, ds[1]);

        let out = install(&mut spine, &[ds[1], ds[0]]);
        assert!(out.created.is_empty());
        assert!(out.disposed.is_empty());
        assert_eq!(out.reused, 1);
        assert!(out.order_changed);
        assert_eq!(spine.block_order().collect::<Vec<_>>(), vec![svg, canvas]);
        assert_eq!(spine.block_index(svg), 0);
    }

    #[test]
    fn emptying_the_order_disposes_every_block() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Canvas, Svg, Canvas]);
        let _ = install(&mut spine, &ds);

        for &d in &ds {
            spine.retire_drawable(d);
        }
        let out = install(&mut spine, &[]);
        assert_eq!(out.disposed.len(), 3);
        assert_eq!(out.removed, 3);
        assert_eq!(spine.block_count(), 0);
        assert!(spine.blocks().is_empty());
        assert!(spine.drawables().is_empty());
        assert_eq!(spine.first_block(), None);
    }

    #[test]
    fn removal_in_the_middle_of_a_block_keeps_it() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Canvas, Canvas, Canvas]);
        let _ = install(&mut spine, &ds);
        let block = block_of(&spine, ds[0]);

        spine.retire_drawable(ds[1]);
        let out = install(&mut spine, &[ds[0], ds[2]]);
        assert_eq!(out.changed, vec![block]);
        assert!(!out.order_changed);
        assert_eq!(spine.block_extent(block), (ds[0], ds[2]));
    }

    #[test]
    #[should_panic(expected = "is inverted")]
    fn interval_with_equal_anchors_panics() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Canvas]);
        let _ = install(&mut spine, &ds);
        spine.set_order(&ds);
        let _ = spine.stitch(&[ChangeInterval::new(Some(ds[0]), Some(ds[0]))]);
    }

    #[test]
    #[should_panic(expected = "not in both drawable orders")]
    fn fresh_anchor_panics() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Canvas]);
        let _ = install(&mut spine, &ds);
        let fresh = make(&mut spine, &[Canvas])[0];
        spine.set_order(&[ds[0], fresh]);
        let _ = spine.stitch(&[ChangeInterval::new(Some(fresh), None)]);
    }

    #[test]
    #[should_panic(expected = "open before anchor")]
    fn open_anchor_inside_chain_panics() {
        let mut spine = Spine::new();
        let ds = make(&mut spine, &[Canvas, Svg, Canvas]);
        let _ = install(&mut spine, &ds);
        spine.set_order(&ds);
        let _ = spine.stitch(&[
            ChangeInterval::new(None, Some(ds[1])),
            ChangeInterval::new(None, None),
        ]);
    }
}
