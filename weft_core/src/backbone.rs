// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawable list and its block partition.
//!
//! A [`Backbone`] owns every drawable and block of one display. Each update
//! installs a new drawable order with [`set_order`](Backbone::set_order),
//! which snapshots the previous order into the drawables' `old_*` links.
//! [`change_intervals`](Backbone::change_intervals) then describes where the
//! two orders differ, and [`stitch`](Backbone::stitch) repairs the block
//! partition inside those spans only.

use alloc::vec::Vec;

use crate::backend::{PaintDrawable, Surface};
use crate::block::{BlockArena, BlockId};
use crate::drawable::{DrawableArena, DrawableId};
use crate::handle::INVALID;
use crate::interval::{ChangeInterval, diff_positions};
use crate::renderer::Renderer;

/// Drawable list, block partition, and stitching state.
#[derive(Debug)]
pub struct Backbone<P, S> {
    pub(crate) drawables: DrawableArena<P>,
    pub(crate) blocks: BlockArena<S>,

    // -- Current order --
    pub(crate) first: u32,
    pub(crate) last: u32,
    pub(crate) order: Vec<u32>,

    // -- Previous order --
    pub(crate) old_first: u32,
    pub(crate) old_order: Vec<u32>,

    // -- Block order --
    pub(crate) first_block: u32,
    pub(crate) last_block: u32,
    pub(crate) block_order: Vec<u32>,

    /// Drawables retired since the last stitch.
    pub(crate) retired: Vec<u32>,

    // -- Stitch scratch --
    pub(crate) pool: Vec<u32>,
    pub(crate) probes: Vec<(u32, u32)>,
    pub(crate) pending: Vec<u32>,
}

impl<P, S> Default for Backbone<P, S> {
    fn default() -> Self {
        Self {
            drawables: DrawableArena::default(),
            blocks: BlockArena::default(),
            first: INVALID,
            last: INVALID,
            order: Vec::new(),
            old_first: INVALID,
            old_order: Vec::new(),
            first_block: INVALID,
            last_block: INVALID,
            block_order: Vec::new(),
            retired: Vec::new(),
            pool: Vec::new(),
            probes: Vec::new(),
            pending: Vec::new(),
        }
    }
}

impl<P: PaintDrawable, S: Surface> Backbone<P, S> {
    /// Creates an empty backbone.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new drawable owned by raw instance slot `instance`.
    ///
    /// The drawable is not part of the order until the next
    /// [`set_order`](Self::set_order) lists it.
    pub fn acquire_drawable(&mut self, renderer: Renderer, instance: u32, paint: P) -> DrawableId {
        self.drawables.acquire(renderer, instance, paint)
    }

    /// Disposes a drawable's paint now and frees its slot after the next
    /// stitch.
    ///
    /// The drawable must not appear in the next order.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or already retired.
    pub fn retire_drawable(&mut self, id: DrawableId) {
        self.drawables.validate(id);
        self.drawables.retire(id.idx);
        self.retired.push(id.idx);
    }

    /// Installs a new drawable order, snapshotting the current one as the
    /// previous order.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, retired, or listed twice.
    pub fn set_order(&mut self, order: &[DrawableId]) {
        // Forget the order from two installs ago.
        for k in 0..self.old_order.len() {
            let slot = self.drawables.slot_mut(self.old_order[k]);
            slot.old_next = INVALID;
            slot.old_index = INVALID;
        }
        // Current links become the previous links.
        for k in 0..self.order.len() {
            let slot = self.drawables.slot_mut(self.order[k]);
            slot.old_next = slot.next;
            slot.old_index = slot.index;
            slot.prev = INVALID;
            slot.next = INVALID;
            slot.index = INVALID;
            slot.flags.used = false;
        }
        self.old_first = self.first;
        core::mem::swap(&mut self.old_order, &mut self.order);
        self.order.clear();

        let mut prev = INVALID;
        for (position, &id) in order.iter().enumerate() {
            self.drawables.validate(id);
            let idx = id.idx;
            let slot = self.drawables.slot_mut(idx);
            assert!(!slot.flags.used, "{id:?} listed twice in the drawable order");
            slot.flags.used = true;
            slot.prev = prev;
            slot.next = INVALID;
            slot.index = position as u32;
            if prev != INVALID {
                self.drawables.slot_mut(prev).next = idx;
            }
            self.order.push(idx);
            prev = idx;
        }
        self.first = self.order.first().copied().unwrap_or(INVALID);
        self.last = prev;
    }

    /// Returns the spans where the current order differs from the previous
    /// one, anchored on drawables kept in place.
    #[must_use]
    pub fn change_intervals(&self) -> Vec<ChangeInterval> {
        let positions: Vec<u32> = self
            .order
            .iter()
            .map(|&idx| self.drawables.slot(idx).old_index)
            .collect();
        let old_len = self.old_order.len() as u32;
        diff_positions(old_len, &positions)
            .into_iter()
            .map(|(before, after)| {
                ChangeInterval::new(
                    before.map(|pos| self.drawables.id_at(self.order[pos as usize])),
                    after.map(|pos| self.drawables.id_at(self.order[pos as usize])),
                )
            })
            .collect()
    }

    /// Gives a freshly created block its render target.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the block already has a surface.
    pub fn attach_surface(&mut self, block: BlockId, surface: S) {
        self.blocks.validate(block);
        let slot = self.blocks.slot_mut(block.idx);
        assert!(slot.surface.is_none(), "{block:?} already has a surface");
        slot.surface = Some(surface);
    }
}

impl<P, S> Backbone<P, S> {
    /// The current drawable order.
    pub fn drawable_order(&self) -> impl Iterator<Item = DrawableId> + '_ {
        self.order.iter().map(|&idx| self.drawables.id_at(idx))
    }

    /// Number of drawables in the current order.
    #[must_use]
    pub fn drawable_count(&self) -> usize {
        self.order.len()
    }

    /// The blocks in paint order, bottom first.
    pub fn block_order(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.block_order.iter().map(|&idx| self.blocks.id_at(idx))
    }

    /// The bottom-most block.
    #[must_use]
    pub fn first_block(&self) -> Option<BlockId> {
        (self.first_block != INVALID).then(|| self.blocks.id_at(self.first_block))
    }

    /// The top-most block.
    #[must_use]
    pub fn last_block(&self) -> Option<BlockId> {
        (self.last_block != INVALID).then(|| self.blocks.id_at(self.last_block))
    }

    /// The block painted directly above `block`.
    #[must_use]
    pub fn next_block(&self, block: BlockId) -> Option<BlockId> {
        self.blocks.validate(block);
        let next = self.blocks.slot(block.idx).next;
        (next != INVALID).then(|| self.blocks.id_at(next))
    }

    /// The block painted directly below `block`.
    #[must_use]
    pub fn prev_block(&self, block: BlockId) -> Option<BlockId> {
        self.blocks.validate(block);
        let prev = self.blocks.slot(block.idx).prev;
        (prev != INVALID).then(|| self.blocks.id_at(prev))
    }

    /// Number of blocks in the partition.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.block_order.len()
    }

    /// The drawables of `block`, first to last.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn block_drawables(&self, block: BlockId) -> impl Iterator<Item = DrawableId> + '_ {
        self.blocks.validate(block);
        let slot = self.blocks.slot(block.idx);
        let (mut current, last) = (slot.first, slot.last);
        core::iter::from_fn(move || {
            if current == INVALID {
                return None;
            }
            let idx = current;
            current = if idx == last {
                INVALID
            } else {
                self.drawables.slot(idx).next
            };
            Some(self.drawables.id_at(idx))
        })
    }

    /// The first and last drawable of `block`.
    #[must_use]
    pub fn block_extent(&self, block: BlockId) -> (DrawableId, DrawableId) {
        self.blocks.validate(block);
        let slot = self.blocks.slot(block.idx);
        (self.drawables.id_at(slot.first), self.drawables.id_at(slot.last))
    }

    /// The renderer of `block`.
    #[must_use]
    pub fn block_renderer(&self, block: BlockId) -> Renderer {
        self.blocks.validate(block);
        self.blocks.slot(block.idx).renderer
    }

    /// The position of `block` in the block order.
    #[must_use]
    pub fn block_index(&self, block: BlockId) -> u32 {
        self.blocks.validate(block);
        self.blocks.slot(block.idx).index
    }

    /// The surface backing `block`, once attached.
    #[must_use]
    pub fn surface(&self, block: BlockId) -> Option<&S> {
        self.blocks.validate(block);
        self.blocks.slot(block.idx).surface.as_ref()
    }

    /// Mutable access to the surface backing `block`.
    pub fn surface_mut(&mut self, block: BlockId) -> Option<&mut S> {
        self.blocks.validate(block);
        self.blocks.slot_mut(block.idx).surface.as_mut()
    }

    /// The block currently holding `drawable`, if it is in the order.
    #[must_use]
    pub fn drawable_block(&self, drawable: DrawableId) -> Option<BlockId> {
        self.drawables.validate(drawable);
        let block = self.drawables.block_at(drawable.idx);
        (block != INVALID).then(|| self.blocks.id_at(block))
    }

    /// The renderer of `drawable`.
    #[must_use]
    pub fn drawable_renderer(&self, drawable: DrawableId) -> Renderer {
        self.drawables.validate(drawable);
        self.drawables.renderer_at(drawable.idx)
    }

    /// The backend paint of `drawable`.
    #[must_use]
    pub fn paint(&self, drawable: DrawableId) -> Option<&P> {
        self.drawables.validate(drawable);
        self.drawables.slot(drawable.idx).paint.as_ref()
    }

    /// Mutable access to the backend paint of `drawable`.
    pub fn paint_mut(&mut self, drawable: DrawableId) -> Option<&mut P> {
        self.drawables.validate(drawable);
        self.drawables.slot_mut(drawable.idx).paint.as_mut()
    }

    /// Whether `drawable` is live.
    #[must_use]
    pub fn is_drawable_alive(&self, drawable: DrawableId) -> bool {
        self.drawables.is_alive(drawable)
    }

    /// Whether `block` is live.
    #[must_use]
    pub fn is_block_alive(&self, block: BlockId) -> bool {
        self.blocks.is_alive(block)
    }

    /// The drawable arena.
    #[must_use]
    pub fn drawables(&self) -> &DrawableArena<P> {
        &self.drawables
    }

    /// The block arena.
    #[must_use]
    pub fn blocks(&self) -> &BlockArena<S> {
        &self.blocks
    }
}
