// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Block storage.
//!
//! A block is a maximal run of consecutive drawables that share one renderer
//! and therefore one physical [`Surface`](crate::backend::Surface). Blocks
//! are recorded by their first and last drawable; membership is the contiguous
//! range between them. Blocks are linked in paint order, bottom to top.

use alloc::vec::Vec;

use crate::backend::Surface;
use crate::handle::{INVALID, generational_handle};
use crate::renderer::Renderer;

generational_handle!(
    /// A handle to a block in a [`Backbone`](crate::backbone::Backbone).
    BlockId
);

#[derive(Debug)]
pub(crate) struct BlockSlot<S> {
    pub(crate) generation: u32,
    pub(crate) live: bool,
    pub(crate) renderer: Renderer,
    pub(crate) surface: Option<S>,
    pub(crate) first: u32,
    pub(crate) last: u32,
    pub(crate) prev: u32,
    pub(crate) next: u32,
    /// Position in the block order.
    pub(crate) index: u32,
    /// Holds drawables after the current stitch; cleared while pooled.
    pub(crate) used: bool,
    /// Extent already recomputed during the current stitch.
    pub(crate) repaired: bool,
}

impl<S> BlockSlot<S> {
    fn fresh(generation: u32, renderer: Renderer) -> Self {
        Self {
            generation,
            live: true,
            renderer,
            surface: None,
            first: INVALID,
            last: INVALID,
            prev: INVALID,
            next: INVALID,
            index: INVALID,
            used: true,
            repaired: false,
        }
    }
}

/// Arena of blocks with per-renderer free lists.
#[derive(Debug)]
pub struct BlockArena<S> {
    slots: Vec<BlockSlot<S>>,
    free: [Vec<u32>; Renderer::COUNT],
    live: usize,
}

impl<S> Default for BlockArena<S> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: core::array::from_fn(|_| Vec::new()),
            live: 0,
        }
    }
}

impl<S> BlockArena<S> {
    /// Allocates an empty, used block for `renderer`.
    pub(crate) fn acquire(&mut self, renderer: Renderer) -> u32 {
        self.live += 1;
        if let Some(idx) = self.free[renderer.index()].pop() {
            let slot = &mut self.slots[idx as usize];
            *slot = BlockSlot::fresh(slot.generation + 1, renderer);
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(INVALID);
            assert!(idx != INVALID, "block arena is full");
            self.slots.push(BlockSlot::fresh(0, renderer));
            idx
        }
    }

    /// Returns whether `id` refers to a live block.
    #[must_use]
    pub fn is_alive(&self, id: BlockId) -> bool {
        self.slots
            .get(id.idx as usize)
            .is_some_and(|slot| slot.live && slot.generation == id.generation)
    }

    /// Number of live blocks, including pooled ones mid-stitch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no block is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub(crate) fn validate(&self, id: BlockId) {
        assert!(self.is_alive(id), "stale BlockId: {id:?}");
    }

    #[inline]
    pub(crate) fn slot(&self, idx: u32) -> &BlockSlot<S> {
        &self.slots[idx as usize]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, idx: u32) -> &mut BlockSlot<S> {
        &mut self.slots[idx as usize]
    }

    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> BlockId {
        BlockId::new(idx, self.slots[idx as usize].generation)
    }

    /// Iterates over the raw indices of live blocks.
    pub(crate) fn live_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.live)
            .map(|(idx, _)| idx as u32)
    }
}

impl<S: Surface> BlockArena<S> {
    /// Disposes the block's surface and frees its slot.
    pub(crate) fn release(&mut self, idx: u32) {
        let slot = &mut self.slots[idx as usize];
        assert!(slot.live, "block {idx} released twice");
        if let Some(mut surface) = slot.surface.take() {
            surface.dispose();
        }
        slot.live = false;
        slot.used = false;
        slot.generation += 1;
        slot.first = INVALID;
        slot.last = INVALID;
        slot.prev = INVALID;
        slot.next = INVALID;
        self.free[slot.renderer.index()].push(idx);
        self.live -= 1;
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use super::*;

    struct Target(Rc<Cell<u32>>);

    impl Surface for Target {
        fn dispose(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn release_disposes_surface_once() {
        let disposed = Rc::new(Cell::new(0));
        let mut arena = BlockArena::default();
        let idx = arena.acquire(Renderer::Canvas);
        let id = arena.id_at(idx);
        arena.slot_mut(idx).surface = Some(Target(Rc::clone(&disposed)));

        arena.release(idx);
        assert_eq!(disposed.get(), 1);
        assert!(!arena.is_alive(id));
        assert!(arena.is_empty());
    }

    #[test]
    fn reuse_is_per_renderer() {
        let mut arena: BlockArena<Target> = BlockArena::default();
        let svg = arena.acquire(Renderer::Svg);
        arena.release(svg);
        let canvas = arena.acquire(Renderer::Canvas);
        assert_ne!(canvas, svg);
        let svg_again = arena.acquire(Renderer::Svg);
        assert_eq!(svg_again, svg);
        assert_eq!(arena.slot(svg_again).generation, 1);
    }
}
