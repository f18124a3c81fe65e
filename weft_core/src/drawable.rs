// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable storage.
//!
//! A drawable is the paintable unit of one instance under one renderer. All
//! drawables of a display live in a single arena and are threaded into an
//! intrusive doubly linked list in paint order. Each drawable keeps two sets
//! of links: the *current* list and a snapshot of the *previous* list, taken
//! when a new order is installed. Stitching compares the two.
//!
//! Slots are recycled per renderer. A retired drawable keeps its slot (and
//! its previous-list links) until the next stitch has consumed it.

use alloc::vec::Vec;

use crate::backend::PaintDrawable;
use crate::handle::{INVALID, generational_handle};
use crate::renderer::Renderer;

generational_handle!(
    /// A handle to a drawable in a [`Backbone`](crate::backbone::Backbone).
    DrawableId
);

/// Transient per-stitch state of a drawable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DrawableFlags {
    /// Interior to a change interval in the current list.
    pub pending_addition: bool,
    /// Interior to a change interval in the previous list.
    pub pending_removal: bool,
    /// Present in both lists and assigned to a different block.
    pub pending_move: bool,
    /// Linked into the current list.
    pub used: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SlotState {
    Live,
    /// Paint disposed; slot held until the next stitch releases it.
    Retired,
    Free,
}

#[derive(Debug)]
pub(crate) struct DrawableSlot<P> {
    pub(crate) generation: u32,
    pub(crate) state: SlotState,
    pub(crate) renderer: Renderer,
    /// Raw instance slot that owns this drawable.
    pub(crate) instance: u32,
    pub(crate) paint: Option<P>,

    // -- Current list --
    pub(crate) prev: u32,
    pub(crate) next: u32,
    pub(crate) index: u32,

    // -- Previous list --
    pub(crate) old_next: u32,
    pub(crate) old_index: u32,

    /// Raw block slot, or `INVALID`.
    pub(crate) block: u32,
    pub(crate) flags: DrawableFlags,
}

impl<P> DrawableSlot<P> {
    fn fresh(generation: u32, renderer: Renderer, instance: u32, paint: P) -> Self {
        Self {
            generation,
            state: SlotState::Live,
            renderer,
            instance,
            paint: Some(paint),
            prev: INVALID,
            next: INVALID,
            index: INVALID,
            old_next: INVALID,
            old_index: INVALID,
            block: INVALID,
            flags: DrawableFlags::default(),
        }
    }

    /// Whether the drawable was linked into the previous list.
    #[inline]
    pub(crate) fn was_listed(&self) -> bool {
        self.old_index != INVALID
    }
}

/// Arena of drawables with per-renderer free lists.
#[derive(Debug)]
pub struct DrawableArena<P> {
    slots: Vec<DrawableSlot<P>>,
    free: [Vec<u32>; Renderer::COUNT],
    live: usize,
}

impl<P> Default for DrawableArena<P> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: core::array::from_fn(|_| Vec::new()),
            live: 0,
        }
    }
}

impl<P: PaintDrawable> DrawableArena<P> {
    /// Stores `paint` in a slot for `renderer`, reusing a freed slot of the
    /// same renderer when one exists.
    ///
    /// # Panics
    ///
    /// Panics if `paint` reports a different renderer.
    pub(crate) fn acquire(&mut self, renderer: Renderer, instance: u32, paint: P) -> DrawableId {
        assert_eq!(
            paint.renderer(),
            renderer,
            "paint renderer does not match the requested renderer"
        );
        self.live += 1;
        if let Some(idx) = self.free[renderer.index()].pop() {
            let slot = &mut self.slots[idx as usize];
            let generation = slot.generation + 1;
            *slot = DrawableSlot::fresh(generation, renderer, instance, paint);
            DrawableId::new(idx, generation)
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(INVALID);
            assert!(idx != INVALID, "drawable arena is full");
            self.slots
                .push(DrawableSlot::fresh(0, renderer, instance, paint));
            DrawableId::new(idx, 0)
        }
    }

    /// Disposes the paint and marks the slot retired.
    pub(crate) fn retire(&mut self, idx: u32) {
        let slot = &mut self.slots[idx as usize];
        assert!(
            slot.state == SlotState::Live,
            "drawable {idx} retired twice"
        );
        if let Some(mut paint) = slot.paint.take() {
            paint.dispose();
        }
        slot.state = SlotState::Retired;
    }

    /// Returns a retired slot to its renderer's free list.
    pub(crate) fn release(&mut self, idx: u32) {
        let slot = &mut self.slots[idx as usize];
        assert!(
            slot.state == SlotState::Retired,
            "drawable {idx} released without being retired"
        );
        assert!(
            !slot.flags.used,
            "drawable {idx} released while still in the drawable order"
        );
        slot.generation += 1;
        slot.state = SlotState::Free;
        slot.block = INVALID;
        slot.old_next = INVALID;
        slot.old_index = INVALID;
        self.free[slot.renderer.index()].push(idx);
        self.live -= 1;
    }
}

impl<P> DrawableArena<P> {
    /// Returns whether `id` refers to a live (not retired) drawable.
    #[must_use]
    pub fn is_alive(&self, id: DrawableId) -> bool {
        self.slots.get(id.idx as usize).is_some_and(|slot| {
            slot.generation == id.generation && slot.state == SlotState::Live
        })
    }

    /// Number of drawables that are live or awaiting release.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no drawables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of freed slots ready for reuse under `renderer`.
    #[must_use]
    pub fn free_count(&self, renderer: Renderer) -> usize {
        self.free[renderer.index()].len()
    }

    pub(crate) fn validate(&self, id: DrawableId) {
        assert!(self.is_alive(id), "stale DrawableId: {id:?}");
    }

    #[inline]
    pub(crate) fn slot(&self, idx: u32) -> &DrawableSlot<P> {
        &self.slots[idx as usize]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, idx: u32) -> &mut DrawableSlot<P> {
        &mut self.slots[idx as usize]
    }

    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> DrawableId {
        DrawableId::new(idx, self.slots[idx as usize].generation)
    }

    #[inline]
    pub(crate) fn renderer_at(&self, idx: u32) -> Renderer {
        self.slots[idx as usize].renderer
    }

    #[inline]
    pub(crate) fn block_at(&self, idx: u32) -> u32 {
        self.slots[idx as usize].block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Stub(Renderer);

    impl PaintDrawable for Stub {
        fn renderer(&self) -> Renderer {
            self.0
        }
        fn mark_dirty(&mut self) {}
        fn dispose(&mut self) {}
    }

    #[test]
    fn free_lists_are_per_renderer() {
        let mut arena = DrawableArena::default();
        let canvas = arena.acquire(Renderer::Canvas, 0, Stub(Renderer::Canvas));
        arena.retire(canvas.idx);
        arena.release(canvas.idx);
        assert_eq!(arena.free_count(Renderer::Canvas), 1);

        let svg = arena.acquire(Renderer::Svg, 0, Stub(Renderer::Svg));
        assert_ne!(svg.idx, canvas.idx, "svg must not take a canvas slot");

        let again = arena.acquire(Renderer::Canvas, 0, Stub(Renderer::Canvas));
        assert_eq!(again.idx, canvas.idx);
        assert!(!arena.is_alive(canvas));
        assert!(arena.is_alive(again));
    }

    #[test]
    fn retired_slots_are_not_alive_but_still_listed() {
        let mut arena = DrawableArena::default();
        let id = arena.acquire(Renderer::Canvas, 0, Stub(Renderer::Canvas));
        arena.retire(id.idx);
        assert!(!arena.is_alive(id));
        assert_eq!(arena.renderer_at(id.idx), Renderer::Canvas);
        assert_eq!(arena.id_at(id.idx), id);
        assert_eq!(arena.len(), 1);
        arena.release(id.idx);
        assert!(arena.is_empty());
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn mismatched_paint_renderer_panics() {
        let mut arena = DrawableArena::default();
        let _ = arena.acquire(Renderer::Canvas, 0, Stub(Renderer::Svg));
    }

    #[test]
    #[should_panic(expected = "retired twice")]
    fn double_retire_panics() {
        let mut arena = DrawableArena::default();
        let id = arena.acquire(Renderer::Dom, 0, Stub(Renderer::Dom));
        arena.retire(id.idx);
        arena.retire(id.idx);
    }
}
