// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for display updates.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`Display::update_display_traced`](crate::display::Display::update_display_traced)
//! calls at each step. All method bodies default to no-ops, so implementing
//! only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! The core is `no_std` and has no clock; sinks that want timings stamp
//! events themselves on arrival.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates per-block [`BlockChange`] events
//!   and the corresponding `TraceSink` method.

use crate::backend::Cursor;
#[cfg(feature = "trace-rich")]
use crate::block::BlockId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which step of a display update is being reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Bounds validation of the root and watched nodes.
    ValidateBounds,
    /// Instance tree reconciliation.
    SyncTree,
    /// Transform watcher notification.
    Transforms,
    /// Instance and drawable disposal.
    Dispose,
    /// Stitching, surface bookkeeping, and repaint.
    Repaint,
    /// Pointer hit test and cursor update.
    Cursor,
    /// Pending size application.
    Resize,
}

impl PhaseKind {
    /// All phases in the order an update runs them.
    pub const ALL: [Self; 7] = [
        Self::ValidateBounds,
        Self::SyncTree,
        Self::Transforms,
        Self::Dispose,
        Self::Repaint,
        Self::Cursor,
        Self::Resize,
    ];

    /// A short name for logs and trace viewers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidateBounds => "validate-bounds",
            Self::SyncTree => "sync-tree",
            Self::Transforms => "transforms",
            Self::Dispose => "dispose",
            Self::Repaint => "repaint",
            Self::Cursor => "cursor",
            Self::Resize => "resize",
        }
    }
}

/// What happened to a block.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockChangeKind {
    /// Allocated by the stitcher.
    Created,
    /// Released by the stitcher.
    Disposed,
    /// Kept, but its drawable range may differ.
    Changed,
    /// Its surface was repainted.
    Repainted,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of an update step.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Update counter.
    pub frame_index: u64,
    /// Which step is starting.
    pub phase: PhaseKind,
}

/// Marks the end of an update step.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Update counter.
    pub frame_index: u64,
    /// Which step is ending.
    pub phase: PhaseKind,
}

/// Emitted after bounds validation settles.
#[derive(Clone, Copy, Debug)]
pub struct BoundsValidationEvent {
    /// Update counter.
    pub frame_index: u64,
    /// Validation passes summed over every validated root.
    pub passes: u32,
    /// Number of roots validated (the display root plus watched nodes).
    pub roots: u32,
}

/// Emitted after the instance tree was reconciled.
#[derive(Clone, Copy, Debug)]
pub struct SyncEvent {
    /// Update counter.
    pub frame_index: u64,
    /// Instances created.
    pub instances_created: u32,
    /// Instance subtrees queued for disposal.
    pub instances_dropped: u32,
    /// Drawables created.
    pub drawables_created: u32,
    /// Length of the new drawable order.
    pub drawable_count: u32,
}

/// Emitted after a stitch pass.
#[derive(Clone, Copy, Debug)]
pub struct StitchEvent {
    /// Update counter.
    pub frame_index: u64,
    /// Change intervals processed.
    pub intervals: u32,
    /// Drawables that joined the order.
    pub added: u32,
    /// Drawables that left the order.
    pub removed: u32,
    /// Kept drawables that changed block.
    pub moved: u32,
    /// Glue operations.
    pub glued: u32,
    /// Unglue operations.
    pub unglued: u32,
    /// Pooled blocks handed back out.
    pub reused: u32,
    /// Blocks created.
    pub created: u32,
    /// Blocks disposed.
    pub disposed: u32,
    /// Blocks after the pass.
    pub block_count: u32,
}

/// Emitted when the cursor under the pointer changes.
#[derive(Clone, Copy, Debug)]
pub struct CursorEvent {
    /// Update counter.
    pub frame_index: u64,
    /// The new cursor.
    pub cursor: Cursor,
}

/// Per-update totals.
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Update counter.
    pub frame_index: u64,
    /// Whether the instance tree was reconciled.
    pub tree_synced: bool,
    /// Bounds validation passes.
    pub validation_passes: u32,
    /// Nodes whose transform changed.
    pub transform_roots: u32,
    /// Live instances after the update.
    pub instance_count: u32,
    /// Drawables in the order after the update.
    pub drawable_count: u32,
    /// Blocks after the update.
    pub block_count: u32,
    /// Blocks whose surface was repainted.
    pub repainted_blocks: u32,
}

/// A per-update block change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct BlockChange {
    /// The block.
    pub block: BlockId,
    /// What happened to it.
    pub kind: BlockChangeKind,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from display updates.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of an update step.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of an update step.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after bounds validation.
    fn on_bounds_validation(&mut self, e: &BoundsValidationEvent) {
        _ = e;
    }

    /// Called after instance tree reconciliation.
    fn on_sync(&mut self, e: &SyncEvent) {
        _ = e;
    }

    /// Called after each stitch pass.
    fn on_stitch(&mut self, e: &StitchEvent) {
        _ = e;
    }

    /// Called when the cursor changes.
    fn on_cursor(&mut self, e: &CursorEvent) {
        _ = e;
    }

    /// Called with per-update totals.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with per-update block changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_block_changes(&mut self, frame_index: u64, changes: &[BlockChange]) {
        _ = (frame_index, changes);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! forward {
    ($(#[$meta:meta])* $name:ident => $hook:ident($arg:ident: $ty:ty)) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(&mut self, $arg: $ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook($arg);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = $arg;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns `true` if events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    forward!(
        /// Emits a [`PhaseBeginEvent`].
        phase_begin => on_phase_begin(e: &PhaseBeginEvent)
    );
    forward!(
        /// Emits a [`PhaseEndEvent`].
        phase_end => on_phase_end(e: &PhaseEndEvent)
    );
    forward!(
        /// Emits a [`BoundsValidationEvent`].
        bounds_validation => on_bounds_validation(e: &BoundsValidationEvent)
    );
    forward!(
        /// Emits a [`SyncEvent`].
        sync => on_sync(e: &SyncEvent)
    );
    forward!(
        /// Emits a [`StitchEvent`].
        stitch => on_stitch(e: &StitchEvent)
    );
    forward!(
        /// Emits a [`CursorEvent`].
        cursor => on_cursor(e: &CursorEvent)
    );
    forward!(
        /// Emits a [`FrameSummary`].
        frame_summary => on_frame_summary(s: &FrameSummary)
    );

    /// Emits block changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn block_changes(&mut self, frame_index: u64, changes: &[BlockChange]) {
        if let Some(s) = &mut self.sink {
            s.on_block_changes(frame_index, changes);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> FrameSummary {
        FrameSummary {
            frame_index: 3,
            tree_synced: true,
            validation_passes: 1,
            transform_roots: 0,
            instance_count: 4,
            drawable_count: 3,
            block_count: 2,
            repainted_blocks: 2,
        }
    }

    #[test]
    fn phases_are_listed_in_update_order() {
        assert_eq!(PhaseKind::ALL[0], PhaseKind::ValidateBounds);
        assert_eq!(PhaseKind::ALL[6], PhaseKind::Resize);
        assert_eq!(PhaseKind::Repaint.as_str(), "repaint");
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame_summary(&sample_summary());
        sink.on_cursor(&CursorEvent {
            frame_index: 0,
            cursor: Cursor::POINTER,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_enabled());
        tracer.frame_summary(&sample_summary());
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::SyncTree,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            phases: Vec<PhaseKind>,
        }
        impl TraceSink for RecordingSink {
            fn on_phase_end(&mut self, e: &PhaseEndEvent) {
                self.phases.push(e.phase);
            }
        }

        let mut sink = RecordingSink { phases: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        assert!(tracer.is_enabled());
        tracer.phase_end(&PhaseEndEvent {
            frame_index: 1,
            phase: PhaseKind::Cursor,
        });
        drop(tracer);
        assert_eq!(sink.phases, &[PhaseKind::Cursor]);
    }
}
