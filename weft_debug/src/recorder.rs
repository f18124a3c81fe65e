// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records. Each record starts with a tag byte and
//! the nanoseconds elapsed since the recorder was created, since the core
//! itself has no clock. [`decode`] reads them back as an iterator of
//! [`Record`].
//!
//! Rich events ([`on_block_changes`](TraceSink::on_block_changes)) store
//! only the count.

use std::time::Instant;

use weft_core::backend::Cursor;
use weft_core::trace::{
    BlockChange, BoundsValidationEvent, CursorEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, StitchEvent, SyncEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PHASE_BEGIN: u8 = 1;
const TAG_PHASE_END: u8 = 2;
const TAG_BOUNDS_VALIDATION: u8 = 3;
const TAG_SYNC: u8 = 4;
const TAG_STITCH: u8 = 5;
const TAG_CURSOR: u8 = 6;
const TAG_FRAME_SUMMARY: u8 = 7;
const TAG_BLOCK_CHANGES_COUNT: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    origin: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder. Stamps are measured from this moment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            origin: Instant::now(),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin_record(&mut self, tag: u8) {
        let elapsed = self.origin.elapsed().as_nanos();
        self.write_u8(tag);
        self.write_u64(u64::try_from(elapsed).unwrap_or(u64::MAX));
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::ValidateBounds => 0,
            PhaseKind::SyncTree => 1,
            PhaseKind::Transforms => 2,
            PhaseKind::Dispose => 3,
            PhaseKind::Repaint => 4,
            PhaseKind::Cursor => 5,
            PhaseKind::Resize => 6,
        });
    }

    fn write_str(&mut self, s: &str) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "cursor names are CSS keywords, far below u32::MAX bytes"
        )]
        self.write_u32(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
    }
}

impl TraceSink for RecorderSink {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.begin_record(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.begin_record(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
    }

    fn on_bounds_validation(&mut self, e: &BoundsValidationEvent) {
        self.begin_record(TAG_BOUNDS_VALIDATION);
        self.write_u64(e.frame_index);
        self.write_u32(e.passes);
        self.write_u32(e.roots);
    }

    fn on_sync(&mut self, e: &SyncEvent) {
        self.begin_record(TAG_SYNC);
        self.write_u64(e.frame_index);
        self.write_u32(e.instances_created);
        self.write_u32(e.instances_dropped);
        self.write_u32(e.drawables_created);
        self.write_u32(e.drawable_count);
    }

    fn on_stitch(&mut self, e: &StitchEvent) {
        self.begin_record(TAG_STITCH);
        self.write_u64(e.frame_index);
        for v in [
            e.intervals,
            e.added,
            e.removed,
            e.moved,
            e.glued,
            e.unglued,
            e.reused,
            e.created,
            e.disposed,
            e.block_count,
        ] {
            self.write_u32(v);
        }
    }

    fn on_cursor(&mut self, e: &CursorEvent) {
        self.begin_record(TAG_CURSOR);
        self.write_u64(e.frame_index);
        self.write_str(e.cursor.name());
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.begin_record(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u8(u8::from(s.tree_synced));
        self.write_u32(s.validation_passes);
        self.write_u32(s.transform_roots);
        self.write_u32(s.instance_count);
        self.write_u32(s.drawable_count);
        self.write_u32(s.block_count);
        self.write_u32(s.repainted_blocks);
    }

    fn on_block_changes(&mut self, frame_index: u64, changes: &[BlockChange]) {
        self.begin_record(TAG_BLOCK_CHANGES_COUNT);
        self.write_u64(frame_index);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "block change count capped at u32::MAX for recording"
        )]
        self.write_u32(changes.len().min(u32::MAX as usize) as u32);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`BoundsValidationEvent`].
    BoundsValidation(BoundsValidationEvent),
    /// A [`SyncEvent`].
    Sync(SyncEvent),
    /// A [`StitchEvent`].
    Stitch(StitchEvent),
    /// A cursor change. The name is owned because recordings outlive the
    /// [`Cursor`] keywords they were made from.
    Cursor {
        /// Update counter.
        frame_index: u64,
        /// The cursor keyword.
        name: String,
    },
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// Block-change count for a frame.
    BlockChangesCount {
        /// Update counter.
        frame_index: u64,
        /// Number of block changes.
        count: u32,
    },
}

/// One decoded record.
#[derive(Clone, Debug)]
pub struct Record {
    /// Nanoseconds between recorder creation and the event.
    pub at_nanos: u64,
    /// The event.
    pub event: RecordedEvent,
}

impl Record {
    /// The update counter of the event.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match &self.event {
            RecordedEvent::PhaseBegin(e) => e.frame_index,
            RecordedEvent::PhaseEnd(e) => e.frame_index,
            RecordedEvent::BoundsValidation(e) => e.frame_index,
            RecordedEvent::Sync(e) => e.frame_index,
            RecordedEvent::Stitch(e) => e.frame_index,
            RecordedEvent::FrameSummary(s) => s.frame_index,
            RecordedEvent::Cursor { frame_index, .. }
            | RecordedEvent::BlockChangesCount { frame_index, .. } => *frame_index,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`]s. Iteration stops at the first truncated or unknown record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded records.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        PhaseKind::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_string(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).ok()
    }

    fn decode_event(&mut self, tag: u8) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        Some(match tag {
            TAG_PHASE_BEGIN => RecordedEvent::PhaseBegin(PhaseBeginEvent {
                frame_index,
                phase: self.read_phase()?,
            }),
            TAG_PHASE_END => RecordedEvent::PhaseEnd(PhaseEndEvent {
                frame_index,
                phase: self.read_phase()?,
            }),
            TAG_BOUNDS_VALIDATION => RecordedEvent::BoundsValidation(BoundsValidationEvent {
                frame_index,
                passes: self.read_u32()?,
                roots: self.read_u32()?,
            }),
            TAG_SYNC => RecordedEvent::Sync(SyncEvent {
                frame_index,
                instances_created: self.read_u32()?,
                instances_dropped: self.read_u32()?,
                drawables_created: self.read_u32()?,
                drawable_count: self.read_u32()?,
            }),
            TAG_STITCH => RecordedEvent::Stitch(StitchEvent {
                frame_index,
                intervals: self.read_u32()?,
                added: self.read_u32()?,
                removed: self.read_u32()?,
                moved: self.read_u32()?,
                glued: self.read_u32()?,
                unglued: self.read_u32()?,
                reused: self.read_u32()?,
                created: self.read_u32()?,
                disposed: self.read_u32()?,
                block_count: self.read_u32()?,
            }),
            TAG_CURSOR => RecordedEvent::Cursor {
                frame_index,
                name: self.read_string()?,
            },
            TAG_FRAME_SUMMARY => RecordedEvent::FrameSummary(FrameSummary {
                frame_index,
                tree_synced: self.read_u8()? != 0,
                validation_passes: self.read_u32()?,
                transform_roots: self.read_u32()?,
                instance_count: self.read_u32()?,
                drawable_count: self.read_u32()?,
                block_count: self.read_u32()?,
                repainted_blocks: self.read_u32()?,
            }),
            TAG_BLOCK_CHANGES_COUNT => RecordedEvent::BlockChangesCount {
                frame_index,
                count: self.read_u32()?,
            },
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let at_nanos = self.read_u64()?;
        let event = self.decode_event(tag)?;
        Some(Record { at_nanos, event })
    }
}

/// Whether a recorded cursor name matches `cursor`.
#[must_use]
pub fn is_cursor(event: &RecordedEvent, cursor: Cursor) -> bool {
    matches!(event, RecordedEvent::Cursor { name, .. } if name == cursor.name())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::backend::{Backend, PaintDrawable, Surface};
    use weft_core::trace::Tracer;
    use weft_core::{BlockId, Display, DisplayConfig, NodeId, NodeStore, Renderer};

    struct Paint(Renderer);

    impl PaintDrawable for Paint {
        fn renderer(&self) -> Renderer {
            self.0
        }
        fn mark_dirty(&mut self) {}
        fn dispose(&mut self) {}
    }

    struct Target;

    impl Surface for Target {
        fn dispose(&mut self) {}
    }

    struct Null;

    impl Backend for Null {
        type Paint = Paint;
        type Surface = Target;

        fn create_paint(&mut self, renderer: Renderer, _: NodeId) -> Paint {
            Paint(renderer)
        }

        fn create_surface(&mut self, _: Renderer, _: BlockId) -> Target {
            Target
        }
    }

    fn record_two_updates() -> Vec<Record> {
        let mut scene = NodeStore::new();
        let root = scene.create_node();
        for renderer in [Renderer::Canvas, Renderer::Canvas, Renderer::Svg] {
            let node = scene.create_node();
            scene.set_renderer(node, Some(renderer));
            scene.add_child(root, node);
        }
        let mut display = Display::with_config(scene, root, Null, DisplayConfig::validated());

        let mut rec = RecorderSink::new();
        display.update_display_traced(&mut Tracer::new(&mut rec));
        display.update_display_traced(&mut Tracer::new(&mut rec));
        decode(rec.as_bytes()).collect()
    }

    #[test]
    fn records_a_full_update() {
        let records = record_two_updates();
        let first: Vec<_> = records.iter().filter(|r| r.frame_index() == 0).collect();

        let ended: Vec<PhaseKind> = first
            .iter()
            .filter_map(|r| match &r.event {
                RecordedEvent::PhaseEnd(e) => Some(e.phase),
                _ => None,
            })
            .collect();
        assert_eq!(ended, PhaseKind::ALL.to_vec());

        let stitch = first.iter().find_map(|r| match &r.event {
            RecordedEvent::Stitch(e) => Some(*e),
            _ => None,
        });
        let stitch = stitch.expect("first update stitches");
        assert_eq!(stitch.added, 3);
        assert_eq!(stitch.created, 2);
        assert_eq!(stitch.block_count, 2);

        assert!(first.iter().any(|r| is_cursor(&r.event, Cursor::DEFAULT)));
        assert!(
            first
                .iter()
                .any(|r| matches!(r.event, RecordedEvent::BlockChangesCount { count, .. } if count >= 4))
        );
    }

    #[test]
    fn idle_update_records_no_stitch() {
        let records = record_two_updates();
        let second: Vec<_> = records.iter().filter(|r| r.frame_index() == 1).collect();
        assert!(!second.is_empty());
        assert!(
            !second
                .iter()
                .any(|r| matches!(r.event, RecordedEvent::Stitch(_) | RecordedEvent::Sync(_)))
        );
        match &second.last().map(|r| &r.event) {
            Some(RecordedEvent::FrameSummary(s)) => {
                assert!(!s.tree_synced);
                assert_eq!(s.drawable_count, 3);
                assert_eq!(s.repainted_blocks, 0);
            }
            other => panic!("expected FrameSummary last, got {other:?}"),
        }
    }

    #[test]
    fn stamps_never_decrease() {
        let records = record_two_updates();
        assert!(records.windows(2).all(|w| w[0].at_nanos <= w[1].at_nanos));
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_bounds_validation(&BoundsValidationEvent {
            frame_index: 2,
            passes: 3,
            roots: 1,
        });
        rec.on_cursor(&CursorEvent {
            frame_index: 2,
            cursor: Cursor::POINTER,
        });
        let bytes = rec.into_bytes();

        let whole: Vec<_> = decode(&bytes).collect();
        assert_eq!(whole.len(), 2);
        let cut: Vec<_> = decode(&bytes[..bytes.len() - 2]).collect();
        assert_eq!(cut.len(), 1);
        assert!(matches!(
            cut[0].event,
            RecordedEvent::BoundsValidation(BoundsValidationEvent { passes: 3, .. })
        ));
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
