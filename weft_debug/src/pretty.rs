// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.

use std::fmt;
use std::io::Write;

use weft_core::trace::{
    BlockChange, BoundsValidationEvent, CursorEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent,
    StitchEvent, SyncEvent, TraceSink,
};

/// A [`TraceSink`] that writes one line per event.
///
/// Write errors are ignored; tracing never interrupts an update.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to `writer`.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {}",
            e.frame_index,
            e.phase.as_str()
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {}",
            e.frame_index,
            e.phase.as_str()
        );
    }

    fn on_bounds_validation(&mut self, e: &BoundsValidationEvent) {
        let _ = writeln!(
            self.writer,
            "[bounds] frame={} passes={} roots={}",
            e.frame_index, e.passes, e.roots
        );
    }

    fn on_sync(&mut self, e: &SyncEvent) {
        let _ = writeln!(
            self.writer,
            "[sync] frame={} instances=+{}/-{} drawables=+{} order={}",
            e.frame_index,
            e.instances_created,
            e.instances_dropped,
            e.drawables_created,
            e.drawable_count
        );
    }

    fn on_stitch(&mut self, e: &StitchEvent) {
        let _ = writeln!(
            self.writer,
            "[stitch] frame={} intervals={} drawables=+{}/-{}/~{} glue={} unglue={} \
             blocks=+{}/-{} reused={} total={}",
            e.frame_index,
            e.intervals,
            e.added,
            e.removed,
            e.moved,
            e.glued,
            e.unglued,
            e.created,
            e.disposed,
            e.reused,
            e.block_count
        );
    }

    fn on_cursor(&mut self, e: &CursorEvent) {
        let _ = writeln!(
            self.writer,
            "[cursor] frame={} {}",
            e.frame_index,
            e.cursor.name()
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} synced={} passes={} transforms={} instances={} \
             drawables={} blocks={} repainted={}",
            s.frame_index,
            s.tree_synced,
            s.validation_passes,
            s.transform_roots,
            s.instance_count,
            s.drawable_count,
            s.block_count,
            s.repainted_blocks
        );
    }

    fn on_block_changes(&mut self, frame_index: u64, changes: &[BlockChange]) {
        for c in changes {
            let _ = writeln!(
                self.writer,
                "[block] frame={frame_index} {:?} {:?}",
                c.block, c.kind
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::backend::Cursor;
    use weft_core::trace::PhaseKind;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).expect("utf-8 output")
    }

    #[test]
    fn one_line_per_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 4,
            phase: PhaseKind::Repaint,
        });
        sink.on_stitch(&StitchEvent {
            frame_index: 4,
            intervals: 1,
            added: 2,
            removed: 0,
            moved: 0,
            glued: 0,
            unglued: 1,
            reused: 0,
            created: 1,
            disposed: 0,
            block_count: 3,
        });
        sink.on_phase_end(&PhaseEndEvent {
            frame_index: 4,
            phase: PhaseKind::Repaint,
        });

        let text = output(sink);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[phase:begin] frame=4 repaint");
        assert!(lines[1].starts_with("[stitch] frame=4 intervals=1 drawables=+2/-0/~0"));
        assert!(lines[1].ends_with("blocks=+1/-0 reused=0 total=3"));
        assert_eq!(lines[2], "[phase:end] frame=4 repaint");
    }

    #[test]
    fn cursor_prints_its_keyword() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_cursor(&CursorEvent {
            frame_index: 0,
            cursor: Cursor::CROSSHAIR,
        });
        assert_eq!(output(sink), "[cursor] frame=0 crosshair\n");
    }
}
