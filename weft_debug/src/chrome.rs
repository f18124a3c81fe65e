// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{Record, RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Update phases become duration slices; everything else becomes an instant
/// event on the same track.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(|record| to_json(&record)).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_json(record: &Record) -> Value {
    let ts = nanos_to_us(record.at_nanos);
    match &record.event {
        RecordedEvent::PhaseBegin(e) => json!({
            "ph": "B",
            "name": e.phase.as_str(),
            "cat": "Update",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "args": { "frame_index": e.frame_index }
        }),
        RecordedEvent::PhaseEnd(e) => json!({
            "ph": "E",
            "name": e.phase.as_str(),
            "cat": "Update",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "args": { "frame_index": e.frame_index }
        }),
        RecordedEvent::BoundsValidation(e) => instant(
            "BoundsValidation",
            "Scene",
            ts,
            json!({
                "frame_index": e.frame_index,
                "passes": e.passes,
                "roots": e.roots,
            }),
        ),
        RecordedEvent::Sync(e) => instant(
            "Sync",
            "Scene",
            ts,
            json!({
                "frame_index": e.frame_index,
                "instances_created": e.instances_created,
                "instances_dropped": e.instances_dropped,
                "drawables_created": e.drawables_created,
                "drawable_count": e.drawable_count,
            }),
        ),
        RecordedEvent::Stitch(e) => instant(
            "Stitch",
            "Blocks",
            ts,
            json!({
                "frame_index": e.frame_index,
                "intervals": e.intervals,
                "added": e.added,
                "removed": e.removed,
                "moved": e.moved,
                "glued": e.glued,
                "unglued": e.unglued,
                "reused": e.reused,
                "created": e.created,
                "disposed": e.disposed,
                "block_count": e.block_count,
            }),
        ),
        RecordedEvent::Cursor { frame_index, name } => instant(
            "Cursor",
            "Input",
            ts,
            json!({ "frame_index": frame_index, "cursor": name }),
        ),
        RecordedEvent::FrameSummary(s) => instant(
            "FrameSummary",
            "Summary",
            ts,
            json!({
                "frame_index": s.frame_index,
                "tree_synced": s.tree_synced,
                "validation_passes": s.validation_passes,
                "transform_roots": s.transform_roots,
                "instance_count": s.instance_count,
                "drawable_count": s.drawable_count,
                "block_count": s.block_count,
                "repainted_blocks": s.repainted_blocks,
            }),
        ),
        RecordedEvent::BlockChangesCount { frame_index, count } => instant(
            "BlockChanges",
            "Rich",
            ts,
            json!({ "frame_index": frame_index, "count": count }),
        ),
    }
}

fn instant(name: &str, cat: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

#[expect(
    clippy::cast_precision_loss,
    reason = "trace timestamps tolerate sub-microsecond rounding"
)]
fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use weft_core::backend::Cursor;
    use weft_core::trace::{
        CursorEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
    };

    fn export_to_values(bytes: &[u8]) -> Vec<Value> {
        let mut out = Vec::new();
        export(bytes, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Cursor,
        });
        rec.on_cursor(&CursorEvent {
            frame_index: 0,
            cursor: Cursor::GRAB,
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Cursor,
        });
        rec.on_frame_summary(&FrameSummary {
            frame_index: 0,
            tree_synced: true,
            validation_passes: 1,
            transform_roots: 0,
            instance_count: 3,
            drawable_count: 2,
            block_count: 1,
            repainted_blocks: 1,
        });

        let parsed = export_to_values(rec.as_bytes());
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "cursor");

        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["args"]["cursor"], "grab");

        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["name"], "cursor");

        assert_eq!(parsed[3]["name"], "FrameSummary");
        assert_eq!(parsed[3]["args"]["block_count"], 1);
        assert_eq!(parsed[3]["args"]["tree_synced"], true);

        let begin = parsed[0]["ts"].as_f64().unwrap();
        let end = parsed[2]["ts"].as_f64().unwrap();
        assert!(begin <= end);
    }

    #[test]
    fn export_empty_recording() {
        assert!(export_to_values(&[]).is_empty());
    }
}
