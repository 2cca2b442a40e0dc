// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export in Chrome Trace Event Format.
//!
//! [`export`] writes events recorded by a
//! [`RecorderSink`](crate::recorder::RecorderSink) as a JSON array of
//! instant events. Trace events carry no timestamps, so `ts` is the event's
//! position in the recording; each surface gets its own `tid` lane.

use std::io::{self, Write};

use serde_json::{Value, json};

use shroud_core::SurfaceId;
use shroud_core::capability::Capability;

use crate::recorder::RecordedEvent;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is loadable in `chrome://tracing` or
/// [Perfetto](https://ui.perfetto.dev/).
///
/// # Errors
///
/// Returns any error from `writer`.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let values: Vec<Value> = events
        .iter()
        .enumerate()
        .map(|(seq, e)| event_json(seq, e))
        .collect();
    serde_json::to_writer_pretty(writer, &values)?;
    Ok(())
}

fn lane(surface: Option<SurfaceId>) -> u32 {
    surface.map_or(0, |s| s.index() + 1)
}

fn event_json(seq: usize, e: &RecordedEvent) -> Value {
    let (cat, args) = match e {
        RecordedEvent::CapabilityProbed(c) => (
            "Capability",
            match c.capability {
                Capability::Available(class) => json!({
                    "available": true,
                    "class": class.name(),
                }),
                Capability::Unavailable(why) => json!({
                    "available": false,
                    "reason": format!("{why:?}"),
                }),
            },
        ),
        RecordedEvent::SurfaceCreated(c) => (
            "Surface",
            json!({
                "bounds": [c.bounds.x0, c.bounds.y0, c.bounds.x1, c.bounds.y1],
            }),
        ),
        RecordedEvent::SurfaceDestroyed(_) | RecordedEvent::ContentCleared(_) => {
            ("Surface", json!({}))
        }
        RecordedEvent::FailClosed(f) => (
            "FailClosed",
            json!({
                "reason": format!("{:?}", f.reason),
            }),
        ),
        RecordedEvent::RenderPass(r) => (
            "Render",
            json!({
                "pass": r.pass,
                "width": r.key.size.width,
                "height": r.key.size.height,
                "kind": format!("{:?}", r.kind),
                "digest": format!("{:016x}", r.key.digest.0),
            }),
        ),
        RecordedEvent::ContentSkipped(s) => (
            "Render",
            json!({
                "width": s.key.size.width,
                "height": s.key.size.height,
            }),
        ),
        RecordedEvent::AllocationRetry(a) => (
            "Render",
            json!({
                "failed": [a.failed.width, a.failed.height],
                "next": format!("{:?}", a.next),
            }),
        ),
        RecordedEvent::Refresh(r) => (
            "Guard",
            json!({
                "protection": format!("{:?}", r.protection),
            }),
        ),
        RecordedEvent::FrameAdvance(f) => (
            "Timer",
            json!({
                "timer": f.timer.get(),
                "frame": f.frame,
                "elapsed_frames": f.elapsed_frames,
            }),
        ),
        RecordedEvent::TimerDiscarded { timer, .. } => (
            "Timer",
            json!({
                "timer": timer.get(),
            }),
        ),
    };
    let surface = e.surface();
    let mut value = json!({
        "ph": "i",
        "name": e.name(),
        "cat": cat,
        "ts": seq,
        "pid": 0,
        "tid": lane(surface),
        "s": "t",
        "args": args,
    });
    if let Some(s) = surface {
        value["args"]["surface"] = json!(format!("{}@{}", s.index(), s.generation()));
    }
    value
}
