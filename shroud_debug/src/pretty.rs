// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use shroud_core::SurfaceId;
use shroud_core::capability::{Capability, Unavailability};
use shroud_core::timer::TimerId;
use shroud_core::trace::{
    AllocationRetryEvent, CapabilityEvent, ContentSkippedEvent, FailClosedEvent,
    FailClosedReason, FrameAdvanceEvent, RefreshEvent, RenderPassEvent, SurfaceCreatedEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn surface_label(s: SurfaceId) -> String {
    format!("{}@{}", s.index(), s.generation())
}

fn reason_label(reason: FailClosedReason) -> String {
    match reason {
        FailClosedReason::UnsupportedPlatform { found, required } => {
            format!("unsupported-platform found={found} required={required}")
        }
        FailClosedReason::SurfaceTypeMissing => "surface-type-missing".into(),
        FailClosedReason::NotCaptureExcluded => "not-capture-excluded".into(),
        FailClosedReason::ProtectionLost => "protection-lost".into(),
        FailClosedReason::DecodeFailure => "decode-failure".into(),
        FailClosedReason::AllocationExhausted => "allocation-exhausted".into(),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_capability_probed(&mut self, e: &CapabilityEvent) {
        let state = match e.capability {
            Capability::Available(class) => format!("available class={}", class.name()),
            Capability::Unavailable(Unavailability::VersionTooOld { found, required }) => {
                format!("UNAVAILABLE version={found} < {required}")
            }
            Capability::Unavailable(Unavailability::SurfaceTypeMissing) => {
                "UNAVAILABLE surface type missing".into()
            }
        };
        let _ = writeln!(self.writer, "[capability] {state}");
    }

    fn on_surface_created(&mut self, e: &SurfaceCreatedEvent) {
        let _ = writeln!(
            self.writer,
            "[surface:create] {} bounds=({}, {}, {}, {})",
            surface_label(e.surface),
            e.bounds.x0,
            e.bounds.y0,
            e.bounds.x1,
            e.bounds.y1,
        );
    }

    fn on_surface_destroyed(&mut self, surface: SurfaceId) {
        let _ = writeln!(self.writer, "[surface:destroy] {}", surface_label(surface));
    }

    fn on_fail_closed(&mut self, e: &FailClosedEvent) {
        let surface = e.surface.map_or_else(|| "-".into(), surface_label);
        let _ = writeln!(
            self.writer,
            "[FAIL-CLOSED] surface={surface} {}",
            reason_label(e.reason),
        );
    }

    fn on_render_pass(&mut self, e: &RenderPassEvent) {
        let _ = writeln!(
            self.writer,
            "[render] {} pass={} {}x{} {:?} digest={:?}",
            surface_label(e.surface),
            e.pass,
            e.key.size.width,
            e.key.size.height,
            e.kind,
            e.key.digest,
        );
    }

    fn on_content_skipped(&mut self, e: &ContentSkippedEvent) {
        let _ = writeln!(
            self.writer,
            "[render:skip] {} {}x{} unchanged",
            surface_label(e.surface),
            e.key.size.width,
            e.key.size.height,
        );
    }

    fn on_allocation_retry(&mut self, e: &AllocationRetryEvent) {
        let _ = writeln!(
            self.writer,
            "[alloc:retry] {} failed={}x{} next={:?}",
            surface_label(e.surface),
            e.failed.width,
            e.failed.height,
            e.next,
        );
    }

    fn on_refresh(&mut self, e: &RefreshEvent) {
        let _ = writeln!(
            self.writer,
            "[refresh] {} protection={:?}",
            surface_label(e.surface),
            e.protection,
        );
    }

    fn on_content_cleared(&mut self, surface: SurfaceId) {
        let _ = writeln!(self.writer, "[clear] {}", surface_label(surface));
    }

    fn on_frame_advance(&mut self, e: &FrameAdvanceEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] {} timer={} frame={} elapsed={}",
            surface_label(e.surface),
            e.timer.get(),
            e.frame,
            e.elapsed_frames,
        );
    }

    fn on_timer_discarded(&mut self, timer: TimerId, surface: SurfaceId) {
        let _ = writeln!(
            self.writer,
            "[timer:discard] timer={} surface={}",
            timer.get(),
            surface_label(surface),
        );
    }
}
