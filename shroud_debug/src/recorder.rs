// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] by appending a
//! [`RecordedEvent`] per call. The sink is a cheap handle: clone it, move one
//! clone into a compositor with
//! [`set_trace_sink`](shroud_core::SecureCompositor::set_trace_sink), and
//! read the log through the other.

use std::cell::RefCell;
use std::rc::Rc;

use shroud_core::SurfaceId;
use shroud_core::timer::TimerId;
use shroud_core::trace::{
    AllocationRetryEvent, CapabilityEvent, ContentSkippedEvent, FailClosedEvent,
    FrameAdvanceEvent, RefreshEvent, RenderPassEvent, SurfaceCreatedEvent, TraceSink,
};

/// A recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`CapabilityEvent`].
    CapabilityProbed(CapabilityEvent),
    /// A [`SurfaceCreatedEvent`].
    SurfaceCreated(SurfaceCreatedEvent),
    /// A destroyed surface.
    SurfaceDestroyed(SurfaceId),
    /// A [`FailClosedEvent`].
    FailClosed(FailClosedEvent),
    /// A [`RenderPassEvent`].
    RenderPass(RenderPassEvent),
    /// A [`ContentSkippedEvent`].
    ContentSkipped(ContentSkippedEvent),
    /// An [`AllocationRetryEvent`].
    AllocationRetry(AllocationRetryEvent),
    /// A [`RefreshEvent`].
    Refresh(RefreshEvent),
    /// Cleared content.
    ContentCleared(SurfaceId),
    /// A [`FrameAdvanceEvent`].
    FrameAdvance(FrameAdvanceEvent),
    /// A timer dropped without firing.
    TimerDiscarded {
        /// The discarded timer.
        timer: TimerId,
        /// The surface it pointed at.
        surface: SurfaceId,
    },
}

impl RecordedEvent {
    /// Short event name, as used by [`json::export`](crate::json::export).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CapabilityProbed(_) => "CapabilityProbed",
            Self::SurfaceCreated(_) => "SurfaceCreated",
            Self::SurfaceDestroyed(_) => "SurfaceDestroyed",
            Self::FailClosed(_) => "FailClosed",
            Self::RenderPass(_) => "RenderPass",
            Self::ContentSkipped(_) => "ContentSkipped",
            Self::AllocationRetry(_) => "AllocationRetry",
            Self::Refresh(_) => "Refresh",
            Self::ContentCleared(_) => "ContentCleared",
            Self::FrameAdvance(_) => "FrameAdvance",
            Self::TimerDiscarded { .. } => "TimerDiscarded",
        }
    }

    /// The surface the event concerns, if any.
    #[must_use]
    pub fn surface(&self) -> Option<SurfaceId> {
        match self {
            Self::CapabilityProbed(_) => None,
            Self::SurfaceCreated(e) => Some(e.surface),
            Self::FailClosed(e) => e.surface,
            Self::RenderPass(e) => Some(e.surface),
            Self::ContentSkipped(e) => Some(e.surface),
            Self::AllocationRetry(e) => Some(e.surface),
            Self::Refresh(e) => Some(e.surface),
            Self::FrameAdvance(e) => Some(e.surface),
            Self::SurfaceDestroyed(s)
            | Self::ContentCleared(s)
            | Self::TimerDiscarded { surface: s, .. } => Some(*s),
        }
    }
}

/// A [`TraceSink`] that keeps every event in a shared log.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    log: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.log.borrow().clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Removes and returns the recorded events.
    pub fn take(&self) -> Vec<RecordedEvent> {
        self.log.take()
    }

    /// Counts recorded events named `name`.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.log.borrow().iter().filter(|e| e.name() == name).count()
    }

    fn push(&self, event: RecordedEvent) {
        self.log.borrow_mut().push(event);
    }
}

impl TraceSink for RecorderSink {
    fn on_capability_probed(&mut self, e: &CapabilityEvent) {
        self.push(RecordedEvent::CapabilityProbed(*e));
    }

    fn on_surface_created(&mut self, e: &SurfaceCreatedEvent) {
        self.push(RecordedEvent::SurfaceCreated(*e));
    }

    fn on_surface_destroyed(&mut self, surface: SurfaceId) {
        self.push(RecordedEvent::SurfaceDestroyed(surface));
    }

    fn on_fail_closed(&mut self, e: &FailClosedEvent) {
        self.push(RecordedEvent::FailClosed(*e));
    }

    fn on_render_pass(&mut self, e: &RenderPassEvent) {
        self.push(RecordedEvent::RenderPass(*e));
    }

    fn on_content_skipped(&mut self, e: &ContentSkippedEvent) {
        self.push(RecordedEvent::ContentSkipped(*e));
    }

    fn on_allocation_retry(&mut self, e: &AllocationRetryEvent) {
        self.push(RecordedEvent::AllocationRetry(*e));
    }

    fn on_refresh(&mut self, e: &RefreshEvent) {
        self.push(RecordedEvent::Refresh(*e));
    }

    fn on_content_cleared(&mut self, surface: SurfaceId) {
        self.push(RecordedEvent::ContentCleared(surface));
    }

    fn on_frame_advance(&mut self, e: &FrameAdvanceEvent) {
        self.push(RecordedEvent::FrameAdvance(*e));
    }

    fn on_timer_discarded(&mut self, timer: TimerId, surface: SurfaceId) {
        self.push(RecordedEvent::TimerDiscarded { timer, surface });
    }
}
