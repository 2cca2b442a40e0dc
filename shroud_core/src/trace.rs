// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for protected surfaces.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! factory, content adapter, capture guard and frame timers call as they
//! work. All method bodies default to no-ops, so implementing only the events
//! you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).

use kurbo::Rect;

use crate::capability::{Capability, PlatformVersion};
use crate::content::PixelSize;
use crate::digest::RenderKey;
use crate::host::Protection;
use crate::render::FrameKind;
use crate::surface::SurfaceId;
use crate::timer::TimerId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why sensitive content was refused or removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailClosedReason {
    /// The platform is older than the configured minimum.
    UnsupportedPlatform {
        /// Version reported by the host.
        found: PlatformVersion,
        /// Minimum version required.
        required: PlatformVersion,
    },
    /// The host widget does not expose the protected surface type.
    SurfaceTypeMissing,
    /// The acquired surface did not read back as capture-excluded.
    NotCaptureExcluded,
    /// The surface's classification changed after a refresh.
    ProtectionLost,
    /// The upstream decoder failed.
    DecodeFailure,
    /// Not even the placeholder could be allocated.
    AllocationExhausted,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted the first time the capability is resolved.
#[derive(Clone, Copy, Debug)]
pub struct CapabilityEvent {
    /// The probe result.
    pub capability: Capability,
}

/// Emitted when a protected surface is created.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceCreatedEvent {
    /// The new surface.
    pub surface: SurfaceId,
    /// Bounds in points.
    pub bounds: Rect,
}

/// Emitted when content is refused or removed to avoid showing it
/// unprotected.
#[derive(Clone, Copy, Debug)]
pub struct FailClosedEvent {
    /// The affected surface, if one exists yet.
    pub surface: Option<SurfaceId>,
    /// Why.
    pub reason: FailClosedReason,
}

/// Emitted after every rasterization pass.
#[derive(Clone, Copy, Debug)]
pub struct RenderPassEvent {
    /// Target surface.
    pub surface: SurfaceId,
    /// What was rendered, at the surface's full pixel size.
    pub key: RenderKey,
    /// Resolution class of the produced frame.
    pub kind: FrameKind,
    /// Total passes for this surface, including this one.
    pub pass: u64,
}

/// Emitted when a render was skipped because the key was unchanged.
#[derive(Clone, Copy, Debug)]
pub struct ContentSkippedEvent {
    /// Target surface.
    pub surface: SurfaceId,
    /// The unchanged key.
    pub key: RenderKey,
}

/// Emitted when a render target could not be allocated.
#[derive(Clone, Copy, Debug)]
pub struct AllocationRetryEvent {
    /// Target surface.
    pub surface: SurfaceId,
    /// Size that failed.
    pub failed: PixelSize,
    /// What is attempted next.
    pub next: FrameKind,
}

/// Emitted after the guard forced a protected refresh.
#[derive(Clone, Copy, Debug)]
pub struct RefreshEvent {
    /// Refreshed surface.
    pub surface: SurfaceId,
    /// Classification read back after the refresh.
    pub protection: Protection,
}

/// Emitted when an animation timer advanced a surface's frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameAdvanceEvent {
    /// Animated surface.
    pub surface: SurfaceId,
    /// Timer that fired.
    pub timer: TimerId,
    /// New frame index.
    pub frame: usize,
    /// Whole intervals elapsed since the previous advance.
    pub elapsed_frames: u64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called once when the capability is first resolved.
    fn on_capability_probed(&mut self, e: &CapabilityEvent) {
        _ = e;
    }

    /// Called when a surface is created.
    fn on_surface_created(&mut self, e: &SurfaceCreatedEvent) {
        _ = e;
    }

    /// Called when a surface is destroyed.
    fn on_surface_destroyed(&mut self, surface: SurfaceId) {
        _ = surface;
    }

    /// Called when content is refused or removed.
    fn on_fail_closed(&mut self, e: &FailClosedEvent) {
        _ = e;
    }

    /// Called after each rasterization pass.
    fn on_render_pass(&mut self, e: &RenderPassEvent) {
        _ = e;
    }

    /// Called when a render is skipped.
    fn on_content_skipped(&mut self, e: &ContentSkippedEvent) {
        _ = e;
    }

    /// Called when a render target allocation fails.
    fn on_allocation_retry(&mut self, e: &AllocationRetryEvent) {
        _ = e;
    }

    /// Called after each protected refresh.
    fn on_refresh(&mut self, e: &RefreshEvent) {
        _ = e;
    }

    /// Called when a surface's content is cleared.
    fn on_content_cleared(&mut self, surface: SurfaceId) {
        _ = surface;
    }

    /// Called when an animation frame advances.
    fn on_frame_advance(&mut self, e: &FrameAdvanceEvent) {
        _ = e;
    }

    /// Called when a timer for a destroyed or re-purposed surface is dropped
    /// without firing.
    fn on_timer_discarded(&mut self, timer: TimerId, surface: SurfaceId) {
        _ = (timer, surface);
    }
}

/// A sink that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer
// ---------------------------------------------------------------------------

/// Zero-cost wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is disabled, all methods are no-ops that the
/// compiler eliminates entirely.
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

macro_rules! dispatch {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($($arg),*);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = ($($arg,)*);
        }
    }};
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

    /// Emits a [`CapabilityEvent`].
    #[inline]
    pub fn capability_probed(&mut self, e: &CapabilityEvent) {
        dispatch!(self, on_capability_probed(e));
    }

    /// Emits a [`SurfaceCreatedEvent`].
    #[inline]
    pub fn surface_created(&mut self, e: &SurfaceCreatedEvent) {
        dispatch!(self, on_surface_created(e));
    }

    /// Reports a destroyed surface.
    #[inline]
    pub fn surface_destroyed(&mut self, surface: SurfaceId) {
        dispatch!(self, on_surface_destroyed(surface));
    }

    /// Emits a [`FailClosedEvent`].
    #[inline]
    pub fn fail_closed(&mut self, e: &FailClosedEvent) {
        dispatch!(self, on_fail_closed(e));
    }

    /// Emits a [`RenderPassEvent`].
    #[inline]
    pub fn render_pass(&mut self, e: &RenderPassEvent) {
        dispatch!(self, on_render_pass(e));
    }

    /// Emits a [`ContentSkippedEvent`].
    #[inline]
    pub fn content_skipped(&mut self, e: &ContentSkippedEvent) {
        dispatch!(self, on_content_skipped(e));
    }

    /// Emits an [`AllocationRetryEvent`].
    #[inline]
    pub fn allocation_retry(&mut self, e: &AllocationRetryEvent) {
        dispatch!(self, on_allocation_retry(e));
    }

    /// Emits a [`RefreshEvent`].
    #[inline]
    pub fn refresh(&mut self, e: &RefreshEvent) {
        dispatch!(self, on_refresh(e));
    }

    /// Reports cleared content.
    #[inline]
    pub fn content_cleared(&mut self, surface: SurfaceId) {
        dispatch!(self, on_content_cleared(surface));
    }

    /// Emits a [`FrameAdvanceEvent`].
    #[inline]
    pub fn frame_advance(&mut self, e: &FrameAdvanceEvent) {
        dispatch!(self, on_frame_advance(e));
    }

    /// Reports a discarded timer.
    #[inline]
    pub fn timer_discarded(&mut self, timer: TimerId, surface: SurfaceId) {
        dispatch!(self, on_timer_discarded(timer, surface));
    }
}
