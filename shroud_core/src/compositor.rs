// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`SecureCompositor`]: one instance per host, driving every protected
//! surface on it.

use alloc::boxed::Box;
use core::fmt;

use kurbo::Rect;

use crate::adapter::{ContentAdapter, ContentOutcome};
use crate::capability::Capability;
use crate::config::ShroudConfig;
use crate::content::Drawable;
use crate::digest::RenderKey;
use crate::error::{ContentDecodeFailure, SurfaceError};
use crate::factory::SurfaceFactory;
use crate::guard::{CaptureGuard, GuardState};
use crate::host::{Host, Protection};
use crate::render::Rasterizer;
use crate::surface::store::{Released, SurfaceStore};
use crate::surface::{RenderState, SurfaceId};
use crate::time::HostTime;
use crate::timer::FrameTimers;
use crate::trace::{FailClosedEvent, FailClosedReason, FrameAdvanceEvent, TraceSink, Tracer};
use crate::view::RetiredSurfaces;

/// Owns a host and every protected surface created on it.
///
/// All methods run on the UI thread. Content operations commit through the
/// capture guard before returning, so by the time a call returns the new
/// contents are either committed inside the capture-excluded surface or
/// nothing is shown.
pub struct SecureCompositor<H: Host, R: Rasterizer> {
    host: H,
    store: SurfaceStore<H>,
    factory: SurfaceFactory,
    adapter: ContentAdapter<R>,
    guard: CaptureGuard,
    timers: FrameTimers,
    config: ShroudConfig,
    sink: Option<Box<dyn TraceSink>>,
    retired: RetiredSurfaces,
    frame_failures: u64,
}

impl<H: Host, R: Rasterizer> fmt::Debug for SecureCompositor<H, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureCompositor")
            .field("store", &self.store)
            .field("capability", &self.factory.cached())
            .field("timers", &self.timers.pending())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn tracer(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink {
        Some(s) => Tracer::new(&mut **s),
        None => Tracer::none(),
    }
}

impl<H: Host, R: Rasterizer> SecureCompositor<H, R> {
    /// Creates a compositor. The capability is not probed until first use.
    #[must_use]
    pub fn new(host: H, rasterizer: R, config: ShroudConfig) -> Self {
        Self {
            host,
            store: SurfaceStore::new(),
            factory: SurfaceFactory::new(config.min_platform_version),
            adapter: ContentAdapter::new(rasterizer, &config),
            guard: CaptureGuard::default(),
            timers: FrameTimers::default(),
            config,
            sink: None,
            retired: RetiredSurfaces::default(),
            frame_failures: 0,
        }
    }

    /// Installs a trace sink. Events are only delivered when the `trace`
    /// feature is enabled.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Replaces or removes the trace sink.
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.sink = sink;
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The rasterizer.
    #[must_use]
    pub fn rasterizer(&self) -> &R {
        self.adapter.rasterizer()
    }

    /// Mutable access to the rasterizer.
    pub fn rasterizer_mut(&mut self) -> &mut R {
        self.adapter.rasterizer_mut()
    }

    /// The configuration this compositor was created with.
    #[must_use]
    pub fn config(&self) -> &ShroudConfig {
        &self.config
    }

    /// Resolves the capability (probing on first use).
    pub fn capability(&mut self) -> Capability {
        let mut tracer = tracer(&mut self.sink);
        self.factory.capability(&self.host, &mut tracer)
    }

    // -- Surface lifecycle --

    /// Creates a protected surface at `bounds`.
    ///
    /// # Errors
    ///
    /// - [`SurfaceError::UnsupportedPlatformVersion`] if the platform is
    ///   older than [`ShroudConfig::min_platform_version`].
    /// - [`SurfaceError::ProtectedSurfaceMissing`] if the host did not hand
    ///   out a capture-excluded surface.
    ///
    /// In both cases nothing is created and the sensitive payload must not
    /// be displayed by other means.
    pub fn create_protected_surface(&mut self, bounds: Rect) -> Result<SurfaceId, SurfaceError> {
        self.destroy_retired();
        let mut tracer = tracer(&mut self.sink);
        self.factory
            .create(&mut self.host, &mut self.store, bounds, &mut tracer)
    }

    /// Destroys a surface: cancels its timers, detaches its child and
    /// releases the hidden widget.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] if `id` was already destroyed.
    pub fn destroy_surface(&mut self, id: SurfaceId) -> Result<(), SurfaceError> {
        self.destroy_retired();
        let released = self.store.remove(id)?;
        self.release(id, released);
        Ok(())
    }

    /// Destroys the surfaces of views dropped without
    /// [`teardown`](crate::view::SecureImageView::teardown). Returns how many
    /// were still live.
    ///
    /// Every other mutating call does this first, so hosts only need it to
    /// reclaim widgets while otherwise idle.
    pub fn destroy_retired(&mut self) -> usize {
        let mut destroyed = 0;
        for id in self.retired.take() {
            // Ids destroyed directly through the compositor are skipped.
            if let Ok(released) = self.store.remove(id) {
                self.release(id, released);
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Shared queue that dropped views push their surfaces onto.
    pub(crate) fn retired(&self) -> RetiredSurfaces {
        self.retired.clone()
    }

    fn release(&mut self, id: SurfaceId, released: Released<H>) {
        if let Some(timer) = released.timer {
            self.timers.cancel(timer);
        }
        self.timers.cancel_surface(id);
        if let Some(child) = released.child {
            self.host.detach_child(child);
        }
        self.host.release(released.widget, released.surface);
        tracer(&mut self.sink).surface_destroyed(id);
    }

    // -- Content --

    /// Replaces the surface's content. Identical content at an unchanged
    /// pixel size is a no-op.
    ///
    /// # Errors
    ///
    /// - [`SurfaceError::StaleSurface`] for a destroyed surface.
    /// - [`SurfaceError::SurfaceAllocationFailure`] if not even the
    ///   placeholder could be allocated; the surface is left empty.
    /// - [`SurfaceError::ProtectionLost`] if the surface stopped being
    ///   capture-excluded; the surface is left empty.
    pub fn set_content(
        &mut self,
        id: SurfaceId,
        drawable: Drawable,
    ) -> Result<ContentOutcome, SurfaceError> {
        self.destroy_retired();
        let mut tracer = tracer(&mut self.sink);
        let result = self.adapter.set_content(
            &mut self.host,
            &mut self.store,
            &mut self.timers,
            id,
            drawable,
            &mut tracer,
        );
        drop(tracer);
        self.commit(id, result)
    }

    /// Sets the output of an upstream decoder. A decode failure clears the
    /// surface so stale content is never left behind.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::ContentDecodeFailure`] for a failed decode,
    /// plus everything [`set_content`](Self::set_content) can return.
    pub fn set_decoded(
        &mut self,
        id: SurfaceId,
        decoded: Result<Drawable, ContentDecodeFailure>,
    ) -> Result<ContentOutcome, SurfaceError> {
        match decoded {
            Ok(drawable) => self.set_content(id, drawable),
            Err(err) => {
                self.clear_content(id)?;
                tracer(&mut self.sink).fail_closed(&FailClosedEvent {
                    surface: Some(id),
                    reason: FailClosedReason::DecodeFailure,
                });
                Err(err.into())
            }
        }
    }

    /// Removes the surface's content.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] for a destroyed surface.
    pub fn clear_content(&mut self, id: SurfaceId) -> Result<(), SurfaceError> {
        self.destroy_retired();
        let mut tracer = tracer(&mut self.sink);
        let result = self.adapter.clear_content(
            &mut self.host,
            &mut self.store,
            &mut self.timers,
            id,
            &mut tracer,
        );
        drop(tracer);
        self.commit(id, result)
    }

    /// Moves and resizes the surface, re-rendering its content immediately
    /// if the pixel size changed.
    ///
    /// # Errors
    ///
    /// Same as [`set_content`](Self::set_content).
    pub fn resize(&mut self, id: SurfaceId, bounds: Rect) -> Result<ContentOutcome, SurfaceError> {
        self.destroy_retired();
        let mut tracer = tracer(&mut self.sink);
        let result = self.adapter.resize(
            &mut self.host,
            &mut self.store,
            &mut self.timers,
            id,
            bounds,
            &mut tracer,
        );
        drop(tracer);
        self.commit(id, result)
    }

    /// Fires every animation timer due at `now`. Returns the number of
    /// surfaces whose frame advanced.
    ///
    /// Call from the host's frame callback. A frame that fails leaves its
    /// surface empty and is counted in
    /// [`frame_failures`](Self::frame_failures).
    pub fn advance_timers(&mut self, now: HostTime) -> usize {
        self.destroy_retired();
        let mut advanced = 0;
        for firing in self.timers.take_due(now) {
            let mut tracer = tracer(&mut self.sink);
            let current = self
                .store
                .check(firing.surface)
                .is_ok_and(|i| self.store.timer[i] == Some(firing.timer));
            if !current {
                self.timers.cancel(firing.timer);
                tracer.timer_discarded(firing.timer, firing.surface);
                continue;
            }
            let result = self.adapter.advance(
                &mut self.host,
                &mut self.store,
                &mut self.timers,
                firing.surface,
                firing.frames,
                &mut tracer,
            );
            if let Ok((frame, _)) = result {
                tracer.frame_advance(&FrameAdvanceEvent {
                    surface: firing.surface,
                    timer: firing.timer,
                    frame,
                    elapsed_frames: firing.frames,
                });
                advanced += 1;
            }
            drop(tracer);
            if self.commit(firing.surface, result).is_err() {
                self.frame_failures += 1;
            }
        }
        advanced
    }

    /// Runs the capture guard after a content mutation.
    fn commit<T>(
        &mut self,
        id: SurfaceId,
        result: Result<T, SurfaceError>,
    ) -> Result<T, SurfaceError> {
        let mut tracer = tracer(&mut self.sink);
        match self
            .guard
            .notify_content_changed(&mut self.host, &mut self.store, id, &mut tracer)
        {
            Ok(()) => result,
            Err(SurfaceError::ProtectionLost) => {
                if let Ok(i) = self.store.check(id)
                    && let Some(timer) = self.store.timer[i].take()
                {
                    self.timers.cancel(timer);
                }
                Err(SurfaceError::ProtectionLost)
            }
            Err(SurfaceError::StaleSurface(_)) => result,
            Err(err) => Err(err),
        }
    }

    // -- Inspection --

    /// Number of live surfaces.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.store.live() as usize
    }

    /// Returns `true` if `id` refers to a live surface.
    #[must_use]
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.store.contains(id)
    }

    /// Render bookkeeping of a surface.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] for a destroyed surface.
    pub fn render_state(&self, id: SurfaceId) -> Result<RenderState, SurfaceError> {
        Ok(self.store.render[self.store.check(id)?])
    }

    /// Number of rasterization passes performed for a surface.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] for a destroyed surface.
    pub fn render_passes(&self, id: SurfaceId) -> Result<u64, SurfaceError> {
        Ok(self.render_state(id)?.passes())
    }

    /// Key of the surface's last render, or `None` if nothing is shown.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] for a destroyed surface.
    pub fn render_key(&self, id: SurfaceId) -> Result<Option<RenderKey>, SurfaceError> {
        Ok(self.render_state(id)?.last())
    }

    /// Protection classification recorded when the surface was created.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] for a destroyed surface.
    pub fn protection(&self, id: SurfaceId) -> Result<Protection, SurfaceError> {
        Ok(self.store.protection[self.store.check(id)?])
    }

    /// Returns `true` once the host reclassified the surface. A lost surface
    /// refuses content until destroyed.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] for a destroyed surface.
    pub fn protection_lost(&self, id: SurfaceId) -> Result<bool, SurfaceError> {
        Ok(self.store.lost[self.store.check(id)?])
    }

    /// Guard state of a surface. Always [`GuardState::Clean`] between calls.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] for a destroyed surface.
    pub fn guard_state(&self, id: SurfaceId) -> Result<GuardState, SurfaceError> {
        Ok(self.store.guard[self.store.check(id)?])
    }

    /// Current bounds of a surface, in points.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] for a destroyed surface.
    pub fn bounds(&self, id: SurfaceId) -> Result<Rect, SurfaceError> {
        Ok(self.store.bounds[self.store.check(id)?])
    }

    /// The drawable a surface currently displays.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] for a destroyed surface.
    pub fn drawable(&self, id: SurfaceId) -> Result<Option<&Drawable>, SurfaceError> {
        Ok(self.store.drawable[self.store.check(id)?].as_ref())
    }

    /// The hidden widget and protected surface backing `id`.
    #[must_use]
    pub fn native(&self, id: SurfaceId) -> Option<(&H::Widget, &H::Surface)> {
        self.store.native(self.store.check(id).ok()?)
    }

    /// The content child currently attached to `id`, if any.
    #[must_use]
    pub fn child(&self, id: SurfaceId) -> Option<&H::Child> {
        self.store.child[self.store.check(id).ok()?].as_ref()
    }

    /// Number of pending animation timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Animation frames that failed to render or commit since creation.
    #[must_use]
    pub fn frame_failures(&self) -> u64 {
        self.frame_failures
    }

    /// Total protected refreshes forced by the capture guard.
    #[must_use]
    pub fn protected_refreshes(&self) -> u64 {
        self.guard.refreshes()
    }
}

impl<H: Host, R: Rasterizer> Drop for SecureCompositor<H, R> {
    fn drop(&mut self) {
        for i in 0..self.store.len as usize {
            if let Some(child) = self.store.child[i].take() {
                self.host.detach_child(child);
            }
            if let (Some(widget), Some(surface)) =
                (self.store.widget[i].take(), self.store.surface[i].take())
            {
                self.host.release(widget, surface);
            }
        }
    }
}
