// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content adapter: keeps a surface's single child in sync with its drawable.
//!
//! The adapter rasterizes drawables offscreen at the surface's pixel size
//! and hands the result to the host as the contents of the surface's one
//! content child. The child is attached on first use and mutated in place
//! afterwards; the protected surface itself is never re-created.
//!
//! Rendering is keyed by [`RenderKey`] (content digest + pixel size), so
//! setting identical content is a no-op while a resize re-renders the same
//! digest at the new size.
//!
//! When the full-size render target cannot be allocated the adapter retries
//! once at [`ShroudConfig::retry_scale`](crate::ShroudConfig::retry_scale),
//! then falls back to a 1×1 placeholder fill stretched over the bounds. If
//! even that fails the child is detached and nothing is shown.
//!
//! Every mutation marks the surface dirty for the [capture guard](crate::guard).

use kurbo::{Point, Rect};

use crate::config::ShroudConfig;
use crate::content::{Drawable, PixelSize, Rgba};
use crate::digest::{ContentDigest, Digester, RenderKey};
use crate::error::SurfaceError;
use crate::guard::CaptureGuard;
use crate::host::Host;
use crate::render::{
    FrameKind, RasterError, Rasterizer, RenderSource, RenderTarget, RenderedFrame,
};
use crate::surface::SurfaceId;
use crate::surface::store::{RenderState, SurfaceStore};
use crate::timer::FrameTimers;
use crate::trace::{
    AllocationRetryEvent, ContentSkippedEvent, FailClosedEvent, FailClosedReason,
    RenderPassEvent, Tracer,
};

/// What a content operation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentOutcome {
    /// The render key was unchanged; nothing was rasterized.
    Unchanged,
    /// Rendered at full resolution.
    Rendered,
    /// Rendered at reduced resolution after an allocation failure.
    Degraded,
    /// The real content could not be rendered; a flat placeholder is shown.
    Placeholder,
    /// The bounds have zero area; nothing is shown until they grow.
    Empty,
    /// The surface has no drawable.
    NoContent,
}

/// Renders drawables onto protected surfaces.
#[derive(Debug)]
pub(crate) struct ContentAdapter<R> {
    rasterizer: R,
    digester: Digester,
    retry_scale: f64,
    placeholder: Rgba,
}

impl<R: Rasterizer> ContentAdapter<R> {
    pub(crate) fn new(rasterizer: R, config: &ShroudConfig) -> Self {
        Self {
            rasterizer,
            digester: Digester::default(),
            retry_scale: config.retry_scale,
            placeholder: config.placeholder,
        }
    }

    pub(crate) fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub(crate) fn rasterizer_mut(&mut self) -> &mut R {
        &mut self.rasterizer
    }

    /// Replaces the surface's drawable (last write wins) and renders it.
    pub(crate) fn set_content<H: Host>(
        &mut self,
        host: &mut H,
        store: &mut SurfaceStore<H>,
        timers: &mut FrameTimers,
        id: SurfaceId,
        drawable: Drawable,
        tracer: &mut Tracer<'_>,
    ) -> Result<ContentOutcome, SurfaceError> {
        let i = usable(store, id)?;
        let digest = self.digester.digest(&drawable);
        let size = PixelSize::from_bounds(store.bounds[i], host.scale_factor());
        let state = store.render[i];
        if store.digest[i] == Some(digest)
            && !state.degraded
            && let Some(last) = state.last
            && last.size == size
        {
            tracer.content_skipped(&ContentSkippedEvent { surface: id, key: last });
            return Ok(ContentOutcome::Unchanged);
        }

        if let Some(timer) = store.timer[i].take() {
            timers.cancel(timer);
        }
        let interval = drawable
            .animation()
            .filter(|a| a.len() > 1)
            .map(|a| a.frame_duration());
        store.drawable[i] = Some(drawable);
        store.digest[i] = Some(digest);
        store.frame[i] = 0;
        store.render[i].last = None;

        let outcome = self.render(host, store, timers, id, i, tracer)?;
        if let Some(interval) = interval {
            store.timer[i] = Some(timers.schedule(id, interval));
        }
        Ok(outcome)
    }

    /// Drops the drawable, cancels its animation timer and detaches the
    /// child.
    pub(crate) fn clear_content<H: Host>(
        &mut self,
        host: &mut H,
        store: &mut SurfaceStore<H>,
        timers: &mut FrameTimers,
        id: SurfaceId,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), SurfaceError> {
        let i = store.check(id)?;
        let had_content = store.drawable[i].is_some() || store.child[i].is_some();
        Self::drop_content(host, store, timers, i);
        if had_content {
            CaptureGuard::mark_dirty(store, i);
            tracer.content_cleared(id);
        }
        Ok(())
    }

    /// Moves the surface to `bounds`, re-rendering if the pixel size
    /// changed.
    pub(crate) fn resize<H: Host>(
        &mut self,
        host: &mut H,
        store: &mut SurfaceStore<H>,
        timers: &mut FrameTimers,
        id: SurfaceId,
        bounds: Rect,
        tracer: &mut Tracer<'_>,
    ) -> Result<ContentOutcome, SurfaceError> {
        let i = usable(store, id)?;
        let (widget, surface) = store.native(i).ok_or(SurfaceError::StaleSurface(id))?;
        host.set_bounds(widget, surface, bounds);
        store.bounds[i] = bounds;
        if store.drawable[i].is_none() {
            return Ok(ContentOutcome::NoContent);
        }
        self.render(host, store, timers, id, i, tracer)
    }

    /// Advances an animated surface by `frames` and re-renders it.
    pub(crate) fn advance<H: Host>(
        &mut self,
        host: &mut H,
        store: &mut SurfaceStore<H>,
        timers: &mut FrameTimers,
        id: SurfaceId,
        frames: u64,
        tracer: &mut Tracer<'_>,
    ) -> Result<(usize, ContentOutcome), SurfaceError> {
        let i = usable(store, id)?;
        let Some(animation) = store.drawable[i].as_ref().and_then(Drawable::animation) else {
            return Ok((store.frame[i], ContentOutcome::NoContent));
        };
        let len = animation.len() as u64;
        let step = usize::try_from(frames % len).unwrap_or(0);
        let frame = (store.frame[i] + step) % animation.len();
        store.frame[i] = frame;
        let outcome = self.render(host, store, timers, id, i, tracer)?;
        Ok((frame, outcome))
    }

    /// Renders the current drawable of slot `i` at its current bounds.
    fn render<H: Host>(
        &mut self,
        host: &mut H,
        store: &mut SurfaceStore<H>,
        timers: &mut FrameTimers,
        id: SurfaceId,
        i: usize,
        tracer: &mut Tracer<'_>,
    ) -> Result<ContentOutcome, SurfaceError> {
        // Nothing sensitive is rasterized for, or uploaded to, a surface
        // that captures could see.
        if !CaptureGuard::intact(host, store, i) {
            CaptureGuard::lose(host, store, id, i, tracer);
            return Err(SurfaceError::ProtectionLost);
        }

        let bounds = store.bounds[i];
        let scale = host.scale_factor();
        let size = PixelSize::from_bounds(bounds, scale);
        let (Some(drawable), Some(base)) = (store.drawable[i].as_ref(), store.digest[i]) else {
            return Ok(ContentOutcome::NoContent);
        };
        let (source, digest) = self.source(drawable, base, store.frame[i]);
        let key = RenderKey { digest, size };

        let state = store.render[i];
        if state.last == Some(key) && !state.degraded {
            tracer.content_skipped(&ContentSkippedEvent { surface: id, key });
            return Ok(ContentOutcome::Unchanged);
        }

        if size.is_empty() {
            if let Some(child) = store.child[i].take() {
                host.detach_child(child);
                CaptureGuard::mark_dirty(store, i);
            }
            store.render[i] = RenderState {
                last: Some(key),
                passes: state.passes,
                degraded: false,
            };
            return Ok(ContentOutcome::Empty);
        }

        let frame = match self.produce(source, size, scale, id, tracer) {
            Ok(frame) => frame,
            Err(_) => {
                tracer.fail_closed(&FailClosedEvent {
                    surface: Some(id),
                    reason: FailClosedReason::AllocationExhausted,
                });
                Self::drop_content(host, store, timers, i);
                CaptureGuard::mark_dirty(store, i);
                return Err(SurfaceError::SurfaceAllocationFailure {
                    width: size.width,
                    height: size.height,
                });
            }
        };

        let local = Rect::from_origin_size(Point::ORIGIN, bounds.size());
        let surface = store.surface[i]
            .as_ref()
            .ok_or(SurfaceError::StaleSurface(id))?;
        let child = store.child[i].get_or_insert_with(|| host.attach_child(surface, local));
        host.set_child_contents(child, &frame, local);

        let passes = state.passes + 1;
        store.render[i] = RenderState {
            last: Some(key),
            passes,
            degraded: frame.kind != FrameKind::Full,
        };
        CaptureGuard::mark_dirty(store, i);
        tracer.render_pass(&RenderPassEvent {
            surface: id,
            key,
            kind: frame.kind,
            pass: passes,
        });
        Ok(match frame.kind {
            FrameKind::Full => ContentOutcome::Rendered,
            FrameKind::Reduced => ContentOutcome::Degraded,
            FrameKind::Placeholder => ContentOutcome::Placeholder,
        })
    }

    fn source<'a>(
        &self,
        drawable: &'a Drawable,
        base: ContentDigest,
        frame: usize,
    ) -> (RenderSource<'a>, ContentDigest) {
        match drawable {
            Drawable::Image { bitmap, mode } => (
                RenderSource::Image {
                    bitmap,
                    mode: *mode,
                },
                base,
            ),
            Drawable::Animation { animation, mode } => (
                RenderSource::Image {
                    bitmap: animation.frame(frame),
                    mode: *mode,
                },
                self.digester.frame_digest(base, frame),
            ),
            Drawable::Text(block) => (RenderSource::Text(block), base),
        }
    }

    /// Full size, then reduced size, then the placeholder.
    fn produce(
        &mut self,
        source: RenderSource<'_>,
        size: PixelSize,
        scale: f64,
        id: SurfaceId,
        tracer: &mut Tracer<'_>,
    ) -> Result<RenderedFrame, RasterError> {
        let full = RenderTarget {
            size,
            scale,
            kind: FrameKind::Full,
        };
        if let Ok(frame) = self.rasterizer.rasterize(source, full) {
            return Ok(frame);
        }
        let reduced = size.scaled(self.retry_scale);
        if reduced.area() < size.area() {
            tracer.allocation_retry(&AllocationRetryEvent {
                surface: id,
                failed: size,
                next: FrameKind::Reduced,
            });
            let target = RenderTarget {
                size: reduced,
                scale: scale * f64::from(reduced.width) / f64::from(size.width),
                kind: FrameKind::Reduced,
            };
            if let Ok(frame) = self.rasterizer.rasterize(source, target) {
                return Ok(frame);
            }
        }
        tracer.allocation_retry(&AllocationRetryEvent {
            surface: id,
            failed: reduced,
            next: FrameKind::Placeholder,
        });
        self.rasterizer.fill(self.placeholder, PixelSize::new(1, 1))
    }

    fn drop_content<H: Host>(
        host: &mut H,
        store: &mut SurfaceStore<H>,
        timers: &mut FrameTimers,
        i: usize,
    ) {
        if let Some(timer) = store.timer[i].take() {
            timers.cancel(timer);
        }
        if let Some(child) = store.child[i].take() {
            host.detach_child(child);
        }
        store.drawable[i] = None;
        store.digest[i] = None;
        store.frame[i] = 0;
        let passes = store.render[i].passes;
        store.render[i] = RenderState {
            passes,
            ..RenderState::default()
        };
    }
}

/// Resolves `id`, refusing slots whose protection was lost.
fn usable<H: Host>(store: &SurfaceStore<H>, id: SurfaceId) -> Result<usize, SurfaceError> {
    let i = store.check(id)?;
    if store.lost[i] {
        return Err(SurfaceError::ProtectionLost);
    }
    Ok(i)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::content::{AnimatedImage, Bitmap, ContentMode};
    use crate::guard::GuardState;
    use crate::host::Protection;
    use crate::testing::{CountingRasterizer, FakeHost, FakeSurface, FakeWidget};
    use crate::time::Duration;

    struct Rig {
        host: FakeHost,
        store: SurfaceStore<FakeHost>,
        timers: FrameTimers,
        adapter: ContentAdapter<CountingRasterizer>,
        id: SurfaceId,
    }

    impl Rig {
        fn new(bounds: Rect) -> Self {
            let mut store = SurfaceStore::new();
            let id = store.insert(
                FakeWidget(100),
                FakeSurface(100),
                Protection::CaptureExcluded,
                bounds,
            );
            Self {
                host: FakeHost::default(),
                store,
                timers: FrameTimers::default(),
                adapter: ContentAdapter::new(CountingRasterizer::default(), &ShroudConfig::ios()),
                id,
            }
        }

        fn set(&mut self, drawable: Drawable) -> Result<ContentOutcome, SurfaceError> {
            self.adapter.set_content(
                &mut self.host,
                &mut self.store,
                &mut self.timers,
                self.id,
                drawable,
                &mut Tracer::none(),
            )
        }

        fn resize(&mut self, bounds: Rect) -> Result<ContentOutcome, SurfaceError> {
            self.adapter.resize(
                &mut self.host,
                &mut self.store,
                &mut self.timers,
                self.id,
                bounds,
                &mut Tracer::none(),
            )
        }

        fn clear(&mut self) {
            self.adapter
                .clear_content(
                    &mut self.host,
                    &mut self.store,
                    &mut self.timers,
                    self.id,
                    &mut Tracer::none(),
                )
                .unwrap();
        }

        fn state(&self) -> RenderState {
            self.store.render[0]
        }
    }

    fn red() -> Drawable {
        Drawable::image(Bitmap::solid(100, 40, Rgba::RED))
    }

    fn rect(w: f64, h: f64) -> Rect {
        Rect::new(0.0, 0.0, w, h)
    }

    #[test]
    fn identical_content_renders_once() {
        let mut rig = Rig::new(rect(100.0, 40.0));
        assert_eq!(rig.set(red()), Ok(ContentOutcome::Rendered));
        assert_eq!(rig.set(red()), Ok(ContentOutcome::Unchanged));
        assert_eq!(rig.state().passes(), 1);
        assert_eq!(rig.adapter.rasterizer().rasterized, 1);
    }

    #[test]
    fn resize_rerenders_with_same_digest() {
        let mut rig = Rig::new(rect(100.0, 40.0));
        rig.set(red()).unwrap();
        let before = rig.state().last().unwrap();
        assert_eq!(rig.resize(rect(120.0, 40.0)), Ok(ContentOutcome::Rendered));
        let after = rig.state().last().unwrap();
        assert_eq!(rig.state().passes(), 2);
        assert_eq!(before.digest, after.digest);
        assert_eq!(after.size, PixelSize::new(120, 40));
    }

    #[test]
    fn moving_without_resizing_is_unchanged() {
        let mut rig = Rig::new(rect(100.0, 40.0));
        rig.set(red()).unwrap();
        let moved = Rect::new(10.0, 10.0, 110.0, 50.0);
        assert_eq!(rig.resize(moved), Ok(ContentOutcome::Unchanged));
        assert_eq!(rig.host.bounds.last(), Some(&(100, moved)));
    }

    #[test]
    fn child_is_mutated_in_place() {
        let mut rig = Rig::new(rect(100.0, 40.0));
        rig.set(red()).unwrap();
        rig.set(Drawable::text("1234")).unwrap();
        assert_eq!(rig.host.attached, 1);
        let children: alloc::vec::Vec<u32> = rig.host.contents.iter().map(|c| c.0).collect();
        assert_eq!(children[0], children[1], "same child both times");
        assert_eq!(rig.store.guard[0], GuardState::Dirty);
    }

    #[test]
    fn zero_area_detaches_then_renders_on_growth() {
        let mut rig = Rig::new(rect(100.0, 40.0));
        rig.set(red()).unwrap();
        assert_eq!(rig.resize(rect(0.0, 40.0)), Ok(ContentOutcome::Empty));
        assert_eq!(rig.host.attached, 0);
        assert_eq!(rig.state().passes(), 1);
        assert_eq!(rig.resize(rect(50.0, 40.0)), Ok(ContentOutcome::Rendered));
        assert_eq!(rig.host.attached, 1);
        assert_eq!(rig.state().passes(), 2);
    }

    #[test]
    fn allocation_failure_retries_at_reduced_scale() {
        let mut rig = Rig::new(rect(100.0, 40.0));
        rig.adapter.rasterizer_mut().max_pixels = Some(2_000);
        assert_eq!(rig.set(red()), Ok(ContentOutcome::Degraded));
        let (_, size, kind, bounds) = rig.host.contents[0];
        assert_eq!(size, PixelSize::new(50, 20));
        assert_eq!(kind, FrameKind::Reduced);
        assert_eq!(bounds, rect(100.0, 40.0), "stretched over the full bounds");
        assert!(rig.state().degraded());
    }

    #[test]
    fn placeholder_when_reduced_also_fails() {
        let mut rig = Rig::new(rect(100.0, 40.0));
        rig.adapter.rasterizer_mut().max_pixels = Some(10);
        assert_eq!(rig.set(red()), Ok(ContentOutcome::Placeholder));
        assert_eq!(rig.host.contents[0].1, PixelSize::new(1, 1));
        assert_eq!(rig.adapter.rasterizer().fills, 1);

        // Degraded renders are retried even for identical content.
        rig.adapter.rasterizer_mut().max_pixels = None;
        assert_eq!(rig.set(red()), Ok(ContentOutcome::Rendered));
        assert!(!rig.state().degraded());
    }

    #[test]
    fn total_allocation_failure_shows_nothing() {
        let mut rig = Rig::new(rect(100.0, 40.0));
        rig.set(red()).unwrap();
        rig.adapter.rasterizer_mut().max_pixels = Some(0);
        rig.adapter.rasterizer_mut().fail_fill = true;
        let err = rig
            .set(Drawable::image(Bitmap::solid(100, 40, Rgba::WHITE)))
            .unwrap_err();
        assert_eq!(
            err,
            SurfaceError::SurfaceAllocationFailure {
                width: 100,
                height: 40
            }
        );
        assert_eq!(rig.host.attached, 0, "stale content is not left behind");
        assert!(rig.store.drawable[0].is_none());
    }

    #[test]
    fn clear_detaches_and_resets_key() {
        let mut rig = Rig::new(rect(100.0, 40.0));
        rig.set(red()).unwrap();
        rig.clear();
        assert_eq!(rig.host.attached, 0);
        assert_eq!(rig.state().last(), None);
        assert_eq!(rig.state().passes(), 1);
        assert_eq!(rig.set(red()), Ok(ContentOutcome::Rendered), "renders again");
    }

    #[test]
    fn resize_without_content_only_moves() {
        let mut rig = Rig::new(rect(100.0, 40.0));
        assert_eq!(rig.resize(rect(10.0, 10.0)), Ok(ContentOutcome::NoContent));
        assert_eq!(rig.adapter.rasterizer().rasterized, 0);
    }

    #[test]
    fn animations_schedule_a_timer_and_advance() {
        let mut rig = Rig::new(rect(2.0, 2.0));
        let anim = AnimatedImage::new(
            vec![
                Bitmap::solid(2, 2, Rgba::RED),
                Bitmap::solid(2, 2, Rgba::WHITE),
                Bitmap::solid(2, 2, Rgba::BLACK),
            ],
            Duration(10),
        )
        .unwrap();
        let drawable = Drawable::Animation {
            animation: anim,
            mode: ContentMode::ScaleToFill,
        };
        rig.set(drawable.clone()).unwrap();
        assert_eq!(rig.timers.pending(), 1);

        let (frame, outcome) = rig
            .adapter
            .advance(
                &mut rig.host,
                &mut rig.store,
                &mut rig.timers,
                rig.id,
                4,
                &mut Tracer::none(),
            )
            .unwrap();
        assert_eq!(frame, 1);
        assert_eq!(outcome, ContentOutcome::Rendered);
        assert_eq!(rig.state().passes(), 2);

        // Setting the same animation again keeps playback and the timer.
        assert_eq!(rig.set(drawable), Ok(ContentOutcome::Unchanged));
        assert_eq!(rig.timers.pending(), 1);
        assert_eq!(rig.store.frame[0], 1);

        rig.clear();
        assert_eq!(rig.timers.pending(), 0);
    }

    #[test]
    fn replacing_an_animation_cancels_its_timer() {
        let mut rig = Rig::new(rect(2.0, 2.0));
        let anim = AnimatedImage::new(
            vec![Bitmap::solid(2, 2, Rgba::RED), Bitmap::solid(2, 2, Rgba::WHITE)],
            Duration(10),
        )
        .unwrap();
        rig.set(Drawable::Animation {
            animation: anim,
            mode: ContentMode::Center,
        })
        .unwrap();
        rig.set(red()).unwrap();
        assert_eq!(rig.timers.pending(), 0);
        assert!(rig.store.timer[0].is_none());
    }
}
