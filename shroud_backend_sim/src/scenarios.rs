// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behaviour of protected surfaces on the simulated device.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use kurbo::Rect;
use shroud_core::capability::{Capability, PlatformVersion, Unavailability};
use shroud_core::content::{AnimatedImage, Bitmap, ContentMode, PixelSize, Rgba};
use shroud_core::error::ContentDecodeFailure;
use shroud_core::guard::GuardState;
use shroud_core::host::Protection;
use shroud_core::render::FrameKind;
use shroud_core::time::{Duration, HostTime};
use shroud_core::trace::FailClosedReason;
use shroud_core::view::{Image, SecureImageView, SecureLabel};
use shroud_core::{ContentOutcome, Drawable, ShroudConfig, SurfaceError, SurfaceId};
use shroud_debug::pretty::PrettyPrintSink;
use shroud_debug::recorder::{RecordedEvent, RecorderSink};
use shroud_render::RasterConfig;

use crate::{SimCompositor, SimConfig, SimSurface, compositor};

fn device(sim: SimConfig) -> SimCompositor {
    compositor(sim, ShroudConfig::ios(), RasterConfig::default())
}

fn phone() -> SimCompositor {
    device(SimConfig::ios17())
}

fn with_budget(max_pixels: u64) -> SimCompositor {
    compositor(
        SimConfig::ios17(),
        ShroudConfig::ios(),
        RasterConfig { max_pixels },
    )
}

fn recorded(c: &mut SimCompositor) -> RecorderSink {
    let rec = RecorderSink::new();
    c.set_trace_sink(Some(Box::new(rec.clone())));
    rec
}

fn red() -> Drawable {
    Drawable::image(Bitmap::solid(100, 40, Rgba::RED))
}

fn bounds(w: f64, h: f64) -> Rect {
    Rect::new(0.0, 0.0, w, h)
}

fn canvas(c: &SimCompositor, id: SurfaceId) -> &SimSurface {
    c.native(id).expect("live surface").1
}

fn ms(millis: u64) -> HostTime {
    HostTime(Duration::from_millis(millis).ticks())
}

/// Everything that must hold between any two compositor calls.
fn assert_protected(c: &SimCompositor, id: SurfaceId) {
    assert_eq!(c.protection(id), Ok(Protection::CaptureExcluded));
    assert_eq!(c.guard_state(id), Ok(GuardState::Clean));
    let host = c.host();
    assert_eq!(host.pending_uploads(), 0, "every upload is committed");
    assert!(host.capture().is_empty(), "capture must stay blank");
    assert_eq!(host.stats().fast_path_commits, 0, "no fast-path commits");
    assert_eq!(
        host.stats().capturable_commits,
        0,
        "no refresh committed capturable content"
    );
}

#[test]
fn protection_holds_across_set_resize_clear() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    assert_protected(&c, id);
    assert!(c.host().display().is_empty(), "new surface shows nothing");

    assert_eq!(c.set_content(id, red()), Ok(ContentOutcome::Rendered));
    assert_protected(&c, id);
    let shown = c.host().displayed_frame(canvas(&c, id)).expect("red shown");
    assert_eq!(shown.size, PixelSize::new(300, 120));
    assert_eq!(shown.pixel(150, 60), Some(Rgba::RED.premultiplied()));
    assert!(
        c.host().captured_frame(canvas(&c, id)).is_none(),
        "capture blanks the surface"
    );

    assert_eq!(
        c.resize(id, bounds(120.0, 40.0)),
        Ok(ContentOutcome::Rendered)
    );
    assert_protected(&c, id);
    let shown = c.host().displayed_frame(canvas(&c, id)).unwrap();
    assert_eq!(shown.size, PixelSize::new(360, 120));

    c.clear_content(id).unwrap();
    assert_protected(&c, id);
    assert!(c.host().display().is_empty(), "cleared surface shows nothing");
}

#[test]
fn identical_drawables_render_once() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    c.set_content(id, red()).unwrap();
    let refreshes = c.host().stats().protected_refreshes;

    assert_eq!(c.set_content(id, red()), Ok(ContentOutcome::Unchanged));
    // Equal pixels in fresh storage digest the same.
    let copy = Drawable::image(Bitmap::new(100, 40, red_pixels(100 * 40)).unwrap());
    assert_eq!(c.set_content(id, copy), Ok(ContentOutcome::Unchanged));

    assert_eq!(c.render_passes(id), Ok(1));
    assert_eq!(c.host().stats().uploads, 1);
    assert_eq!(
        c.host().stats().protected_refreshes,
        refreshes,
        "no-op updates do not refresh"
    );
    assert_protected(&c, id);
}

fn red_pixels(count: usize) -> Vec<u8> {
    Rgba::RED.premultiplied().repeat(count)
}

#[test]
fn resize_rerenders_same_digest_at_new_size() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    c.set_content(id, red()).unwrap();
    let before = c.render_key(id).unwrap().unwrap();

    c.resize(id, bounds(100.0, 80.0)).unwrap();
    let after = c.render_key(id).unwrap().unwrap();
    assert_eq!(after.digest, before.digest);
    assert_eq!(after.size, PixelSize::new(300, 240));
    assert_eq!(c.render_passes(id), Ok(2));

    // Moving without resizing is free.
    assert_eq!(
        c.resize(id, Rect::new(20.0, 20.0, 120.0, 100.0)),
        Ok(ContentOutcome::Unchanged)
    );
    assert_eq!(c.render_passes(id), Ok(2));
    let widget = c.native(id).unwrap().0;
    assert_eq!(
        c.host().layer_frame(widget.layer()),
        Some(Rect::new(20.0, 20.0, 120.0, 100.0))
    );
}

#[test]
fn red_bitmap_scenario() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();

    c.set_content(id, red()).unwrap();
    assert_eq!(c.render_passes(id), Ok(1));
    let digest = c.render_key(id).unwrap().unwrap().digest;

    c.set_content(id, red()).unwrap();
    assert_eq!(c.render_passes(id), Ok(1));

    c.resize(id, bounds(120.0, 40.0)).unwrap();
    assert_eq!(c.render_passes(id), Ok(2));
    assert_eq!(c.render_key(id).unwrap().unwrap().digest, digest);
    assert_protected(&c, id);
}

#[test]
fn unsupported_platform_fails_closed() {
    let mut c = device(SimConfig::legacy());
    let rec = recorded(&mut c);

    let err = c.create_protected_surface(bounds(100.0, 40.0)).unwrap_err();
    assert_eq!(
        err,
        SurfaceError::UnsupportedPlatformVersion {
            found: PlatformVersion::new(12, 4, 0),
            required: PlatformVersion::new(13, 0, 0),
        }
    );
    assert!(err.is_capability_failure(), "caller must suppress the payload");
    assert!(
        SecureImageView::new(&mut c, bounds(10.0, 10.0)).is_err(),
        "views fail the same way"
    );

    assert_eq!(c.surface_count(), 0);
    assert_eq!(c.host().widget_count(), 0);
    assert_eq!(c.host().layer_count(), 0);
    assert!(c.host().display().is_empty(), "nothing attached");
    assert!(matches!(
        c.capability(),
        Capability::Unavailable(Unavailability::VersionTooOld { .. })
    ));
    assert_eq!(rec.count("FailClosed"), 2);
}

#[test]
fn missing_canvas_fails_closed() {
    let mut c = device(SimConfig::ios17().with_secure_canvas(false));
    assert_eq!(
        c.create_protected_surface(bounds(100.0, 40.0)),
        Err(SurfaceError::ProtectedSurfaceMissing)
    );
    assert_eq!(
        c.capability(),
        Capability::Unavailable(Unavailability::SurfaceTypeMissing)
    );
    assert_eq!(c.host().layer_count(), 0);
}

#[test]
fn unprotected_canvas_is_released() {
    let mut c = device(SimConfig::ios17().with_canvas_protection(false));
    let rec = recorded(&mut c);
    assert_eq!(
        c.create_protected_surface(bounds(100.0, 40.0)),
        Err(SurfaceError::ProtectedSurfaceMissing)
    );
    let stats = c.host().stats();
    assert_eq!((stats.acquired, stats.released), (1, 1));
    assert_eq!(c.host().widget_count(), 0);
    assert!(rec.events().iter().any(|e| matches!(
        e,
        RecordedEvent::FailClosed(f) if f.reason == FailClosedReason::NotCaptureExcluded
    )));
}

fn blinking() -> AnimatedImage {
    AnimatedImage::new(
        vec![
            Bitmap::solid(10, 10, Rgba::RED),
            Bitmap::solid(10, 10, Rgba::WHITE),
            Bitmap::solid(10, 10, Rgba::BLACK),
        ],
        Duration::from_millis(100),
    )
    .unwrap()
}

#[test]
fn animation_advances_from_frame_callback() {
    let mut c = phone();
    let mut view = SecureImageView::new(&mut c, bounds(10.0, 10.0)).unwrap();
    view.set_image(&mut c, Some(Image::from(blinking()))).unwrap();
    assert_eq!(c.pending_timers(), 1);
    let id = view.surface();
    let first = c.render_key(id).unwrap().unwrap();

    assert_eq!(c.advance_timers(ms(50)), 0, "not due yet");
    assert_eq!(c.advance_timers(ms(100)), 1);
    let second = c.render_key(id).unwrap().unwrap();
    assert_ne!(first.digest, second.digest, "a different frame is shown");
    let shown = c.host().displayed_frame(canvas(&c, id)).unwrap();
    assert_eq!(shown.pixel(0, 0), Some(Rgba::WHITE.premultiplied()));
    assert_protected(&c, id);
}

#[test]
fn teardown_cancels_timers() {
    let mut c = phone();
    let rec = recorded(&mut c);
    let mut view = SecureImageView::new(&mut c, bounds(10.0, 10.0)).unwrap();
    view.set_image(&mut c, Some(Image::from(blinking()))).unwrap();
    c.advance_timers(ms(100));
    let uploads = c.host().stats().uploads;
    let advances = rec.count("FrameAdvance");
    assert_eq!(advances, 1);

    view.teardown(&mut c).unwrap();
    assert_eq!(c.pending_timers(), 0);
    assert_eq!(c.advance_timers(ms(1_000)), 0);
    assert_eq!(c.host().stats().uploads, uploads, "no frame presented after teardown");
    assert_eq!(rec.count("FrameAdvance"), advances);
    assert_eq!(c.host().widget_count(), 0);
    assert_eq!(c.host().layer_count(), 0);
}

#[test]
fn dropped_view_stops_animating_and_releases_its_widget() {
    let mut c = phone();
    let rec = recorded(&mut c);
    let id = {
        let mut view = SecureImageView::new(&mut c, bounds(10.0, 10.0)).unwrap();
        view.set_image(&mut c, Some(Image::from(blinking()))).unwrap();
        view.surface()
    };
    let uploads = c.host().stats().uploads;
    assert_eq!(c.host().widget_count(), 1, "released lazily");

    assert_eq!(c.advance_timers(ms(1_000)), 0);
    assert!(!c.contains(id));
    assert_eq!(c.pending_timers(), 0);
    assert_eq!(c.host().widget_count(), 0);
    assert_eq!(c.host().layer_count(), 0);
    assert_eq!(c.host().stats().uploads, uploads, "no frame after the drop");
    assert_eq!(rec.count("FrameAdvance"), 0);
    assert!(c.host().display().is_empty());
}

#[test]
fn failed_frames_are_counted() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(10.0, 10.0)).unwrap();
    c.set_content(
        id,
        Drawable::Animation {
            animation: blinking(),
            mode: ContentMode::ScaleToFill,
        },
    )
    .unwrap();
    assert_eq!(c.frame_failures(), 0);

    c.host_mut()
        .set_protection_override(Some(Protection::Unprotected));
    assert_eq!(c.advance_timers(ms(100)), 0);
    assert_eq!(c.frame_failures(), 1);
    assert_eq!(c.pending_timers(), 0, "a failed surface stops animating");
    assert_eq!(c.host().stats().capturable_commits, 0);
    assert!(c.host().capture().is_empty());
}

#[test]
fn replacing_an_animation_with_a_still_stops_the_timer() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(10.0, 10.0)).unwrap();
    c.set_content(
        id,
        Drawable::Animation {
            animation: blinking(),
            mode: ContentMode::ScaleToFill,
        },
    )
    .unwrap();
    assert_eq!(c.pending_timers(), 1);
    c.set_content(id, red()).unwrap();
    assert_eq!(c.pending_timers(), 0);
    assert_eq!(c.advance_timers(ms(500)), 0);
}

#[test]
fn guard_commits_every_change_through_protected_refresh() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    let base = c.host().stats().protected_refreshes;

    c.set_content(id, red()).unwrap();
    c.set_content(id, Drawable::text("1234")).unwrap();
    c.resize(id, bounds(50.0, 40.0)).unwrap();
    c.clear_content(id).unwrap();

    assert_eq!(c.host().stats().protected_refreshes, base + 4);
    assert_eq!(c.protected_refreshes(), 4);
    assert_protected(&c, id);
}

#[test]
fn protection_lost_empties_the_surface() {
    let mut c = phone();
    let rec = recorded(&mut c);
    let id = c.create_protected_surface(bounds(10.0, 10.0)).unwrap();
    c.set_content(
        id,
        Drawable::Animation {
            animation: blinking(),
            mode: ContentMode::ScaleToFill,
        },
    )
    .unwrap();

    c.host_mut()
        .set_protection_override(Some(Protection::Unprotected));
    assert_eq!(
        c.set_content(id, red()),
        Err(SurfaceError::ProtectionLost)
    );
    assert!(c.host().display().is_empty(), "child detached");
    assert_eq!(c.drawable(id).unwrap(), None);
    assert_eq!(c.guard_state(id), Ok(GuardState::Clean));
    assert_eq!(c.pending_timers(), 0);
    assert!(rec.events().iter().any(|e| matches!(
        e,
        RecordedEvent::FailClosed(f) if f.reason == FailClosedReason::ProtectionLost
    )));
}

#[test]
fn lost_surface_refuses_content_without_uploading() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    c.set_content(id, red()).unwrap();
    let uploads = c.host().stats().uploads;

    c.host_mut()
        .set_protection_override(Some(Protection::Unprotected));
    assert_eq!(
        c.set_content(id, Drawable::text("4111 1111 1111 1111")),
        Err(SurfaceError::ProtectionLost)
    );
    assert_eq!(c.set_content(id, red()), Err(SurfaceError::ProtectionLost));
    assert_eq!(
        c.resize(id, bounds(120.0, 40.0)),
        Err(SurfaceError::ProtectionLost)
    );
    assert_eq!(c.protection_lost(id), Ok(true));

    let host = c.host();
    assert_eq!(host.stats().uploads, uploads, "nothing uploaded after loss");
    assert_eq!(
        host.stats().capturable_commits,
        0,
        "no refresh ever exposed content to capture"
    );
    assert_eq!(host.pending_uploads(), 0);
    assert!(host.display().is_empty(), "surface stays empty");
    assert!(host.capture().is_empty(), "capture stays blank");

    // Restoring the classification does not revive the slot.
    c.host_mut().set_protection_override(None);
    assert_eq!(c.set_content(id, red()), Err(SurfaceError::ProtectionLost));
    assert_eq!(c.host().stats().uploads, uploads);
    c.destroy_surface(id).unwrap();
    let fresh = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    assert_eq!(c.set_content(fresh, red()), Ok(ContentOutcome::Rendered));
    assert_protected(&c, fresh);
}

#[test]
fn allocation_failure_retries_at_reduced_size() {
    // 300x120 fails, 150x60 fits.
    let mut c = with_budget(10_000);
    let rec = recorded(&mut c);
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();

    assert_eq!(c.set_content(id, red()), Ok(ContentOutcome::Degraded));
    let shown = c.host().display()[0];
    assert_eq!(shown.frame.size, PixelSize::new(150, 60));
    assert_eq!(shown.frame.kind, FrameKind::Reduced);
    assert_eq!(shown.bounds, bounds(100.0, 40.0), "stretched over the bounds");
    assert_protected(&c, id);
    assert_eq!(rec.count("AllocationRetry"), 1);

    // Degraded output is retried even for identical content.
    assert_eq!(c.set_content(id, red()), Ok(ContentOutcome::Degraded));
    c.rasterizer_mut().set_config(RasterConfig::default());
    assert_eq!(c.set_content(id, red()), Ok(ContentOutcome::Rendered));
    assert_eq!(c.render_passes(id), Ok(3));
    assert_eq!(c.host().display()[0].frame.kind, FrameKind::Full);
}

#[test]
fn allocation_failure_falls_back_to_placeholder() {
    let mut c = with_budget(1);
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    assert_eq!(c.set_content(id, red()), Ok(ContentOutcome::Placeholder));
    let shown = c.host().display()[0];
    assert_eq!(shown.frame.size, PixelSize::new(1, 1));
    assert_eq!(
        shown.frame.pixel(0, 0),
        Some(ShroudConfig::ios().placeholder.premultiplied())
    );
    assert_protected(&c, id);
}

#[test]
fn exhausted_allocation_shows_nothing() {
    let mut c = with_budget(0);
    let rec = recorded(&mut c);
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    assert_eq!(
        c.set_content(id, red()),
        Err(SurfaceError::SurfaceAllocationFailure {
            width: 300,
            height: 120
        })
    );
    assert!(c.host().display().is_empty(), "nothing shown");
    assert_eq!(c.drawable(id).unwrap(), None);
    assert_protected(&c, id);
    assert!(rec.events().iter().any(|e| matches!(
        e,
        RecordedEvent::FailClosed(f) if f.reason == FailClosedReason::AllocationExhausted
    )));
}

#[test]
fn decode_failure_clears_the_surface() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    c.set_content(id, red()).unwrap();

    let failure = ContentDecodeFailure::new("truncated image data");
    assert_eq!(
        c.set_decoded(id, Err(failure.clone())),
        Err(SurfaceError::ContentDecodeFailure(failure))
    );
    assert!(c.host().display().is_empty(), "stale content removed");
    assert_eq!(c.render_key(id), Ok(None));
    assert_protected(&c, id);

    assert_eq!(
        c.set_decoded(id, Ok(red())),
        Ok(ContentOutcome::Rendered)
    );
}

#[test]
fn stale_handles_are_rejected() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    c.destroy_surface(id).unwrap();

    assert!(!c.contains(id), "destroyed");
    assert_eq!(c.set_content(id, red()), Err(SurfaceError::StaleSurface(id)));
    assert_eq!(c.clear_content(id), Err(SurfaceError::StaleSurface(id)));
    assert_eq!(
        c.resize(id, bounds(1.0, 1.0)),
        Err(SurfaceError::StaleSurface(id))
    );
    assert_eq!(c.destroy_surface(id), Err(SurfaceError::StaleSurface(id)));
    assert_eq!(c.render_passes(id), Err(SurfaceError::StaleSurface(id)));

    let reused = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    assert_eq!(reused.index(), id.index());
    assert_ne!(reused, id, "generation distinguishes the new surface");
}

#[test]
fn capability_is_probed_once() {
    let mut c = phone();
    for _ in 0..3 {
        c.create_protected_surface(bounds(10.0, 10.0)).unwrap();
    }
    assert!(c.capability().is_available(), "ios17 supports the canvas");
    assert_eq!(c.host().probes(), 1);

    let mut old = device(SimConfig::legacy());
    for _ in 0..3 {
        old.create_protected_surface(bounds(10.0, 10.0)).unwrap_err();
    }
    assert_eq!(old.host().probes(), 1);
}

#[test]
fn zero_area_bounds_show_nothing_until_they_grow() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    c.set_content(id, red()).unwrap();

    assert_eq!(c.resize(id, bounds(0.0, 40.0)), Ok(ContentOutcome::Empty));
    assert!(c.host().display().is_empty(), "child detached");
    assert_protected(&c, id);

    assert_eq!(
        c.resize(id, bounds(100.0, 40.0)),
        Ok(ContentOutcome::Rendered)
    );
    assert_eq!(c.host().display().len(), 1);
}

#[test]
fn child_is_reused_across_updates() {
    let mut c = phone();
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    c.set_content(id, red()).unwrap();
    let child = c.child(id).unwrap().layer();
    c.set_content(id, Drawable::text("hidden")).unwrap();
    c.resize(id, bounds(200.0, 40.0)).unwrap();
    assert_eq!(c.child(id).unwrap().layer(), child);
    assert_eq!(c.host().stats().attached, 1);
}

#[test]
fn secure_label_renders_text_privately() {
    let mut c = phone();
    let mut label = SecureLabel::new(&mut c, bounds(200.0, 44.0)).unwrap();
    assert_eq!(
        label.set_text(&mut c, "4111 1111 1111 1111"),
        Ok(ContentOutcome::Rendered)
    );
    let id = label.surface();
    let shown = c.host().displayed_frame(canvas(&c, id)).unwrap();
    assert!(
        shown.pixels.chunks_exact(4).any(|p| p[3] == 255),
        "glyphs are drawn"
    );
    assert_protected(&c, id);

    assert_eq!(
        label.update_attributes(&mut c, |a| a.color = Rgba::RED),
        Ok(ContentOutcome::Rendered)
    );
    assert_eq!(label.set_text(&mut c, ""), Ok(ContentOutcome::NoContent));
    assert!(c.host().display().is_empty(), "empty text clears");

    label.teardown(&mut c).unwrap();
    assert_eq!(c.host().widget_count(), 0);
}

#[test]
fn image_view_switches_to_highlighted_image() {
    let mut c = phone();
    let mut view = SecureImageView::new(&mut c, bounds(10.0, 10.0)).unwrap();
    view.set_image(&mut c, Some(Image::from(Bitmap::solid(1, 1, Rgba::RED))))
        .unwrap();
    view.set_highlighted_image(&mut c, Some(Image::from(Bitmap::solid(1, 1, Rgba::WHITE))))
        .unwrap();
    let id = view.surface();
    let px = |c: &SimCompositor| {
        c.host()
            .displayed_frame(canvas(c, id))
            .and_then(|f| f.pixel(0, 0))
    };
    assert_eq!(px(&c), Some(Rgba::RED.premultiplied()));

    view.set_highlighted(&mut c, true).unwrap();
    assert_eq!(px(&c), Some(Rgba::WHITE.premultiplied()));

    view.set_image(&mut c, None).unwrap();
    view.set_highlighted(&mut c, false).unwrap();
    assert_eq!(px(&c), None);
    assert_protected(&c, id);
}

#[test]
fn recorded_session_exports_to_json() {
    let mut c = phone();
    let rec = recorded(&mut c);
    let id = c.create_protected_surface(bounds(100.0, 40.0)).unwrap();
    c.set_content(id, red()).unwrap();
    c.set_content(id, red()).unwrap();
    c.resize(id, bounds(120.0, 40.0)).unwrap();
    c.destroy_surface(id).unwrap();

    assert_eq!(rec.count("CapabilityProbed"), 1);
    assert_eq!(rec.count("SurfaceCreated"), 1);
    assert_eq!(rec.count("RenderPass"), 2);
    assert_eq!(rec.count("ContentSkipped"), 1);
    assert_eq!(rec.count("Refresh"), 2);
    assert_eq!(rec.count("SurfaceDestroyed"), 1);

    let mut out = Vec::new();
    shroud_debug::json::export(&rec.events(), &mut out).unwrap();
    let parsed: Vec<serde_json::Value> = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed.len(), rec.len());
    let pass = parsed
        .iter()
        .find(|v| v["name"] == "RenderPass")
        .expect("a render pass was exported");
    assert_eq!(pass["args"]["width"], 300);
    assert_eq!(pass["tid"], id.index() + 1);
}

#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn pretty_sink_narrates_fail_closed_decisions() {
    let buf = SharedBuf::default();
    let mut c = device(SimConfig::legacy())
        .with_trace_sink(PrettyPrintSink::with_writer(buf.clone()));
    c.create_protected_surface(bounds(10.0, 10.0)).unwrap_err();

    let text = String::from_utf8(buf.0.borrow().clone()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2, "got: {text}");
    assert!(lines[0].starts_with("[capability] UNAVAILABLE"), "got: {text}");
    assert!(lines[1].starts_with("[FAIL-CLOSED]"), "got: {text}");
}
