// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Host`] trait that platform backends implement.
//!
//! A host owns the native widget toolkit. It knows how to instantiate the
//! hidden sensitive-input widget whose backing surface the compositor
//! excludes from captures, how to hang a content child off that surface,
//! and how to force the widget's protected redraw path.
//!
//! All methods are called on the UI thread.

use kurbo::Rect;

use crate::capability::{PlatformVersion, SurfaceClass};
use crate::render::RenderedFrame;

/// Capture classification of a native surface, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protection {
    /// The compositor leaves this surface out of captured frame buffers.
    CaptureExcluded,
    /// The surface appears in screenshots, recordings and mirroring.
    Unprotected,
}

/// The objects handed back by [`Host::acquire`].
#[derive(Debug)]
pub struct Acquired<W, S> {
    /// The hidden sensitive-input widget that owns the surface.
    pub widget: W,
    /// The protected surface itself (the identity-bearing object, not a
    /// copy).
    pub surface: S,
}

/// A platform compositor that can hand out protected surfaces.
pub trait Host {
    /// The hidden sensitive-input widget.
    type Widget;
    /// The protected surface owned by the widget.
    type Surface;
    /// A content child attached to a protected surface.
    type Child;

    /// Returns the running platform version.
    fn platform_version(&self) -> PlatformVersion;

    /// Returns the protected surface type, or `None` if the widget no
    /// longer exposes one.
    fn surface_class(&self) -> Option<SurfaceClass>;

    /// Device pixels per point.
    fn scale_factor(&self) -> f64;

    /// Instantiates a hidden, non-interactive sensitive-input widget with
    /// invisible chrome at `bounds`, and returns it with its protected
    /// surface.
    ///
    /// Returns `None` if the widget did not expose a surface of `class`.
    fn acquire(
        &mut self,
        class: SurfaceClass,
        bounds: Rect,
    ) -> Option<Acquired<Self::Widget, Self::Surface>>;

    /// Reads the capture classification of `surface`.
    fn protection(&self, surface: &Self::Surface) -> Protection;

    /// Moves and resizes the widget and its surface.
    fn set_bounds(&mut self, widget: &Self::Widget, surface: &Self::Surface, bounds: Rect);

    /// Attaches a new, empty content child to `surface`, filling `bounds`.
    fn attach_child(&mut self, surface: &Self::Surface, bounds: Rect) -> Self::Child;

    /// Replaces the child's contents with `frame`, stretched over `bounds`.
    fn set_child_contents(&mut self, child: &Self::Child, frame: &RenderedFrame, bounds: Rect);

    /// Detaches and drops a content child.
    fn detach_child(&mut self, child: Self::Child);

    /// Forces the widget's protected redraw path so pending child contents
    /// are committed inside the capture-excluded surface.
    ///
    /// Must not go through a generic mark-dirty fast path.
    fn refresh_protected(&mut self, widget: &Self::Widget, surface: &Self::Surface);

    /// Releases the widget and its surface.
    fn release(&mut self, widget: Self::Widget, surface: Self::Surface);
}
