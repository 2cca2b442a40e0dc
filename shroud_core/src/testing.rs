// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-crate test doubles.

use alloc::vec::Vec;
use core::cell::Cell;

use kurbo::Rect;

use crate::capability::{PlatformVersion, SurfaceClass};
use crate::content::{PixelSize, Rgba};
use crate::host::{Acquired, Host, Protection};
use crate::render::{
    FrameKind, RasterError, Rasterizer, RenderSource, RenderTarget, RenderedFrame,
};

pub(crate) const FAKE_CLASS: SurfaceClass = SurfaceClass::new("FakeSecureCanvas");

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct FakeWidget(pub(crate) u32);

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct FakeSurface(pub(crate) u32);

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct FakeChild(pub(crate) u32);

/// A host that records what it was asked to do.
#[derive(Debug)]
pub(crate) struct FakeHost {
    pub(crate) version: PlatformVersion,
    pub(crate) class: Option<SurfaceClass>,
    pub(crate) scale: f64,
    /// Makes `acquire` return `None`.
    pub(crate) fail_acquire: bool,
    /// Classification reported instead of `CaptureExcluded`.
    pub(crate) protection_override: Option<Protection>,
    pub(crate) probes: Cell<u32>,
    pub(crate) acquired: u32,
    pub(crate) released: u32,
    pub(crate) attached: u32,
    pub(crate) protected_refreshes: u32,
    /// `(child, frame size, frame kind, bounds)` per content update.
    pub(crate) contents: Vec<(u32, PixelSize, FrameKind, Rect)>,
    pub(crate) bounds: Vec<(u32, Rect)>,
    next: u32,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::with_version(PlatformVersion::new(17, 0, 0))
    }
}

impl FakeHost {
    pub(crate) fn with_version(version: PlatformVersion) -> Self {
        Self {
            version,
            class: Some(FAKE_CLASS),
            scale: 1.0,
            fail_acquire: false,
            protection_override: None,
            probes: Cell::new(0),
            acquired: 0,
            released: 0,
            attached: 0,
            protected_refreshes: 0,
            contents: Vec::new(),
            bounds: Vec::new(),
            next: 0,
        }
    }
}

impl Host for FakeHost {
    type Widget = FakeWidget;
    type Surface = FakeSurface;
    type Child = FakeChild;

    fn platform_version(&self) -> PlatformVersion {
        self.probes.set(self.probes.get() + 1);
        self.version
    }

    fn surface_class(&self) -> Option<SurfaceClass> {
        self.class
    }

    fn scale_factor(&self) -> f64 {
        self.scale
    }

    fn acquire(
        &mut self,
        class: SurfaceClass,
        _bounds: Rect,
    ) -> Option<Acquired<FakeWidget, FakeSurface>> {
        if self.fail_acquire || Some(class) != self.class {
            return None;
        }
        self.acquired += 1;
        let n = self.next;
        self.next += 1;
        Some(Acquired {
            widget: FakeWidget(n),
            surface: FakeSurface(n),
        })
    }

    fn protection(&self, _surface: &FakeSurface) -> Protection {
        self.protection_override
            .unwrap_or(Protection::CaptureExcluded)
    }

    fn set_bounds(&mut self, widget: &FakeWidget, _surface: &FakeSurface, bounds: Rect) {
        self.bounds.push((widget.0, bounds));
    }

    fn attach_child(&mut self, _surface: &FakeSurface, _bounds: Rect) -> FakeChild {
        self.attached += 1;
        let n = self.next;
        self.next += 1;
        FakeChild(n)
    }

    fn set_child_contents(&mut self, child: &FakeChild, frame: &RenderedFrame, bounds: Rect) {
        self.contents.push((child.0, frame.size, frame.kind, bounds));
    }

    fn detach_child(&mut self, _child: FakeChild) {
        self.attached -= 1;
    }

    fn refresh_protected(&mut self, _widget: &FakeWidget, _surface: &FakeSurface) {
        self.protected_refreshes += 1;
    }

    fn release(&mut self, _widget: FakeWidget, _surface: FakeSurface) {
        self.released += 1;
    }
}

/// A rasterizer that allocates flat frames and counts calls.
#[derive(Debug, Default)]
pub(crate) struct CountingRasterizer {
    pub(crate) rasterized: u32,
    pub(crate) fills: u32,
    /// Targets with more pixels than this fail to allocate.
    pub(crate) max_pixels: Option<u64>,
    /// Makes the placeholder fill fail too.
    pub(crate) fail_fill: bool,
}

impl CountingRasterizer {
    fn check(&self, size: PixelSize) -> Result<(), RasterError> {
        match self.max_pixels {
            Some(max) if size.area() > max => Err(RasterError::Allocation {
                width: size.width,
                height: size.height,
            }),
            _ => Ok(()),
        }
    }
}

impl Rasterizer for CountingRasterizer {
    fn rasterize(
        &mut self,
        _source: RenderSource<'_>,
        target: RenderTarget,
    ) -> Result<RenderedFrame, RasterError> {
        self.check(target.size)?;
        self.rasterized += 1;
        RenderedFrame::try_alloc(target.size, target.kind)
    }

    fn fill(&mut self, color: Rgba, size: PixelSize) -> Result<RenderedFrame, RasterError> {
        if self.fail_fill {
            return Err(RasterError::Allocation {
                width: size.width,
                height: size.height,
            });
        }
        self.fills += 1;
        let mut frame = RenderedFrame::try_alloc(size, FrameKind::Placeholder)?;
        for chunk in frame.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color.premultiplied());
        }
        Ok(frame)
    }
}
