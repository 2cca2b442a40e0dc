// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offscreen rasterization interface.
//!
//! The [`Rasterizer`] trait turns a drawable into a [`RenderedFrame`] at a
//! given pixel size. `shroud_render` provides a software implementation;
//! tests use counting doubles.

use alloc::vec::Vec;
use core::fmt;

use crate::content::{Bitmap, ContentMode, PixelSize, Rgba, TextBlock};

/// Why a frame has the resolution it has.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Rendered at the surface's full pixel size.
    Full,
    /// Rendered at a reduced size after a full-size allocation failed.
    Reduced,
    /// A flat placeholder fill; the real content is not shown.
    Placeholder,
}

/// A rasterized frame: premultiplied RGBA8 pixels, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    /// Size in pixels.
    pub size: PixelSize,
    /// Pixel bytes (`size.byte_len()` long).
    pub pixels: Vec<u8>,
    /// Resolution class.
    pub kind: FrameKind,
}

impl fmt::Debug for RenderedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedFrame")
            .field("size", &self.size)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl RenderedFrame {
    /// Allocates a transparent frame, reporting allocation failure instead
    /// of aborting.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::Allocation`] if the buffer cannot be reserved.
    pub fn try_alloc(size: PixelSize, kind: FrameKind) -> Result<Self, RasterError> {
        let err = RasterError::Allocation {
            width: size.width,
            height: size.height,
        };
        let len = usize::try_from(size.byte_len()).map_err(|_| err)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| err)?;
        pixels.resize(len, 0);
        Ok(Self { size, pixels, kind })
    }

    /// Returns the pixel at `(x, y)`, or `None` if out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = (y as usize * self.size.width as usize + x as usize) * 4;
        let p = self.pixels.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Rasterization failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterError {
    /// The render target could not be allocated.
    Allocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { width, height } => {
                write!(f, "cannot allocate {width}x{height} render target")
            }
        }
    }
}

impl core::error::Error for RasterError {}

/// Where to rasterize: target size, device scale and resolution class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderTarget {
    /// Target size in pixels.
    pub size: PixelSize,
    /// Device pixels per point for this target. Reduced targets carry a
    /// correspondingly reduced scale.
    pub scale: f64,
    /// Resolution class recorded on the produced frame.
    pub kind: FrameKind,
}

/// What to rasterize.
///
/// Animations are resolved to their current frame before reaching the
/// rasterizer.
#[derive(Clone, Copy, Debug)]
pub enum RenderSource<'a> {
    /// A bitmap fitted with a content mode.
    Image {
        /// Source pixels.
        bitmap: &'a Bitmap,
        /// Fitting mode.
        mode: ContentMode,
    },
    /// A text block.
    Text(&'a TextBlock),
}

/// Renders drawables into offscreen frames.
pub trait Rasterizer {
    /// Rasterizes `source` into a new frame described by `target`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::Allocation`] if the target cannot be
    /// allocated.
    fn rasterize(
        &mut self,
        source: RenderSource<'_>,
        target: RenderTarget,
    ) -> Result<RenderedFrame, RasterError>;

    /// Produces a flat fill of `color` at `size`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::Allocation`] if no target of `size` can be
    /// allocated.
    fn fill(&mut self, color: Rgba, size: PixelSize) -> Result<RenderedFrame, RasterError> {
        let mut frame = RenderedFrame::try_alloc(size, FrameKind::Placeholder)?;
        let px = color.premultiplied();
        for chunk in frame.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
        Ok(frame)
    }
}
