// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The CPU [`Rasterizer`] implementation.

use shroud_core::content::{PixelSize, Rgba};
use shroud_core::render::{
    FrameKind, RasterError, Rasterizer, RenderSource, RenderTarget, RenderedFrame,
};

use crate::canvas::Canvas;
use crate::text::{BlockGlyphs, GlyphSource};

/// Limits for [`SoftwareRasterizer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterConfig {
    /// Largest target, in pixels, the rasterizer will allocate. Larger
    /// targets fail with [`RasterError::Allocation`] without touching the
    /// allocator.
    pub max_pixels: u64,
}

impl RasterConfig {
    /// 4096 × 4096.
    pub const DEFAULT_MAX_PIXELS: u64 = 4096 * 4096;
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            max_pixels: Self::DEFAULT_MAX_PIXELS,
        }
    }
}

/// Rasterizes bitmaps and text into premultiplied RGBA8 frames.
#[derive(Clone, Debug, Default)]
pub struct SoftwareRasterizer<G: GlyphSource = BlockGlyphs> {
    config: RasterConfig,
    glyphs: G,
}

impl SoftwareRasterizer {
    /// Creates a rasterizer with block glyphs.
    #[must_use]
    pub fn new(config: RasterConfig) -> Self {
        Self::with_glyphs(config, BlockGlyphs)
    }
}

impl<G: GlyphSource> SoftwareRasterizer<G> {
    /// Creates a rasterizer drawing text with `glyphs`.
    pub fn with_glyphs(config: RasterConfig, glyphs: G) -> Self {
        Self { config, glyphs }
    }

    /// Returns the active limits.
    pub fn config(&self) -> RasterConfig {
        self.config
    }

    /// Replaces the active limits.
    pub fn set_config(&mut self, config: RasterConfig) {
        self.config = config;
    }

    fn alloc(&self, size: PixelSize, kind: FrameKind) -> Result<RenderedFrame, RasterError> {
        if size.area() > self.config.max_pixels {
            return Err(RasterError::Allocation {
                width: size.width,
                height: size.height,
            });
        }
        RenderedFrame::try_alloc(size, kind)
    }
}

impl<G: GlyphSource> Rasterizer for SoftwareRasterizer<G> {
    fn rasterize(
        &mut self,
        source: RenderSource<'_>,
        target: RenderTarget,
    ) -> Result<RenderedFrame, RasterError> {
        let mut frame = self.alloc(target.size, target.kind)?;
        let mut canvas = Canvas::new(&mut frame);
        match source {
            RenderSource::Image { bitmap, mode } => {
                crate::image::draw(&mut canvas, bitmap, mode, target.scale);
            }
            RenderSource::Text(block) => {
                crate::text::draw(&mut canvas, &self.glyphs, block, target.scale);
            }
        }
        Ok(frame)
    }

    fn fill(&mut self, color: Rgba, size: PixelSize) -> Result<RenderedFrame, RasterError> {
        let mut frame = self.alloc(size, FrameKind::Placeholder)?;
        let mut canvas = Canvas::new(&mut frame);
        canvas.fill_rect(0, 0, canvas.width(), canvas.height(), color.premultiplied());
        Ok(frame)
    }
}
