// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Premultiplied RGBA8 drawing target.

use shroud_core::content::BYTES_PER_PIXEL;
use shroud_core::render::RenderedFrame;

/// A mutable view of a frame's pixels with clipped drawing helpers.
///
/// Coordinates are signed so callers can place content partially outside
/// the target; everything outside is clipped.
#[derive(Debug)]
pub(crate) struct Canvas<'a> {
    width: i64,
    height: i64,
    pixels: &'a mut [u8],
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut RenderedFrame) -> Self {
        Self {
            width: i64::from(frame.size.width),
            height: i64::from(frame.size.height),
            pixels: &mut frame.pixels,
        }
    }

    pub(crate) fn width(&self) -> i64 {
        self.width
    }

    pub(crate) fn height(&self) -> i64 {
        self.height
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        usize::try_from((y * self.width + x) * BYTES_PER_PIXEL as i64).ok()
    }

    /// Overwrites one pixel.
    pub(crate) fn put(&mut self, x: i64, y: i64, px: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&px);
        }
    }

    /// Source-over blends a premultiplied colour scaled by `coverage`.
    pub(crate) fn blend(&mut self, x: i64, y: i64, px: [u8; 4], coverage: u8) {
        let Some(i) = self.offset(x, y) else {
            return;
        };
        let src = px.map(|c| mul(c, coverage));
        let inv = 255 - src[3];
        let dst = &mut self.pixels[i..i + BYTES_PER_PIXEL];
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s.saturating_add(mul(*d, inv));
        }
    }

    /// Blends a solid rectangle `[x0, x1) × [y0, y1)`.
    pub(crate) fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, px: [u8; 4]) {
        for y in y0.max(0)..y1.min(self.height) {
            for x in x0.max(0)..x1.min(self.width) {
                self.blend(x, y, px, 255);
            }
        }
    }
}

/// `a * b / 255`, rounded.
#[expect(
    clippy::cast_possible_truncation,
    reason = "product of two bytes divided by 255 fits in a byte"
)]
fn mul(a: u8, b: u8) -> u8 {
    let t = u16::from(a) * u16::from(b) + 128;
    ((t + (t >> 8)) >> 8) as u8
}
