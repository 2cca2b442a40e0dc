// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bitmap fitting and nearest-neighbour sampling.

use shroud_core::content::{Bitmap, ContentMode};

use crate::canvas::Canvas;
use crate::round_i64;

/// Destination rectangle of a fitted image, in target pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Placement {
    pub(crate) x: i64,
    pub(crate) y: i64,
    pub(crate) width: i64,
    pub(crate) height: i64,
}

/// Computes where a `src_w × src_h` image lands in a `dst_w × dst_h` target.
///
/// `scale` is the target's pixels per point; it only affects
/// [`ContentMode::Center`], which draws the image at its natural size.
pub(crate) fn place(
    src_w: i64,
    src_h: i64,
    dst_w: i64,
    dst_h: i64,
    mode: ContentMode,
    scale: f64,
) -> Placement {
    let (width, height) = match mode {
        ContentMode::ScaleToFill => (dst_w, dst_h),
        ContentMode::AspectFit | ContentMode::AspectFill => {
            // Compare dst_w / src_w against dst_h / src_h without dividing.
            let width_bound = dst_w * src_h <= dst_h * src_w;
            if width_bound == (mode == ContentMode::AspectFit) {
                (dst_w, src_h * dst_w / src_w)
            } else {
                (src_w * dst_h / src_h, dst_h)
            }
        }
        ContentMode::Center => (
            round_i64(src_w as f64 * scale).max(1),
            round_i64(src_h as f64 * scale).max(1),
        ),
    };
    Placement {
        x: (dst_w - width) / 2,
        y: (dst_h - height) / 2,
        width,
        height,
    }
}

/// Draws `bitmap` onto `canvas` using `mode`.
pub(crate) fn draw(canvas: &mut Canvas<'_>, bitmap: &Bitmap, mode: ContentMode, scale: f64) {
    let src_w = i64::from(bitmap.width());
    let src_h = i64::from(bitmap.height());
    if src_w == 0 || src_h == 0 {
        return;
    }
    let p = place(src_w, src_h, canvas.width(), canvas.height(), mode, scale);
    if p.width <= 0 || p.height <= 0 {
        return;
    }
    for y in p.y.max(0)..(p.y + p.height).min(canvas.height()) {
        let sy = (y - p.y) * src_h / p.height;
        for x in p.x.max(0)..(p.x + p.width).min(canvas.width()) {
            let sx = (x - p.x) * src_w / p.width;
            let (Ok(sx), Ok(sy)) = (u32::try_from(sx), u32::try_from(sy)) else {
                continue;
            };
            if let Some(px) = bitmap.pixel(sx, sy) {
                canvas.put(x, y, px);
            }
        }
    }
}
