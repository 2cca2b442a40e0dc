// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendered frames as `CGImage`s.

use alloc::vec::Vec;
use core::ffi::c_void;

use objc2_core_foundation::CFRetained;
use objc2_core_graphics::{
    CGBitmapContextCreate, CGBitmapContextCreateImage, CGColorSpace, CGImage, CGImageAlphaInfo,
};
use shroud_core::render::RenderedFrame;

/// Row stride of a tightly packed RGBA frame `width` pixels wide.
pub(crate) fn bytes_per_row(width: u32) -> Option<usize> {
    usize::try_from(width).ok()?.checked_mul(4)
}

/// Copies `frame` into an immutable `CGImage`.
///
/// Pixels are premultiplied RGBA in memory order, which Core Graphics
/// calls `PremultipliedLast` with the default byte order. Returns `None` if
/// Core Graphics refuses the buffer.
pub(crate) fn frame_image(frame: &RenderedFrame) -> Option<CFRetained<CGImage>> {
    let width = usize::try_from(frame.size.width).ok()?;
    let height = usize::try_from(frame.size.height).ok()?;
    let stride = bytes_per_row(frame.size.width)?;
    if width == 0 || height == 0 || frame.pixels.len() != stride.checked_mul(height)? {
        return None;
    }

    let mut pixels: Vec<u8> = frame.pixels.clone();
    let space = CGColorSpace::new_device_rgb()?;
    // SAFETY: `pixels` holds `stride * height` bytes and outlives `context`,
    // which is dropped at the end of this function. The image is created by
    // copy, so it does not borrow `pixels`.
    let context = unsafe {
        CGBitmapContextCreate(
            pixels.as_mut_ptr().cast::<c_void>(),
            width,
            height,
            8,
            stride,
            Some(&space),
            CGImageAlphaInfo::PremultipliedLast.0,
        )
    }?;
    CGBitmapContextCreateImage(Some(&context))
}
