// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software rasterizer for shroud protected surfaces.
//!
//! This crate implements [`shroud_core::render::Rasterizer`] on the CPU,
//! producing premultiplied RGBA8 frames. It provides:
//!
//! - [`SoftwareRasterizer`]: fits bitmaps per content mode and lays out text
//! - [`RasterConfig`]: the pixel budget above which allocation is refused
//! - [`GlyphSource`]: pluggable glyph coverage, with [`BlockGlyphs`] as a
//!   font-free default
//!
//! Allocation is fallible throughout, so the content adapter's reduced and
//! placeholder fallbacks see real failures rather than aborts.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod canvas;
mod image;
mod rasterizer;
mod text;

pub use rasterizer::{RasterConfig, SoftwareRasterizer};
pub use text::{BlockGlyphs, GlyphSource};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Converts an integral float to `i64`, saturating at the range bounds.
/// NaN maps to zero.
#[expect(
    clippy::cast_possible_truncation,
    reason = "float-to-int casts saturate"
)]
fn to_i64(v: f64) -> i64 {
    v as i64
}

/// Rounds half away from zero.
pub(crate) fn round_i64(v: f64) -> i64 {
    to_i64(v.round())
}

/// Rounds towards negative infinity.
pub(crate) fn floor_i64(v: f64) -> i64 {
    to_i64(v.floor())
}
