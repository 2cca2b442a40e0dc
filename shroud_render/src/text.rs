// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text layout and glyph drawing.
//!
//! Layout is deliberately simple: explicit `'\n'` breaks only, a line limit,
//! tail truncation with an ellipsis or hard clipping, horizontal alignment,
//! and vertical centring within the target (matching how a single-line label
//! sits in its bounds).

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Vec2;
use shroud_core::content::{LineBreak, Rgba, TextAlignment, TextBlock};

use crate::canvas::Canvas;
use crate::floor_i64;

/// Line box height as a multiple of the pixel font size.
const LINE_HEIGHT: f64 = 1.2;

const ELLIPSIS: char = '\u{2026}';

/// Supplies glyph metrics and coverage.
///
/// Coordinates are in target pixels. `px` is the font size in pixels
/// (point size times the target's scale).
pub trait GlyphSource {
    /// Horizontal advance of `ch`.
    fn advance(&self, ch: char, px: f64) -> f64;

    /// Coverage of `ch` at `(x, y)`, relative to the top-left corner of the
    /// glyph's cell in its line box. `0` is empty and `255` fully inked.
    fn coverage(&self, ch: char, px: f64, x: f64, y: f64) -> u8;
}

/// Font-free glyphs: every visible character is a solid block.
///
/// Useful wherever legibility does not matter but coverage does, such as
/// tests and placeholders for sensitive text.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockGlyphs;

impl GlyphSource for BlockGlyphs {
    fn advance(&self, ch: char, px: f64) -> f64 {
        if ch == ELLIPSIS { px } else { px * 0.6 }
    }

    fn coverage(&self, ch: char, px: f64, x: f64, y: f64) -> u8 {
        if ch.is_whitespace() {
            return 0;
        }
        let adv = self.advance(ch, px);
        if ch == ELLIPSIS {
            // Three dots sitting on the baseline.
            let t = x * 3.0 / adv;
            let local = t - t.floor();
            let dot = (0.25..0.75).contains(&local);
            return if dot && (0.8 * px..px).contains(&y) {
                255
            } else {
                0
            };
        }
        if (0.1 * adv..0.9 * adv).contains(&x) && (0.2 * px..px).contains(&y) {
            255
        } else {
            0
        }
    }
}

/// A laid-out line.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Line {
    pub(crate) text: String,
    pub(crate) width: f64,
}

/// Splits and truncates `block` into the lines that will be drawn.
pub(crate) fn layout<G: GlyphSource>(
    glyphs: &G,
    block: &TextBlock,
    px: f64,
    max_width: f64,
) -> Vec<Line> {
    let attrs = &block.attributes;
    let mut raw: Vec<&str> = block.text.split('\n').collect();
    let limit = usize::try_from(attrs.number_of_lines).unwrap_or(usize::MAX);
    let cut = limit != 0 && raw.len() > limit;
    if cut {
        raw.truncate(limit);
    }
    let last = raw.len().saturating_sub(1);
    raw.iter()
        .enumerate()
        .map(|(i, s)| fit_line(glyphs, s, px, max_width, attrs.line_break, cut && i == last))
        .collect()
}

fn fit_line<G: GlyphSource>(
    glyphs: &G,
    s: &str,
    px: f64,
    max_width: f64,
    line_break: LineBreak,
    force_ellipsis: bool,
) -> Line {
    let width: f64 = s.chars().map(|c| glyphs.advance(c, px)).sum();
    let fits = width <= max_width && !force_ellipsis;
    if fits || line_break == LineBreak::Clip {
        return Line {
            text: s.into(),
            width,
        };
    }
    let ellipsis = glyphs.advance(ELLIPSIS, px);
    let mut text = String::new();
    let mut acc = 0.0;
    for c in s.chars() {
        let adv = glyphs.advance(c, px);
        if acc + adv + ellipsis > max_width {
            break;
        }
        acc += adv;
        text.push(c);
    }
    text.push(ELLIPSIS);
    Line {
        text,
        width: acc + ellipsis,
    }
}

/// Draws `block` onto `canvas` at `scale` pixels per point.
pub(crate) fn draw<G: GlyphSource>(
    canvas: &mut Canvas<'_>,
    glyphs: &G,
    block: &TextBlock,
    scale: f64,
) {
    let attrs = &block.attributes;
    let px = f64::from(attrs.font_size) * scale;
    if !px.is_finite() || px <= 0.0 || block.text.is_empty() {
        return;
    }
    let width = canvas.width() as f64;
    let lines = layout(glyphs, block, px, width);
    let line_height = px * LINE_HEIGHT;
    let top = (canvas.height() as f64 - lines.len() as f64 * line_height) / 2.0;

    if let Some(shadow) = attrs.shadow {
        let offset = shadow.offset * scale;
        draw_lines(canvas, glyphs, &lines, attrs.alignment, px, top, offset, shadow.color);
    }
    draw_lines(
        canvas,
        glyphs,
        &lines,
        attrs.alignment,
        px,
        top,
        Vec2::ZERO,
        attrs.effective_color(),
    );
}

fn draw_lines<G: GlyphSource>(
    canvas: &mut Canvas<'_>,
    glyphs: &G,
    lines: &[Line],
    alignment: TextAlignment,
    px: f64,
    top: f64,
    offset: Vec2,
    color: Rgba,
) {
    let ink = color.premultiplied();
    let width = canvas.width() as f64;
    let line_height = px * LINE_HEIGHT;
    for (i, line) in lines.iter().enumerate() {
        let y = top + i as f64 * line_height + offset.y;
        let mut pen = offset.x
            + match alignment {
                TextAlignment::Left => 0.0,
                TextAlignment::Center => (width - line.width) / 2.0,
                TextAlignment::Right => width - line.width,
            };
        for ch in line.text.chars() {
            let adv = glyphs.advance(ch, px);
            draw_glyph(canvas, glyphs, ch, px, pen, y, adv, ink);
            pen += adv;
        }
    }
}

fn draw_glyph<G: GlyphSource>(
    canvas: &mut Canvas<'_>,
    glyphs: &G,
    ch: char,
    px: f64,
    left: f64,
    top: f64,
    advance: f64,
    ink: [u8; 4],
) {
    let x0 = floor_i64(left).max(0);
    let x1 = (floor_i64(left + advance) + 1).min(canvas.width());
    let y0 = floor_i64(top).max(0);
    let y1 = (floor_i64(top + px * LINE_HEIGHT) + 1).min(canvas.height());
    for y in y0..y1 {
        let gy = y as f64 + 0.5 - top;
        for x in x0..x1 {
            let coverage = glyphs.coverage(ch, px, x as f64 + 0.5 - left, gy);
            if coverage > 0 {
                canvas.blend(x, y, ink, coverage);
            }
        }
    }
}
