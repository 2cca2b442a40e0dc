// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable content attached to protected surfaces.
//!
//! A [`Drawable`] is the unit a surface displays: a still image, an animated
//! image sequence, or a text block. Decoding and shaping happen upstream;
//! this module only carries the decoded pixels and the typographic
//! attributes the rasterizer needs.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Rect, Vec2};

use crate::error::BitmapError;
use crate::time::Duration;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// An 8-bit-per-channel RGBA colour (straight alpha).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba {
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Neutral grey used for "content unavailable" placeholders.
    pub const PLACEHOLDER_GRAY: Self = Self::new(142, 142, 147, 255);

    /// Creates a colour from its components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns this colour with alpha multiplied by `factor / 255`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "product of two bytes divided by 255 fits in a byte"
    )]
    pub const fn with_alpha_scaled(self, factor: u8) -> Self {
        let a = (self.a as u16 * factor as u16 / 255) as u8;
        Self { a, ..self }
    }

    /// Returns the premultiplied `[r, g, b, a]` bytes.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "product of two bytes divided by 255 fits in a byte"
    )]
    pub const fn premultiplied(self) -> [u8; 4] {
        let a = self.a as u16;
        [
            (self.r as u16 * a / 255) as u8,
            (self.g as u16 * a / 255) as u8,
            (self.b as u16 * a / 255) as u8,
            self.a,
        ]
    }
}

/// A size in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Creates a pixel size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Converts point-space bounds to device pixels, rounding up.
    ///
    /// NaN or negative extents map to zero and oversized ones saturate.
    #[must_use]
    pub fn from_bounds(bounds: Rect, scale_factor: f64) -> Self {
        Self {
            width: ceil_to_u32(bounds.width() * scale_factor),
            height: ceil_to_u32(bounds.height() * scale_factor),
        }
    }

    /// Returns `true` if either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the pixel count.
    #[must_use]
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns the byte length of an RGBA8 buffer of this size.
    #[must_use]
    pub const fn byte_len(self) -> u64 {
        self.area().saturating_mul(BYTES_PER_PIXEL as u64)
    }

    /// Scales both dimensions by `factor`, rounding up and keeping a
    /// non-empty size non-empty.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        if self.is_empty() {
            return self;
        }
        Self {
            width: ceil_to_u32(f64::from(self.width) * factor).max(1),
            height: ceil_to_u32(f64::from(self.height) * factor).max(1),
        }
    }
}

/// Rounds up and converts, saturating at `u32::MAX`. NaN and negative
/// values map to zero.
#[expect(
    clippy::cast_possible_truncation,
    reason = "float-to-int casts saturate"
)]
fn ceil_to_u32(v: f64) -> u32 {
    v.ceil() as u32
}

/// A decoded RGBA8 image with premultiplied alpha.
///
/// Pixel storage is shared, so cloning a bitmap is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl core::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Bitmap {
    /// Wraps decoded pixels.
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError`] if `pixels` is not exactly
    /// `width * height * 4` bytes long.
    pub fn new(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>) -> Result<Self, BitmapError> {
        let pixels = pixels.into();
        let expected = PixelSize::new(width, height).byte_len();
        if pixels.len() as u64 != expected {
            return Err(BitmapError::LengthMismatch {
                expected,
                actual: pixels.len() as u64,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a bitmap filled with a single colour.
    #[must_use]
    pub fn solid(width: u32, height: u32, color: Rgba) -> Self {
        let px = color.premultiplied();
        let count = PixelSize::new(width, height).area() as usize;
        let mut pixels = Vec::with_capacity(count * BYTES_PER_PIXEL);
        for _ in 0..count {
            pixels.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Size in pixels.
    #[must_use]
    pub const fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Raw premultiplied RGBA8 bytes, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the premultiplied pixel at `(x, y)`, or `None` if out of
    /// bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let p = &self.pixels[i..i + BYTES_PER_PIXEL];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Returns `true` if both bitmaps share the same pixel storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

/// How an image is fitted into its surface bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentMode {
    /// Stretch to fill the bounds, ignoring aspect ratio.
    #[default]
    ScaleToFill,
    /// Scale uniformly so the whole image fits; letterbox the rest.
    AspectFit,
    /// Scale uniformly so the image covers the bounds; crop the rest.
    AspectFill,
    /// Draw at native size, centred.
    Center,
}

/// A cyclic sequence of frames shown for a fixed duration each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimatedImage {
    frames: Vec<Bitmap>,
    frame_duration: Duration,
}

impl AnimatedImage {
    /// Creates an animation.
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError::EmptyAnimation`] if `frames` is empty or
    /// `frame_duration` is zero.
    pub fn new(frames: Vec<Bitmap>, frame_duration: Duration) -> Result<Self, BitmapError> {
        if frames.is_empty() || frame_duration.is_zero() {
            return Err(BitmapError::EmptyAnimation);
        }
        Ok(Self {
            frames,
            frame_duration,
        })
    }

    /// All frames in playback order.
    #[must_use]
    pub fn frames(&self) -> &[Bitmap] {
        &self.frames
    }

    /// Time each frame stays on screen.
    #[must_use]
    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; animations have at least one frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the frame at `index`, wrapping cyclically.
    #[must_use]
    pub fn frame(&self, index: usize) -> &Bitmap {
        &self.frames[index % self.frames.len()]
    }
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlignment {
    /// Left edge.
    #[default]
    Left,
    /// Centred.
    Center,
    /// Right edge.
    Right,
}

/// What happens to text that does not fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineBreak {
    /// Cut the line and end it with an ellipsis.
    #[default]
    TruncateTail,
    /// Cut the line at the bounds.
    Clip,
}

/// A drop shadow drawn beneath text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextShadow {
    /// Shadow colour.
    pub color: Rgba,
    /// Offset in points.
    pub offset: Vec2,
}

/// Typographic attributes of a [`TextBlock`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextAttributes {
    /// Font size in points.
    pub font_size: f32,
    /// Text colour.
    pub color: Rgba,
    /// Horizontal alignment.
    pub alignment: TextAlignment,
    /// Maximum number of lines; `0` means unlimited.
    pub number_of_lines: u32,
    /// Overflow behaviour.
    pub line_break: LineBreak,
    /// Optional shadow.
    pub shadow: Option<TextShadow>,
    /// Colour used while highlighted.
    pub highlighted_color: Option<Rgba>,
    /// Whether the highlighted colour applies.
    pub highlighted: bool,
    /// Disabled text is drawn dimmed.
    pub enabled: bool,
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self {
            font_size: 17.0,
            color: Rgba::BLACK,
            alignment: TextAlignment::Left,
            number_of_lines: 1,
            line_break: LineBreak::TruncateTail,
            shadow: None,
            highlighted_color: None,
            highlighted: false,
            enabled: true,
        }
    }
}

impl TextAttributes {
    /// Returns the colour the glyphs are actually drawn with.
    #[must_use]
    pub fn effective_color(&self) -> Rgba {
        let base = match (self.highlighted, self.highlighted_color) {
            (true, Some(color)) => color,
            _ => self.color,
        };
        if self.enabled {
            base
        } else {
            base.with_alpha_scaled(110)
        }
    }
}

/// A string plus the attributes it is drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// The text.
    pub text: String,
    /// Typographic attributes.
    pub attributes: TextAttributes,
}

impl TextBlock {
    /// Creates a text block with default attributes.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: TextAttributes::default(),
        }
    }

    /// Replaces the attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: TextAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Content displayed by a protected surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Drawable {
    /// A still image.
    Image {
        /// Decoded pixels.
        bitmap: Bitmap,
        /// Fitting mode.
        mode: ContentMode,
    },
    /// A cyclic animated image.
    Animation {
        /// Frames and timing.
        animation: AnimatedImage,
        /// Fitting mode.
        mode: ContentMode,
    },
    /// A text block.
    Text(TextBlock),
}

impl Drawable {
    /// Creates a still image drawable with [`ContentMode::ScaleToFill`].
    #[must_use]
    pub fn image(bitmap: Bitmap) -> Self {
        Self::Image {
            bitmap,
            mode: ContentMode::ScaleToFill,
        }
    }

    /// Creates a text drawable with default attributes.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextBlock::new(text))
    }

    /// Returns the animation, if this drawable is animated.
    #[must_use]
    pub fn animation(&self) -> Option<&AnimatedImage> {
        match self {
            Self::Animation { animation, .. } => Some(animation),
            _ => None,
        }
    }
}
