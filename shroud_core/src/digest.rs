// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content digests and render keys.
//!
//! A [`RenderKey`] pairs the digest of a drawable with the pixel size it was
//! rendered at. The adapter skips rendering when the key is unchanged, so
//! resizing alone (same digest, new size) still re-renders.
//!
//! Digests are only comparable within one compositor: the hasher is seeded
//! per instance.

use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};

use hashbrown::DefaultHashBuilder;

use crate::content::{Bitmap, ContentMode, Drawable, PixelSize, TextAttributes, TextBlock};

/// Hash of a drawable's visual content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest(pub u64);

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({:016x})", self.0)
    }
}

/// Identifies a rendered frame: what was drawn and at what size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderKey {
    /// Digest of the drawable (including the animation frame index).
    pub digest: ContentDigest,
    /// Pixel size of the render target.
    pub size: PixelSize,
}

const TAG_IMAGE: u8 = 1;
const TAG_ANIMATION: u8 = 2;
const TAG_TEXT: u8 = 3;
const TAG_FRAME: u8 = 4;

/// Computes content digests with a fixed per-instance seed.
#[derive(Default)]
pub(crate) struct Digester {
    state: DefaultHashBuilder,
}

impl fmt::Debug for Digester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Digester").finish_non_exhaustive()
    }
}

impl Digester {
    /// Digest of a whole drawable. For animations this covers every frame
    /// but not the playback position.
    pub(crate) fn digest(&self, drawable: &Drawable) -> ContentDigest {
        let mut h = self.state.build_hasher();
        match drawable {
            Drawable::Image { bitmap, mode } => {
                h.write_u8(TAG_IMAGE);
                hash_bitmap(&mut h, bitmap);
                hash_mode(&mut h, *mode);
            }
            Drawable::Animation { animation, mode } => {
                h.write_u8(TAG_ANIMATION);
                h.write_usize(animation.len());
                for frame in animation.frames() {
                    hash_bitmap(&mut h, frame);
                }
                h.write_u64(animation.frame_duration().ticks());
                hash_mode(&mut h, *mode);
            }
            Drawable::Text(block) => {
                h.write_u8(TAG_TEXT);
                hash_text(&mut h, block);
            }
        }
        ContentDigest(h.finish())
    }

    /// Digest of one animation frame of a drawable with digest `base`.
    pub(crate) fn frame_digest(&self, base: ContentDigest, frame: usize) -> ContentDigest {
        let mut h = self.state.build_hasher();
        h.write_u8(TAG_FRAME);
        h.write_u64(base.0);
        h.write_usize(frame);
        ContentDigest(h.finish())
    }
}

fn hash_bitmap(h: &mut impl Hasher, bitmap: &Bitmap) {
    h.write_u32(bitmap.width());
    h.write_u32(bitmap.height());
    h.write(bitmap.pixels());
}

fn hash_mode(h: &mut impl Hasher, mode: ContentMode) {
    mode.hash(h);
}

fn hash_text(h: &mut impl Hasher, block: &TextBlock) {
    h.write(block.text.as_bytes());
    h.write_u8(0xff);
    hash_attributes(h, &block.attributes);
}

fn hash_attributes(h: &mut impl Hasher, attrs: &TextAttributes) {
    h.write_u32(attrs.font_size.to_bits());
    attrs.color.hash(h);
    attrs.alignment.hash(h);
    h.write_u32(attrs.number_of_lines);
    attrs.line_break.hash(h);
    match attrs.shadow {
        Some(shadow) => {
            h.write_u8(1);
            shadow.color.hash(h);
            h.write_u64(shadow.offset.x.to_bits());
            h.write_u64(shadow.offset.y.to_bits());
        }
        None => h.write_u8(0),
    }
    attrs.highlighted_color.hash(h);
    h.write_u8(u8::from(attrs.highlighted));
    h.write_u8(u8::from(attrs.enabled));
}
