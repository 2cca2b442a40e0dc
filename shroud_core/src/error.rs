// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Every failure in this crate resolves to "show no sensitive content".
//! Errors are reported so callers can tell the user why nothing is shown;
//! they never imply that content was rendered unprotected.

use alloc::string::String;
use core::fmt;

use crate::capability::PlatformVersion;
use crate::surface::SurfaceId;

/// Errors from protected-surface operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    /// The protected-surface primitive is unavailable on this OS version.
    UnsupportedPlatformVersion {
        /// Version reported by the host.
        found: PlatformVersion,
        /// Minimum version required.
        required: PlatformVersion,
    },
    /// The host widget did not expose a capture-excluded surface.
    ProtectedSurfaceMissing,
    /// No offscreen render target could be allocated, not even for the
    /// placeholder.
    SurfaceAllocationFailure {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The upstream decoder failed; the surface was cleared.
    ContentDecodeFailure(ContentDecodeFailure),
    /// The host reported a different protection classification after a
    /// refresh; content was removed.
    ProtectionLost,
    /// The handle refers to a destroyed surface.
    StaleSurface(SurfaceId),
}

impl SurfaceError {
    /// Returns `true` if the error means the mechanism itself is
    /// unavailable, so the sensitive payload can never be shown here.
    #[must_use]
    pub const fn is_capability_failure(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatformVersion { .. } | Self::ProtectedSurfaceMissing
        )
    }
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedPlatformVersion { found, required } => write!(
                f,
                "protected surfaces require platform {required} or newer (found {found})"
            ),
            Self::ProtectedSurfaceMissing => {
                write!(f, "host widget did not expose a protected surface")
            }
            Self::SurfaceAllocationFailure { width, height } => {
                write!(f, "could not allocate a {width}x{height} render target")
            }
            Self::ContentDecodeFailure(err) => write!(f, "content decode failed: {err}"),
            Self::ProtectionLost => write!(f, "surface lost its capture protection"),
            Self::StaleSurface(id) => write!(f, "stale surface handle {id:?}"),
        }
    }
}

impl core::error::Error for SurfaceError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::ContentDecodeFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContentDecodeFailure> for SurfaceError {
    fn from(err: ContentDecodeFailure) -> Self {
        Self::ContentDecodeFailure(err)
    }
}

/// A decode error reported by the upstream image decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentDecodeFailure {
    message: String,
}

impl ContentDecodeFailure {
    /// Wraps a decoder message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the decoder message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ContentDecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for ContentDecodeFailure {}

/// Errors constructing bitmaps and animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitmapError {
    /// The pixel buffer length does not match `width * height * 4`.
    LengthMismatch {
        /// Expected byte length.
        expected: u64,
        /// Actual byte length.
        actual: u64,
    },
    /// An animation needs at least one frame and a non-zero frame duration.
    EmptyAnimation,
}

impl fmt::Display for BitmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { expected, actual } => {
                write!(f, "pixel buffer is {actual} bytes, expected {expected}")
            }
            Self::EmptyAnimation => {
                write!(f, "animation needs frames and a non-zero frame duration")
            }
        }
    }
}

impl core::error::Error for BitmapError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_names_versions() {
        let err = SurfaceError::UnsupportedPlatformVersion {
            found: PlatformVersion::new(12, 1, 0),
            required: PlatformVersion::new(13, 0, 0),
        };
        assert_eq!(
            err.to_string(),
            "protected surfaces require platform 13.0.0 or newer (found 12.1.0)"
        );
        assert!(err.is_capability_failure());
    }

    #[test]
    fn decode_failure_is_the_source() {
        use core::error::Error;

        let err = SurfaceError::from(ContentDecodeFailure::new("truncated PNG"));
        assert!(!err.is_capability_failure());
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("truncated PNG"));
    }
}
