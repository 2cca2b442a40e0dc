// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor configuration.

use crate::capability::PlatformVersion;
use crate::content::Rgba;

/// Configuration for a [`SecureCompositor`](crate::SecureCompositor).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShroudConfig {
    /// Oldest platform version on which the protected surface is trusted.
    pub min_platform_version: PlatformVersion,
    /// Scale applied to the pixel size when the full-size render target
    /// cannot be allocated (0.0–1.0).
    pub retry_scale: f64,
    /// Colour of the placeholder shown when no render target can hold the
    /// real content.
    pub placeholder: Rgba,
}

impl ShroudConfig {
    /// Default configuration for iOS hosts.
    ///
    /// The secure text field's protected canvas is only reliably excluded
    /// from captures on iOS 13 and later.
    #[must_use]
    pub const fn ios() -> Self {
        Self {
            min_platform_version: PlatformVersion::new(13, 0, 0),
            retry_scale: 0.5,
            placeholder: Rgba::PLACEHOLDER_GRAY,
        }
    }

    /// Accepts any platform version. Intended for simulated hosts.
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            min_platform_version: PlatformVersion::new(0, 0, 0),
            ..Self::ios()
        }
    }

    /// Returns this configuration with a different minimum version.
    #[must_use]
    pub const fn with_min_platform_version(mut self, version: PlatformVersion) -> Self {
        self.min_platform_version = version;
        self
    }

    /// Returns this configuration with a different retry scale.
    #[must_use]
    pub const fn with_retry_scale(mut self, scale: f64) -> Self {
        self.retry_scale = scale;
        self
    }
}

impl Default for ShroudConfig {
    fn default() -> Self {
        Self::ios()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_in_version() {
        let ios = ShroudConfig::ios();
        let permissive = ShroudConfig::permissive();
        assert_eq!(ios.min_platform_version, PlatformVersion::new(13, 0, 0));
        assert_eq!(permissive.min_platform_version, PlatformVersion::default());
        assert_eq!(ios.retry_scale, permissive.retry_scale);
        assert_eq!(ios.placeholder, permissive.placeholder);
    }
}
