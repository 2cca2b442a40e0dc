// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated device configuration.

use shroud_core::capability::PlatformVersion;

/// What the simulated device reports and how its compositor behaves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    /// Version returned from `platform_version`.
    pub os_version: PlatformVersion,
    /// Device pixels per point.
    pub scale_factor: f64,
    /// Whether the hidden secure-entry widget has a canvas sublayer at all.
    pub exposes_secure_canvas: bool,
    /// Whether the compositor leaves that canvas out of captures.
    pub protects_secure_canvas: bool,
}

impl SimConfig {
    /// A current phone: version 17.4, 3× display, working secure canvas.
    #[must_use]
    pub const fn ios17() -> Self {
        Self {
            os_version: PlatformVersion::new(17, 4, 0),
            scale_factor: 3.0,
            exposes_secure_canvas: true,
            protects_secure_canvas: true,
        }
    }

    /// A device older than the supported minimum (12.4, 2× display).
    ///
    /// The secure-entry widget of that era has no separate canvas layer.
    #[must_use]
    pub const fn legacy() -> Self {
        Self {
            os_version: PlatformVersion::new(12, 4, 0),
            scale_factor: 2.0,
            exposes_secure_canvas: false,
            protects_secure_canvas: false,
        }
    }

    /// Sets the reported OS version.
    #[must_use]
    pub const fn with_os_version(mut self, version: PlatformVersion) -> Self {
        self.os_version = version;
        self
    }

    /// Sets the device scale factor.
    #[must_use]
    pub const fn with_scale_factor(mut self, scale: f64) -> Self {
        self.scale_factor = scale;
        self
    }

    /// Sets whether the secure canvas sublayer exists.
    #[must_use]
    pub const fn with_secure_canvas(mut self, exposed: bool) -> Self {
        self.exposes_secure_canvas = exposed;
        self
    }

    /// Sets whether the compositor excludes the secure canvas from captures.
    #[must_use]
    pub const fn with_canvas_protection(mut self, protected: bool) -> Self {
        self.protects_secure_canvas = protected;
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::ios17()
    }
}
