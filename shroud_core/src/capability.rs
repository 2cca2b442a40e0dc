// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime capability probe for the protected-surface primitive.
//!
//! Whether the host can hand out a capture-excluded surface depends on the
//! running OS version and on the host widget still exposing the surface
//! type. Both are resolved at runtime and reported as a tagged
//! [`Capability`] rather than through conditional compilation, so the
//! fail-closed path can be exercised on any build target.
//!
//! The result is resolved lazily on first use and cached for the lifetime of
//! the owning [`SecureCompositor`](crate::SecureCompositor); it is never
//! re-checked.

use core::cell::OnceCell;
use core::fmt;

use crate::host::Host;

/// A host platform version (`major.minor.patch`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlatformVersion {
    /// Major version.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
    /// Patch version.
    pub patch: u16,
}

impl PlatformVersion {
    /// Creates a version triple.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl fmt::Debug for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlatformVersion({self})")
    }
}

/// Opaque tag naming the protected-surface type a host can hand out.
///
/// Hosts report one from [`Host::surface_class`]; the factory passes it back
/// unchanged to [`Host::acquire`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceClass {
    name: &'static str,
}

impl SurfaceClass {
    /// Creates a surface class tag.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// Returns the diagnostic name of the surface type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

/// Why the protected-surface primitive is unavailable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unavailability {
    /// The running OS is older than the minimum supported version.
    VersionTooOld {
        /// Version reported by the host.
        found: PlatformVersion,
        /// Minimum version required.
        required: PlatformVersion,
    },
    /// The OS version is new enough but the host does not expose the
    /// protected surface type.
    SurfaceTypeMissing,
}

/// Result of probing the host for the protected-surface primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Protected surfaces of the given class can be acquired.
    Available(SurfaceClass),
    /// Protected surfaces cannot be acquired; sensitive content must not be
    /// shown.
    Unavailable(Unavailability),
}

impl Capability {
    /// Probes `host` against the minimum supported version.
    #[must_use]
    pub fn probe<H: Host + ?Sized>(host: &H, required: PlatformVersion) -> Self {
        let found = host.platform_version();
        if found < required {
            return Self::Unavailable(Unavailability::VersionTooOld { found, required });
        }
        match host.surface_class() {
            Some(class) => Self::Available(class),
            None => Self::Unavailable(Unavailability::SurfaceTypeMissing),
        }
    }

    /// Returns `true` if protected surfaces can be acquired.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Returns the surface class, if available.
    #[must_use]
    pub const fn surface_class(&self) -> Option<SurfaceClass> {
        match self {
            Self::Available(class) => Some(*class),
            Self::Unavailable(_) => None,
        }
    }
}

/// Lazily resolved, never re-checked capability state.
#[derive(Debug, Default)]
pub(crate) struct CapabilityCache {
    cell: OnceCell<Capability>,
}

impl CapabilityCache {
    /// Returns the cached capability, probing `host` on first use.
    ///
    /// The second element is `true` when this call performed the probe.
    pub(crate) fn get_or_probe<H: Host + ?Sized>(
        &self,
        host: &H,
        required: PlatformVersion,
    ) -> (Capability, bool) {
        let mut probed = false;
        let capability = *self.cell.get_or_init(|| {
            probed = true;
            Capability::probe(host, required)
        });
        (capability, probed)
    }

    /// Returns the cached capability without probing.
    pub(crate) fn get(&self) -> Option<Capability> {
        self.cell.get().copied()
    }
}
