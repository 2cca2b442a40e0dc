// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Protected surface handles.

use core::fmt;

/// A handle to a protected surface.
///
/// Only [`SecureCompositor::create_protected_surface`] hands these out, so
/// holding one proves the surface was created capture-excluded. The
/// generation counter detects handles that outlive their surface.
///
/// [`SecureCompositor::create_protected_surface`]: crate::SecureCompositor::create_protected_surface
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl SurfaceId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({}@gen{})", self.idx, self.generation)
    }
}
