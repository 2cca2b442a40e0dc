// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Protected surface factory.
//!
//! The factory is the only place a [`SurfaceId`] is minted. It resolves the
//! capability once, asks the host for a hidden sensitive-input widget, and
//! keeps the surface only if the host reports it as capture-excluded. Every
//! failure is fail-closed: no slot is created, so nothing can ever be drawn.

use kurbo::Rect;

use crate::capability::{Capability, CapabilityCache, PlatformVersion, Unavailability};
use crate::error::SurfaceError;
use crate::host::{Host, Protection};
use crate::surface::SurfaceId;
use crate::surface::store::SurfaceStore;
use crate::trace::{
    CapabilityEvent, FailClosedEvent, FailClosedReason, SurfaceCreatedEvent, Tracer,
};

/// Mints protected surfaces.
#[derive(Debug)]
pub(crate) struct SurfaceFactory {
    cache: CapabilityCache,
    required: PlatformVersion,
}

impl SurfaceFactory {
    pub(crate) fn new(required: PlatformVersion) -> Self {
        Self {
            cache: CapabilityCache::default(),
            required,
        }
    }

    /// Returns the capability, probing on first use.
    pub(crate) fn capability<H: Host>(&self, host: &H, tracer: &mut Tracer<'_>) -> Capability {
        let (capability, probed) = self.cache.get_or_probe(host, self.required);
        if probed {
            tracer.capability_probed(&CapabilityEvent { capability });
        }
        capability
    }

    /// Returns the capability if it was already resolved.
    pub(crate) fn cached(&self) -> Option<Capability> {
        self.cache.get()
    }

    /// Creates a protected surface at `bounds`.
    pub(crate) fn create<H: Host>(
        &self,
        host: &mut H,
        store: &mut SurfaceStore<H>,
        bounds: Rect,
        tracer: &mut Tracer<'_>,
    ) -> Result<SurfaceId, SurfaceError> {
        let class = match self.capability(&*host, tracer) {
            Capability::Available(class) => class,
            Capability::Unavailable(why) => {
                let (reason, err) = match why {
                    Unavailability::VersionTooOld { found, required } => (
                        FailClosedReason::UnsupportedPlatform { found, required },
                        SurfaceError::UnsupportedPlatformVersion { found, required },
                    ),
                    Unavailability::SurfaceTypeMissing => (
                        FailClosedReason::SurfaceTypeMissing,
                        SurfaceError::ProtectedSurfaceMissing,
                    ),
                };
                tracer.fail_closed(&FailClosedEvent {
                    surface: None,
                    reason,
                });
                return Err(err);
            }
        };

        let Some(acquired) = host.acquire(class, bounds) else {
            tracer.fail_closed(&FailClosedEvent {
                surface: None,
                reason: FailClosedReason::SurfaceTypeMissing,
            });
            return Err(SurfaceError::ProtectedSurfaceMissing);
        };

        let protection = host.protection(&acquired.surface);
        if protection != Protection::CaptureExcluded {
            host.release(acquired.widget, acquired.surface);
            tracer.fail_closed(&FailClosedEvent {
                surface: None,
                reason: FailClosedReason::NotCaptureExcluded,
            });
            return Err(SurfaceError::ProtectedSurfaceMissing);
        }

        let id = store.insert(acquired.widget, acquired.surface, protection, bounds);
        tracer.surface_created(&SurfaceCreatedEvent {
            surface: id,
            bounds,
        });
        Ok(id)
    }
}
