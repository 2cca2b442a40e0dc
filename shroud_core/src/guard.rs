// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capture guard: commits content changes through the protected path.
//!
//! Every content mutation leaves the surface [`GuardState::Dirty`]. The guard
//! then forces the host widget's protected refresh synchronously, so the new
//! contents are committed inside the capture-excluded surface before control
//! returns to the caller, and the surface goes back to
//! [`GuardState::Clean`].
//!
//! The guard reads the classification back before and after each refresh.
//! If it no longer matches the one recorded at creation, the content child
//! is detached before anything is committed, the drawable is dropped, and
//! the surface is marked lost: it refuses content until destroyed.

use crate::error::SurfaceError;
use crate::host::{Host, Protection};
use crate::surface::SurfaceId;
use crate::surface::store::{RenderState, SurfaceStore};
use crate::trace::{FailClosedEvent, FailClosedReason, RefreshEvent, Tracer};

/// Whether a surface has content changes not yet committed through the
/// protected refresh path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GuardState {
    /// Everything visible was committed via the protected path.
    #[default]
    Clean,
    /// Content changed since the last protected refresh.
    Dirty,
}

/// Forces protected refreshes after content changes.
#[derive(Debug, Default)]
pub(crate) struct CaptureGuard {
    refreshes: u64,
}

impl CaptureGuard {
    /// Marks the surface in slot `i` dirty.
    pub(crate) fn mark_dirty<H: Host>(store: &mut SurfaceStore<H>, i: usize) {
        store.guard[i] = GuardState::Dirty;
    }

    /// Returns `true` if the host still classifies slot `i` the way it did
    /// at creation and the slot was never lost.
    pub(crate) fn intact<H: Host>(host: &H, store: &SurfaceStore<H>, i: usize) -> bool {
        !store.lost[i]
            && store.surface[i]
                .as_ref()
                .is_some_and(|s| host.protection(s) == store.protection[i])
    }

    /// Empties slot `i` after its classification changed and marks it lost.
    ///
    /// A lost slot refuses content until it is destroyed. The slot is left
    /// dirty so the detach is committed by the next refresh.
    pub(crate) fn lose<H: Host>(
        host: &mut H,
        store: &mut SurfaceStore<H>,
        id: SurfaceId,
        i: usize,
        tracer: &mut Tracer<'_>,
    ) {
        tracer.fail_closed(&FailClosedEvent {
            surface: Some(id),
            reason: FailClosedReason::ProtectionLost,
        });
        store.lost[i] = true;
        if let Some(child) = store.child[i].take() {
            host.detach_child(child);
        }
        store.drawable[i] = None;
        store.digest[i] = None;
        let passes = store.render[i].passes;
        store.render[i] = RenderState {
            passes,
            ..RenderState::default()
        };
        store.guard[i] = GuardState::Dirty;
    }

    /// Commits pending changes of a dirty surface through the protected
    /// refresh path.
    ///
    /// The classification is read before the commit and again after it.
    /// Pending contents are never committed into a surface that no longer
    /// matches: the child is detached first. Clean surfaces are left alone.
    pub(crate) fn notify_content_changed<H: Host>(
        &mut self,
        host: &mut H,
        store: &mut SurfaceStore<H>,
        id: SurfaceId,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), SurfaceError> {
        let i = store.check(id)?;
        if store.guard[i] == GuardState::Clean {
            return Ok(());
        }
        if !store.lost[i] && !Self::intact(host, store, i) {
            Self::lose(host, store, id, i, tracer);
        }
        let protection = self.refresh(host, store, id, i, tracer)?;
        if !store.lost[i] && protection != store.protection[i] {
            Self::lose(host, store, id, i, tracer);
            self.refresh(host, store, id, i, tracer)?;
        }
        store.guard[i] = GuardState::Clean;
        if store.lost[i] {
            Err(SurfaceError::ProtectionLost)
        } else {
            Ok(())
        }
    }

    fn refresh<H: Host>(
        &mut self,
        host: &mut H,
        store: &SurfaceStore<H>,
        id: SurfaceId,
        i: usize,
        tracer: &mut Tracer<'_>,
    ) -> Result<Protection, SurfaceError> {
        let (widget, surface) = store.native(i).ok_or(SurfaceError::StaleSurface(id))?;
        host.refresh_protected(widget, surface);
        self.refreshes += 1;
        let protection = host.protection(surface);
        tracer.refresh(&RefreshEvent {
            surface: id,
            protection,
        });
        Ok(protection)
    }

    /// Total protected refreshes forced so far.
    pub(crate) fn refreshes(&self) -> u64 {
        self.refreshes
    }
}
