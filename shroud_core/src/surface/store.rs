// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays storage for protected surfaces.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::content::Drawable;
use crate::digest::{ContentDigest, RenderKey};
use crate::error::SurfaceError;
use crate::guard::GuardState;
use crate::host::{Host, Protection};
use crate::timer::TimerId;

use super::id::SurfaceId;

/// Render bookkeeping for one surface.
///
/// Only the content adapter mutates this.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderState {
    pub(crate) last: Option<RenderKey>,
    pub(crate) passes: u64,
    pub(crate) degraded: bool,
}

impl RenderState {
    /// Key of the most recent render, or `None` if nothing is shown.
    #[must_use]
    pub const fn last(&self) -> Option<RenderKey> {
        self.last
    }

    /// Number of rasterization passes performed so far.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Whether the last render used a reduced size or the placeholder.
    #[must_use]
    pub const fn degraded(&self) -> bool {
        self.degraded
    }
}

/// Native objects returned when a slot is freed.
pub(crate) struct Released<H: Host> {
    pub(crate) widget: H::Widget,
    pub(crate) surface: H::Surface,
    pub(crate) child: Option<H::Child>,
    pub(crate) timer: Option<TimerId>,
}

/// Protected surfaces, addressed by [`SurfaceId`].
///
/// Each surface occupies a slot in parallel arrays. Freed slots are recycled
/// through a free list; the slot generation is bumped on removal so stale
/// handles are rejected immediately.
pub(crate) struct SurfaceStore<H: Host> {
    // -- Native objects --
    pub(crate) widget: Vec<Option<H::Widget>>,
    pub(crate) surface: Vec<Option<H::Surface>>,
    pub(crate) child: Vec<Option<H::Child>>,

    // -- Properties --
    pub(crate) bounds: Vec<Rect>,
    pub(crate) protection: Vec<Protection>,
    /// The host reclassified the surface; it may never show content again.
    pub(crate) lost: Vec<bool>,

    // -- Content (owned by the adapter) --
    pub(crate) drawable: Vec<Option<Drawable>>,
    pub(crate) digest: Vec<Option<ContentDigest>>,
    pub(crate) frame: Vec<usize>,
    pub(crate) timer: Vec<Option<TimerId>>,
    pub(crate) render: Vec<RenderState>,
    pub(crate) guard: Vec<GuardState>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
    live: u32,
}

impl<H: Host> fmt::Debug for SurfaceStore<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceStore")
            .field("len", &self.len)
            .field("live", &self.live)
            .field("free_list", &self.free_list)
            .finish_non_exhaustive()
    }
}

impl<H: Host> SurfaceStore<H> {
    pub(crate) fn new() -> Self {
        Self {
            widget: Vec::new(),
            surface: Vec::new(),
            child: Vec::new(),
            bounds: Vec::new(),
            protection: Vec::new(),
            lost: Vec::new(),
            drawable: Vec::new(),
            digest: Vec::new(),
            frame: Vec::new(),
            timer: Vec::new(),
            render: Vec::new(),
            guard: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            live: 0,
        }
    }

    /// Stores a freshly acquired surface and returns its handle.
    pub(crate) fn insert(
        &mut self,
        widget: H::Widget,
        surface: H::Surface,
        protection: Protection,
        bounds: Rect,
    ) -> SurfaceId {
        self.live += 1;
        if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.widget[i] = Some(widget);
            self.surface[i] = Some(surface);
            self.child[i] = None;
            self.bounds[i] = bounds;
            self.protection[i] = protection;
            self.lost[i] = false;
            self.drawable[i] = None;
            self.digest[i] = None;
            self.frame[i] = 0;
            self.timer[i] = None;
            self.render[i] = RenderState::default();
            self.guard[i] = GuardState::Clean;
            SurfaceId {
                idx,
                generation: self.generation[i],
            }
        } else {
            let idx = self.len;
            self.len += 1;
            self.widget.push(Some(widget));
            self.surface.push(Some(surface));
            self.child.push(None);
            self.bounds.push(bounds);
            self.protection.push(protection);
            self.lost.push(false);
            self.drawable.push(None);
            self.digest.push(None);
            self.frame.push(0);
            self.timer.push(None);
            self.render.push(RenderState::default());
            self.guard.push(GuardState::Clean);
            self.generation.push(0);
            SurfaceId { idx, generation: 0 }
        }
    }

    /// Frees a slot and hands back its native objects.
    pub(crate) fn remove(&mut self, id: SurfaceId) -> Result<Released<H>, SurfaceError> {
        let i = self.check(id)?;
        let (Some(widget), Some(surface)) = (self.widget[i].take(), self.surface[i].take()) else {
            return Err(SurfaceError::StaleSurface(id));
        };
        let child = self.child[i].take();
        let timer = self.timer[i].take();
        self.drawable[i] = None;
        self.digest[i] = None;
        self.render[i] = RenderState::default();
        self.guard[i] = GuardState::Clean;
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(id.idx);
        self.live -= 1;
        Ok(Released {
            widget,
            surface,
            child,
            timer,
        })
    }

    /// Resolves a handle to its slot index.
    pub(crate) fn check(&self, id: SurfaceId) -> Result<usize, SurfaceError> {
        let i = id.idx as usize;
        let live = id.idx < self.len
            && self.generation[i] == id.generation
            && self.widget[i].is_some();
        if live {
            Ok(i)
        } else {
            Err(SurfaceError::StaleSurface(id))
        }
    }

    /// Returns `true` if `id` refers to a live surface.
    pub(crate) fn contains(&self, id: SurfaceId) -> bool {
        self.check(id).is_ok()
    }

    /// Number of live surfaces.
    pub(crate) fn live(&self) -> u32 {
        self.live
    }

    /// Returns the widget and surface of a live slot.
    pub(crate) fn native(&self, i: usize) -> Option<(&H::Widget, &H::Surface)> {
        Some((self.widget[i].as_ref()?, self.surface[i].as_ref()?))
    }
}
