// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation frame timers.
//!
//! Timers are driven by the host's frame callback through
//! [`SecureCompositor::advance_timers`](crate::SecureCompositor::advance_timers).
//! A timer refers to its surface by [`SurfaceId`] only, so a timer that
//! outlives its surface resolves to a stale handle and is discarded instead
//! of firing.

use alloc::vec::Vec;
use core::fmt;

use crate::surface::SurfaceId;
use crate::time::{Duration, HostTime};

/// Identifies a scheduled frame timer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub(crate) u64);

impl TimerId {
    /// Returns the raw timer number (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    id: TimerId,
    surface: SurfaceId,
    due: HostTime,
    interval: Duration,
}

/// A timer that came due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Firing {
    pub(crate) timer: TimerId,
    pub(crate) surface: SurfaceId,
    /// Number of whole intervals elapsed since the timer was last serviced.
    pub(crate) frames: u64,
}

/// Repeating timers, one per animated surface.
#[derive(Debug, Default)]
pub(crate) struct FrameTimers {
    entries: Vec<Entry>,
    next_id: u64,
    now: HostTime,
}

impl FrameTimers {
    /// Schedules a repeating timer first due one `interval` from the last
    /// observed time.
    pub(crate) fn schedule(&mut self, surface: SurfaceId, interval: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            surface,
            due: self.now.saturating_add(interval),
            interval,
        });
        id
    }

    /// Cancels a timer. Returns `true` if it was pending.
    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancels every timer targeting `surface`. Returns how many were removed.
    pub(crate) fn cancel_surface(&mut self, surface: SurfaceId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.surface != surface);
        before - self.entries.len()
    }

    /// Advances the clock to `now` and returns every timer that came due,
    /// re-arming each past `now`.
    pub(crate) fn take_due(&mut self, now: HostTime) -> Vec<Firing> {
        if now > self.now {
            self.now = now;
        }
        let mut due = Vec::new();
        for entry in &mut self.entries {
            if entry.due > now {
                continue;
            }
            let late = now.saturating_duration_since(entry.due).ticks();
            let frames = 1 + late / entry.interval.ticks().max(1);
            entry.due = entry
                .due
                .saturating_add(Duration(entry.interval.ticks().saturating_mul(frames)));
            due.push(Firing {
                timer: entry.id,
                surface: entry.surface,
                frames,
            });
        }
        due
    }

    /// Number of pending timers.
    pub(crate) fn pending(&self) -> usize {
        self.entries.len()
    }
}
