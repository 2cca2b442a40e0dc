// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated host compositor for shroud.
//!
//! [`SimHost`] implements [`Host`](shroud_core::host::Host) over an
//! in-memory layer tree that models the parts of a real compositor the
//! protection mechanism depends on:
//!
//! - a hidden secure-entry widget whose canvas sublayer is left out of
//!   captures (configurable per [`SimConfig`], including devices where the
//!   canvas is missing or unprotected)
//! - uploaded contents that stay pending until committed, with the commit
//!   path recorded, so a refresh that bypasses the secure pipeline shows up
//!   in [`SimHost::capture`]
//! - counters for probes, refreshes, uploads and widget lifetimes
//!
//! [`SimCompositor`] pairs it with the software rasterizer.

mod config;
mod host;
mod layer;

#[cfg(test)]
mod scenarios;

pub use config::SimConfig;
pub use host::{
    Presented, SECURE_CANVAS_CLASS, SimChild, SimHost, SimStats, SimSurface, SimWidget,
    WidgetState,
};
pub use layer::{CommitPath, Contents, LayerRole};

use shroud_core::{SecureCompositor, ShroudConfig};
use shroud_render::{RasterConfig, SoftwareRasterizer};

/// A compositor on a simulated device with the software rasterizer.
pub type SimCompositor = SecureCompositor<SimHost, SoftwareRasterizer>;

/// Creates a [`SimCompositor`] for a device configured by `sim`.
#[must_use]
pub fn compositor(sim: SimConfig, config: ShroudConfig, raster: RasterConfig) -> SimCompositor {
    SecureCompositor::new(SimHost::new(sim), SoftwareRasterizer::new(raster), config)
}
