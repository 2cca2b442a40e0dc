// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`SimHost`]: a [`Host`] backed by the simulated layer tree.

use std::cell::Cell;

use hashbrown::HashMap;
use kurbo::{Point, Rect};
use shroud_core::capability::{PlatformVersion, SurfaceClass};
use shroud_core::host::{Acquired, Host, Protection};
use shroud_core::render::RenderedFrame;

use crate::config::SimConfig;
use crate::layer::{CommitPath, Contents, LayerRole, LayerTree};

/// Surface class of the simulated secure canvas.
pub const SECURE_CANVAS_CLASS: SurfaceClass = SurfaceClass::new("SimSecureCanvas");

/// Handle to a hidden secure-entry widget.
#[derive(Debug, PartialEq, Eq)]
pub struct SimWidget(u32);

/// Handle to a widget's secure canvas layer.
#[derive(Debug, PartialEq, Eq)]
pub struct SimSurface(u32);

/// Handle to a content layer hung off a secure canvas.
#[derive(Debug, PartialEq, Eq)]
pub struct SimChild(u32);

impl SimWidget {
    /// The widget's root layer id.
    #[must_use]
    pub fn layer(&self) -> u32 {
        self.0
    }
}

impl SimSurface {
    /// The canvas layer id.
    #[must_use]
    pub fn layer(&self) -> u32 {
        self.0
    }
}

impl SimChild {
    /// The content layer id.
    #[must_use]
    pub fn layer(&self) -> u32 {
        self.0
    }
}

/// Observable configuration of a hidden widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WidgetState {
    /// Secure text entry is on, so the compositor treats the widget as
    /// sensitive.
    pub secure_text_entry: bool,
    /// The widget accepts touches.
    pub user_interaction: bool,
    /// Border, background, caret and placeholder are all invisible.
    pub chrome_hidden: bool,
}

/// Counters for everything the compositor asked the host to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Widgets acquired with a usable canvas.
    pub acquired: u32,
    /// Widgets released.
    pub released: u32,
    /// Content children attached.
    pub attached: u32,
    /// Content children detached.
    pub detached: u32,
    /// Frames uploaded to content children.
    pub uploads: u64,
    /// Protected refreshes performed.
    pub protected_refreshes: u64,
    /// Commits that went through the unprotected fast path.
    pub fast_path_commits: u64,
    /// Protected refreshes after which a capture recorded content on the
    /// refreshed canvas.
    pub capturable_commits: u64,
}

/// A layer's committed contents as the display or the capture pipeline
/// sees them.
#[derive(Clone, Copy, Debug)]
pub struct Presented<'a> {
    /// Content layer id.
    pub layer: u32,
    /// The frame shown.
    pub frame: &'a RenderedFrame,
    /// Placement in the canvas, in points.
    pub bounds: Rect,
    /// How the contents were committed.
    pub path: CommitPath,
}

/// A simulated device compositor.
///
/// Content uploaded with [`Host::set_child_contents`] stays pending until a
/// commit. [`Host::refresh_protected`] commits through the secure pipeline;
/// [`mark_needs_display_fast_path`](Self::mark_needs_display_fast_path)
/// models the generic redraw that bypasses it. [`display`](Self::display)
/// returns everything on screen, while [`capture`](Self::capture) omits what
/// the secure pipeline committed into a protected canvas.
#[derive(Debug)]
pub struct SimHost {
    config: SimConfig,
    layers: LayerTree,
    widgets: HashMap<u32, WidgetState>,
    stats: SimStats,
    probes: Cell<u32>,
    protection_override: Option<Protection>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimHost {
    /// Creates a device with no widgets.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            layers: LayerTree::default(),
            widgets: HashMap::new(),
            stats: SimStats::default(),
            probes: Cell::new(0),
            protection_override: None,
        }
    }

    /// The device configuration.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Host-side counters.
    #[must_use]
    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// How many times the OS version was queried.
    #[must_use]
    pub fn probes(&self) -> u32 {
        self.probes.get()
    }

    /// Forces every canvas to report `protection`, modelling an OS that
    /// reclassifies surfaces at runtime. `None` restores the configured
    /// behaviour.
    pub fn set_protection_override(&mut self, protection: Option<Protection>) {
        self.protection_override = protection;
    }

    /// Commits `child`'s pending contents through the unprotected fast path.
    ///
    /// Returns `false` if the child had nothing pending.
    pub fn mark_needs_display_fast_path(&mut self, child: &SimChild) -> bool {
        let Some(layer) = self.layers.get_mut(child.0) else {
            return false;
        };
        let Some(contents) = layer.pending.take() else {
            return false;
        };
        layer.committed = Some((contents, CommitPath::FastPath));
        self.stats.fast_path_commits += 1;
        true
    }

    /// State of a live widget.
    #[must_use]
    pub fn widget(&self, widget: &SimWidget) -> Option<WidgetState> {
        self.widgets.get(&widget.0).copied()
    }

    /// Number of live widgets.
    #[must_use]
    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    /// Number of live layers of any role.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Number of layers holding uploaded but uncommitted contents.
    #[must_use]
    pub fn pending_uploads(&self) -> usize {
        self.layers
            .iter()
            .filter(|(_, l)| l.pending.is_some())
            .count()
    }

    /// Current frame of a layer, in points.
    #[must_use]
    pub fn layer_frame(&self, layer: u32) -> Option<Rect> {
        self.layers.get(layer).map(|l| l.frame)
    }

    /// Everything on the live display.
    #[must_use]
    pub fn display(&self) -> Vec<Presented<'_>> {
        self.presented(|_, _| true)
    }

    /// What a screenshot, recording or mirror would contain.
    #[must_use]
    pub fn capture(&self) -> Vec<Presented<'_>> {
        self.presented(|canvas, path| {
            !(path == CommitPath::Protected
                && canvas.is_some_and(|c| self.canvas_protection(c) == Protection::CaptureExcluded))
        })
    }

    /// The frame shown on `surface`, if any.
    #[must_use]
    pub fn displayed_frame(&self, surface: &SimSurface) -> Option<&RenderedFrame> {
        self.on_canvas(self.display(), surface)
    }

    /// The frame a capture would record for `surface`, if any.
    #[must_use]
    pub fn captured_frame(&self, surface: &SimSurface) -> Option<&RenderedFrame> {
        self.on_canvas(self.capture(), surface)
    }

    fn on_canvas<'a>(
        &'a self,
        presented: Vec<Presented<'a>>,
        surface: &SimSurface,
    ) -> Option<&'a RenderedFrame> {
        presented
            .into_iter()
            .find(|p| self.layers.canvas_of(p.layer) == Some(surface.0))
            .map(|p| p.frame)
    }

    fn presented(&self, keep: impl Fn(Option<u32>, CommitPath) -> bool) -> Vec<Presented<'_>> {
        let mut out: Vec<Presented<'_>> = self
            .layers
            .iter()
            .filter(|(_, l)| l.role == LayerRole::Content)
            .filter_map(|(id, l)| {
                let (contents, path) = l.committed.as_ref()?;
                keep(self.layers.canvas_of(id), *path).then_some(Presented {
                    layer: id,
                    frame: &contents.frame,
                    bounds: contents.bounds,
                    path: *path,
                })
            })
            .collect();
        out.sort_by_key(|p| p.layer);
        out
    }

    fn canvas_protection(&self, _canvas: u32) -> Protection {
        match self.protection_override {
            Some(p) => p,
            None if self.config.protects_secure_canvas => Protection::CaptureExcluded,
            None => Protection::Unprotected,
        }
    }
}

fn local(bounds: Rect) -> Rect {
    Rect::from_origin_size(Point::ORIGIN, bounds.size())
}

impl Host for SimHost {
    type Widget = SimWidget;
    type Surface = SimSurface;
    type Child = SimChild;

    fn platform_version(&self) -> PlatformVersion {
        self.probes.set(self.probes.get() + 1);
        self.config.os_version
    }

    fn surface_class(&self) -> Option<SurfaceClass> {
        self.config
            .exposes_secure_canvas
            .then_some(SECURE_CANVAS_CLASS)
    }

    fn scale_factor(&self) -> f64 {
        self.config.scale_factor
    }

    fn acquire(&mut self, class: SurfaceClass, bounds: Rect) -> Option<Acquired<SimWidget, SimSurface>> {
        let widget = self.layers.insert(LayerRole::Widget, None, bounds);
        if !self.config.exposes_secure_canvas || class != SECURE_CANVAS_CLASS {
            self.layers.remove(widget);
            return None;
        }
        let canvas = self
            .layers
            .insert(LayerRole::SecureCanvas, Some(widget), local(bounds));
        self.widgets.insert(
            widget,
            WidgetState {
                secure_text_entry: true,
                user_interaction: false,
                chrome_hidden: true,
            },
        );
        self.stats.acquired += 1;
        Some(Acquired {
            widget: SimWidget(widget),
            surface: SimSurface(canvas),
        })
    }

    fn protection(&self, surface: &SimSurface) -> Protection {
        self.canvas_protection(surface.0)
    }

    fn set_bounds(&mut self, widget: &SimWidget, surface: &SimSurface, bounds: Rect) {
        if let Some(layer) = self.layers.get_mut(widget.0) {
            layer.frame = bounds;
        }
        if let Some(layer) = self.layers.get_mut(surface.0) {
            layer.frame = local(bounds);
        }
    }

    fn attach_child(&mut self, surface: &SimSurface, bounds: Rect) -> SimChild {
        self.stats.attached += 1;
        SimChild(
            self.layers
                .insert(LayerRole::Content, Some(surface.0), bounds),
        )
    }

    fn set_child_contents(&mut self, child: &SimChild, frame: &RenderedFrame, bounds: Rect) {
        if let Some(layer) = self.layers.get_mut(child.0) {
            layer.frame = bounds;
            layer.pending = Some(Contents {
                frame: frame.clone(),
                bounds,
            });
            self.stats.uploads += 1;
        }
    }

    fn detach_child(&mut self, child: SimChild) {
        self.layers.remove(child.0);
        self.stats.detached += 1;
    }

    fn refresh_protected(&mut self, _widget: &SimWidget, surface: &SimSurface) {
        self.layers.commit_children(surface.0, CommitPath::Protected);
        self.stats.protected_refreshes += 1;
        if self.captured_frame(surface).is_some() {
            self.stats.capturable_commits += 1;
        }
    }

    fn release(&mut self, widget: SimWidget, _surface: SimSurface) {
        self.layers.remove(widget.0);
        self.widgets.remove(&widget.0);
        self.stats.released += 1;
    }
}
