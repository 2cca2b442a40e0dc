// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The simulated layer tree.
//!
//! Layers carry two content slots. Uploads land in `pending`; only a commit
//! moves them to `committed`, which is what the display and the capture
//! pipeline read. Each commit remembers which path produced it, because the
//! capture pipeline only blanks content that the protected path committed.

use hashbrown::HashMap;
use kurbo::Rect;
use shroud_core::render::RenderedFrame;

/// What a layer is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerRole {
    /// The hidden secure-entry widget's root layer.
    Widget,
    /// The widget's canvas sublayer (the protected surface).
    SecureCanvas,
    /// A content child hung off a canvas.
    Content,
}

/// How a layer's contents reached the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitPath {
    /// Through the widget's protected redraw.
    Protected,
    /// Through a generic mark-dirty fast path that bypasses the secure
    /// pipeline.
    FastPath,
}

/// Contents uploaded to a layer.
#[derive(Clone, Debug)]
pub struct Contents {
    /// The frame, stretched over `bounds`.
    pub frame: RenderedFrame,
    /// Placement in the parent, in points.
    pub bounds: Rect,
}

#[derive(Clone, Debug)]
pub(crate) struct Layer {
    pub(crate) role: LayerRole,
    pub(crate) parent: Option<u32>,
    pub(crate) frame: Rect,
    pub(crate) pending: Option<Contents>,
    pub(crate) committed: Option<(Contents, CommitPath)>,
}

/// All live layers, keyed by id.
#[derive(Debug, Default)]
pub(crate) struct LayerTree {
    layers: HashMap<u32, Layer>,
    next: u32,
}

impl LayerTree {
    pub(crate) fn insert(&mut self, role: LayerRole, parent: Option<u32>, frame: Rect) -> u32 {
        let id = self.next;
        self.next += 1;
        self.layers.insert(
            id,
            Layer {
                role,
                parent,
                frame,
                pending: None,
                committed: None,
            },
        );
        id
    }

    /// Removes `id` and all of its descendants. Returns how many layers
    /// were removed.
    pub(crate) fn remove(&mut self, id: u32) -> usize {
        let children: Vec<u32> = self.children(id).collect();
        let mut removed = children.into_iter().map(|c| self.remove(c)).sum();
        if self.layers.remove(&id).is_some() {
            removed += 1;
        }
        removed
    }

    pub(crate) fn get(&self, id: u32) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: u32) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    pub(crate) fn children(&self, id: u32) -> impl Iterator<Item = u32> + '_ {
        self.layers
            .iter()
            .filter(move |(_, l)| l.parent == Some(id))
            .map(|(&k, _)| k)
    }

    /// Commits the pending contents of every child of `parent` through
    /// `path`. Returns how many children had something to commit.
    pub(crate) fn commit_children(&mut self, parent: u32, path: CommitPath) -> usize {
        let mut committed = 0;
        for layer in self.layers.values_mut() {
            if layer.parent == Some(parent)
                && let Some(contents) = layer.pending.take()
            {
                layer.committed = Some((contents, path));
                committed += 1;
            }
        }
        committed
    }

    /// Walks up from `id` to the nearest secure canvas.
    pub(crate) fn canvas_of(&self, mut id: u32) -> Option<u32> {
        loop {
            let layer = self.layers.get(&id)?;
            if layer.role == LayerRole::SecureCanvas {
                return Some(id);
            }
            id = layer.parent?;
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (u32, &Layer)> {
        self.layers.iter().map(|(&k, v)| (k, v))
    }

    pub(crate) fn len(&self) -> usize {
        self.layers.len()
    }
}
