// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thin view façades over protected surfaces.
//!
//! [`SecureImageView`] and [`SecureLabel`] each own exactly one protected
//! surface. They keep the view-level properties (image, highlighted image,
//! content mode, text, text attributes, frame) and translate every change
//! into a content operation on the compositor.
//!
//! [`teardown`](SecureImageView::teardown) releases the surface at once. A
//! view dropped without it queues its surface on the compositor, which
//! destroys it (cancelling its timers) at the start of its next call.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::mem;

use kurbo::Rect;

use crate::adapter::ContentOutcome;
use crate::compositor::SecureCompositor;
use crate::content::{AnimatedImage, Bitmap, ContentMode, Drawable, TextAttributes, TextBlock};
use crate::error::SurfaceError;
use crate::host::Host;
use crate::render::Rasterizer;
use crate::surface::SurfaceId;

/// Surfaces of dropped views, waiting for their compositor to destroy
/// them.
#[derive(Clone, Debug, Default)]
pub(crate) struct RetiredSurfaces(Rc<RefCell<Vec<SurfaceId>>>);

impl RetiredSurfaces {
    fn push(&self, id: SurfaceId) {
        self.0.borrow_mut().push(id);
    }

    pub(crate) fn take(&self) -> Vec<SurfaceId> {
        mem::take(&mut *self.0.borrow_mut())
    }
}

/// An image shown by a [`SecureImageView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Image {
    /// A still image.
    Still(Bitmap),
    /// A cyclic animation.
    Animated(AnimatedImage),
}

impl From<Bitmap> for Image {
    fn from(bitmap: Bitmap) -> Self {
        Self::Still(bitmap)
    }
}

impl From<AnimatedImage> for Image {
    fn from(animation: AnimatedImage) -> Self {
        Self::Animated(animation)
    }
}

/// An image view whose pixels never appear in screen captures.
#[derive(Debug)]
pub struct SecureImageView {
    surface: SurfaceId,
    retired: Option<RetiredSurfaces>,
    image: Option<Image>,
    highlighted_image: Option<Image>,
    highlighted: bool,
    content_mode: ContentMode,
}

impl SecureImageView {
    /// Creates an empty view at `frame`.
    ///
    /// # Errors
    ///
    /// Fails closed exactly like
    /// [`SecureCompositor::create_protected_surface`].
    pub fn new<H: Host, R: Rasterizer>(
        compositor: &mut SecureCompositor<H, R>,
        frame: Rect,
    ) -> Result<Self, SurfaceError> {
        Ok(Self {
            surface: compositor.create_protected_surface(frame)?,
            retired: Some(compositor.retired()),
            image: None,
            highlighted_image: None,
            highlighted: false,
            content_mode: ContentMode::default(),
        })
    }

    /// The backing surface.
    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// The normal image.
    #[must_use]
    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    /// The content mode.
    #[must_use]
    pub fn content_mode(&self) -> ContentMode {
        self.content_mode
    }

    /// Sets the normal image.
    ///
    /// # Errors
    ///
    /// Propagates content errors from the compositor.
    pub fn set_image<H: Host, R: Rasterizer>(
        &mut self,
        compositor: &mut SecureCompositor<H, R>,
        image: Option<Image>,
    ) -> Result<ContentOutcome, SurfaceError> {
        self.image = image;
        self.sync(compositor)
    }

    /// Sets the image shown while highlighted.
    ///
    /// # Errors
    ///
    /// Propagates content errors from the compositor.
    pub fn set_highlighted_image<H: Host, R: Rasterizer>(
        &mut self,
        compositor: &mut SecureCompositor<H, R>,
        image: Option<Image>,
    ) -> Result<ContentOutcome, SurfaceError> {
        self.highlighted_image = image;
        self.sync(compositor)
    }

    /// Switches between the normal and highlighted image.
    ///
    /// # Errors
    ///
    /// Propagates content errors from the compositor.
    pub fn set_highlighted<H: Host, R: Rasterizer>(
        &mut self,
        compositor: &mut SecureCompositor<H, R>,
        highlighted: bool,
    ) -> Result<ContentOutcome, SurfaceError> {
        self.highlighted = highlighted;
        self.sync(compositor)
    }

    /// Sets how the image is fitted into the frame.
    ///
    /// # Errors
    ///
    /// Propagates content errors from the compositor.
    pub fn set_content_mode<H: Host, R: Rasterizer>(
        &mut self,
        compositor: &mut SecureCompositor<H, R>,
        mode: ContentMode,
    ) -> Result<ContentOutcome, SurfaceError> {
        self.content_mode = mode;
        self.sync(compositor)
    }

    /// Moves and resizes the view.
    ///
    /// # Errors
    ///
    /// Propagates content errors from the compositor.
    pub fn set_frame<H: Host, R: Rasterizer>(
        &self,
        compositor: &mut SecureCompositor<H, R>,
        frame: Rect,
    ) -> Result<ContentOutcome, SurfaceError> {
        compositor.resize(self.surface, frame)
    }

    /// Destroys the backing surface.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] if the surface was already
    /// destroyed through the compositor.
    pub fn teardown<H: Host, R: Rasterizer>(
        mut self,
        compositor: &mut SecureCompositor<H, R>,
    ) -> Result<(), SurfaceError> {
        self.retired = None;
        compositor.destroy_surface(self.surface)
    }

    fn displayed(&self) -> Option<&Image> {
        match (&self.highlighted_image, self.highlighted) {
            (Some(image), true) => Some(image),
            _ => self.image.as_ref(),
        }
    }

    fn sync<H: Host, R: Rasterizer>(
        &self,
        compositor: &mut SecureCompositor<H, R>,
    ) -> Result<ContentOutcome, SurfaceError> {
        let mode = self.content_mode;
        let drawable = match self.displayed() {
            Some(Image::Still(bitmap)) => Drawable::Image {
                bitmap: bitmap.clone(),
                mode,
            },
            Some(Image::Animated(animation)) => Drawable::Animation {
                animation: animation.clone(),
                mode,
            },
            None => {
                compositor.clear_content(self.surface)?;
                return Ok(ContentOutcome::NoContent);
            }
        };
        compositor.set_content(self.surface, drawable)
    }
}

impl Drop for SecureImageView {
    fn drop(&mut self) {
        if let Some(retired) = self.retired.take() {
            retired.push(self.surface);
        }
    }
}

/// A text label whose glyphs never appear in screen captures.
#[derive(Debug)]
pub struct SecureLabel {
    surface: SurfaceId,
    retired: Option<RetiredSurfaces>,
    text: String,
    attributes: TextAttributes,
}

impl SecureLabel {
    /// Creates an empty label at `frame`.
    ///
    /// # Errors
    ///
    /// Fails closed exactly like
    /// [`SecureCompositor::create_protected_surface`].
    pub fn new<H: Host, R: Rasterizer>(
        compositor: &mut SecureCompositor<H, R>,
        frame: Rect,
    ) -> Result<Self, SurfaceError> {
        Ok(Self {
            surface: compositor.create_protected_surface(frame)?,
            retired: Some(compositor.retired()),
            text: String::new(),
            attributes: TextAttributes::default(),
        })
    }

    /// The backing surface.
    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// The text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The typographic attributes.
    #[must_use]
    pub fn attributes(&self) -> &TextAttributes {
        &self.attributes
    }

    /// Sets the text. Empty text clears the surface.
    ///
    /// # Errors
    ///
    /// Propagates content errors from the compositor.
    pub fn set_text<H: Host, R: Rasterizer>(
        &mut self,
        compositor: &mut SecureCompositor<H, R>,
        text: impl Into<String>,
    ) -> Result<ContentOutcome, SurfaceError> {
        self.text = text.into();
        self.sync(compositor)
    }

    /// Replaces all attributes.
    ///
    /// # Errors
    ///
    /// Propagates content errors from the compositor.
    pub fn set_attributes<H: Host, R: Rasterizer>(
        &mut self,
        compositor: &mut SecureCompositor<H, R>,
        attributes: TextAttributes,
    ) -> Result<ContentOutcome, SurfaceError> {
        self.attributes = attributes;
        self.sync(compositor)
    }

    /// Edits the attributes in place and re-renders once.
    ///
    /// # Errors
    ///
    /// Propagates content errors from the compositor.
    pub fn update_attributes<H: Host, R: Rasterizer>(
        &mut self,
        compositor: &mut SecureCompositor<H, R>,
        edit: impl FnOnce(&mut TextAttributes),
    ) -> Result<ContentOutcome, SurfaceError> {
        edit(&mut self.attributes);
        self.sync(compositor)
    }

    /// Moves and resizes the label.
    ///
    /// # Errors
    ///
    /// Propagates content errors from the compositor.
    pub fn set_frame<H: Host, R: Rasterizer>(
        &self,
        compositor: &mut SecureCompositor<H, R>,
        frame: Rect,
    ) -> Result<ContentOutcome, SurfaceError> {
        compositor.resize(self.surface, frame)
    }

    /// Destroys the backing surface.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::StaleSurface`] if the surface was already
    /// destroyed through the compositor.
    pub fn teardown<H: Host, R: Rasterizer>(
        mut self,
        compositor: &mut SecureCompositor<H, R>,
    ) -> Result<(), SurfaceError> {
        self.retired = None;
        compositor.destroy_surface(self.surface)
    }

    fn sync<H: Host, R: Rasterizer>(
        &self,
        compositor: &mut SecureCompositor<H, R>,
    ) -> Result<ContentOutcome, SurfaceError> {
        if self.text.is_empty() {
            compositor.clear_content(self.surface)?;
            return Ok(ContentOutcome::NoContent);
        }
        let block = TextBlock {
            text: self.text.clone(),
            attributes: self.attributes,
        };
        compositor.set_content(self.surface, Drawable::Text(block))
    }
}

impl Drop for SecureLabel {
    fn drop(&mut self) {
        if let Some(retired) = self.retired.take() {
            retired.push(self.surface);
        }
    }
}
