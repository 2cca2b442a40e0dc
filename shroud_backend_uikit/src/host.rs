// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The UIKit [`Host`] implementation.

use core::ptr;

use hashbrown::HashMap;
use kurbo::Rect;
use objc2::MainThreadMarker;
use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2_core_foundation::{CGPoint, CGRect, CGSize};
use objc2_core_graphics::CGImage;
use objc2_foundation::NSProcessInfo;
use objc2_quartz_core::{CALayer, CATransaction};
use objc2_ui_kit::{UITextBorderStyle, UITextField, UITextInputTraits, UIView};
use shroud_core::capability::{PlatformVersion, SurfaceClass};
use shroud_core::host::{Acquired, Host, Protection};
use shroud_core::render::RenderedFrame;

use crate::image::frame_image;

/// The first sublayer of a `UITextField` with `secureTextEntry` set.
pub const SECURE_TEXT_CANVAS: SurfaceClass = SurfaceClass::new("UITextField.secureTextEntry.canvas");

/// Hosts protected surfaces inside a container view.
///
/// Hidden widgets are added as subviews of the container, so the container
/// must be part of the window the content should appear in.
#[derive(Debug)]
pub struct UiKitHost {
    mtm: MainThreadMarker,
    container: Retained<UIView>,
    /// Live widgets keyed by the address of their canvas layer.
    widgets: HashMap<usize, Retained<UITextField>>,
}

impl UiKitHost {
    /// Creates a host that places its widgets in `container`.
    #[must_use]
    pub fn new(mtm: MainThreadMarker, container: Retained<UIView>) -> Self {
        Self {
            mtm,
            container,
            widgets: HashMap::new(),
        }
    }

    /// Returns the container view.
    #[must_use]
    pub fn container(&self) -> &UIView {
        &self.container
    }

    /// Number of widgets currently handed out.
    #[must_use]
    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    /// Creates a non-interactive secure-entry field with no visible chrome.
    fn secure_field(&self, bounds: Rect) -> Retained<UITextField> {
        let field = UITextField::new(self.mtm);
        // SAFETY: plain property setter on a field owned by this thread.
        unsafe { field.setSecureTextEntry(true) };
        field.setBorderStyle(UITextBorderStyle::None);
        field.setUserInteractionEnabled(false);
        field.setFrame(cg_rect(bounds));
        field.layoutIfNeeded();
        field
    }
}

fn canvas_of(field: &UITextField) -> Option<Retained<CALayer>> {
    field.layer().sublayers()?.firstObject()
}

fn layer_key(layer: &CALayer) -> usize {
    ptr::from_ref(layer).addr()
}

fn cg_rect(rect: Rect) -> CGRect {
    CGRect::new(
        CGPoint::new(rect.x0, rect.y0),
        CGSize::new(rect.width(), rect.height()),
    )
}

fn version_component(value: isize) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

fn image_object(image: &CGImage) -> &AnyObject {
    // SAFETY: CGImage is a CoreFoundation type bridged to an Objective-C
    // object, so the pointer is a valid object for the borrow's lifetime.
    unsafe { &*ptr::from_ref(image).cast::<AnyObject>() }
}

impl Host for UiKitHost {
    type Widget = Retained<UITextField>;
    type Surface = Retained<CALayer>;
    type Child = Retained<CALayer>;

    fn platform_version(&self) -> PlatformVersion {
        let v = NSProcessInfo::processInfo().operatingSystemVersion();
        PlatformVersion::new(
            version_component(v.majorVersion),
            version_component(v.minorVersion),
            version_component(v.patchVersion),
        )
    }

    fn surface_class(&self) -> Option<SurfaceClass> {
        let probe = self.secure_field(Rect::new(0.0, 0.0, 1.0, 1.0));
        canvas_of(&probe).map(|_| SECURE_TEXT_CANVAS)
    }

    fn scale_factor(&self) -> f64 {
        self.container.contentScaleFactor()
    }

    fn acquire(
        &mut self,
        class: SurfaceClass,
        bounds: Rect,
    ) -> Option<Acquired<Self::Widget, Self::Surface>> {
        if class != SECURE_TEXT_CANVAS {
            return None;
        }
        let field = self.secure_field(bounds);
        self.container.addSubview(&field);
        let Some(canvas) = canvas_of(&field) else {
            field.removeFromSuperview();
            return None;
        };
        self.widgets.insert(layer_key(&canvas), field.clone());
        Some(Acquired {
            widget: field,
            surface: canvas,
        })
    }

    fn protection(&self, surface: &Self::Surface) -> Protection {
        let Some(field) = self.widgets.get(&layer_key(surface)) else {
            return Protection::Unprotected;
        };
        // SAFETY: plain property getter.
        let secure = unsafe { field.isSecureTextEntry() };
        let still_canvas = canvas_of(field).is_some_and(|c| ptr::eq(&*c, &**surface));
        if secure && still_canvas {
            Protection::CaptureExcluded
        } else {
            Protection::Unprotected
        }
    }

    fn set_bounds(&mut self, widget: &Self::Widget, _surface: &Self::Surface, bounds: Rect) {
        CATransaction::setDisableActions(true);
        widget.setFrame(cg_rect(bounds));
        // The field lays out its canvas.
        widget.layoutIfNeeded();
    }

    fn attach_child(&mut self, surface: &Self::Surface, bounds: Rect) -> Self::Child {
        CATransaction::setDisableActions(true);
        let child = CALayer::new();
        child.setFrame(cg_rect(bounds));
        child.setContentsScale(self.scale_factor());
        surface.addSublayer(&child);
        child
    }

    fn set_child_contents(&mut self, child: &Self::Child, frame: &RenderedFrame, bounds: Rect) {
        CATransaction::setDisableActions(true);
        child.setFrame(cg_rect(bounds));
        match frame_image(frame) {
            // SAFETY: layer contents accept a CGImage.
            Some(image) => unsafe { child.setContents(Some(image_object(&image))) },
            // An unconvertible frame shows nothing.
            // SAFETY: clearing contents is always valid.
            None => unsafe { child.setContents(None) },
        }
    }

    fn detach_child(&mut self, child: Self::Child) {
        child.removeFromSuperlayer();
    }

    fn refresh_protected(&mut self, widget: &Self::Widget, _surface: &Self::Surface) {
        widget.setNeedsDisplay();
        widget.layoutIfNeeded();
        CATransaction::flush();
    }

    fn release(&mut self, widget: Self::Widget, surface: Self::Surface) {
        self.widgets.remove(&layer_key(&surface));
        widget.removeFromSuperview();
    }
}
