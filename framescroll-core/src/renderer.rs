//! Paints the selected frame onto the drawing surface.

use std::cell::Cell;
use std::rc::Rc;

use crate::cache::FrameCache;
use crate::config::{DrawTargetMode, Resolution};
use crate::types::FrameIndex;

/// A 2D surface that can show one image scaled to its full size.
pub trait DrawSurface {
    type Image;

    /// Resize the backing store. Implementations may drop existing pixels.
    fn set_size(&self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    fn clear(&self);

    fn draw_image(&self, image: &Self::Image, width: u32, height: u32);
}

pub struct FrameRenderer<D: DrawSurface> {
    surface: D,
    cache: Rc<FrameCache<D::Image>>,
    target: DrawTargetMode,
    fixed: Resolution,
    /// Last index passed to `draw`.
    requested: Cell<Option<FrameIndex>>,
    /// Index whose pixels are on the surface right now.
    painted: Cell<Option<FrameIndex>>,
}

impl<D: DrawSurface> FrameRenderer<D> {
    pub fn new(
        surface: D,
        cache: Rc<FrameCache<D::Image>>,
        target: DrawTargetMode,
        fixed: Resolution,
    ) -> Self {
        Self {
            surface,
            cache,
            target,
            fixed,
            requested: Cell::new(None),
            painted: Cell::new(None),
        }
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn requested(&self) -> Option<FrameIndex> {
        self.requested.get()
    }

    pub fn painted(&self) -> Option<FrameIndex> {
        self.painted.get()
    }

    /// Size the surface for the given viewport and repaint.
    ///
    /// A size change wipes the surface, so the requested frame (or, failing
    /// that, the last painted one) is drawn again.
    pub fn resize(&self, viewport_width: f64, viewport_height: f64) {
        let (width, height) = match self.target {
            DrawTargetMode::ViewportMatched => (
                viewport_width.max(1.0).round() as u32,
                viewport_height.max(1.0).round() as u32,
            ),
            DrawTargetMode::FixedResolution => (self.fixed.width, self.fixed.height),
        };
        if self.surface.size() == (width, height) {
            return;
        }
        self.surface.set_size(width, height);

        let previous = self.painted.replace(None);
        let repainted = self.requested.get().map(|i| self.paint(i)).unwrap_or(false);
        if !repainted {
            if let Some(index) = previous {
                self.paint(index);
            }
        }
    }

    /// Paint `index` if it is loaded. Otherwise the surface is left alone so
    /// the previous frame stays visible. Returns whether anything was drawn.
    pub fn draw(&self, index: FrameIndex) -> bool {
        self.requested.set(Some(index));
        if self.painted.get() == Some(index) {
            return true;
        }
        self.paint(index)
    }

    /// Paint `index` if it is the frame last asked for and not yet showing.
    pub fn refresh_if_requested(&self, index: FrameIndex) -> bool {
        if self.requested.get() != Some(index) || self.painted.get() == Some(index) {
            return false;
        }
        self.paint(index)
    }

    fn paint(&self, index: FrameIndex) -> bool {
        let (width, height) = self.surface.size();
        let drawn = self
            .cache
            .with_loaded(index, |image| {
                self.surface.clear();
                self.surface.draw_image(image, width, height);
            })
            .is_some();
        if drawn {
            self.painted.set(Some(index));
        }
        drawn
    }
}
