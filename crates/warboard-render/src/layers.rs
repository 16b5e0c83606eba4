//! The whiteboard's raster layers and how updates repaint them.
//!
//! Draw order, bottom to top: background, overlay, main, preview. The main
//! layer is always rebuilt as ink then shapes, so erasing only touches ink
//! and shapes survive it.

use crate::image::LoadedImage;
use crate::renderer::{RenderResult, ShapeRenderer};
use crate::surface::Surface;
use warboard_core::whiteboard::InkOp;
use warboard_core::{
    BackgroundState, BoardSize, Interaction, OverlayState, ShapeList, StrokeColor,
    StrokeDefaults,
};

/// Background, main, freehand ink and preview surfaces, all the same size.
#[derive(Debug, Clone)]
pub struct LayerStack {
    background: Surface,
    main: Surface,
    ink: Surface,
    preview: Surface,
}

impl LayerStack {
    pub fn new(size: BoardSize) -> RenderResult<Self> {
        Ok(Self {
            background: Surface::new(size)?,
            main: Surface::new(size)?,
            ink: Surface::new(size)?,
            preview: Surface::new(size)?,
        })
    }

    pub fn size(&self) -> BoardSize {
        self.main.size()
    }

    pub fn background(&self) -> &Surface {
        &self.background
    }

    pub fn main(&self) -> &Surface {
        &self.main
    }

    pub fn preview(&self) -> &Surface {
        &self.preview
    }

    /// Replace every surface. All pixel content, ink included, is lost.
    pub fn resize(&mut self, size: BoardSize) -> RenderResult<()> {
        *self = Self::new(size)?;
        log::debug!("Layers resized to {}x{}", size.width, size.height);
        Ok(())
    }

    /// Clear main and replay ink then every shape in list order.
    pub fn redraw_main(&mut self, shapes: &ShapeList, renderer: &impl ShapeRenderer) {
        self.main.clear();
        self.main.draw_surface(&self.ink, 1.0);
        for shape in shapes.iter() {
            renderer.render_shape(&mut self.main, shape);
        }
    }

    /// Write freehand ink, then recomposite main.
    pub fn apply_ink(&mut self, op: InkOp, shapes: &ShapeList, renderer: &impl ShapeRenderer) {
        match op {
            InkOp::Segment {
                from,
                to,
                color,
                thickness,
            } => {
                let mut path = kurbo::BezPath::new();
                path.move_to(from);
                path.line_to(to);
                self.ink.stroke(&path, color, thickness);
            }
            InkOp::Erase { center, diameter } => self.ink.erase_disc(center, diameter),
        }
        self.redraw_main(shapes, renderer);
    }

    pub fn clear_ink(&mut self) {
        self.ink.clear();
    }

    /// Draw the in-progress shape, or clear the preview when there is none.
    pub fn redraw_preview(
        &mut self,
        interaction: &Interaction,
        defaults: &StrokeDefaults,
        renderer: &impl ShapeRenderer,
    ) {
        self.preview.clear();
        if let Some((kind, anchor, current)) = interaction.preview() {
            renderer.render_outline(
                &mut self.preview,
                kind,
                anchor,
                current,
                defaults.color,
                defaults.thickness,
            );
        }
    }

    /// Paint the background image at full opacity into its placement rect.
    /// Layer opacity is applied at composition.
    pub fn redraw_background(&mut self, state: &BackgroundState, image: Option<&LoadedImage>) {
        self.background.clear();
        let canvas = self.size().as_size();
        if let (Some(image), Some(rect)) = (image, state.target_rect(canvas)) {
            self.background.draw_image(image, rect, 1.0);
        }
    }

    /// Flatten all layers for display or export.
    ///
    /// `base` fills the result first; `with_preview` includes the live
    /// shape preview. The layers themselves are not modified.
    pub fn compose(&self, frame: &Frame<'_>) -> RenderResult<Surface> {
        let mut out = Surface::new(self.size())?;
        if let Some(base) = frame.base {
            out.fill(base);
        }
        if frame.background.has_image() {
            out.draw_surface(&self.background, frame.background.opacity());
        }
        if let (Some(image), Some(rect)) = (
            frame.overlay_image,
            frame.overlay.target_rect(self.size().as_size()),
        ) {
            out.draw_image(image, rect, frame.overlay.opacity());
        }
        out.draw_surface(&self.main, 1.0);
        if frame.with_preview {
            out.draw_surface(&self.preview, 1.0);
        }
        Ok(out)
    }
}

/// Inputs for [`LayerStack::compose`].
pub struct Frame<'a> {
    pub base: Option<StrokeColor>,
    pub background: &'a BackgroundState,
    pub overlay: &'a OverlayState,
    pub overlay_image: Option<&'a LoadedImage>,
    pub with_preview: bool,
}
