//! Shape renderer trait and the raster implementation.

use crate::label::LabelFont;
use crate::surface::Surface;
use kurbo::Point;
use thiserror::Error;
use warboard_core::shapes::{Shape, ShapeKind, StrokeColor, label_anchor, outline};

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Glow passes drawn beneath a selected shape: extra width and alpha.
const GLOW_PASSES: [(f64, u8); 2] = [(10.0, 70), (5.0, 150)];

/// Draws shapes onto a surface.
pub trait ShapeRenderer {
    /// Draw a committed shape, with its selection glow and label.
    fn render_shape(&self, surface: &mut Surface, shape: &Shape);

    /// Draw the stroke of an in-progress shape with no label or glow.
    fn render_outline(
        &self,
        surface: &mut Surface,
        kind: ShapeKind,
        start: Point,
        end: Point,
        color: StrokeColor,
        thickness: f64,
    );
}

/// CPU renderer. Labels use the built-in font unless another is given.
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    font: Option<LabelFont>,
}

impl Default for RasterRenderer {
    fn default() -> Self {
        let font = LabelFont::builtin()
            .inspect_err(|e| log::warn!("Built-in label font unavailable: {e}"))
            .ok();
        Self { font }
    }
}

impl RasterRenderer {
    pub fn new(font: Option<LabelFont>) -> Self {
        Self { font }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn render_label(&self, surface: &mut Surface, shape: &Shape) {
        let Some(font) = &self.font else {
            return;
        };
        if shape.label.trim().is_empty() {
            return;
        }
        if let Some(pixmap) = font.rasterize(&shape.label, shape.color) {
            let (x, y) = LabelFont::origin_for(&pixmap, label_anchor(shape));
            surface.draw_pixmap_at(&pixmap, x, y, 1.0);
        }
    }
}

impl ShapeRenderer for RasterRenderer {
    fn render_shape(&self, surface: &mut Surface, shape: &Shape) {
        let path = outline(shape.kind(), shape.start, shape.end);
        if shape.is_selected() {
            let glow = StrokeColor::highlight();
            for (extra, alpha) in GLOW_PASSES {
                let color = StrokeColor::new(glow.r, glow.g, glow.b, alpha);
                surface.stroke(&path, color, shape.thickness + extra);
            }
        }
        surface.stroke(&path, shape.color, shape.thickness);
        self.render_label(surface, shape);
    }

    fn render_outline(
        &self,
        surface: &mut Surface,
        kind: ShapeKind,
        start: Point,
        end: Point,
        color: StrokeColor,
        thickness: f64,
    ) {
        surface.stroke(&outline(kind, start, end), color, thickness);
    }
}
