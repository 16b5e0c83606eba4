//! CPU raster surfaces backed by `tiny-skia` pixmaps.

use crate::image::LoadedImage;
use crate::renderer::{RenderResult, RendererError};
use kurbo::{BezPath, PathEl, Point, Rect};
use tiny_skia::{
    BlendMode, Color, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    PixmapPaint, Stroke, Transform,
};
use warboard_core::{BoardSize, StrokeColor};

/// One layer's pixels. Dimensions are always at least 1x1.
#[derive(Clone)]
pub struct Surface {
    pixmap: Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Surface {
    /// Transparent surface of the given size.
    pub fn new(size: BoardSize) -> RenderResult<Self> {
        let pixmap = Pixmap::new(size.width.max(1), size.height.max(1)).ok_or_else(|| {
            RendererError::Surface(format!("cannot allocate {}x{}", size.width, size.height))
        })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn size(&self) -> BoardSize {
        BoardSize::new(self.width(), self.height())
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    pub fn fill(&mut self, color: StrokeColor) {
        self.pixmap
            .fill(Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    /// Stroke with round caps and joins, source-over.
    pub fn stroke(&mut self, path: &BezPath, color: StrokeColor, width: f64) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: width.max(0.0) as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Clear a filled disc (destination-out).
    pub fn erase_disc(&mut self, center: Point, diameter: f64) {
        let radius = (diameter / 2.0).max(0.5) as f32;
        let Some(disc) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;
        paint.blend_mode = BlendMode::DestinationOut;
        self.pixmap
            .fill_path(&disc, &paint, FillRule::Winding, Transform::identity(), None);
    }

    /// Composite another surface of any size at the origin.
    pub fn draw_surface(&mut self, other: &Surface, opacity: f64) {
        self.draw_pixmap_at(&other.pixmap, 0, 0, opacity);
    }

    pub(crate) fn draw_pixmap_at(&mut self, pixmap: &Pixmap, x: i32, y: i32, opacity: f64) {
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            quality: FilterQuality::Nearest,
            ..Default::default()
        };
        self.pixmap
            .draw_pixmap(x, y, pixmap.as_ref(), &paint, Transform::identity(), None);
    }

    /// Draw an image stretched into `target`.
    pub fn draw_image(&mut self, image: &LoadedImage, target: Rect, opacity: f64) {
        let source = image.pixmap();
        if target.width() <= 0.0 || target.height() <= 0.0 {
            return;
        }
        let sx = target.width() / f64::from(source.width());
        let sy = target.height() / f64::from(source.height());
        let transform = Transform::from_row(
            sx as f32,
            0.0,
            0.0,
            sy as f32,
            target.x0 as f32,
            target.y0 as f32,
        );
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }

    /// Any pixel with non-zero alpha.
    pub fn has_content(&self) -> bool {
        self.pixmap.pixels().iter().any(|p| p.alpha() > 0)
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Straight-alpha RGBA8 rows, as PNG expects.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }
}

/// Convert a kurbo path into a tiny-skia path. Empty paths yield `None`.
pub fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}
