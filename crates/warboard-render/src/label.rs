//! Shape label rasterization with `ab_glyph`.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use kurbo::Point;
use std::path::Path;
use thiserror::Error;
use tiny_skia::{Pixmap, PremultipliedColorU8};
use warboard_core::StrokeColor;

/// Label text height in pixels.
pub const LABEL_PX: f32 = 12.0;

/// Width of the white outline around label glyphs.
pub const LABEL_OUTLINE: i32 = 3;

static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

#[derive(Debug, Error)]
pub enum LabelFontError {
    #[error("Could not read font {0}: {1}")]
    Read(String, std::io::Error),
    #[error("Invalid font data")]
    Invalid,
}

/// Font used for shape labels.
#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
    scale: PxScale,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont").field("px", &self.scale.y).finish()
    }
}

impl LabelFont {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, LabelFontError> {
        let font = FontArc::try_from_vec(data).map_err(|_| LabelFontError::Invalid)?;
        Ok(Self {
            font,
            scale: PxScale::from(LABEL_PX),
        })
    }

    /// The font built into the renderer.
    pub fn builtin() -> Result<Self, LabelFontError> {
        let font = FontArc::try_from_slice(DEJAVU_SANS).map_err(|_| LabelFontError::Invalid)?;
        Ok(Self {
            font,
            scale: PxScale::from(LABEL_PX),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LabelFontError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| LabelFontError::Read(path.display().to_string(), e))?;
        let font = Self::from_bytes(data)?;
        log::info!("Loaded label font {}", path.display());
        Ok(font)
    }

    /// Coverage mask of `text`, padded for the outline. Returns the mask,
    /// its width and height.
    fn coverage(&self, text: &str) -> Option<(Vec<f32>, usize, usize)> {
        let scaled = self.font.as_scaled(self.scale);
        let pad = LABEL_OUTLINE + 1;

        let mut caret = 0.0f32;
        let mut glyphs = Vec::new();
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(
                self.scale,
                point(caret + pad as f32, pad as f32 + scaled.ascent()),
            ));
            caret += scaled.h_advance(id);
            prev = Some(id);
        }

        let width = caret.ceil() as usize + 2 * pad as usize;
        let height = (scaled.ascent() - scaled.descent()).ceil() as usize + 2 * pad as usize;
        if caret <= 0.0 || width == 0 || height == 0 {
            return None;
        }

        let mut mask = vec![0.0f32; width * height];
        for glyph in glyphs {
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let x = bounds.min.x as i64 + i64::from(gx);
                let y = bounds.min.y as i64 + i64::from(gy);
                if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                    return;
                }
                let idx = y as usize * width + x as usize;
                mask[idx] = mask[idx].max(c.clamp(0.0, 1.0));
            });
        }
        Some((mask, width, height))
    }

    /// Render `text` in `color` over a white outline.
    pub fn rasterize(&self, text: &str, color: StrokeColor) -> Option<Pixmap> {
        let (mask, width, height) = self.coverage(text)?;
        let halo = dilate(&mask, width, height, LABEL_OUTLINE);
        let mut pixmap = Pixmap::new(width as u32, height as u32)?;

        let text_alpha = f32::from(color.a) / 255.0;
        for (i, px) in pixmap.pixels_mut().iter_mut().enumerate() {
            let a_text = mask[i] * text_alpha;
            let a_halo = halo[i] * (1.0 - a_text);
            let a = a_text + a_halo;
            if a <= 0.0 {
                continue;
            }
            let channel = |c: u8| f32::from(c) * a_text + 255.0 * a_halo;
            let alpha = (a * 255.0).round().clamp(0.0, 255.0) as u8;
            let premul = |c: u8| (channel(c).round().clamp(0.0, 255.0) as u8).min(alpha);
            if let Some(c) =
                PremultipliedColorU8::from_rgba(premul(color.r), premul(color.g), premul(color.b), alpha)
            {
                *px = c;
            }
        }
        Some(pixmap)
    }

    /// Top-left pixel at which a label pixmap is centred on `anchor`.
    pub fn origin_for(pixmap: &Pixmap, anchor: Point) -> (i32, i32) {
        (
            (anchor.x - f64::from(pixmap.width()) / 2.0).round() as i32,
            (anchor.y - f64::from(pixmap.height()) / 2.0).round() as i32,
        )
    }
}

/// Max-filter `mask` over a disc of `radius` pixels.
fn dilate(mask: &[f32], width: usize, height: usize, radius: i32) -> Vec<f32> {
    let offsets: Vec<(i32, i32)> = (-radius..=radius)
        .flat_map(|dy| (-radius..=radius).map(move |dx| (dx, dy)))
        .filter(|(dx, dy)| dx * dx + dy * dy <= radius * radius)
        .collect();
    let mut out = vec![0.0f32; mask.len()];
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let mut best = 0.0f32;
            for (dx, dy) in &offsets {
                let (sx, sy) = (x + dx, y + dy);
                if sx < 0 || sy < 0 || sx >= width as i32 || sy >= height as i32 {
                    continue;
                }
                best = best.max(mask[sy as usize * width + sx as usize]);
            }
            out[y as usize * width + x as usize] = best;
        }
    }
    out
}
