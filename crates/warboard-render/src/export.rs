//! Flattened PNG export of the whiteboard.

use crate::image::LoadedImage;
use crate::layers::{Frame, LayerStack};
use crate::renderer::RendererError;
use crate::surface::Surface;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;
use warboard_core::{BackgroundState, OverlayState, StrokeColor};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to encode PNG: {0}")]
    Encode(String),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Render(#[from] RendererError),
}

/// Composite the layers over white, without the live preview.
pub fn flatten(
    layers: &LayerStack,
    background: &BackgroundState,
    overlay: &OverlayState,
    overlay_image: Option<&LoadedImage>,
) -> Result<Surface, ExportError> {
    let surface = layers.compose(&Frame {
        base: Some(StrokeColor::white()),
        background,
        overlay,
        overlay_image,
        with_preview: false,
    })?;
    Ok(surface)
}

/// Encode a surface as 8-bit RGBA PNG.
pub fn encode_png(surface: &Surface) -> Result<Vec<u8>, ExportError> {
    let rgba = surface.to_rgba8();
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

/// `strategy-plan-YYYY-MM-DD.png`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("strategy-plan-{}.png", date.format("%Y-%m-%d"))
}

/// Export file name for today's local date.
pub fn export_file_name_today() -> String {
    export_file_name(chrono::Local::now().date_naive())
}

/// Write PNG bytes under `dir`, returning the full path.
pub fn write_png(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    log::info!("Exported {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
