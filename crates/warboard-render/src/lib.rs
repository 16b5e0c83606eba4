//! Warboard Render Library
//!
//! CPU rasterization of the whiteboard: layer surfaces, shape and label
//! drawing, image compositing and flattened PNG export. Drawing goes
//! through `tiny-skia`.

mod export;
mod image;
mod label;
mod layers;
mod renderer;
mod surface;

pub use export::{
    ExportError, encode_png, export_file_name, export_file_name_today, flatten, write_png,
};
pub use self::image::{ImageError, LoadedImage};
pub use label::{LABEL_OUTLINE, LABEL_PX, LabelFont, LabelFontError};
pub use layers::{Frame, LayerStack};
pub use renderer::{RasterRenderer, RenderResult, RendererError, ShapeRenderer};
pub use surface::{Surface, to_skia_path};
