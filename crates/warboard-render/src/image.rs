//! Decoded background and overlay images.

use kurbo::Size;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tiny_skia::{ColorU8, IntSize, Pixmap};

/// Why an image could not be used.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Could not read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not decode image: {0}")]
    Decode(String),
    #[error("Image has no pixels")]
    Empty,
}

/// A decoded image, premultiplied and ready to composite.
#[derive(Clone)]
pub struct LoadedImage {
    pixmap: Pixmap,
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl LoadedImage {
    /// Decode any format the `image` crate was built with.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        let decoded =
            ::image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let size = IntSize::from_wh(width, height).ok_or(ImageError::Empty)?;

        let mut data = Vec::with_capacity(rgba.as_raw().len());
        for px in rgba.pixels() {
            let [r, g, b, a] = px.0;
            let p = ColorU8::from_rgba(r, g, b, a).premultiply();
            data.extend_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
        }
        let pixmap = Pixmap::from_vec(data, size)
            .ok_or_else(|| ImageError::Decode("pixel buffer size mismatch".to_string()))?;
        Ok(Self { pixmap })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn native_size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Solid-colour PNG of the given size.
    pub(crate) fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let pixels: Vec<u8> = (0..width * height).flat_map(|_| rgba).collect();
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&pixels).unwrap();
        }
        out
    }

    #[test]
    fn test_decode_png() {
        let image = LoadedImage::decode(&png_bytes(8, 4, [0, 128, 255, 255])).unwrap();
        assert_eq!(image.native_size(), Size::new(8.0, 4.0));
        let p = image.pixmap().pixel(3, 2).unwrap().demultiply();
        assert_eq!((p.red(), p.green(), p.blue()), (0, 128, 255));
    }

    #[test]
    fn test_decode_premultiplies() {
        let image = LoadedImage::decode(&png_bytes(1, 1, [255, 0, 0, 128])).unwrap();
        let p = image.pixmap().pixel(0, 0).unwrap();
        assert_eq!(p.alpha(), 128);
        assert!(p.red() <= 128);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(
            LoadedImage::decode(b"definitely not an image"),
            Err(ImageError::Decode(_))
        ));
        assert!(matches!(LoadedImage::decode(&[]), Err(ImageError::Empty)));
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            LoadedImage::open("/no/such/map.png"),
            Err(ImageError::Read { .. })
        ));
    }
}
