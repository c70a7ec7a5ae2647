use std::path::Path;

use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::RenderError;

/// A decoded RGBA8 image with non-zero dimensions.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    /// Decodes an encoded image (PNG, JPEG, GIF, ...) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, RenderError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_dynamic(image)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let image = image::open(path)?;
        Self::from_dynamic(image)
    }

    pub fn from_dynamic(image: DynamicImage) -> Result<Self, RenderError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }
        Ok(Self { pixels: image.into_rgba8() })
    }

    /// Wraps a raw RGBA buffer. The buffer must hold exactly `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }
        let pixels = RgbaImage::from_raw(width, height, data)
            .ok_or(RenderError::BufferSize { width, height })?;
        Ok(Self { pixels })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_buffers_are_invalid() {
        let err = SourceImage::from_rgba(0, 4, Vec::new()).unwrap_err();
        assert!(matches!(err, RenderError::EmptyImage { width: 0, height: 4 }));
        assert_eq!(err.kind(), crate::ErrorKind::InvalidImage);
    }

    #[test]
    fn short_buffer_is_invalid() {
        let err = SourceImage::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidImage);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = SourceImage::decode(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidImage);
    }

    #[test]
    fn decodes_png_bytes() {
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::new(3, 2))
            .write_to(&mut bytes, image::ImageOutputFormat::Png)
            .unwrap();

        let image = SourceImage::decode(bytes.get_ref()).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
    }
}
