// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster images — an owned, immutable pixel buffer with its dimensions and
// channel layout. Every pipeline stage produces a new `RasterImage`.

use image::{DynamicImage, ImageFormat};
use pagewerk_core::error::{Result, ScanError};
use tracing::{debug, instrument};

/// Channel layout of a raster buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
    /// 16-bit or floating-point layouts.
    Other,
}

/// A decoded page image at native resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    image: DynamicImage,
}

impl RasterImage {
    /// Decode encoded bytes (JPEG, PNG, TIFF, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data)
            .map_err(|err| ScanError::DecodeFailure(format!("failed to decode image: {err}")))?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn layout(&self) -> ChannelLayout {
        match &self.image {
            DynamicImage::ImageLuma8(_) => ChannelLayout::Luma,
            DynamicImage::ImageLumaA8(_) => ChannelLayout::LumaAlpha,
            DynamicImage::ImageRgb8(_) => ChannelLayout::Rgb,
            DynamicImage::ImageRgba8(_) => ChannelLayout::Rgba,
            _ => ChannelLayout::Other,
        }
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the raster and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ScanError::ImageError(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(image: DynamicImage) -> Self {
        Self::from_dynamic(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn garbage_bytes_are_a_decode_failure() {
        let err = RasterImage::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ScanError::DecodeFailure(_)));
    }

    #[test]
    fn png_encoding_preserves_pixels() {
        let img = RgbImage::from_fn(7, 5, |x, y| Rgb([x as u8 * 30, y as u8 * 40, 9]));
        let raster = RasterImage::from_dynamic(DynamicImage::ImageRgb8(img));
        let bytes = raster.encode_png().unwrap();

        let decoded = RasterImage::decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (7, 5));
        assert_eq!(decoded.layout(), ChannelLayout::Rgb);
        assert_eq!(decoded, raster);
    }
}
