// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancement stage — applies `EnhancementParams` to a page image.

use pagewerk_core::types::EnhancementParams;
use tracing::{info, instrument};

use crate::adjust::processor::ImageProcessor;
use crate::raster::RasterImage;

/// Apply brightness, then contrast, then the accumulated rotation reduced
/// modulo 360. Returns a new image; `image` is not modified.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn enhance(image: &RasterImage, params: &EnhancementParams) -> RasterImage {
    info!(
        brightness = params.brightness,
        contrast = params.contrast,
        rotation = params.normalized_rotation(),
        "Applying enhancement"
    );
    ImageProcessor::from_raster(image)
        .brightness(params.brightness)
        .contrast(params.contrast)
        .rotate(params.normalized_rotation() as f32)
        .into_raster()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn page() -> RasterImage {
        RasterImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_fn(40, 25, |x, y| {
            Rgb([(x * 6) as u8, (y * 9) as u8, 60])
        })))
    }

    #[test]
    fn default_params_are_identity() {
        let image = page();
        assert_eq!(enhance(&image, &EnhancementParams::default()), image);
    }

    #[test]
    fn full_turn_restores_dimensions_and_pixels() {
        let image = page();
        let params = EnhancementParams::default()
            .rotate_quarter_turns(1)
            .rotate_quarter_turns(1)
            .rotate_quarter_turns(1)
            .rotate_quarter_turns(1);
        assert_eq!(params.rotation_degrees, 360);

        let out = enhance(&image, &params);
        assert_eq!(out.dimensions(), (40, 25));
        assert_eq!(out, image);
    }

    #[test]
    fn rotation_is_applied_after_tone() {
        let params = EnhancementParams::default()
            .with_brightness(50)
            .rotate_quarter_turns(-1);
        let out = enhance(&page(), &params);
        assert_eq!(out.dimensions(), (25, 40));

        let rgba = out.as_dynamic().to_rgba8();
        // Counter-clockwise: source (39, 0) lands at (0, 0).
        assert_eq!(rgba.get_pixel(0, 0).0, [117, 0, 30, 255]);
    }
}
