// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — warps a quadrilateral region of a page photo
// into an upright rectangle.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use pagewerk_core::config::RectifierConfig;
use pagewerk_core::error::{Result, ScanError};
use pagewerk_core::geometry::{Homography, Quad};
use tracing::{debug, info, instrument, warn};

use crate::raster::RasterImage;

/// Warp `image` through `homography` (source → destination) into a new
/// `out_width` x `out_height` image.
///
/// Each destination pixel is mapped back through the inverse transform and
/// sampled bilinearly. Samples falling outside the source take a constant
/// border: black for grey and RGB sources, transparent for everything else.
pub fn warp_perspective(
    image: &RasterImage,
    homography: &Homography,
    out_width: u32,
    out_height: u32,
) -> Result<RasterImage> {
    let projection = Projection::from_matrix(homography.matrix_f32()).ok_or_else(|| {
        ScanError::GeometryDegenerate("homography is not invertible".into())
    })?;

    let warped = match image.as_dynamic() {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = GrayImage::new(out_width, out_height);
            warp_into(gray, &projection, Interpolation::Bilinear, Luma([0]), &mut out);
            DynamicImage::ImageLuma8(out)
        }
        DynamicImage::ImageRgb8(rgb) => {
            let mut out = RgbImage::new(out_width, out_height);
            warp_into(rgb, &projection, Interpolation::Bilinear, Rgb([0, 0, 0]), &mut out);
            DynamicImage::ImageRgb8(out)
        }
        other => {
            let rgba = other.to_rgba8();
            let mut out = RgbaImage::new(out_width, out_height);
            warp_into(&rgba, &projection, Interpolation::Bilinear, Rgba([0, 0, 0, 0]), &mut out);
            DynamicImage::ImageRgba8(out)
        }
    };

    Ok(RasterImage::from_dynamic(warped))
}

/// Rectifies page quadrilaterals into upright rectangles.
#[derive(Debug, Clone, Default)]
pub struct Rectifier {
    config: RectifierConfig,
}

impl Rectifier {
    pub fn new(config: RectifierConfig) -> Self {
        Self { config }
    }

    /// Warp the region bounded by `quad` into an upright rectangle.
    ///
    /// The quad is re-canonicalized first, so corner order does not matter.
    /// The output is `target_size()` of the quad: the longer of each pair of
    /// opposite edges, rounded, at least 1x1.
    ///
    /// A degenerate quad (no area, or a collapsed axis) is refused and the
    /// input is returned unchanged. The only error is an output larger than
    /// `max_output_pixels`.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn rectify(&self, image: &RasterImage, quad: &Quad) -> Result<RasterImage> {
        let quad = quad.reordered();
        if quad.is_degenerate() {
            warn!(area = quad.area(), "Degenerate quadrilateral; returning input unchanged");
            return Ok(image.clone());
        }

        let (out_w, out_h) = quad.target_size();
        let pixels = out_w as u64 * out_h as u64;
        if pixels > self.config.max_output_pixels {
            return Err(ScanError::OutputTooLarge {
                width: out_w,
                height: out_h,
                limit: self.config.max_output_pixels,
            });
        }

        let dest = Quad::full_frame(out_w, out_h);
        let Some(homography) = Homography::from_quads(&quad, &dest) else {
            warn!("Singular quadrilateral correspondence; returning input unchanged");
            return Ok(image.clone());
        };
        debug!(matrix = ?homography.matrix(), "Homography solved");

        match warp_perspective(image, &homography, out_w, out_h) {
            Ok(warped) => {
                info!(out_w, out_h, "Perspective rectification applied");
                Ok(warped)
            }
            Err(ScanError::GeometryDegenerate(detail)) => {
                warn!(%detail, "Cannot warp; returning input unchanged");
                Ok(image.clone())
            }
            Err(err) => Err(err),
        }
    }
}

/// Rectify with the default output limit.
pub fn rectify(image: &RasterImage, quad: &Quad) -> Result<RasterImage> {
    Rectifier::default().rectify(image, quad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewerk_core::geometry::Point;

    fn checker(w: u32, h: u32) -> RasterImage {
        RasterImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            if (x / 10 + y / 10) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })))
    }

    #[test]
    fn output_matches_target_size() {
        let image = checker(400, 300);
        let quad = Quad::from_corners([
            Point::new(20.0, 30.0),
            Point::new(370.0, 10.0),
            Point::new(390.0, 280.0),
            Point::new(40.0, 260.0),
        ]);
        let out = rectify(&image, &quad).unwrap();
        assert_eq!(out.dimensions(), quad.target_size());
    }

    #[test]
    fn corner_order_does_not_matter() {
        let image = checker(200, 200);
        let corners = [
            Point::new(10.0, 12.0),
            Point::new(180.0, 20.0),
            Point::new(170.0, 190.0),
            Point::new(15.0, 175.0),
        ];
        let shuffled = [corners[2], corners[0], corners[3], corners[1]];
        let a = rectify(&image, &Quad::from_corners(corners)).unwrap();
        let b = rectify(&image, &Quad::from_corners(shuffled)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn axis_aligned_quad_is_a_crop() {
        let image = checker(100, 100);
        let quad = Quad::from_corners([
            Point::new(20.0, 20.0),
            Point::new(60.0, 20.0),
            Point::new(60.0, 50.0),
            Point::new(20.0, 50.0),
        ]);
        let out = rectify(&image, &quad).unwrap();
        assert_eq!(out.dimensions(), (40, 30));

        let src = image.as_dynamic().to_rgb8();
        let dst = out.as_dynamic().to_rgb8();
        // Interior of a checker square, away from the bilinear seams.
        assert_eq!(dst.get_pixel(5, 5), src.get_pixel(25, 25));
        assert_eq!(dst.get_pixel(15, 5), src.get_pixel(35, 25));
    }

    #[test]
    fn degenerate_quad_returns_input() {
        let image = checker(50, 50);
        let quad = Quad::from_corners([
            Point::new(10.0, 10.0),
            Point::new(40.0, 10.0),
            Point::new(40.0, 10.0),
            Point::new(10.0, 10.0),
        ]);
        let out = rectify(&image, &quad).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn oversized_output_is_refused() {
        let image = checker(20, 20);
        let rectifier = Rectifier::new(RectifierConfig {
            max_output_pixels: 100,
        });
        let err = rectifier
            .rectify(&image, &Quad::full_frame(20, 20))
            .unwrap_err();
        assert!(matches!(err, ScanError::OutputTooLarge { width: 20, height: 20, .. }));
    }
}
