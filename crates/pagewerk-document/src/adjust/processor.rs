// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — percentage brightness/contrast and rotation onto a canvas
// that grows to fit. Operates on in-memory images using the `image` and
// `imageproc` crates.

use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, info, instrument};

use crate::raster::RasterImage;

/// Fill for canvas regions a rotation leaves uncovered.
pub const ROTATION_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Image processing pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor` wrapping the
/// transformed image, enabling method chaining.
///
/// ```ignore
/// let page = ImageProcessor::from_raster(&raster)
///     .brightness(120)
///     .contrast(90)
///     .rotate(90.0)
///     .into_raster();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Start from a copy of `raster`.
    pub fn from_raster(raster: &RasterImage) -> Self {
        Self {
            image: raster.as_dynamic().clone(),
        }
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    pub fn into_raster(self) -> RasterImage {
        RasterImage::from_dynamic(self.image)
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Scale every colour channel by `percent` / 100. 100 is the identity.
    #[instrument(skip(self), fields(percent))]
    pub fn brightness(self, percent: u16) -> Self {
        if percent == 100 {
            return self;
        }
        info!(percent, "Adjusting brightness");
        let factor = percent as f32 / 100.0;
        self.map_channels(|channel| channel as f32 * factor)
    }

    /// Stretch every colour channel about mid-grey by `percent` / 100.
    /// 100 is the identity; 0 collapses the image to flat grey.
    #[instrument(skip(self), fields(percent))]
    pub fn contrast(self, percent: u16) -> Self {
        if percent == 100 {
            return self;
        }
        info!(percent, "Adjusting contrast");
        let factor = percent as f32 / 100.0;
        self.map_channels(|channel| (channel as f32 - 127.5) * factor + 127.5)
    }

    /// Rotate clockwise by `degrees`, growing the canvas to the rotated
    /// image's axis-aligned bounding box so nothing is cropped.
    ///
    /// Quarter turns are lossless. Other angles resample bilinearly onto a
    /// canvas of `w|cos| + h|sin|` by `w|sin| + h|cos|`, centred, with the
    /// uncovered corners filled white.
    #[instrument(skip(self), fields(degrees))]
    pub fn rotate(self, degrees: f32) -> Self {
        let normalised = degrees.rem_euclid(360.0);
        if normalised.abs() < 0.01 || (normalised - 360.0).abs() < 0.01 {
            return self;
        }
        info!(degrees = normalised, "Rotating image");

        if (normalised - 90.0).abs() < 0.01 {
            return Self {
                image: self.image.rotate90(),
            };
        }
        if (normalised - 180.0).abs() < 0.01 {
            return Self {
                image: self.image.rotate180(),
            };
        }
        if (normalised - 270.0).abs() < 0.01 {
            return Self {
                image: self.image.rotate270(),
            };
        }

        let (w, h) = (self.image.width() as f32, self.image.height() as f32);
        let theta = normalised.to_radians();
        let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
        let new_w = (w * cos + h * sin).round().max(1.0) as u32;
        let new_h = (w * sin + h * cos).round().max(1.0) as u32;

        let projection = Projection::translate(new_w as f32 / 2.0, new_h as f32 / 2.0)
            * Projection::rotate(theta)
            * Projection::translate(-w / 2.0, -h / 2.0);

        let rgba = self.image.to_rgba8();
        let mut canvas = RgbaImage::new(new_w, new_h);
        warp_into(
            &rgba,
            &projection,
            Interpolation::Bilinear,
            ROTATION_BACKGROUND,
            &mut canvas,
        );

        debug!(new_w, new_h, "General rotation applied");
        Self {
            image: DynamicImage::ImageRgba8(canvas),
        }
    }

    /// Apply `f` to the colour channels of every pixel, rounding and clamping
    /// the result. Alpha is left untouched.
    fn map_channels(self, f: impl Fn(u8) -> f32) -> Self {
        let rgba = self.image.to_rgba8();
        let adjust = |channel: u8| -> u8 { f(channel).round().clamp(0.0, 255.0) as u8 };

        let mapped = ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            Rgba([adjust(r), adjust(g), adjust(b), a])
        });
        Self {
            image: DynamicImage::ImageRgba8(mapped),
        }
    }
}
