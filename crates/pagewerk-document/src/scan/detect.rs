// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document boundary detection — finds the page quadrilateral in a photo using
// a contour search over Canny edges, falling back to adaptive thresholding.

use image::imageops::FilterType;
use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::{gaussian_blur_f32, separable_filter_equal};
use imageproc::geometry::{approximate_polygon_dp, arc_length, min_area_rect};
use imageproc::morphology::dilate;
use imageproc::point::Point as PixelPoint;
use pagewerk_core::config::DetectorConfig;
use pagewerk_core::geometry::{MIN_QUAD_AREA, Point, Quad};
use tracing::{debug, info, instrument, warn};

use crate::raster::RasterImage;
use crate::scan::engine::{EngineGate, VisionEngine};

/// Radius of the 3x3 square closing applied to both binary masks. Contours
/// of a dilated mask run this far outside the pixels that produced them.
const DILATION_RADIUS: u8 = 1;

/// Share of each side trimmed at both ends before fitting its line, so the
/// rounded corners of a dilated outline do not bend the fit.
const SIDE_TRIM: f64 = 0.2;

/// A detected page boundary in native pixel coordinates, canonically
/// ordered, or `None` when no usable boundary was found.
pub type DetectionResult = Option<Quad>;

/// Which binarization produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Edges,
    Threshold,
}

/// Multi-stage document boundary detector.
///
/// ## Pipeline
///
/// 1. Downscale so the longer side is at most `max_side`
/// 2. Grayscale, Gaussian blur (5x5 equivalent)
/// 3. Stage A: Canny edges, 3x3 dilation, contour search
/// 4. Stage B (only if A found nothing): inverted adaptive Gaussian
///    threshold, 3x3 dilation, the same contour search
/// 5. Scale the winning corners back to native resolution and canonicalize
///
/// The contour search keeps external contours covering at least
/// `min_area_ratio` of the working image, simplifies each with an epsilon of
/// `approx_epsilon_ratio` of its perimeter, and picks the largest
/// four-vertex result, whose corners are then refitted from straight lines
/// through the middle of each side. If none has exactly four vertices, the
/// minimum-area rotated rectangle of the largest contour is used instead,
/// provided that contour also clears `min_area_ratio`.
///
/// Every intermediate buffer is owned by the stage that creates it and is
/// released when that stage returns.
#[derive(Debug, Clone, Default)]
pub struct BoundaryDetector {
    config: DetectorConfig,
}

impl BoundaryDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect the page boundary in `image`.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &RasterImage) -> DetectionResult {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            warn!("Empty image; nothing to detect");
            return None;
        }

        let scale = (self.config.max_side as f32 / width.max(height) as f32).min(1.0);
        let blurred = self.prepare(image, scale);
        debug!(
            scale,
            work_w = blurred.width(),
            work_h = blurred.height(),
            "Working image prepared"
        );

        let (stage, candidate) = match self.edge_stage(&blurred) {
            Some(quad) => (Stage::Edges, quad),
            None => {
                debug!("Edge stage found nothing; trying adaptive threshold");
                let quad = self.threshold_stage(&blurred)?;
                (Stage::Threshold, quad)
            }
        };

        let native = candidate.scaled(1.0 / scale).reordered();
        info!(
            ?stage,
            top_left = ?native.corner(0),
            bottom_right = ?native.corner(2),
            "Document boundary detected"
        );
        Some(native)
    }

    /// Detect, substituting the inset quadrilateral when nothing is found.
    pub fn detect_or_default(&self, image: &RasterImage, inset: f32) -> Quad {
        self.detect(image).unwrap_or_else(|| {
            warn!(inset, "No boundary detected; using default quadrilateral");
            Quad::default_inset(image.width(), image.height(), inset)
        })
    }

    /// Wait for `engine` through `gate`, then detect. An engine that never
    /// becomes ready yields `None`.
    pub async fn detect_when_ready(
        &self,
        gate: &EngineGate,
        engine: &dyn VisionEngine,
        image: &RasterImage,
    ) -> DetectionResult {
        if let Err(err) = gate.wait_ready(engine).await {
            warn!(%err, "Skipping detection");
            return None;
        }
        self.detect(image)
    }

    // -- Stages ---------------------------------------------------------------

    /// Downscale, convert to grayscale, and blur.
    fn prepare(&self, image: &RasterImage, scale: f32) -> GrayImage {
        let source = image.as_dynamic();
        let gray = if scale < 1.0 {
            let w = ((source.width() as f32 * scale).round() as u32).max(1);
            let h = ((source.height() as f32 * scale).round() as u32).max(1);
            source.resize_exact(w, h, FilterType::Triangle).to_luma8()
        } else {
            source.to_luma8()
        };
        gaussian_blur_f32(&gray, self.config.blur_sigma)
    }

    fn edge_stage(&self, blurred: &GrayImage) -> Option<Quad> {
        let edges = canny(blurred, self.config.canny_low, self.config.canny_high);
        let closed = dilate(&edges, Norm::LInf, DILATION_RADIUS);
        drop(edges);
        self.find_page(&closed)
    }

    fn threshold_stage(&self, blurred: &GrayImage) -> Option<Quad> {
        let binary = adaptive_threshold_inv(
            blurred,
            self.config.adaptive_block_size,
            self.config.adaptive_c,
        );
        let closed = dilate(&binary, Norm::LInf, DILATION_RADIUS);
        drop(binary);
        self.find_page(&closed)
    }

    /// Contour search shared by both stages.
    fn find_page(&self, binary: &GrayImage) -> Option<Quad> {
        let contours: Vec<Contour<i32>> = find_contours(binary);
        let min_area =
            binary.width() as f64 * binary.height() as f64 * self.config.min_area_ratio;

        let mut best: Option<(f64, Quad)> = None;
        let mut largest: Option<(f64, &[PixelPoint<i32>])> = None;
        let mut considered = 0usize;

        let external = contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none());
        for contour in external {
            let area = polygon_area(&contour.points);
            if largest.as_ref().is_none_or(|(a, _)| area > *a) {
                largest = Some((area, contour.points.as_slice()));
            }
            if area < min_area || contour.points.len() < 4 {
                continue;
            }
            considered += 1;

            let epsilon = arc_length(&contour.points, true) * self.config.approx_epsilon_ratio;
            if epsilon <= 0.0 {
                continue;
            }
            // Simplification always keeps the first point, so start on a
            // true corner rather than wherever the trace began.
            let outline = start_at_corner(&contour.points);
            let approx = close_polygon(approximate_polygon_dp(&outline, epsilon, true), epsilon);
            if approx.len() != 4 {
                continue;
            }
            let approx_area = polygon_area(&approx);
            if best.as_ref().is_none_or(|(a, _)| approx_area > *a) {
                let quad = refine_sides(&outline, &approx, epsilon)
                    .unwrap_or_else(|| Quad::ordered(to_corners(&approx)));
                best = Some((approx_area, quad));
            }
        }
        debug!(contours = contours.len(), considered, "Contour search complete");

        if let Some((area, quad)) = best {
            debug!(area, "Four-vertex approximation selected");
            return Some(quad);
        }

        let (area, points) = largest?;
        if area < min_area {
            debug!(area, min_area, "Largest contour too small for a page");
            return None;
        }
        let rect = Quad::ordered(min_area_rect(points).map(to_point));
        if rect.area() < MIN_QUAD_AREA {
            debug!(area, "Largest contour is degenerate");
            return None;
        }
        debug!(area, "No four-vertex approximation; using rotated bounding rectangle");
        Some(rect)
    }
}

// -- Helpers ------------------------------------------------------------------

/// Adaptive Gaussian threshold with inverted output.
///
/// Each pixel is compared with the Gaussian-weighted mean of its
/// `block_size` x `block_size` neighbourhood minus `c`; pixels above that
/// threshold become black and the rest white.
fn adaptive_threshold_inv(gray: &GrayImage, block_size: u32, c: i32) -> GrayImage {
    let local_mean = separable_filter_equal(gray, &gaussian_kernel(block_size));

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let threshold = local_mean.get_pixel(x, y).0[0] as i32 - c;
        if gray.get_pixel(x, y).0[0] as i32 > threshold {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}

/// Normalized 1-D Gaussian kernel of `size` taps, with the sigma a kernel of
/// that size gets when none is given.
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1);
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let centre = (size as f32 - 1.0) / 2.0;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - centre;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Rotate a closed outline so it begins at its top-left-most point
/// (smallest `x + y`).
fn start_at_corner(points: &[PixelPoint<i32>]) -> Vec<PixelPoint<i32>> {
    let start = points
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| p.x + p.y)
        .map_or(0, |(i, _)| i);
    let mut rotated = points.to_vec();
    rotated.rotate_left(start);
    rotated
}

/// Replace the four simplified vertices with the intersections of lines
/// fitted to the outline between them.
///
/// Each side's fit skips `SIDE_TRIM` of its points at both ends and is moved
/// `DILATION_RADIUS` towards the middle of the quad, back onto the pixels
/// the mask was grown from. Returns `None` (keep the plain vertices) when a
/// side is too short to fit, two sides are parallel, or a refined corner
/// strays more than `epsilon` from its vertex.
fn refine_sides(
    outline: &[PixelPoint<i32>],
    vertices: &[PixelPoint<i32>],
    epsilon: f64,
) -> Option<Quad> {
    let mut indices = vertices
        .iter()
        .map(|v| outline.iter().position(|p| p == v))
        .collect::<Option<Vec<usize>>>()?;
    indices.sort_unstable();

    let n = outline.len();
    let centre = vertices.iter().fold((0.0, 0.0), |(sx, sy), v| {
        (sx + v.x as f64 / 4.0, sy + v.y as f64 / 4.0)
    });

    let mut lines = [[0.0f64; 4]; 4];
    for side in 0..4 {
        let from = indices[side];
        let to = if side == 3 { indices[0] + n } else { indices[side + 1] };
        let span = to - from;
        let trim = (span as f64 * SIDE_TRIM) as usize;
        let samples: Vec<PixelPoint<i32>> = (from + trim..=to - trim)
            .map(|i| outline[i % n])
            .collect();
        if samples.len() < 2 {
            return None;
        }
        lines[side] = fit_line(&samples, centre, DILATION_RADIUS as f64)?;
    }

    let mut corners = [Point::default(); 4];
    for side in 0..4 {
        let previous = &lines[(side + 3) % 4];
        let (x, y) = intersect_lines(previous, &lines[side])?;
        let vertex = outline[indices[side]];
        if (x - vertex.x as f64).hypot(y - vertex.y as f64) > epsilon {
            return None;
        }
        corners[side] = Point::new(x as f32, y as f32);
    }
    Some(Quad::ordered(corners))
}

/// Total-least-squares line through `samples` as `[px, py, dx, dy]`, shifted
/// `inset` pixels towards `centre`.
fn fit_line(samples: &[PixelPoint<i32>], centre: (f64, f64), inset: f64) -> Option<[f64; 4]> {
    let count = samples.len() as f64;
    let (mut mx, mut my) = (0.0, 0.0);
    for p in samples {
        mx += p.x as f64;
        my += p.y as f64;
    }
    mx /= count;
    my /= count;

    let (mut cxx, mut cxy, mut cyy) = (0.0, 0.0, 0.0);
    for p in samples {
        let (dx, dy) = (p.x as f64 - mx, p.y as f64 - my);
        cxx += dx * dx;
        cxy += dx * dy;
        cyy += dy * dy;
    }
    if cxx + cyy <= 0.0 {
        return None;
    }

    let theta = 0.5 * (2.0 * cxy).atan2(cxx - cyy);
    let (dx, dy) = (theta.cos(), theta.sin());
    let (mut nx, mut ny) = (-dy, dx);
    if nx * (centre.0 - mx) + ny * (centre.1 - my) < 0.0 {
        nx = -nx;
        ny = -ny;
    }
    Some([mx + nx * inset, my + ny * inset, dx, dy])
}

/// Intersection of two `[px, py, dx, dy]` lines; `None` if near-parallel.
fn intersect_lines(a: &[f64; 4], b: &[f64; 4]) -> Option<(f64, f64)> {
    let det = a[2] * b[3] - a[3] * b[2];
    if det.abs() < 1e-3 {
        return None;
    }
    let (ox, oy) = (b[0] - a[0], b[1] - a[1]);
    let t = (ox * b[3] - oy * b[2]) / det;
    Some((a[0] + t * a[2], a[1] + t * a[3]))
}

/// Shoelace area of a closed polygon.
fn polygon_area(points: &[PixelPoint<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0f64;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice_area += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    twice_area.abs() / 2.0
}

/// Drop vertices lying within `epsilon` of the chord joining their
/// neighbours, treating the polygon as closed. Removes the duplicate start
/// vertex an open-chain simplification can leave behind.
fn close_polygon(mut vertices: Vec<PixelPoint<i32>>, epsilon: f64) -> Vec<PixelPoint<i32>> {
    while vertices.len() > 3 {
        let n = vertices.len();
        let flattest = (0..n)
            .map(|i| {
                let prev = vertices[(i + n - 1) % n];
                let next = vertices[(i + 1) % n];
                (i, chord_distance(vertices[i], prev, next))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match flattest {
            Some((index, distance)) if distance < epsilon => {
                vertices.remove(index);
            }
            _ => break,
        }
    }
    vertices
}

/// Distance from `p` to the segment `a`-`b`.
fn chord_distance(p: PixelPoint<i32>, a: PixelPoint<i32>, b: PixelPoint<i32>) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (px - ax).hypot(py - ay);
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
    (px - (ax + t * dx)).hypot(py - (ay + t * dy))
}

fn to_point(p: PixelPoint<i32>) -> Point {
    Point::new(p.x as f32, p.y as f32)
}

fn to_corners(vertices: &[PixelPoint<i32>]) -> [Point; 4] {
    [
        to_point(vertices[0]),
        to_point(vertices[1]),
        to_point(vertices[2]),
        to_point(vertices[3]),
    ]
}
