// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry kernel — points, quadrilaterals in canonical corner order, target
// dimensions for rectification, and the exact four-point homography solve.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Quadrilaterals with less area than this (in square pixels) cannot be
/// rectified.
pub const MIN_QUAD_AREA: f32 = 1.0;

/// A point in native (unscaled) image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Clamp both coordinates into `[0, width] x [0, height]`.
    pub fn clamped(&self, width: f32, height: f32) -> Self {
        Self {
            x: self.x.clamp(0.0, width),
            y: self.y.clamp(0.0, height),
        }
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Index of each corner inside a canonical [`Quad`].
pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_RIGHT: usize = 2;
pub const BOTTOM_LEFT: usize = 3;

/// Four corners, canonically `[TL, TR, BR, BL]`.
///
/// [`Quad::ordered`] is the canonicalizing constructor. Corners edited
/// individually via [`Quad::set_corner`] may leave the order non-canonical;
/// consumers that need the invariant re-order first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    corners: [Point; 4],
}

impl Quad {
    /// Canonicalize four points into `[TL, TR, BR, BL]`.
    ///
    /// The two points with the smallest y form the top pair, sorted by x
    /// ascending; the remaining two form the bottom pair, sorted by x
    /// descending. All sorts are stable, so ties keep their input order.
    pub fn ordered(points: [Point; 4]) -> Self {
        let mut by_y = points;
        by_y.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal));

        let mut top = [by_y[0], by_y[1]];
        let mut bottom = [by_y[2], by_y[3]];
        top.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        bottom.sort_by(|a, b| b.x.partial_cmp(&a.x).unwrap_or(Ordering::Equal));

        Self {
            corners: [top[0], top[1], bottom[0], bottom[1]],
        }
    }

    /// Wrap four points without re-ordering them.
    pub const fn from_corners(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// The fallback quadrilateral inset by `inset` of each side, e.g. 0.1 gives
    /// corners at 10% and 90% of the width and height.
    pub fn default_inset(width: u32, height: u32, inset: f32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let (x0, x1) = (w * inset, w * (1.0 - inset));
        let (y0, y1) = (h * inset, h * (1.0 - inset));
        Self {
            corners: [
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ],
        }
    }

    /// The image rectangle `(0,0)..(width,height)`.
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::default_inset(width, height, 0.0)
    }

    pub fn corners(&self) -> [Point; 4] {
        self.corners
    }

    pub fn corner(&self, index: usize) -> Point {
        self.corners[index]
    }

    /// Replace a single corner, leaving the other three untouched.
    pub fn set_corner(&mut self, index: usize, point: Point) {
        self.corners[index] = point;
    }

    /// Re-canonicalize; a no-op on an already canonical quad.
    pub fn reordered(&self) -> Self {
        Self::ordered(self.corners)
    }

    /// Multiply every coordinate by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            corners: self.corners.map(|p| p.scaled(factor)),
        }
    }

    /// Unsigned polygon area via the shoelace formula.
    pub fn area(&self) -> f32 {
        let mut twice_area = 0.0f32;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            twice_area += a.x * b.y - b.x * a.y;
        }
        twice_area.abs() / 2.0
    }

    /// Output size of a rectification, before rounding:
    /// the longer of each pair of opposite edges.
    pub fn target_extent(&self) -> (f32, f32) {
        let [tl, tr, br, bl] = self.corners;
        let width = tl.distance(&tr).max(bl.distance(&br));
        let height = tl.distance(&bl).max(tr.distance(&br));
        (width, height)
    }

    /// Rounded output size of a rectification, each side at least 1.
    pub fn target_size(&self) -> (u32, u32) {
        let (width, height) = self.target_extent();
        (
            width.round().max(1.0) as u32,
            height.round().max(1.0) as u32,
        )
    }

    /// True when the quad encloses (almost) no area or collapses an axis.
    pub fn is_degenerate(&self) -> bool {
        let (width, height) = self.target_extent();
        !(self.area() >= MIN_QUAD_AREA && width >= 1.0 && height >= 1.0)
    }
}

/// A 3x3 planar projective transform, row-major, normalized so `h[8] == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: [f64; 9],
}

impl Homography {
    /// Solve the homography mapping each `src` corner exactly onto the
    /// matching `dst` corner.
    ///
    /// Sets up the standard 8x8 system with `h33 = 1` and solves it by
    /// Gauss-Jordan elimination with partial pivoting. Returns `None` when the
    /// correspondence is singular (three collinear points, repeated points).
    pub fn from_quads(src: &Quad, dst: &Quad) -> Option<Self> {
        let mut system = [[0.0f64; 9]; 8];
        for i in 0..4 {
            let (x, y) = (src.corners[i].x as f64, src.corners[i].y as f64);
            let (u, v) = (dst.corners[i].x as f64, dst.corners[i].y as f64);
            system[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y, u];
            system[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y, v];
        }

        let coeffs = solve_linear_8(system)?;
        let mut matrix = [1.0f64; 9];
        matrix[..8].copy_from_slice(&coeffs);
        Some(Self { matrix })
    }

    pub fn matrix(&self) -> [f64; 9] {
        self.matrix
    }

    /// The matrix in `f32`, row-major, for raster backends.
    pub fn matrix_f32(&self) -> [f32; 9] {
        self.matrix.map(|v| v as f32)
    }
}

/// Solve an 8x8 augmented system `[A | b]` in place.
fn solve_linear_8(mut system: [[f64; 9]; 8]) -> Option<[f64; 8]> {
    for col in 0..8 {
        let pivot = (col..8).max_by(|&a, &b| {
            system[a][col]
                .abs()
                .partial_cmp(&system[b][col].abs())
                .unwrap_or(Ordering::Equal)
        })?;
        if system[pivot][col].abs() < 1e-10 {
            return None;
        }
        system.swap(col, pivot);

        let lead = system[col][col];
        for entry in system[col].iter_mut() {
            *entry /= lead;
        }
        for row in 0..8 {
            if row == col {
                continue;
            }
            let factor = system[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..9 {
                system[row][k] -= factor * system[col][k];
            }
        }
    }

    let mut solution = [0.0f64; 8];
    for (i, value) in solution.iter_mut().enumerate() {
        *value = system[i][8];
    }
    Some(solution)
}
