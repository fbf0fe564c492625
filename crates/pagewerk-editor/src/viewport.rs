// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Viewport — zoom and scroll, plus conversions between screen space and
// native pixel space. The viewport never changes native coordinates.

use pagewerk_core::config::EditorConfig;
use pagewerk_core::geometry::Point;
use serde::{Deserialize, Serialize};

/// A position or displacement in screen pixels, relative to the displayed
/// image's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn minus(&self, other: &ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(self.x - other.x, self.y - other.y)
    }

    pub fn distance(&self, other: &ScreenPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Display zoom and scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: f32,
    pub scroll: ScreenPoint,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            scroll: ScreenPoint::default(),
        }
    }
}

impl ViewportState {
    /// Move zoom by `steps` increments of `zoom_step`, clamped to the
    /// configured range. Rounded to hundredths so repeated steps don't drift.
    pub fn zoom_by(&mut self, steps: i32, config: &EditorConfig) {
        let target = self.zoom + steps as f32 * config.zoom_step;
        let clamped = target.clamp(config.zoom_min, config.zoom_max);
        self.zoom = (clamped * 100.0).round() / 100.0;
    }
}

/// Native → screen scale: `displayed_width / natural_width`.
pub fn screen_scale(displayed_width: f32, natural_width: f32) -> f32 {
    displayed_width / natural_width
}

/// Where a native-pixel point appears on screen at the given display width.
pub fn native_to_screen(point: Point, displayed_width: f32, natural_width: f32) -> ScreenPoint {
    let scale = screen_scale(displayed_width, natural_width);
    ScreenPoint::new(point.x * scale, point.y * scale)
}

/// Convert a screen displacement to a native-pixel displacement using the
/// inverse ratio `natural_width / displayed_width`.
pub fn screen_delta_to_native(delta: ScreenPoint, displayed_width: f32, natural_width: f32) -> Point {
    let inverse = natural_width / displayed_width;
    Point::new(delta.x * inverse, delta.y * inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_steps_clamp_to_range() {
        let config = EditorConfig::default();
        let mut viewport = ViewportState::default();

        viewport.zoom_by(1, &config);
        assert_eq!(viewport.zoom, 1.2);

        viewport.zoom_by(-100, &config);
        assert_eq!(viewport.zoom, 0.2);

        viewport.zoom_by(1000, &config);
        assert_eq!(viewport.zoom, 5.0);
    }

    #[test]
    fn repeated_steps_do_not_drift() {
        let config = EditorConfig::default();
        let mut viewport = ViewportState::default();
        for _ in 0..7 {
            viewport.zoom_by(1, &config);
        }
        for _ in 0..7 {
            viewport.zoom_by(-1, &config);
        }
        assert_eq!(viewport.zoom, 1.0);
    }

    #[test]
    fn conversions_are_inverse() {
        let p = Point::new(400.0, 300.0);
        let on_screen = native_to_screen(p, 500.0, 1000.0);
        assert_eq!(on_screen, ScreenPoint::new(200.0, 150.0));

        let back = screen_delta_to_native(on_screen, 500.0, 1000.0);
        assert_eq!(back, p);
    }
}
