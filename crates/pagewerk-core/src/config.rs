// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration — detector thresholds, engine readiness polling, editor
// interaction constants, and rectifier limits.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Complete tuning surface for the scan pipeline and editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub detector: DetectorConfig,
    pub engine: EngineConfig,
    pub editor: EditorConfig,
    pub rectifier: RectifierConfig,
}

/// Boundary detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Longer side of the working image, in pixels.
    pub max_side: u32,
    /// Gaussian sigma; 1.1 matches a 5x5 kernel with automatic sigma.
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Minimum contour area as a fraction of the working image area.
    pub min_area_ratio: f64,
    /// Polygon approximation epsilon as a fraction of contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Adaptive threshold neighbourhood: taps of the Gaussian kernel along
    /// each axis (odd). Sigma is derived from it.
    pub adaptive_block_size: u32,
    /// Constant subtracted from the local Gaussian mean.
    pub adaptive_c: i32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_side: 800,
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
            min_area_ratio: 0.01,
            approx_epsilon_ratio: 0.02,
            adaptive_block_size: 11,
            adaptive_c: 2,
        }
    }
}

/// Vision engine readiness polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            max_attempts: 300,
        }
    }
}

/// Interactive correction constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Corner pick radius in screen pixels.
    pub pick_radius: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    /// Inset of the fallback quadrilateral, as a fraction of each side.
    pub default_inset: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pick_radius: 25.0,
            zoom_min: 0.2,
            zoom_max: 5.0,
            zoom_step: 0.2,
            default_inset: 0.10,
        }
    }
}

/// Rectifier output limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifierConfig {
    /// Largest output buffer, in pixels, the rectifier will allocate.
    pub max_output_pixels: u64,
}

impl Default for RectifierConfig {
    fn default() -> Self {
        Self {
            max_output_pixels: 100_000_000,
        }
    }
}

impl ScanConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detector;
        if d.max_side == 0 {
            return Err(ScanError::Config("detector.max_side must be positive".into()));
        }
        if d.blur_sigma <= 0.0 {
            return Err(ScanError::Config("detector.blur_sigma must be positive".into()));
        }
        if d.canny_low < 0.0 || d.canny_low > d.canny_high {
            return Err(ScanError::Config(format!(
                "detector canny thresholds out of order: low {} high {}",
                d.canny_low, d.canny_high
            )));
        }
        if !(0.0..1.0).contains(&d.min_area_ratio) {
            return Err(ScanError::Config("detector.min_area_ratio must be in [0, 1)".into()));
        }
        if d.approx_epsilon_ratio <= 0.0 {
            return Err(ScanError::Config(
                "detector.approx_epsilon_ratio must be positive".into(),
            ));
        }
        if d.adaptive_block_size < 3 || d.adaptive_block_size % 2 == 0 {
            return Err(ScanError::Config(format!(
                "detector.adaptive_block_size must be odd and >= 3, got {}",
                d.adaptive_block_size
            )));
        }

        if self.engine.max_attempts == 0 {
            return Err(ScanError::Config("engine.max_attempts must be positive".into()));
        }

        let e = &self.editor;
        if e.pick_radius <= 0.0 {
            return Err(ScanError::Config("editor.pick_radius must be positive".into()));
        }
        if e.zoom_min <= 0.0 || e.zoom_min > e.zoom_max {
            return Err(ScanError::Config(format!(
                "editor zoom bounds out of order: min {} max {}",
                e.zoom_min, e.zoom_max
            )));
        }
        if e.zoom_step <= 0.0 {
            return Err(ScanError::Config("editor.zoom_step must be positive".into()));
        }
        if !(0.0..0.5).contains(&e.default_inset) {
            return Err(ScanError::Config("editor.default_inset must be in [0, 0.5)".into()));
        }

        if self.rectifier.max_output_pixels == 0 {
            return Err(ScanError::Config(
                "rectifier.max_output_pixels must be positive".into(),
            ));
        }
        Ok(())
    }
}
