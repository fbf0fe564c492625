// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Pagewerk.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a page item in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a document group (one future PDF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of content a workspace item holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// A raster photo or scan; the only kind the scan pipeline touches.
    Image,
    /// An already-assembled PDF.
    Pdf,
    /// Anything else the user dropped in.
    Other,
}

impl ItemKind {
    /// Infer the item kind from a file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "tif" | "tiff" | "bmp" | "webp" | "gif" => Self::Image,
            "pdf" => Self::Pdf,
            _ => Self::Other,
        }
    }

    /// Infer the item kind from a file name's extension.
    pub fn from_file_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Other,
        }
    }
}

/// The editing tool active in a correction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    None,
    /// Corner-handle boundary adjustment followed by rectification.
    Crop,
    /// Brightness, contrast, and rotation.
    Adjust,
}

pub const DEFAULT_BRIGHTNESS: u16 = 100;
pub const DEFAULT_CONTRAST: u16 = 100;
pub const MAX_PERCENT: u16 = 200;

/// Brightness/contrast percentages and accumulated rotation.
///
/// 100% is identity for both percentages. Rotation is stored as the running
/// sum of quarter turns; it is reduced modulo 360 only when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementParams {
    pub brightness: u16,
    pub contrast: u16,
    pub rotation_degrees: i32,
}

impl Default for EnhancementParams {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            contrast: DEFAULT_CONTRAST,
            rotation_degrees: 0,
        }
    }
}

impl EnhancementParams {
    /// Set brightness, clamped to [0, 200].
    pub fn with_brightness(mut self, percent: u16) -> Self {
        self.brightness = percent.min(MAX_PERCENT);
        self
    }

    /// Set contrast, clamped to [0, 200].
    pub fn with_contrast(mut self, percent: u16) -> Self {
        self.contrast = percent.min(MAX_PERCENT);
        self
    }

    /// Add a signed number of quarter turns (positive is clockwise).
    pub fn rotate_quarter_turns(mut self, turns: i32) -> Self {
        self.rotation_degrees = self.rotation_degrees.saturating_add(turns.saturating_mul(90));
        self
    }

    /// Rotation reduced to [0, 360).
    pub fn normalized_rotation(&self) -> u32 {
        self.rotation_degrees.rem_euclid(360) as u32
    }

    /// True when every field still holds its default value.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_clamp_to_range() {
        let params = EnhancementParams::default().with_brightness(350).with_contrast(200);
        assert_eq!(params.brightness, 200);
        assert_eq!(params.contrast, 200);
    }

    #[test]
    fn rotation_accumulates_without_reset() {
        let mut params = EnhancementParams::default();
        for _ in 0..4 {
            params = params.rotate_quarter_turns(1);
        }
        assert_eq!(params.rotation_degrees, 360);
        assert_eq!(params.normalized_rotation(), 0);
        assert!(!params.is_default());

        let params = EnhancementParams::default().rotate_quarter_turns(-1);
        assert_eq!(params.normalized_rotation(), 270);
    }

    #[test]
    fn item_kind_from_name() {
        assert_eq!(ItemKind::from_file_name("scan.JPG"), ItemKind::Image);
        assert_eq!(ItemKind::from_file_name("book.pdf"), ItemKind::Pdf);
        assert_eq!(ItemKind::from_file_name("notes.txt"), ItemKind::Other);
        assert_eq!(ItemKind::from_file_name("README"), ItemKind::Other);
    }
}
