// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewerk-document — Page image processing for Pagewerk.
//
// Provides the document boundary detector (Canny and adaptive-threshold
// contour search), the perspective rectifier, the brightness/contrast/rotation
// enhancement stage, and sequential batch processing over a document workspace
// with single-level undo.

pub mod adjust;
pub mod batch;
pub mod raster;
pub mod scan;

// Re-export the primary entry points so callers can use
// `pagewerk_document::rectify` etc.
pub use adjust::enhance::enhance;
pub use adjust::processor::ImageProcessor;
pub use batch::{
    AutoCrop, BatchReport, DocumentGroup, Enhance, ItemFailure, PageItem, PageTransform, Workspace,
    content_url,
};
pub use raster::{ChannelLayout, RasterImage};
pub use scan::detect::{BoundaryDetector, DetectionResult};
pub use scan::engine::{EngineGate, LocalEngine, VisionEngine};
pub use scan::rectify::{Rectifier, rectify, warp_perspective};
