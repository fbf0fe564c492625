// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — document boundary detection, vision engine readiness,
// and perspective rectification.

pub mod detect;
pub mod engine;
pub mod rectify;

pub use detect::{BoundaryDetector, DetectionResult};
pub use engine::{EngineGate, LocalEngine, VisionEngine};
pub use rectify::{Rectifier, rectify, warp_perspective};
