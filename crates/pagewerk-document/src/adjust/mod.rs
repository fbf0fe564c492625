// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adjustment stage — brightness/contrast percentages and quarter-turn rotation
// with canvas growth.

pub mod enhance;
pub mod processor;

pub use enhance::enhance;
pub use processor::ImageProcessor;
