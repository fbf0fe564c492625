// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewerk-editor — Interactive correction of a single page.
//
// A `CorrectionSession` lives from the moment the editor opens a page until
// it is saved or closed. It owns the working quadrilateral, the enhancement
// parameters, the viewport, and any in-progress drag, and turns pointer and
// zoom events into native-pixel edits.

pub mod session;
pub mod viewport;

pub use session::{CorrectionSession, DragSession, DragState, PanSession, PointerInput, SaveOutcome};
pub use viewport::{ScreenPoint, ViewportState};
