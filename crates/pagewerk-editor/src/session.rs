// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Correction session — tool selection, corner dragging, panning, zoom, and the
// save decision for one page being edited.

use pagewerk_core::config::{EditorConfig, ScanConfig};
use pagewerk_core::error::Result;
use pagewerk_core::geometry::{Point, Quad};
use pagewerk_core::types::{EnhancementParams, Tool};
use pagewerk_document::{BoundaryDetector, RasterImage, Rectifier, enhance};
use tracing::{debug, info, instrument, warn};

use crate::viewport::{ScreenPoint, ViewportState, native_to_screen, screen_delta_to_native};

/// A pointer event in screen space.
///
/// `displayed_width` is the width the image is laid out at when the event
/// fires; every conversion uses it rather than a cached ratio so a zoom in the
/// middle of a drag is honoured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub position: ScreenPoint,
    pub displayed_width: f32,
}

impl PointerInput {
    pub fn new(x: f32, y: f32, displayed_width: f32) -> Self {
        Self {
            position: ScreenPoint::new(x, y),
            displayed_width,
        }
    }
}

/// A corner drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Index into the quad, `[TL, TR, BR, BL]` order.
    pub corner: usize,
    pub start: ScreenPoint,
    /// The whole quad as it was on pointer-down.
    pub snapshot: Quad,
}

/// A pan in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSession {
    pub start: ScreenPoint,
    pub scroll_snapshot: ScreenPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingCorner(DragSession),
    Panning(PanSession),
}

/// What a save produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The crop quad was rectified; enhancement was not applied.
    Rectified(RasterImage),
    /// Enhancement parameters were applied.
    Enhanced(RasterImage),
    /// The crop quad had collapsed, so nothing was rectified. The page passes
    /// through and pending enhancement is still dropped.
    CropRefused(RasterImage),
    /// Nothing to apply; the image passes through.
    Unchanged(RasterImage),
}

impl SaveOutcome {
    pub fn image(&self) -> &RasterImage {
        match self {
            Self::Rectified(image)
            | Self::Enhanced(image)
            | Self::CropRefused(image)
            | Self::Unchanged(image) => image,
        }
    }

    pub fn into_image(self) -> RasterImage {
        match self {
            Self::Rectified(image)
            | Self::Enhanced(image)
            | Self::CropRefused(image)
            | Self::Unchanged(image) => image,
        }
    }
}

/// Editing state for one page, from editor open to save or close.
pub struct CorrectionSession {
    image: RasterImage,
    editor: EditorConfig,
    detector: BoundaryDetector,
    rectifier: Rectifier,
    tool: Tool,
    drag: DragState,
    quad: Option<Quad>,
    params: EnhancementParams,
    viewport: ViewportState,
    pan_modifier: bool,
}

impl CorrectionSession {
    /// Open an editor on `image`.
    pub fn open(image: RasterImage, config: &ScanConfig) -> Self {
        info!(width = image.width(), height = image.height(), "Correction session opened");
        Self {
            image,
            editor: config.editor.clone(),
            detector: BoundaryDetector::new(config.detector.clone()),
            rectifier: Rectifier::new(config.rectifier.clone()),
            tool: Tool::None,
            drag: DragState::Idle,
            quad: None,
            params: EnhancementParams::default(),
            viewport: ViewportState::default(),
            pan_modifier: false,
        }
    }

    // -- Observable state -----------------------------------------------------

    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn quad(&self) -> Option<&Quad> {
        self.quad.as_ref()
    }

    pub fn params(&self) -> &EnhancementParams {
        &self.params
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    // -- Tools ----------------------------------------------------------------

    /// Switch tools. Entering crop without a quad runs detection, falling back
    /// to the inset default.
    pub fn select_tool(&mut self, tool: Tool) {
        debug!(?tool, "Tool selected");
        self.tool = tool;
        self.drag = DragState::Idle;
        if tool == Tool::Crop && self.quad.is_none() {
            self.quad = Some(
                self.detector
                    .detect_or_default(&self.image, self.editor.default_inset),
            );
        }
    }

    /// Replace the working quad, e.g. with one restored by the host.
    pub fn set_quad(&mut self, quad: Quad) {
        self.quad = Some(quad);
    }

    /// Hold or release the pan modifier (space bar).
    pub fn set_pan_modifier(&mut self, held: bool) {
        self.pan_modifier = held;
    }

    // -- Pointer events -------------------------------------------------------

    /// Start a corner drag or a pan, depending on the tool and modifier.
    pub fn on_pointer_down(&mut self, input: PointerInput) {
        if !self.layout_usable(input.displayed_width) {
            return;
        }

        if self.tool == Tool::Crop && !self.pan_modifier {
            if let Some(corner) = self.hit_corner(input) {
                if let Some(snapshot) = self.quad {
                    debug!(corner, "Corner drag started");
                    self.drag = DragState::DraggingCorner(DragSession {
                        corner,
                        start: input.position,
                        snapshot,
                    });
                }
                return;
            }
        }

        if self.tool == Tool::None || self.pan_modifier {
            debug!("Pan started");
            self.drag = DragState::Panning(PanSession {
                start: input.position,
                scroll_snapshot: self.viewport.scroll,
            });
        }
    }

    /// Continue the active drag or pan.
    pub fn on_pointer_move(&mut self, input: PointerInput) {
        match self.drag {
            DragState::Idle => {}
            DragState::DraggingCorner(session) => {
                if !self.layout_usable(input.displayed_width) {
                    return;
                }
                let (natural_w, natural_h) = self.natural_size();
                let delta = screen_delta_to_native(
                    input.position.minus(&session.start),
                    input.displayed_width,
                    natural_w,
                );
                let origin = session.snapshot.corner(session.corner);
                let moved = Point::new(origin.x + delta.x, origin.y + delta.y)
                    .clamped(natural_w, natural_h);
                if let Some(quad) = self.quad.as_mut() {
                    quad.set_corner(session.corner, moved);
                }
            }
            DragState::Panning(session) => {
                let delta = input.position.minus(&session.start);
                self.viewport.scroll = session.scroll_snapshot.minus(&delta);
            }
        }
    }

    /// End the active drag or pan.
    pub fn on_pointer_up(&mut self) {
        if self.drag != DragState::Idle {
            debug!("Pointer released");
        }
        self.drag = DragState::Idle;
    }

    /// Which corner handle, if any, lies under the pointer.
    ///
    /// The pick radius is divided by zoom so the tolerance stays constant in
    /// on-screen pixels. The first matching handle wins.
    fn hit_corner(&self, input: PointerInput) -> Option<usize> {
        let quad = self.quad.as_ref()?;
        let (natural_w, _) = self.natural_size();
        let radius = self.editor.pick_radius / self.viewport.zoom;
        quad.corners().iter().position(|corner| {
            native_to_screen(*corner, input.displayed_width, natural_w).distance(&input.position)
                <= radius
        })
    }

    fn natural_size(&self) -> (f32, f32) {
        (self.image.width() as f32, self.image.height() as f32)
    }

    fn layout_usable(&self, displayed_width: f32) -> bool {
        displayed_width > 0.0 && self.image.width() > 0
    }

    // -- Zoom -----------------------------------------------------------------

    /// Zoom by whole steps; positive zooms in.
    pub fn on_zoom_change(&mut self, steps: i32) {
        self.viewport.zoom_by(steps, &self.editor);
        debug!(zoom = self.viewport.zoom, "Zoom changed");
    }

    pub fn zoom_in(&mut self) {
        self.on_zoom_change(1);
    }

    pub fn zoom_out(&mut self) {
        self.on_zoom_change(-1);
    }

    // -- Enhancement ----------------------------------------------------------

    pub fn set_brightness(&mut self, percent: u16) {
        self.params = self.params.with_brightness(percent);
    }

    pub fn set_contrast(&mut self, percent: u16) {
        self.params = self.params.with_contrast(percent);
    }

    pub fn rotate_right(&mut self) {
        self.params = self.params.rotate_quarter_turns(1);
    }

    pub fn rotate_left(&mut self) {
        self.params = self.params.rotate_quarter_turns(-1);
    }

    pub fn reset_enhancements(&mut self) {
        self.params = EnhancementParams::default();
    }

    // -- Teardown -------------------------------------------------------------

    /// Apply the session and close it.
    ///
    /// With the crop tool active and a quad present, the page is rectified and
    /// any pending enhancement is dropped; a collapsed quad is reported as
    /// [`SaveOutcome::CropRefused`]. Otherwise non-default enhancement
    /// parameters are applied. Otherwise the image passes through unchanged.
    #[instrument(skip(self), fields(tool = ?self.tool))]
    pub fn save(self) -> Result<SaveOutcome> {
        if self.tool == Tool::Crop {
            if let Some(quad) = self.quad {
                if quad.reordered().is_degenerate() {
                    warn!(area = quad.reordered().area(), "Crop quad has collapsed; page left as is");
                    return Ok(SaveOutcome::CropRefused(self.image));
                }
                info!("Saving rectified page");
                return self
                    .rectifier
                    .rectify(&self.image, &quad)
                    .map(SaveOutcome::Rectified);
            }
        }
        if !self.params.is_default() {
            info!("Saving enhanced page");
            return Ok(SaveOutcome::Enhanced(enhance(&self.image, &self.params)));
        }
        info!("Nothing to apply");
        Ok(SaveOutcome::Unchanged(self.image))
    }

    /// Close without applying anything.
    pub fn close(self) -> RasterImage {
        info!("Correction session closed");
        self.image
    }
}
