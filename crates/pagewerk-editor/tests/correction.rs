// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor scenarios: corner drags, zoom, and what a save produces.

use image::{DynamicImage, Rgb, RgbImage};
use pagewerk_core::config::ScanConfig;
use pagewerk_core::geometry::{Point, Quad};
use pagewerk_core::types::{EnhancementParams, Tool};
use pagewerk_document::{RasterImage, enhance, rectify};
use pagewerk_editor::{CorrectionSession, DragState, PointerInput, SaveOutcome};

const W: u32 = 400;
const H: u32 = 300;

fn gradient() -> RasterImage {
    let img = RgbImage::from_fn(W, H, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    RasterImage::from_dynamic(DynamicImage::ImageRgb8(img))
}

fn crop_session() -> CorrectionSession {
    let mut session = CorrectionSession::open(gradient(), &ScanConfig::default());
    session.set_quad(Quad::default_inset(W, H, 0.1));
    session.select_tool(Tool::Crop);
    session
}

/// Drag `corner` from its handle by a screen delta at the given display width.
fn drag(session: &mut CorrectionSession, corner: usize, dx: f32, dy: f32, displayed: f32) {
    let scale = displayed / W as f32;
    let handle = session.quad().unwrap().corner(corner);
    let start = PointerInput::new(handle.x * scale, handle.y * scale, displayed);
    session.on_pointer_down(start);
    assert!(
        matches!(session.drag_state(), DragState::DraggingCorner(d) if d.corner == corner),
        "corner {corner} was not picked"
    );
    session.on_pointer_move(PointerInput::new(
        start.position.x + dx,
        start.position.y + dy,
        displayed,
    ));
    session.on_pointer_up();
}

#[test]
fn corners_dragged_off_image_clamp_to_bounds() {
    let mut session = crop_session();
    drag(&mut session, 0, -5000.0, -5000.0, 800.0);
    drag(&mut session, 1, 5000.0, -5000.0, 800.0);
    drag(&mut session, 2, 5000.0, 5000.0, 800.0);
    drag(&mut session, 3, -5000.0, 5000.0, 800.0);

    let quad = session.quad().unwrap();
    assert_eq!(
        quad.corners(),
        [
            Point::new(0.0, 0.0),
            Point::new(W as f32, 0.0),
            Point::new(W as f32, H as f32),
            Point::new(0.0, H as f32),
        ]
    );
}

#[test]
fn drag_moves_only_the_grabbed_corner() {
    let mut session = crop_session();
    let before = *session.quad().unwrap();

    // Displayed at half size: 10 screen px is 20 native px.
    drag(&mut session, 2, 10.0, -5.0, 200.0);

    let after = session.quad().unwrap();
    let expected = Point::new(before.corner(2).x + 20.0, before.corner(2).y - 10.0);
    assert_eq!(after.corner(2), expected);
    for i in [0, 1, 3] {
        assert_eq!(after.corner(i), before.corner(i));
    }
}

#[test]
fn zoom_leaves_native_quad_alone() {
    let mut session = crop_session();
    let before = *session.quad().unwrap();
    session.zoom_in();
    session.zoom_in();
    session.zoom_out();
    assert_eq!(session.viewport().zoom, 1.2);
    assert_eq!(*session.quad().unwrap(), before);
}

#[test]
fn save_with_crop_rectifies_and_drops_enhancement() {
    let quad = Quad::from_corners([
        Point::new(40.0, 30.0),
        Point::new(360.0, 45.0),
        Point::new(350.0, 270.0),
        Point::new(50.0, 260.0),
    ]);
    let mut session = crop_session();
    session.set_quad(quad);
    session.set_brightness(150);

    let expected = rectify(&gradient(), &quad).unwrap();
    match session.save().unwrap() {
        SaveOutcome::Rectified(image) => assert_eq!(image, expected),
        other => panic!("expected a rectified page, got {other:?}"),
    }
}

#[test]
fn save_with_collapsed_quad_reports_refused_crop() {
    let mut session = crop_session();
    // Pull every handle onto the centre of the page.
    drag(&mut session, 0, 160.0, 120.0, 400.0);
    drag(&mut session, 1, -160.0, 120.0, 400.0);
    drag(&mut session, 2, -160.0, -120.0, 400.0);
    drag(&mut session, 3, 160.0, -120.0, 400.0);
    assert!(session.quad().unwrap().is_degenerate());
    session.set_brightness(150);

    assert_eq!(session.save().unwrap(), SaveOutcome::CropRefused(gradient()));
}

#[test]
fn save_without_crop_applies_enhancement() {
    let mut session = CorrectionSession::open(gradient(), &ScanConfig::default());
    session.select_tool(Tool::Adjust);
    session.set_contrast(130);
    session.rotate_right();

    let params = EnhancementParams::default()
        .with_contrast(130)
        .rotate_quarter_turns(1);
    let expected = enhance(&gradient(), &params);

    let outcome = session.save().unwrap();
    assert!(matches!(outcome, SaveOutcome::Enhanced(_)));
    assert_eq!(outcome.image().dimensions(), (H, W));
    assert_eq!(outcome.into_image(), expected);
}

#[test]
fn save_with_nothing_pending_passes_through() {
    let mut session = CorrectionSession::open(gradient(), &ScanConfig::default());
    session.set_brightness(180);
    session.reset_enhancements();
    assert_eq!(session.save().unwrap(), SaveOutcome::Unchanged(gradient()));
}

#[test]
fn close_returns_the_original() {
    let mut session = crop_session();
    drag(&mut session, 0, 30.0, 30.0, 400.0);
    assert_eq!(session.close(), gradient());
}
