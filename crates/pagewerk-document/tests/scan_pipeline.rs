// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end scenarios: detection, rectification, and batch autocrop with
// undo over a multi-group workspace.

use std::cell::Cell;

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use pagewerk_core::config::{EngineConfig, ScanConfig};
use pagewerk_core::error::Result;
use pagewerk_core::geometry::{Point, Quad};
use pagewerk_core::types::ItemKind;
use pagewerk_document::{
    AutoCrop, BoundaryDetector, EngineGate, PageItem, PageTransform, RasterImage, VisionEngine,
    Workspace, rectify,
};

/// White rectangle `(x0, y0)..(x1, y1)` on black.
fn page_on_black(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> RasterImage {
    let img = GrayImage::from_fn(w, h, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    RasterImage::from_dynamic(DynamicImage::ImageLuma8(img))
}

fn assert_near(actual: Point, expected: (f32, f32), tolerance: f32) {
    assert!(
        (actual.x - expected.0).abs() <= tolerance && (actual.y - expected.1).abs() <= tolerance,
        "expected ~{expected:?}, got {actual:?}"
    );
}

#[test]
fn white_page_on_black_is_detected_and_rectified() {
    let image = page_on_black(1000, 800, 100, 80, 900, 720);
    let quad = BoundaryDetector::default()
        .detect(&image)
        .expect("page should be detected");

    let [tl, tr, br, bl] = quad.corners();
    assert_near(tl, (100.0, 80.0), 2.0);
    assert_near(tr, (900.0, 80.0), 2.0);
    assert_near(br, (900.0, 720.0), 2.0);
    assert_near(bl, (100.0, 720.0), 2.0);

    let out = rectify(&image, &quad).unwrap();
    assert_eq!(out.dimensions(), quad.target_size());
    let (w, h) = out.dimensions();
    assert!((w as i64 - 800).abs() <= 2, "width {w}");
    assert!((h as i64 - 640).abs() <= 2, "height {h}");

    let exact = Quad::from_corners([
        Point::new(100.0, 80.0),
        Point::new(900.0, 80.0),
        Point::new(900.0, 720.0),
        Point::new(100.0, 720.0),
    ]);
    assert_eq!(rectify(&image, &exact).unwrap().dimensions(), (800, 640));
}

#[test]
fn uniform_gray_falls_back_to_inset_quad() {
    let image = RasterImage::from_dynamic(DynamicImage::ImageLuma8(GrayImage::from_pixel(
        640,
        480,
        Luma([128u8]),
    )));
    let detector = BoundaryDetector::default();
    assert!(detector.detect(&image).is_none());

    let quad = detector.detect_or_default(&image, 0.1);
    let [tl, tr, br, bl] = quad.corners();
    assert_eq!(tl, Point::new(64.0, 48.0));
    assert_eq!(tr, Point::new(576.0, 48.0));
    assert_eq!(br, Point::new(576.0, 432.0));
    assert_eq!(bl, Point::new(64.0, 432.0));
}

struct NeverReady;

impl VisionEngine for NeverReady {
    fn name(&self) -> &str {
        "never"
    }

    fn is_ready(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn unavailable_engine_resolves_to_none() {
    let image = page_on_black(300, 200, 30, 20, 270, 180);
    let gate = EngineGate::new(&EngineConfig {
        poll_interval_ms: 1,
        max_attempts: 3,
    });
    let detector = BoundaryDetector::default();

    assert!(detector.detect_when_ready(&gate, &NeverReady, &image).await.is_none());
    assert!(
        detector
            .detect_when_ready(&gate, &pagewerk_document::LocalEngine, &image)
            .await
            .is_some()
    );
}

/// Autocrop that counts how many pages it was asked to process.
struct CountingAutoCrop {
    inner: AutoCrop,
    calls: Cell<usize>,
}

impl PageTransform for CountingAutoCrop {
    fn name(&self) -> &str {
        "counting-autocrop"
    }

    fn apply(&self, image: &RasterImage) -> Result<RasterImage> {
        self.calls.set(self.calls.get() + 1);
        self.inner.apply(image)
    }
}

fn photo_png(w: u32, h: u32, inset: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(w, h, |x, y| {
        if x >= inset && x < w - inset && y >= inset && y < h - inset {
            Rgb([245, 245, 240])
        } else {
            Rgb([25, 20, 30])
        }
    });
    RasterImage::from_dynamic(DynamicImage::ImageRgb8(img))
        .encode_png()
        .unwrap()
}

#[test]
fn batch_autocrop_skips_non_images_and_undo_restores_urls() {
    let mut ws = Workspace::new();
    let first = ws.add_group("Chapter 1");
    let second = ws.add_group("Chapter 2");
    let untouched = ws.add_group("Appendix");

    let p1 = ws.add_item(first, PageItem::new("p1.png", photo_png(200, 160, 20))).unwrap();
    let notes = ws
        .add_item(first, PageItem::new("notes.txt", b"remember the index".to_vec()))
        .unwrap();
    let p2 = ws.add_item(second, PageItem::new("p2.png", photo_png(180, 240, 30))).unwrap();
    let p3 = ws.add_item(second, PageItem::new("p3.jpg", photo_png(220, 150, 15))).unwrap();
    let appendix = ws
        .add_item(untouched, PageItem::new("a1.png", photo_png(100, 100, 10)))
        .unwrap();

    assert_eq!(ws.item(notes).unwrap().kind, ItemKind::Other);
    let urls_before: Vec<String> = [p1, notes, p2, p3, appendix]
        .iter()
        .map(|id| ws.item(*id).unwrap().url.clone())
        .collect();

    let transform = CountingAutoCrop {
        inner: AutoCrop::new(&ScanConfig::default()),
        calls: Cell::new(0),
    };
    let report = ws.run_batch(&[first, second], &transform);

    assert_eq!(transform.calls.get(), 3);
    assert_eq!(report.processed, vec![p1, p2, p3]);
    assert_eq!(report.skipped, vec![notes]);
    assert!(report.is_clean());
    assert!(report.finished_at >= report.started_at);

    for id in [p1, p2, p3] {
        let idx = [p1, notes, p2, p3, appendix].iter().position(|x| *x == id).unwrap();
        assert_ne!(ws.item(id).unwrap().url, urls_before[idx]);
    }
    assert_eq!(ws.item(notes).unwrap().url, urls_before[1]);
    assert_eq!(ws.item(appendix).unwrap().url, urls_before[4]);

    // The cropped page is smaller than the photo it came from.
    let cropped = RasterImage::decode(ws.item(p1).unwrap().bytes()).unwrap();
    assert!(cropped.width() < 200 && cropped.height() < 160);

    ws.undo().unwrap();
    let urls_after: Vec<String> = [p1, notes, p2, p3, appendix]
        .iter()
        .map(|id| ws.item(*id).unwrap().url.clone())
        .collect();
    assert_eq!(urls_after, urls_before);
    assert!(!ws.can_undo());
}
