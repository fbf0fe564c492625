// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document workspace and batch page processing.
//
// A workspace holds document groups (one future PDF each) of page items.
// Batch operations walk the selected groups strictly in order, one page at a
// time, and never stop because one page failed. Each batch first snapshots
// the whole workspace so it can be undone in a single step.

use chrono::{DateTime, Utc};
use pagewerk_core::config::ScanConfig;
use pagewerk_core::error::{Result, ScanError};
use pagewerk_core::human_errors::{HumanError, humanize_error};
use pagewerk_core::types::{EnhancementParams, GroupId, ItemId, ItemKind};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use crate::adjust::enhance::enhance;
use crate::raster::RasterImage;
use crate::scan::detect::BoundaryDetector;
use crate::scan::rectify::Rectifier;

/// Content-addressed locator for page bytes: `mem://sha256/<hex>`.
pub fn content_url(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("mem://sha256/{}", hex::encode(hasher.finalize()))
}

/// One file in a document group.
#[derive(Debug, Clone, PartialEq)]
pub struct PageItem {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    /// Locator of the current content; changes whenever the content does.
    pub url: String,
    bytes: Vec<u8>,
}

impl PageItem {
    /// Create an item, inferring its kind from the file name.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            id: ItemId::new(),
            kind: ItemKind::from_file_name(&name),
            url: content_url(&bytes),
            name,
            bytes,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Swap in new encoded content and re-derive the URL.
    pub fn replace_content(&mut self, bytes: Vec<u8>) {
        self.url = content_url(&bytes);
        self.bytes = bytes;
    }
}

/// An ordered set of pages destined for one PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentGroup {
    pub id: GroupId,
    pub name: String,
    pub items: Vec<PageItem>,
}

/// A per-page operation a batch applies to every image item.
pub trait PageTransform {
    /// Operation name for logs and reports.
    fn name(&self) -> &str;

    fn apply(&self, image: &RasterImage) -> Result<RasterImage>;
}

/// Detect the page boundary (or fall back to the inset default) and rectify.
#[derive(Debug, Clone, Default)]
pub struct AutoCrop {
    detector: BoundaryDetector,
    rectifier: Rectifier,
    inset: f32,
}

impl AutoCrop {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            detector: BoundaryDetector::new(config.detector.clone()),
            rectifier: Rectifier::new(config.rectifier.clone()),
            inset: config.editor.default_inset,
        }
    }
}

impl PageTransform for AutoCrop {
    fn name(&self) -> &str {
        "autocrop"
    }

    fn apply(&self, image: &RasterImage) -> Result<RasterImage> {
        let quad = self.detector.detect_or_default(image, self.inset);
        self.rectifier.rectify(image, &quad)
    }
}

/// Apply fixed enhancement parameters.
#[derive(Debug, Clone, Default)]
pub struct Enhance {
    pub params: EnhancementParams,
}

impl PageTransform for Enhance {
    fn name(&self) -> &str {
        "enhance"
    }

    fn apply(&self, image: &RasterImage) -> Result<RasterImage> {
        Ok(enhance(image, &self.params))
    }
}

/// A page a batch could not process.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub item_id: ItemId,
    pub item_name: String,
    /// User-facing explanation naming the item.
    pub error: HumanError,
}

/// Outcome of one batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub operation: String,
    pub processed: Vec<ItemId>,
    /// Non-image items left untouched.
    pub skipped: Vec<ItemId>,
    pub failed: Vec<ItemFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Document groups plus the single-level undo snapshot.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    groups: Vec<DocumentGroup>,
    undo_snapshot: Option<Vec<DocumentGroup>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Groups and items -----------------------------------------------------

    pub fn add_group(&mut self, name: impl Into<String>) -> GroupId {
        let id = GroupId::new();
        self.groups.push(DocumentGroup {
            id,
            name: name.into(),
            items: Vec::new(),
        });
        id
    }

    pub fn add_item(&mut self, group: GroupId, item: PageItem) -> Result<ItemId> {
        let target = self
            .groups
            .iter_mut()
            .find(|g| g.id == group)
            .ok_or_else(|| ScanError::UnknownItem(format!("group {group}")))?;
        let id = item.id;
        target.items.push(item);
        Ok(id)
    }

    pub fn groups(&self) -> &[DocumentGroup] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&DocumentGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&PageItem> {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter())
            .find(|item| item.id == id)
    }

    /// Replace one item's content, e.g. with an editor save.
    pub fn replace_item_content(&mut self, id: ItemId, bytes: Vec<u8>) -> Result<()> {
        let item = self
            .groups
            .iter_mut()
            .flat_map(|g| g.items.iter_mut())
            .find(|item| item.id == id)
            .ok_or_else(|| ScanError::UnknownItem(id.to_string()))?;
        item.replace_content(bytes);
        Ok(())
    }

    // -- Batch operations -----------------------------------------------------

    /// Detect and rectify every image page in the selected groups.
    pub fn batch_autocrop(&mut self, selected: &[GroupId], config: &ScanConfig) -> BatchReport {
        self.run_batch(selected, &AutoCrop::new(config))
    }

    /// Apply `params` to every image page in the selected groups.
    pub fn batch_enhance(&mut self, selected: &[GroupId], params: EnhancementParams) -> BatchReport {
        self.run_batch(selected, &Enhance { params })
    }

    /// Apply `transform` to every image page in the selected groups.
    ///
    /// Pages are processed one at a time in group order. Non-image items are
    /// skipped. A page that fails (undecodable bytes, refused output) is
    /// recorded in the report and left unchanged; the batch continues.
    #[instrument(skip(self, transform), fields(operation = transform.name(), groups = selected.len()))]
    pub fn run_batch(&mut self, selected: &[GroupId], transform: &dyn PageTransform) -> BatchReport {
        let started_at = Utc::now();
        self.undo_snapshot = Some(self.groups.clone());

        let mut processed = Vec::new();
        let mut skipped = Vec::new();
        let mut failed = Vec::new();

        for group in self.groups.iter_mut().filter(|g| selected.contains(&g.id)) {
            debug!(group = %group.id, items = group.items.len(), "Processing group");
            for item in group.items.iter_mut() {
                if item.kind != ItemKind::Image {
                    debug!(item = %item.name, kind = ?item.kind, "Skipping non-image item");
                    skipped.push(item.id);
                    continue;
                }
                match process_item(item, transform) {
                    Ok(()) => processed.push(item.id),
                    Err(err) => {
                        warn!(item = %item.name, %err, "Page failed; continuing batch");
                        failed.push(ItemFailure {
                            item_id: item.id,
                            item_name: item.name.clone(),
                            error: humanize_error(&err).for_item(&item.name),
                        });
                    }
                }
            }
        }

        info!(
            processed = processed.len(),
            skipped = skipped.len(),
            failed = failed.len(),
            "Batch complete"
        );
        BatchReport {
            operation: transform.name().to_owned(),
            processed,
            skipped,
            failed,
            started_at,
            finished_at: Utc::now(),
        }
    }

    // -- Undo -----------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.undo_snapshot.is_some()
    }

    /// Restore the workspace as it was before the last batch and clear the
    /// snapshot. There is no redo.
    pub fn undo(&mut self) -> Result<()> {
        let snapshot = self.undo_snapshot.take().ok_or(ScanError::NothingToUndo)?;
        self.groups = snapshot;
        info!("Batch undone");
        Ok(())
    }
}

/// Decode, transform, and re-encode one page. Intermediate images are
/// dropped before this returns.
fn process_item(item: &mut PageItem, transform: &dyn PageTransform) -> Result<()> {
    let image = RasterImage::decode(item.bytes())?;
    let output = transform.apply(&image)?;
    drop(image);
    let encoded = output.encode_png()?;
    item.replace_content(encoded);
    Ok(())
}
