//! The design store: owner of the current design and its history.
//!
//! Every edit goes through [`DesignStore::set_design`], which records the
//! previous state for undo and queues a write-behind snapshot. The host
//! decides when queued writes reach storage by awaiting
//! [`DesignStore::flush`].

use crate::config::StoreConfig;
use crate::design::{DesignDocument, FilterSettings, generate_id};
use crate::formats;
use crate::history::History;
use crate::storage::{AutoSaveQueue, FlushOutcome, Storage};
use kurbo::Point;
use std::sync::Arc;

/// Smallest scale reachable with [`DesignStore::zoom_out`].
pub const MIN_SCALE: f64 = 0.5;

/// Largest scale reachable with [`DesignStore::zoom_in`].
pub const MAX_SCALE: f64 = 2.0;

/// Scale change per zoom step.
pub const SCALE_STEP: f64 = 0.1;

/// Rotation change per rotate step, in degrees.
pub const ROTATION_STEP: f64 = 90.0;

/// Mutable design state with linear undo/redo and durable write-behind.
pub struct DesignStore<S: Storage> {
    history: History,
    autosave: AutoSaveQueue<S>,
}

impl<S: Storage> DesignStore<S> {
    /// Create a store with a fresh default design, ignoring stored state.
    pub fn new(storage: Arc<S>, config: StoreConfig) -> Self {
        Self {
            history: History::default(),
            autosave: AutoSaveQueue::new(storage, config),
        }
    }

    /// Create a store from whatever is in storage, migrating old snapshots.
    ///
    /// Falls back to a fresh design when nothing usable is stored.
    pub async fn load(storage: Arc<S>, config: StoreConfig) -> Self {
        let stored = match storage.read(&config.storage_key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to read {}: {}", config.storage_key, e);
                None
            }
        };

        let history = crate::persist::load_or_default(stored.as_deref());
        log::info!(
            "Loaded design {} ({} undo, {} redo)",
            history.present.id,
            history.past.len(),
            history.future.len()
        );

        Self {
            history,
            autosave: AutoSaveQueue::new(storage, config),
        }
    }

    /// The current design.
    pub fn design(&self) -> &DesignDocument {
        &self.history.present
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &StoreConfig {
        self.autosave.config()
    }

    /// Replace the current design.
    ///
    /// Assigns a fresh id when `next.id` is empty. Geometry is taken as
    /// given; use the stepping helpers for bounded edits.
    pub fn set_design(&mut self, mut next: DesignDocument) {
        if next.id.is_empty() {
            next.id = generate_id();
        }
        self.history.record(next);
        self.autosave.enqueue_snapshot(&self.history);
    }

    /// Discard all history and start over with a new design.
    ///
    /// The stored slot is removed on the next flush.
    pub fn reset_design(&mut self) {
        self.history = History::default();
        self.autosave.enqueue_remove();
        log::debug!("Reset design to {}", self.history.present.id);
    }

    /// Step back one edit. Does nothing if there is nothing to undo.
    pub fn undo(&mut self) {
        if self.history.undo() {
            self.autosave.enqueue_snapshot(&self.history);
        }
    }

    /// Step forward one edit. Does nothing if there is nothing to redo.
    pub fn redo(&mut self) {
        if self.history.redo() {
            self.autosave.enqueue_snapshot(&self.history);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Apply `change` to a copy of the current design and record it as unsaved.
    fn edit(&mut self, change: impl FnOnce(&mut DesignDocument)) {
        let mut next = self.design().clone();
        change(&mut next);
        next.has_changes = true;
        self.set_design(next);
    }

    pub fn set_filter(&mut self, filter: FilterSettings) {
        self.edit(|d| d.filter = filter);
    }

    pub fn toggle_flip_x(&mut self) {
        self.edit(|d| d.flip_x = !d.flip_x);
    }

    pub fn toggle_flip_y(&mut self) {
        self.edit(|d| d.flip_y = !d.flip_y);
    }

    /// Enlarge by one step, up to [`MAX_SCALE`].
    pub fn zoom_in(&mut self) {
        self.edit(|d| d.scale = step_scale(d.scale, SCALE_STEP));
    }

    /// Shrink by one step, down to [`MIN_SCALE`].
    pub fn zoom_out(&mut self) {
        self.edit(|d| d.scale = step_scale(d.scale, -SCALE_STEP));
    }

    /// Rotate a quarter turn counter-clockwise.
    pub fn rotate_left(&mut self) {
        self.edit(|d| d.rotation -= ROTATION_STEP);
    }

    /// Rotate a quarter turn clockwise.
    pub fn rotate_right(&mut self) {
        self.edit(|d| d.rotation += ROTATION_STEP);
    }

    /// Switch to another print format.
    ///
    /// Unknown format ids are ignored.
    pub fn set_format(&mut self, format_id: &str) {
        let Some(format) = formats::lookup(format_id) else {
            log::warn!("Ignoring unknown format {}", format_id);
            return;
        };
        self.edit(|d| {
            d.format = Some(format.id.to_string());
            d.format_type = Some(format.category);
        });
    }

    /// Set the image reference produced by an upload.
    pub fn set_image(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.edit(|d| d.image_url = Some(url));
    }

    /// Move the image relative to the centre of the print area.
    pub fn move_to(&mut self, position: Point) {
        self.edit(|d| d.position = position);
    }

    /// Record that the current design has been committed or exported.
    pub fn mark_saved(&mut self) {
        if !self.design().has_changes {
            return;
        }
        let mut next = self.design().clone();
        next.has_changes = false;
        self.set_design(next);
    }

    /// Push any queued snapshot or removal to storage.
    pub async fn flush(&mut self) -> FlushOutcome {
        self.autosave.flush().await
    }

    /// Check if state has changed since the last flush.
    pub fn has_pending_write(&self) -> bool {
        self.autosave.has_pending()
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        self.autosave.storage()
    }
}

/// Add `delta` to `scale`, clamped and rounded to two decimals.
fn step_scale(scale: f64, delta: f64) -> f64 {
    let stepped = ((scale + delta) * 100.0).round() / 100.0;
    stepped.clamp(MIN_SCALE, MAX_SCALE)
}
