//! Linear undo/redo history over design documents.

use crate::design::DesignDocument;
use serde::{Deserialize, Serialize};

/// Past, present and future design states.
///
/// `past` is ordered oldest first, `future` nearest first. A new edit
/// discards `future`: history never branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub past: Vec<DesignDocument>,
    pub present: DesignDocument,
    #[serde(default)]
    pub future: Vec<DesignDocument>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DesignDocument::new())
    }
}

impl History {
    /// History with a single state and nothing to undo or redo.
    pub fn new(present: DesignDocument) -> Self {
        Self {
            past: Vec::new(),
            present,
            future: Vec::new(),
        }
    }

    /// Make `next` the present state.
    pub fn record(&mut self, next: DesignDocument) {
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push(previous);
        self.future.clear();
    }

    /// Step back one state.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        if let Some(previous) = self.past.pop() {
            let current = std::mem::replace(&mut self.present, previous);
            self.future.insert(0, current);
            true
        } else {
            false
        }
    }

    /// Step forward one state.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.future.is_empty() {
            return false;
        }
        let next = self.future.remove(0);
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Copy keeping only the `limit` most recent past states and the
    /// `limit` nearest future states.
    pub fn windowed(&self, limit: usize) -> Self {
        let skip = self.past.len().saturating_sub(limit);
        Self {
            past: self.past[skip..].to_vec(),
            present: self.present.clone(),
            future: self.future.iter().take(limit).cloned().collect(),
        }
    }

    /// Every document in the history: past, present, then future.
    pub fn documents(&self) -> impl Iterator<Item = &DesignDocument> {
        self.past
            .iter()
            .chain(std::iter::once(&self.present))
            .chain(self.future.iter())
    }

    /// Mutable form of [`History::documents`].
    pub fn documents_mut(&mut self) -> impl Iterator<Item = &mut DesignDocument> {
        self.past
            .iter_mut()
            .chain(std::iter::once(&mut self.present))
            .chain(self.future.iter_mut())
    }

    /// Total number of states held.
    pub fn state_count(&self) -> usize {
        self.past.len() + 1 + self.future.len()
    }
}
