//! Selection management.
//!
//! The selection is an ordered list of annotation ids. The first entry is the
//! *primary* selection, which feeds the properties panel.
//!
//! Hidden and locked layers refuse new selection, but ids already selected
//! are not evicted when their layer is hidden or locked later. Use
//! [`SelectionManager::visible_ids`] to decide where to draw handles.

use crate::commands::DocumentCommand;
use crate::document::Document;
use crate::geometry;
use crate::history::CommandHistory;
use annotkit_core::{AnnotationId, EditorResult, Rect};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionManager {
    ids: Vec<AnnotationId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single annotation.
    ///
    /// # Arguments
    /// * `doc` - The document the id belongs to
    /// * `id` - The annotation to select
    ///
    /// # Returns
    /// `true` if the selection changed. Annotations that do not exist or sit on
    /// a hidden or locked layer are refused and the selection is left alone.
    pub fn select_single(&mut self, doc: &Document, id: AnnotationId) -> bool {
        if !doc.is_selectable(id) {
            debug!("Refused selection of {}", id);
            return false;
        }
        if self.ids == [id] {
            return false;
        }
        self.ids.clear();
        self.ids.push(id);
        true
    }

    /// Add or remove one annotation (shift-click).
    ///
    /// Removal keeps the relative order of the rest. Addition appends, so the
    /// primary only changes when the selection was empty. Adding is subject to
    /// the same visibility and lock rules as [`select_single`](Self::select_single).
    ///
    /// # Returns
    /// `true` if the selection changed.
    pub fn toggle(&mut self, doc: &Document, id: AnnotationId) -> bool {
        if let Some(pos) = self.ids.iter().position(|s| *s == id) {
            self.ids.remove(pos);
            return true;
        }
        if !doc.is_selectable(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Replace the selection with every annotation intersecting `rect`.
    ///
    /// Only visible, unlocked layers take part. Results are in paint order.
    ///
    /// # Arguments
    /// * `doc` - The document to search
    /// * `rect` - Marquee in image-space (any corner order is fine)
    ///
    /// # Returns
    /// The number of selected annotations.
    pub fn select_by_marquee(&mut self, doc: &Document, rect: Rect) -> usize {
        self.ids = doc
            .layers()
            .iter()
            .filter(|layer| layer.is_selectable())
            .flat_map(|layer| doc.annotations_on(layer.id))
            .filter(|a| geometry::intersects_marquee(a, &rect))
            .map(|a| a.id)
            .collect();
        self.ids.len()
    }

    /// Select everything on visible, unlocked layers.
    pub fn select_all(&mut self, doc: &Document) -> usize {
        self.ids = doc
            .annotations()
            .filter(|a| doc.is_selectable(a.id))
            .map(|a| a.id)
            .collect();
        self.ids.len()
    }

    /// Replace the selection with `ids` (for example freshly pasted annotations).
    pub fn select_many(&mut self, doc: &Document, ids: &[AnnotationId]) -> usize {
        self.ids = ids
            .iter()
            .copied()
            .filter(|id| doc.is_selectable(*id))
            .collect();
        self.ids.len()
    }

    /// Empty the selection. Returns `true` if anything was selected.
    pub fn clear(&mut self) -> bool {
        let changed = !self.ids.is_empty();
        self.ids.clear();
        changed
    }

    /// Delete every selected annotation as one history step, then clear.
    ///
    /// # Returns
    /// How many annotations were deleted. If any of them cannot be removed
    /// (for example its layer was locked after selection) nothing is deleted,
    /// the error is returned and the selection is kept.
    pub fn delete_selected(
        &mut self,
        doc: &mut Document,
        history: &mut CommandHistory,
    ) -> EditorResult<usize> {
        self.prune(doc);
        if self.ids.is_empty() {
            return Ok(0);
        }
        let commands = self
            .ids
            .iter()
            .map(|id| DocumentCommand::remove_annotation(*id))
            .collect();
        let count = self.ids.len();
        history.execute(DocumentCommand::composite("Delete", commands), doc)?;
        self.ids.clear();
        Ok(count)
    }

    /// Drop ids whose annotations no longer exist.
    ///
    /// # Returns
    /// `true` if anything was dropped.
    pub fn prune(&mut self, doc: &Document) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| doc.contains(*id));
        self.ids.len() != before
    }

    /// The primary (first) selected annotation.
    pub fn primary(&self) -> Option<AnnotationId> {
        self.ids.first().copied()
    }

    pub fn ids(&self) -> &[AnnotationId] {
        &self.ids
    }

    /// Selected ids whose layer is currently visible.
    pub fn visible_ids(&self, doc: &Document) -> Vec<AnnotationId> {
        self.ids
            .iter()
            .copied()
            .filter(|id| doc.layer_of(*id).is_some_and(|l| l.visible))
            .collect()
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
