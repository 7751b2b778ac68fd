//! Layers: ordered, independently visible and lockable groups of annotations.

use annotkit_core::{AnnotationId, LayerId};

/// A layer of the document.
///
/// `order` is the z-position among layers (0 is the bottom). The layer also
/// owns the z-order of its annotations: later ids in [`annotation_ids`]
/// are drawn on top of earlier ones.
///
/// [`annotation_ids`]: Layer::annotation_ids
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub order: usize,
    pub(crate) annotations: Vec<AnnotationId>,
}

impl Layer {
    pub(crate) fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            locked: false,
            order: 0,
            annotations: Vec::new(),
        }
    }

    /// Annotation ids on this layer, bottom to top.
    pub fn annotation_ids(&self) -> &[AnnotationId] {
        &self.annotations
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// New content may be selected on this layer.
    pub fn is_selectable(&self) -> bool {
        self.visible && !self.locked
    }

    pub(crate) fn position_of(&self, id: AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| *a == id)
    }

    /// Insert at `index`, or on top when `None` or past the end.
    pub(crate) fn insert_at(&mut self, id: AnnotationId, index: Option<usize>) -> usize {
        let index = index
            .filter(|i| *i <= self.annotations.len())
            .unwrap_or(self.annotations.len());
        self.annotations.insert(index, id);
        index
    }

    pub(crate) fn detach(&mut self, id: AnnotationId) -> Option<usize> {
        let index = self.position_of(id)?;
        self.annotations.remove(index);
        Some(index)
    }
}
