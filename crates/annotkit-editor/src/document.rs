//! The annotation document: layers, annotations and id allocation.
//!
//! Everything here is readable by anyone, but mutators are crate-private.
//! Outside code changes a document only through
//! [`DocumentCommand`](crate::commands::DocumentCommand)s run by the
//! [`CommandHistory`](crate::history::CommandHistory), which keeps the inverse
//! of every change.

use crate::layer::Layer;
use crate::model::{Annotation, AnnotationDraft, Shape};
use crate::patch::AnnotationPatch;
use annotkit_core::{
    AnnotationId, EditorError, EditorResult, IdAllocator, LayerId, DEFAULT_LAYER_NAME,
};
use chrono::Utc;
use std::collections::HashMap;

/// A layer taken out of the document together with its annotations, enough
/// to put it back exactly where it was.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedLayer {
    pub layer: Layer,
    pub index: usize,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    image_width: u32,
    image_height: u32,
    /// Sorted bottom to top; `layers[i].order == i`.
    layers: Vec<Layer>,
    annotations: HashMap<AnnotationId, Annotation>,
    default_layer: LayerId,
    layer_ids: IdAllocator,
    annotation_ids: IdAllocator,
}

impl Document {
    /// Create an empty document with a single default layer.
    pub fn new(image_width: u32, image_height: u32) -> Self {
        let mut layer_ids = IdAllocator::default();
        let default_layer = LayerId(layer_ids.allocate());
        Self {
            image_width,
            image_height,
            layers: vec![Layer::new(default_layer, DEFAULT_LAYER_NAME)],
            annotations: HashMap::new(),
            default_layer,
            layer_ids,
            annotation_ids: IdAllocator::default(),
        }
    }

    /// Assemble a document from persisted parts.
    ///
    /// Layers are sorted by their stored order (stable, so input order breaks
    /// ties) and renumbered densely. Annotations keep the given sequence as
    /// their z-order within each layer. Allocators are advanced past every id
    /// in use.
    pub(crate) fn from_parts(
        image_width: u32,
        image_height: u32,
        mut layers: Vec<Layer>,
        annotations: Vec<Annotation>,
        default_layer: LayerId,
        next_layer_id: u64,
        next_annotation_id: u64,
    ) -> EditorResult<Self> {
        if layers.is_empty() {
            return Err(EditorError::LayerNotFound { id: default_layer });
        }
        layers.sort_by_key(|l| l.order);
        for layer in &mut layers {
            layer.annotations.clear();
        }

        let mut doc = Self {
            image_width,
            image_height,
            layers,
            annotations: HashMap::new(),
            default_layer,
            layer_ids: IdAllocator::starting_at(next_layer_id.max(1)),
            annotation_ids: IdAllocator::starting_at(next_annotation_id.max(1)),
        };
        doc.renumber_layers();

        let mut seen_layers = std::collections::HashSet::new();
        for layer in &doc.layers {
            if !seen_layers.insert(layer.id) {
                return Err(EditorError::invalid_geometry(format!(
                    "duplicate layer id {}",
                    layer.id
                )));
            }
        }
        for id in seen_layers {
            doc.layer_ids.observe(id.0);
        }
        if doc.layer(default_layer).is_none() {
            return Err(EditorError::LayerNotFound { id: default_layer });
        }

        for annotation in annotations {
            let index = doc.layer_index(annotation.layer_id)?;
            if doc.annotations.contains_key(&annotation.id) {
                return Err(EditorError::invalid_geometry(format!(
                    "duplicate annotation id {}",
                    annotation.id
                )));
            }
            doc.annotation_ids.observe(annotation.id.0);
            doc.layers[index].annotations.push(annotation.id);
            doc.annotations.insert(annotation.id, annotation);
        }

        Ok(doc)
    }

    // ----- read access -----

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Layers bottom to top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn default_layer_id(&self) -> LayerId {
        self.default_layer
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.annotations.contains_key(&id)
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    /// All annotations in paint order: layers bottom to top, then each layer's
    /// own z-order.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.layers
            .iter()
            .flat_map(|layer| layer.annotations.iter())
            .filter_map(|id| self.annotations.get(id))
    }

    /// Annotations of one layer in z-order.
    pub fn annotations_on(&self, layer: LayerId) -> impl Iterator<Item = &Annotation> + '_ {
        self.layer(layer)
            .into_iter()
            .flat_map(|l| l.annotations.iter())
            .filter_map(|id| self.annotations.get(id))
    }

    /// Layer owning an annotation.
    pub fn layer_of(&self, id: AnnotationId) -> Option<&Layer> {
        self.annotation(id).and_then(|a| self.layer(a.layer_id))
    }

    /// Whether a new selection of `id` is allowed (exists, layer visible and unlocked).
    pub fn is_selectable(&self, id: AnnotationId) -> bool {
        self.layer_of(id).is_some_and(Layer::is_selectable)
    }

    /// Id the next created annotation will get.
    pub fn next_annotation_id(&self) -> u64 {
        self.annotation_ids.peek()
    }

    pub fn next_layer_id(&self) -> u64 {
        self.layer_ids.peek()
    }

    // ----- guards -----

    fn layer_index(&self, id: LayerId) -> EditorResult<usize> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(EditorError::LayerNotFound { id })
    }

    fn unlocked_layer_index(&self, id: LayerId) -> EditorResult<usize> {
        let index = self.layer_index(id)?;
        if self.layers[index].locked {
            return Err(EditorError::LockedLayer { layer: id });
        }
        Ok(index)
    }

    /// Fails unless the annotation exists and its layer is unlocked.
    pub(crate) fn check_editable(&self, id: AnnotationId) -> EditorResult<()> {
        let annotation = self
            .annotation(id)
            .ok_or(EditorError::AnnotationNotFound { id })?;
        self.unlocked_layer_index(annotation.layer_id)?;
        Ok(())
    }

    fn renumber_layers(&mut self) {
        for (order, layer) in self.layers.iter_mut().enumerate() {
            layer.order = order;
        }
    }

    // ----- layer mutators -----

    /// Create a layer on top of all others.
    pub(crate) fn create_layer(&mut self, name: &str) -> LayerId {
        let id = LayerId(self.layer_ids.allocate());
        let mut layer = Layer::new(id, name);
        layer.order = self.layers.len();
        self.layers.push(layer);
        id
    }

    /// Put a previously created layer back at `index`.
    pub(crate) fn insert_layer(&mut self, mut layer: Layer, index: usize) {
        self.layer_ids.observe(layer.id.0);
        layer.annotations.retain(|id| self.annotations.contains_key(id));
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        self.renumber_layers();
    }

    /// Remove a layer and every annotation on it.
    pub(crate) fn delete_layer(&mut self, id: LayerId) -> EditorResult<RemovedLayer> {
        let index = self.layer_index(id)?;
        if self.layers.len() == 1 {
            return Err(EditorError::LastLayer);
        }
        if id == self.default_layer {
            return Err(EditorError::DefaultLayer { layer: id });
        }
        if self.layers[index].locked {
            return Err(EditorError::LockedLayer { layer: id });
        }

        let layer = self.layers.remove(index);
        let annotations = layer
            .annotations
            .iter()
            .filter_map(|a| self.annotations.remove(a))
            .collect();
        self.renumber_layers();
        Ok(RemovedLayer {
            layer,
            index,
            annotations,
        })
    }

    /// Undo a [`delete_layer`](Self::delete_layer).
    pub(crate) fn restore_layer(&mut self, removed: RemovedLayer) {
        for annotation in removed.annotations {
            self.annotation_ids.observe(annotation.id.0);
            self.annotations.insert(annotation.id, annotation);
        }
        self.insert_layer(removed.layer, removed.index);
    }

    /// Move a layer to z-position `new_order` (clamped), returning its old position.
    pub(crate) fn reorder_layer(&mut self, id: LayerId, new_order: usize) -> EditorResult<usize> {
        let old = self.layer_index(id)?;
        let new_order = new_order.min(self.layers.len() - 1);
        let layer = self.layers.remove(old);
        self.layers.insert(new_order, layer);
        self.renumber_layers();
        Ok(old)
    }

    pub(crate) fn set_layer_visibility(&mut self, id: LayerId, visible: bool) -> EditorResult<bool> {
        let index = self.layer_index(id)?;
        Ok(std::mem::replace(&mut self.layers[index].visible, visible))
    }

    pub(crate) fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> EditorResult<bool> {
        let index = self.layer_index(id)?;
        Ok(std::mem::replace(&mut self.layers[index].locked, locked))
    }

    pub(crate) fn rename_layer(&mut self, id: LayerId, name: &str) -> EditorResult<String> {
        let index = self.layer_index(id)?;
        Ok(std::mem::replace(
            &mut self.layers[index].name,
            name.to_string(),
        ))
    }

    // ----- annotation mutators -----

    /// Create an annotation on top of `layer_id` with a fresh id.
    pub(crate) fn add_annotation(
        &mut self,
        layer_id: LayerId,
        draft: AnnotationDraft,
    ) -> EditorResult<AnnotationId> {
        let index = self.unlocked_layer_index(layer_id)?;
        let id = AnnotationId(self.annotation_ids.allocate());
        self.layers[index].insert_at(id, None);
        self.annotations.insert(
            id,
            Annotation {
                id,
                layer_id,
                style: draft.style,
                created_at: Utc::now(),
                created_by: draft.created_by,
                shape: draft.shape,
            },
        );
        Ok(id)
    }

    /// Put an existing annotation (for example one removed earlier) back on
    /// its layer at `index`, or on top. Returns the position used.
    pub(crate) fn insert_annotation(
        &mut self,
        annotation: Annotation,
        index: Option<usize>,
    ) -> EditorResult<usize> {
        let layer_index = self.unlocked_layer_index(annotation.layer_id)?;
        debug_assert!(!self.annotations.contains_key(&annotation.id));
        self.annotation_ids.observe(annotation.id.0);
        let position = self.layers[layer_index].insert_at(annotation.id, index);
        self.annotations.insert(annotation.id, annotation);
        Ok(position)
    }

    /// Remove an annotation, returning it and its position within its layer.
    pub(crate) fn remove_annotation(&mut self, id: AnnotationId) -> EditorResult<(Annotation, usize)> {
        self.check_editable(id)?;
        let layer_id = self.annotations[&id].layer_id;
        let layer_index = self.layer_index(layer_id)?;
        let position = self.layers[layer_index]
            .detach(id)
            .ok_or(EditorError::AnnotationNotFound { id })?;
        let annotation = self
            .annotations
            .remove(&id)
            .ok_or(EditorError::AnnotationNotFound { id })?;
        Ok((annotation, position))
    }

    /// Apply a property patch, returning its inverse.
    pub(crate) fn update_annotation(
        &mut self,
        id: AnnotationId,
        patch: &AnnotationPatch,
    ) -> EditorResult<AnnotationPatch> {
        self.check_editable(id)?;
        let annotation = self
            .annotations
            .get_mut(&id)
            .ok_or(EditorError::AnnotationNotFound { id })?;
        patch.apply_to(annotation)
    }

    /// Swap in new geometry, returning the old.
    pub(crate) fn replace_shape(&mut self, id: AnnotationId, shape: Shape) -> EditorResult<Shape> {
        self.check_editable(id)?;
        let annotation = self
            .annotations
            .get_mut(&id)
            .ok_or(EditorError::AnnotationNotFound { id })?;
        Ok(std::mem::replace(&mut annotation.shape, shape))
    }

    /// Move an annotation onto another layer (on top, or at `index`).
    ///
    /// Both layers must be unlocked. Returns the previous layer and position.
    pub(crate) fn move_annotation_to_layer(
        &mut self,
        id: AnnotationId,
        target: LayerId,
        index: Option<usize>,
    ) -> EditorResult<(LayerId, usize)> {
        self.check_editable(id)?;
        let target_index = self.unlocked_layer_index(target)?;
        let source = self.annotations[&id].layer_id;
        let source_index = self.layer_index(source)?;

        let position = self.layers[source_index]
            .detach(id)
            .ok_or(EditorError::AnnotationNotFound { id })?;
        self.layers[target_index].insert_at(id, index);
        if let Some(annotation) = self.annotations.get_mut(&id) {
            annotation.layer_id = target;
        }
        Ok((source, position))
    }
}
