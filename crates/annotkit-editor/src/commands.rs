//! Invertible document mutations.
//!
//! Every change to a [`Document`] is a [`DocumentCommand`]. A command holds
//! the forward data it was built with and, once applied, whatever it needs to
//! reverse itself (the removed annotation, the previous value of a field...).
//! It never holds a document snapshot.
//!
//! Each command validates before writing, so a failed `apply` or `undo`
//! leaves the document untouched. Composite commands roll back the children
//! that already ran.

use crate::document::{Document, RemovedLayer};
use crate::geometry;
use crate::layer::Layer;
use crate::model::{Annotation, AnnotationDraft, Shape};
use crate::patch::AnnotationPatch;
use annotkit_core::{AnnotationId, EditorError, EditorResult, LayerId, Rect, Vector};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum DocumentCommand {
    AddAnnotation(AddAnnotation),
    RemoveAnnotation(RemoveAnnotation),
    UpdateAnnotation(UpdateAnnotation),
    ReplaceShapes(ReplaceShapes),
    MoveToLayer(MoveToLayer),
    CreateLayer(CreateLayer),
    DeleteLayer(DeleteLayer),
    ReorderLayer(ReorderLayer),
    SetLayerVisibility(SetLayerVisibility),
    SetLayerLocked(SetLayerLocked),
    RenameLayer(RenameLayer),
    Composite(CompositeCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeCommand {
    pub commands: Vec<DocumentCommand>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddAnnotation {
    pub layer: LayerId,
    pub draft: AnnotationDraft,
    /// Assigned on first apply.
    pub id: Option<AnnotationId>,
    /// Some while undone: the annotation and its z-position.
    pub object: Option<(Annotation, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveAnnotation {
    pub id: AnnotationId,
    /// Some while applied (removed).
    pub object: Option<(Annotation, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAnnotation {
    pub id: AnnotationId,
    pub patch: AnnotationPatch,
    pub inverse: Option<AnnotationPatch>,
}

/// Geometry of one annotation before and after a move or resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeChange {
    pub id: AnnotationId,
    pub before: Shape,
    pub after: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceShapes {
    pub name: String,
    pub changes: Vec<ShapeChange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveToLayer {
    pub id: AnnotationId,
    pub layer: LayerId,
    pub previous: Option<(LayerId, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateLayer {
    pub name: String,
    pub id: Option<LayerId>,
    /// Some while undone.
    pub object: Option<(Layer, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteLayer {
    pub id: LayerId,
    pub removed: Option<RemovedLayer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReorderLayer {
    pub id: LayerId,
    pub order: usize,
    pub previous: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetLayerVisibility {
    pub id: LayerId,
    pub visible: bool,
    pub previous: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetLayerLocked {
    pub id: LayerId,
    pub locked: bool,
    pub previous: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameLayer {
    pub id: LayerId,
    pub name: String,
    pub previous: Option<String>,
}

fn not_applied() -> EditorError {
    EditorError::invalid_geometry("command was never applied")
}

impl DocumentCommand {
    // ----- builders -----

    pub fn add_annotation(layer: LayerId, draft: AnnotationDraft) -> Self {
        DocumentCommand::AddAnnotation(AddAnnotation {
            layer,
            draft,
            id: None,
            object: None,
        })
    }

    pub fn remove_annotation(id: AnnotationId) -> Self {
        DocumentCommand::RemoveAnnotation(RemoveAnnotation { id, object: None })
    }

    pub fn update_annotation(id: AnnotationId, patch: AnnotationPatch) -> Self {
        DocumentCommand::UpdateAnnotation(UpdateAnnotation {
            id,
            patch,
            inverse: None,
        })
    }

    /// Translate several annotations by `delta` as one step.
    pub fn move_annotations(
        doc: &Document,
        ids: &[AnnotationId],
        delta: Vector,
    ) -> EditorResult<Self> {
        let changes = ids
            .iter()
            .map(|&id| {
                let annotation = doc
                    .annotation(id)
                    .ok_or(EditorError::AnnotationNotFound { id })?;
                Ok(ShapeChange {
                    id,
                    before: annotation.shape.clone(),
                    after: annotation.shape.translated(delta),
                })
            })
            .collect::<EditorResult<Vec<_>>>()?;
        Ok(DocumentCommand::ReplaceShapes(ReplaceShapes {
            name: "Move".to_string(),
            changes,
        }))
    }

    /// Fit one annotation into `new_bounds`.
    pub fn resize_annotation(
        doc: &Document,
        id: AnnotationId,
        new_bounds: Rect,
    ) -> EditorResult<Self> {
        let annotation = doc
            .annotation(id)
            .ok_or(EditorError::AnnotationNotFound { id })?;
        let after = geometry::reshape(&annotation.shape, new_bounds);
        Ok(DocumentCommand::ReplaceShapes(ReplaceShapes {
            name: "Resize".to_string(),
            changes: vec![ShapeChange {
                id,
                before: annotation.shape.clone(),
                after,
            }],
        }))
    }

    pub fn move_to_layer(id: AnnotationId, layer: LayerId) -> Self {
        DocumentCommand::MoveToLayer(MoveToLayer {
            id,
            layer,
            previous: None,
        })
    }

    pub fn create_layer(name: impl Into<String>) -> Self {
        DocumentCommand::CreateLayer(CreateLayer {
            name: name.into(),
            id: None,
            object: None,
        })
    }

    pub fn delete_layer(id: LayerId) -> Self {
        DocumentCommand::DeleteLayer(DeleteLayer { id, removed: None })
    }

    pub fn reorder_layer(id: LayerId, order: usize) -> Self {
        DocumentCommand::ReorderLayer(ReorderLayer {
            id,
            order,
            previous: None,
        })
    }

    pub fn set_layer_visibility(id: LayerId, visible: bool) -> Self {
        DocumentCommand::SetLayerVisibility(SetLayerVisibility {
            id,
            visible,
            previous: None,
        })
    }

    pub fn set_layer_locked(id: LayerId, locked: bool) -> Self {
        DocumentCommand::SetLayerLocked(SetLayerLocked {
            id,
            locked,
            previous: None,
        })
    }

    pub fn rename_layer(id: LayerId, name: impl Into<String>) -> Self {
        DocumentCommand::RenameLayer(RenameLayer {
            id,
            name: name.into(),
            previous: None,
        })
    }

    pub fn composite(name: impl Into<String>, commands: Vec<DocumentCommand>) -> Self {
        DocumentCommand::Composite(CompositeCommand {
            commands,
            name: name.into(),
        })
    }

    // ----- execution -----

    /// Apply the forward effect.
    pub fn apply(&mut self, doc: &mut Document) -> EditorResult<()> {
        match self {
            DocumentCommand::AddAnnotation(cmd) => {
                match cmd.object.take() {
                    Some((annotation, index)) => {
                        if let Err(err) = doc.insert_annotation(annotation.clone(), Some(index)) {
                            cmd.object = Some((annotation, index));
                            return Err(err);
                        }
                    }
                    None => {
                        let id = doc.add_annotation(cmd.layer, cmd.draft.clone())?;
                        cmd.id = Some(id);
                    }
                }
                Ok(())
            }
            DocumentCommand::RemoveAnnotation(cmd) => {
                cmd.object = Some(doc.remove_annotation(cmd.id)?);
                Ok(())
            }
            DocumentCommand::UpdateAnnotation(cmd) => {
                cmd.inverse = Some(doc.update_annotation(cmd.id, &cmd.patch)?);
                Ok(())
            }
            DocumentCommand::ReplaceShapes(cmd) => {
                replace_shapes(doc, &cmd.changes, |c| &c.after)
            }
            DocumentCommand::MoveToLayer(cmd) => {
                cmd.previous = Some(doc.move_annotation_to_layer(cmd.id, cmd.layer, None)?);
                Ok(())
            }
            DocumentCommand::CreateLayer(cmd) => {
                match cmd.object.take() {
                    Some((layer, index)) => doc.insert_layer(layer, index),
                    None => cmd.id = Some(doc.create_layer(&cmd.name)),
                }
                Ok(())
            }
            DocumentCommand::DeleteLayer(cmd) => {
                cmd.removed = Some(doc.delete_layer(cmd.id)?);
                Ok(())
            }
            DocumentCommand::ReorderLayer(cmd) => {
                cmd.previous = Some(doc.reorder_layer(cmd.id, cmd.order)?);
                Ok(())
            }
            DocumentCommand::SetLayerVisibility(cmd) => {
                cmd.previous = Some(doc.set_layer_visibility(cmd.id, cmd.visible)?);
                Ok(())
            }
            DocumentCommand::SetLayerLocked(cmd) => {
                cmd.previous = Some(doc.set_layer_locked(cmd.id, cmd.locked)?);
                Ok(())
            }
            DocumentCommand::RenameLayer(cmd) => {
                cmd.previous = Some(doc.rename_layer(cmd.id, &cmd.name)?);
                Ok(())
            }
            DocumentCommand::Composite(cmd) => apply_all(&mut cmd.commands, doc),
        }
    }

    /// Apply the inverse effect. Only valid after a successful [`apply`](Self::apply).
    pub fn undo(&mut self, doc: &mut Document) -> EditorResult<()> {
        match self {
            DocumentCommand::AddAnnotation(cmd) => {
                let id = cmd.id.ok_or_else(not_applied)?;
                cmd.object = Some(doc.remove_annotation(id)?);
                Ok(())
            }
            DocumentCommand::RemoveAnnotation(cmd) => {
                let (annotation, index) = cmd.object.take().ok_or_else(not_applied)?;
                if let Err(err) = doc.insert_annotation(annotation.clone(), Some(index)) {
                    cmd.object = Some((annotation, index));
                    return Err(err);
                }
                Ok(())
            }
            DocumentCommand::UpdateAnnotation(cmd) => {
                let inverse = cmd.inverse.as_ref().ok_or_else(not_applied)?;
                doc.update_annotation(cmd.id, inverse)?;
                Ok(())
            }
            DocumentCommand::ReplaceShapes(cmd) => {
                replace_shapes(doc, &cmd.changes, |c| &c.before)
            }
            DocumentCommand::MoveToLayer(cmd) => {
                let (layer, index) = cmd.previous.ok_or_else(not_applied)?;
                doc.move_annotation_to_layer(cmd.id, layer, Some(index))?;
                Ok(())
            }
            DocumentCommand::CreateLayer(cmd) => {
                let id = cmd.id.ok_or_else(not_applied)?;
                let removed = doc.delete_layer(id)?;
                cmd.object = Some((removed.layer, removed.index));
                Ok(())
            }
            DocumentCommand::DeleteLayer(cmd) => {
                let removed = cmd.removed.take().ok_or_else(not_applied)?;
                doc.restore_layer(removed);
                Ok(())
            }
            DocumentCommand::ReorderLayer(cmd) => {
                let previous = cmd.previous.ok_or_else(not_applied)?;
                doc.reorder_layer(cmd.id, previous)?;
                Ok(())
            }
            DocumentCommand::SetLayerVisibility(cmd) => {
                let previous = cmd.previous.ok_or_else(not_applied)?;
                doc.set_layer_visibility(cmd.id, previous)?;
                Ok(())
            }
            DocumentCommand::SetLayerLocked(cmd) => {
                let previous = cmd.previous.ok_or_else(not_applied)?;
                doc.set_layer_locked(cmd.id, previous)?;
                Ok(())
            }
            DocumentCommand::RenameLayer(cmd) => {
                let previous = cmd.previous.as_deref().ok_or_else(not_applied)?;
                doc.rename_layer(cmd.id, previous)?;
                Ok(())
            }
            DocumentCommand::Composite(cmd) => undo_all(&mut cmd.commands, doc),
        }
    }

    /// Label for menus and logs.
    pub fn name(&self) -> &str {
        match self {
            DocumentCommand::AddAnnotation(_) => "Add Annotation",
            DocumentCommand::RemoveAnnotation(_) => "Delete Annotation",
            DocumentCommand::UpdateAnnotation(_) => "Edit Properties",
            DocumentCommand::ReplaceShapes(cmd) => &cmd.name,
            DocumentCommand::MoveToLayer(_) => "Move to Layer",
            DocumentCommand::CreateLayer(_) => "New Layer",
            DocumentCommand::DeleteLayer(_) => "Delete Layer",
            DocumentCommand::ReorderLayer(_) => "Reorder Layer",
            DocumentCommand::SetLayerVisibility(_) => "Toggle Layer Visibility",
            DocumentCommand::SetLayerLocked(_) => "Toggle Layer Lock",
            DocumentCommand::RenameLayer(_) => "Rename Layer",
            DocumentCommand::Composite(cmd) => &cmd.name,
        }
    }

    /// Ids of annotations created by this command (after it has been applied).
    pub fn created_ids(&self) -> Vec<AnnotationId> {
        match self {
            DocumentCommand::AddAnnotation(cmd) => cmd.id.into_iter().collect(),
            DocumentCommand::Composite(cmd) => {
                cmd.commands.iter().flat_map(|c| c.created_ids()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Id of the layer created by this command (after it has been applied).
    pub fn created_layer(&self) -> Option<LayerId> {
        match self {
            DocumentCommand::CreateLayer(cmd) => cmd.id,
            DocumentCommand::Composite(cmd) => cmd.commands.iter().find_map(|c| c.created_layer()),
            _ => None,
        }
    }
}

/// Validate every target, then write the selected side of each change.
fn replace_shapes(
    doc: &mut Document,
    changes: &[ShapeChange],
    side: impl Fn(&ShapeChange) -> &Shape,
) -> EditorResult<()> {
    for change in changes {
        doc.check_editable(change.id)?;
    }
    for change in changes {
        doc.replace_shape(change.id, side(change).clone())?;
    }
    Ok(())
}

fn apply_all(commands: &mut [DocumentCommand], doc: &mut Document) -> EditorResult<()> {
    for i in 0..commands.len() {
        if let Err(err) = commands[i].apply(doc) {
            for done in commands[..i].iter_mut().rev() {
                if let Err(rollback) = done.undo(doc) {
                    warn!("Rollback of '{}' failed: {}", done.name(), rollback);
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

fn undo_all(commands: &mut [DocumentCommand], doc: &mut Document) -> EditorResult<()> {
    let len = commands.len();
    for i in (0..len).rev() {
        if let Err(err) = commands[i].undo(doc) {
            for done in commands[i + 1..].iter_mut() {
                if let Err(rollback) = done.apply(doc) {
                    warn!("Rollback of '{}' failed: {}", done.name(), rollback);
                }
            }
            return Err(err);
        }
    }
    Ok(())
}
