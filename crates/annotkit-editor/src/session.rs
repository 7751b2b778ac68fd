//! Editor session: the explicit context handed to every interaction handler.
//!
//! A session bundles one document with its history, selection, viewport,
//! clipboard and configuration. Several sessions can coexist; nothing here is
//! global.

use crate::commands::DocumentCommand;
use crate::document::Document;
use crate::history::CommandHistory;
use crate::model::{AnnotationDraft, Shape};
use crate::patch::AnnotationPatch;
use crate::selection::SelectionManager;
use crate::viewport::Viewport;
use annotkit_core::{AnnotationId, EditorError, EditorResult, LayerId};
use annotkit_settings::EditorConfig;
use tracing::{debug, info};

/// Value snapshot of copied annotations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    items: Vec<AnnotationDraft>,
    pastes: u32,
}

impl Clipboard {
    pub fn items(&self) -> &[AnnotationDraft] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug)]
pub struct Session {
    pub(crate) document: Document,
    pub(crate) history: CommandHistory,
    pub(crate) selection: SelectionManager,
    pub(crate) viewport: Viewport,
    pub(crate) clipboard: Clipboard,
    pub(crate) config: EditorConfig,
    active_layer: LayerId,
}

impl Session {
    /// Session over an empty document.
    pub fn new(image_width: u32, image_height: u32, config: EditorConfig) -> Self {
        Self::with_document(Document::new(image_width, image_height), config)
    }

    /// Session over an existing document. History starts empty.
    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        let viewport =
            Viewport::new(document.image_width(), document.image_height()).with_config(&config);
        let active_layer = document.default_layer_id();
        Self {
            history: CommandHistory::with_depth(config.history_limit),
            selection: SelectionManager::new(),
            clipboard: Clipboard::default(),
            document,
            viewport,
            config,
            active_layer,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Layer receiving new and pasted annotations. Falls back to the default
    /// layer when the chosen one has been deleted.
    pub fn active_layer(&self) -> LayerId {
        if self.document.layer(self.active_layer).is_some() {
            self.active_layer
        } else {
            self.document.default_layer_id()
        }
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> EditorResult<()> {
        if self.document.layer(id).is_none() {
            return Err(EditorError::LayerNotFound { id });
        }
        self.active_layer = id;
        Ok(())
    }

    // ----- history -----

    /// Run a command through the history, then drop stale selection.
    pub fn execute(&mut self, command: DocumentCommand) -> EditorResult<&DocumentCommand> {
        let pushed = self.history.execute(command, &mut self.document)?;
        self.selection.prune(&self.document);
        Ok(pushed)
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        let done = self.history.undo(&mut self.document)?;
        self.selection.prune(&self.document);
        Ok(done)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        let done = self.history.redo(&mut self.document)?;
        self.selection.prune(&self.document);
        Ok(done)
    }

    // ----- annotations -----

    /// Draft carrying the configured default style and author.
    pub fn draft(&self, shape: Shape) -> AnnotationDraft {
        AnnotationDraft::new(shape, self.config.default_style.clone())
            .with_author(self.config.author.clone())
    }

    /// Add an annotation on the active layer as one history step.
    pub fn add_annotation(&mut self, shape: Shape) -> EditorResult<AnnotationId> {
        let draft = self.draft(shape);
        let layer = self.active_layer();
        let pushed = self.execute(DocumentCommand::add_annotation(layer, draft))?;
        pushed
            .created_ids()
            .first()
            .copied()
            .ok_or_else(|| EditorError::invalid_geometry("nothing was created"))
    }

    /// Properties-panel edit of one annotation.
    pub fn update_annotation(&mut self, id: AnnotationId, patch: AnnotationPatch) -> EditorResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.execute(DocumentCommand::update_annotation(id, patch))?;
        Ok(())
    }

    /// Delete the selection as one history step.
    pub fn delete_selected(&mut self) -> EditorResult<usize> {
        self.selection
            .delete_selected(&mut self.document, &mut self.history)
    }

    /// Move the selected annotations onto another layer as one history step.
    pub fn move_selection_to_layer(&mut self, layer: LayerId) -> EditorResult<usize> {
        self.selection.prune(&self.document);
        let commands: Vec<_> = self
            .selection
            .ids()
            .iter()
            .map(|id| DocumentCommand::move_to_layer(*id, layer))
            .collect();
        let count = commands.len();
        if count > 0 {
            self.execute(DocumentCommand::composite("Move to Layer", commands))?;
        }
        Ok(count)
    }

    // ----- clipboard -----

    /// Snapshot the selected annotations by value.
    pub fn copy(&mut self) -> usize {
        let items = self.snapshot_selection();
        self.fill_clipboard(items)
    }

    fn snapshot_selection(&mut self) -> Vec<AnnotationDraft> {
        self.selection.prune(&self.document);
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.document.annotation(*id))
            .map(AnnotationDraft::from)
            .collect()
    }

    fn fill_clipboard(&mut self, items: Vec<AnnotationDraft>) -> usize {
        self.clipboard = Clipboard { items, pastes: 0 };
        debug!("Copied {} annotation(s)", self.clipboard.items.len());
        self.clipboard.items.len()
    }

    /// Create fresh annotations from the clipboard on the active layer.
    ///
    /// Each paste is offset by the paste offset from the previous one, so the
    /// first lands exactly one offset away from the originals. The new
    /// annotations become the selection. All of it is one history step.
    pub fn paste(&mut self) -> EditorResult<Vec<AnnotationId>> {
        if self.clipboard.is_empty() {
            return Ok(Vec::new());
        }
        let steps = f64::from(self.clipboard.pastes + 1);
        let offset = self.config.paste_offset * steps;
        let layer = self.active_layer();
        let author = self.config.author.clone();

        let commands = self
            .clipboard
            .items
            .iter()
            .map(|item| {
                let draft = AnnotationDraft {
                    shape: item.shape.translated(offset),
                    style: item.style.clone(),
                    created_by: author.clone(),
                };
                DocumentCommand::add_annotation(layer, draft)
            })
            .collect();

        let ids = self
            .execute(DocumentCommand::composite("Paste", commands))?
            .created_ids();
        self.clipboard.pastes += 1;
        self.selection.select_many(&self.document, &ids);
        debug!("Pasted {} annotation(s) onto {}", ids.len(), layer);
        Ok(ids)
    }

    /// Copy, then delete the selection. The clipboard is only replaced once
    /// the delete has gone through.
    pub fn cut(&mut self) -> EditorResult<usize> {
        let items = self.snapshot_selection();
        let removed = self.delete_selected()?;
        self.fill_clipboard(items);
        Ok(removed)
    }

    // ----- layers -----

    pub fn create_layer(&mut self, name: &str) -> EditorResult<LayerId> {
        let pushed = self.execute(DocumentCommand::create_layer(name))?;
        let id = pushed
            .created_layer()
            .ok_or_else(|| EditorError::invalid_geometry("no layer was created"))?;
        info!("Created layer {} '{}'", id, name);
        Ok(id)
    }

    pub fn delete_layer(&mut self, id: LayerId) -> EditorResult<()> {
        self.execute(DocumentCommand::delete_layer(id))?;
        Ok(())
    }

    pub fn reorder_layer(&mut self, id: LayerId, order: usize) -> EditorResult<()> {
        self.execute(DocumentCommand::reorder_layer(id, order))?;
        Ok(())
    }

    pub fn set_layer_visibility(&mut self, id: LayerId, visible: bool) -> EditorResult<()> {
        self.execute(DocumentCommand::set_layer_visibility(id, visible))?;
        Ok(())
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> EditorResult<()> {
        self.execute(DocumentCommand::set_layer_locked(id, locked))?;
        Ok(())
    }

    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> EditorResult<()> {
        self.execute(DocumentCommand::rename_layer(id, name))?;
        Ok(())
    }

    /// Swap in a different document, dropping history, selection and clipboard offsets.
    pub fn replace_document(&mut self, document: Document) {
        self.viewport = Viewport::new(document.image_width(), document.image_height())
            .with_config(&self.config);
        self.active_layer = document.default_layer_id();
        self.document = document;
        self.history.clear();
        self.history.bump_revision();
        self.selection.clear();
        self.clipboard.pastes = 0;
    }
}
