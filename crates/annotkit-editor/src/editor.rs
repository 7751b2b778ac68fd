//! Host-facing facade.
//!
//! [`AnnotationEditor`] wires a [`Session`] to an [`InteractionController`] and
//! an [`EventDispatcher`]. Hosts feed it raw input and render from the read
//! accessors whenever a [`EditorEvent`] arrives.

use crate::document::Document;
use crate::history::CommandHistory;
use crate::interaction::{
    InteractionController, InteractionOutcome, InteractionState, Key, Modifiers, Preview, Tool,
};
use crate::patch::AnnotationPatch;
use crate::selection::SelectionManager;
use crate::session::Session;
use crate::viewport::Viewport;
use annotkit_core::{
    AnnotationId, EditorEvent, EditorResult, EventDispatcher, EventFilter, LayerId, Point,
    SubscriptionId,
};
use annotkit_settings::EditorConfig;
use std::fmt;
use tracing::{info, warn};

/// Callback receiving the document snapshot on a save request.
pub type SaveCallback = Box<dyn FnMut(&Document)>;

/// What is compared before and after each operation to decide which events fire.
#[derive(Debug, Clone, PartialEq)]
struct Observed {
    revision: u64,
    selection: Vec<AnnotationId>,
    zoom: f64,
    pan: Point,
}

pub struct AnnotationEditor {
    session: Session,
    controller: InteractionController,
    events: EventDispatcher,
    on_save: Option<SaveCallback>,
}

impl AnnotationEditor {
    /// Editor over `initial`, or over an empty document of the given size.
    pub fn new(image_width: u32, image_height: u32, initial: Option<Document>) -> Self {
        Self::with_config(image_width, image_height, initial, EditorConfig::default())
    }

    pub fn with_config(
        image_width: u32,
        image_height: u32,
        initial: Option<Document>,
        config: EditorConfig,
    ) -> Self {
        let document = match initial {
            Some(doc) => {
                if (doc.image_width(), doc.image_height()) != (image_width, image_height) {
                    warn!(
                        "Document is {}x{} but the image is {}x{}",
                        doc.image_width(),
                        doc.image_height(),
                        image_width,
                        image_height
                    );
                }
                doc
            }
            None => Document::new(image_width, image_height),
        };
        info!(
            "Editor ready: {} layer(s), {} annotation(s)",
            document.layer_count(),
            document.annotation_count()
        );
        Self {
            session: Session::with_document(document, config),
            controller: InteractionController::new(),
            events: EventDispatcher::new(),
            on_save: None,
        }
    }

    // ----- read access -----

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn document(&self) -> &Document {
        self.session.document()
    }

    pub fn history(&self) -> &CommandHistory {
        self.session.history()
    }

    pub fn selection(&self) -> &SelectionManager {
        self.session.selection()
    }

    pub fn viewport(&self) -> &Viewport {
        self.session.viewport()
    }

    pub fn config(&self) -> &EditorConfig {
        self.session.config()
    }

    pub fn tool(&self) -> Tool {
        self.controller.tool()
    }

    pub fn state(&self) -> &InteractionState {
        self.controller.state()
    }

    pub fn preview(&self) -> Preview<'_> {
        self.controller.preview()
    }

    /// Selected ids whose layer is currently visible; handles are drawn for these only.
    pub fn visible_selection(&self) -> Vec<AnnotationId> {
        self.session.selection().visible_ids(self.session.document())
    }

    pub fn active_layer(&self) -> LayerId {
        self.session.active_layer()
    }

    // ----- persistence -----

    /// Snapshot of the current document.
    pub fn save(&self) -> Document {
        self.session.document().clone()
    }

    /// Register the host's save handler, replacing any previous one.
    pub fn on_save<F>(&mut self, callback: F)
    where
        F: FnMut(&Document) + 'static,
    {
        self.on_save = Some(Box::new(callback));
    }

    /// Hand a snapshot to the save handler (also triggered by Ctrl+S).
    ///
    /// Returns false when no handler is registered.
    pub fn request_save(&mut self) -> bool {
        self.events.publish(&EditorEvent::SaveRequested);
        match self.on_save.as_mut() {
            Some(callback) => {
                callback(self.session.document());
                true
            }
            None => {
                warn!("Save requested but no save handler is registered");
                false
            }
        }
    }

    /// Replace the document being edited. History and selection start over.
    pub fn load(&mut self, document: Document) {
        self.observe(|session, controller| {
            controller.cancel(session);
            session.replace_document(document);
        });
    }

    // ----- events -----

    pub fn subscribe<F>(&mut self, filter: EventFilter, listener: F) -> SubscriptionId
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        self.events.subscribe(filter, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn snapshot(&self) -> Observed {
        Observed {
            revision: self.session.history().revision(),
            selection: self.session.selection().ids().to_vec(),
            zoom: self.session.viewport().zoom(),
            pan: self.session.viewport().pan(),
        }
    }

    /// Run `f`, then publish an event for each observable change it made.
    fn observe<R>(
        &mut self,
        f: impl FnOnce(&mut Session, &mut InteractionController) -> R,
    ) -> R {
        let before = self.snapshot();
        let result = f(&mut self.session, &mut self.controller);
        let after = self.snapshot();
        if after.revision != before.revision {
            self.events.publish(&EditorEvent::DocumentChanged {
                revision: after.revision,
            });
        }
        if after.selection != before.selection {
            self.events.publish(&EditorEvent::SelectionChanged {
                primary: after.selection.first().copied(),
                count: after.selection.len(),
            });
        }
        if after.zoom != before.zoom || after.pan != before.pan {
            self.events
                .publish(&EditorEvent::ViewportChanged { zoom: after.zoom });
        }
        result
    }

    fn handle(&mut self, outcome: InteractionOutcome) -> InteractionOutcome {
        match &outcome {
            InteractionOutcome::Rejected(err) => {
                self.events.publish(&EditorEvent::CommandRejected {
                    reason: err.to_string(),
                });
            }
            InteractionOutcome::SaveRequested => {
                self.request_save();
            }
            _ => {}
        }
        outcome
    }

    fn run<T>(&mut self, f: impl FnOnce(&mut Session) -> EditorResult<T>) -> EditorResult<T> {
        let result = self.observe(|session, _| f(session));
        if let Err(err) = &result {
            self.events.publish(&EditorEvent::CommandRejected {
                reason: err.to_string(),
            });
        }
        result
    }

    // ----- input -----

    pub fn set_tool(&mut self, tool: Tool) -> InteractionOutcome {
        let outcome = self.observe(|s, c| c.set_tool(s, tool));
        self.handle(outcome)
    }

    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) -> InteractionOutcome {
        let outcome = self.observe(|s, c| c.pointer_down(s, screen, modifiers));
        self.handle(outcome)
    }

    pub fn pointer_move(&mut self, screen: Point) -> InteractionOutcome {
        let outcome = self.observe(|s, c| c.pointer_move(s, screen));
        self.handle(outcome)
    }

    pub fn pointer_up(&mut self, screen: Point) -> InteractionOutcome {
        let outcome = self.observe(|s, c| c.pointer_up(s, screen));
        self.handle(outcome)
    }

    pub fn pointer_leave(&mut self) -> InteractionOutcome {
        let outcome = self.observe(|s, c| c.pointer_leave(s));
        self.handle(outcome)
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> InteractionOutcome {
        let outcome = self.observe(|s, c| c.key_down(s, key, modifiers));
        self.handle(outcome)
    }

    pub fn wheel(&mut self, cursor: Point, delta_y: f64, modifiers: Modifiers) -> InteractionOutcome {
        let outcome = self.observe(|s, c| c.wheel(s, cursor, delta_y, modifiers));
        self.handle(outcome)
    }

    /// Answer a [`InteractionOutcome::ContentRequested`].
    pub fn confirm_content(&mut self, content: &str) -> InteractionOutcome {
        let outcome = self.observe(|s, c| c.confirm_content(s, content));
        self.handle(outcome)
    }

    pub fn cancel(&mut self) -> InteractionOutcome {
        let outcome = self.observe(|s, c| c.cancel(s));
        self.handle(outcome)
    }

    // ----- commands -----

    pub fn undo(&mut self) -> EditorResult<bool> {
        self.run(Session::undo)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        self.run(Session::redo)
    }

    pub fn copy(&mut self) -> usize {
        self.observe(|s, _| s.copy())
    }

    pub fn paste(&mut self) -> EditorResult<Vec<AnnotationId>> {
        self.run(Session::paste)
    }

    pub fn cut(&mut self) -> EditorResult<usize> {
        self.run(Session::cut)
    }

    pub fn delete_selected(&mut self) -> EditorResult<usize> {
        self.run(Session::delete_selected)
    }

    pub fn select(&mut self, id: AnnotationId) -> bool {
        self.observe(|s, _| s.selection.select_single(&s.document, id))
    }

    pub fn select_all(&mut self) -> usize {
        self.observe(|s, _| s.selection.select_all(&s.document))
    }

    pub fn clear_selection(&mut self) -> bool {
        self.observe(|s, _| s.selection.clear())
    }

    pub fn update_annotation(&mut self, id: AnnotationId, patch: AnnotationPatch) -> EditorResult<()> {
        self.run(|s| s.update_annotation(id, patch))
    }

    pub fn move_selection_to_layer(&mut self, layer: LayerId) -> EditorResult<usize> {
        self.run(|s| s.move_selection_to_layer(layer))
    }

    // ----- layers -----

    pub fn create_layer(&mut self, name: &str) -> EditorResult<LayerId> {
        self.run(|s| s.create_layer(name))
    }

    pub fn delete_layer(&mut self, id: LayerId) -> EditorResult<()> {
        self.run(|s| s.delete_layer(id))
    }

    pub fn reorder_layer(&mut self, id: LayerId, order: usize) -> EditorResult<()> {
        self.run(|s| s.reorder_layer(id, order))
    }

    pub fn set_layer_visibility(&mut self, id: LayerId, visible: bool) -> EditorResult<()> {
        self.run(|s| s.set_layer_visibility(id, visible))
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> EditorResult<()> {
        self.run(|s| s.set_layer_locked(id, locked))
    }

    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> EditorResult<()> {
        self.run(|s| s.rename_layer(id, name))
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> EditorResult<()> {
        self.run(|s| s.set_active_layer(id))
    }

    // ----- viewport -----

    pub fn zoom_in(&mut self) {
        self.observe(|s, _| s.viewport.zoom_in());
    }

    pub fn zoom_out(&mut self) {
        self.observe(|s, _| s.viewport.zoom_out());
    }

    pub fn zoom_to(&mut self, level: f64) {
        self.observe(|s, _| s.viewport.zoom_to(level));
    }

    pub fn zoom_at_cursor(&mut self, cursor: Point, factor: f64) {
        self.observe(|s, _| s.viewport.zoom_at_cursor(cursor, factor));
    }

    pub fn fit_to_view(&mut self, view_width: f64, view_height: f64) {
        self.observe(|s, _| s.viewport.fit_to_view(view_width, view_height));
    }

    pub fn reset_zoom(&mut self) {
        self.observe(|s, _| s.viewport.reset_zoom());
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.observe(|s, _| s.viewport.pan_by(dx, dy));
    }
}

impl fmt::Debug for AnnotationEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationEditor")
            .field("session", &self.session)
            .field("controller", &self.controller)
            .field("events", &self.events)
            .field("on_save", &self.on_save.is_some())
            .finish()
    }
}
