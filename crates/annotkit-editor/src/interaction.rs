//! Interaction controller: turns pointer, keyboard and wheel input into
//! gestures, previews and committed commands.
//!
//! The controller only owns per-gesture state. Everything persistent lives in
//! the [`Session`] passed to each handler. Drafts and drag ghosts are plain
//! values that never touch the document until the gesture commits through the
//! command history.

use crate::commands::DocumentCommand;
use crate::geometry::{self, Handle};
use crate::model::{
    MarkArrow, MarkCallout, MarkCircle, MarkFreehand, MarkLine, MarkRectangle, MarkText,
    MarkupShape, Shape, ShapeKind,
};
use crate::session::Session;
use annotkit_core::{AnnotationId, EditorError, Point, Rect, Vector};
use annotkit_settings::EditorConfig;
use std::fmt;
use tracing::{debug, warn};

/// Default width of a text or callout box placed with a click.
const DEFAULT_BOX_WIDTH: f64 = 160.0;
/// Offset of a clicked callout box from its anchor.
const CALLOUT_BOX_OFFSET: Vector = Vector::new(40.0, -80.0);

/// Active drawing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Select,
    Arrow,
    Rectangle,
    Circle,
    Line,
    Freehand,
    Text,
    Callout,
}

impl Tool {
    pub const ALL: [Tool; 8] = [
        Tool::Select,
        Tool::Arrow,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Line,
        Tool::Freehand,
        Tool::Text,
        Tool::Callout,
    ];

    /// Annotation kind this tool creates, `None` for the select tool.
    pub fn kind(self) -> Option<ShapeKind> {
        match self {
            Tool::Select => None,
            Tool::Arrow => Some(ShapeKind::Arrow),
            Tool::Rectangle => Some(ShapeKind::Rectangle),
            Tool::Circle => Some(ShapeKind::Circle),
            Tool::Line => Some(ShapeKind::Line),
            Tool::Freehand => Some(ShapeKind::Freehand),
            Tool::Text => Some(ShapeKind::Text),
            Tool::Callout => Some(ShapeKind::Callout),
        }
    }

    /// Text and callout tools ask the host for content before committing.
    pub fn needs_content(self) -> bool {
        matches!(self, Tool::Text | Tool::Callout)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{}", kind),
            None => write!(f, "Select"),
        }
    }
}

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        shift: true,
        alt: false,
    };
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        alt: false,
    };
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Delete,
    Backspace,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    Resize(Handle),
}

/// Per-gesture state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A drawing tool is collecting geometry.
    Drawing { origin: Point, draft: Shape },
    /// Selected annotations follow the pointer. `preview` holds the ghost
    /// shapes; the document keeps the originals until release.
    Dragging {
        mode: DragMode,
        origin: Point,
        bounds: Rect,
        originals: Vec<(AnnotationId, Shape)>,
        preview: Vec<(AnnotationId, Shape)>,
    },
    MarqueeSelecting { origin: Point, current: Point },
    /// A text or callout placement waits for the host's content dialog.
    AwaitingContent {
        kind: ShapeKind,
        rect: Rect,
        anchor: Point,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, InteractionState::Dragging { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Drawing { .. } => "drawing",
            InteractionState::Dragging { .. } => "dragging",
            InteractionState::MarqueeSelecting { .. } => "marquee",
            InteractionState::AwaitingContent { .. } => "awaiting content",
        }
    }
}

/// What the render layer should draw on top of the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview<'a> {
    None,
    Draft(&'a Shape),
    Ghosts(&'a [(AnnotationId, Shape)]),
    Marquee(Rect),
    PendingContent { rect: Rect, anchor: Point },
}

/// Result of feeding one input event to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    /// Nothing happened.
    Ignored,
    /// A draft, ghost or marquee changed; redraw the overlay.
    Preview,
    /// A command was committed to the history.
    Committed { created: Vec<AnnotationId> },
    /// Undo or redo moved through the history.
    HistoryMoved,
    SelectionChanged,
    ViewportChanged,
    /// The host should open its content dialog, then call
    /// [`InteractionController::confirm_content`] or
    /// [`InteractionController::cancel`].
    ContentRequested { kind: ShapeKind, rect: Rect },
    Copied(usize),
    SaveRequested,
    /// The gesture ended without touching the document.
    Cancelled,
    /// A degenerate draft was thrown away.
    Discarded(EditorError),
    /// The command engine refused the change; the document is untouched.
    Rejected(EditorError),
}

impl InteractionOutcome {
    fn from_commit(result: Result<Vec<AnnotationId>, EditorError>) -> Self {
        match result {
            Ok(created) => InteractionOutcome::Committed { created },
            Err(err) => {
                warn!("Command rejected: {}", err);
                InteractionOutcome::Rejected(err)
            }
        }
    }
}

/// Drives tools and gestures over a [`Session`].
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    tool: Tool,
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Switch tools. Any gesture in flight is cancelled first.
    pub fn set_tool(&mut self, session: &mut Session, tool: Tool) -> InteractionOutcome {
        let outcome = self.cancel(session);
        if self.tool != tool {
            debug!("Tool {} -> {}", self.tool, tool);
            self.tool = tool;
        }
        outcome
    }

    /// Overlay for the current gesture.
    pub fn preview(&self) -> Preview<'_> {
        match &self.state {
            InteractionState::Idle => Preview::None,
            InteractionState::Drawing { draft, .. } => Preview::Draft(draft),
            InteractionState::Dragging { preview, .. } => Preview::Ghosts(preview),
            InteractionState::MarqueeSelecting { origin, current } => {
                Preview::Marquee(Rect::from_corners(*origin, *current))
            }
            InteractionState::AwaitingContent { rect, anchor, .. } => Preview::PendingContent {
                rect: *rect,
                anchor: *anchor,
            },
        }
    }

    // ----- pointer -----

    /// Pointer pressed at a screen position.
    pub fn pointer_down(
        &mut self,
        session: &mut Session,
        screen: Point,
        modifiers: Modifiers,
    ) -> InteractionOutcome {
        if !self.state.is_idle() {
            return InteractionOutcome::Ignored;
        }
        let p = session.viewport.screen_to_image(screen);
        match self.tool {
            Tool::Select => self.begin_select(session, p, modifiers),
            tool => {
                let Some(draft) = draft_shape(tool, p, &session.config) else {
                    return InteractionOutcome::Ignored;
                };
                debug!("Start drawing {} at {:?}", tool, p);
                session.history.begin_recording(format!("Draw {}", tool));
                self.state = InteractionState::Drawing { origin: p, draft };
                InteractionOutcome::Preview
            }
        }
    }

    fn begin_select(
        &mut self,
        session: &mut Session,
        p: Point,
        modifiers: Modifiers,
    ) -> InteractionOutcome {
        let radius = session.viewport.to_image_length(session.config.handle_size);

        // Resize handles of a single selected annotation take precedence.
        if !modifiers.shift && session.selection.len() == 1 {
            let handle = session
                .selection
                .primary()
                .filter(|id| session.document.is_selectable(*id))
                .and_then(|id| session.document.annotation(id))
                .and_then(|a| geometry::handle_at(a, p, radius).map(|h| (a, h)))
                .filter(|(_, h)| *h != Handle::Move);
            if let Some((annotation, handle)) = handle {
                let originals = vec![(annotation.id, annotation.shape.clone())];
                let bounds = annotation.bounds();
                debug!("Start resize of {} by {}", annotation.id, handle);
                session.history.begin_recording("Resize");
                self.state = InteractionState::Dragging {
                    mode: DragMode::Resize(handle),
                    origin: p,
                    bounds,
                    preview: originals.clone(),
                    originals,
                };
                return InteractionOutcome::Preview;
            }
        }

        match geometry::topmost_hit(&session.document, p, session.config.hit_tolerance) {
            Some(id) if modifiers.shift => {
                if session.selection.toggle(&session.document, id) {
                    InteractionOutcome::SelectionChanged
                } else {
                    InteractionOutcome::Ignored
                }
            }
            Some(id) => {
                let changed = if session.selection.contains(id) {
                    false
                } else {
                    session.selection.select_single(&session.document, id)
                };
                let originals: Vec<_> = session
                    .selection
                    .ids()
                    .iter()
                    .filter(|id| session.document.is_selectable(**id))
                    .filter_map(|id| session.document.annotation(*id))
                    .map(|a| (a.id, a.shape.clone()))
                    .collect();
                let bounds = originals
                    .iter()
                    .map(|(_, shape)| shape.bounds())
                    .reduce(|a, b| a.union(&b))
                    .unwrap_or_default();
                debug!("Start move of {} annotation(s)", originals.len());
                session.history.begin_recording("Move");
                self.state = InteractionState::Dragging {
                    mode: DragMode::Move,
                    origin: p,
                    bounds,
                    preview: originals.clone(),
                    originals,
                };
                if changed {
                    InteractionOutcome::SelectionChanged
                } else {
                    InteractionOutcome::Preview
                }
            }
            None => {
                let cleared = !modifiers.shift && session.selection.clear();
                session.history.begin_recording("Select");
                self.state = InteractionState::MarqueeSelecting {
                    origin: p,
                    current: p,
                };
                if cleared {
                    InteractionOutcome::SelectionChanged
                } else {
                    InteractionOutcome::Preview
                }
            }
        }
    }

    /// Pointer moved to a screen position.
    pub fn pointer_move(&mut self, session: &mut Session, screen: Point) -> InteractionOutcome {
        let p = session.viewport.screen_to_image(screen);
        let min_segment = session.config.min_segment_length;
        match &mut self.state {
            InteractionState::Idle | InteractionState::AwaitingContent { .. } => {
                InteractionOutcome::Ignored
            }
            InteractionState::Drawing { origin, draft } => {
                let origin = *origin;
                match draft {
                    Shape::Arrow(a) => a.end = p,
                    Shape::Line(l) => l.end = p,
                    Shape::Rectangle(r) => r.rect = Rect::from_corners(origin, p),
                    Shape::Circle(c) => c.rect = Rect::from_corners(origin, p),
                    Shape::Text(t) => t.rect = Rect::from_corners(origin, p),
                    Shape::Callout(c) => c.rect = Rect::from_corners(p, p),
                    Shape::Freehand(f) => {
                        if !f.push_point(p, min_segment) {
                            return InteractionOutcome::Ignored;
                        }
                    }
                }
                InteractionOutcome::Preview
            }
            InteractionState::Dragging {
                mode,
                origin,
                bounds,
                originals,
                preview,
            } => {
                let delta = p - *origin;
                *preview = match mode {
                    DragMode::Move => originals
                        .iter()
                        .map(|(id, shape)| (*id, shape.translated(delta)))
                        .collect(),
                    DragMode::Resize(handle) => {
                        let target = geometry::resize_rect(*bounds, *handle, delta);
                        originals
                            .iter()
                            .map(|(id, shape)| (*id, geometry::reshape(shape, target)))
                            .collect()
                    }
                };
                InteractionOutcome::Preview
            }
            InteractionState::MarqueeSelecting { current, .. } => {
                *current = p;
                InteractionOutcome::Preview
            }
        }
    }

    /// Pointer released at a screen position.
    pub fn pointer_up(&mut self, session: &mut Session, screen: Point) -> InteractionOutcome {
        if matches!(
            self.state,
            InteractionState::Idle | InteractionState::AwaitingContent { .. }
        ) {
            return InteractionOutcome::Ignored;
        }
        // Final position counts even without a preceding move event.
        self.pointer_move(session, screen);
        let p = session.viewport.screen_to_image(screen);
        let state = std::mem::take(&mut self.state);
        session.history.end_recording();

        match state {
            InteractionState::Drawing { origin, draft } => {
                self.finish_drawing(session, origin, p, draft)
            }
            InteractionState::Dragging {
                mode,
                origin,
                bounds,
                originals,
                ..
            } => finish_drag(session, mode, bounds, &originals, p - origin),
            InteractionState::MarqueeSelecting { origin, current } => {
                let rect = Rect::from_corners(origin, current);
                if rect.width < session.config.min_shape_size
                    && rect.height < session.config.min_shape_size
                {
                    return InteractionOutcome::Ignored;
                }
                let count = session.selection.select_by_marquee(&session.document, rect);
                debug!("Marquee {} selected {} annotation(s)", rect, count);
                InteractionOutcome::SelectionChanged
            }
            InteractionState::Idle | InteractionState::AwaitingContent { .. } => {
                InteractionOutcome::Ignored
            }
        }
    }

    /// Pointer left the canvas: the gesture is abandoned.
    pub fn pointer_leave(&mut self, session: &mut Session) -> InteractionOutcome {
        if matches!(self.state, InteractionState::AwaitingContent { .. }) {
            return InteractionOutcome::Ignored;
        }
        self.cancel(session)
    }

    fn finish_drawing(
        &mut self,
        session: &mut Session,
        origin: Point,
        release: Point,
        draft: Shape,
    ) -> InteractionOutcome {
        let min_size = session.config.min_shape_size;
        match draft {
            Shape::Text(t) => {
                let rect = if t.rect.is_degenerate(min_size) {
                    Rect::new(origin.x, origin.y, DEFAULT_BOX_WIDTH, t.font.size * 2.0)
                } else {
                    t.rect
                };
                self.await_content(ShapeKind::Text, rect, origin)
            }
            Shape::Callout(c) => {
                let height = c.font.size * 2.5;
                let corner = if origin.distance_to(release) < min_size {
                    origin + CALLOUT_BOX_OFFSET
                } else {
                    release
                };
                let rect = Rect::new(corner.x, corner.y, DEFAULT_BOX_WIDTH, height);
                self.await_content(ShapeKind::Callout, rect, origin)
            }
            shape => {
                if geometry::is_degenerate(&shape, min_size) {
                    let err = EditorError::invalid_geometry(format!(
                        "{} is smaller than {}px",
                        shape.kind(),
                        min_size
                    ));
                    warn!("Discarded draft: {}", err);
                    return InteractionOutcome::Discarded(err);
                }
                commit_new(session, shape)
            }
        }
    }

    fn await_content(&mut self, kind: ShapeKind, rect: Rect, anchor: Point) -> InteractionOutcome {
        debug!("Awaiting content for {} at {}", kind, rect);
        self.state = InteractionState::AwaitingContent { kind, rect, anchor };
        InteractionOutcome::ContentRequested { kind, rect }
    }

    /// Resolve a pending text or callout placement with the dialog's content.
    ///
    /// Blank content discards the placement.
    pub fn confirm_content(&mut self, session: &mut Session, content: &str) -> InteractionOutcome {
        let InteractionState::AwaitingContent { kind, rect, anchor } = self.state else {
            return InteractionOutcome::Ignored;
        };
        self.state = InteractionState::Idle;
        let font = session.config.default_font.clone();
        let shape = match kind {
            ShapeKind::Callout => Shape::Callout(MarkCallout::new(rect, anchor, content, font)),
            _ => Shape::Text(MarkText::new(rect, content, font)),
        };
        if geometry::is_degenerate(&shape, session.config.min_shape_size) {
            let err = EditorError::invalid_geometry(format!("{} has no content", kind));
            warn!("Discarded draft: {}", err);
            return InteractionOutcome::Discarded(err);
        }
        commit_new(session, shape)
    }

    /// Abandon the current gesture with no residue.
    pub fn cancel(&mut self, session: &mut Session) -> InteractionOutcome {
        if self.state.is_idle() {
            return InteractionOutcome::Ignored;
        }
        debug!("Cancelled {}", self.state.label());
        self.state = InteractionState::Idle;
        session.history.end_recording();
        InteractionOutcome::Cancelled
    }

    // ----- keyboard & wheel -----

    pub fn key_down(
        &mut self,
        session: &mut Session,
        key: Key,
        modifiers: Modifiers,
    ) -> InteractionOutcome {
        match key {
            Key::Escape => {
                if !self.state.is_idle() {
                    self.cancel(session)
                } else if session.selection.clear() {
                    InteractionOutcome::SelectionChanged
                } else {
                    InteractionOutcome::Ignored
                }
            }
            Key::Delete | Key::Backspace => {
                if !self.state.is_idle() {
                    return InteractionOutcome::Ignored;
                }
                match session.delete_selected() {
                    Ok(0) => InteractionOutcome::Ignored,
                    Ok(_) => InteractionOutcome::Committed {
                        created: Vec::new(),
                    },
                    Err(err) => InteractionOutcome::from_commit(Err(err)),
                }
            }
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                if self.state.is_dragging() {
                    return InteractionOutcome::Ignored;
                }
                let step = session.config.pan_step;
                let (dx, dy) = match key {
                    Key::ArrowLeft => (step, 0.0),
                    Key::ArrowRight => (-step, 0.0),
                    Key::ArrowUp => (0.0, step),
                    _ => (0.0, -step),
                };
                session.viewport.pan_by(dx, dy);
                InteractionOutcome::ViewportChanged
            }
            Key::Char(c) if modifiers.ctrl => {
                if !self.state.is_idle() {
                    return InteractionOutcome::Ignored;
                }
                self.shortcut(session, c.to_ascii_lowercase(), modifiers)
            }
            Key::Char(_) => InteractionOutcome::Ignored,
        }
    }

    fn shortcut(&mut self, session: &mut Session, c: char, modifiers: Modifiers) -> InteractionOutcome {
        match c {
            'z' if modifiers.shift => history_step(session.redo()),
            'z' => history_step(session.undo()),
            'y' => history_step(session.redo()),
            'c' => InteractionOutcome::Copied(session.copy()),
            'x' => match session.cut() {
                Ok(0) => InteractionOutcome::Ignored,
                result => InteractionOutcome::from_commit(result.map(|_| Vec::new())),
            },
            'v' => match session.paste() {
                Ok(ids) if ids.is_empty() => InteractionOutcome::Ignored,
                result => InteractionOutcome::from_commit(result),
            },
            'a' => {
                session.selection.select_all(&session.document);
                InteractionOutcome::SelectionChanged
            }
            's' => InteractionOutcome::SaveRequested,
            _ => InteractionOutcome::Ignored,
        }
    }

    /// Scroll wheel. With Ctrl held it zooms about the cursor, otherwise it pans
    /// (horizontally with Shift).
    pub fn wheel(
        &mut self,
        session: &mut Session,
        cursor: Point,
        delta_y: f64,
        modifiers: Modifiers,
    ) -> InteractionOutcome {
        if delta_y == 0.0 {
            return InteractionOutcome::Ignored;
        }
        if modifiers.ctrl {
            let step = session.config.zoom_step;
            let factor = if delta_y < 0.0 { step } else { 1.0 / step };
            session.viewport.zoom_at_cursor(cursor, factor);
        } else if modifiers.shift {
            session.viewport.pan_by(-delta_y, 0.0);
        } else {
            session.viewport.pan_by(0.0, -delta_y);
        }
        InteractionOutcome::ViewportChanged
    }
}

fn commit_new(session: &mut Session, shape: Shape) -> InteractionOutcome {
    let result = session.add_annotation(shape).map(|id| {
        session.selection.select_single(&session.document, id);
        vec![id]
    });
    InteractionOutcome::from_commit(result)
}

fn finish_drag(
    session: &mut Session,
    mode: DragMode,
    bounds: Rect,
    originals: &[(AnnotationId, Shape)],
    delta: Vector,
) -> InteractionOutcome {
    if delta.is_zero() || originals.is_empty() {
        return InteractionOutcome::Ignored;
    }
    let ids: Vec<_> = originals.iter().map(|(id, _)| *id).collect();
    let command = match mode {
        DragMode::Move => DocumentCommand::move_annotations(&session.document, &ids, delta),
        DragMode::Resize(handle) => DocumentCommand::resize_annotation(
            &session.document,
            ids[0],
            geometry::resize_rect(bounds, handle, delta),
        ),
    };
    let result = command.and_then(|cmd| session.execute(cmd).map(|_| Vec::new()));
    InteractionOutcome::from_commit(result)
}

fn history_step(result: Result<bool, EditorError>) -> InteractionOutcome {
    match result {
        Ok(true) => InteractionOutcome::HistoryMoved,
        Ok(false) => InteractionOutcome::Ignored,
        Err(err) => InteractionOutcome::from_commit(Err(err)),
    }
}

/// Zero-size shape a drawing tool starts from at `p`. `None` for tools that
/// do not draw.
fn draft_shape(tool: Tool, p: Point, config: &EditorConfig) -> Option<Shape> {
    let shape = match tool {
        Tool::Select => return None,
        Tool::Arrow => Shape::Arrow(MarkArrow::new(p, p)),
        Tool::Line => Shape::Line(MarkLine::new(p, p)),
        Tool::Rectangle => Shape::Rectangle(MarkRectangle::from_corners(p, p)),
        Tool::Circle => Shape::Circle(MarkCircle::new(Rect::from_corners(p, p))),
        Tool::Freehand => Shape::Freehand(MarkFreehand::from_points(&[p], config.min_segment_length)),
        Tool::Text => Shape::Text(MarkText::new(
            Rect::from_corners(p, p),
            "",
            config.default_font.clone(),
        )),
        Tool::Callout => Shape::Callout(MarkCallout::new(
            Rect::from_corners(p, p),
            p,
            "",
            config.default_font.clone(),
        )),
    };
    Some(shape)
}
