//! # AnnotKit Editor
//!
//! The interactive annotation editing engine: create, select, transform,
//! organize and undo/redo markup layered over a fixed-size raster image.
//!
//! ## Core Components
//!
//! - **Document Model**: layers and annotations, mutated only through commands
//! - **Command/History Engine**: invertible commands with a bounded undo stack
//! - **Geometry Kernel**: hit-testing, bounding boxes, resize handles
//! - **Viewport Transform**: image-space to screen mapping, zoom and pan
//! - **Selection Manager**: ordered selection with a primary entry
//! - **Interaction Controller**: tools, gestures and keyboard shortcuts
//! - **Serialization**: JSON persistence and SVG export
//!
//! ## Architecture
//!
//! ```text
//! AnnotationEditor (host facade, events, save callback)
//!   └── InteractionController (tools, gestures)
//!         └── Session (document, history, selection, viewport, clipboard)
//!               ├── CommandHistory ── DocumentCommand ──> Document
//!               └── Geometry kernel / Viewport (pure math)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use annotkit_editor::{AnnotationEditor, Modifiers, Tool};
//! use annotkit_core::Point;
//!
//! let mut editor = AnnotationEditor::new(1920, 1080, None);
//! editor.set_tool(Tool::Rectangle);
//! editor.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE);
//! editor.pointer_up(Point::new(120.0, 80.0));
//! editor.undo()?;
//! ```

pub mod commands;
pub mod document;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod layer;
pub mod model;
pub mod patch;
pub mod selection;
pub mod serialization;
pub mod session;
pub mod svg_export;
pub mod viewport;

pub use commands::{CompositeCommand, DocumentCommand};
pub use document::Document;
pub use editor::{AnnotationEditor, SaveCallback};
pub use geometry::{Handle, HandlePosition};
pub use history::{CommandHistory, HistoryState};
pub use interaction::{
    DragMode, InteractionController, InteractionOutcome, InteractionState, Key, Modifiers,
    Preview, Tool,
};
pub use layer::Layer;
pub use model::{
    Annotation, AnnotationDraft, CalloutShape, LeaderStyle, MarkArrow, MarkCallout, MarkCircle,
    MarkFreehand, MarkLine, MarkRectangle, MarkText, MarkupShape, Shape, ShapeKind, TailMarker,
};
pub use patch::AnnotationPatch;
pub use selection::SelectionManager;
pub use serialization::{DocumentFile, FILE_FORMAT_VERSION};
pub use session::{Clipboard, Session};
pub use viewport::Viewport;
