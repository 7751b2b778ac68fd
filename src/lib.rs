//! # AnnotKit
//!
//! An interactive annotation editing engine for markup layered over raster
//! images: arrows, rectangles, circles, lines, freehand paths, text and
//! callouts, organized in layers with full undo/redo.
//!
//! ## Architecture
//!
//! AnnotKit is organized as a workspace with multiple crates:
//!
//! 1. **annotkit-core** - Geometry primitives, styles, ids, errors, events
//! 2. **annotkit-settings** - Editor configuration (limits, tolerances, defaults)
//! 3. **annotkit-editor** - Document model, commands, history, selection,
//!    viewport, interaction controller, JSON persistence and SVG export
//! 4. **annotkit** - This crate: logging setup and a command-line tool for
//!    saved documents
//!
//! The engine is UI-agnostic. A host feeds pointer, keyboard and wheel input
//! into [`AnnotationEditor`] and renders from its read accessors.

pub mod cli;

pub use annotkit_core::{
    AnnotationId, Color, EditorError, EditorEvent, EditorResult, Error, EventFilter, Font,
    LayerId, Point, Rect, Result, Style, Vector,
};
pub use annotkit_editor::{
    serialization, svg_export, AnnotationEditor, Document, InteractionOutcome, Key, Modifiers,
    Shape, ShapeKind, Tool,
};
pub use annotkit_settings::EditorConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatted output on stderr, keeping stdout for command output
/// - RUST_LOG environment variable support
/// - INFO as the minimum level
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(())
}
