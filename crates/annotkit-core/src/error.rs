//! Error handling for AnnotKit
//!
//! Two layers of errors:
//! - [`EditorError`]: the typed outcomes of document mutations. None of these
//!   are fatal; each one means "the operation did not happen".
//! - [`Error`]: the umbrella type for everything that can fail across the
//!   workspace, including I/O and JSON.
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::ids::{AnnotationId, LayerId};
use thiserror::Error;

/// Editing error type
///
/// Returned by every document mutation and by commands that wrap them. The
/// document is left unchanged whenever one of these is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Mutation attempted on a locked layer
    #[error("Layer {layer} is locked")]
    LockedLayer {
        /// The locked layer.
        layer: LayerId,
    },

    /// The only layer of a document cannot be deleted
    #[error("Cannot delete the last remaining layer")]
    LastLayer,

    /// The default layer cannot be deleted
    #[error("Cannot delete the default layer {layer}")]
    DefaultLayer {
        /// The default layer id.
        layer: LayerId,
    },

    /// Reference to an annotation that does not exist (or no longer exists)
    #[error("Annotation {id} not found")]
    AnnotationNotFound {
        /// The stale annotation id.
        id: AnnotationId,
    },

    /// Reference to a layer that does not exist (or no longer exists)
    #[error("Layer {id} not found")]
    LayerNotFound {
        /// The stale layer id.
        id: LayerId,
    },

    /// Degenerate geometry on commit
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// Why the geometry was rejected.
        reason: String,
    },
}

impl EditorError {
    /// Create an invalid geometry error
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        EditorError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Check if this error refers to a stale annotation or layer id
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EditorError::AnnotationNotFound { .. } | EditorError::LayerNotFound { .. }
        )
    }

    /// Check if this error was caused by a locked layer
    pub fn is_locked(&self) -> bool {
        matches!(self, EditorError::LockedLayer { .. })
    }
}

/// Main error type for AnnotKit
///
/// Encompasses editing, serialization and I/O failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Editing error
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is an editing error
    pub fn is_editor_error(&self) -> bool {
        matches!(self, Error::Editor(_))
    }
}

/// Result type for editing operations
pub type EditorResult<T> = std::result::Result<T, EditorError>;

/// Result type for AnnotKit operations
pub type Result<T> = std::result::Result<T, Error>;
