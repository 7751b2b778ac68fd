//! Engine-wide defaults.
//!
//! The settings crate seeds its `EditorConfig` from these values.

/// Maximum number of undoable commands kept in history.
pub const HISTORY_LIMIT: usize = 100;

/// Smallest zoom factor (10%).
pub const MIN_ZOOM: f64 = 0.10;

/// Largest zoom factor (500%).
pub const MAX_ZOOM: f64 = 5.00;

/// Multiplier applied by a single zoom-in / zoom-out step.
pub const ZOOM_STEP: f64 = 1.10;

/// Image-space offset applied to pasted annotations.
pub const PASTE_OFFSET: (f64, f64) = (10.0, 10.0);

/// Freehand points closer than this to the previous point are coalesced.
pub const MIN_SEGMENT_LENGTH: f64 = 2.0;

/// Drawn shapes smaller than this in either dimension are discarded.
pub const MIN_SHAPE_SIZE: f64 = 2.0;

/// Extra slack (image-space units) added to stroke hit-testing.
pub const HIT_TOLERANCE: f64 = 4.0;

/// Side length of a resize handle in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;

/// Screen pixels panned per arrow-key press.
pub const PAN_STEP: f64 = 20.0;

/// Name given to the layer every new document starts with.
pub const DEFAULT_LAYER_NAME: &str = "Default";
