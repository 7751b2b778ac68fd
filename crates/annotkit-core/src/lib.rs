//! # AnnotKit Core
//!
//! Core types shared by every AnnotKit crate:
//!
//! - **Geometry primitives**: [`Point`], [`Vector`] and [`Rect`] in image-space
//! - **Identifiers**: [`AnnotationId`] and [`LayerId`], allocated monotonically
//! - **Errors**: the typed editing outcomes in [`EditorError`] plus the
//!   crate-spanning [`Error`] umbrella
//! - **Events**: [`EditorEvent`] and a synchronous [`EventDispatcher`] used to
//!   notify the render layer after each committed change
//! - **Styling**: [`Style`], [`Color`] and [`Font`]
//! - **Constants**: engine-wide defaults (history bound, zoom range, paste offset)

pub mod constants;
pub mod error;
pub mod event;
pub mod geometry;
pub mod ids;
pub mod style;

pub use constants::*;
pub use error::{EditorError, EditorResult, Error, Result};
pub use event::{EditorEvent, EventCategory, EventDispatcher, EventFilter, SubscriptionId};
pub use geometry::{Point, Rect, Vector};
pub use ids::{AnnotationId, IdAllocator, LayerId};
pub use style::{Color, Font, FontWeight, Style};
