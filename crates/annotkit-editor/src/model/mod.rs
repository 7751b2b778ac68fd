use annotkit_core::{AnnotationId, LayerId, Point, Rect, Style, Vector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

mod arrow;
mod callout;
mod circle;
mod freehand;
mod line;
mod rectangle;
mod text;

pub use arrow::MarkArrow;
pub use callout::{CalloutShape, LeaderStyle, MarkCallout, TailMarker};
pub use circle::MarkCircle;
pub use freehand::{coalesce_points, MarkFreehand};
pub use line::MarkLine;
pub use rectangle::MarkRectangle;
pub use text::MarkText;

/// Geometry capabilities every annotation kind provides.
pub trait MarkupShape {
    /// Axis-aligned image-space bounding box.
    fn bounds(&self) -> Rect;

    /// Exact per-kind hit test, `tolerance` in image-space units.
    fn contains_point(&self, p: Point, tolerance: f64) -> bool;

    fn translate(&mut self, delta: Vector);

    /// Re-map the geometry so that what occupied `from` now occupies `to`.
    fn map_bounds(&mut self, from: Rect, to: Rect);

    /// Whether the 8 resize handles apply. Non-resizable kinds only get a move handle.
    fn is_resizable(&self) -> bool {
        true
    }

    /// Marquee test. Bounding-box overlap unless a kind knows better.
    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.bounds().intersects(rect)
    }
}

/// Maps `p` from the `from` box into the `to` box. Zero-extent axes translate only.
pub(crate) fn map_point(p: Point, from: Rect, to: Rect) -> Point {
    let axis = |v: f64, from_min: f64, from_len: f64, to_min: f64, to_len: f64| {
        if from_len == 0.0 {
            to_min + (v - from_min)
        } else {
            to_min + (v - from_min) * (to_len / from_len)
        }
    };
    Point::new(
        axis(p.x, from.x, from.width, to.x, to.width),
        axis(p.y, from.y, from.height, to.y, to.height),
    )
}

pub(crate) fn map_rect(r: Rect, from: Rect, to: Rect) -> Rect {
    Rect::from_corners(map_point(r.min(), from, to), map_point(r.max(), from, to))
}

/// Annotation kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Arrow,
    Rectangle,
    Circle,
    Line,
    Freehand,
    Text,
    Callout,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Arrow => "Arrow",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Line => "Line",
            ShapeKind::Freehand => "Freehand",
            ShapeKind::Text => "Text",
            ShapeKind::Callout => "Callout",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Arrow(MarkArrow),
    Rectangle(MarkRectangle),
    Circle(MarkCircle),
    Line(MarkLine),
    Freehand(MarkFreehand),
    Text(MarkText),
    Callout(MarkCallout),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Arrow(_) => ShapeKind::Arrow,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Freehand(_) => ShapeKind::Freehand,
            Shape::Text(_) => ShapeKind::Text,
            Shape::Callout(_) => ShapeKind::Callout,
        }
    }

    fn as_markup(&self) -> &dyn MarkupShape {
        match self {
            Shape::Arrow(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Line(s) => s,
            Shape::Freehand(s) => s,
            Shape::Text(s) => s,
            Shape::Callout(s) => s,
        }
    }

    fn as_markup_mut(&mut self) -> &mut dyn MarkupShape {
        match self {
            Shape::Arrow(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Line(s) => s,
            Shape::Freehand(s) => s,
            Shape::Text(s) => s,
            Shape::Callout(s) => s,
        }
    }

    /// A copy moved by `delta`.
    pub fn translated(&self, delta: Vector) -> Shape {
        let mut moved = self.clone();
        moved.translate(delta);
        moved
    }

    /// Text content for text-bearing kinds.
    pub fn content(&self) -> Option<&str> {
        match self {
            Shape::Text(t) => Some(&t.content),
            Shape::Callout(c) => Some(&c.content),
            _ => None,
        }
    }
}

impl MarkupShape for Shape {
    fn bounds(&self) -> Rect {
        self.as_markup().bounds()
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        self.as_markup().contains_point(p, tolerance)
    }

    fn translate(&mut self, delta: Vector) {
        self.as_markup_mut().translate(delta)
    }

    fn map_bounds(&mut self, from: Rect, to: Rect) {
        self.as_markup_mut().map_bounds(from, to)
    }

    fn is_resizable(&self) -> bool {
        self.as_markup().is_resizable()
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.as_markup().intersects_rect(rect)
    }
}

/// A single piece of markup placed on a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub layer_id: LayerId,
    pub style: Style,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub shape: Shape,
}

impl Annotation {
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }
}

/// Everything needed to create an annotation except its id and layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDraft {
    pub shape: Shape,
    pub style: Style,
    pub created_by: String,
}

impl AnnotationDraft {
    pub fn new(shape: Shape, style: Style) -> Self {
        Self {
            shape,
            style,
            created_by: String::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.created_by = author.into();
        self
    }
}

impl From<&Annotation> for AnnotationDraft {
    fn from(annotation: &Annotation) -> Self {
        Self {
            shape: annotation.shape.clone(),
            style: annotation.style.clone(),
            created_by: annotation.created_by.clone(),
        }
    }
}
