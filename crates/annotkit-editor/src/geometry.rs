//! Geometry kernel: stateless hit-testing, bounding boxes and handle math.
//!
//! Everything here is a pure function of its inputs. Per-kind behavior is
//! dispatched through [`MarkupShape`] on the [`Shape`] sum type.

use crate::document::Document;
use crate::model::{Annotation, MarkupShape, Shape};
use annotkit_core::{AnnotationId, Point, Rect, Vector};
use std::fmt;

/// A draggable control point.
///
/// The eight resize handles are numbered clockwise from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    /// Drags the whole annotation.
    Move,
}

impl Handle {
    /// The eight resize handles in index order.
    pub const RESIZE: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];

    /// Index 0..8 of a resize handle, `None` for [`Handle::Move`].
    pub fn index(self) -> Option<usize> {
        Handle::RESIZE.iter().position(|h| *h == self)
    }

    pub fn from_index(index: usize) -> Option<Handle> {
        Handle::RESIZE.get(index).copied()
    }

    /// Which edges of the box this handle drags: (left, top, right, bottom).
    fn edges(self) -> (bool, bool, bool, bool) {
        match self {
            Handle::TopLeft => (true, true, false, false),
            Handle::Top => (false, true, false, false),
            Handle::TopRight => (false, true, true, false),
            Handle::Right => (false, false, true, false),
            Handle::BottomRight => (false, false, true, true),
            Handle::Bottom => (false, false, false, true),
            Handle::BottomLeft => (true, false, false, true),
            Handle::Left => (true, false, false, false),
            Handle::Move => (true, true, true, true),
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(i) => write!(f, "handle {}", i),
            None => write!(f, "move handle"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandlePosition {
    pub handle: Handle,
    pub point: Point,
}

/// Exact hit test in image-space.
///
/// Strokes count as hit within half their width plus `tolerance`.
pub fn hit_test(point: Point, annotation: &Annotation, tolerance: f64) -> bool {
    let slack = annotation.style.stroke_width / 2.0 + tolerance;
    annotation.shape.contains_point(point, slack)
}

/// Axis-aligned bounding box used for marquee tests and handle placement.
pub fn bounding_box(annotation: &Annotation) -> Rect {
    annotation.shape.bounds()
}

/// Handles offered for an annotation.
///
/// Resizable kinds get the four corners and four edge midpoints; Freehand and
/// Text get a single move handle at their center.
pub fn handle_positions(annotation: &Annotation) -> Vec<HandlePosition> {
    let b = bounding_box(annotation);
    if !annotation.shape.is_resizable() {
        return vec![HandlePosition {
            handle: Handle::Move,
            point: b.center(),
        }];
    }
    let (l, t, r, bo) = (b.left(), b.top(), b.right(), b.bottom());
    let (cx, cy) = (b.center().x, b.center().y);
    let points = [
        Point::new(l, t),
        Point::new(cx, t),
        Point::new(r, t),
        Point::new(r, cy),
        Point::new(r, bo),
        Point::new(cx, bo),
        Point::new(l, bo),
        Point::new(l, cy),
    ];
    Handle::RESIZE
        .iter()
        .zip(points)
        .map(|(&handle, point)| HandlePosition { handle, point })
        .collect()
}

/// Handle within `radius` of `point`, if any.
pub fn handle_at(annotation: &Annotation, point: Point, radius: f64) -> Option<Handle> {
    handle_positions(annotation)
        .into_iter()
        .find(|h| h.point.distance_to(point) <= radius)
        .map(|h| h.handle)
}

/// New bounds after dragging `handle` by `delta`.
///
/// Corner handles move two edges, midpoint handles one. Dragging past the
/// opposite edge swaps min and max so the size stays non-negative.
pub fn resize(annotation: &Annotation, handle: Handle, delta: Vector) -> Rect {
    resize_rect(bounding_box(annotation), handle, delta)
}

/// [`resize`] on a bare rectangle.
pub fn resize_rect(bounds: Rect, handle: Handle, delta: Vector) -> Rect {
    let (left, top, right, bottom) = handle.edges();
    let mut min = bounds.min();
    let mut max = bounds.max();
    if left {
        min.x += delta.dx;
    }
    if right {
        max.x += delta.dx;
    }
    if top {
        min.y += delta.dy;
    }
    if bottom {
        max.y += delta.dy;
    }
    Rect::from_corners(min, max)
}

/// A copy of `shape` mapped into `new_bounds`.
pub fn reshape(shape: &Shape, new_bounds: Rect) -> Shape {
    let mut out = shape.clone();
    out.map_bounds(shape.bounds(), new_bounds);
    out
}

/// Marquee intersection: bounding-box overlap, or for Freehand any path point inside.
pub fn intersects_marquee(annotation: &Annotation, marquee: &Rect) -> bool {
    annotation.shape.intersects_rect(marquee)
}

/// Whether a freshly drawn shape is too small (or empty) to keep.
pub fn is_degenerate(shape: &Shape, min_size: f64) -> bool {
    match shape {
        Shape::Rectangle(r) => r.rect.is_degenerate(min_size),
        Shape::Circle(c) => c.rect.is_degenerate(min_size),
        Shape::Arrow(a) => a.length() < min_size,
        Shape::Line(l) => l.length() < min_size,
        Shape::Freehand(f) => f.len() < 2,
        Shape::Text(t) => t.content.trim().is_empty(),
        Shape::Callout(c) => c.content.trim().is_empty(),
    }
}

/// Topmost annotation under `point` on a visible, unlocked layer.
pub fn topmost_hit(doc: &Document, point: Point, tolerance: f64) -> Option<AnnotationId> {
    doc.layers()
        .iter()
        .rev()
        .filter(|layer| layer.is_selectable())
        .flat_map(|layer| layer.annotation_ids().iter().rev())
        .filter_map(|id| doc.annotation(*id))
        .find(|a| hit_test(point, a, tolerance))
        .map(|a| a.id)
}
