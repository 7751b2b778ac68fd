use super::{map_point, MarkupShape};
use annotkit_core::{Point, Rect, Vector};

/// A hand-drawn polyline.
///
/// Consecutive points are kept at least `min_segment_length` apart; closer
/// points are coalesced into the previous one as they arrive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkFreehand {
    pub points: Vec<Point>,
}

impl MarkFreehand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw samples, applying the segment-length filter.
    pub fn from_points(points: &[Point], min_segment_length: f64) -> Self {
        Self {
            points: coalesce_points(points, min_segment_length),
        }
    }

    /// Append a sample. Returns false when it was coalesced away.
    pub fn push_point(&mut self, p: Point, min_segment_length: f64) -> bool {
        match self.points.last() {
            Some(last) if last.distance_to(p) < min_segment_length => false,
            _ => {
                self.points.push(p);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Drop every point closer than `min_segment_length` to the last kept point.
pub fn coalesce_points(points: &[Point], min_segment_length: f64) -> Vec<Point> {
    let mut kept: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        match kept.last() {
            Some(last) if last.distance_to(p) < min_segment_length => {}
            _ => kept.push(p),
        }
    }
    kept
}

impl MarkupShape for MarkFreehand {
    fn bounds(&self) -> Rect {
        Rect::enclosing(self.points.iter().copied()).unwrap_or_default()
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        match self.points.as_slice() {
            [] => false,
            [only] => only.distance_to(p) <= tolerance,
            pts => pts
                .windows(2)
                .any(|seg| p.distance_to_segment(seg[0], seg[1]) <= tolerance),
        }
    }

    fn translate(&mut self, delta: Vector) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    fn map_bounds(&mut self, from: Rect, to: Rect) {
        for p in &mut self.points {
            *p = map_point(*p, from, to);
        }
    }

    fn is_resizable(&self) -> bool {
        false
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.points.iter().any(|p| rect.contains(*p))
    }
}
