use super::{map_point, MarkupShape};
use annotkit_core::{Point, Rect, Vector};

/// A straight arrow whose head sits at `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkArrow {
    pub start: Point,
    pub end: Point,
}

impl MarkArrow {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    /// Direction of travel in radians, 0 pointing along +x.
    pub fn angle(&self) -> f64 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }
}

impl MarkupShape for MarkArrow {
    fn bounds(&self) -> Rect {
        Rect::from_corners(self.start, self.end)
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        p.distance_to_segment(self.start, self.end) <= tolerance
    }

    fn translate(&mut self, delta: Vector) {
        self.start += delta;
        self.end += delta;
    }

    fn map_bounds(&mut self, from: Rect, to: Rect) {
        self.start = map_point(self.start, from, to);
        self.end = map_point(self.end, from, to);
    }
}
