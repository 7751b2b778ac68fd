use super::{map_rect, MarkupShape};
use annotkit_core::{Point, Rect, Vector};

#[derive(Debug, Clone, PartialEq)]
pub struct MarkRectangle {
    pub rect: Rect,
}

impl MarkRectangle {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(Rect::from_corners(a, b))
    }
}

impl MarkupShape for MarkRectangle {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        self.rect.inflated(tolerance).contains(p)
    }

    fn translate(&mut self, delta: Vector) {
        self.rect = self.rect.translated(delta);
    }

    fn map_bounds(&mut self, from: Rect, to: Rect) {
        self.rect = map_rect(self.rect, from, to);
    }
}
