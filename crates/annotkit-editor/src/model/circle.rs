use super::{map_rect, MarkupShape};
use annotkit_core::{Point, Rect, Vector};

/// Ellipse inscribed in `rect`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkCircle {
    pub rect: Rect,
}

impl MarkCircle {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }

    pub fn radii(&self) -> (f64, f64) {
        (self.rect.width / 2.0, self.rect.height / 2.0)
    }
}

impl MarkupShape for MarkCircle {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        let c = self.center();
        let (rx, ry) = self.radii();
        let (rx, ry) = (rx + tolerance, ry + tolerance);
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let nx = (p.x - c.x) / rx;
        let ny = (p.y - c.y) / ry;
        nx * nx + ny * ny <= 1.0
    }

    fn translate(&mut self, delta: Vector) {
        self.rect = self.rect.translated(delta);
    }

    fn map_bounds(&mut self, from: Rect, to: Rect) {
        self.rect = map_rect(self.rect, from, to);
    }
}
