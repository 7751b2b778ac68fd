use super::{map_rect, MarkupShape};
use annotkit_core::{Font, Point, Rect, Vector};

/// A text label. Only movable: the box follows its content.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkText {
    pub rect: Rect,
    pub content: String,
    pub font: Font,
}

impl MarkText {
    pub fn new(rect: Rect, content: impl Into<String>, font: Font) -> Self {
        Self {
            rect,
            content: content.into(),
            font,
        }
    }

    /// Lines of content, split on `\n`.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.lines()
    }
}

impl MarkupShape for MarkText {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn contains_point(&self, p: Point, _tolerance: f64) -> bool {
        self.rect.contains(p)
    }

    fn translate(&mut self, delta: Vector) {
        self.rect = self.rect.translated(delta);
    }

    fn map_bounds(&mut self, from: Rect, to: Rect) {
        self.rect = map_rect(self.rect, from, to);
    }

    fn is_resizable(&self) -> bool {
        false
    }
}
