use super::{map_point, map_rect, MarkupShape};
use annotkit_core::{Font, Point, Rect, Vector};
use serde::{Deserialize, Serialize};

/// Outline drawn around the callout text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutShape {
    #[default]
    Rectangle,
    Rounded,
    Cloud,
}

/// How the leader line travels from the box to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderStyle {
    #[default]
    Straight,
    Curved,
}

/// Decoration at the anchor end of the leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TailMarker {
    None,
    #[default]
    Arrow,
    Triangle,
    Circle,
}

/// A text box with a leader line pointing at `anchor`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkCallout {
    pub rect: Rect,
    pub anchor: Point,
    pub content: String,
    pub font: Font,
    pub callout_shape: CalloutShape,
    pub leader_style: LeaderStyle,
    pub tail_marker: TailMarker,
}

impl MarkCallout {
    pub fn new(rect: Rect, anchor: Point, content: impl Into<String>, font: Font) -> Self {
        Self {
            rect,
            anchor,
            content: content.into(),
            font,
            callout_shape: CalloutShape::default(),
            leader_style: LeaderStyle::default(),
            tail_marker: TailMarker::default(),
        }
    }

    /// Point on the box outline closest to the anchor, or `None` when the
    /// anchor lies inside the box and no leader is drawn.
    pub fn leader_start(&self) -> Option<Point> {
        if self.rect.contains(self.anchor) {
            return None;
        }
        Some(Point::new(
            self.anchor.x.clamp(self.rect.left(), self.rect.right()),
            self.anchor.y.clamp(self.rect.top(), self.rect.bottom()),
        ))
    }
}

impl MarkupShape for MarkCallout {
    fn bounds(&self) -> Rect {
        self.rect.union(&Rect::new(self.anchor.x, self.anchor.y, 0.0, 0.0))
    }

    fn contains_point(&self, p: Point, _tolerance: f64) -> bool {
        self.bounds().contains(p)
    }

    fn translate(&mut self, delta: Vector) {
        self.rect = self.rect.translated(delta);
        self.anchor += delta;
    }

    fn map_bounds(&mut self, from: Rect, to: Rect) {
        self.rect = map_rect(self.rect, from, to);
        self.anchor = map_point(self.anchor, from, to);
    }
}
