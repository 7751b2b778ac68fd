//! Property-panel edits applied to a single annotation.

use crate::model::{Annotation, CalloutShape, LeaderStyle, Shape, TailMarker};
use annotkit_core::{EditorError, EditorResult, Font, Point, Style};

/// A partial update. `None` fields are left untouched.
///
/// Applying a patch yields its inverse: a patch holding the previous values
/// of exactly the fields that were set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotationPatch {
    pub style: Option<Style>,
    pub content: Option<String>,
    pub font: Option<Font>,
    pub anchor: Option<Point>,
    pub callout_shape: Option<CalloutShape>,
    pub leader_style: Option<LeaderStyle>,
    pub tail_marker: Option<TailMarker>,
}

impl AnnotationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    pub fn anchor(mut self, anchor: Point) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn callout_shape(mut self, shape: CalloutShape) -> Self {
        self.callout_shape = Some(shape);
        self
    }

    pub fn leader_style(mut self, style: LeaderStyle) -> Self {
        self.leader_style = Some(style);
        self
    }

    pub fn tail_marker(mut self, marker: TailMarker) -> Self {
        self.tail_marker = Some(marker);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn touches_text(&self) -> bool {
        self.content.is_some() || self.font.is_some()
    }

    fn touches_callout(&self) -> bool {
        self.anchor.is_some()
            || self.callout_shape.is_some()
            || self.leader_style.is_some()
            || self.tail_marker.is_some()
    }

    /// Check every field applies to the annotation's kind.
    pub fn validate_for(&self, annotation: &Annotation) -> EditorResult<()> {
        let kind = annotation.kind();
        let text_ok = matches!(annotation.shape, Shape::Text(_) | Shape::Callout(_));
        let callout_ok = matches!(annotation.shape, Shape::Callout(_));
        if self.touches_text() && !text_ok {
            return Err(EditorError::invalid_geometry(format!(
                "{} has no text content",
                kind
            )));
        }
        if self.touches_callout() && !callout_ok {
            return Err(EditorError::invalid_geometry(format!(
                "{} is not a callout",
                kind
            )));
        }
        Ok(())
    }

    /// Apply to `annotation`, returning the inverse patch.
    ///
    /// Validation happens before any field is written, so an error leaves the
    /// annotation untouched.
    pub(crate) fn apply_to(&self, annotation: &mut Annotation) -> EditorResult<AnnotationPatch> {
        self.validate_for(annotation)?;
        let mut inverse = AnnotationPatch::default();

        if let Some(style) = &self.style {
            inverse.style = Some(std::mem::replace(&mut annotation.style, style.clone()));
        }

        let (content, font) = match &mut annotation.shape {
            Shape::Text(t) => (Some(&mut t.content), Some(&mut t.font)),
            Shape::Callout(c) => (Some(&mut c.content), Some(&mut c.font)),
            _ => (None, None),
        };
        if let (Some(new), Some(slot)) = (&self.content, content) {
            inverse.content = Some(std::mem::replace(slot, new.clone()));
        }
        if let (Some(new), Some(slot)) = (&self.font, font) {
            inverse.font = Some(std::mem::replace(slot, new.clone()));
        }

        if let Shape::Callout(c) = &mut annotation.shape {
            if let Some(anchor) = self.anchor {
                inverse.anchor = Some(std::mem::replace(&mut c.anchor, anchor));
            }
            if let Some(shape) = self.callout_shape {
                inverse.callout_shape = Some(std::mem::replace(&mut c.callout_shape, shape));
            }
            if let Some(style) = self.leader_style {
                inverse.leader_style = Some(std::mem::replace(&mut c.leader_style, style));
            }
            if let Some(marker) = self.tail_marker {
                inverse.tail_marker = Some(std::mem::replace(&mut c.tail_marker, marker));
            }
        }

        Ok(inverse)
    }
}
