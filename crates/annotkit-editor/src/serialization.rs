//! JSON persistence of annotation documents.
//!
//! The on-disk form is a flat, camelCase document:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "imageWidth": 1920,
//!   "imageHeight": 1080,
//!   "defaultLayerId": 1,
//!   "nextLayerId": 2,
//!   "nextAnnotationId": 4,
//!   "layers": [{ "id": 1, "name": "Default", "visible": true, "locked": false, "order": 0 }],
//!   "annotations": [{ "id": 3, "layerId": 1, "kind": "arrow", "bounds": {..}, .. }]
//! }
//! ```
//!
//! Annotations are written in paint order, so reading them back restores the
//! z-order inside every layer. Serializing a loaded document reproduces the
//! input byte for byte when the input was written by this module.

use crate::document::Document;
use crate::layer::Layer;
use crate::model::{
    Annotation, CalloutShape, LeaderStyle, MarkArrow, MarkCallout, MarkCircle, MarkFreehand,
    MarkLine, MarkRectangle, MarkText, Shape, ShapeKind, TailMarker,
};
use annotkit_core::{AnnotationId, Error, Font, LayerId, Point, Rect, Result, Style};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Document file format version
pub const FILE_FORMAT_VERSION: &str = "1.0";

/// Complete document file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    pub version: String,
    pub image_width: u32,
    pub image_height: u32,
    pub default_layer_id: LayerId,
    pub next_layer_id: u64,
    pub next_annotation_id: u64,
    pub layers: Vec<LayerData>,
    pub annotations: Vec<AnnotationData>,
}

/// Serialized layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerData {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub order: usize,
}

/// Serialized annotation.
///
/// `bounds` carries the geometry of box-shaped kinds (for a callout, the text
/// box without its anchor). Endpoint, path and text fields are present only
/// for the kinds that use them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationData {
    pub id: AnnotationId,
    pub layer_id: LayerId,
    pub kind: ShapeKind,
    pub bounds: Rect,
    pub style: Style,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callout_shape: Option<CalloutShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_style: Option<LeaderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_marker: Option<TailMarker>,
}

impl DocumentFile {
    /// Snapshot a document into its file form.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            image_width: doc.image_width(),
            image_height: doc.image_height(),
            default_layer_id: doc.default_layer_id(),
            next_layer_id: doc.next_layer_id(),
            next_annotation_id: doc.next_annotation_id(),
            layers: doc
                .layers()
                .iter()
                .map(|l| LayerData {
                    id: l.id,
                    name: l.name.clone(),
                    visible: l.visible,
                    locked: l.locked,
                    order: l.order,
                })
                .collect(),
            annotations: doc.annotations().map(AnnotationData::from_annotation).collect(),
        }
    }

    /// Rebuild the document, validating ids and per-kind fields.
    pub fn into_document(self) -> Result<Document> {
        let major = self.version.split('.').next().unwrap_or_default();
        if major != "1" {
            return Err(Error::other(format!(
                "Unsupported document version: {}",
                self.version
            )));
        }
        let layers = self
            .layers
            .into_iter()
            .map(|data| {
                let mut layer = Layer::new(data.id, data.name);
                layer.visible = data.visible;
                layer.locked = data.locked;
                layer.order = data.order;
                layer
            })
            .collect();
        let annotations = self
            .annotations
            .into_iter()
            .map(|data| {
                let id = data.id;
                data.into_annotation()
                    .map_err(|err| Error::other(format!("Invalid annotation {}: {}", id, err)))
            })
            .collect::<Result<Vec<_>>>()?;

        let doc = Document::from_parts(
            self.image_width,
            self.image_height,
            layers,
            annotations,
            self.default_layer_id,
            self.next_layer_id,
            self.next_annotation_id,
        )?;
        Ok(doc)
    }
}

impl AnnotationData {
    pub fn from_annotation(annotation: &Annotation) -> Self {
        let mut data = Self {
            id: annotation.id,
            layer_id: annotation.layer_id,
            kind: annotation.kind(),
            bounds: annotation.bounds(),
            style: annotation.style.clone(),
            created_at: annotation.created_at,
            created_by: annotation.created_by.clone(),
            start: None,
            end: None,
            points: None,
            content: None,
            font: None,
            anchor: None,
            callout_shape: None,
            leader_style: None,
            tail_marker: None,
        };
        match &annotation.shape {
            Shape::Arrow(MarkArrow { start, end }) | Shape::Line(MarkLine { start, end }) => {
                data.start = Some(*start);
                data.end = Some(*end);
            }
            Shape::Rectangle(_) | Shape::Circle(_) => {}
            Shape::Freehand(f) => data.points = Some(f.points.clone()),
            Shape::Text(t) => {
                data.content = Some(t.content.clone());
                data.font = Some(t.font.clone());
            }
            Shape::Callout(c) => {
                data.bounds = c.rect;
                data.content = Some(c.content.clone());
                data.font = Some(c.font.clone());
                data.anchor = Some(c.anchor);
                data.callout_shape = Some(c.callout_shape);
                data.leader_style = Some(c.leader_style);
                data.tail_marker = Some(c.tail_marker);
            }
        }
        data
    }

    pub fn into_annotation(self) -> Result<Annotation> {
        if self.bounds.width < 0.0 || self.bounds.height < 0.0 {
            return Err(Error::other(format!("Negative bounds {}", self.bounds)));
        }
        let kind = self.kind;
        let missing =
            |field: &str| Error::other(format!("{} annotation is missing '{}'", kind, field));

        let shape = match kind {
            ShapeKind::Arrow | ShapeKind::Line => {
                let start = self.start.ok_or_else(|| missing("start"))?;
                let end = self.end.ok_or_else(|| missing("end"))?;
                if kind == ShapeKind::Arrow {
                    Shape::Arrow(MarkArrow::new(start, end))
                } else {
                    Shape::Line(MarkLine::new(start, end))
                }
            }
            ShapeKind::Rectangle => Shape::Rectangle(MarkRectangle::new(self.bounds)),
            ShapeKind::Circle => Shape::Circle(MarkCircle::new(self.bounds)),
            ShapeKind::Freehand => Shape::Freehand(MarkFreehand {
                points: self.points.ok_or_else(|| missing("points"))?,
            }),
            ShapeKind::Text => Shape::Text(MarkText::new(
                self.bounds,
                self.content.ok_or_else(|| missing("content"))?,
                self.font.unwrap_or_default(),
            )),
            ShapeKind::Callout => {
                let mut callout = MarkCallout::new(
                    self.bounds,
                    self.anchor.ok_or_else(|| missing("anchor"))?,
                    self.content.ok_or_else(|| missing("content"))?,
                    self.font.unwrap_or_default(),
                );
                callout.callout_shape = self.callout_shape.unwrap_or_default();
                callout.leader_style = self.leader_style.unwrap_or_default();
                callout.tail_marker = self.tail_marker.unwrap_or_default();
                Shape::Callout(callout)
            }
        };

        Ok(Annotation {
            id: self.id,
            layer_id: self.layer_id,
            style: self.style,
            created_at: self.created_at,
            created_by: self.created_by,
            shape,
        })
    }
}

/// Serialize a document to pretty-printed JSON.
pub fn to_json_string(doc: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(&DocumentFile::from_document(doc))?)
}

/// Parse a document from JSON.
pub fn from_json_str(json: &str) -> Result<Document> {
    let file: DocumentFile = serde_json::from_str(json)?;
    file.into_document()
}

/// Save document to file
pub fn save_to_file(doc: &Document, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = to_json_string(doc).context("Failed to serialize document")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write document file {}", path.display()))?;
    info!(
        "Saved {} annotation(s) to {}",
        doc.annotation_count(),
        path.display()
    );
    Ok(())
}

/// Load document from file
pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Document> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document file {}", path.display()))?;
    let doc = from_json_str(&content)
        .with_context(|| format!("Failed to load document {}", path.display()))?;
    info!(
        "Loaded {} layer(s), {} annotation(s) from {}",
        doc.layer_count(),
        doc.annotation_count(),
        path.display()
    );
    Ok(doc)
}
