//! SVG export of a document's visible markup.
//!
//! One `<g>` per visible layer, bottom layer first. Hidden layers are left out;
//! locking has no effect on export. The raster image itself is not embedded,
//! the SVG is sized to it so it can be overlaid.

use crate::document::Document;
use crate::model::{
    Annotation, CalloutShape, LeaderStyle, MarkCallout, MarkText, Shape, TailMarker,
};
use annotkit_core::{Color, Font, Point, Rect, Result, Style, Vector};
use std::collections::BTreeSet;
use std::path::Path;
use svg::node::element as svg_element;
use svg::Document as SvgDocument;
use tracing::{debug, info};

/// Inner padding between a callout box and its text.
const CALLOUT_PADDING: f64 = 6.0;
/// Corner radius of rounded callout boxes.
const ROUNDED_RADIUS: f64 = 8.0;
/// Line height as a multiple of the font size.
const LINE_HEIGHT: f64 = 1.25;

/// Build the SVG document for `doc`.
pub fn render_document(doc: &Document) -> SvgDocument {
    let (width, height) = (doc.image_width(), doc.image_height());
    let mut svg = SvgDocument::new()
        .set("viewBox", format!("0 0 {} {}", width, height))
        .set("width", width)
        .set("height", height);

    let visible: Vec<_> = doc.layers().iter().filter(|l| l.visible).collect();

    let colors: BTreeSet<Color> = visible
        .iter()
        .flat_map(|layer| doc.annotations_on(layer.id))
        .filter(|a| uses_marker(&a.shape))
        .map(|a| a.style.stroke_color)
        .collect();
    if !colors.is_empty() {
        svg = svg.add(marker_definitions(colors.iter()));
    }

    for layer in visible {
        let mut group = svg_element::Group::new()
            .set("id", format!("layer-{}", layer.id.0))
            .set("data-name", layer.name.as_str());
        for annotation in doc.annotations_on(layer.id) {
            group = group.add(render_annotation(annotation));
        }
        svg = svg.add(group);
    }
    svg
}

/// SVG markup as a string.
pub fn to_svg_string(doc: &Document) -> String {
    render_document(doc).to_string()
}

/// Write the SVG export of `doc` to `path`.
pub fn export_to_file(doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_svg_string(doc))?;
    info!("Exported SVG to {}", path.display());
    Ok(())
}

fn uses_marker(shape: &Shape) -> bool {
    match shape {
        Shape::Arrow(_) => true,
        Shape::Callout(c) => c.tail_marker != TailMarker::None && c.leader_start().is_some(),
        _ => false,
    }
}

fn color_id(color: &Color) -> String {
    color.to_rgb_hex().trim_start_matches('#').to_string()
}

/// Arrow, triangle and dot markers for every stroke colour in use.
fn marker_definitions<'a, I>(colors: I) -> svg_element::Definitions
where
    I: Iterator<Item = &'a Color>,
{
    let mut defs = svg_element::Definitions::new();
    for color in colors {
        let id = color_id(color);
        let fill = color.to_rgb_hex();
        let marker = |name: &str, content: svg_element::Path| {
            svg_element::Marker::new()
                .set("id", format!("{}-{}", name, id))
                .set("viewBox", "0 0 10 10")
                .set("refX", 9)
                .set("refY", 5)
                .set("markerWidth", 6)
                .set("markerHeight", 6)
                .set("orient", "auto")
                .add(content.set("fill", fill.as_str()))
        };
        defs = defs
            .add(marker(
                "arrow",
                svg_element::Path::new().set("d", "M 0 0 L 10 5 L 0 10 L 3 5 z"),
            ))
            .add(marker(
                "triangle",
                svg_element::Path::new().set("d", "M 0 0 L 10 5 L 0 10 z"),
            ))
            .add(marker(
                "dot",
                svg_element::Path::new().set("d", "M 1 5 A 4 4 0 1 1 9 5 A 4 4 0 1 1 1 5 z"),
            ));
    }
    defs
}

fn marker_url(name: &str, color: &Color) -> String {
    format!("url(#{}-{})", name, color_id(color))
}

/// Stroke and fill attributes shared by every element.
fn styled<T: StyleAttributes>(node: T, style: &Style, filled: bool) -> T {
    let mut node = node
        .with("stroke", style.stroke_color.to_rgb_hex())
        .with("stroke-width", style.stroke_width.to_string());
    if style.stroke_color.a != 255 {
        node = node.with("stroke-opacity", style.stroke_color.opacity().to_string());
    }
    match style.fill.filter(|_| filled) {
        Some(fill) => {
            node = node.with("fill", fill.to_rgb_hex());
            if fill.a != 255 {
                node = node.with("fill-opacity", fill.opacity().to_string());
            }
        }
        None => node = node.with("fill", "none".to_string()),
    }
    node
}

/// Builder-style `set` with a concrete value type, so [`styled`] can be
/// shared across element types.
trait StyleAttributes: Sized {
    fn with(self, name: &str, value: String) -> Self;
}

macro_rules! style_attributes {
    ($($element:ty),*) => {
        $(impl StyleAttributes for $element {
            fn with(self, name: &str, value: String) -> Self {
                self.set(name, value)
            }
        })*
    };
}

style_attributes!(
    svg_element::Path,
    svg_element::Rectangle,
    svg_element::Circle,
    svg_element::Ellipse
);

fn render_annotation(annotation: &Annotation) -> svg_element::Group {
    let id = format!("annotation-{}", annotation.id.0);
    let style = &annotation.style;
    let group = svg_element::Group::new()
        .set("id", id)
        .set("data-kind", annotation.kind().to_string());

    match &annotation.shape {
        Shape::Arrow(a) => group.add(
            styled(
                svg_element::Path::new().set("d", line_path(a.start, a.end)),
                style,
                false,
            )
            .set("marker-end", marker_url("arrow", &style.stroke_color)),
        ),
        Shape::Line(l) => group.add(styled(
            svg_element::Path::new().set("d", line_path(l.start, l.end)),
            style,
            false,
        )),
        Shape::Freehand(f) => {
            let d = polyline_path(&f.points);
            group.add(
                styled(svg_element::Path::new().set("d", d), style, false)
                    .set("stroke-linecap", "round")
                    .set("stroke-linejoin", "round"),
            )
        }
        Shape::Rectangle(r) => group.add(styled(
            svg_element::Rectangle::new()
                .set("x", r.rect.x)
                .set("y", r.rect.y)
                .set("width", r.rect.width)
                .set("height", r.rect.height),
            style,
            true,
        )),
        Shape::Circle(c) => {
            let center = c.center();
            let (rx, ry) = c.radii();
            if rx == ry {
                group.add(styled(
                    svg_element::Circle::new()
                        .set("cx", center.x)
                        .set("cy", center.y)
                        .set("r", rx),
                    style,
                    true,
                ))
            } else {
                group.add(styled(
                    svg_element::Ellipse::new()
                        .set("cx", center.x)
                        .set("cy", center.y)
                        .set("rx", rx)
                        .set("ry", ry),
                    style,
                    true,
                ))
            }
        }
        Shape::Text(t) => render_text(group, t, style),
        Shape::Callout(c) => render_callout(group, c, style),
    }
}

fn line_path(start: Point, end: Point) -> String {
    format!("M {} {} L {} {}", start.x, start.y, end.x, end.y)
}

fn curved_path(start: Point, end: Point) -> String {
    let ctrl1_x = start.x + (end.x - start.x) / 4.0;
    let ctrl1_y = start.y - (end.y - start.y) / 2.0;
    let ctrl2_x = end.x - (end.x - start.x) / 4.0;
    let ctrl2_y = end.y + (start.y - end.y) / 2.0;
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        start.x, start.y, ctrl1_x, ctrl1_y, ctrl2_x, ctrl2_y, end.x, end.y
    )
}

fn polyline_path(points: &[Point]) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        d.push_str(&format!("{} {} {}", cmd, p.x, p.y));
    }
    d
}

fn text_lines(
    mut group: svg_element::Group,
    content: &str,
    origin: Point,
    font: &Font,
    color: &Color,
) -> svg_element::Group {
    let step = font.size * LINE_HEIGHT;
    for (i, line) in content.lines().enumerate() {
        group = group.add(
            svg_element::Text::new(line)
                .set("x", origin.x)
                .set("y", origin.y + font.size + step * i as f64)
                .set("font-family", font.family.as_str())
                .set("font-size", font.size)
                .set("font-weight", font.weight.to_string())
                .set("fill", color.to_rgb_hex()),
        );
    }
    group
}

fn render_text(group: svg_element::Group, text: &MarkText, style: &Style) -> svg_element::Group {
    text_lines(
        group,
        &text.content,
        text.rect.min(),
        &text.font,
        &style.stroke_color,
    )
}

fn render_callout(
    group: svg_element::Group,
    callout: &MarkCallout,
    style: &Style,
) -> svg_element::Group {
    let outline = match callout.callout_shape {
        CalloutShape::Rectangle => rectangle_path(&callout.rect),
        CalloutShape::Rounded => rounded_path(&callout.rect),
        CalloutShape::Cloud => cloud_path(&callout.rect),
    };
    let mut group = group.add(styled(
        svg_element::Path::new().set("d", outline),
        style,
        true,
    ));

    if let Some(start) = callout.leader_start() {
        let d = match callout.leader_style {
            LeaderStyle::Straight => line_path(start, callout.anchor),
            LeaderStyle::Curved => curved_path(start, callout.anchor),
        };
        let mut leader = styled(svg_element::Path::new().set("d", d), style, false);
        let marker = match callout.tail_marker {
            TailMarker::None => None,
            TailMarker::Arrow => Some("arrow"),
            TailMarker::Triangle => Some("triangle"),
            TailMarker::Circle => Some("dot"),
        };
        if let Some(name) = marker {
            leader = leader.set("marker-end", marker_url(name, &style.stroke_color));
        }
        group = group.add(leader);
    } else {
        debug!("Callout anchor inside its box, leader omitted");
    }

    let origin = callout.rect.min() + Vector::new(CALLOUT_PADDING, CALLOUT_PADDING);
    text_lines(
        group,
        &callout.content,
        origin,
        &callout.font,
        &style.stroke_color,
    )
}

fn rectangle_path(r: &Rect) -> String {
    format!(
        "M {} {} H {} V {} H {} Z",
        r.left(),
        r.top(),
        r.right(),
        r.bottom(),
        r.left()
    )
}

fn rounded_path(r: &Rect) -> String {
    let rad = ROUNDED_RADIUS.min(r.width / 2.0).min(r.height / 2.0);
    let (l, t, rt, b) = (r.left(), r.top(), r.right(), r.bottom());
    format!(
        "M {} {} H {} A {rad} {rad} 0 0 1 {} {} V {} A {rad} {rad} 0 0 1 {} {} H {} A {rad} {rad} 0 0 1 {} {} V {} A {rad} {rad} 0 0 1 {} {} Z",
        l + rad,
        t,
        rt - rad,
        rt,
        t + rad,
        b - rad,
        rt - rad,
        b,
        l + rad,
        l,
        b - rad,
        t + rad,
        l + rad,
        t,
        rad = rad
    )
}

/// Scalloped outline: outward arcs walked clockwise along each edge.
fn cloud_path(r: &Rect) -> String {
    let bump = (r.width.min(r.height) / 4.0).clamp(4.0, 16.0);
    let corners = [
        Point::new(r.left(), r.top()),
        Point::new(r.right(), r.top()),
        Point::new(r.right(), r.bottom()),
        Point::new(r.left(), r.bottom()),
        Point::new(r.left(), r.top()),
    ];
    let mut d = format!("M {} {}", corners[0].x, corners[0].y);
    for pair in corners.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = a.distance_to(b);
        let count = (length / (bump * 2.0)).round().max(1.0);
        let step = (b - a) * (1.0 / count);
        let radius = length / count / 2.0;
        for i in 1..=count as usize {
            let p = a + step * i as f64;
            d.push_str(&format!(" A {} {} 0 0 1 {} {}", radius, radius, p.x, p.y));
        }
    }
    d.push_str(" Z");
    d
}
