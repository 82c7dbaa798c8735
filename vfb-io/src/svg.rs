//! SVG 边界：读取 `<svg>` 根元素下的基础图形，写出渲染后的结构化文档。

use std::collections::HashMap;
use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;
use vfb_core::document::{
    Circle, Document, Ellipse, Line, Node, Number, Path, Polygon, Polyline, Rect, ShapeKind,
    ShapeNode, Style,
};

use crate::IoError;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// 解析 SVG 文本。只收集根元素的直接子图形，保持文档顺序；其余元素被跳过。
pub fn parse_svg(content: &str) -> Result<Document, IoError> {
    let mut reader = Reader::from_str(content);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut document: Option<Document> = None;

    loop {
        let (element, is_start) = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => (e.into_owned(), true),
            Ok(Event::Empty(e)) => (e.into_owned(), false),
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                buf.clear();
                continue;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {
                buf.clear();
                continue;
            }
            Err(err) => {
                return Err(IoError::InvalidDocument(format!(
                    "malformed SVG markup at byte {}: {err}",
                    reader.buffer_position()
                )));
            }
        };

        let attributes = collect_attributes(&element)?;
        let tag = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        match (depth, document.as_mut()) {
            (0, None) => {
                if tag != "svg" {
                    return Err(IoError::InvalidDocument(format!(
                        "root element is <{tag}>, expected <svg>"
                    )));
                }
                document = Some(Document::new(
                    attr(&attributes, "width"),
                    attr(&attributes, "height"),
                ));
            }
            (1, Some(doc)) => match ShapeKind::from_tag_name(&tag) {
                Some(kind) => doc.add_shape(build_shape(kind, &attributes)),
                None => debug!(tag = %tag, "跳过不支持的 SVG 元素"),
            },
            _ => {}
        }

        if is_start {
            depth += 1;
        }
        buf.clear();
    }

    document.ok_or_else(|| IoError::InvalidDocument("missing <svg> root element".to_string()))
}

fn collect_attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>, IoError> {
    let mut attributes = HashMap::new();
    for attribute in element.attributes() {
        let attribute = attribute
            .map_err(|err| IoError::InvalidDocument(format!("malformed attribute: {err}")))?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| IoError::InvalidDocument(format!("malformed attribute {key}: {err}")))?
            .into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

fn attr(attributes: &HashMap<String, String>, name: &str) -> Number {
    Number::new(attributes.get(name).cloned().unwrap_or_default())
}

fn text_attr(attributes: &HashMap<String, String>, name: &str) -> String {
    attributes.get(name).cloned().unwrap_or_default()
}

/// 空字符串的颜色与缺失等价。
fn color(attributes: &HashMap<String, String>, name: &str) -> Option<String> {
    attributes.get(name).filter(|value| !value.is_empty()).cloned()
}

fn build_shape(kind: ShapeKind, attributes: &HashMap<String, String>) -> ShapeNode {
    let a = |name: &str| attr(attributes, name);
    let style = Style {
        stroke: color(attributes, "stroke"),
        fill: color(attributes, "fill"),
    };
    match kind {
        ShapeKind::Rect => ShapeNode::Rect(Rect {
            x: a("x"),
            y: a("y"),
            width: a("width"),
            height: a("height"),
            style,
        }),
        ShapeKind::Circle => ShapeNode::Circle(Circle {
            cx: a("cx"),
            cy: a("cy"),
            r: a("r"),
            style,
        }),
        ShapeKind::Line => ShapeNode::Line(Line {
            x1: a("x1"),
            y1: a("y1"),
            x2: a("x2"),
            y2: a("y2"),
            style,
        }),
        ShapeKind::Path => ShapeNode::Path(Path {
            d: text_attr(attributes, "d"),
            style,
        }),
        ShapeKind::Ellipse => ShapeNode::Ellipse(Ellipse {
            cx: a("cx"),
            cy: a("cy"),
            rx: a("rx"),
            ry: a("ry"),
            style,
        }),
        ShapeKind::Polygon => ShapeNode::Polygon(Polygon {
            points: text_attr(attributes, "points"),
            style,
        }),
        ShapeKind::Polyline => ShapeNode::Polyline(Polyline {
            points: text_attr(attributes, "points"),
            style,
        }),
    }
}

/// 序列化为 SVG 文本：每个节点一行，透传的标记片段原样写出。
pub fn write_svg(document: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="{SVG_NAMESPACE}" width="{}" height="{}">"#,
        escape(document.width().as_str()),
        escape(document.height().as_str())
    );
    for node in document.nodes() {
        match node {
            Node::Shape(shape) => out.push_str(&shape_element(shape)),
            Node::Markup(raw) => out.push_str(raw),
            Node::Comment(text) => {
                let _ = write!(out, "<!-- {text} -->");
            }
        }
        out.push('\n');
    }
    out.push_str("</svg>");
    out
}

fn shape_element(shape: &ShapeNode) -> String {
    let mut element = format!("<{}", shape.kind().tag_name());
    for (name, value) in shape.attributes() {
        let _ = write!(element, r#" {name}="{}""#, escape(value));
    }
    let style = shape.style();
    if let Some(stroke) = &style.stroke {
        let _ = write!(element, r#" stroke="{}""#, escape(stroke.as_str()));
    }
    if let Some(fill) = &style.fill {
        let _ = write!(element, r#" fill="{}""#, escape(fill.as_str()));
    }
    element.push_str("/>");
    element
}
