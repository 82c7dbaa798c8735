use std::collections::HashMap;

use tracing::{debug, trace};
use vfb_core::document::{
    Circle, Document, Ellipse, Line, Node, Number, Path, Polygon, Polyline, Rect, ShapeKind,
    ShapeNode, parse_lenient,
};
use vfb_core::geometry::Transform;

use crate::grammar::{EgfLine, Program, ShapeCommand};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// 遇到画布行之前使用的画布尺寸。
    pub default_width: String,
    pub default_height: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_width: "800".to_string(),
            default_height: "600".to_string(),
        }
    }
}

/// 渲染过程的计数，便于日志输出。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub definitions: usize,
    pub invocations: usize,
    pub unresolved: usize,
    pub inline_shapes: usize,
    pub unknown: usize,
}

/// 单遍渲染器。实体表随定义行增量建立，调用行只能引用其之前出现的定义。
#[derive(Debug)]
pub struct Renderer {
    entities: HashMap<String, String>,
    document: Document,
    stats: RenderStats,
}

impl Renderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            entities: HashMap::new(),
            document: Document::new(
                options.default_width.as_str(),
                options.default_height.as_str(),
            ),
            stats: RenderStats::default(),
        }
    }

    pub fn feed(&mut self, line: &EgfLine) {
        match line {
            // 画布尺寸属于整个文档，最后一次出现生效。
            EgfLine::Canvas(canvas) => {
                self.document
                    .set_canvas(canvas.width.as_str(), canvas.height.as_str());
            }
            EgfLine::EntityDef(def) => {
                self.stats.definitions += 1;
                self.entities.insert(def.id.clone(), def.body.clone());
            }
            EgfLine::Invoke(call) => match self.entities.get(&call.id) {
                Some(body) => {
                    self.stats.invocations += 1;
                    let node = render_body(body, call.transform);
                    self.push(node);
                }
                None => {
                    self.stats.unresolved += 1;
                    debug!(entity = %call.id, "实体未定义，忽略该调用");
                }
            },
            EgfLine::Shape(command) => {
                self.stats.inline_shapes += 1;
                let source = command.to_string();
                let node = render_command(command, &source, Transform::identity());
                self.push(node);
            }
            EgfLine::Group(Some(payload)) => self.document.add_markup(payload.as_str()),
            EgfLine::Group(None) => self.document.add_comment("Empty group"),
            EgfLine::Incomplete(raw) => {
                trace!(line = %raw, "前缀可识别但内容不完整，跳过");
            }
            EgfLine::Unknown(raw) => {
                let node = unknown_line(raw);
                self.push(node);
            }
        }
    }

    fn push(&mut self, node: Node) {
        if matches!(node, Node::Comment(_)) {
            self.stats.unknown += 1;
        }
        self.document.push(node);
    }

    #[inline]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn finish(self) -> Document {
        self.document
    }
}

/// 解析并渲染整段 EGF 文本。
pub fn render(text: &str, options: &RenderOptions) -> (Document, RenderStats) {
    let mut renderer = Renderer::new(options);
    for line in Program::parse(text).lines() {
        renderer.feed(line);
    }
    let stats = renderer.stats();
    debug!(?stats, "EGF 渲染完成");
    (renderer.finish(), stats)
}

/// 实体体必须是图形命令，其余内容渲染为诊断注释。
fn render_body(body: &str, transform: Transform) -> Node {
    match ShapeCommand::parse(body) {
        Some(command) => render_command(&command, body, transform),
        None => unknown_line(body),
    }
}

/// 字段不足的图形不做渲染，改为 `Invalid <kind>: <source>` 注释。
fn render_command(command: &ShapeCommand, source: &str, transform: Transform) -> Node {
    if command.is_complete() {
        Node::Shape(render_shape(command, transform))
    } else {
        debug!(kind = %command.kind, source, "图形字段不足");
        Node::Comment(format!("Invalid {}: {source}", command.kind.tag_name()))
    }
}

fn unknown_line(raw: &str) -> Node {
    Node::Comment(format!("Unknown line: {raw}"))
}

/// 点状坐标做完整变换，半径与宽高只乘缩放；路径数据原样输出，不做变换。
pub fn render_shape(command: &ShapeCommand, t: Transform) -> ShapeNode {
    let n = |index: usize| command.number(index);
    let point = |index: usize| {
        let (x, y) = t.apply_to_point(n(index), n(index + 1));
        (Number::from_f64(x), Number::from_f64(y))
    };
    let length = |index: usize| Number::from_f64(t.scale_length(n(index)));
    let style = command.resolved_style();

    match command.kind {
        ShapeKind::Rect => {
            let (x, y) = point(0);
            ShapeNode::Rect(Rect {
                x,
                y,
                width: length(2),
                height: length(3),
                style,
            })
        }
        ShapeKind::Circle => {
            let (cx, cy) = point(0);
            ShapeNode::Circle(Circle {
                cx,
                cy,
                r: length(2),
                style,
            })
        }
        ShapeKind::Line => {
            let (x1, y1) = point(0);
            let (x2, y2) = point(2);
            ShapeNode::Line(Line {
                x1,
                y1,
                x2,
                y2,
                style,
            })
        }
        ShapeKind::Path => ShapeNode::Path(Path {
            d: command.raw().to_string(),
            style,
        }),
        ShapeKind::Ellipse => {
            let (cx, cy) = point(0);
            ShapeNode::Ellipse(Ellipse {
                cx,
                cy,
                rx: length(2),
                ry: length(3),
                style,
            })
        }
        ShapeKind::Polygon => ShapeNode::Polygon(Polygon {
            points: transform_points(command.raw(), t),
            style,
        }),
        ShapeKind::Polyline => ShapeNode::Polyline(Polyline {
            points: transform_points(command.raw(), t),
            style,
        }),
    }
}

/// 逗号按空白处理，成对取坐标（落单的末尾坐标丢弃），输出保留两位小数。
pub fn transform_points(points: &str, t: Transform) -> String {
    let coords: Vec<f64> = points
        .replace(',', " ")
        .split_whitespace()
        .map(parse_lenient)
        .collect();
    coords
        .chunks_exact(2)
        .map(|pair| {
            let (x, y) = t.apply_to_point(pair[0], pair[1]);
            format!("{x:.2},{y:.2}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}
