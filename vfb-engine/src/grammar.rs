//! EGF 行语法：固定前缀分派到封闭的 [`EgfLine`] 枚举，并提供规范化的反向格式化。

use std::fmt;

use tracing::trace;
use vfb_core::document::{Number, ShapeKind, ShapeNode, Style, parse_lenient};
use vfb_core::geometry::Transform;

const CANVAS_PREFIX: &str = "M(";
const ENTITY_DEF_PREFIX: &str = "H#";
const INVOKE_PREFIX: &str = "CALL#";
const GROUP_PREFIX: &str = "G[";
const STYLE_PREFIX: &str = "S(";

const DEFAULT_STROKE: &str = "#000";
const NONE_COLOR: &str = "#none";

/// 二进制帧携带的分类标签。仅作冗余元数据，解码时不参与重建行文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Unknown = 0x00,
    Canvas = 0x01,
    Rect = 0x02,
    Circle = 0x03,
    Line = 0x04,
    Path = 0x05,
    Ellipse = 0x06,
    Polygon = 0x07,
    Polyline = 0x08,
    EntityDef = 0x10,
    Invoke = 0x11,
}

impl Opcode {
    /// 根据行首记号分类；`G[` 与无法识别的行均为 [`Opcode::Unknown`]。
    pub fn classify(line: &str) -> Self {
        if line.starts_with(CANVAS_PREFIX) {
            return Opcode::Canvas;
        }
        if line.starts_with(ENTITY_DEF_PREFIX) {
            return Opcode::EntityDef;
        }
        if line.starts_with(INVOKE_PREFIX) {
            return Opcode::Invoke;
        }
        match shape_kind_of(line) {
            Some(kind) => Self::for_shape(kind),
            None => Opcode::Unknown,
        }
    }

    pub fn for_shape(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rect => Opcode::Rect,
            ShapeKind::Circle => Opcode::Circle,
            ShapeKind::Line => Opcode::Line,
            ShapeKind::Path => Opcode::Path,
            ShapeKind::Ellipse => Opcode::Ellipse,
            ShapeKind::Polygon => Opcode::Polygon,
            ShapeKind::Polyline => Opcode::Polyline,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x00 => Opcode::Unknown,
            0x01 => Opcode::Canvas,
            0x02 => Opcode::Rect,
            0x03 => Opcode::Circle,
            0x04 => Opcode::Line,
            0x05 => Opcode::Path,
            0x06 => Opcode::Ellipse,
            0x07 => Opcode::Polygon,
            0x08 => Opcode::Polyline,
            0x10 => Opcode::EntityDef,
            0x11 => Opcode::Invoke,
            _ => return None,
        })
    }

    #[inline]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// 图形前缀及其括号形式。
fn shape_prefix(kind: ShapeKind) -> &'static str {
    match kind {
        ShapeKind::Rect => "R(",
        ShapeKind::Circle => "C(",
        ShapeKind::Line => "L(",
        ShapeKind::Path => "P[",
        ShapeKind::Ellipse => "E(",
        ShapeKind::Polygon => "PG[",
        ShapeKind::Polyline => "PL[",
    }
}

const SHAPE_KINDS: [ShapeKind; 7] = [
    ShapeKind::Rect,
    ShapeKind::Circle,
    ShapeKind::Line,
    ShapeKind::Path,
    ShapeKind::Ellipse,
    ShapeKind::Polygon,
    ShapeKind::Polyline,
];

fn shape_kind_of(line: &str) -> Option<ShapeKind> {
    SHAPE_KINDS
        .into_iter()
        .find(|kind| line.starts_with(shape_prefix(*kind)))
}

fn is_bracketed(kind: ShapeKind) -> bool {
    matches!(
        kind,
        ShapeKind::Path | ShapeKind::Polygon | ShapeKind::Polyline
    )
}

/// 圆括号图形至少需要的字段数；方括号图形不限。
fn required_fields(kind: ShapeKind) -> usize {
    match kind {
        ShapeKind::Circle => 3,
        ShapeKind::Rect | ShapeKind::Line | ShapeKind::Ellipse => 4,
        ShapeKind::Path | ShapeKind::Polygon | ShapeKind::Polyline => 0,
    }
}

/// 取第一个 `(` 与第一个 `)` 之间的内容，按逗号切分并去除空白。
fn paren_fields(line: &str) -> Vec<String> {
    match (line.find('('), line.find(')')) {
        (Some(start), Some(end)) if start < end => line[start + 1..end]
            .split(',')
            .map(|field| field.trim().to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// 取第一个 `[` 与最后一个 `]` 之间的原始内容。
fn bracket_payload(line: &str) -> Option<&str> {
    match (line.find('['), line.rfind(']')) {
        (Some(start), Some(end)) if start < end => Some(&line[start + 1..end]),
        _ => None,
    }
}

/// 查找首个非空的 `S(...)` 样式后缀。
fn style_suffix(line: &str) -> Option<StyleSuffix> {
    line.match_indices(STYLE_PREFIX).find_map(|(index, _)| {
        let rest = &line[index + STYLE_PREFIX.len()..];
        let end = rest.find(')')?;
        if end == 0 {
            return None;
        }
        Some(StyleSuffix(
            rest[..end]
                .split(',')
                .map(|field| field.trim().to_string())
                .collect(),
        ))
    })
}

/// 路径与点列在输出前做的轻量清理：去除首尾空白并合并双空格。
pub fn sanitize(raw: &str) -> String {
    raw.replace("  ", " ").trim().to_string()
}

/// `S(stroke,fill)` 的字段列表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSuffix(pub Vec<String>);

impl StyleSuffix {
    /// 结构化文档的默认值：描边 `#000`，填充 `#none`。
    pub fn from_style(style: &Style, with_fill: bool) -> Self {
        let mut fields = vec![style.stroke_or(DEFAULT_STROKE).to_string()];
        if with_fill {
            fields.push(style.fill_or(NONE_COLOR).to_string());
        }
        Self(fields)
    }

    /// 转换为结构化样式：`#none` 表示省略该属性；两项都省略时回落到黑色描边、无填充。
    pub fn resolve(&self) -> Style {
        let pick = |index: usize| {
            self.0
                .get(index)
                .filter(|value| value.as_str() != NONE_COLOR)
                .cloned()
        };
        let style = Style {
            stroke: pick(0),
            fill: pick(1),
        };
        if style.stroke.is_none() && style.fill.is_none() {
            fallback_style()
        } else {
            style
        }
    }
}

fn fallback_style() -> Style {
    Style::new(Some("black"), Some("none"))
}

impl fmt::Display for StyleSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S({})", self.0.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// 圆括号形式的位置参数。
    Fields(Vec<String>),
    /// 方括号形式的原始数据（路径数据或点列）。
    Raw(String),
}

/// 内联图形命令，例如 `R(50,50,100,75) S(#000,#ff0000)`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeCommand {
    pub kind: ShapeKind,
    pub params: Params,
    pub style: Option<StyleSuffix>,
}

impl ShapeCommand {
    /// 识别图形前缀；非图形行返回 `None`。
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let kind = shape_kind_of(line)?;
        let params = if is_bracketed(kind) {
            Params::Raw(bracket_payload(line).unwrap_or_default().to_string())
        } else {
            Params::Fields(paren_fields(line))
        };
        Some(Self {
            kind,
            params,
            style: style_suffix(line),
        })
    }

    /// 由结构化图形构造规范命令串。数值字段保留原始文本，不做重新格式化；
    /// `line` 与 `polyline` 只写描边。
    pub fn from_shape(shape: &ShapeNode) -> Self {
        fn fields(values: &[&Number]) -> Params {
            Params::Fields(values.iter().map(|v| v.as_str().to_string()).collect())
        }

        let (params, with_fill) = match shape {
            ShapeNode::Rect(r) => (fields(&[&r.x, &r.y, &r.width, &r.height]), true),
            ShapeNode::Circle(c) => (fields(&[&c.cx, &c.cy, &c.r]), true),
            ShapeNode::Line(l) => (fields(&[&l.x1, &l.y1, &l.x2, &l.y2]), false),
            ShapeNode::Path(p) => (Params::Raw(sanitize(&p.d)), true),
            ShapeNode::Ellipse(e) => (fields(&[&e.cx, &e.cy, &e.rx, &e.ry]), true),
            ShapeNode::Polygon(p) => (Params::Raw(sanitize(&p.points)), true),
            ShapeNode::Polyline(p) => (Params::Raw(sanitize(&p.points)), false),
        };
        Self {
            kind: shape.kind(),
            params,
            style: Some(StyleSuffix::from_style(shape.style(), with_fill)),
        }
    }

    /// 字段个数是否达到该图形的要求。字段存在但为空或非数值时仍算作完整。
    pub fn is_complete(&self) -> bool {
        match &self.params {
            Params::Fields(fields) => fields.len() >= required_fields(self.kind),
            Params::Raw(_) => true,
        }
    }

    /// 按位置取数值字段；缺失或无法解析时为 0。
    pub fn number(&self, index: usize) -> f64 {
        match &self.params {
            Params::Fields(fields) => fields.get(index).map_or(0.0, |raw| parse_lenient(raw)),
            Params::Raw(_) => 0.0,
        }
    }

    pub fn raw(&self) -> &str {
        match &self.params {
            Params::Raw(raw) => raw,
            Params::Fields(_) => "",
        }
    }

    pub fn resolved_style(&self) -> Style {
        self.style
            .as_ref()
            .map(StyleSuffix::resolve)
            .unwrap_or_else(fallback_style)
    }
}

impl fmt::Display for ShapeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(shape_prefix(self.kind))?;
        match &self.params {
            Params::Fields(fields) => write!(f, "{})", fields.join(","))?,
            Params::Raw(raw) => write!(f, "{raw}]")?,
        }
        if let Some(style) = &self.style {
            write!(f, " {style}")?;
        }
        Ok(())
    }
}

/// 画布元数据 `M(width,height,background)`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub width: String,
    pub height: String,
    pub background: Option<String>,
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M({},{}", self.width, self.height)?;
        if let Some(background) = &self.background {
            write!(f, ",{background}")?;
        }
        f.write_str(")")
    }
}

/// 实体定义 `H#NN = body`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDef {
    pub id: String,
    pub body: String,
}

impl fmt::Display for EntityDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{} = {}", self.id, self.body)
    }
}

/// 实体调用 `CALL#NN T(...)`。
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub id: String,
    pub transform: Transform,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CALL{} {}", self.id, self.transform)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EgfLine {
    Canvas(Canvas),
    EntityDef(EntityDef),
    Invoke(Invocation),
    Shape(ShapeCommand),
    /// `G[...]` 的原始载荷；缺少方括号内容时为 `None`。
    Group(Option<String>),
    /// 前缀可识别但载荷不可用（字段不足的画布行、缺少 `=` 的实体定义）。
    Incomplete(String),
    Unknown(String),
}

impl EgfLine {
    /// 单行识别，输入会先去除首尾空白。
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line.starts_with(CANVAS_PREFIX) {
            let mut fields = paren_fields(line).into_iter();
            return match (fields.next(), fields.next()) {
                (Some(width), Some(height)) => EgfLine::Canvas(Canvas {
                    width,
                    height,
                    background: fields.next(),
                }),
                _ => EgfLine::Incomplete(line.to_string()),
            };
        }

        if line.starts_with(ENTITY_DEF_PREFIX) {
            return match line.split_once('=') {
                Some((head, body)) => EgfLine::EntityDef(EntityDef {
                    id: head.trim_start_matches('H').trim().to_string(),
                    body: body.trim().to_string(),
                }),
                None => EgfLine::Incomplete(line.to_string()),
            };
        }

        if line.starts_with(INVOKE_PREFIX) {
            let parse_transform = |literal: &str| {
                Transform::try_parse(literal).unwrap_or_else(|| {
                    trace!(literal, "变换字面量无法解析，使用单位变换");
                    Transform::identity()
                })
            };
            let (head, rest) = match line.split_once(' ') {
                Some((head, rest)) => (head, Some(rest)),
                None => (line, None),
            };
            return EgfLine::Invoke(Invocation {
                id: head.trim_start_matches("CALL").to_string(),
                transform: rest.map(parse_transform).unwrap_or_default(),
            });
        }

        if line.starts_with(GROUP_PREFIX) {
            return EgfLine::Group(bracket_payload(line).map(str::to_string));
        }

        match ShapeCommand::parse(line) {
            Some(command) => EgfLine::Shape(command),
            None => EgfLine::Unknown(line.to_string()),
        }
    }
}

impl fmt::Display for EgfLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EgfLine::Canvas(canvas) => write!(f, "{canvas}"),
            EgfLine::EntityDef(def) => write!(f, "{def}"),
            EgfLine::Invoke(call) => write!(f, "{call}"),
            EgfLine::Shape(command) => write!(f, "{command}"),
            EgfLine::Group(Some(payload)) => write!(f, "G[{payload}]"),
            EgfLine::Group(None) => f.write_str("G[]"),
            EgfLine::Incomplete(raw) | EgfLine::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// 有序的 EGF 行序列。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    lines: Vec<EgfLine>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// 逐行解析；空行被丢弃。
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(EgfLine::parse)
                .collect(),
        }
    }

    pub fn push(&mut self, line: EgfLine) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> impl Iterator<Item = &EgfLine> {
        self.lines.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// 每行以换行结尾。
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
