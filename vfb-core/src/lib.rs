pub mod geometry {
    use std::fmt;

    use glam::{DMat2, DVec2};

    /// 二维点，内部以 `glam::DVec2` 表示。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 实体调用时携带的仿射变换：先缩放，再绕原点旋转，最后平移。
    ///
    /// 顺序固定，不可配置。文本形式为 `T(x,y,scale,rotate)`，旋转以角度表示。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Transform {
        pub x: f64,
        pub y: f64,
        pub scale: f64,
        pub rotate: f64,
    }

    impl Transform {
        pub const IDENTITY: Transform = Transform {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotate: 0.0,
        };

        #[inline]
        pub fn new(x: f64, y: f64, scale: f64, rotate: f64) -> Self {
            Self {
                x,
                y,
                scale,
                rotate,
            }
        }

        #[inline]
        pub fn identity() -> Self {
            Self::IDENTITY
        }

        /// 缩放为 0 时按 1 处理，避免把几何压缩成一个点。
        #[inline]
        pub fn effective_scale(self) -> f64 {
            if self.scale == 0.0 { 1.0 } else { self.scale }
        }

        pub fn apply(self, point: Point2) -> Point2 {
            let scaled = point.as_vec2() * self.effective_scale();
            let rotated = DMat2::from_angle(self.rotate.to_radians()) * scaled;
            Point2(rotated + DVec2::new(self.x, self.y))
        }

        #[inline]
        pub fn apply_to_point(self, x: f64, y: f64) -> (f64, f64) {
            let point = self.apply(Point2::new(x, y));
            (point.x(), point.y())
        }

        /// 半径、宽高等标量只受缩放影响，旋转与平移不改变它们。
        #[inline]
        pub fn scale_length(self, length: f64) -> f64 {
            length * self.effective_scale()
        }

        /// 解析 `T(x,y,scale,rotate)` 字面量。
        ///
        /// 结构不匹配（缺少 `T(`、字段数不是 4、任一字段不是数字）时静默返回单位变换；
        /// 缩放字段为 0 时归一化为 1。
        pub fn parse(text: &str) -> Self {
            Self::try_parse(text).unwrap_or(Self::IDENTITY)
        }

        /// 严格版本，结构不匹配时返回 `None`。
        pub fn try_parse(text: &str) -> Option<Self> {
            let start = text.find("T(")? + 2;
            let len = text[start..].find(')')?;
            let fields: Vec<&str> = text[start..start + len].split(',').collect();
            let &[x, y, scale, rotate] = fields.as_slice() else {
                return None;
            };
            let parse = |raw: &str| raw.trim().parse::<f64>().ok();
            let scale = parse(scale)?;
            Some(Self {
                x: parse(x)?,
                y: parse(y)?,
                scale: if scale == 0.0 { 1.0 } else { scale },
                rotate: parse(rotate)?,
            })
        }

        #[inline]
        pub fn is_identity(self) -> bool {
            self == Self::IDENTITY
        }
    }

    impl Default for Transform {
        fn default() -> Self {
            Self::IDENTITY
        }
    }

    impl fmt::Display for Transform {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "T({},{},{},{})", self.x, self.y, self.scale, self.rotate)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
            assert!(
                (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9,
                "expected {expected:?}, got {actual:?}"
            );
        }

        #[test]
        fn identity_leaves_points_untouched() {
            let t = Transform::identity();
            for (x, y) in [(0.0, 0.0), (12.5, -3.25), (-1e6, 4e-7)] {
                assert_eq!(t.apply_to_point(x, y), (x, y));
            }
        }

        #[test]
        fn applies_scale_then_rotate_then_translate() {
            let t = Transform::new(10.0, 20.0, 2.0, 90.0);
            // (1,0) -> 缩放 (2,0) -> 旋转 (0,2) -> 平移 (10,22)
            assert_close(t.apply_to_point(1.0, 0.0), (10.0, 22.0));
            assert_close(t.apply_to_point(0.0, 1.0), (8.0, 20.0));
        }

        #[test]
        fn zero_scale_behaves_like_unit_scale() {
            let zero = Transform::new(3.0, 4.0, 0.0, 30.0);
            let unit = Transform::new(3.0, 4.0, 1.0, 30.0);
            assert_eq!(zero.apply_to_point(7.0, -2.0), unit.apply_to_point(7.0, -2.0));
            assert_eq!(zero.scale_length(5.0), 5.0);
        }

        #[test]
        fn parse_reads_all_four_fields() {
            let t = Transform::parse("T(10, 20,1.5,45)");
            assert_eq!(t, Transform::new(10.0, 20.0, 1.5, 45.0));
        }

        #[test]
        fn parse_normalizes_zero_scale() {
            let t = Transform::parse("T(1,2,0,0)");
            assert_eq!(t.scale, 1.0);
        }

        #[test]
        fn parse_falls_back_to_identity_on_malformed_input() {
            for raw in [
                "",
                "T(1,2,3)",
                "T(1,2,3,4,5)",
                "T(a,2,3,4)",
                "T(1,2,3,4",
                "X(1,2,3,4)",
            ] {
                assert!(Transform::parse(raw).is_identity(), "input {raw:?}");
            }
        }

        #[test]
        fn display_round_trips_through_parse() {
            let t = Transform::new(-5.5, 0.25, 3.0, 180.0);
            assert_eq!(t.to_string(), "T(-5.5,0.25,3,180)");
            assert_eq!(Transform::parse(&t.to_string()), t);
            assert_eq!(Transform::identity().to_string(), "T(0,0,1,0)");
        }
    }
}

pub mod document {
    use std::fmt;

    use serde::{Deserialize, Serialize};

    /// 宽松数值解析：无法解析的字段一律视为 0。
    #[inline]
    pub fn parse_lenient(raw: &str) -> f64 {
        raw.trim().parse::<f64>().unwrap_or(0.0)
    }

    /// 保留原始十进制文本的数值。结构化文档中的几何属性以字符串形式流转，
    /// 仅在需要计算时才转换为 `f64`。
    #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Number(String);

    impl Number {
        #[inline]
        pub fn new(raw: impl Into<String>) -> Self {
            Self(raw.into())
        }

        /// 以 `f64` 的最短十进制表示构造，`-0` 规整为 `0`。
        pub fn from_f64(value: f64) -> Self {
            let value = if value == 0.0 { 0.0 } else { value };
            Self(value.to_string())
        }

        #[inline]
        pub fn as_str(&self) -> &str {
            &self.0
        }

        #[inline]
        pub fn value(&self) -> f64 {
            parse_lenient(&self.0)
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    impl fmt::Display for Number {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<&str> for Number {
        fn from(value: &str) -> Self {
            Self::new(value)
        }
    }

    impl From<String> for Number {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<f64> for Number {
        fn from(value: f64) -> Self {
            Self::from_f64(value)
        }
    }

    /// 描边与填充颜色。缺省即为 `None`，由使用方决定默认值。
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Style {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub stroke: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub fill: Option<String>,
    }

    impl Style {
        pub fn new(stroke: Option<&str>, fill: Option<&str>) -> Self {
            Self {
                stroke: stroke.map(str::to_string),
                fill: fill.map(str::to_string),
            }
        }

        #[inline]
        pub fn stroke_or<'a>(&'a self, default: &'a str) -> &'a str {
            self.stroke.as_deref().unwrap_or(default)
        }

        #[inline]
        pub fn fill_or<'a>(&'a self, default: &'a str) -> &'a str {
            self.fill.as_deref().unwrap_or(default)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum ShapeKind {
        Rect,
        Circle,
        Line,
        Path,
        Ellipse,
        Polygon,
        Polyline,
    }

    impl ShapeKind {
        /// 对应的 SVG 元素名。
        pub fn tag_name(self) -> &'static str {
            match self {
                ShapeKind::Rect => "rect",
                ShapeKind::Circle => "circle",
                ShapeKind::Line => "line",
                ShapeKind::Path => "path",
                ShapeKind::Ellipse => "ellipse",
                ShapeKind::Polygon => "polygon",
                ShapeKind::Polyline => "polyline",
            }
        }

        pub fn from_tag_name(tag: &str) -> Option<Self> {
            Some(match tag {
                "rect" => ShapeKind::Rect,
                "circle" => ShapeKind::Circle,
                "line" => ShapeKind::Line,
                "path" => ShapeKind::Path,
                "ellipse" => ShapeKind::Ellipse,
                "polygon" => ShapeKind::Polygon,
                "polyline" => ShapeKind::Polyline,
                _ => return None,
            })
        }

        /// 几何属性名，顺序即序列化顺序。
        pub fn attribute_names(self) -> &'static [&'static str] {
            match self {
                ShapeKind::Rect => &["x", "y", "width", "height"],
                ShapeKind::Circle => &["cx", "cy", "r"],
                ShapeKind::Line => &["x1", "y1", "x2", "y2"],
                ShapeKind::Path => &["d"],
                ShapeKind::Ellipse => &["cx", "cy", "rx", "ry"],
                ShapeKind::Polygon | ShapeKind::Polyline => &["points"],
            }
        }
    }

    impl fmt::Display for ShapeKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.tag_name())
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Rect {
        pub x: Number,
        pub y: Number,
        pub width: Number,
        pub height: Number,
        #[serde(default)]
        pub style: Style,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Circle {
        pub cx: Number,
        pub cy: Number,
        pub r: Number,
        #[serde(default)]
        pub style: Style,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Line {
        pub x1: Number,
        pub y1: Number,
        pub x2: Number,
        pub y2: Number,
        #[serde(default)]
        pub style: Style,
    }

    /// 路径数据原样保存，不做任何解析。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Path {
        pub d: String,
        #[serde(default)]
        pub style: Style,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Ellipse {
        pub cx: Number,
        pub cy: Number,
        pub rx: Number,
        pub ry: Number,
        #[serde(default)]
        pub style: Style,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Polygon {
        pub points: String,
        #[serde(default)]
        pub style: Style,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Polyline {
        pub points: String,
        #[serde(default)]
        pub style: Style,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum ShapeNode {
        Rect(Rect),
        Circle(Circle),
        Line(Line),
        Path(Path),
        Ellipse(Ellipse),
        Polygon(Polygon),
        Polyline(Polyline),
    }

    impl ShapeNode {
        pub fn kind(&self) -> ShapeKind {
            match self {
                ShapeNode::Rect(_) => ShapeKind::Rect,
                ShapeNode::Circle(_) => ShapeKind::Circle,
                ShapeNode::Line(_) => ShapeKind::Line,
                ShapeNode::Path(_) => ShapeKind::Path,
                ShapeNode::Ellipse(_) => ShapeKind::Ellipse,
                ShapeNode::Polygon(_) => ShapeKind::Polygon,
                ShapeNode::Polyline(_) => ShapeKind::Polyline,
            }
        }

        pub fn style(&self) -> &Style {
            match self {
                ShapeNode::Rect(shape) => &shape.style,
                ShapeNode::Circle(shape) => &shape.style,
                ShapeNode::Line(shape) => &shape.style,
                ShapeNode::Path(shape) => &shape.style,
                ShapeNode::Ellipse(shape) => &shape.style,
                ShapeNode::Polygon(shape) => &shape.style,
                ShapeNode::Polyline(shape) => &shape.style,
            }
        }

        /// 按 [`ShapeKind::attribute_names`] 的顺序返回几何属性的文本值。
        pub fn attributes(&self) -> Vec<(&'static str, &str)> {
            let values: Vec<&str> = match self {
                ShapeNode::Rect(r) => vec![
                    r.x.as_str(),
                    r.y.as_str(),
                    r.width.as_str(),
                    r.height.as_str(),
                ],
                ShapeNode::Circle(c) => vec![c.cx.as_str(), c.cy.as_str(), c.r.as_str()],
                ShapeNode::Line(l) => vec![
                    l.x1.as_str(),
                    l.y1.as_str(),
                    l.x2.as_str(),
                    l.y2.as_str(),
                ],
                ShapeNode::Path(p) => vec![p.d.as_str()],
                ShapeNode::Ellipse(e) => vec![
                    e.cx.as_str(),
                    e.cy.as_str(),
                    e.rx.as_str(),
                    e.ry.as_str(),
                ],
                ShapeNode::Polygon(p) => vec![p.points.as_str()],
                ShapeNode::Polyline(p) => vec![p.points.as_str()],
            };
            self.kind()
                .attribute_names()
                .iter()
                .copied()
                .zip(values)
                .collect()
        }
    }

    macro_rules! impl_from_shape {
        ($($variant:ident),* $(,)?) => {
            $(
                impl From<$variant> for ShapeNode {
                    fn from(value: $variant) -> Self {
                        ShapeNode::$variant(value)
                    }
                }
            )*
        };
    }

    impl_from_shape!(Rect, Circle, Line, Path, Ellipse, Polygon, Polyline);

    /// 渲染结果中的一个节点：结构化图形、原样透传的标记片段，或诊断注释。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum Node {
        Shape(ShapeNode),
        Markup(String),
        Comment(String),
    }

    /// 结构化文档：画布尺寸加上按绘制顺序排列的节点。
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Document {
        width: Number,
        height: Number,
        nodes: Vec<Node>,
    }

    impl Document {
        pub fn new(width: impl Into<Number>, height: impl Into<Number>) -> Self {
            Self {
                width: width.into(),
                height: height.into(),
                nodes: Vec::new(),
            }
        }

        #[inline]
        pub fn width(&self) -> &Number {
            &self.width
        }

        #[inline]
        pub fn height(&self) -> &Number {
            &self.height
        }

        pub fn set_canvas(&mut self, width: impl Into<Number>, height: impl Into<Number>) {
            self.width = width.into();
            self.height = height.into();
        }

        pub fn add_shape(&mut self, shape: impl Into<ShapeNode>) {
            self.nodes.push(Node::Shape(shape.into()));
        }

        pub fn add_markup(&mut self, markup: impl Into<String>) {
            self.nodes.push(Node::Markup(markup.into()));
        }

        pub fn add_comment(&mut self, comment: impl Into<String>) {
            self.nodes.push(Node::Comment(comment.into()));
        }

        pub fn push(&mut self, node: Node) {
            self.nodes.push(node);
        }

        pub fn nodes(&self) -> impl Iterator<Item = &Node> {
            self.nodes.iter()
        }

        /// 仅返回结构化图形节点，保持文档顺序。
        pub fn shapes(&self) -> impl Iterator<Item = &ShapeNode> {
            self.nodes.iter().filter_map(|node| match node {
                Node::Shape(shape) => Some(shape),
                _ => None,
            })
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.nodes.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.nodes.is_empty()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn number_keeps_original_text() {
            let n = Number::new("50.50");
            assert_eq!(n.as_str(), "50.50");
            assert_eq!(n.value(), 50.5);
            assert_eq!(Number::new("abc").value(), 0.0);
            assert_eq!(Number::new("").value(), 0.0);
        }

        #[test]
        fn number_from_f64_uses_shortest_form() {
            assert_eq!(Number::from_f64(50.0).as_str(), "50");
            assert_eq!(Number::from_f64(62.5).as_str(), "62.5");
            assert_eq!(Number::from_f64(-0.0).as_str(), "0");
        }

        #[test]
        fn document_preserves_insertion_order() {
            let mut doc = Document::new("400", "300");
            doc.add_shape(Circle {
                cx: "1".into(),
                cy: "2".into(),
                r: "3".into(),
                style: Style::default(),
            });
            doc.add_markup("<g/>");
            doc.add_shape(Path {
                d: "M0 0".to_string(),
                style: Style::new(Some("#000"), None),
            });

            assert_eq!(doc.len(), 3);
            let kinds: Vec<ShapeKind> = doc.shapes().map(ShapeNode::kind).collect();
            assert_eq!(kinds, vec![ShapeKind::Circle, ShapeKind::Path]);
            assert!(matches!(doc.nodes().nth(1), Some(Node::Markup(m)) if m == "<g/>"));
        }

        #[test]
        fn attributes_follow_kind_order() {
            let rect = ShapeNode::from(Rect {
                x: "1".into(),
                y: "2".into(),
                width: "3".into(),
                height: "4".into(),
                style: Style::default(),
            });
            assert_eq!(
                rect.attributes(),
                vec![("x", "1"), ("y", "2"), ("width", "3"), ("height", "4")]
            );
            assert_eq!(ShapeKind::from_tag_name("polyline"), Some(ShapeKind::Polyline));
            assert_eq!(ShapeKind::from_tag_name("g"), None);
        }
    }
}
