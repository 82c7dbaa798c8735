use std::collections::HashMap;
use std::fmt;

use tracing::debug;
use vfb_core::document::{Document, Node};
use vfb_core::geometry::Transform;

use crate::grammar::{Canvas, EgfLine, EntityDef, Invocation, Program, ShapeCommand};

/// 实体编号，文本形式为两位补零的 `#NN`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02}", self.0)
    }
}

/// 命令串到实体编号的映射，另存插入顺序以保证输出确定。
#[derive(Debug, Default)]
pub struct EntityTable {
    ids: HashMap<String, EntityId>,
    order: Vec<(EntityId, String)>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回命令串对应的编号；首次出现时按 `#01`、`#02`… 顺序分配。
    pub fn intern(&mut self, command: String) -> EntityId {
        if let Some(id) = self.get(&command) {
            return id;
        }
        let id = EntityId::new(self.order.len() as u32 + 1);
        self.ids.insert(command.clone(), id);
        self.order.push((id, command));
        id
    }

    pub fn get(&self, command: &str) -> Option<EntityId> {
        self.ids.get(command).copied()
    }

    /// 按分配顺序遍历定义。
    pub fn definitions(&self) -> impl Iterator<Item = (EntityId, &str)> {
        self.order.iter().map(|(id, body)| (*id, body.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// 画布行第三个字段。
    pub background: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            background: "#fff".to_string(),
        }
    }
}

/// 将结构化文档转换为 EGF 程序。
///
/// 输出顺序：画布行、按首次出现顺序排列的实体定义、按文档顺序排列的调用行。
/// 几何与样式序列化结果完全相同的图形共享同一实体。
pub fn emit(document: &Document, options: &EmitOptions) -> Program {
    let mut table = EntityTable::new();
    let mut invocations = Vec::new();

    for node in document.nodes() {
        let shape = match node {
            Node::Shape(shape) => shape,
            other => {
                debug!(node = ?other, "非图形节点不参与 EGF 输出");
                continue;
            }
        };
        let command = ShapeCommand::from_shape(shape).to_string();
        let id = table.intern(command);
        invocations.push(Invocation {
            id: id.to_string(),
            transform: Transform::identity(),
        });
    }

    let mut program = Program::new();
    program.push(EgfLine::Canvas(Canvas {
        width: document.width().as_str().to_string(),
        height: document.height().as_str().to_string(),
        background: Some(options.background.clone()),
    }));
    for (id, body) in table.definitions() {
        program.push(EgfLine::EntityDef(EntityDef {
            id: id.to_string(),
            body: body.to_string(),
        }));
    }
    let invocation_count = invocations.len();
    for call in invocations {
        program.push(EgfLine::Invoke(call));
    }

    debug!(
        entities = table.len(),
        invocations = invocation_count,
        "EGF 输出完成"
    );
    program
}
