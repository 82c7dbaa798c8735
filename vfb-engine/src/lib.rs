pub mod emitter;
pub mod grammar;
pub mod renderer;

pub use emitter::{EmitOptions, EntityId, EntityTable, emit};
pub use grammar::{EgfLine, Opcode, Program, ShapeCommand};
pub use renderer::{RenderOptions, RenderStats, Renderer, render};
