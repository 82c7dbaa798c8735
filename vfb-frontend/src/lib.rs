pub mod command;
pub mod convert;
pub mod demo;
pub mod errors;

pub use command::{CommandBus, CommandContext, CommandRequest, CommandResponse};
pub use convert::{ConvertOptions, egf_to_egfb, egf_to_svg, egfb_to_egf, svg_to_egf};
pub use errors::{ConvertError, Direction, FrontendError};

use tracing::info;
use vfb_config::AppConfig;

/// 以配置构造上下文并执行一条命令。
pub fn run_command(config: &AppConfig, name: &str, args: Vec<String>) -> CommandResponse {
    let options = ConvertOptions::from_config(config);
    let bus = CommandBus::new();
    let context = CommandContext {
        options: &options,
        demo_dir: &config.demo.output_dir,
    };
    info!(command = name, "执行命令");
    bus.dispatch(&CommandRequest::new(name, args), &context)
}
