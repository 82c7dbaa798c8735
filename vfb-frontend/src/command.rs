use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::convert::{ConvertOptions, convert};
use crate::demo::run_demo;
use crate::errors::{Direction, FrontendError};

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    fn from_result(result: Result<String, FrontendError>) -> Self {
        match result {
            Ok(message) => Self::ok(message),
            Err(err) => {
                warn!(error = %err, "命令执行失败");
                Self::err(err.to_string())
            }
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(&self, request: &CommandRequest, context: &CommandContext<'_>) -> CommandResponse;
}

/// 命令执行所需的共享设置。
pub struct CommandContext<'a> {
    pub options: &'a ConvertOptions,
    pub demo_dir: &'a Path,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        for direction in Direction::ALL {
            bus.register(ConvertCommand { direction });
        }
        bus.register(DemoCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            debug!(command = %request.name, args = ?request.args, "分派命令");
            handler.execute(request, context)
        } else {
            let mut names: Vec<&str> = self.available_commands().collect();
            names.sort_unstable();
            CommandResponse::err(format!(
                "未知命令: {}（可用命令: {}）",
                request.name,
                names.join(", ")
            ))
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

/// `<input> <output>` 形式的单向转换命令。
struct ConvertCommand {
    direction: Direction,
}

impl CommandHandler for ConvertCommand {
    fn name(&self) -> &'static str {
        self.direction.command_name()
    }

    fn execute(&self, request: &CommandRequest, context: &CommandContext<'_>) -> CommandResponse {
        CommandResponse::from_result(self.run(request, context))
    }
}

impl ConvertCommand {
    fn run(
        &self,
        request: &CommandRequest,
        context: &CommandContext<'_>,
    ) -> Result<String, FrontendError> {
        let [input, output] = request.args.as_slice() else {
            return Err(FrontendError::Usage {
                command: self.name(),
                expected: 2,
                actual: request.args.len(),
            });
        };
        convert(
            self.direction,
            &PathBuf::from(input),
            &PathBuf::from(output),
            context.options,
        )?;
        Ok(self.direction.success_message().to_string())
    }
}

struct DemoCommand;

impl CommandHandler for DemoCommand {
    fn name(&self) -> &'static str {
        "demo"
    }

    fn execute(&self, request: &CommandRequest, context: &CommandContext<'_>) -> CommandResponse {
        if !request.args.is_empty() {
            return CommandResponse::from_result(Err(FrontendError::Usage {
                command: "demo",
                expected: 0,
                actual: request.args.len(),
            }));
        }
        CommandResponse::from_result(run_demo(context.demo_dir, context.options).map(|report| {
            let names: Vec<&str> = report.files.iter().map(|file| file.name).collect();
            format!("Demo completed! Files created: {}", names.join(", "))
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn request(name: &str, args: &[&str]) -> CommandRequest {
        CommandRequest::new(name, args.iter().map(|arg| arg.to_string()).collect())
    }

    #[test]
    fn registers_every_conversion_and_demo() {
        let bus = CommandBus::new();
        let mut names: Vec<&str> = bus.available_commands().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["demo", "egf2egfb", "egf2svg", "egfb2egf", "svg2egf"]);
    }

    #[test]
    fn unknown_command_is_an_error_response() {
        let dir = tempfile::tempdir().unwrap();
        let options = ConvertOptions::default();
        let context = CommandContext {
            options: &options,
            demo_dir: dir.path(),
        };
        let response = CommandBus::new().dispatch(&request("svg2png", &[]), &context);
        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("未知命令: svg2png（可用命令: demo, egf2egfb, egf2svg, egfb2egf, svg2egf）")
        );
    }

    #[test]
    fn conversion_commands_check_arity_and_run() {
        let dir = tempfile::tempdir().unwrap();
        let options = ConvertOptions::default();
        let context = CommandContext {
            options: &options,
            demo_dir: dir.path(),
        };
        let bus = CommandBus::new();

        let response = bus.dispatch(&request("egf2egfb", &["only-one"]), &context);
        assert!(!response.success);

        let egf = dir.path().join("a.egf");
        let egfb = dir.path().join("a.egfb");
        fs::write(&egf, "M(1,1,#fff)\n").unwrap();
        let response = bus.dispatch(
            &request(
                "egf2egfb",
                &[egf.to_str().unwrap(), egfb.to_str().unwrap()],
            ),
            &context,
        );
        assert!(response.success, "{response:?}");
        assert_eq!(
            response.message.as_deref(),
            Some("Encoded EGF to EGFB successfully.")
        );
        assert!(fs::read(&egfb).unwrap().starts_with(b"EGFB"));
    }

    #[test]
    fn failed_conversion_reports_direction() {
        let dir = tempfile::tempdir().unwrap();
        let options = ConvertOptions::default();
        let context = CommandContext {
            options: &options,
            demo_dir: dir.path(),
        };
        let missing = dir.path().join("missing.egfb");
        let out = dir.path().join("out.egf");
        let response = CommandBus::new().dispatch(
            &request(
                "egfb2egf",
                &[missing.to_str().unwrap(), out.to_str().unwrap()],
            ),
            &context,
        );
        assert!(!response.success);
        let message = response.message.unwrap_or_default();
        assert!(message.starts_with("EGFB to EGF conversion failed"), "{message}");
    }
}
