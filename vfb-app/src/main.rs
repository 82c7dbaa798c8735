use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use vfb_config::{AppConfig, ConfigError};

#[derive(Parser)]
#[command(name = "vfb-app")]
#[command(about = "Bridge between SVG, EGF and EGFB vector formats")]
struct Cli {
    /// 配置文件路径，覆盖自动发现
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert SVG to EGF
    #[command(name = "svg2egf")]
    SvgToEgf { input: PathBuf, output: PathBuf },
    /// Convert EGF to SVG
    #[command(name = "egf2svg")]
    EgfToSvg { input: PathBuf, output: PathBuf },
    /// Encode EGF to binary EGFB
    #[command(name = "egf2egfb")]
    EgfToEgfb { input: PathBuf, output: PathBuf },
    /// Decode EGFB back to EGF
    #[command(name = "egfb2egf")]
    EgfbToEgf { input: PathBuf, output: PathBuf },
    /// Run the demo with sample files
    Demo,
}

impl Commands {
    fn into_request(self) -> (&'static str, Vec<String>) {
        let pair = |input: PathBuf, output: PathBuf| {
            vec![
                input.to_string_lossy().into_owned(),
                output.to_string_lossy().into_owned(),
            ]
        };
        match self {
            Commands::SvgToEgf { input, output } => ("svg2egf", pair(input, output)),
            Commands::EgfToSvg { input, output } => ("egf2svg", pair(input, output)),
            Commands::EgfToEgfb { input, output } => ("egf2egfb", pair(input, output)),
            Commands::EgfbToEgf { input, output } => ("egfb2egf", pair(input, output)),
            Commands::Demo => ("demo", Vec::new()),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    // 订阅器依赖配置中的日志等级，加载失败需等订阅器就绪后再报告。
    let (config, config_error) = load_configuration(cli.config.as_deref());
    init_logging(&config);
    info!("启动 VectorFormatBridge");
    if let Some(err) = config_error {
        report_config_error(&err);
    }

    match run(&config, cli.command) {
        Ok(message) => println!("{message}"),
        Err(err) => {
            error!(error = %err, "命令执行失败");
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run(config: &AppConfig, command: Commands) -> anyhow::Result<String> {
    let (name, args) = command.into_request();
    let response = vfb_frontend::run_command(config, name, args);
    let message = response.message.unwrap_or_default();
    if !response.success {
        return Err(anyhow!(message)).with_context(|| format!("`{name}` failed"));
    }
    Ok(message)
}

/// 加载失败时回退到内建默认值，并把错误交回调用方。
fn load_configuration(override_path: Option<&Path>) -> (AppConfig, Option<ConfigError>) {
    let loaded = match override_path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    };
    match loaded {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

fn report_config_error(err: &ConfigError) {
    match err {
        ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
            warn!(path = %path.display(), error = %err, "加载配置失败，使用内建默认值");
        }
        ConfigError::Context { .. } => {
            warn!(error = %err, "加载配置失败，使用内建默认值");
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
