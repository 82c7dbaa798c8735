//! 整文件进、整文件出的四个转换入口。
//!
//! 输入完整读入并在内存中转换完毕后才写出目标文件，任何硬错误都不会留下部分输出。

use std::path::Path;

use tracing::info;
use vfb_config::AppConfig;
use vfb_engine::{EmitOptions, RenderOptions, emit, render};
use vfb_io::{IoError, egfb, svg};

use crate::errors::{ConvertError, Direction};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub render: RenderOptions,
    pub emit: EmitOptions,
}

impl ConvertOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            render: RenderOptions {
                default_width: config.render.default_width.clone(),
                default_height: config.render.default_height.clone(),
            },
            emit: EmitOptions {
                background: config.emit.background.clone(),
            },
        }
    }
}

/// 按方向分派到对应的入口。
pub fn convert(
    direction: Direction,
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<(), ConvertError> {
    match direction {
        Direction::SvgToEgf => svg_to_egf(input, output, options),
        Direction::EgfToSvg => egf_to_svg(input, output, options),
        Direction::EgfToEgfb => egf_to_egfb(input, output),
        Direction::EgfbToEgf => egfb_to_egf(input, output),
    }
}

pub fn svg_to_egf(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<(), ConvertError> {
    run(Direction::SvgToEgf, || {
        let content = vfb_io::read_text(input)?;
        let document = svg::parse_svg(&content)?;
        let program = emit(&document, &options.emit);
        info!(
            input = %input.display(),
            output = %output.display(),
            shapes = document.shapes().count(),
            lines = program.len(),
            "SVG 已转换为 EGF"
        );
        vfb_io::write_text(output, &program.to_string())
    })
}

pub fn egf_to_svg(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<(), ConvertError> {
    run(Direction::EgfToSvg, || {
        let text = vfb_io::read_text(input)?;
        let (document, stats) = render(&text, &options.render);
        info!(
            input = %input.display(),
            output = %output.display(),
            entities = stats.definitions,
            invocations = stats.invocations,
            unresolved = stats.unresolved,
            "EGF 已渲染为 SVG"
        );
        vfb_io::write_text(output, &svg::write_svg(&document))
    })
}

pub fn egf_to_egfb(input: &Path, output: &Path) -> Result<(), ConvertError> {
    run(Direction::EgfToEgfb, || {
        let text = vfb_io::read_text(input)?;
        let bytes = egfb::encode(&text)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            bytes = bytes.len(),
            "EGF 已编码为 EGFB"
        );
        vfb_io::write_bytes(output, &bytes)
    })
}

pub fn egfb_to_egf(input: &Path, output: &Path) -> Result<(), ConvertError> {
    run(Direction::EgfbToEgf, || {
        let bytes = vfb_io::read_bytes(input)?;
        let text = egfb::decode(&bytes)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            lines = text.lines().count(),
            "EGFB 已解码为 EGF"
        );
        vfb_io::write_text(output, &text)
    })
}

fn run(
    direction: Direction,
    body: impl FnOnce() -> Result<(), IoError>,
) -> Result<(), ConvertError> {
    body().map_err(|source| ConvertError { direction, source })
}
