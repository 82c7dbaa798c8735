use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use vfb_io::IoError;

/// 四个转换方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    SvgToEgf,
    EgfToSvg,
    EgfToEgfb,
    EgfbToEgf,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::SvgToEgf,
        Direction::EgfToSvg,
        Direction::EgfToEgfb,
        Direction::EgfbToEgf,
    ];

    /// 命令行子命令名。
    pub fn command_name(self) -> &'static str {
        match self {
            Direction::SvgToEgf => "svg2egf",
            Direction::EgfToSvg => "egf2svg",
            Direction::EgfToEgfb => "egf2egfb",
            Direction::EgfbToEgf => "egfb2egf",
        }
    }

    /// 成功后的确认语。
    pub fn success_message(self) -> &'static str {
        match self {
            Direction::SvgToEgf => "Converted SVG to EGF successfully.",
            Direction::EgfToSvg => "Converted EGF to SVG successfully.",
            Direction::EgfToEgfb => "Encoded EGF to EGFB successfully.",
            Direction::EgfbToEgf => "Decoded EGFB to EGF successfully.",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::SvgToEgf => "SVG to EGF",
            Direction::EgfToSvg => "EGF to SVG",
            Direction::EgfToEgfb => "EGF to EGFB",
            Direction::EgfbToEgf => "EGFB to EGF",
        })
    }
}

/// 单次转换失败，记录方向以便定位出错的子步骤。
#[derive(Debug, Error)]
#[error("{direction} conversion failed: {source}")]
pub struct ConvertError {
    pub direction: Direction,
    #[source]
    pub source: IoError,
}

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("无法创建演示输出目录 {path:?}: {source}")]
    DemoSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("写入演示样例失败: {0}")]
    DemoSample(#[source] IoError),
    #[error("命令 `{command}` 需要 {expected} 个参数，实际为 {actual}")]
    Usage {
        command: &'static str,
        expected: usize,
        actual: usize,
    },
}
