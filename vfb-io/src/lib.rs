use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use vfb_core::document::Document;

pub mod egfb;
pub mod svg;

pub use egfb::EgfbError;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
    #[error(transparent)]
    Egfb(#[from] EgfbError),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError>;
}

/// SVG 文件读写入口。
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgFacade;

impl SvgFacade {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for SvgFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let content = read_text(path)?;
        let document = svg::parse_svg(&content)?;
        debug!(path = %path.display(), nodes = document.len(), "SVG 读取完成");
        Ok(document)
    }
}

impl DocumentSaver for SvgFacade {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError> {
        write_text(path, &svg::write_svg(document))
    }
}

/// 以 UTF-8 文本读取文件，EGF 与 SVG 共用。
pub fn read_text(path: &Path) -> Result<String, IoError> {
    fs::read_to_string(path).map_err(|source| IoError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_text(path: &Path, content: &str) -> Result<(), IoError> {
    fs::write(path, content).map_err(|source| IoError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>, IoError> {
    fs::read(path).map_err(|source| IoError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), IoError> {
    fs::write(path, bytes).map_err(|source| IoError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}

/// 读取 EGFB 文件并还原为 EGF 文本。
pub fn read_egfb(path: &Path) -> Result<String, IoError> {
    let bytes = read_bytes(path)?;
    Ok(egfb::decode(&bytes)?)
}

/// 编码全部完成后才写出文件，编码失败不会留下部分输出。
pub fn write_egfb(path: &Path, text: &str) -> Result<(), IoError> {
    let bytes = egfb::encode(text)?;
    write_bytes(path, &bytes)
}
