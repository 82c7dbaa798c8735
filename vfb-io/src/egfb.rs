//! EGFB：EGF 文本的分帧二进制转写。
//!
//! ```text
//! "EGFB" | { opcode:u8 | len:u16 (LE) | payload:len bytes }* | 0xFF
//! ```
//!
//! 载荷即为去除首尾空白后的一行 EGF 文本；操作码只是冗余的分类标签，解码时不参与重建。

use thiserror::Error;
use tracing::{debug, warn};
use vfb_engine::grammar::Opcode;

pub const MAGIC: &[u8; 4] = b"EGFB";
pub const END_MARKER: u8 = 0xFF;
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EgfbError {
    #[error("missing EGFB magic header")]
    InvalidMagic,
    #[error("line {line} is {len} bytes long, exceeding the {max} byte frame limit")]
    LineTooLong { line: usize, len: usize, max: usize },
}

/// 将 EGF 文本编码为 EGFB 字节流。空行被丢弃；任一行超过帧长度上限即整体失败。
pub fn encode(text: &str) -> Result<Vec<u8>, EgfbError> {
    let mut out = Vec::with_capacity(text.len() + MAGIC.len() + 1);
    out.extend_from_slice(MAGIC);

    let mut frames = 0usize;
    for (index, line) in text.split('\n').enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let payload = line.as_bytes();
        let len = u16::try_from(payload.len()).map_err(|_| EgfbError::LineTooLong {
            line: index + 1,
            len: payload.len(),
            max: MAX_FRAME_LEN,
        })?;
        out.push(Opcode::classify(line).as_byte());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(payload);
        frames += 1;
    }

    out.push(END_MARKER);
    debug!(frames, bytes = out.len(), "EGFB 编码完成");
    Ok(out)
}

/// 将 EGFB 字节流还原为 EGF 文本，每帧一行并以换行结尾。
///
/// 魔数头校验是严格的；帧流中途截断则停止解码并返回已还原的部分，不视为错误。
pub fn decode(bytes: &[u8]) -> Result<String, EgfbError> {
    let mut reader = FrameReader::new(bytes)?;
    let mut text = String::new();
    for frame in reader.by_ref() {
        if frame.kind().is_none() {
            debug!(opcode = frame.opcode, "未登记的操作码，按原文还原该帧");
        }
        text.push_str(&String::from_utf8_lossy(frame.payload));
        text.push('\n');
    }
    if reader.is_truncated() {
        warn!(
            offset = reader.offset(),
            total = bytes.len(),
            "EGFB 帧流被截断，返回已解码部分"
        );
    } else if !reader.is_terminated() {
        debug!(offset = reader.offset(), "EGFB 缺少结束标记");
    }
    Ok(text)
}

/// 单个帧的借用视图。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub opcode: u8,
    pub payload: &'a [u8],
}

impl Frame<'_> {
    /// 未登记的操作码返回 `None`，帧本身仍然有效。
    pub fn kind(&self) -> Option<Opcode> {
        Opcode::from_byte(self.opcode)
    }
}

/// 逐帧读取器。遇到结束标记、数据耗尽或截断帧时停止迭代。
#[derive(Debug)]
pub struct FrameReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    finished: bool,
    terminated: bool,
    truncated: bool,
}

impl<'a> FrameReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, EgfbError> {
        if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
            return Err(EgfbError::InvalidMagic);
        }
        Ok(Self {
            bytes,
            pos: MAGIC.len(),
            finished: false,
            terminated: false,
            truncated: false,
        })
    }

    /// 是否读到了 `0xFF` 结束标记。
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn stop(&mut self, truncated: bool) -> Option<Frame<'a>> {
        self.finished = true;
        self.truncated = truncated;
        None
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let Some(&opcode) = self.bytes.get(self.pos) else {
            return self.stop(false);
        };
        self.pos += 1;
        if opcode == END_MARKER {
            self.terminated = true;
            return self.stop(false);
        }
        let Some(len) = self.take(2) else {
            return self.stop(true);
        };
        let len = u16::from_le_bytes([len[0], len[1]]) as usize;
        match self.take(len) {
            Some(payload) => Some(Frame { opcode, payload }),
            None => self.stop(true),
        }
    }
}
