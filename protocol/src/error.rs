//! 错误类型定义

use std::num::ParseIntError;

use thiserror::Error;

/// FEN 校验错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// 不符合六段式 FEN 语法
    #[error("FEN does not match the 6-field grammar: {fen}")]
    Malformed { fen: String },

    /// 拆分后的字段数不对
    #[error("Expected {expected} fields in FEN, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    /// 连续两个数字
    #[error("Two consecutive digits in rank {rank}")]
    ConsecutiveDigits { rank: usize },

    /// 无效的棋子字符
    #[error("Invalid piece character '{piece}' in rank {rank}")]
    InvalidPiece { rank: usize, piece: char },

    /// 该行格数不是 8
    #[error("Rank {rank} covers {files} files, expected 8")]
    RankWidth { rank: usize, files: usize },
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 缺少待解析的回复
    #[error("Missing reply line")]
    MissingReply,

    /// 回复格式不符合预期
    #[error("Malformed reply ({reason}): {line}")]
    MalformedReply { reason: String, line: String },

    /// 引擎报告无合法走法
    #[error("Engine reported no legal move")]
    NoMove,

    /// 无效的局面
    #[error("Invalid position: {0}")]
    InvalidFen(#[from] FenError),

    /// 选项值无法解析
    #[error("Invalid value '{value}' for option {name}")]
    InvalidOptionValue {
        name: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// 单行超长
    #[error("Line too large: {len} bytes (max: {max})")]
    LineTooLong { len: usize, max: usize },
}

impl ProtocolError {
    pub(crate) fn malformed(reason: impl Into<String>, line: &str) -> Self {
        Self::MalformedReply {
            reason: reason.into(),
            line: line.to_string(),
        }
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
