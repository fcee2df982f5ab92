//! 错误类型定义

use std::path::PathBuf;
use std::time::Duration;

use protocol::ProtocolError;
use thiserror::Error;

/// 引擎会话错误
#[derive(Error, Debug)]
pub enum EngineError {
    /// 协议错误（回复格式、无合法走法、无效局面等）
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 无法启动引擎进程
    #[error("Failed to spawn engine {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 等待回复超时
    #[error("Engine response timeout after {timeout:?} waiting for {expected}")]
    Timeout { expected: String, timeout: Duration },

    /// 引擎输出流已关闭
    #[error("No output from engine stream")]
    StreamClosed,

    /// 引擎未响应就绪检查
    #[error("Engine is not ready")]
    NotReady,

    /// 等待被外部取消
    #[error("Engine request cancelled")]
    Cancelled,

    /// 会话已释放
    #[error("Engine session has been disposed")]
    Disposed,

    /// 配置文件错误
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl EngineError {
    /// 是否为"无合法走法"（终局，而非故障）
    pub fn is_no_move(&self) -> bool {
        matches!(self, EngineError::Protocol(ProtocolError::NoMove))
    }

    /// 是否为超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, EngineError::Timeout { .. })
    }

    /// 是否为无效局面
    pub fn is_invalid_position(&self) -> bool {
        matches!(self, EngineError::Protocol(ProtocolError::InvalidFen(_)))
    }
}

/// 会话操作结果类型
pub type Result<T> = std::result::Result<T, EngineError>;
