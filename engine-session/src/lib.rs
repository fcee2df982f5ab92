//! UCI 引擎会话
//!
//! 包含:
//! - 引擎进程启动与释放
//! - 握手、选项下发、就绪检查
//! - 局面设置、评估、最佳走法、多主变搜索
//! - 单行超时、取消与重新同步
//! - 配置持久化

mod analysis;
mod config;
mod error;
mod process;
mod session;
mod shared;

#[cfg(test)]
mod mock;

pub use analysis::Analysis;
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use session::{EngineInfo, EngineSession, ProcessSession, SessionState};
pub use shared::SharedSession;

pub use protocol;
