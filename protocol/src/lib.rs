//! UCI 协议库
//!
//! 包含:
//! - 命令构造 (Command)
//! - 回复解析 (ReplyParser, InfoLine)
//! - FEN 校验
//! - 引擎选项 (EngineOptions)
//! - 行传输 (LineReader, LineWriter)

mod command;
mod constants;
mod error;
mod fen;
mod info;
mod moves;
mod options;
mod reply;
mod transport;

pub use command::{Command, SearchLimit};
pub use constants::*;
pub use error::{FenError, ProtocolError, Result};
pub use fen::Fen;
pub use info::{InfoLine, Score, ScoreBound, Wdl};
pub use moves::UciMove;
pub use options::EngineOptions;
pub use reply::{BestMove, ReplyParser};
pub use transport::{LineReader, LineWriter};
