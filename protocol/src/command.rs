//! UCI 命令构造
//!
//! 每个命令渲染为一行文本（不含换行符），不做任何转义。

use serde::{Deserialize, Serialize};

/// 搜索限制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchLimit {
    /// 固定深度（半回合）
    Depth(u32),
    /// 固定思考时间（毫秒）
    MoveTime(u64),
}

/// 发往引擎的命令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// 握手
    Uci,
    /// 就绪检查
    IsReady,
    /// 新对局
    NewGame,
    /// 以 FEN 设置局面
    PositionFen(String),
    /// 从初始局面走一串棋
    PositionMoves(Vec<String>),
    /// 开始搜索
    Go(SearchLimit),
    /// 停止搜索
    Stop,
    /// 设置选项
    SetOption { name: String, value: String },
    /// 静态评估
    Evaluate,
    /// 退出引擎
    Quit,
}

impl Command {
    /// 以 FEN 设置局面
    pub fn position_fen(fen: impl Into<String>) -> Self {
        Self::PositionFen(fen.into())
    }

    /// 从初始局面走一串棋
    pub fn position_moves<S: AsRef<str>>(moves: &[S]) -> Self {
        Self::PositionMoves(moves.iter().map(|m| m.as_ref().to_string()).collect())
    }

    /// 按深度搜索
    pub fn go_depth(depth: u32) -> Self {
        Self::Go(SearchLimit::Depth(depth))
    }

    /// 按时间搜索
    pub fn go_movetime(millis: u64) -> Self {
        Self::Go(SearchLimit::MoveTime(millis))
    }

    /// 设置选项
    pub fn set_option(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetOption {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for SearchLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchLimit::Depth(depth) => write!(f, "depth {}", depth),
            SearchLimit::MoveTime(millis) => write!(f, "movetime {}", millis),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Uci => f.write_str("uci"),
            Command::IsReady => f.write_str("isready"),
            Command::NewGame => f.write_str("ucinewgame"),
            Command::PositionFen(fen) => write!(f, "position fen {}", fen),
            Command::PositionMoves(moves) if moves.is_empty() => f.write_str("position startpos"),
            Command::PositionMoves(moves) => {
                write!(f, "position startpos moves {}", moves.join(" "))
            }
            Command::Go(limit) => write!(f, "go {}", limit),
            Command::Stop => f.write_str("stop"),
            Command::SetOption { name, value } => {
                write!(f, "setoption name {} value {}", name, value)
            }
            Command::Evaluate => f.write_str("eval"),
            Command::Quit => f.write_str("quit"),
        }
    }
}
