//! 引擎回复解析

use serde::{Deserialize, Serialize};

use crate::constants::{BEST_MOVE, INFO, NO_MOVE, NULL_MOVE, PONDER, READY_OK};
use crate::error::{ProtocolError, Result};
use crate::info::InfoLine;
use crate::moves::UciMove;

/// `bestmove` 行的解析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestMove {
    pub best: UciMove,
    pub ponder: Option<UciMove>,
}

/// 回复解析器
pub struct ReplyParser;

impl ReplyParser {
    /// 是否为就绪确认
    pub fn ready_ok<'a>(line: impl Into<Option<&'a str>>) -> bool {
        line.into().is_some_and(|l| l.contains(READY_OK))
    }

    /// 解析最佳走法
    ///
    /// `bestmove (none)` 表示当前局面没有合法走法（将死或困毙），返回
    /// [`ProtocolError::NoMove`]，与格式错误区分开。
    pub fn best_move<'a>(line: impl Into<Option<&'a str>>) -> Result<BestMove> {
        let line = line.into().ok_or(ProtocolError::MissingReply)?;

        if !line.starts_with(BEST_MOVE) {
            return Err(ProtocolError::malformed("response does not contain a bestmove", line));
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.first() != Some(&BEST_MOVE) {
            return Err(ProtocolError::malformed("response does not contain a bestmove", line));
        }
        if parts.len() < 2 {
            return Err(ProtocolError::malformed("invalid bestmove format", line));
        }
        if parts[1] == NO_MOVE || parts[1] == NULL_MOVE {
            return Err(ProtocolError::NoMove);
        }

        let best = parts[1]
            .parse()
            .map_err(|_| ProtocolError::malformed("invalid bestmove token", line))?;

        let ponder = match parts.get(2..4) {
            Some([PONDER, mv]) => UciMove::parse(mv),
            _ => None,
        };

        Ok(BestMove { best, ponder })
    }

    /// 解析静态评估分数
    ///
    /// 返回第三个记号的原文（保留正负号），不做数值转换。
    pub fn evaluation(line: &str) -> Result<String> {
        line.split_whitespace()
            .nth(2)
            .map(str::to_string)
            .ok_or_else(|| {
                ProtocolError::malformed("not enough parts in the evaluation response", line)
            })
    }

    /// 提取信息行中的主变
    ///
    /// 非 `info` 行返回空序列。
    pub fn principal_variation<'a>(line: impl Into<Option<&'a str>>) -> Result<Vec<UciMove>> {
        let line = line.into().ok_or(ProtocolError::MissingReply)?;

        if !line.starts_with(INFO) {
            return Ok(Vec::new());
        }

        Ok(InfoLine::parse(line).map(|info| info.pv).unwrap_or_default())
    }
}
