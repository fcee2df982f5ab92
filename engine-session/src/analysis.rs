//! 搜索分析结果

use std::collections::BTreeMap;

use protocol::{BestMove, InfoLine, Score, UciMove};
use serde::{Deserialize, Serialize};

/// 一次完整搜索的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// 最佳走法
    pub best_move: UciMove,
    /// 引擎期望的对方应着
    pub ponder: Option<UciMove>,
    /// 每个主变序号最后一次报告的精确信息行
    pub lines: BTreeMap<u32, InfoLine>,
}

impl Analysis {
    pub(crate) fn new(best: BestMove, lines: BTreeMap<u32, InfoLine>) -> Self {
        Self {
            best_move: best.best,
            ponder: best.ponder,
            lines,
        }
    }

    /// 第一主变
    pub fn principal_line(&self) -> Option<&InfoLine> {
        self.lines.get(&1)
    }

    /// 第一主变的分数
    pub fn score(&self) -> Option<Score> {
        self.principal_line().and_then(|info| info.score)
    }

    /// 是否看到杀棋
    pub fn is_mate_seen(&self) -> bool {
        matches!(self.score(), Some(Score::Mate(_)))
    }

    /// 到杀棋的步数
    pub fn mate_in(&self) -> Option<i32> {
        match self.score() {
            Some(Score::Mate(n)) => Some(n),
            _ => None,
        }
    }

    /// 完成的搜索深度
    pub fn depth(&self) -> Option<u32> {
        self.principal_line().and_then(|info| info.depth)
    }

    /// 各主变的走法序列
    pub fn variations(&self) -> BTreeMap<u32, Vec<UciMove>> {
        self.lines
            .iter()
            .map(|(index, info)| (*index, info.pv.clone()))
            .collect()
    }
}
