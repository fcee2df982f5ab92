//! 搜索信息行解析
//!
//! 按关键字逐项解析 `info ...` 行，遇到 `pv` 后剩余记号全部作为主变走法。
//! 不依赖字段顺序或固定偏移，引擎增删字段也能正确取到主变。

use serde::{Deserialize, Serialize};

use crate::constants::INFO;
use crate::moves::UciMove;

/// 局面分数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    /// 厘兵分（走子方视角）
    Centipawns(i32),
    /// N 步杀（负数表示被杀）
    Mate(i32),
}

/// 分数边界（搜索窗口失败时引擎给出的非精确分数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBound {
    Lower,
    Upper,
}

/// 胜/和/负 千分比
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wdl {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

/// 一行搜索信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoLine {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    pub multipv: Option<u32>,
    pub score: Option<Score>,
    pub bound: Option<ScoreBound>,
    pub wdl: Option<Wdl>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub hashfull: Option<u32>,
    pub tbhits: Option<u64>,
    /// 已用时间（毫秒）
    pub time: Option<u64>,
    pub currmove: Option<UciMove>,
    pub currmovenumber: Option<u32>,
    /// `info string` 后的自由文本
    pub string: Option<String>,
    pub pv: Vec<UciMove>,
}

impl InfoLine {
    /// 解析信息行，非 `info` 开头返回 None
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(INFO) {
            return None;
        }

        let mut info = InfoLine::default();
        while let Some(key) = tokens.next() {
            match key {
                "depth" => info.depth = next_number(&mut tokens),
                "seldepth" => info.seldepth = next_number(&mut tokens),
                "multipv" => info.multipv = next_number(&mut tokens),
                "nodes" => info.nodes = next_number(&mut tokens),
                "nps" => info.nps = next_number(&mut tokens),
                "hashfull" => info.hashfull = next_number(&mut tokens),
                "tbhits" => info.tbhits = next_number(&mut tokens),
                "time" => info.time = next_number(&mut tokens),
                "currmovenumber" => info.currmovenumber = next_number(&mut tokens),
                "currmove" => info.currmove = tokens.next().and_then(UciMove::parse),
                "score" => {
                    info.score = match (tokens.next(), next_number::<i32>(&mut tokens)) {
                        (Some("cp"), Some(v)) => Some(Score::Centipawns(v)),
                        (Some("mate"), Some(v)) => Some(Score::Mate(v)),
                        _ => None,
                    };
                }
                "lowerbound" => info.bound = Some(ScoreBound::Lower),
                "upperbound" => info.bound = Some(ScoreBound::Upper),
                "wdl" => {
                    let win = next_number(&mut tokens);
                    let draw = next_number(&mut tokens);
                    let loss = next_number(&mut tokens);
                    if let (Some(win), Some(draw), Some(loss)) = (win, draw, loss) {
                        info.wdl = Some(Wdl { win, draw, loss });
                    }
                }
                "string" => {
                    info.string = Some(tokens.by_ref().collect::<Vec<_>>().join(" "));
                }
                "pv" => {
                    // 主变到行尾为止，遇到非走法记号即停
                    info.pv = tokens.by_ref().map_while(UciMove::parse).collect();
                }
                // 未知关键字：跳过
                _ => {}
            }
        }

        Some(info)
    }

    /// 是否为带主变的精确分数行
    pub fn is_exact_pv(&self) -> bool {
        !self.pv.is_empty() && self.bound.is_none()
    }

    /// 主变序号，未给出时视为 1
    pub fn pv_index(&self) -> u32 {
        self.multipv.unwrap_or(1)
    }
}

fn next_number<'a, T: std::str::FromStr>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<T> {
    tokens.next().and_then(|t| t.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOCKFISH_LINE: &str = "info depth 20 seldepth 31 multipv 1 score cp 24 nodes 631058 nps 653269 hashfull 239 tbhits 0 time 966 pv e2e4 e7e5 g1f3 g8f6 d2d4 f6e4 f3e5 d7d5 f1d3 b8d7 e5d7 d8d7 e1g1 f8d6";

    #[test]
    fn test_parse_full_line() {
        let info = InfoLine::parse(STOCKFISH_LINE).unwrap();
        assert_eq!(info.depth, Some(20));
        assert_eq!(info.seldepth, Some(31));
        assert_eq!(info.multipv, Some(1));
        assert_eq!(info.score, Some(Score::Centipawns(24)));
        assert_eq!(info.nodes, Some(631058));
        assert_eq!(info.nps, Some(653269));
        assert_eq!(info.hashfull, Some(239));
        assert_eq!(info.tbhits, Some(0));
        assert_eq!(info.time, Some(966));
        assert_eq!(info.pv.len(), 14);
        assert_eq!(info.pv[0], "e2e4");
        assert_eq!(info.pv[13], "f8d6");
        assert!(info.is_exact_pv());
    }

    #[test]
    fn test_parse_mate_and_bound() {
        let info = InfoLine::parse("info depth 5 score mate -2 upperbound nodes 10 pv h7h8").unwrap();
        assert_eq!(info.score, Some(Score::Mate(-2)));
        assert_eq!(info.bound, Some(ScoreBound::Upper));
        assert!(!info.is_exact_pv());
    }

    #[test]
    fn test_parse_extra_fields() {
        // 多出 wdl 字段，固定偏移会错位
        let line = "info depth 12 seldepth 14 multipv 2 score cp -15 wdl 40 900 60 nodes 1000 nps 5000 hashfull 1 tbhits 0 time 200 pv d2d4 d7d5";
        let info = InfoLine::parse(line).unwrap();
        assert_eq!(info.pv_index(), 2);
        assert_eq!(info.score, Some(Score::Centipawns(-15)));
        assert_eq!(info.wdl, Some(Wdl { win: 40, draw: 900, loss: 60 }));
        assert_eq!(info.pv.iter().map(|m| m.as_str()).collect::<Vec<_>>(), ["d2d4", "d7d5"]);
    }

    #[test]
    fn test_parse_string_and_currmove() {
        let info = InfoLine::parse("info string NNUE evaluation using nn.nnue enabled").unwrap();
        assert_eq!(info.string.as_deref(), Some("NNUE evaluation using nn.nnue enabled"));
        assert!(info.pv.is_empty());

        let info = InfoLine::parse("info depth 3 currmove e2e4 currmovenumber 1").unwrap();
        assert_eq!(info.currmove.as_ref().map(|m| m.as_str()), Some("e2e4"));
        assert_eq!(info.currmovenumber, Some(1));
        assert_eq!(info.pv_index(), 1);
    }

    #[test]
    fn test_non_info_line() {
        assert!(InfoLine::parse("bestmove e2e4").is_none());
        assert!(InfoLine::parse("").is_none());
        assert!(InfoLine::parse("information depth 1").is_none());
    }
}
