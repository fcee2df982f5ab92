//! FEN 格式校验
//!
//! 国际象棋 FEN 格式：
//! `<棋盘> <走子方> <易位权> <吃过路兵格> <半回合计数> <回合数>`
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`
//!
//! 只做语法和每行格数检查，不判断局面是否合法（王的数量、将军等交给引擎）。

use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::{BOARD_FILES, BOARD_RANKS};
use crate::error::FenError;

/// 8 个棋盘行 + 5 个元数据字段
const FEN_FIELDS: usize = BOARD_RANKS + 5;

lazy_static! {
    static ref FEN_PATTERN: Regex = Regex::new(
        r"^((?:[rnbqkpRNBQKP1-8]+/){7}[rnbqkpRNBQKP1-8]+) ([bw]) (-|[KQkq]{1,4}) (-|[a-h][1-8]) (\d+) (\d+)$"
    )
    .expect("FEN pattern should be valid");
}

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 校验 FEN 字符串
    pub fn validate(fen: &str) -> Result<(), FenError> {
        let matched = FEN_PATTERN.find(fen).ok_or_else(|| FenError::Malformed {
            fen: fen.to_string(),
        })?;

        // rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1
        // -> [rnbqkbnr, pppppppp, 8, 8, 8, 8, PPPPPPPP, RNBQKBNR, w, KQkq, -, 0, 1]
        let fields: Vec<&str> = matched.as_str().split(['/', ' ']).collect();
        if fields.len() != FEN_FIELDS {
            return Err(FenError::FieldCount {
                expected: FEN_FIELDS,
                actual: fields.len(),
            });
        }

        for (rank, row) in fields[..BOARD_RANKS].iter().enumerate() {
            Self::validate_rank(rank, row)?;
        }

        Ok(())
    }

    /// 是否为合法 FEN
    pub fn is_valid(fen: &str) -> bool {
        Self::validate(fen).is_ok()
    }

    /// 校验单行：数字表示连续空格（不能相邻），字母表示一个棋子，合计必须为 8
    fn validate_rank(rank: usize, row: &str) -> Result<(), FenError> {
        let mut files = 0usize;
        let mut previous_was_digit = false;

        for c in row.chars() {
            if let Some(empty) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                if previous_was_digit {
                    return Err(FenError::ConsecutiveDigits { rank });
                }
                files += empty as usize;
                previous_was_digit = true;
            } else if matches!(c.to_ascii_lowercase(), 'p' | 'n' | 'b' | 'r' | 'q' | 'k') {
                files += 1;
                previous_was_digit = false;
            } else {
                return Err(FenError::InvalidPiece { rank, piece: c });
            }
        }

        if files != BOARD_FILES {
            return Err(FenError::RankWidth { rank, files });
        }

        Ok(())
    }
}
