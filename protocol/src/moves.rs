//! UCI 走法记号
//!
//! 走法由引擎回复解析得到，只做长度和字符类别检查，不做合法性验证。

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// UCI 走法，如 `e2e4`、`e7e8q`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UciMove(String);

impl UciMove {
    /// 解析走法记号，不合格式返回 None
    pub fn parse(token: &str) -> Option<Self> {
        if Self::is_well_formed(token) {
            Some(Self(token.to_string()))
        } else {
            None
        }
    }

    /// 检查记号是否为 `[a-h][1-8][a-h][1-8][qrbn]?`
    pub fn is_well_formed(token: &str) -> bool {
        let bytes = token.as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return false;
        }

        let is_file = |b: u8| (b'a'..=b'h').contains(&b);
        let is_rank = |b: u8| (b'1'..=b'8').contains(&b);

        is_file(bytes[0])
            && is_rank(bytes[1])
            && is_file(bytes[2])
            && is_rank(bytes[3])
            && bytes.get(4).map_or(true, |b| matches!(b, b'q' | b'r' | b'b' | b'n'))
    }

    /// 起始格，如 `e2`
    pub fn from_square(&self) -> &str {
        &self.0[0..2]
    }

    /// 目标格，如 `e4`
    pub fn to_square(&self) -> &str {
        &self.0[2..4]
    }

    /// 升变棋子
    pub fn promotion(&self) -> Option<char> {
        self.0.chars().nth(4)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for UciMove {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ProtocolError::malformed("not a UCI move", s))
    }
}

impl TryFrom<String> for UciMove {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UciMove> for String {
    fn from(mv: UciMove) -> Self {
        mv.0
    }
}

impl AsRef<str> for UciMove {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for UciMove {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for UciMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
