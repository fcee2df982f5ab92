//! 引擎选项
//!
//! 识别的选项集中在一个结构体里，由 [`EngineOptions::set`] 统一更新；
//! 其余选项按原文保存在 `extra` 中。选项名按 UCI 约定不区分大小写。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::constants::{
    DEFAULT_HASH_MB, DEFAULT_MULTI_PV, DEFAULT_SKILL_LEVEL, DEFAULT_THREADS, OPTION_HASH,
    OPTION_MULTI_PV, OPTION_SKILL_LEVEL, OPTION_THREADS,
};
use crate::error::{ProtocolError, Result};

/// 引擎选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// 搜索线程数
    pub threads: u32,
    /// 置换表大小（MB）
    pub hash_mb: u32,
    /// 同时报告的主变数量
    pub multi_pv: u32,
    /// 棋力等级，0-20
    pub skill_level: u32,
    /// 其他选项（名字 -> 值）
    pub extra: BTreeMap<String, String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            hash_mb: DEFAULT_HASH_MB,
            multi_pv: DEFAULT_MULTI_PV,
            skill_level: DEFAULT_SKILL_LEVEL,
            extra: BTreeMap::new(),
        }
    }
}

impl EngineOptions {
    /// 更新一个选项
    ///
    /// 识别的数值选项必须能解析为非负整数，否则返回错误且不做修改。
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let parse = |value: &str| {
            value
                .trim()
                .parse::<u32>()
                .map_err(|source| ProtocolError::InvalidOptionValue {
                    name: name.to_string(),
                    value: value.to_string(),
                    source,
                })
        };

        if name.eq_ignore_ascii_case(OPTION_THREADS) {
            self.threads = parse(value)?;
        } else if name.eq_ignore_ascii_case(OPTION_HASH) {
            self.hash_mb = parse(value)?;
        } else if name.eq_ignore_ascii_case(OPTION_MULTI_PV) {
            self.multi_pv = parse(value)?;
        } else if name.eq_ignore_ascii_case(OPTION_SKILL_LEVEL) {
            self.skill_level = parse(value)?;
        } else {
            self.extra.insert(name.to_string(), value.to_string());
        }

        Ok(())
    }

    /// 读取选项的当前值
    pub fn get(&self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case(OPTION_THREADS) {
            Some(self.threads.to_string())
        } else if name.eq_ignore_ascii_case(OPTION_HASH) {
            Some(self.hash_mb.to_string())
        } else if name.eq_ignore_ascii_case(OPTION_MULTI_PV) {
            Some(self.multi_pv.to_string())
        } else if name.eq_ignore_ascii_case(OPTION_SKILL_LEVEL) {
            Some(self.skill_level.to_string())
        } else {
            self.extra
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.clone())
        }
    }

    /// 生成下发全部选项的命令（固定顺序）
    pub fn to_commands(&self) -> Vec<Command> {
        let mut commands = vec![
            Command::set_option(OPTION_THREADS, self.threads.to_string()),
            Command::set_option(OPTION_HASH, self.hash_mb.to_string()),
            Command::set_option(OPTION_MULTI_PV, self.multi_pv.to_string()),
            Command::set_option(OPTION_SKILL_LEVEL, self.skill_level.to_string()),
        ];
        commands.extend(
            self.extra
                .iter()
                .map(|(name, value)| Command::set_option(name.as_str(), value.as_str())),
        );
        commands
    }
}
