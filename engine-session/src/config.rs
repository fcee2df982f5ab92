//! 会话配置
//!
//! 提供配置数据结构和 JSON 持久化

use std::path::{Path, PathBuf};
use std::time::Duration;

use protocol::{EngineOptions, DEFAULT_DEPTH, READ_TIMEOUT};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 引擎会话配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 引擎可执行文件路径
    pub path: PathBuf,
    /// 启动参数
    pub args: Vec<String>,
    /// 单行读取超时（毫秒）
    pub read_timeout_ms: u64,
    /// 默认搜索深度
    pub depth: u32,
    /// 启动时下发的选项
    pub options: EngineOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stockfish"),
            args: Vec::new(),
            read_timeout_ms: u64::try_from(READ_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
            depth: DEFAULT_DEPTH,
            options: EngineOptions::default(),
        }
    }
}

impl EngineConfig {
    /// 使用默认配置，指定引擎路径
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// 追加启动参数
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// 设置单行读取超时
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// 单行读取超时
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// 获取默认配置文件路径
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("uci-engine");
            path.push("engine.json");
            path
        })
    }

    /// 从默认位置加载，失败时使用默认配置
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("无法获取配置目录，使用默认配置");
            return Self::default();
        };

        if !path.exists() {
            tracing::info!("配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("已加载配置: {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("配置文件无效: {}，使用默认配置", e);
                Self::default()
            }
        }
    }

    /// 从指定文件加载
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存到指定文件
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("配置已保存: {:?}", path);
        Ok(())
    }
}
