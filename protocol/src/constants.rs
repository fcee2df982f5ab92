//! 协议常量定义

use std::time::Duration;

/// 初始局面 FEN
pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// 棋盘宽度（列数）
pub const BOARD_FILES: usize = 8;

/// 棋盘高度（行数）
pub const BOARD_RANKS: usize = 8;

/// 单行最大长度
pub const MAX_LINE_LEN: usize = 65536;

// ============================================================================
// 回复关键字
// ============================================================================

/// 握手结束
pub const UCI_OK: &str = "uciok";

/// 就绪确认
pub const READY_OK: &str = "readyok";

/// 最佳走法
pub const BEST_MOVE: &str = "bestmove";

/// 后台思考走法
pub const PONDER: &str = "ponder";

/// 搜索信息行
pub const INFO: &str = "info";

/// 静态评估结果行
pub const FINAL_EVALUATION: &str = "Final evaluation";

/// 无合法走法（将死或困毙）
pub const NO_MOVE: &str = "(none)";

/// UCI 空着
pub const NULL_MOVE: &str = "0000";

// ============================================================================
// 引擎选项
// ============================================================================

/// 线程数选项名
pub const OPTION_THREADS: &str = "Threads";

/// 置换表大小选项名（MB）
pub const OPTION_HASH: &str = "Hash";

/// 多主变选项名
pub const OPTION_MULTI_PV: &str = "MultiPV";

/// 棋力等级选项名
pub const OPTION_SKILL_LEVEL: &str = "Skill Level";

/// 默认线程数
pub const DEFAULT_THREADS: u32 = 4;

/// 默认置换表大小（MB）
pub const DEFAULT_HASH_MB: u32 = 256;

/// 默认主变数量
pub const DEFAULT_MULTI_PV: u32 = 1;

/// 默认棋力等级（0-20）
pub const DEFAULT_SKILL_LEVEL: u32 = 20;

/// 默认搜索深度（半回合）
pub const DEFAULT_DEPTH: u32 = 20;

/// 单行读取超时（秒）
pub const READ_TIMEOUT_SECS: u64 = 100;

/// 单行读取超时 Duration
pub const READ_TIMEOUT: Duration = Duration::from_secs(READ_TIMEOUT_SECS);
