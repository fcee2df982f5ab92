//! 测试用的模拟引擎
//!
//! 通过两条内存管道与会话相连，按固定剧本回复 UCI 命令。

use std::sync::{Arc, Mutex};

use protocol::{LineReader, LineWriter};
use tokio::io::DuplexStream;

pub type MockReader = DuplexStream;
pub type MockWriter = DuplexStream;

/// 白方已被将死（愚人杀）
pub const MATED_FEN: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

const WHITE_LINES: [&str; 5] = [
    "e2e4 e7e5 g1f3 b8c6",
    "d2d4 d7d5 c2c4",
    "g1f3 g8f6 c2c4",
    "c2c4 e7e5",
    "e2e3 d7d5",
];

const BLACK_LINES: [&str; 4] = [
    "e7e5 g1f3 b8c6",
    "c7c5 g1f3 d7d6",
    "e7e6 d2d4 d7d5",
    "g8f6 d2d4",
];

/// 模拟引擎的异常行为
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// 前 N 次 `go` 不输出任何内容，直到收到 `stop`
    pub silent_searches: usize,
    /// 只回复前 N 次 `isready`
    pub ready_replies: Option<usize>,
    /// 收到 `eval` 时关闭输出流
    pub close_on_eval: bool,
}

/// 模拟引擎句柄，记录收到的所有命令
pub struct MockEngine {
    received: Arc<Mutex<Vec<String>>>,
}

impl MockEngine {
    /// 启动模拟引擎，返回会话一侧的读端和写端
    pub fn start(behavior: MockBehavior) -> (Self, MockReader, MockWriter) {
        let (session_reader, engine_output) = tokio::io::duplex(64 * 1024);
        let (engine_input, session_writer) = tokio::io::duplex(64 * 1024);

        let received = Arc::new(Mutex::new(Vec::new()));
        let script = Script::new(behavior);
        tokio::spawn(run(script, engine_input, engine_output, Arc::clone(&received)));

        (Self { received }, session_reader, session_writer)
    }

    /// 到目前为止收到的命令
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

async fn run(
    mut script: Script,
    input: DuplexStream,
    output: DuplexStream,
    received: Arc<Mutex<Vec<String>>>,
) {
    let mut reader = LineReader::new(input);
    let mut writer = LineWriter::new(output);

    while let Ok(Some(line)) = reader.read_line().await {
        received.lock().unwrap().push(line.clone());

        // None 表示退出并关闭输出流
        let Some(replies) = script.respond(&line) else {
            return;
        };
        for reply in replies {
            if writer.write_line(&reply).await.is_err() {
                return;
            }
        }
    }
}

struct Script {
    behavior: MockBehavior,
    multi_pv: usize,
    black_to_move: bool,
    mated: bool,
    silent_pending: bool,
}

impl Script {
    fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            multi_pv: 1,
            black_to_move: false,
            mated: false,
            silent_pending: false,
        }
    }

    fn respond(&mut self, line: &str) -> Option<Vec<String>> {
        let command = line.split_whitespace().next().unwrap_or("");
        let replies = match command {
            "uci" => vec![
                "id name MockFish 1.0".to_string(),
                "id author Test Suite".to_string(),
                "option name Threads type spin default 1 min 1 max 1024".to_string(),
                "option name Hash type spin default 16 min 1 max 33554432".to_string(),
                "option name MultiPV type spin default 1 min 1 max 500".to_string(),
                "option name Skill Level type spin default 20 min 0 max 20".to_string(),
                "uciok".to_string(),
            ],
            "isready" => match self.behavior.ready_replies.as_mut() {
                Some(0) => Vec::new(),
                Some(left) => {
                    *left -= 1;
                    vec!["readyok".to_string()]
                }
                None => vec!["readyok".to_string()],
            },
            "setoption" => {
                if let Some(value) = line.strip_prefix("setoption name MultiPV value ") {
                    self.multi_pv = value.trim().parse().unwrap_or(1);
                }
                Vec::new()
            }
            "position" => {
                self.set_position(line);
                Vec::new()
            }
            "eval" => {
                if self.behavior.close_on_eval {
                    return None;
                }
                let score = if self.black_to_move { "-0.25" } else { "+0.09" };
                vec![
                    "NNUE evaluation        +0.12 (white side)".to_string(),
                    format!("Final evaluation       {} (white side)", score),
                ]
            }
            "go" => {
                if self.behavior.silent_searches > 0 {
                    self.behavior.silent_searches -= 1;
                    self.silent_pending = true;
                    Vec::new()
                } else {
                    self.search(line)
                }
            }
            "stop" if self.silent_pending => {
                self.silent_pending = false;
                vec!["bestmove a2a3 ponder a7a6".to_string()]
            }
            "quit" => return None,
            _ => Vec::new(),
        };
        Some(replies)
    }

    fn set_position(&mut self, line: &str) {
        if let Some(fen) = line.strip_prefix("position fen ") {
            self.mated = fen == MATED_FEN;
            self.black_to_move = fen.split_whitespace().nth(1) == Some("b");
        } else {
            let moves = line.split_whitespace().skip_while(|t| *t != "moves").skip(1).count();
            self.mated = false;
            self.black_to_move = moves % 2 == 1;
        }
    }

    fn search(&self, line: &str) -> Vec<String> {
        if self.mated {
            return vec![
                "info depth 0 score mate 0".to_string(),
                "bestmove (none)".to_string(),
            ];
        }

        let mut tokens = line.split_whitespace().skip(1);
        let depth = match (tokens.next(), tokens.next().and_then(|v| v.parse::<u32>().ok())) {
            (Some("depth"), Some(depth)) => depth,
            _ => 3,
        };
        let lines: &[&str] = if self.black_to_move {
            &BLACK_LINES
        } else {
            &WHITE_LINES
        };

        let mut replies = Vec::new();
        for d in 1..=depth {
            replies.push(format!(
                "info depth {} seldepth {} multipv 1 score cp 5 upperbound nodes {} nps 1000000 time {} pv a2a3",
                d,
                d + 2,
                d * 100,
                d
            ));
            for i in 1..=self.multi_pv {
                replies.push(format!(
                    "info depth {} seldepth {} multipv {} score cp {} nodes {} nps 1000000 hashfull 0 tbhits 0 time {} pv {}",
                    d,
                    d + 2,
                    i,
                    30 - 10 * i as i32,
                    d * 120,
                    d,
                    lines[(i - 1) % lines.len()]
                ));
            }
            replies.push(format!("info depth {} currmove e2e4 currmovenumber 1", d));
        }

        let mut best = lines[0].split_whitespace();
        replies.push(format!(
            "bestmove {} ponder {}",
            best.next().unwrap_or("0000"),
            best.next().unwrap_or("0000")
        ));
        replies
    }
}
