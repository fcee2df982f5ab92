//! 分析一个局面
//!
//! 运行方式:
//! ```bash
//! cargo run -p engine-session --example analyse_position -- /usr/bin/stockfish
//!
//! # 指定局面
//! cargo run -p engine-session --example analyse_position -- stockfish "<fen>"
//! ```

use std::env;
use std::time::Duration;

use engine_session::protocol::{SearchLimit, STARTPOS_FEN};
use engine_session::{EngineConfig, ProcessSession};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug 可以看到收发的每一行
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = EngineConfig::load();
    if let Some(path) = args.get(1) {
        config.path = path.into();
    }
    let fen = args.get(2).map(String::as_str).unwrap_or(STARTPOS_FEN);

    let mut session = ProcessSession::spawn(config).await?;
    let info = session.engine_info();
    println!(
        "引擎: {} ({})",
        info.name.as_deref().unwrap_or("unknown"),
        info.author.as_deref().unwrap_or("unknown")
    );

    session.new_game().await?;
    session.set_position(fen).await?;
    session.set_multi_pv(3).await?;

    let analysis = session.analyse(SearchLimit::Depth(12)).await?;
    println!("最佳走法: {}", analysis.best_move);
    if let Some(ponder) = &analysis.ponder {
        println!("预期应着: {}", ponder);
    }
    for (index, line) in &analysis.lines {
        let moves: Vec<&str> = line.pv.iter().map(|m| m.as_str()).collect();
        println!("  #{} {:?}: {}", index, line.score, moves.join(" "));
    }

    match session.get_best_move(Some(Duration::from_millis(500))).await {
        Ok(mv) => println!("限时 500ms: {}", mv),
        Err(e) if e.is_no_move() => println!("没有合法走法"),
        Err(e) => return Err(e.into()),
    }

    session.shutdown().await;
    Ok(())
}
