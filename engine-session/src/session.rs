//! 引擎会话
//!
//! 一个会话独占一个引擎进程及其两条管道。所有协议操作都要求 `&mut self`，
//! 同一时刻最多只有一次未完成的命令/回复交换。
//!
//! 交换被超时、取消或中途丢弃后，引擎可能还在搜索，也可能还会输出属于旧请求
//! 的行。之后任何会话操作写入命令前都先重新同步：停止未完成的搜索，发送
//! `isready`，丢弃 `readyok` 之前的所有行。原始的 `write_line` 不做同步。

use std::collections::BTreeMap;
use std::time::Duration;

use protocol::{
    Command, EngineOptions, Fen, InfoLine, LineReader, LineWriter, ProtocolError, ReplyParser,
    SearchLimit, UciMove, BEST_MOVE, FINAL_EVALUATION, OPTION_MULTI_PV, READY_OK, UCI_OK,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analysis::Analysis;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::process::EngineProcess;

/// `quit` 后等待进程自行退出的时间
const QUIT_GRACE: Duration = Duration::from_secs(2);

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// 正在握手和下发默认选项
    Starting,
    /// 空闲
    Ready,
    /// 有一次交换正在进行
    Busy,
    /// 已释放
    Disposed,
}

/// 握手时引擎报告的身份信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub name: Option<String>,
    pub author: Option<String>,
    /// 引擎声明支持的选项名
    pub options: Vec<String>,
}

impl EngineInfo {
    fn absorb(&mut self, line: &str) {
        if let Some(name) = line.strip_prefix("id name ") {
            self.name = Some(name.trim().to_string());
        } else if let Some(author) = line.strip_prefix("id author ") {
            self.author = Some(author.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("option name ") {
            let name = rest.split_once(" type ").map_or(rest, |(name, _)| name);
            self.options.push(name.trim().to_string());
        }
    }
}

/// 子进程引擎会话
pub type ProcessSession = EngineSession<ChildStdout, ChildStdin>;

/// 引擎会话
pub struct EngineSession<R, W> {
    reader: Option<LineReader<R>>,
    writer: Option<LineWriter<W>>,
    child: Option<Child>,
    state: SessionState,
    /// 上一次交换被放弃，输出流里可能有残留行
    desynced: bool,
    /// 已发送但还没读到 `readyok` 的 `isready` 数
    pending_ready: usize,
    /// 已发送 `go` 但还没读到 `bestmove`
    search_pending: bool,
    depth: u32,
    options: EngineOptions,
    read_timeout: Duration,
    info: EngineInfo,
}

impl ProcessSession {
    /// 启动引擎进程并完成初始化（握手、下发默认选项、就绪检查）
    pub async fn spawn(config: EngineConfig) -> Result<Self> {
        let process = EngineProcess::spawn(&config)?;
        let mut session = Self::with_parts(process.stdout, process.stdin, Some(process.child), &config);
        session.initialize(&config.options).await?;
        Ok(session)
    }
}

impl<R, W> EngineSession<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// 在任意读写端上建立会话并完成初始化
    pub async fn from_streams(reader: R, writer: W, config: &EngineConfig) -> Result<Self> {
        let mut session = Self::with_parts(reader, writer, None, config);
        session.initialize(&config.options).await?;
        Ok(session)
    }

    fn with_parts(reader: R, writer: W, child: Option<Child>, config: &EngineConfig) -> Self {
        Self {
            reader: Some(LineReader::new(reader)),
            writer: Some(LineWriter::new(writer)),
            child,
            state: SessionState::Starting,
            desynced: false,
            pending_ready: 0,
            search_pending: false,
            depth: config.depth,
            options: EngineOptions::default(),
            read_timeout: config.read_timeout(),
            info: EngineInfo::default(),
        }
    }

    /// 握手、下发选项，直到引擎确认就绪才返回
    async fn initialize(&mut self, options: &EngineOptions) -> Result<()> {
        self.send(&Command::Uci).await?;
        let mut engine_info = EngineInfo::default();
        loop {
            let line = self.next_line(UCI_OK, None).await?;
            if line.trim() == UCI_OK {
                break;
            }
            engine_info.absorb(&line);
        }
        info!(
            "Engine handshake done: {} ({} options)",
            engine_info.name.as_deref().unwrap_or("unknown"),
            engine_info.options.len()
        );
        self.info = engine_info;

        for command in options.to_commands() {
            self.send(&command).await?;
        }
        self.options = options.clone();

        if !self.is_ready().await? {
            return Err(EngineError::NotReady);
        }
        self.state = SessionState::Ready;
        Ok(())
    }

    // ========================================================================
    // 会话操作
    // ========================================================================

    /// 开始新对局
    pub async fn new_game(&mut self) -> Result<()> {
        self.begin_exchange().await?;
        let result = self.new_game_inner().await;
        self.end_exchange();
        result
    }

    async fn new_game_inner(&mut self) -> Result<()> {
        self.send(&Command::NewGame).await?;
        if !self.is_ready_inner().await? {
            return Err(EngineError::NotReady);
        }
        Ok(())
    }

    /// 以 FEN 设置局面，非法 FEN 不会发送给引擎
    pub async fn set_position(&mut self, fen: &str) -> Result<()> {
        self.validate_fen(fen)?;
        self.ensure_synced().await?;
        self.send(&Command::position_fen(fen)).await
    }

    /// 从初始局面走一串棋（不校验走法）
    pub async fn set_position_moves<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<()> {
        self.ensure_synced().await?;
        self.send(&Command::position_moves(moves)).await
    }

    /// 请求静态评估，返回引擎输出的分数原文（如 `+0.09`）
    pub async fn get_evaluation(&mut self) -> Result<String> {
        self.begin_exchange().await?;
        let result = self.evaluation_inner().await;
        self.end_exchange();
        result
    }

    async fn evaluation_inner(&mut self) -> Result<String> {
        self.send(&Command::Evaluate).await?;
        let line = self
            .read_until_match(FINAL_EVALUATION, None, |line| line.contains(FINAL_EVALUATION))
            .await?;
        Ok(ReplyParser::evaluation(&line)?)
    }

    /// 搜索最佳走法
    ///
    /// 给出时间则按时间搜索，否则按会话深度搜索。局面无合法走法时返回
    /// [`ProtocolError::NoMove`]。
    pub async fn get_best_move(&mut self, time: Option<Duration>) -> Result<UciMove> {
        self.begin_exchange().await?;
        let result = self.best_move_inner(time, None).await;
        self.end_exchange();
        result
    }

    /// 可取消的 [`get_best_move`](Self::get_best_move)
    pub async fn get_best_move_cancellable(
        &mut self,
        time: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<UciMove> {
        self.begin_exchange().await?;
        let result = self.best_move_inner(time, Some(cancel)).await;
        self.end_exchange();
        result
    }

    async fn best_move_inner(
        &mut self,
        time: Option<Duration>,
        cancel: Option<&CancellationToken>,
    ) -> Result<UciMove> {
        let limit = match time {
            Some(time) => SearchLimit::MoveTime(u64::try_from(time.as_millis()).unwrap_or(u64::MAX)),
            None => SearchLimit::Depth(self.depth),
        };
        self.send(&Command::Go(limit)).await?;

        let line = self
            .read_until_match(BEST_MOVE, cancel, |line| line.starts_with(BEST_MOVE))
            .await?;
        Ok(ReplyParser::best_move(line.as_str())?.best)
    }

    /// 完整搜索，返回最佳走法和各主变的最后一次精确信息
    pub async fn analyse(&mut self, limit: SearchLimit) -> Result<Analysis> {
        self.begin_exchange().await?;
        let result = self.analyse_inner(limit).await;
        self.end_exchange();
        result
    }

    async fn analyse_inner(&mut self, limit: SearchLimit) -> Result<Analysis> {
        self.send(&Command::Go(limit)).await?;

        let mut lines = BTreeMap::new();
        loop {
            let line = self.next_line(BEST_MOVE, None).await?;
            if line.starts_with(BEST_MOVE) {
                let best = ReplyParser::best_move(line.as_str())?;
                return Ok(Analysis::new(best, lines));
            }
            if let Some(info) = InfoLine::parse(&line).filter(InfoLine::is_exact_pv) {
                lines.insert(info.pv_index(), info);
            }
        }
    }

    /// 设置选项
    ///
    /// 识别的数值选项（如 `MultiPV`）先在本地解析，解析失败时不发送。
    pub async fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        let mut options = self.options.clone();
        options.set(name, value)?;
        self.ensure_synced().await?;
        self.send(&Command::set_option(name, value)).await?;
        self.options = options;
        Ok(())
    }

    /// 设置主变数量
    pub async fn set_multi_pv(&mut self, count: u32) -> Result<()> {
        self.set_option(OPTION_MULTI_PV, &count.to_string()).await
    }

    /// 本地记录的选项值
    pub fn get_option(&self, name: &str) -> Option<String> {
        self.options.get(name)
    }

    /// 就绪检查，超时返回 false
    pub async fn is_ready(&mut self) -> Result<bool> {
        self.begin_exchange().await?;
        let result = self.is_ready_inner().await;
        self.end_exchange();
        result
    }

    async fn is_ready_inner(&mut self) -> Result<bool> {
        self.send(&Command::IsReady).await?;
        match self
            .read_until_match(READY_OK, None, |line| ReplyParser::ready_ok(line))
            .await
        {
            Ok(line) => Ok(ReplyParser::ready_ok(line.as_str())),
            Err(EngineError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// 按会话深度搜索，收集每个主变序号在该深度的走法
    ///
    /// 超时则整个调用失败，不返回部分结果。引擎提前结束搜索时返回已收集的主变。
    pub async fn get_principal_variations(&mut self) -> Result<BTreeMap<u32, Vec<UciMove>>> {
        self.begin_exchange().await?;
        let result = self.principal_variations_inner().await;
        self.end_exchange();
        result
    }

    async fn principal_variations_inner(&mut self) -> Result<BTreeMap<u32, Vec<UciMove>>> {
        let depth = self.depth;
        let wanted = self.options.multi_pv;
        self.send(&Command::go_depth(depth)).await?;

        let expected = format!("info depth {} multipv 1..{}", depth, wanted);
        let mut variations = BTreeMap::new();
        loop {
            let line = self.next_line(&expected, None).await?;

            // bestmove 一定要读掉，否则会被下一次请求误认
            if line.starts_with(BEST_MOVE) {
                if (variations.len() as u32) < wanted {
                    warn!(
                        "Search ended with {} of {} variations at depth {}",
                        variations.len(),
                        wanted,
                        depth
                    );
                }
                return Ok(variations);
            }

            let Some(info) = InfoLine::parse(&line) else {
                continue;
            };
            let index = info.pv_index();
            if info.depth == Some(depth) && info.is_exact_pv() && (1..=wanted).contains(&index) {
                variations.insert(index, info.pv);
            }
        }
    }

    /// 校验 FEN
    pub fn validate_fen(&self, fen: &str) -> Result<()> {
        Fen::validate(fen).map_err(ProtocolError::from)?;
        Ok(())
    }

    // ========================================================================
    // 行读写
    // ========================================================================

    /// 读取直到某一行同时包含全部关键字（与顺序无关）
    ///
    /// 超时针对每一行单独计算。
    pub async fn read_until(&mut self, expected: &[&str]) -> Result<String> {
        let what = expected.join(" + ");
        self.read_until_match(&what, None, |line| expected.iter().all(|token| line.contains(token)))
            .await
    }

    /// 可取消的 [`read_until`](Self::read_until)
    pub async fn read_until_cancellable(
        &mut self,
        expected: &[&str],
        cancel: &CancellationToken,
    ) -> Result<String> {
        let what = expected.join(" + ");
        self.read_until_match(&what, Some(cancel), |line| {
            expected.iter().all(|token| line.contains(token))
        })
        .await
    }

    /// 读取一行，输出流结束返回 None
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let reader = self.reader.as_mut().ok_or(EngineError::Disposed)?;
        let line = reader.read_line().await?;
        if let Some(line) = &line {
            debug!("<< {}", line);
            self.track_reply(line);
        }
        Ok(line)
    }

    /// 写入一行
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(EngineError::Disposed)?;
        debug!(">> {}", line);
        writer.write_line(line).await?;
        self.track_command(line);
        Ok(())
    }

    async fn send(&mut self, command: &Command) -> Result<()> {
        self.write_line(&command.to_string()).await
    }

    async fn read_until_match<F>(
        &mut self,
        expected: &str,
        cancel: Option<&CancellationToken>,
        mut matches: F,
    ) -> Result<String>
    where
        F: FnMut(&str) -> bool,
    {
        loop {
            let line = self.next_line(expected, cancel).await?;
            if matches(&line) {
                return Ok(line);
            }
        }
    }

    /// 读取下一行，与单行超时和取消信号竞争
    async fn next_line(&mut self, expected: &str, cancel: Option<&CancellationToken>) -> Result<String> {
        let timeout = self.read_timeout;
        let outcome = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => None,
                read = tokio::time::timeout(timeout, self.read_line()) => Some(read),
            },
            None => Some(tokio::time::timeout(timeout, self.read_line()).await),
        };

        match outcome {
            None => {
                warn!("Cancelled while waiting for {}", expected);
                self.desynced = true;
                Err(EngineError::Cancelled)
            }
            Some(Err(_elapsed)) => {
                warn!("Timed out after {:?} waiting for {}", timeout, expected);
                self.desynced = true;
                Err(EngineError::Timeout {
                    expected: expected.to_string(),
                    timeout,
                })
            }
            Some(Ok(Ok(Some(line)))) => Ok(line),
            Some(Ok(Ok(None))) => Err(EngineError::StreamClosed),
            Some(Ok(Err(e))) => Err(e),
        }
    }

    fn track_command(&mut self, line: &str) {
        match line.split_whitespace().next() {
            Some("isready") => self.pending_ready += 1,
            Some("go") => self.search_pending = true,
            _ => {}
        }
    }

    fn track_reply(&mut self, line: &str) {
        if line.starts_with(BEST_MOVE) {
            self.search_pending = false;
        } else if line.trim() == READY_OK {
            self.pending_ready = self.pending_ready.saturating_sub(1);
        }
    }

    // ========================================================================
    // 交换与重新同步
    // ========================================================================

    async fn begin_exchange(&mut self) -> Result<()> {
        self.ensure_synced().await?;
        self.state = SessionState::Busy;
        Ok(())
    }

    /// 引擎仍在执行被放弃的请求时，先停下并清空输出，再写入新命令
    async fn ensure_synced(&mut self) -> Result<()> {
        match self.state {
            SessionState::Disposed => return Err(EngineError::Disposed),
            SessionState::Busy => {
                // 上一次交换的 future 在完成前被丢弃
                warn!("Previous engine exchange was abandoned");
                self.desynced = true;
            }
            SessionState::Starting | SessionState::Ready => {}
        }

        if self.desynced {
            self.resync().await?;
        }
        if self.state == SessionState::Busy {
            self.state = SessionState::Ready;
        }
        Ok(())
    }

    fn end_exchange(&mut self) {
        if self.state == SessionState::Busy {
            self.state = SessionState::Ready;
        }
    }

    /// 停止残留搜索并丢弃 `readyok` 之前的所有行
    async fn resync(&mut self) -> Result<()> {
        warn!(
            "Resynchronizing engine output (search pending: {}, readyok pending: {})",
            self.search_pending, self.pending_ready
        );

        if self.search_pending {
            self.send(&Command::Stop).await?;
        }
        self.send(&Command::IsReady).await?;

        while self.search_pending || self.pending_ready > 0 {
            let line = self.next_line(READY_OK, None).await?;
            debug!("Discarding stale line: {}", line);
        }

        self.desynced = false;
        Ok(())
    }
}

impl<R, W> EngineSession<R, W> {
    /// 当前状态
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 是否已释放
    pub fn is_disposed(&self) -> bool {
        self.state == SessionState::Disposed
    }

    /// 握手时得到的引擎信息
    pub fn engine_info(&self) -> &EngineInfo {
        &self.info
    }

    /// 搜索深度
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// 设置搜索深度
    pub fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
    }

    /// 主变数量（最后一次设置的 MultiPV）
    pub fn multi_pv(&self) -> u32 {
        self.options.multi_pv
    }

    /// 本地记录的全部选项
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// 引擎进程 ID（未释放的子进程会话才有）
    pub fn process_id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// 释放管道并结束引擎进程
    ///
    /// 可重复调用，第二次起什么都不做；也不会因为进程已退出而失败。
    pub fn dispose(&mut self) {
        if self.state == SessionState::Disposed {
            return;
        }

        self.writer = None;
        self.reader = None;

        if let Some(mut child) = self.child.take() {
            match child.try_wait() {
                Ok(Some(status)) => debug!("Engine already exited: {}", status),
                _ => {
                    if let Err(e) = child.start_kill() {
                        warn!("Failed to kill engine process: {}", e);
                    }
                }
            }
        }

        self.state = SessionState::Disposed;
        info!("Engine session disposed");
    }
}

impl ProcessSession {
    /// 发送 `quit` 并等待进程退出，超时则强制结束
    pub async fn shutdown(mut self) {
        if self.is_disposed() {
            return;
        }

        if let Err(e) = self.send(&Command::Quit).await {
            debug!("Failed to send quit: {}", e);
        }
        // 关闭输入端，引擎读到 EOF 也会退出
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.shutdown().await {
                debug!("Failed to close engine stdin: {}", e);
            }
        }

        if let Some(child) = self.child.as_mut() {
            match tokio::time::timeout(QUIT_GRACE, child.wait()).await {
                Ok(Ok(status)) => info!("Engine exited: {}", status),
                Ok(Err(e)) => warn!("Failed to wait for engine: {}", e),
                Err(_) => warn!("Engine did not exit within {:?}, killing", QUIT_GRACE),
            }
        }

        self.dispose();
    }
}

impl<R, W> Drop for EngineSession<R, W> {
    fn drop(&mut self) {
        self.dispose();
    }
}
