//! 引擎进程启动

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Windows 下不弹出控制台窗口
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// 已启动的引擎进程及其管道
pub(crate) struct EngineProcess {
    pub child: Child,
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
}

impl EngineProcess {
    /// 启动引擎进程，标准输入/输出/错误全部重定向
    pub fn spawn(config: &EngineConfig) -> Result<Self> {
        let mut command = Command::new(&config.path);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let mut child = command.spawn().map_err(|source| EngineError::Spawn {
            path: config.path.clone(),
            source,
        })?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain_stderr(stderr));
        }

        info!("Engine process started: {:?} (pid {:?})", config.path, child.id());

        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }
}

fn missing_pipe(name: &str) -> EngineError {
    EngineError::Io(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        format!("engine {} is not piped", name),
    ))
}

/// 持续读取标准错误，避免管道写满阻塞引擎
async fn drain_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!("engine stderr: {}", line);
    }
}
