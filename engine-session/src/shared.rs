//! 可共享的会话句柄
//!
//! 多个任务共用一个引擎时，每个辅助方法在整个"设置局面 + 查询"期间持有锁，
//! 保证回复与请求一一对应。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use protocol::UciMove;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::session::EngineSession;

/// 引擎会话的共享句柄
pub struct SharedSession<R, W> {
    inner: Arc<Mutex<EngineSession<R, W>>>,
}

impl<R, W> Clone for SharedSession<R, W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, W> SharedSession<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(session: EngineSession<R, W>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// 独占会话，用于组合多个操作
    pub async fn lock(&self) -> MutexGuard<'_, EngineSession<R, W>> {
        self.inner.lock().await
    }

    /// 给定局面的最佳走法
    pub async fn best_move_for(&self, fen: &str, time: Option<Duration>) -> Result<UciMove> {
        let mut session = self.inner.lock().await;
        session.set_position(fen).await?;
        session.get_best_move(time).await
    }

    /// 给定局面的静态评估
    pub async fn evaluate_fen(&self, fen: &str) -> Result<String> {
        let mut session = self.inner.lock().await;
        session.set_position(fen).await?;
        session.get_evaluation().await
    }

    /// 给定局面的各主变
    pub async fn principal_variations_for(&self, fen: &str) -> Result<BTreeMap<u32, Vec<UciMove>>> {
        let mut session = self.inner.lock().await;
        session.set_position(fen).await?;
        session.get_principal_variations().await
    }

    /// 释放底层会话
    pub async fn dispose(&self) {
        self.inner.lock().await.dispose();
    }
}
