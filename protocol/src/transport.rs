//! 行传输
//!
//! UCI 协议以换行分隔的文本行通信。`LineReader` / `LineWriter` 包装任意
//! tokio 异步读写端（子进程管道、内存管道等），上层不关心具体实现。

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::command::Command;
use crate::constants::MAX_LINE_LEN;
use crate::error::{ProtocolError, Result};

/// 行读取器
///
/// 可以在 `select!` / `timeout` 中被取消：已读到的半行保留在缓冲区，
/// 下一次读取接着拼完整行，不会丢数据。
///
/// 单行最多缓存 `MAX_LINE_LEN` 字节，超长行报错后其余部分被丢弃。
pub struct LineReader<R> {
    reader: BufReader<R>,
    buffer: Vec<u8>,
    /// 正在跳过超长行的剩余部分
    discarding: bool,
}

impl<R: AsyncRead + Unpin + Send> LineReader<R> {
    /// 创建新的行读取器
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: Vec::with_capacity(256),
            discarding: false,
        }
    }

    /// 读取一行（去掉行尾换行），流结束返回 None
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        loop {
            // 最多读到 MAX_LINE_LEN + 1 字节，超出即可判定为超长行
            let limit = (MAX_LINE_LEN + 1).saturating_sub(self.buffer.len()) as u64;
            let read = (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut self.buffer)
                .await?;
            let complete = self.buffer.last() == Some(&b'\n');

            if self.discarding {
                self.buffer.clear();
                if complete || read == 0 {
                    self.discarding = false;
                }
                if read == 0 {
                    return Ok(None);
                }
                continue;
            }

            if self.buffer.is_empty() {
                return Ok(None);
            }

            if !complete && self.buffer.len() > MAX_LINE_LEN {
                let len = self.buffer.len();
                self.buffer.clear();
                self.discarding = true;
                warn!("Dropping oversized line: more than {} bytes", MAX_LINE_LEN);
                return Err(ProtocolError::LineTooLong {
                    len,
                    max: MAX_LINE_LEN,
                });
            }

            let line = String::from_utf8_lossy(&self.buffer)
                .trim_end_matches(['\r', '\n'])
                .to_string();
            self.buffer.clear();
            return Ok(Some(line));
        }
    }
}

/// 行写入器
pub struct LineWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> LineWriter<W> {
    /// 创建新的行写入器
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 写入一行并刷新
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// 发送命令（write_line 的便捷形式）
    pub async fn send(&mut self, command: &Command) -> Result<()> {
        self.write_line(&command.to_string()).await
    }

    /// 关闭写端
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_line_roundtrip() {
        let (client, server) = tokio::io::duplex(1024);
        let mut writer = LineWriter::new(client);
        let mut reader = LineReader::new(server);

        writer.send(&Command::IsReady).await.unwrap();
        writer.write_line("go depth 5").await.unwrap();

        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("isready"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("go depth 5"));
    }

    #[tokio::test]
    async fn test_crlf_and_eof() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = LineReader::new(server);

        client.write_all(b"readyok\r\nbestmove e2e4").await.unwrap();
        drop(client);

        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("readyok"));
        // 最后一行没有换行也能读到
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("bestmove e2e4"));
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_read_keeps_partial_line() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = LineReader::new(server);

        client.write_all(b"ready").await.unwrap();
        let first = tokio::time::timeout(Duration::from_millis(10), reader.read_line()).await;
        assert!(first.is_err());

        client.write_all(b"ok\n").await.unwrap();
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("readyok"));
    }

    #[tokio::test]
    async fn test_line_too_long() {
        let (mut client, server) = tokio::io::duplex(MAX_LINE_LEN * 2 + 16);
        let mut reader = LineReader::new(server);

        let long = "x".repeat(MAX_LINE_LEN + 1);
        let writer = tokio::spawn(async move {
            client.write_all(long.as_bytes()).await.unwrap();
            client.write_all(b"\nreadyok\n").await.unwrap();
        });

        let result = reader.read_line().await;
        assert!(matches!(result, Err(ProtocolError::LineTooLong { .. })));
        // 超长行的剩余部分被跳过
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("readyok"));
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_unterminated_line_is_bounded() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = LineReader::new(server);

        // 不带换行的数据持续写入，读取方不能无限缓存
        let writer = tokio::spawn(async move {
            let chunk = [b'x'; 1024];
            for _ in 0..(MAX_LINE_LEN / 1024) * 4 {
                if client.write_all(&chunk).await.is_err() {
                    return;
                }
            }
        });

        let result = reader.read_line().await;
        assert!(matches!(
            result,
            Err(ProtocolError::LineTooLong { len, .. }) if len == MAX_LINE_LEN + 1
        ));
        assert!(reader.buffer.capacity() <= (MAX_LINE_LEN + 1) * 2);
        assert_eq!(reader.read_line().await.unwrap(), None);
        writer.await.unwrap();
    }
}
