//! 原始消息归档
//!
//! 成功解帧的HL7原文逐条追加到归档文件，条目之间以空行分隔。
//! 归档文件是跨连接共享的追加式资源。

use std::path::{Path, PathBuf};

use hemolink_core::Result;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// 归档文件名
const ARCHIVE_FILE: &str = "received_messages.hl7";

/// 追加式消息归档
pub struct MessageArchive {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MessageArchive {
    /// 创建归档，确保目录存在
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            path: dir.join(ARCHIVE_FILE),
            write_lock: Mutex::new(()),
        })
    }

    /// 追加一条原始消息
    ///
    /// 句柄在本次写入范围内获取，落盘后随作用域关闭；
    /// 写锁保证并发连接的条目不交错。
    pub async fn append_raw(&self, raw: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(raw.as_bytes()).await?;
        file.write_all(b"\n\n").await?;
        file.flush().await?;

        debug!("已归档原始消息: {} 字节", raw.len());
        Ok(())
    }

    /// 归档文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}
