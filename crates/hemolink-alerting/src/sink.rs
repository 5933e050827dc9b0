//! 告警输出通道
//!
//! 告警记录以JSON行对外输出，这是与外部监控/工单系统的
//! 输出契约；渲染后的工单文本同时落盘或进日志。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hemolink_core::models::AlertRecord;
use hemolink_core::Result;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

/// 告警接收端特征
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// 发布一条告警及其渲染后的工单
    async fn publish(&self, record: &AlertRecord, ticket: &str) -> Result<()>;
}

/// 文件告警接收端
///
/// 告警记录逐行写入alerts.jsonl，工单文本追加到tickets.log。
/// 两个文件共用一把写锁，并发连接的写入不会交错。
pub struct FileAlertSink {
    alerts_path: PathBuf,
    tickets_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileAlertSink {
    /// 在指定目录下创建输出通道（目录须已存在或随归档创建）
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            alerts_path: dir.join("alerts.jsonl"),
            tickets_path: dir.join("tickets.log"),
            write_lock: Mutex::new(()),
        }
    }

    /// 单次追加写：句柄在作用域内获取，落盘后随作用域关闭
    async fn append(path: &Path, data: &[u8]) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl AlertSink for FileAlertSink {
    async fn publish(&self, record: &AlertRecord, ticket: &str) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        Self::append(&self.alerts_path, line.as_bytes()).await?;
        Self::append(&self.tickets_path, ticket.as_bytes()).await?;

        info!("告警已发布: {} ({})", record.alert_id, record.alert_type);
        Ok(())
    }
}

/// 日志告警接收端：只通过tracing输出，不落盘
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn publish(&self, record: &AlertRecord, ticket: &str) -> Result<()> {
        info!(
            alert_id = %record.alert_id,
            severity = %record.severity,
            alert_type = %record.alert_type,
            "告警触发"
        );
        info!("{ticket}");
        Ok(())
    }
}
