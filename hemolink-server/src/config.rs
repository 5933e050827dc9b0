//! 网关配置
//!
//! TOML配置文件加载，字段与命令行参数一一对应，命令行优先。

use hemolink_core::{HemolinkError, Result};
use serde::{Deserialize, Serialize};

/// 网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// 监听地址
    pub bind_host: String,
    /// 监听端口
    pub port: u16,
    /// 归档目录（原始消息、告警JSON、工单文本）
    pub archive_dir: String,
    /// 处理完一帧后是否回发MLLP ACK
    pub send_ack: bool,
    /// 空闲读超时（秒），0表示不限
    pub read_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 2575,
            archive_dir: "./data/messages".to_string(),
            send_ack: false,
            read_timeout_secs: 0,
        }
    }
}

impl GatewayConfig {
    /// 从TOML文件加载
    ///
    /// 读取失败和解析失败统一按配置错误上报，便于启动期诊断。
    pub async fn load(path: &str) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| HemolinkError::Config(format!("配置文件读取失败: {path}: {e}")))?;
        toml::from_str(&text).map_err(|e| HemolinkError::Config(format!("配置文件解析失败: {e}")))
    }
}
