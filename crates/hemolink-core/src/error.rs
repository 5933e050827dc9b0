//! 错误定义模块

use thiserror::Error;

/// Hemolink网关统一错误类型
#[derive(Error, Debug)]
pub enum HemolinkError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("MLLP帧解码错误: {0}")]
    FrameDecode(String),

    #[error("HL7消息为空")]
    EmptyMessage,

    #[error("告警记录不完整: {0}")]
    MalformedAlert(String),

    #[error("数值解析错误: {0}")]
    ValueParse(String),

    #[error("网络错误: {0}")]
    Network(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("系统内部错误: {0}")]
    Internal(String),
}

/// Hemolink统一结果类型
pub type Result<T> = std::result::Result<T, HemolinkError>;
