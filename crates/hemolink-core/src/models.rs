//! 核心数据模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 告警类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AlertType {
    /// MSH头缺失或损坏，消息不符合HL7规范
    #[serde(rename = "HL7_PROTOCOL_ERROR")]
    Hl7ProtocolError,
    /// ORU结果消息中没有治疗数据（OBX段）
    #[serde(rename = "DATA_MISSING")]
    DataMissing,
    /// 透析剂量不足（Kt/V低于临床下限）
    #[serde(rename = "LOW_KTV")]
    LowKtv,
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AlertType::Hl7ProtocolError => "HL7_PROTOCOL_ERROR",
            AlertType::DataMissing => "DATA_MISSING",
            AlertType::LowKtv => "LOW_KTV",
        };
        write!(f, "{name}")
    }
}

/// 告警严重级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AlertSeverity {
    #[serde(rename = "CRITICAL")]
    Critical,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AlertSeverity::Critical => "CRITICAL",
            AlertSeverity::High => "HIGH",
            AlertSeverity::Medium => "MEDIUM",
            AlertSeverity::Low => "LOW",
        };
        write!(f, "{name}")
    }
}

/// 告警记录
///
/// 由规则引擎创建后不再修改，可独立渲染为JSON对外输出。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    /// 告警标识，格式 ALERT-YYYYMMDD-n，n为进程内单调递增序号
    pub alert_id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    /// 检出时间，不是消息内嵌的时间戳
    pub timestamp: DateTime<Utc>,
    /// 根因描述
    pub rca: String,
    /// 建议处置步骤（有序）
    pub action: Vec<String>,
}
