//! 升级工单格式化
//!
//! 把告警记录渲染为L2支持流程使用的固定模板文本，
//! 含三级升级路径。纯格式化，无副作用。

use hemolink_core::models::AlertRecord;
use hemolink_core::{HemolinkError, Result};

/// 渲染升级工单
///
/// 必填字段缺失属于调用方编程错误，返回MalformedAlert，
/// 对调用是致命的，但不应终止进程。
pub fn render_ticket(alert: &AlertRecord) -> Result<String> {
    if alert.alert_id.is_empty() {
        return Err(HemolinkError::MalformedAlert("alert_id为空".to_string()));
    }
    if alert.rca.is_empty() {
        return Err(HemolinkError::MalformedAlert("rca为空".to_string()));
    }
    if alert.action.is_empty() {
        return Err(HemolinkError::MalformedAlert("action为空".to_string()));
    }

    let actions = alert
        .action
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        "\n[DIALYSIS HL7 ALERT - {id}]\n\
         Severity: {severity}\n\
         Type: {alert_type}\n\
         Timestamp: {timestamp}\n\
         \n\
         ROOT CAUSE:\n\
         {rca}\n\
         \n\
         REQUIRED ACTIONS:\n\
         {actions}\n\
         \n\
         ESCALATION PATH:\n\
         - L1: Verify device connectivity\n\
         - L2: Review HL7 config (Ref: KB-HL7-{alert_type})\n\
         - L3: Engage clinical engineering\n\
         ------------------------------\n",
        id = alert.alert_id,
        severity = alert.severity,
        alert_type = alert.alert_type,
        timestamp = alert.timestamp.to_rfc3339(),
        rca = alert.rca,
    ))
}
