//! HL7 ACK应答生成
//!
//! 原始网关处理完帧后不回发应答；互操作场景下对端通常期待
//! MLLP封装的提交/拒绝应答，因此应答生成作为可选能力提供，
//! 由监听配置决定是否启用。

use chrono::Utc;
use uuid::Uuid;

/// 生成HL7 ACK消息文本（不含MLLP帧标记）
///
/// `original_control_id`为被应答消息的MSH-10；接受回AA，拒绝回AE。
pub fn build_ack(original_control_id: &str, accepted: bool, error_message: Option<&str>) -> String {
    let now = Utc::now().format("%Y%m%d%H%M%S");
    let ack_code = if accepted { "AA" } else { "AE" };
    // MSA-3里的字段分隔符需转义
    let error_text = error_message.unwrap_or("").replace('|', "\\F\\");
    let control_id: String = Uuid::new_v4().simple().to_string().chars().take(20).collect();

    format!(
        "MSH|^~\\&|HEMOLINK|GATEWAY|DEVICE|WARD|{now}||ACK|{control_id}|P|2.3\n\
         MSA|{ack_code}|{original_control_id}|{error_text}"
    )
}
