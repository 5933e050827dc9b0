//! 告警规则引擎
//!
//! 按固定顺序对每条消息执行检查：协议合法性、治疗数据缺失、
//! 临床异常值。消息之间相互独立，唯一的跨消息状态是告警序号
//! 计数器。

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use hemolink_core::models::{AlertRecord, AlertSeverity, AlertType};
use hemolink_hl7::document::{Hl7Document, Repetition, Segment};
use tracing::{debug, warn};

/// 合规HL7消息的固定前缀：MSH段名 + 字段分隔符 + 编码字符域
const HL7_HEADER_PREFIX: &str = "MSH|^~\\&";

/// Kt/V透析充分性临床下限
const KTV_THRESHOLD: f64 = 1.2;

/// 告警规则引擎
///
/// 跨连接共享同一个实例（Arc），告警序号用原子计数保证
/// 并发下不重不漏。
#[derive(Debug, Default)]
pub struct AlertEngine {
    alert_count: AtomicU64,
}

impl AlertEngine {
    /// 创建新的规则引擎，序号从1开始
    pub fn new() -> Self {
        Self::default()
    }

    /// 评估一条消息，返回触发的告警（按规则顺序）
    ///
    /// 规则1命中时跳过规则2；规则3独立于前两条。
    pub fn evaluate(&self, raw: &str, document: &Hl7Document) -> Vec<AlertRecord> {
        let mut alerts = Vec::new();

        if !raw.starts_with(HL7_HEADER_PREFIX) {
            // 规则1：MSH头缺失或损坏
            alerts.push(self.build_alert(
                AlertType::Hl7ProtocolError,
                AlertSeverity::Critical,
                "Missing or corrupt MSH segment - message not HL7-compliant".to_string(),
                vec![
                    "Check dialysis machine HL7 settings".to_string(),
                    "Verify physical connection".to_string(),
                ],
            ));
        } else if raw.contains("ORU^R01") && !document.has_segment("OBX") {
            // 规则2：ORU结果消息缺少治疗数据
            alerts.push(self.build_alert(
                AlertType::DataMissing,
                AlertSeverity::High,
                "No treatment data (OBX segments) found in ORU message".to_string(),
                vec![
                    "Restart data export module".to_string(),
                    "Check patient monitor connections".to_string(),
                ],
            ));
        }

        // 规则3：临床异常值
        if let Some(alert) = self.check_abnormal_values(document) {
            alerts.push(alert);
        }

        debug!("规则评估完成: {} 条告警", alerts.len());
        alerts
    }

    /// 检查透析充分性指标（Kt/V）
    ///
    /// 按OBX-3观察项标识定位Kt/V段，取OBX-5观察值解析为数值。
    /// 解析失败按尽力而为处理：记warning，不产生告警也不报错。
    fn check_abnormal_values(&self, document: &Hl7Document) -> Option<AlertRecord> {
        let obx = document.segments_named("OBX").find(|s| is_ktv_observation(s))?;

        let value_text = obx.field(5)?.first_repetition()?.primary();
        let ktv: f64 = match value_text.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!("Kt/V观察值无法解析: {:?}", value_text);
                return None;
            }
        };

        if ktv < KTV_THRESHOLD {
            return Some(self.build_alert(
                AlertType::LowKtv,
                AlertSeverity::High,
                format!("Insufficient dialysis dose (Kt/V={ktv:.2} < {KTV_THRESHOLD})"),
                vec![
                    "Review treatment parameters".to_string(),
                    "Check vascular access".to_string(),
                ],
            ));
        }

        None
    }

    /// 构造统一格式的告警记录并递增序号
    fn build_alert(
        &self,
        alert_type: AlertType,
        severity: AlertSeverity,
        rca: String,
        action: Vec<String>,
    ) -> AlertRecord {
        let seq = self.alert_count.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();

        AlertRecord {
            alert_id: format!("ALERT-{}-{}", now.format("%Y%m%d"), seq),
            alert_type,
            severity,
            timestamp: now,
            rca,
            action,
        }
    }
}

/// OBX段的观察项标识（OBX-3）是否为Kt/V透析充分性
fn is_ktv_observation(segment: &Segment) -> bool {
    let Some(rep) = segment.field(3).and_then(|f| f.first_repetition()) else {
        return false;
    };
    match rep {
        Repetition::Components(parts) => {
            parts.first().map(String::as_str) == Some("KtV")
                && parts.get(1).map(String::as_str) == Some("Dialysis Adequacy")
        }
        Repetition::Value(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemolink_hl7::Hl7Decoder;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn evaluate(engine: &AlertEngine, raw: &str) -> Vec<AlertRecord> {
        let doc = Hl7Decoder::new().decode(raw).unwrap();
        engine.evaluate(raw, &doc)
    }

    const VALID_ORU_WITH_OBX: &str = "MSH|^~\\&|Dialysis|||202402061200||ORU^R01|123|P|2.3\n\
                                      PID|||1\n\
                                      OBR|1|||1234^Dialysis\n\
                                      OBX|1|NM|BP^Blood Pressure||145|mmHg";

    #[test]
    fn test_valid_message_no_protocol_alert() {
        let engine = AlertEngine::new();
        let alerts = evaluate(&engine, VALID_ORU_WITH_OBX);
        assert!(alerts.iter().all(|a| a.alert_type != AlertType::Hl7ProtocolError));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_bad_header_fires_protocol_error_only() {
        let engine = AlertEngine::new();
        let alerts = evaluate(&engine, "BAD_HEADER|...");

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Hl7ProtocolError);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].action.len(), 2);
    }

    #[test]
    fn test_protocol_error_suppresses_data_missing() {
        // ORU^R01出现且没有OBX，但头已经损坏：只报协议错误
        let engine = AlertEngine::new();
        let raw = "XXX|^~\\&|Dialysis|||202402061200||ORU^R01|123|P|2.3\nPID|||1";
        let alerts = evaluate(&engine, raw);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Hl7ProtocolError);
    }

    #[test]
    fn test_oru_without_obx_fires_data_missing() {
        let engine = AlertEngine::new();
        let raw = "MSH|^~\\&|Dialysis|||202402061200||ORU^R01|123|P|2.3\nPID|||1";
        let alerts = evaluate(&engine, raw);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::DataMissing);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
    }

    #[test]
    fn test_low_ktv_fires_with_two_decimal_value() {
        let engine = AlertEngine::new();
        let raw = "MSH|^~\\&|Dialysis|||202402061200||ORU^R01|123|P|2.3\n\
                   PID|||1\n\
                   OBR|1|||1234^Dialysis\n\
                   OBX|1|NM|KtV^Dialysis Adequacy||1.05||1.2-2.0||||F";
        let alerts = evaluate(&engine, raw);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::LowKtv);
        assert!(alerts[0].rca.contains("1.05"));
    }

    #[test]
    fn test_adequate_ktv_no_alert() {
        let engine = AlertEngine::new();
        let raw = "MSH|^~\\&|Dialysis|||202402061200||ORU^R01|123|P|2.3\n\
                   OBX|1|NM|KtV^Dialysis Adequacy||1.50||1.2-2.0||||F";
        assert!(evaluate(&engine, raw).is_empty());
    }

    #[test]
    fn test_unparseable_ktv_silently_skipped() {
        let engine = AlertEngine::new();
        let raw = "MSH|^~\\&|Dialysis|||202402061200||ORU^R01|123|P|2.3\n\
                   OBX|1|NM|KtV^Dialysis Adequacy||not-a-number||1.2-2.0||||F";
        assert!(evaluate(&engine, raw).is_empty());
    }

    #[test]
    fn test_protocol_error_and_low_ktv_both_fire() {
        let engine = AlertEngine::new();
        let raw = "BAD|x\nOBX|1|NM|KtV^Dialysis Adequacy||0.90||1.2-2.0||||F";
        let alerts = evaluate(&engine, raw);

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].alert_type, AlertType::Hl7ProtocolError);
        assert_eq!(alerts[1].alert_type, AlertType::LowKtv);
        assert!(alerts[1].rca.contains("0.90"));
    }

    #[test]
    fn test_alert_ids_unique_and_gapless_under_concurrency() {
        let engine = Arc::new(AlertEngine::new());
        let raw = "BAD_HEADER|...";
        let doc = Hl7Decoder::new().decode(raw).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            let doc = doc.clone();
            handles.push(std::thread::spawn(move || {
                let mut ids = Vec::new();
                for _ in 0..50 {
                    for alert in engine.evaluate(raw, &doc) {
                        ids.push(alert.alert_id);
                    }
                }
                ids
            }));
        }

        let mut ordinals = BTreeSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                let n: u64 = id.rsplit('-').next().unwrap().parse().unwrap();
                assert!(ordinals.insert(n), "序号重复: {id}");
            }
        }

        assert_eq!(ordinals.len(), 400);
        assert_eq!(*ordinals.first().unwrap(), 1);
        assert_eq!(*ordinals.last().unwrap(), 400);
    }
}
