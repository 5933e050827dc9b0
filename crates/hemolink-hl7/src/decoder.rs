//! HL7解码器
//!
//! 纯函数式解码：原始文本 → 分层文档，无I/O。
//! 对非空输入是全函数：残缺的行不报错，仍产生段。

use hemolink_core::{HemolinkError, Result};
use tracing::debug;

use crate::delimiters::Hl7Delimiters;
use crate::document::{Field, Hl7Document, Repetition, Segment};

/// HL7解码器
#[derive(Debug, Clone, Default)]
pub struct Hl7Decoder {
    delimiters: Hl7Delimiters,
}

impl Hl7Decoder {
    /// 创建使用标准分隔符的解码器
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建使用自定义分隔符的解码器
    pub fn with_delimiters(delimiters: Hl7Delimiters) -> Self {
        Self { delimiters }
    }

    /// 解码HL7消息
    ///
    /// 分隔符以消息自身MSH头的声明为准，头不完整时回退到
    /// 解码器配置的分隔符。只有空消息返回错误；没有字段分隔符
    /// 的行仍产生一个字段列表为空的段。
    pub fn decode(&self, raw: &str) -> Result<Hl7Document> {
        if raw.trim().is_empty() {
            return Err(HemolinkError::EmptyMessage);
        }

        let delims = Hl7Delimiters::from_msh(raw).unwrap_or(self.delimiters);

        let mut segments = Vec::new();
        for line in raw.split(delims.segment) {
            // 兼容\r\n行尾
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            segments.push(decode_segment(line, &delims));
        }

        if segments.is_empty() {
            return Err(HemolinkError::EmptyMessage);
        }

        debug!("HL7消息解码完成: {} 个段", segments.len());
        Ok(Hl7Document { segments })
    }
}

/// 解码单个段：行首token为段名，其余按字段切分
fn decode_segment(line: &str, delims: &Hl7Delimiters) -> Segment {
    let mut parts = line.split(delims.field);
    let name = parts.next().unwrap_or_default().to_string();
    let fields = parts.map(|field| decode_field(field, delims)).collect();
    Segment { name, fields }
}

/// 解码单个字段：先按重复分隔符切分，每个重复再判组件
fn decode_field(field: &str, delims: &Hl7Delimiters) -> Field {
    let repetitions = field
        .split(delims.repetition)
        .map(|rep| {
            let components: Vec<&str> = rep.split(delims.component).collect();
            if components.len() > 1 {
                Repetition::Components(components.iter().map(|c| c.to_string()).collect())
            } else {
                Repetition::Value(rep.to_string())
            }
        })
        .collect();
    Field { repetitions }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_count_and_order() {
        let raw = "MSH|^~\\&|Dialysis|||202402061200||ORU^R01|123|P|2.3\n\
                   PID|||1\n\
                   OBR|1|||1234^Dialysis\n\
                   OBX|1|NM|KtV^Dialysis Adequacy||1.0||1.2-2.0||||F";
        let doc = Hl7Decoder::new().decode(raw).unwrap();

        let names: Vec<&str> = doc.segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["MSH", "PID", "OBR", "OBX"]);
    }

    #[test]
    fn test_duplicate_segments_preserved() {
        let raw = "MSH|^~\\&|Device1\nOBX|1|NM|A||1\nOBX|2|NM|B||2\nOBX|3|NM|C||3";
        let doc = Hl7Decoder::new().decode(raw).unwrap();

        assert_eq!(doc.segments.len(), 4);
        let obx_ids: Vec<&str> = doc
            .segments_named("OBX")
            .map(|s| s.field(1).unwrap().first_repetition().unwrap().primary())
            .collect();
        assert_eq!(obx_ids, ["1", "2", "3"]);
    }

    #[test]
    fn test_empty_lines_discarded() {
        let raw = "MSH|^~\\&|Device1\n\nPID|||1\n\n";
        let doc = Hl7Decoder::new().decode(raw).unwrap();
        assert_eq!(doc.segments.len(), 2);
    }

    #[test]
    fn test_scalar_field_roundtrip() {
        let doc = Hl7Decoder::new().decode("PID|||123456").unwrap();
        let pid = &doc.segments[0];

        let field = pid.field(3).unwrap();
        assert_eq!(field.repetitions.len(), 1);
        assert_eq!(
            field.first_repetition().unwrap(),
            &Repetition::Value("123456".to_string())
        );
    }

    #[test]
    fn test_repetition_with_components() {
        let doc = Hl7Decoder::new().decode("ZZZ|A^B~C").unwrap();
        let field = doc.segments[0].field(1).unwrap();

        assert_eq!(
            field.repetitions,
            vec![
                Repetition::Components(vec!["A".to_string(), "B".to_string()]),
                Repetition::Value("C".to_string()),
            ]
        );
    }

    #[test]
    fn test_line_without_separators() {
        let doc = Hl7Decoder::new().decode("GARBAGE_LINE").unwrap();
        assert_eq!(doc.segments[0].name, "GARBAGE_LINE");
        assert!(doc.segments[0].fields.is_empty());
    }

    #[test]
    fn test_empty_message_rejected() {
        assert!(matches!(
            Hl7Decoder::new().decode(""),
            Err(HemolinkError::EmptyMessage)
        ));
        assert!(matches!(
            Hl7Decoder::new().decode("\n  \n"),
            Err(HemolinkError::EmptyMessage)
        ));
    }

    #[test]
    fn test_delimiters_derived_from_header() {
        // 字段#、组件*、重复!
        let raw = "MSH#*!?$App\nPID###A*B!C";
        let doc = Hl7Decoder::new().decode(raw).unwrap();

        let pid = doc.first_segment("PID").unwrap();
        assert_eq!(
            pid.field(3).unwrap().repetitions,
            vec![
                Repetition::Components(vec!["A".to_string(), "B".to_string()]),
                Repetition::Value("C".to_string()),
            ]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = Hl7Decoder::new().decode("MSH|^~\\&|Device1\r\nPID|||1\r\n").unwrap();
        assert_eq!(doc.segments.len(), 2);
        assert_eq!(doc.segments[1].name, "PID");
    }
}
