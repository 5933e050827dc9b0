//! HL7文档层级模型
//!
//! 文档 → 段 → 字段 → 重复 → 组件。段名不要求唯一，
//! 重复出现的段（如多个OBX）按到达顺序全部保留。

use serde::{Deserialize, Serialize};

/// 字段重复：标量值或组件列表
///
/// 两种形态是带标签的变体，调用方必须模式匹配，
/// 不存在"既是标量又是列表"的中间状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repetition {
    /// 无组件分隔符，整段文本作为标量
    Value(String),
    /// 按组件分隔符切出的有序组件列表（至少2个）
    Components(Vec<String>),
}

impl Repetition {
    /// 首个组件；标量视为单组件
    pub fn primary(&self) -> &str {
        match self {
            Repetition::Value(v) => v,
            Repetition::Components(parts) => parts.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// 字段：有序的重复列表
///
/// 不含重复分隔符的字段恰好有一个重复。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub repetitions: Vec<Repetition>,
}

impl Field {
    /// 第一个重复
    pub fn first_repetition(&self) -> Option<&Repetition> {
        self.repetitions.first()
    }
}

/// 段：段名（行首token，习惯上3字符）加有序字段列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Segment {
    /// 按HL7习惯的1基序号取字段（段名之后第一个字段为1）
    pub fn field(&self, index: usize) -> Option<&Field> {
        if index == 0 {
            return None;
        }
        self.fields.get(index - 1)
    }
}

/// 解码后的HL7文档
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hl7Document {
    pub segments: Vec<Segment>,
}

impl Hl7Document {
    /// 按段名遍历，保留到达顺序和重复
    pub fn segments_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments.iter().filter(move |s| s.name == name)
    }

    /// 是否存在指定段名
    pub fn has_segment(&self, name: &str) -> bool {
        self.segments.iter().any(|s| s.name == name)
    }

    /// 第一个指定段名的段
    pub fn first_segment(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name == name)
    }

    /// 消息控制ID（MSH-10）
    ///
    /// MSH段中字段分隔符本身计为MSH-1，因此MSH-10落在
    /// 段名之后的第9个解码字段上。
    pub fn control_id(&self) -> Option<&str> {
        let msh = self.first_segment("MSH")?;
        let rep = msh.field(9)?.first_repetition()?;
        let id = rep.primary();
        (!id.is_empty()).then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Hl7Decoder;

    const ORU_SAMPLE: &str = "MSH|^~\\&|Device1|Ward1|EMR|Main|202508031010||ORU^R01|MSG00001|P|2.3\n\
                              PID|||123456||DOE^JOHN\n\
                              OBR|1|||DIA001^DIALYSIS^L\n\
                              OBX|1|NM|BP^Blood Pressure||145|mmHg";

    #[test]
    fn test_control_id_extraction() {
        let doc = Hl7Decoder::new().decode(ORU_SAMPLE).unwrap();
        assert_eq!(doc.control_id(), Some("MSG00001"));
    }

    #[test]
    fn test_control_id_absent() {
        let doc = Hl7Decoder::new().decode("PID|||123456").unwrap();
        assert_eq!(doc.control_id(), None);
    }

    #[test]
    fn test_segment_lookup() {
        let doc = Hl7Decoder::new().decode(ORU_SAMPLE).unwrap();
        assert!(doc.has_segment("OBX"));
        assert!(!doc.has_segment("ORC"));
        assert_eq!(doc.segments_named("OBX").count(), 1);
        assert_eq!(doc.first_segment("PID").unwrap().name, "PID");
    }

    #[test]
    fn test_one_based_field_index() {
        let doc = Hl7Decoder::new().decode(ORU_SAMPLE).unwrap();
        let obx = doc.first_segment("OBX").unwrap();
        assert_eq!(obx.field(2).unwrap().first_repetition().unwrap().primary(), "NM");
        assert_eq!(obx.field(5).unwrap().first_repetition().unwrap().primary(), "145");
        assert!(obx.field(0).is_none());
    }
}
