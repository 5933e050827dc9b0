//! HL7分隔符配置
//!
//! 四个结构分隔符（段终止符、字段、重复、组件）加转义字符。
//! 标准值为 `\n` `|` `~` `^` `\`，也可以从消息自身的MSH头派生。

/// HL7结构分隔符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hl7Delimiters {
    /// 段终止符
    pub segment: char,
    /// 字段分隔符
    pub field: char,
    /// 重复分隔符
    pub repetition: char,
    /// 组件分隔符
    pub component: char,
    /// 转义字符（不做转义解码，原样透传）
    pub escape: char,
}

impl Default for Hl7Delimiters {
    fn default() -> Self {
        Self {
            segment: '\n',
            field: '|',
            repetition: '~',
            component: '^',
            escape: '\\',
        }
    }
}

impl Hl7Delimiters {
    /// 从消息的MSH头派生分隔符
    ///
    /// MSH段第4个字符是字段分隔符，随后的编码字符域依次为
    /// 组件、重复、转义（第4个编码字符是子组件分隔符，不参与
    /// 结构解析）。消息头不完整时返回None。
    pub fn from_msh(raw: &str) -> Option<Self> {
        if !raw.starts_with("MSH") {
            return None;
        }
        let header: Vec<char> = raw.chars().take(7).collect();
        if header.len() < 7 {
            return None;
        }

        Some(Self {
            segment: '\n',
            field: header[3],
            component: header[4],
            repetition: header[5],
            escape: header[6],
        })
    }
}
