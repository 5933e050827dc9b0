//! # HL7解码模块
//!
//! 提供HL7 v2.x消息的结构化解码，包括：
//! - 分隔符配置（标准值或从MSH头派生）
//! - 段/字段/重复/组件四级文档模型
//! - 纯函数式解码器，除空消息外不失败
//! - ACK应答消息生成

pub mod ack;
pub mod decoder;
pub mod delimiters;
pub mod document;

pub use decoder::Hl7Decoder;
pub use delimiters::Hl7Delimiters;
pub use document::{Field, Hl7Document, Repetition, Segment};
