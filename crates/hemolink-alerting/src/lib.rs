//! # 告警模块
//!
//! 针对透析机HL7消息的告警能力，包括：
//! - 固定顺序的规则引擎，产生结构化告警记录
//! - 升级工单格式化（L1/L2/L3升级路径）
//! - 告警输出通道trait及文件/日志实现

pub mod engine;
pub mod sink;
pub mod ticket;

pub use engine::AlertEngine;
pub use sink::{AlertSink, FileAlertSink, LogAlertSink};
pub use ticket::render_ticket;
