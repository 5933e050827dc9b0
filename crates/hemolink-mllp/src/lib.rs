//! # MLLP传输模块
//!
//! HL7消息的MLLP（Minimal Lower-Layer Protocol）承载，包括：
//! - 跨read缓冲的帧编解码器
//! - 每连接一个任务的TCP监听服务
//! - 原始消息的追加式归档

pub mod archive;
pub mod codec;
pub mod server;

pub use archive::MessageArchive;
pub use codec::MllpCodec;
pub use server::{MllpServer, MllpServerConfig};
