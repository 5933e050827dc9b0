//! # Hemolink Core
//!
//! 透析告警网关的核心模块，提供基础数据结构和错误定义。

pub mod error;
pub mod models;

pub use error::{HemolinkError, Result};
pub use models::*;
