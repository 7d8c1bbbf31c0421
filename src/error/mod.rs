//! 错误处理模块
//!
//! 区分三类错误：存储不可达/拒绝（可重试）、序列化失败、配置错误（构造期致命）

pub mod bridge_error;
pub mod code;

pub use bridge_error::{BridgeError, Result};
pub use code::ErrorCode;
