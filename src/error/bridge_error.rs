//! 统一错误类型

use super::code::ErrorCode;
use thiserror::Error;

/// Registry bridge 统一错误类型
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    /// KV 存储调用失败（不可达或被拒绝）
    #[error("store error [{code}] {key}: {reason}", code = .code.as_str())]
    Store {
        code: ErrorCode,
        key: String,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// 记录序列化/反序列化失败
    #[error("marshal error [{code}]: {reason}", code = .code.as_str())]
    Marshal { code: ErrorCode, reason: String },

    /// 构造期配置错误，不可重试
    #[error("configuration error: {0}")]
    Config(String),

    /// `SERVICE_*` 元数据键格式错误
    #[error("malformed attribute `{key}`: {reason}")]
    MalformedAttribute { key: String, reason: String },
}

impl BridgeError {
    /// 创建存储错误
    pub fn store(code: ErrorCode, key: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::Store {
            code,
            key: key.into(),
            reason: reason.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// 创建序列化错误
    pub fn serialization(reason: impl Into<String>) -> Self {
        BridgeError::Marshal {
            code: ErrorCode::SerializationError,
            reason: reason.into(),
        }
    }

    /// 创建反序列化错误
    pub fn deserialization(reason: impl Into<String>) -> Self {
        BridgeError::Marshal {
            code: ErrorCode::DeserializationError,
            reason: reason.into(),
        }
    }

    /// 创建配置错误
    pub fn config(msg: impl Into<String>) -> Self {
        BridgeError::Config(msg.into())
    }

    pub fn malformed_attribute(key: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::MalformedAttribute {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::Store { code, .. } => *code,
            BridgeError::Marshal { code, .. } => *code,
            BridgeError::Config(_) => ErrorCode::ConfigurationError,
            BridgeError::MalformedAttribute { .. } => ErrorCode::InvalidParameter,
        }
    }

    /// 出错的存储键（仅存储错误）
    pub fn key(&self) -> Option<&str> {
        match self {
            BridgeError::Store { key, .. } => Some(key),
            _ => None,
        }
    }

    /// 判断是否为可重试的错误
    ///
    /// 只有存储层的连接类错误可以重试；配置错误和序列化错误重试也不会成功。
    pub fn is_retryable(&self) -> bool {
        match self {
            BridgeError::Store { code, .. } => code.is_retryable(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::serialization(err.to_string())
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, BridgeError>;
