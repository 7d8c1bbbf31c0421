//! 分布式 KV 存储抽象
//!
//! 适配器只依赖 `KvStore`：etcd v2 HTTP 实现用于生产，内存实现用于测试和演练。

pub mod etcd;
pub mod memory;

pub use etcd::EtcdStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;

/// 分层 KV 存储
///
/// 注意：由于需要动态分发（dyn），使用 async-trait
#[async_trait]
pub trait KvStore: Send + Sync {
    /// 存活探测（etcd: `GET /version`），无副作用
    async fn ping(&self) -> Result<()>;

    /// 写入 JSON 值；`ttl == 0` 表示永不过期
    async fn set(&self, key: &str, value: &str, ttl: u64) -> Result<()>;

    /// 非递归删除；键不存在视为成功
    async fn delete(&self, key: &str) -> Result<()>;

    /// 读取值，不存在时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// 规范化存储键：以 `/` 开头，折叠重复和结尾的 `/`
///
/// ```
/// use registry_bridge::store::normalize_key;
///
/// assert_eq!(normalize_key("vulcand/backends/web/backend"), "/vulcand/backends/web/backend");
/// assert_eq!(normalize_key("//skydns//local/"), "/skydns/local");
/// ```
pub fn normalize_key(key: &str) -> String {
    let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}
