//! 内存 KV 存储

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{KvStore, normalize_key};
use crate::error::{BridgeError, ErrorCode, Result};

/// 一条存储记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub value: String,
    pub ttl: u64,
}

/// 存储操作日志条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Set { key: String, ttl: u64 },
    Delete { key: String },
}

/// 内存 KV 存储
///
/// 不执行 TTL 过期，只记录 TTL；保留操作日志，便于检查适配器写了哪些键。
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, StoredValue>>>,
    ops: Arc<RwLock<Vec<StoreOp>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟存储不可达：之后的所有调用返回可重试的连接错误
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 读取记录（含 TTL）
    pub async fn entry(&self, key: &str) -> Option<StoredValue> {
        self.entries.read().await.get(&normalize_key(key)).cloned()
    }

    /// 所有键（有序）
    pub async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// 操作日志
    pub async fn ops(&self) -> Vec<StoreOp> {
        self.ops.read().await.clone()
    }

    /// 清空操作日志（保留数据）
    pub async fn clear_ops(&self) {
        self.ops.write().await.clear();
    }

    fn check_available(&self, key: &str) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BridgeError::store(
                ErrorCode::ConnectionRefused,
                key,
                "memory store marked unavailable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.check_available("/version")
    }

    async fn set(&self, key: &str, value: &str, ttl: u64) -> Result<()> {
        self.check_available(key)?;
        let key = normalize_key(key);
        self.entries.write().await.insert(
            key.clone(),
            StoredValue {
                value: value.to_string(),
                ttl,
            },
        );
        self.ops.write().await.push(StoreOp::Set { key, ttl });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_available(key)?;
        let key = normalize_key(key);
        self.entries.write().await.remove(&key);
        self.ops.write().await.push(StoreOp::Delete { key });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available(key)?;
        Ok(self.entry(key).await.map(|entry| entry.value))
    }
}
