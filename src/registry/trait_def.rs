//! 注册适配器 Trait 定义

use crate::error::Result;
use crate::types::Service;
use async_trait::async_trait;

/// 注册适配器 Trait
///
/// 所有后端（skydns2、vulcan）实现同一组操作；编排方只依赖这个接口。
/// 适配器不做内部重试，也不设超时，重试策略由调用方通过 [`crate::retry::retry`] 提供。
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// 探测后端存活，无副作用
    async fn ping(&self) -> Result<()>;

    /// 幂等写入服务对应的全部记录，同时刷新 TTL
    async fn register(&self, service: &Service) -> Result<()>;

    /// 幂等删除实例记录；记录已不存在时视为成功
    async fn deregister(&self, service: &Service) -> Result<()>;

    /// 续期实例级记录的 TTL
    async fn refresh(&self, service: &Service) -> Result<()>;
}

/// 注册适配器（类型别名，用于动态分发）
pub type Registry = Box<dyn RegistryAdapter>;
