//! Registry Bridge
//!
//! 把运行中的服务实例描述转换为后端记录写入分布式 KV 存储（etcd），
//! 供 DNS 解析器（skydns2）和反向代理（vulcand）发现和路由。

pub mod config;
pub mod error;
pub mod registry;
pub mod retry;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod utils;

// Re-exports
pub use config::{Config, DeregisterCheck};
pub use error::{BridgeError, ErrorCode, Result};
pub use registry::{
    AdapterFactory, AdapterKind, Registry, RegistryAdapter, Skydns2Adapter, VulcanAdapter,
};
pub use retry::{ExponentialBackoffPolicy, FixedRetryPolicy, RetryPolicy, retry};
pub use store::{EtcdStore, KvStore, MemoryStore};
pub use types::{DeadContainer, Service, ServiceContainer, ServiceHost, ServicePort};
pub use utils::{ServiceMeta, combine_tags, map_default};
