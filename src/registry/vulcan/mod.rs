//! vulcand 反向代理适配器
//!
//! 三层路由模型：Backend 与 Frontend 被多个实例共享、不设 TTL；
//! Server 对应单个实例，随服务 TTL 过期。

pub mod api;
pub mod attrs;

pub use api::{Backend, BackendServer, Frontend};
pub use attrs::RouteAttrs;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

use super::trait_def::RegistryAdapter;
use crate::error::{BridgeError, Result};
use crate::store::{EtcdStore, KvStore};
use crate::types::Service;

/// 默认存储前缀
pub const DEFAULT_PREFIX: &str = "vulcand";

/// vulcan 适配器
pub struct VulcanAdapter {
    store: Arc<dyn KvStore>,
    prefix: String,
}

impl VulcanAdapter {
    /// 从 URI 创建：`vulcan://<host>[/<prefix>]`
    pub fn from_uri(uri: &Url) -> Result<Self> {
        let path = uri.path();
        let prefix = if path.len() >= 2 { path } else { DEFAULT_PREFIX };

        let store = EtcdStore::new(super::endpoints_from_uri(uri));
        Ok(Self::new(Arc::new(store), prefix))
    }

    pub fn new(store: Arc<dyn KvStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_path(&self, path: &str) -> String {
        format!("{}/{}", self.prefix.trim_end_matches('/'), path)
    }

    async fn set_json<T: Serialize + Sync>(&self, path: &str, item: &T, ttl: u64) -> Result<()> {
        let value = serde_json::to_string(item).map_err(|e| {
            error!("vulcan: {}: failed to marshal: {}", path, e);
            BridgeError::from(e)
        })?;

        if let Err(e) = self.store.set(&self.full_path(path), &value, ttl).await {
            error!("vulcan: {}: failed to register: {}", path, e);
            return Err(e);
        }
        info!("vulcan: {}: {}", path, value);
        Ok(())
    }

    async fn del(&self, path: &str) -> Result<()> {
        if let Err(e) = self.store.delete(&self.full_path(path)).await {
            error!("vulcan: {}: failed to unregister: {}", path, e);
            return Err(e);
        }
        info!("vulcan: {}: removed", path);
        Ok(())
    }

    async fn set_server(&self, attrs: &RouteAttrs, ttl: u64) -> Result<()> {
        if let Some((path, server)) = attrs.server() {
            self.set_json(&path, &server, ttl).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RegistryAdapter for VulcanAdapter {
    async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }

    async fn register(&self, service: &Service) -> Result<()> {
        let attrs = RouteAttrs::from_service(service);

        if let Some((path, backend)) = attrs.backend() {
            // 多实例共享，不设 TTL
            self.set_json(&path, &backend, 0).await?;
        }

        self.set_server(&attrs, service.ttl).await?;

        if let Some((path, frontend)) = attrs.frontend() {
            // 多实例共享，不设 TTL
            self.set_json(&path, &frontend, 0).await?;
        }

        Ok(())
    }

    async fn deregister(&self, service: &Service) -> Result<()> {
        let attrs = RouteAttrs::from_service(service);

        // Backend/Frontend 可能仍被其他实例使用，只删除本实例的 Server
        match attrs.server() {
            Some((path, _)) => self.del(&path).await,
            None => {
                debug!("vulcan: {} has no server object", service.id);
                Ok(())
            }
        }
    }

    async fn refresh(&self, service: &Service) -> Result<()> {
        let attrs = RouteAttrs::from_service(service);
        self.set_server(&attrs, service.ttl).await
    }
}
