//! skydns2 DNS 区域适配器
//!
//! 域名按标签反转后映射到 `/skydns/...` 路径，例如 `a.b.example` → `/skydns/example/b/a`。

use async_trait::async_trait;
use serde::Serialize;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

use super::trait_def::RegistryAdapter;
use crate::error::{BridgeError, Result};
use crate::store::{EtcdStore, KvStore};
use crate::types::Service;

/// skydns 在 etcd 中的根路径
pub const SKYDNS_ROOT: &str = "/skydns";

/// skydns2 记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    pub host: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub port: u16,
}

fn is_zero(port: &u16) -> bool {
    *port == 0
}

/// skydns2 适配器
pub struct Skydns2Adapter {
    store: Arc<dyn KvStore>,
    domain: String,
}

impl Skydns2Adapter {
    /// 从 URI 创建：`skydns2://<host>/<domain>`，domain 必填
    pub fn from_uri(uri: &Url) -> Result<Self> {
        let path = uri.path();
        if path.len() < 2 {
            return Err(BridgeError::config(
                "skydns2: dns domain required e.g.: skydns2://<host>/<domain>",
            ));
        }

        let store = EtcdStore::new(super::endpoints_from_uri(uri));
        Ok(Self::new(Arc::new(store), &path[1..]))
    }

    pub fn new(store: Arc<dyn KvStore>, domain: impl Into<String>) -> Self {
        Self {
            store,
            domain: domain.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// `{container}.{host}.{service}.{zone}`
    pub fn container_domain(&self, service: &Service) -> String {
        domain_join(&[
            &service.container.hostname,
            &service.host.hostname,
            &service.name,
            &self.domain,
        ])
    }

    /// `{container}.{host}._{port}._{proto}.{service}.{zone}`
    pub fn service_domain(&self, service: &Service) -> String {
        domain_join(&[
            &service.container.hostname,
            &service.host.hostname,
            &format!("_{}", service.origin.exposed_port),
            &format!("_{}", service.origin.port_type),
            &service.name,
            &self.domain,
        ])
    }

    async fn set_record(&self, path: &str, record: &DnsRecord, ttl: u64) -> Result<()> {
        let value = serde_json::to_string(record).map_err(|e| {
            error!("skydns2: {}: failed to marshal record: {}", path, e);
            BridgeError::from(e)
        })?;

        if let Err(e) = self.store.set(path, &value, ttl).await {
            error!("skydns2: {}: failed to register: {}", path, e);
            return Err(e);
        }
        debug!("skydns2: {}: {}", path, value);
        Ok(())
    }
}

#[async_trait]
impl RegistryAdapter for Skydns2Adapter {
    async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }

    async fn register(&self, service: &Service) -> Result<()> {
        let container_domain = self.container_domain(service);

        if service.is_host_level() {
            let record = DnsRecord {
                host: service.ip.clone(),
                port: 0,
            };
            self.set_record(&domain_path(&container_domain), &record, service.ttl)
                .await?;

            match reverse_domain(&service.ip) {
                Some(reverse) => {
                    let record = DnsRecord {
                        host: container_domain.clone(),
                        port: 0,
                    };
                    self.set_record(&domain_path(&reverse), &record, service.ttl)
                        .await?;
                }
                None => debug!("skydns2: no reverse record for {}", service.ip),
            }
        } else {
            let record = DnsRecord {
                host: container_domain.clone(),
                port: service.port,
            };
            self.set_record(&domain_path(&self.service_domain(service)), &record, service.ttl)
                .await?;
        }

        info!("skydns2: registered {} as {}", service.id, container_domain);
        Ok(())
    }

    async fn deregister(&self, service: &Service) -> Result<()> {
        // 主机级记录（容器记录和反向记录）不在这里删除，依赖 TTL 过期
        if service.is_host_level() {
            debug!("skydns2: {} is host-level, leaving records to expire", service.id);
            return Ok(());
        }

        let path = domain_path(&self.service_domain(service));
        if let Err(e) = self.store.delete(&path).await {
            error!("skydns2: {}: failed to deregister: {}", path, e);
            return Err(e);
        }
        info!("skydns2: deregistered {}", service.id);
        Ok(())
    }

    async fn refresh(&self, service: &Service) -> Result<()> {
        self.register(service).await
    }
}

/// 用 `.` 连接域名标签
pub fn domain_join(components: &[&str]) -> String {
    components.join(".")
}

/// 域名 → skydns 存储路径
///
/// ```
/// use registry_bridge::registry::skydns2::domain_path;
///
/// assert_eq!(domain_path("a.b.com"), "/skydns/com/b/a");
/// ```
pub fn domain_path(domain: &str) -> String {
    let mut labels: Vec<&str> = domain.split('.').collect();
    labels.reverse();
    format!("{}/{}", SKYDNS_ROOT, labels.join("/"))
}

/// skydns 存储路径 → 域名（`domain_path` 的逆变换）
pub fn path_domain(path: &str) -> Option<String> {
    let rest = path.strip_prefix(SKYDNS_ROOT)?.strip_prefix('/')?;
    let mut labels: Vec<&str> = rest.split('/').collect();
    labels.reverse();
    Some(labels.join("."))
}

/// IPv4 地址的反向解析域名：`a.b.c.d` → `d.c.b.a.in-addr.arpa`
///
/// IPv6 和无法解析的地址返回 `None`。
pub fn reverse_domain(ip: &str) -> Option<String> {
    let addr: Ipv4Addr = ip.parse().ok()?;
    let [a, b, c, d] = addr.octets();
    Some(format!("{}.{}.{}.{}.in-addr.arpa", d, c, b, a))
}
