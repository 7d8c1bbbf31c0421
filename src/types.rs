//! 服务实例模型
//!
//! `Service` 是注册时刻的不可变快照，适配器只读取、不修改。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::Config;
use crate::error::Result;
use crate::utils::{ServiceMeta, combine_tags, map_default};

/// 一个可注册的服务实例
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// 实例 ID（唯一，非空）
    pub id: String,
    pub name: String,
    /// 0 表示主机级服务（仅 IP），非 0 表示某个具体的暴露端口
    pub port: u16,
    pub ip: String,
    pub tags: Vec<String>,
    pub attrs: HashMap<String, String>,
    /// 记录过期时间（秒），0 表示不过期
    pub ttl: u64,

    pub host: ServiceHost,
    pub container: ServiceContainer,
    pub origin: ServicePort,
}

/// 运行服务的主机
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHost {
    pub hostname: String,
    pub ip: String,
}

/// 服务所在的容器
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceContainer {
    pub hostname: String,
    pub id: String,
    pub image_name: String,
    pub internal_ip: String,
    /// 原始 `KEY=value` 元数据行（环境变量 + 合成的 label 行）
    pub meta: Vec<String>,
}

/// 暴露端口的绑定信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    pub host_port: String,
    pub host_ip: String,
    pub exposed_port: String,
    /// 协议（tcp / udp）
    pub port_type: String,
}

/// 已退出容器及其服务，等待宽限期结束后注销
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeadContainer {
    pub ttl: u64,
    pub services: Vec<Service>,
}

impl DeadContainer {
    pub fn new(ttl: u64, services: Vec<Service>) -> Self {
        Self { ttl, services }
    }

    /// 宽限期倒计时；返回 `true` 表示宽限期已过，应注销其服务
    pub fn tick(&mut self, elapsed_secs: u64) -> bool {
        self.ttl = self.ttl.saturating_sub(elapsed_secs);
        self.ttl == 0
    }
}

impl Service {
    /// 是否为主机级服务（`port == 0`）
    pub fn is_host_level(&self) -> bool {
        self.port == 0
    }

    /// 从容器端口绑定构建服务快照
    ///
    /// 返回 `Ok(None)` 表示该端口不应注册：未发布且非内部网络模式，或设置了 `SERVICE_IGNORE`。
    pub fn from_binding(
        config: &Config,
        host: &ServiceHost,
        container: &ServiceContainer,
        port: &ServicePort,
        multi_port: bool,
    ) -> Result<Option<Self>> {
        if port.host_port.is_empty() && !config.internal {
            return Ok(None);
        }

        let mut meta = ServiceMeta::parse(&container.meta, &port.exposed_port)?.into_inner();
        if meta.contains_key("ignore") {
            return Ok(None);
        }

        let default_name = if multi_port {
            format!("{}-{}", container.image_name, port.exposed_port)
        } else {
            container.image_name.clone()
        };
        let name = map_default(&meta, "name", &default_name);

        let mut id = format!("{}:{}:{}", host.hostname, container.hostname, port.exposed_port);
        if port.port_type == "udp" {
            id.push_str(":udp");
        }
        let id = map_default(&meta, "id", &id);

        let (ip, service_port) = if config.internal {
            (container.internal_ip.clone(), port.exposed_port.as_str())
        } else {
            let ip = match config.host_ip.as_deref() {
                Some(ip) if !ip.is_empty() => ip.to_string(),
                _ if !port.host_ip.is_empty() && port.host_ip != "0.0.0.0" => port.host_ip.clone(),
                _ => host.ip.clone(),
            };
            (ip, port.host_port.as_str())
        };
        let service_port = service_port.parse::<u16>().map_err(|e| {
            crate::error::BridgeError::malformed_attribute(
                service_port.to_string(),
                format!("invalid port: {}", e),
            )
        })?;

        let tags = combine_tags(&[
            meta.get("tags").map(String::as_str).unwrap_or_default(),
            config.force_tags.as_str(),
        ]);

        for key in ["name", "tags", "id", "ignore"] {
            meta.remove(key);
        }

        Ok(Some(Service {
            id,
            name,
            port: service_port,
            ip,
            tags,
            attrs: meta,
            ttl: config.service_ttl(),
            host: host.clone(),
            container: container.clone(),
            origin: port.clone(),
        }))
    }
}

impl Service {
    /// 构建主机级（`port == 0`）容器服务快照
    ///
    /// 仅在 `register_container` 开启时注册；IP 取容器内部 IP。
    pub fn from_container(
        config: &Config,
        host: &ServiceHost,
        container: &ServiceContainer,
    ) -> Result<Option<Self>> {
        if !config.register_container {
            return Ok(None);
        }

        let mut meta = ServiceMeta::parse(&container.meta, "")?.into_inner();
        if meta.contains_key("ignore") {
            return Ok(None);
        }

        let name = map_default(&meta, "name", &container.image_name);
        let id = map_default(&meta, "id", &format!("{}:{}", host.hostname, container.hostname));
        let tags = combine_tags(&[
            meta.get("tags").map(String::as_str).unwrap_or_default(),
            config.force_tags.as_str(),
        ]);

        for key in ["name", "tags", "id", "ignore"] {
            meta.remove(key);
        }

        Ok(Some(Service {
            id,
            name,
            port: 0,
            ip: container.internal_ip.clone(),
            tags,
            attrs: meta,
            ttl: config.service_ttl(),
            host: host.clone(),
            container: container.clone(),
            origin: ServicePort::default(),
        }))
    }
}

impl ServiceContainer {
    /// 由运行时提供的原始字段构建容器描述
    ///
    /// label 以 `key=value` 形式追加到元数据行之后；镜像名取路径最后一段并去掉 tag。
    pub fn new(
        hostname: impl Into<String>,
        id: impl Into<String>,
        image: &str,
        internal_ip: impl Into<String>,
        env: Vec<String>,
        labels: &[(String, String)],
    ) -> Self {
        let mut meta = env;
        meta.extend(labels.iter().map(|(k, v)| format!("{}={}", k, v)));

        let base = image.rsplit('/').next().unwrap_or(image);
        let image_name = base.split(':').next().unwrap_or(base).to_string();

        Self {
            hostname: hostname.into(),
            id: id.into(),
            image_name,
            internal_ip: internal_ip.into(),
            meta,
        }
    }
}

impl ServicePort {
    /// 解析 `80/tcp` 形式的端口声明，取第一个发布绑定的主机 IP 和端口
    pub fn parse(spec: &str, published: &[(String, String)]) -> Self {
        let (exposed, proto) = match spec.split_once('/') {
            Some((port, proto)) => (port, proto),
            None => (spec, "tcp"),
        };

        let (host_ip, host_port) = published.first().cloned().unwrap_or_default();

        Self {
            host_port,
            host_ip,
            exposed_port: exposed.to_string(),
            port_type: proto.to_string(),
        }
    }
}
