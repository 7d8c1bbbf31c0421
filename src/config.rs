use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// Bridge 配置（构造后只读）
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// 覆盖服务 IP（为空时使用发布绑定的主机 IP）
    pub host_ip: Option<String>,
    /// 使用容器内部 IP 和暴露端口，而不是发布端口
    pub internal: bool,
    /// 追加到每个服务上的逗号分隔标签
    pub force_tags: String,
    /// 注册记录的默认 TTL（秒），0 表示不过期
    pub ttl: u64,
    /// 刷新时使用的 TTL（秒）
    pub refresh_ttl: u64,
    /// 刷新间隔（秒），0 表示不刷新
    pub refresh_interval: u64,
    pub deregister_check: DeregisterCheck,
    /// 是否注册主机级（port == 0）容器服务
    pub register_container: bool,
}

/// 容器退出后何时注销其服务
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeregisterCheck {
    /// 总是注销
    #[default]
    Always,
    /// 仅在容器正常退出（exit code 0）时注销
    OnSuccess,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_ip: None,
            internal: false,
            force_tags: String::new(),
            ttl: 0,
            refresh_ttl: 0,
            refresh_interval: 0,
            deregister_check: DeregisterCheck::Always,
            register_container: false,
        }
    }
}

impl std::str::FromStr for DeregisterCheck {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "always" => Ok(DeregisterCheck::Always),
            "on-success" => Ok(DeregisterCheck::OnSuccess),
            _ => Err(format!("Unknown deregister check: {}", s)),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::config(format!("Failed to read {}: {}", path, e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| BridgeError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 刷新 TTL 必须大于刷新间隔，否则记录会在两次刷新之间过期
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval > 0 && self.refresh_ttl <= self.refresh_interval {
            return Err(BridgeError::config(format!(
                "refresh_ttl ({}) must be greater than refresh_interval ({})",
                self.refresh_ttl, self.refresh_interval
            )));
        }
        Ok(())
    }

    /// 容器退出后是否应注销其服务
    pub fn should_deregister(&self, exit_code: i64) -> bool {
        match self.deregister_check {
            DeregisterCheck::Always => true,
            DeregisterCheck::OnSuccess => exit_code == 0,
        }
    }

    /// 写入服务记录时使用的 TTL：启用刷新时使用刷新 TTL
    pub fn service_ttl(&self) -> u64 {
        if self.refresh_ttl > 0 {
            self.refresh_ttl
        } else {
            self.ttl
        }
    }

    pub fn refresh_period(&self) -> Option<Duration> {
        (self.refresh_interval > 0).then(|| Duration::from_secs(self.refresh_interval))
    }

    pub fn with_host_ip(mut self, ip: impl Into<String>) -> Self {
        self.host_ip = Some(ip.into());
        self
    }

    pub fn with_internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    pub fn with_force_tags(mut self, tags: impl Into<String>) -> Self {
        self.force_tags = tags.into();
        self
    }

    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = ttl;
        self
    }

    /// 设置刷新 TTL 和刷新间隔
    pub fn with_refresh(mut self, ttl: u64, interval: u64) -> Self {
        self.refresh_ttl = ttl;
        self.refresh_interval = interval;
        self
    }

    pub fn with_register_container(mut self, enable: bool) -> Self {
        self.register_container = enable;
        self
    }

    pub fn with_deregister_check(mut self, check: DeregisterCheck) -> Self {
        self.deregister_check = check;
        self
    }
}
