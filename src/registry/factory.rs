//! 适配器工厂
//!
//! scheme → 适配器类型的映射表由组合代码显式注册，不依赖初始化期副作用。

use std::collections::HashMap;
use tracing::info;
use url::Url;

use super::skydns2::Skydns2Adapter;
use super::trait_def::Registry;
use super::vulcan::VulcanAdapter;
use crate::error::{BridgeError, Result};

/// 适配器类型（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    Skydns2,
    Vulcan,
}

impl AdapterKind {
    /// 所有内置适配器
    pub const ALL: [AdapterKind; 2] = [AdapterKind::Skydns2, AdapterKind::Vulcan];

    /// URI scheme
    pub fn scheme(&self) -> &'static str {
        match self {
            AdapterKind::Skydns2 => "skydns2",
            AdapterKind::Vulcan => "vulcan",
        }
    }

    /// 根据 URI 构造适配器；缺少必需部分时返回配置错误
    pub fn create(&self, uri: &Url) -> Result<Registry> {
        match self {
            AdapterKind::Skydns2 => Ok(Box::new(Skydns2Adapter::from_uri(uri)?)),
            AdapterKind::Vulcan => Ok(Box::new(VulcanAdapter::from_uri(uri)?)),
        }
    }
}

impl std::str::FromStr for AdapterKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skydns2" => Ok(AdapterKind::Skydns2),
            "vulcan" | "vulcand" => Ok(AdapterKind::Vulcan),
            _ => Err(format!("Unknown adapter type: {}", s)),
        }
    }
}

/// 适配器工厂
#[derive(Debug, Clone, Default)]
pub struct AdapterFactory {
    adapters: HashMap<String, AdapterKind>,
}

impl AdapterFactory {
    /// 创建空工厂
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册全部内置适配器
    pub fn builtin() -> Self {
        AdapterKind::ALL
            .into_iter()
            .fold(Self::new(), |factory, kind| factory.register(kind))
    }

    /// 以适配器自身的 scheme 注册
    pub fn register(self, kind: AdapterKind) -> Self {
        self.register_as(kind.scheme(), kind)
    }

    /// 以自定义 scheme 注册
    pub fn register_as(mut self, scheme: impl Into<String>, kind: AdapterKind) -> Self {
        self.adapters.insert(scheme.into(), kind);
        self
    }

    /// 查找 scheme 对应的适配器类型
    pub fn lookup(&self, scheme: &str) -> Option<AdapterKind> {
        self.adapters.get(scheme).copied()
    }

    /// 已注册的 scheme（有序）
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.adapters.keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// 从配置 URI 创建适配器
    pub fn create(&self, uri: &str) -> Result<Registry> {
        let parsed = Url::parse(uri)
            .map_err(|e| BridgeError::config(format!("invalid registry uri {}: {}", uri, e)))?;

        let kind = self.lookup(parsed.scheme()).ok_or_else(|| {
            BridgeError::config(format!("unrecognized adapter: {}", parsed.scheme()))
        })?;

        let adapter = kind.create(&parsed)?;
        info!("Using {} adapter: {}", kind.scheme(), uri);
        Ok(adapter)
    }
}
