//! 注册适配器模块
//!
//! 支持两种后端：skydns2（DNS 区域）和 vulcan（vulcand 反向代理路由）

pub mod factory;
pub mod skydns2;
pub mod trait_def;
pub mod vulcan;

pub use factory::{AdapterFactory, AdapterKind};
pub use skydns2::Skydns2Adapter;
pub use trait_def::{Registry, RegistryAdapter};
pub use vulcan::VulcanAdapter;

use url::Url;

/// URI 中的 `host[:port]` 转换为 etcd 端点；未指定 host 时返回空列表（使用默认端点）
pub(crate) fn endpoints_from_uri(uri: &Url) -> Vec<String> {
    match uri.host_str() {
        Some(host) if !host.is_empty() => match uri.port() {
            Some(port) => vec![format!("http://{}:{}", host, port)],
            None => vec![format!("http://{}", host)],
        },
        _ => Vec::new(),
    }
}
