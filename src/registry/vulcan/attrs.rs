//! 解析服务的 `vulcan_*` 属性

use super::api::{BACKEND_TYPE, Backend, BackendServer, FRONTEND_TYPE, Frontend};
use crate::types::Service;

/// 由服务属性推导出的路由字段
///
/// 每个字段独立推导，取第一条适用的规则：
///
/// | 字段 | 规则 1 | 规则 2 | 规则 3 |
/// |---|---|---|---|
/// | route | `vulcan_route` | `Host("<vulcan_host>")` | 空 |
/// | backend | `vulcan_backend` | `vulcan` 的值 | route 非空时取服务名 |
/// | frontend | `vulcan_frontend` | route 非空时同 backend | 空 |
/// | server | `vulcan_server` | 存在 `vulcan` 时取实例 ID | 空 |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteAttrs {
    pub server: String,
    pub server_url: String,
    pub backend: String,
    pub backend_type: String,
    pub frontend: String,
    pub frontend_type: String,
    pub route: String,
}

impl RouteAttrs {
    pub fn from_service(service: &Service) -> Self {
        let attrs = &service.attrs;

        let route = if let Some(route) = attrs.get("vulcan_route") {
            route.clone()
        } else if let Some(host) = attrs.get("vulcan_host") {
            format!("Host(\"{}\")", host)
        } else {
            String::new()
        };

        let backend = if let Some(backend) = attrs.get("vulcan_backend") {
            backend.clone()
        } else if let Some(vulcan) = attrs.get("vulcan") {
            vulcan.clone()
        } else if !route.is_empty() {
            service.name.clone()
        } else {
            String::new()
        };

        let frontend = if let Some(frontend) = attrs.get("vulcan_frontend") {
            frontend.clone()
        } else if !route.is_empty() {
            backend.clone()
        } else {
            String::new()
        };

        let server = if let Some(server) = attrs.get("vulcan_server") {
            server.clone()
        } else if attrs.contains_key("vulcan") {
            service.id.clone()
        } else {
            String::new()
        };

        Self {
            server,
            server_url: format!("http://{}:{}", service.ip, service.port),
            backend,
            backend_type: BACKEND_TYPE.to_string(),
            frontend,
            frontend_type: FRONTEND_TYPE.to_string(),
            route,
        }
    }

    /// Backend 对象（backend 为空时返回 `None`）
    pub fn backend(&self) -> Option<(String, Backend)> {
        if self.backend.is_empty() {
            return None;
        }
        Some((
            format!("backends/{}/backend", self.backend),
            Backend {
                Type: self.backend_type.clone(),
            },
        ))
    }

    /// Server 对象（server 为空时返回 `None`）
    pub fn server(&self) -> Option<(String, BackendServer)> {
        if self.server.is_empty() {
            return None;
        }
        Some((
            format!("backends/{}/servers/{}", self.backend, self.server),
            BackendServer {
                URL: self.server_url.clone(),
            },
        ))
    }

    /// Frontend 对象（frontend 为空时返回 `None`）
    pub fn frontend(&self) -> Option<(String, Frontend)> {
        if self.frontend.is_empty() {
            return None;
        }
        Some((
            format!("frontends/{}/frontend", self.frontend),
            Frontend {
                Type: self.frontend_type.clone(),
                BackendId: self.backend.clone(),
                Route: self.route.clone(),
            },
        ))
    }
}
