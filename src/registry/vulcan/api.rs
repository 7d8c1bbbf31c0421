//! vulcand 在 etcd 中的对象定义
//!
//! 字段名与 vulcand 读取的 JSON 一致（PascalCase）。

use serde::{Deserialize, Serialize};

pub const FRONTEND_TYPE: &str = "http";
pub const BACKEND_TYPE: &str = "http";

/// `<prefix>/frontends/<frontend>/frontend`
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontend {
    pub Type: String,
    pub BackendId: String,
    pub Route: String,
}

/// `<prefix>/backends/<backend>/backend`
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    pub Type: String,
}

/// `<prefix>/backends/<backend>/servers/<server>`
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendServer {
    pub URL: String,
}
