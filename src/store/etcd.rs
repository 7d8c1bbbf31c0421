//! etcd v2 keys API 存储实现（HTTP）

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{KvStore, normalize_key};
use crate::error::{BridgeError, ErrorCode, Result};

/// 未指定地址时使用的 etcd 端点
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:4001";

/// etcd 错误码：键不存在
const ETCD_KEY_NOT_FOUND: u64 = 100;

/// etcd v2 存储
///
/// 复用同一个 `reqwest::Client`（连接池）；传输层失败时依次尝试下一个端点。
#[derive(Clone)]
pub struct EtcdStore {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

#[derive(Deserialize)]
#[allow(non_snake_case)]
struct EtcdErrorBody {
    errorCode: u64,
    message: String,
}

#[derive(Deserialize)]
struct EtcdGetResponse {
    node: EtcdNode,
}

#[derive(Deserialize)]
struct EtcdNode {
    value: Option<String>,
}

impl EtcdStore {
    /// 创建 etcd 存储；`endpoints` 为空时使用默认端点
    pub fn new(endpoints: Vec<String>) -> Self {
        let mut endpoints: Vec<String> = endpoints
            .into_iter()
            .map(|ep| ep.trim_end_matches('/').to_string())
            .filter(|ep| !ep.is_empty())
            .collect();
        if endpoints.is_empty() {
            endpoints.push(DEFAULT_ENDPOINT.to_string());
        }

        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// 发送请求，传输错误时切换端点
    async fn send<F>(&self, key: &str, build: F) -> Result<Response>
    where
        F: Fn(&reqwest::Client, &str) -> Result<RequestBuilder>,
    {
        let mut last_err = None;
        for endpoint in &self.endpoints {
            let request = match build(&self.client, endpoint) {
                Ok(request) => request,
                Err(e) => {
                    debug!("etcd endpoint {} skipped for {}: {}", endpoint, key, e);
                    last_err = Some(e);
                    continue;
                }
            };
            match request.send().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    debug!("etcd endpoint {} failed for {}: {}", endpoint, key, e);
                    last_err = Some(transport_error(key, &e));
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            BridgeError::store(ErrorCode::ConnectionFailed, key, "no etcd endpoint configured")
        }))
    }

    fn keys_request(
        client: &reqwest::Client,
        method: Method,
        endpoint: &str,
        key: &str,
    ) -> Result<RequestBuilder> {
        Ok(client.request(method, keys_url(endpoint, key)?))
    }
}

#[async_trait]
impl KvStore for EtcdStore {
    async fn ping(&self) -> Result<()> {
        let resp = self
            .send("/version", |client, endpoint| {
                Ok(client.get(format!("{}/version", endpoint)))
            })
            .await?;
        if !resp.status().is_success() {
            return Err(status_error("/version", resp).await);
        }
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl: u64) -> Result<()> {
        let key = normalize_key(key);
        let ttl = ttl.to_string();
        let resp = self
            .send(&key, |client, endpoint| {
                let mut form = vec![("value", value)];
                if ttl != "0" {
                    form.push(("ttl", ttl.as_str()));
                }
                Ok(Self::keys_request(client, Method::PUT, endpoint, &key)?.form(&form))
            })
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(&key, resp).await);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = normalize_key(key);
        let resp = self
            .send(&key, |client, endpoint| {
                Ok(Self::keys_request(client, Method::DELETE, endpoint, &key)?
                    .query(&[("recursive", "false")]))
            })
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!("{}: already absent", key);
            return Ok(());
        }
        if !resp.status().is_success() {
            return Err(status_error(&key, resp).await);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = normalize_key(key);
        let resp = self
            .send(&key, |client, endpoint| {
                Self::keys_request(client, Method::GET, endpoint, &key)
            })
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_error(&key, resp).await);
        }
        let body: EtcdGetResponse = resp
            .json()
            .await
            .map_err(|e| BridgeError::deserialization(format!("{}: {}", key, e)))?;
        Ok(body.node.value)
    }
}

/// `<endpoint>/v2/keys/<key>`，键的每一段单独做百分号编码
///
/// 名称里的 `?`、`#`、`%` 不会被当作查询串或片段截断键。
fn keys_url(endpoint: &str, key: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| BridgeError::config(format!("invalid etcd endpoint {}: {}", endpoint, e)))?;
    url.path_segments_mut()
        .map_err(|_| BridgeError::config(format!("invalid etcd endpoint {}", endpoint)))?
        .pop_if_empty()
        .extend(["v2", "keys"])
        .extend(key.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}

fn transport_error(key: &str, err: &reqwest::Error) -> BridgeError {
    let code = if err.is_timeout() {
        ErrorCode::NetworkTimeout
    } else if err.is_connect() {
        ErrorCode::ConnectionFailed
    } else {
        ErrorCode::NetworkError
    };
    BridgeError::store(code, key, err.to_string())
}

/// 非 2xx 响应转换为存储错误；5xx 可重试，4xx 视为拒绝
async fn status_error(key: &str, resp: Response) -> BridgeError {
    let status = resp.status();
    let code = if status.is_server_error() {
        ErrorCode::ServiceUnavailable
    } else {
        ErrorCode::StoreRejected
    };
    let reason = match resp.json::<EtcdErrorBody>().await {
        Ok(body) if body.errorCode == ETCD_KEY_NOT_FOUND => {
            format!("{} (key not found)", body.message)
        }
        Ok(body) => format!("{} (etcd error {})", body.message, body.errorCode),
        Err(_) => format!("unexpected status {}", status),
    };
    BridgeError::store(code, key, reason)
}
