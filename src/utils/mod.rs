//! 属性提取工具
//!
//! 从容器元数据中提取 `SERVICE_*` 属性，以及合并多来源的标签。

use std::collections::HashMap;

use crate::error::{BridgeError, Result};

const SERVICE_PREFIX: &str = "SERVICE_";

/// 合并多个逗号分隔的标签来源
///
/// 空来源被跳过；保留顺序和重复项。
///
/// ```
/// use registry_bridge::utils::combine_tags;
///
/// assert_eq!(combine_tags(&["a,b", "", "c"]), vec!["a", "b", "c"]);
/// assert!(combine_tags(&[]).is_empty());
/// ```
pub fn combine_tags(sources: &[&str]) -> Vec<String> {
    sources
        .iter()
        .filter(|source| !source.is_empty())
        .flat_map(|source| source.split(','))
        .map(str::to_string)
        .collect()
}

/// 取 map 中的值，缺失或为空时返回默认值
pub fn map_default(map: &HashMap<String, String>, key: &str, default: &str) -> String {
    match map.get(key) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => default.to_string(),
    }
}

/// 从 `SERVICE_*` 元数据行解析出的服务属性
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceMeta {
    attrs: HashMap<String, String>,
}

impl ServiceMeta {
    /// 解析元数据行
    ///
    /// - 只处理 `SERVICE_` 前缀且包含 `=` 的行，键去掉前缀后转小写
    /// - `SERVICE_<port>_<key>` 是端口级条目：端口不等于 `port` 时整条跳过，否则以 `<key>` 存储
    /// - 其余为全局条目，按原键存储
    /// - 按出现顺序处理，后出现的同名键覆盖先出现的
    pub fn parse<S: AsRef<str>>(meta: &[S], port: &str) -> Result<Self> {
        let mut attrs = HashMap::new();

        for line in meta {
            let Some((raw_key, value)) = line.as_ref().split_once('=') else {
                continue;
            };
            let Some(stripped) = raw_key.strip_prefix(SERVICE_PREFIX) else {
                continue;
            };

            let key = stripped.to_lowercase();
            if key.is_empty() {
                return Err(BridgeError::malformed_attribute(raw_key, "empty attribute name"));
            }

            match key.split_once('_') {
                Some((scope, rest)) if scope.parse::<i64>().is_ok() => {
                    if scope != port {
                        continue;
                    }
                    if rest.is_empty() {
                        return Err(BridgeError::malformed_attribute(
                            raw_key,
                            "empty attribute name after port scope",
                        ));
                    }
                    attrs.insert(rest.to_string(), value.to_string());
                }
                _ => {
                    attrs.insert(key, value.to_string());
                }
            }
        }

        Ok(Self { attrs })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.attrs
    }
}
