//! skydns2 适配器测试（内存存储）

use registry_bridge::registry::skydns2::{domain_path, path_domain, reverse_domain};
use registry_bridge::store::memory::StoreOp;
use registry_bridge::{
    BridgeError, MemoryStore, RegistryAdapter, Service, ServiceContainer, ServiceHost, ServicePort,
    Skydns2Adapter,
};
use std::sync::Arc;

fn host_level_service() -> Service {
    Service {
        id: "h1:c1".to_string(),
        name: "web".to_string(),
        port: 0,
        ip: "10.0.0.5".to_string(),
        ttl: 30,
        host: ServiceHost {
            hostname: "h1".to_string(),
            ip: "192.168.1.10".to_string(),
        },
        container: ServiceContainer {
            hostname: "c1".to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn port_level_service() -> Service {
    Service {
        id: "h1:c1:80".to_string(),
        port: 8080,
        origin: ServicePort {
            host_port: "8080".to_string(),
            host_ip: "0.0.0.0".to_string(),
            exposed_port: "80".to_string(),
            port_type: "tcp".to_string(),
        },
        ..host_level_service()
    }
}

fn adapter() -> (Skydns2Adapter, MemoryStore) {
    registry_bridge::telemetry::init_tracing("registry_bridge=debug");
    let store = MemoryStore::new();
    (Skydns2Adapter::new(Arc::new(store.clone()), "local"), store)
}

#[test]
fn test_domain_path_round_trip() {
    assert_eq!(domain_path("a.b.com"), "/skydns/com/b/a");
    assert_eq!(path_domain("/skydns/com/b/a").as_deref(), Some("a.b.com"));
    assert_eq!(path_domain("/other/com"), None);
}

#[test]
fn test_reverse_domain() {
    assert_eq!(reverse_domain("10.0.0.5").as_deref(), Some("5.0.0.10.in-addr.arpa"));
    assert_eq!(reverse_domain("fe80::1"), None);
    assert_eq!(reverse_domain("not-an-ip"), None);
}

#[tokio::test]
async fn test_register_host_level() {
    let (adapter, store) = adapter();

    adapter.register(&host_level_service()).await.unwrap();

    let container = store.entry("/skydns/local/web/h1/c1").await.unwrap();
    assert_eq!(container.value, r#"{"host":"10.0.0.5"}"#);
    assert_eq!(container.ttl, 30);

    let reverse = store.entry("/skydns/arpa/in-addr/10/0/0/5").await.unwrap();
    assert_eq!(reverse.value, r#"{"host":"c1.h1.web.local"}"#);
    assert_eq!(reverse.ttl, 30);

    assert_eq!(store.keys().await.len(), 2);
}

#[tokio::test]
async fn test_register_host_level_ipv6_skips_reverse() {
    let (adapter, store) = adapter();
    let service = Service {
        ip: "fd00::5".to_string(),
        ..host_level_service()
    };

    adapter.register(&service).await.unwrap();

    assert_eq!(store.keys().await, vec!["/skydns/local/web/h1/c1".to_string()]);
}

#[tokio::test]
async fn test_register_port_level() {
    let (adapter, store) = adapter();

    adapter.register(&port_level_service()).await.unwrap();

    let keys = store.keys().await;
    assert_eq!(keys, vec!["/skydns/local/web/_tcp/_80/h1/c1".to_string()]);

    let record = store.entry(&keys[0]).await.unwrap();
    assert_eq!(record.value, r#"{"host":"c1.h1.web.local","port":8080}"#);
    assert_eq!(record.ttl, 30);
}

#[tokio::test]
async fn test_register_is_idempotent() {
    let (adapter, store) = adapter();
    let service = port_level_service();

    adapter.register(&service).await.unwrap();
    let before = store.keys().await;
    adapter.register(&service).await.unwrap();

    assert_eq!(store.keys().await, before);
}

#[tokio::test]
async fn test_deregister_port_level() {
    let (adapter, store) = adapter();
    let service = port_level_service();

    adapter.register(&service).await.unwrap();
    adapter.deregister(&service).await.unwrap();
    assert!(store.keys().await.is_empty());

    // 记录已不存在时仍然成功
    adapter.deregister(&service).await.unwrap();
}

#[tokio::test]
async fn test_deregister_host_level_leaves_records() {
    let (adapter, store) = adapter();
    let service = host_level_service();

    adapter.register(&service).await.unwrap();
    store.clear_ops().await;
    adapter.deregister(&service).await.unwrap();

    assert!(store.ops().await.is_empty());
    assert_eq!(store.keys().await.len(), 2);
}

#[tokio::test]
async fn test_refresh_rewrites_with_ttl() {
    let (adapter, store) = adapter();
    let service = port_level_service();

    adapter.refresh(&service).await.unwrap();

    assert_eq!(
        store.ops().await,
        vec![StoreOp::Set {
            key: "/skydns/local/web/_tcp/_80/h1/c1".to_string(),
            ttl: 30,
        }]
    );
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let (adapter, store) = adapter();
    store.set_unavailable(true);

    let err = adapter.register(&port_level_service()).await.unwrap_err();
    assert!(matches!(err, BridgeError::Store { .. }));
    assert!(err.is_retryable());
    assert_eq!(err.key(), Some("/skydns/local/web/_tcp/_80/h1/c1"));

    assert!(adapter.ping().await.is_err());
}
