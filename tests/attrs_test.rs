//! 属性提取与服务快照构建测试

use registry_bridge::{
    BridgeError, Config, DeadContainer, DeregisterCheck, Service, ServiceContainer, ServiceHost,
    ServiceMeta, ServicePort, combine_tags, map_default,
};
use std::time::Duration;
use std::collections::HashMap;

fn host() -> ServiceHost {
    ServiceHost {
        hostname: "h1".to_string(),
        ip: "192.168.1.10".to_string(),
    }
}

fn container(env: &[&str]) -> ServiceContainer {
    ServiceContainer::new(
        "c1",
        "abc123",
        "registry.local:5000/team/web:1.2",
        "172.17.0.2",
        env.iter().map(|s| s.to_string()).collect(),
        &[],
    )
}

#[test]
fn test_combine_tags() {
    assert_eq!(combine_tags(&["a,b", "", "c"]), vec!["a", "b", "c"]);
    assert!(combine_tags(&[]).is_empty());
    assert_eq!(combine_tags(&["x,x", "x"]), vec!["x", "x", "x"]);
}

#[test]
fn test_port_scoped_entry_overrides_global() {
    let meta = ["SERVICE_NAME=foo", "SERVICE_80_NAME=web"];

    let parsed = ServiceMeta::parse(&meta, "80").unwrap();
    assert_eq!(parsed.get("name"), Some("web"));
    assert_eq!(parsed.len(), 1);

    let parsed = ServiceMeta::parse(&meta, "81").unwrap();
    assert_eq!(parsed.get("name"), Some("foo"));
    assert_eq!(parsed.len(), 1);
}

#[test]
fn test_last_entry_wins() {
    let meta = ["SERVICE_80_NAME=web", "SERVICE_NAME=foo"];
    let parsed = ServiceMeta::parse(&meta, "80").unwrap();
    assert_eq!(parsed.get("name"), Some("foo"));
}

#[test]
fn test_non_service_entries_ignored() {
    let meta = [
        "PATH=/usr/bin",
        "SERVICE_TAGS=a,b",
        "SERVICE_NOVALUE",
        "service_name=lower",
        "SERVICE_VULCAN_HOST=api.example.com",
    ];
    let parsed = ServiceMeta::parse(&meta, "80").unwrap().into_inner();

    let mut expected = HashMap::new();
    expected.insert("tags".to_string(), "a,b".to_string());
    expected.insert("vulcan_host".to_string(), "api.example.com".to_string());
    assert_eq!(parsed, expected);
}

#[test]
fn test_numeric_key_without_scope_is_global() {
    let parsed = ServiceMeta::parse(&["SERVICE_80=x"], "81").unwrap();
    assert_eq!(parsed.get("80"), Some("x"));
}

#[test]
fn test_malformed_keys_rejected() {
    let err = ServiceMeta::parse(&["SERVICE_=x"], "80").unwrap_err();
    assert!(matches!(err, BridgeError::MalformedAttribute { .. }));

    let err = ServiceMeta::parse(&["SERVICE_80_=x"], "80").unwrap_err();
    assert!(matches!(err, BridgeError::MalformedAttribute { .. }));

    // 其他端口的条目直接跳过，不检查格式
    assert!(ServiceMeta::parse(&["SERVICE_81_=x"], "80").unwrap().is_empty());
}

#[test]
fn test_map_default() {
    let mut map = HashMap::new();
    map.insert("name".to_string(), "web".to_string());
    map.insert("empty".to_string(), String::new());

    assert_eq!(map_default(&map, "name", "d"), "web");
    assert_eq!(map_default(&map, "empty", "d"), "d");
    assert_eq!(map_default(&map, "missing", "d"), "d");
}

#[test]
fn test_container_image_name_and_labels() {
    let labels = vec![("SERVICE_NAME".to_string(), "labelled".to_string())];
    let c = ServiceContainer::new(
        "c1",
        "id",
        "quay.io/org/app:latest",
        "10.0.0.2",
        vec![],
        &labels,
    );

    assert_eq!(c.image_name, "app");
    assert_eq!(c.meta, vec!["SERVICE_NAME=labelled"]);
}

#[test]
fn test_port_parse() {
    let published = vec![("0.0.0.0".to_string(), "32768".to_string())];
    let port = ServicePort::parse("53/udp", &published);
    assert_eq!(port.exposed_port, "53");
    assert_eq!(port.port_type, "udp");
    assert_eq!(port.host_port, "32768");

    let port = ServicePort::parse("80", &[]);
    assert_eq!(port.port_type, "tcp");
    assert!(port.host_port.is_empty());
}

#[test]
fn test_service_from_published_binding() {
    let config = Config::default().with_force_tags("prod").with_ttl(30);
    let c = container(&["SERVICE_TAGS=a,b", "SERVICE_80_VULCAN_HOST=api.example.com"]);
    let port = ServicePort::parse("80/tcp", &[("0.0.0.0".to_string(), "8080".to_string())]);

    let service = Service::from_binding(&config, &host(), &c, &port, false)
        .unwrap()
        .expect("published port should register");

    assert_eq!(service.name, "web");
    assert_eq!(service.id, "h1:c1:80");
    assert_eq!(service.ip, "192.168.1.10");
    assert_eq!(service.port, 8080);
    assert_eq!(service.tags, vec!["a", "b", "prod"]);
    assert_eq!(service.ttl, 30);
    assert_eq!(
        service.attrs.get("vulcan_host").map(String::as_str),
        Some("api.example.com")
    );
    assert!(!service.attrs.contains_key("tags"));
    assert!(!service.is_host_level());
}

#[test]
fn test_service_from_binding_internal_and_overrides() {
    let config = Config::default().with_internal(true).with_refresh(20, 10);
    let c = container(&["SERVICE_ID=custom", "SERVICE_53_NAME=dns"]);
    let port = ServicePort::parse("53/udp", &[]);

    let service = Service::from_binding(&config, &host(), &c, &port, true)
        .unwrap()
        .unwrap();

    assert_eq!(service.id, "custom");
    assert_eq!(service.name, "dns");
    assert_eq!(service.ip, "172.17.0.2");
    assert_eq!(service.port, 53);
    assert_eq!(service.ttl, 20);
}

#[test]
fn test_service_from_binding_skipped() {
    let config = Config::default();
    let unpublished = ServicePort::parse("80/tcp", &[]);
    assert!(
        Service::from_binding(&config, &host(), &container(&[]), &unpublished, false)
            .unwrap()
            .is_none()
    );

    let published = ServicePort::parse("80/tcp", &[("".to_string(), "8080".to_string())]);
    let ignored = container(&["SERVICE_IGNORE=true"]);
    assert!(
        Service::from_binding(&config, &host(), &ignored, &published, false)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_multi_port_default_name_and_host_ip_override() {
    let config = Config::default().with_host_ip("203.0.113.7");
    let port = ServicePort::parse("443/tcp", &[("0.0.0.0".to_string(), "8443".to_string())]);

    let service = Service::from_binding(&config, &host(), &container(&[]), &port, true)
        .unwrap()
        .unwrap();
    assert_eq!(service.name, "web-443");
    assert_eq!(service.ip, "203.0.113.7");
}

#[test]
fn test_service_from_container() {
    let c = container(&["SERVICE_NAME=db"]);

    assert!(Service::from_container(&Config::default(), &host(), &c).unwrap().is_none());

    let config = Config::default().with_register_container(true);
    let service = Service::from_container(&config, &host(), &c).unwrap().unwrap();
    assert!(service.is_host_level());
    assert_eq!(service.name, "db");
    assert_eq!(service.id, "h1:c1");
    assert_eq!(service.ip, "172.17.0.2");
}

#[test]
fn test_config_from_toml() {
    let config = Config::from_toml(
        r#"
        force_tags = "a,b"
        refresh_ttl = 30
        refresh_interval = 10
        deregister_check = "on-success"
        "#,
    )
    .unwrap();

    assert_eq!(config.force_tags, "a,b");
    assert_eq!(config.service_ttl(), 30);
    assert_eq!(config.deregister_check, DeregisterCheck::OnSuccess);
    assert!(!config.should_deregister(1));
    assert!(config.should_deregister(0));

    let err = Config::from_toml("refresh_ttl = 5\nrefresh_interval = 10").unwrap_err();
    assert!(matches!(err, BridgeError::Config(_)));
}

#[test]
fn test_dead_container_grace_period() {
    let mut dead = DeadContainer::new(30, vec![Service::default()]);
    assert!(!dead.tick(10));
    assert!(!dead.tick(10));
    assert!(dead.tick(15));
    assert_eq!(dead.services.len(), 1);
}

#[test]
fn test_deregister_check_from_str() {
    assert_eq!("always".parse::<DeregisterCheck>(), Ok(DeregisterCheck::Always));
    assert_eq!("on_success".parse::<DeregisterCheck>(), Ok(DeregisterCheck::OnSuccess));
    assert_eq!("On-Success".parse::<DeregisterCheck>(), Ok(DeregisterCheck::OnSuccess));
    assert!("never".parse::<DeregisterCheck>().is_err());
}

#[test]
fn test_refresh_period() {
    assert_eq!(Config::default().refresh_period(), None);

    let config = Config::default().with_refresh(30, 10);
    assert_eq!(config.refresh_period(), Some(Duration::from_secs(10)));
    assert_eq!(config.service_ttl(), 30);
}

#[test]
fn test_json_tracing_init_is_idempotent() {
    registry_bridge::telemetry::init_json_tracing("registry_bridge=debug");
    registry_bridge::telemetry::init_json_tracing("registry_bridge=info");
    tracing::info!(service = "web", "json subscriber installed");
}
