use std::time::Duration;

use taco_http::config::{Config, ServerConfig};

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.server.read_timeout(), Duration::from_secs(30));
    assert!(cfg.server.default_headers.is_empty());
    assert_eq!(cfg.log_level(), tracing::Level::INFO);
}

#[test]
fn test_config_env_overrides() {
    // Both env vars are handled in one test so parallel tests cannot race on them
    unsafe {
        std::env::remove_var("TACO_HTTP_CONFIG");
        std::env::remove_var("LISTEN");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");

    let path = std::env::temp_dir().join(format!("taco-http-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "server:\n  listen_addr: \"10.0.0.1:9000\"\n  read_timeout_secs: 5\n").unwrap();
    unsafe {
        std::env::set_var("TACO_HTTP_CONFIG", &path);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "10.0.0.1:9000");
    assert_eq!(cfg.server.read_timeout_secs, 5);

    unsafe {
        std::env::set_var("LISTEN", "0.0.0.0:3000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.server.read_timeout_secs, 5);

    unsafe {
        std::env::remove_var("TACO_HTTP_CONFIG");
        std::env::remove_var("LISTEN");
    }
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_config_from_yaml() {
    let cfg = Config::from_yaml_str(
        r#"
log_level: debug
server:
  listen_addr: "0.0.0.0:8443"
  read_timeout_secs: 10
  default_headers:
    Server: taco-http
    X-Frame-Options: DENY
"#,
    )
    .unwrap();

    assert_eq!(cfg.log_level(), tracing::Level::DEBUG);
    assert_eq!(cfg.server.read_timeout(), Duration::from_secs(10));

    let headers = cfg.server.default_headers();
    assert_eq!(headers.get("server"), Some("taco-http"));
    assert_eq!(headers.get("x-frame-options"), Some("DENY"));
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml_str("log_level: warn\n").unwrap();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.log_level(), tracing::Level::WARN);
}

#[test]
fn test_config_rejects_malformed_yaml() {
    assert!(Config::from_yaml_str("server: [not, a, map]").is_err());
}

#[test]
fn test_config_missing_file() {
    assert!(Config::from_file("/no/such/taco-http.yaml").is_err());
}

#[test]
fn test_unknown_log_level_falls_back_to_info() {
    let cfg = Config {
        log_level: "chatty".to_string(),
        ..Config::default()
    };

    assert_eq!(cfg.log_level(), tracing::Level::INFO);
}

#[test]
fn test_host_port_split() {
    let server = ServerConfig {
        listen_addr: "127.0.0.1:8000".to_string(),
        ..ServerConfig::default()
    };
    assert_eq!(server.host_port().unwrap(), ("127.0.0.1".to_string(), 8000));

    let server = ServerConfig {
        listen_addr: "[::1]:8080".to_string(),
        ..ServerConfig::default()
    };
    assert_eq!(server.host_port().unwrap(), ("::1".to_string(), 8080));
}

#[test]
fn test_host_port_requires_port() {
    let server = ServerConfig {
        listen_addr: "localhost".to_string(),
        ..ServerConfig::default()
    };
    assert!(server.host_port().is_err());

    let server = ServerConfig {
        listen_addr: "localhost:http".to_string(),
        ..ServerConfig::default()
    };
    assert!(server.host_port().is_err());
}
