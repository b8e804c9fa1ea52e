//! 配置功能测试

use pagefetch::infrastructure::config::{
    load_config_from, parse_config, write_config_sample, ClientConfig, Logging,
};
use pagefetch::FetchError;
use std::fs;
use std::path::PathBuf;

/// A fresh scratch directory under the system temp dir
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pagefetch-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_config_toml_format() {
    let toml_content = r#"
[client]
max_total_connections = 50
max_connections_per_route = 10
socket_timeout_secs = 5
connect_timeout_secs = 3
connection_request_timeout_secs = 2
accept_self_signed = false
tls_sni = false
http_proxy = "http://127.0.0.1:7890"

[logging]
enable = true
path = "/tmp/test.log"
level = "DEBUG"
"#;

    let config = parse_config(toml_content).unwrap();
    assert_eq!(config.client.max_total_connections, 50);
    assert_eq!(config.client.max_connections_per_route, 10);
    assert_eq!(config.client.socket_timeout().as_secs(), 5);
    assert_eq!(config.client.connect_timeout().as_secs(), 3);
    assert_eq!(config.client.connection_request_timeout().as_secs(), 2);
    assert!(!config.client.tls_sni);
    assert_eq!(
        config.client.http_proxy.as_deref(),
        Some("http://127.0.0.1:7890")
    );
    assert_eq!(config.logging.path.as_deref(), Some("/tmp/test.log"));
    assert_eq!(config.logging.level, "DEBUG");
}

#[test]
fn test_bad_toml_is_an_error() {
    let err = parse_config("[client\nmax_total_connections = ").unwrap_err();
    assert!(matches!(err, FetchError::Toml(_)));
}

#[test]
fn test_zero_limits_rejected() {
    let err = parse_config("[client]\nmax_connections_per_route = 0\n").unwrap_err();
    assert!(matches!(err, FetchError::Config(_)));
}

#[test]
fn test_logging_defaults() {
    let logging = Logging::default();
    assert!(logging.enable);
    assert!(logging.path.is_none());
    assert_eq!(logging.level, "WARN");
}

#[test]
fn test_missing_file_loads_defaults() {
    let dir = scratch_dir("missing");
    let config = load_config_from(&dir.join("config.toml")).unwrap();
    assert_eq!(config.client, ClientConfig::default());
    assert_eq!(config.logging.level, "WARN");
}

#[test]
fn test_broken_file_is_an_error() {
    let dir = scratch_dir("broken");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    fs::write(&path, "[client]\nmax_total_connections = \"many\"\n").unwrap();

    assert!(matches!(load_config_from(&path), Err(FetchError::Toml(_))));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_sample_is_written_once_and_loads_back() {
    let dir = scratch_dir("sample");
    let path = dir.join("nested").join("config.toml");

    assert!(write_config_sample(&path).unwrap());
    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.client, ClientConfig::default());
    assert!(loaded.logging.enable);

    // an existing file is left alone
    fs::write(&path, "[client]\nmax_total_connections = 7\n").unwrap();
    assert!(!write_config_sample(&path).unwrap());
    assert_eq!(
        load_config_from(&path).unwrap().client.max_total_connections,
        7
    );
    fs::remove_dir_all(&dir).unwrap();
}
