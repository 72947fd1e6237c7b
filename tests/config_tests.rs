// Config loading and validation tests

use hostpulse::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 3001
host = "0.0.0.0"

[publishing]
broadcast_capacity = 60

[monitoring]
sample_interval_ms = 1000
stats_log_interval_secs = 300

[docker]
log_tail_lines = 100
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 3001);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.publishing.broadcast_capacity, 60);
    assert_eq!(config.monitoring.sample_interval_ms, 1000);
    assert_eq!(config.monitoring.stats_log_interval_secs, 300);
    assert_eq!(config.docker.log_tail_lines, 100);
}

#[test]
fn test_config_docker_section_optional_with_default_tail() {
    let without_docker = VALID_CONFIG.replace("[docker]\nlog_tail_lines = 100\n", "");
    let config = AppConfig::load_from_str(&without_docker).expect("load_from_str");
    assert_eq!(config.docker.log_tail_lines, 100);
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 3001", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_zero_broadcast_capacity() {
    let bad = VALID_CONFIG.replace("broadcast_capacity = 60", "broadcast_capacity = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("broadcast_capacity"));
}

#[test]
fn test_config_validation_rejects_zero_sample_interval() {
    let bad = VALID_CONFIG.replace("sample_interval_ms = 1000", "sample_interval_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("sample_interval_ms"));
}

#[test]
fn test_config_validation_rejects_zero_log_tail() {
    let bad = VALID_CONFIG.replace("log_tail_lines = 100", "log_tail_lines = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("log_tail_lines"));
}

#[test]
fn test_config_rejects_missing_section() {
    let bad = VALID_CONFIG.replace("[monitoring]", "[monitoring_typo]");
    assert!(AppConfig::load_from_str(&bad).is_err());
}
