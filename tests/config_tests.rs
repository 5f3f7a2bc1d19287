// tests/config_tests.rs

use std::path::{Path, PathBuf};

use log::LevelFilter;
use tablinq::config::{self, Config, ConfigError};

#[test]
fn test_empty_config_uses_defaults() {
    let config: Config = "".parse().unwrap();
    assert!(config.query.pushdown);
    assert_eq!(config.log.level, "warn");
    assert_eq!(config.source.data, None);
    assert_eq!(config.level_filter().unwrap(), LevelFilter::Warn);
    assert!(config.query_options().pushdown);
}

#[test]
fn test_full_config() {
    let text = r#"
[query]
pushdown = false

[log]
level = "DEBUG"

[source]
data = "people.json"
table = "people"
partition = "nl"
"#;
    let config: Config = text.parse().unwrap();
    assert!(!config.query_options().pushdown);
    assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    assert_eq!(config.source.data, Some(PathBuf::from("people.json")));
    assert_eq!(config.source.table.as_deref(), Some("people"));
    assert_eq!(config.source.partition.as_deref(), Some("nl"));
}

#[test]
fn test_partial_section_keeps_defaults() {
    let config: Config = "[log]\nlevel = \"trace\"\n".parse().unwrap();
    assert!(config.query.pushdown);
    assert_eq!(config.level_filter().unwrap(), LevelFilter::Trace);
}

#[test]
fn test_invalid_level() {
    match "[log]\nlevel = \"loud\"\n".parse::<Config>() {
        Err(ConfigError::LogLevel(level)) => assert_eq!(level, "loud"),
        other => panic!("Expected log level error, got {:?}", other),
    }
    assert!(config::parse_level("off").is_ok());
}

#[test]
fn test_invalid_toml() {
    assert!(matches!(
        "[query\npushdown = true".parse::<Config>(),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        "[query]\npushdown = \"yes\"".parse::<Config>(),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_file() {
    let path = Path::new("/nonexistent/tq.toml");
    match Config::load(path) {
        Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("Expected io error, got {:?}", other),
    }
}
