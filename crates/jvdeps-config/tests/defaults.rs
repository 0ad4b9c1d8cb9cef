//! Built-in defaults.

use jvdeps_config::{GlobalSettings, JvdepsConfig, LogFormat};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn parser_defaults() {
    let config = JvdepsConfig::default();
    assert_eq!(config.parser.command, vec!["jvdeps-parser-worker".to_string()]);
    assert!(config.parser.pool_size >= 1);
    assert!(config.parser.pool_size <= 8);
    assert_eq!(config.parser.request_timeout_ms, 10_000);
    assert_eq!(config.parser.shutdown_timeout_ms, 2_000);
    assert!(config.parser.log_level.is_none());
}

#[test]
fn resolver_defaults() {
    let config = JvdepsConfig::default();
    assert!(config.resolver.lock_file.is_none());
    assert_eq!(config.resolver.source_roots, vec![PathBuf::from(".")]);
    assert!(config.resolver.test_roots.is_empty());
    assert!(config.resolver.generated_roots.is_empty());
    assert!(config.resolver.modules.is_empty());
    assert_eq!(config.resolver.exclude, vec![".git", "bazel-out", "target", "build"]);
    assert!(config.resolver.jdk_prefixes.iter().any(|p| p == "java."));
    assert!(config.resolver.runtime.reflection);
    assert!(config.resolver.runtime.patterns.is_empty());
}

#[test]
fn settings_defaults() {
    let settings = GlobalSettings::default();
    assert!(settings.log_level.is_none());
    assert_eq!(settings.log_format, LogFormat::Compact);
}

#[test]
fn defaults_validate_and_convert() {
    let config = JvdepsConfig::default();
    config.validate().unwrap();

    let pool = config.pool_options().unwrap();
    assert_eq!(pool.command.program(), "jvdeps-parser-worker");
    assert_eq!(pool.request_timeout, Duration::from_secs(10));

    let resolver = config.resolver_options().unwrap();
    assert!(resolver.runtime.detects_reflection());
    assert!(resolver.jdk.provides("javax.annotation.Nullable"));
}

#[test]
fn effective_config_renders_as_toml() {
    let rendered = JvdepsConfig::default().to_toml_string().unwrap();
    let reparsed = JvdepsConfig::from_toml_str(&rendered).unwrap();
    assert_eq!(reparsed, JvdepsConfig::default());
    assert!(rendered.contains("[parser]"));
    assert!(rendered.contains("[resolver.runtime]"));
}

#[test]
fn empty_document_is_all_defaults() {
    assert_eq!(JvdepsConfig::from_toml_str("").unwrap(), JvdepsConfig::default());
}
