//! Discovery and loading of `jvdeps.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use jvdeps_config::{ConfigDiscovery, ConfigError, ConfigOverrides, LogFormat, discover};
use tempfile::TempDir;

#[test]
fn discovered_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("jvdeps.toml"),
        r#"
[parser]
command = ["java", "-jar", "tools/parser.jar"]
request_timeout_ms = 2500

[resolver]
lock_file = "third_party/maven_install.json"
source_roots = ["src/main/java", "src/test/java"]

[settings]
log_format = "full"
"#,
    )
    .unwrap();

    let config = discover(dir.path()).unwrap();
    assert_eq!(config.parser.command, vec!["java", "-jar", "tools/parser.jar"]);
    assert_eq!(config.parser.request_timeout_ms, 2500);
    assert_eq!(config.parser.shutdown_timeout_ms, 2000);
    assert_eq!(
        config.lock_file(dir.path()),
        Some(dir.path().join("third_party/maven_install.json"))
    );
    assert_eq!(
        config.resolver.source_roots,
        vec![PathBuf::from("src/main/java"), PathBuf::from("src/test/java")]
    );
    assert_eq!(config.settings.log_format, LogFormat::Full);
}

#[test]
fn explicit_file_wins_over_discovery() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("jvdeps.toml"), "[parser]\npool_size = 2\n").unwrap();
    fs::write(dir.path().join("ci.toml"), "[parser]\npool_size = 6\n").unwrap();

    let config = ConfigDiscovery::new(dir.path())
        .load(Some(Path::new("ci.toml")), &ConfigOverrides::default())
        .unwrap();
    assert_eq!(config.parser.pool_size, 6);
}

#[test]
fn wrong_types_are_load_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("jvdeps.toml"), "[parser]\npool_size = \"many\"\n").unwrap();

    let err = discover(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)), "{err}");
}
