//! The configuration document and its conversion into runtime options.

use std::path::{Path, PathBuf};
use std::time::Duration;

use jvdeps_parser::{
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_SHUTDOWN_TIMEOUT, PoolOptions, WorkerCommand,
    default_pool_size,
};
use jvdeps_resolve::{DEFAULT_JDK_PREFIXES, JdkPlatform, ResolverOptions, RuntimeHeuristic};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::settings::GlobalSettings;

/// File name looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = "jvdeps.toml";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "JVDEPS_";

/// Program name of the reference parser worker.
pub const DEFAULT_WORKER_PROGRAM: &str = "jvdeps-parser-worker";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JvdepsConfig {
    #[serde(default)]
    pub parser: ParserSection,

    #[serde(default)]
    pub resolver: ResolverSection,

    #[serde(default)]
    pub settings: GlobalSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    /// Worker argv; the first element is the program.
    pub command: Vec<String>,
    pub pool_size: usize,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
    /// Log filter handed to each worker process, separate from jvdeps' own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            command: vec![DEFAULT_WORKER_PROGRAM.to_string()],
            pool_size: default_pool_size(),
            request_timeout_ms: millis(DEFAULT_REQUEST_TIMEOUT),
            shutdown_timeout_ms: millis(DEFAULT_SHUTDOWN_TIMEOUT),
            log_level: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSection {
    /// Maven lock file; relative paths are taken from the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_file: Option<PathBuf>,
    pub jdk_prefixes: Vec<String>,
    /// Directories scanned for units, relative to the workspace root.
    pub source_roots: Vec<PathBuf>,
    /// Roots whose units are tests.
    pub test_roots: Vec<PathBuf>,
    /// Roots of generated sources: indexed for lookups, never emitted.
    pub generated_roots: Vec<PathBuf>,
    /// Directories resolved as one unit each, covering every package below.
    pub modules: Vec<PathBuf>,
    /// Directory names never descended into.
    pub exclude: Vec<String>,
    pub runtime: RuntimeSection,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            lock_file: None,
            jdk_prefixes: DEFAULT_JDK_PREFIXES.iter().map(|p| p.to_string()).collect(),
            source_roots: vec![PathBuf::from(".")],
            test_roots: Vec::new(),
            generated_roots: Vec::new(),
            modules: Vec::new(),
            exclude: [".git", "bazel-out", "target", "build"]
                .into_iter()
                .map(String::from)
                .collect(),
            runtime: RuntimeSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSection {
    /// Resolve `Class.forName("...")`-style string literals as runtime deps.
    pub reflection: bool,
    /// Regexes of fully-qualified names that are always runtime-only.
    pub patterns: Vec<String>,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            reflection: true,
            patterns: Vec::new(),
        }
    }
}

/// Command-line values layered over every other source. Unset fields leave
/// the lower layers untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "ParserOverrides::is_empty")]
    pub parser: ParserOverrides,

    #[serde(skip_serializing_if = "ResolverOverrides::is_empty")]
    pub resolver: ResolverOverrides,

    #[serde(skip_serializing_if = "SettingsOverrides::is_empty")]
    pub settings: SettingsOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParserOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl ParserOverrides {
    fn is_empty(&self) -> bool {
        self.command.is_none() && self.pool_size.is_none() && self.log_level.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolverOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_file: Option<PathBuf>,
}

impl ResolverOverrides {
    fn is_empty(&self) -> bool {
        self.lock_file.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl SettingsOverrides {
    fn is_empty(&self) -> bool {
        self.log_level.is_none()
    }
}

impl JvdepsConfig {
    /// Parse a TOML document layered over the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        use figment::Figment;
        use figment::providers::{Format as _, Serialized, Toml};

        Ok(Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(source))
            .extract()?)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn worker_command(&self) -> Result<WorkerCommand> {
        let command = WorkerCommand::from_argv(&self.parser.command)
            .map_err(|err| ConfigError::invalid("parser.command", err.to_string()))?;
        Ok(match &self.parser.log_level {
            Some(level) => command.log_level(level.as_str()),
            None => command,
        })
    }

    pub fn pool_options(&self) -> Result<PoolOptions> {
        Ok(PoolOptions::new(self.worker_command()?)
            .pool_size(self.parser.pool_size)
            .request_timeout(Duration::from_millis(self.parser.request_timeout_ms))
            .shutdown_timeout(Duration::from_millis(self.parser.shutdown_timeout_ms)))
    }

    pub fn resolver_options(&self) -> Result<ResolverOptions> {
        let runtime = &self.resolver.runtime;
        let heuristic = RuntimeHeuristic::new(runtime.reflection, &runtime.patterns)
            .map_err(|source| {
                // RegexSet does not say which pattern failed.
                let pattern = runtime
                    .patterns
                    .iter()
                    .find(|p| regex::Regex::new(p).is_err())
                    .cloned()
                    .unwrap_or_default();
                ConfigError::InvalidPattern { pattern, source }
            })?;

        Ok(ResolverOptions {
            jdk: JdkPlatform::new(self.resolver.jdk_prefixes.iter().cloned()),
            runtime: heuristic,
        })
    }

    /// The lock file, anchored at `root` when relative.
    pub fn lock_file(&self, root: &Path) -> Option<PathBuf> {
        self.resolver.lock_file.as_ref().map(|path| root.join(path))
    }

    /// Source roots anchored at `root`.
    pub fn source_roots(&self, root: &Path) -> Vec<PathBuf> {
        anchored(root, &self.resolver.source_roots)
    }

    pub fn test_roots(&self, root: &Path) -> Vec<PathBuf> {
        anchored(root, &self.resolver.test_roots)
    }

    pub fn generated_roots(&self, root: &Path) -> Vec<PathBuf> {
        anchored(root, &self.resolver.generated_roots)
    }

    pub fn is_excluded(&self, directory_name: &str) -> bool {
        self.resolver.exclude.iter().any(|name| name == directory_name)
    }
}

fn anchored(root: &Path, paths: &[PathBuf]) -> Vec<PathBuf> {
    paths.iter().map(|path| root.join(path)).collect()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_only_what_it_names() {
        let config = JvdepsConfig::from_toml_str(
            r#"
[parser]
pool_size = 3

[resolver.runtime]
patterns = ["\\.Driver$"]
"#,
        )
        .unwrap();

        assert_eq!(config.parser.pool_size, 3);
        assert_eq!(config.parser.command, vec!["jvdeps-parser-worker".to_string()]);
        assert_eq!(config.parser.request_timeout_ms, 10_000);
        assert!(config.resolver.runtime.reflection);
        assert_eq!(config.resolver.runtime.patterns, vec![r"\.Driver$".to_string()]);
    }

    #[test]
    fn converts_into_pool_options() {
        let mut config = JvdepsConfig::default();
        config.parser.command = vec!["java".into(), "-jar".into(), "parser.jar".into()];
        config.parser.pool_size = 2;
        config.parser.request_timeout_ms = 500;

        let options = config.pool_options().unwrap();
        assert_eq!(options.command.program(), "java");
        assert_eq!(options.command.args(), ["-jar", "parser.jar"]);
        assert_eq!(options.pool_size, 2);
        assert_eq!(options.request_timeout, Duration::from_millis(500));
        assert_eq!(options.shutdown_timeout, Duration::from_secs(2));
        assert!(options.command.envs().is_empty());
    }

    #[test]
    fn worker_log_level_reaches_the_command() {
        let config = JvdepsConfig::from_toml_str("[parser]\nlog_level = \"debug\"\n").unwrap();
        let command = config.worker_command().unwrap();
        assert_eq!(
            command.envs(),
            [(jvdeps_parser::WORKER_LOG_ENV.to_string(), "debug".to_string())]
        );
    }

    #[test]
    fn converts_into_resolver_options() {
        let mut config = JvdepsConfig::default();
        config.resolver.jdk_prefixes = vec!["java.".into()];
        config.resolver.runtime.patterns = vec![r"^org\.slf4j\.impl\.".into()];

        let options = config.resolver_options().unwrap();
        assert!(options.jdk.provides("java.util.List"));
        assert!(!options.jdk.provides("javax.inject.Inject"));
        assert!(options.runtime.is_runtime_only("org.slf4j.impl.StaticLoggerBinder"));
    }

    #[test]
    fn bad_pattern_is_named() {
        let mut config = JvdepsConfig::default();
        config.resolver.runtime.patterns = vec!["ok".into(), "(unclosed".into()];

        match config.resolver_options() {
            Err(ConfigError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn paths_are_anchored_at_the_workspace_root() {
        let mut config = JvdepsConfig::default();
        config.resolver.lock_file = Some("maven_install.json".into());

        let root = Path::new("/work");
        assert_eq!(config.lock_file(root), Some(PathBuf::from("/work/maven_install.json")));
        assert_eq!(config.source_roots(root), vec![PathBuf::from("/work/.")]);
        assert!(config.test_roots(root).is_empty());
        assert!(config.generated_roots(root).is_empty());
        assert!(config.is_excluded("bazel-out"));
        assert!(!config.is_excluded("src"));
    }
}
