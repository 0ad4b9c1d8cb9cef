//! Finding `jvdeps.toml` and layering it with the environment.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use tracing::debug;

use crate::config::{CONFIG_FILE_NAME, ConfigOverrides, ENV_PREFIX, JvdepsConfig};
use crate::error::{ConfigError, Result};

/// Loads configuration for one workspace root.
///
/// ```no_run
/// use jvdeps_config::{ConfigDiscovery, ConfigOverrides};
///
/// let discovery = ConfigDiscovery::new("/path/to/workspace");
/// let config = discovery.load(None, &ConfigOverrides::default()).unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `jvdeps.toml` in the root, if present.
    pub fn find(&self) -> Option<PathBuf> {
        let path = self.root.join(CONFIG_FILE_NAME);
        path.is_file().then_some(path)
    }

    /// The layered provider stack, without extracting.
    ///
    /// An explicit `config_file` must exist; otherwise the discovered file
    /// is used when there is one.
    pub fn figment(&self, config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(JvdepsConfig::default()));

        let file = match config_file {
            Some(path) => {
                let path = self.root.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path));
                }
                Some(path)
            }
            None => self.find(),
        };

        if let Some(path) = file {
            debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Toml::file_exact(path));
        }

        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides)))
    }

    pub fn load(&self, config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<JvdepsConfig> {
        Ok(self.figment(config_file, overrides)?.extract()?)
    }
}

/// Load the configuration for `root` with no explicit file or overrides.
pub fn discover(root: impl AsRef<Path>) -> Result<JvdepsConfig> {
    ConfigDiscovery::new(root).load(None, &ConfigOverrides::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_without_a_file() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn find_ignores_directories_with_the_config_name() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigDiscovery::new(dir.path())
            .load(Some(Path::new("nope.toml")), &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(path) if path.ends_with("nope.toml")));
    }
}
