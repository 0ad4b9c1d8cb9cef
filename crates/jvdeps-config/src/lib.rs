//! Layered configuration for jvdeps.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults ([`JvdepsConfig::default`])
//! 2. `jvdeps.toml` in the workspace root, or an explicit file
//! 3. `JVDEPS_`-prefixed environment variables, `__` separating sections
//!    (`JVDEPS_PARSER__POOL_SIZE=4`)
//! 4. Command-line overrides ([`ConfigOverrides`])
//!
//! ```no_run
//! use jvdeps_config::{ConfigDiscovery, ConfigOverrides};
//!
//! let config = ConfigDiscovery::new(".").load(None, &ConfigOverrides::default()).unwrap();
//! config.validate().unwrap();
//! let pool = config.pool_options().unwrap();
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod settings;
pub mod validation;

pub use config::*;
pub use discovery::{ConfigDiscovery, discover};
pub use error::*;
pub use settings::*;
