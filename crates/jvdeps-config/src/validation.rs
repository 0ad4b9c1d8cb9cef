//! Schema checks run after every layer has been merged.

use regex::Regex;

use crate::config::JvdepsConfig;
use crate::error::{ConfigError, Result};

impl JvdepsConfig {
    /// Reject values that would only fail later, mid-run.
    pub fn validate(&self) -> Result<()> {
        let parser = &self.parser;
        match parser.command.first() {
            None => return Err(ConfigError::invalid("parser.command", "must name a program")),
            Some(program) if program.trim().is_empty() => {
                return Err(ConfigError::invalid("parser.command", "program cannot be blank"));
            }
            Some(_) => {}
        }
        if parser.pool_size == 0 {
            return Err(ConfigError::invalid("parser.pool_size", "must be at least 1"));
        }
        if parser.request_timeout_ms == 0 {
            return Err(ConfigError::invalid("parser.request_timeout_ms", "must be non-zero"));
        }
        if parser.shutdown_timeout_ms == 0 {
            return Err(ConfigError::invalid("parser.shutdown_timeout_ms", "must be non-zero"));
        }
        if parser.log_level.as_deref().is_some_and(|level| level.trim().is_empty()) {
            return Err(ConfigError::invalid("parser.log_level", "cannot be blank"));
        }

        let resolver = &self.resolver;
        if resolver.source_roots.is_empty() {
            return Err(ConfigError::invalid("resolver.source_roots", "at least one root is required"));
        }
        if let Some(root) = resolver
            .generated_roots
            .iter()
            .find(|root| resolver.source_roots.contains(root) || resolver.test_roots.contains(root))
        {
            return Err(ConfigError::invalid(
                "resolver.generated_roots",
                format!("{} is also a source or test root", root.display()),
            ));
        }
        if let Some(root) = resolver.test_roots.iter().find(|root| resolver.source_roots.contains(root)) {
            return Err(ConfigError::invalid(
                "resolver.test_roots",
                format!("{} is also a source root", root.display()),
            ));
        }
        if resolver.jdk_prefixes.iter().any(|prefix| prefix.trim().is_empty()) {
            return Err(ConfigError::invalid("resolver.jdk_prefixes", "prefixes cannot be empty"));
        }
        for pattern in &resolver.runtime.patterns {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        Ok(())
    }
}
