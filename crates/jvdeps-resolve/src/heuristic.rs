//! Deciding which coordinate matches are runtime-only.

use regex::RegexSet;

/// Configurable rule for `runtime_deps` classification.
///
/// A coordinate match is `Runtime` when the symbol was reached only through
/// a reflective string literal (if `reflection` is on), or when it matches
/// one of `patterns`. Everything else is `Compile`.
#[derive(Debug, Clone)]
pub struct RuntimeHeuristic {
    reflection: bool,
    patterns: RegexSet,
}

impl Default for RuntimeHeuristic {
    fn default() -> Self {
        Self {
            reflection: true,
            patterns: RegexSet::empty(),
        }
    }
}

impl RuntimeHeuristic {
    pub fn new<I, S>(reflection: bool, patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            reflection,
            patterns: RegexSet::new(patterns)?,
        })
    }

    /// Whether reflective string references are resolved at all.
    pub fn detects_reflection(&self) -> bool {
        self.reflection
    }

    /// Whether `symbol` is configured as always runtime-only.
    pub fn is_runtime_only(&self, symbol: &str) -> bool {
        self.patterns.is_match(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_mark_symbols_runtime_only() {
        let heuristic = RuntimeHeuristic::new(true, [r"^org\.slf4j\.impl\.", r"\.Driver$"]).unwrap();
        assert!(heuristic.is_runtime_only("org.slf4j.impl.StaticLoggerBinder"));
        assert!(heuristic.is_runtime_only("org.postgresql.Driver"));
        assert!(!heuristic.is_runtime_only("org.slf4j.Logger"));
    }

    #[test]
    fn default_detects_reflection_only() {
        let heuristic = RuntimeHeuristic::default();
        assert!(heuristic.detects_reflection());
        assert!(!heuristic.is_runtime_only("anything.At.All"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(RuntimeHeuristic::new(true, ["("]).is_err());
    }
}
