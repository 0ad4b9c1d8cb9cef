//! Structural facts extracted from one Java file.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Everything the dependency resolver needs to know about one source file.
///
/// Field names are camelCase on the wire so workers written in other
/// languages can emit them directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// Declared package (`a.b.c`), empty for the default package.
    #[serde(default)]
    pub package: String,

    /// Top-level type names in declaration order.
    #[serde(default)]
    pub declared_types: Vec<String>,

    /// Explicitly imported symbols, normalised to their top-level type.
    #[serde(default)]
    pub imports: BTreeSet<String>,

    /// Packages imported with `import a.b.*`.
    #[serde(default)]
    pub wildcard_imports: BTreeSet<String>,

    /// Fully-qualified names written inline in the body (`new a.b.C()`).
    #[serde(default)]
    pub qualified_references: BTreeSet<String>,

    /// Simple type names used but neither declared nor imported.
    #[serde(default)]
    pub simple_names: BTreeSet<String>,

    /// Class names only referenced through strings (`Class.forName("a.b.C")`).
    #[serde(default)]
    pub reflective_references: BTreeSet<String>,
}

impl ParseResult {
    /// Qualify `name` with this file's package.
    pub fn qualify(&self, name: &str) -> String {
        qualify(&self.package, name)
    }

    /// Fully-qualified names of the declared top-level types.
    pub fn qualified_declared_types(&self) -> impl Iterator<Item = String> + '_ {
        self.declared_types.iter().map(|name| self.qualify(name))
    }
}

/// Join a package and a simple name, honouring the default package.
pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifies_declared_types() {
        let result = ParseResult {
            package: "pkg.b".to_string(),
            declared_types: vec!["Foo".to_string(), "FooHelper".to_string()],
            ..ParseResult::default()
        };

        let qualified: Vec<_> = result.qualified_declared_types().collect();
        assert_eq!(qualified, vec!["pkg.b.Foo", "pkg.b.FooHelper"]);
    }

    #[test]
    fn default_package_is_unqualified() {
        assert_eq!(qualify("", "Main"), "Main");
    }

    #[test]
    fn wire_format_is_camel_case_and_lenient() {
        let parsed: ParseResult =
            serde_json::from_str(r#"{"package":"a","declaredTypes":["A"]}"#).unwrap();
        assert_eq!(parsed.declared_types, vec!["A"]);
        assert!(parsed.imports.is_empty());

        let json = serde_json::to_value(&parsed).unwrap();
        assert!(json.get("simpleNames").is_some());
        assert!(json.get("simple_names").is_none());
    }
}
