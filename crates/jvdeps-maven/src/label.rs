use std::fmt;

use serde::Serialize;

use crate::coordinate::Coordinate;

/// An opaque build target identifier, e.g. `//pkg/b:b` or
/// `@maven//:com_example_lib`.
///
/// Ordering is plain string ordering, which is what makes sorted label lists
/// reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Wrap `label` if it looks like a Bazel label (`//...` or `@...//...`).
    pub fn parse(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        let well_formed = !label.contains(char::is_whitespace)
            && (label.starts_with("//")
                || (label.starts_with('@') && label.contains("//")));
        well_formed.then_some(Self(label))
    }

    /// Build a label without checking its shape.
    pub fn new_unchecked(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The rules_jvm_external label for `coordinate` in `repository`:
    /// `@repo//:group_artifact`, every non-alphanumeric character mapped
    /// to `_`.
    pub fn for_coordinate(repository: &str, coordinate: &Coordinate) -> Self {
        let mut target = format!("{}_{}", coordinate.group, coordinate.artifact);
        if let Some(classifier) = &coordinate.classifier {
            target.push('_');
            target.push_str(classifier);
        }
        let target: String = target
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        Self(format!("@{repository}//:{target}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_rules_jvm_external_names() {
        let coordinate: Coordinate = "com.google.guava:guava:33.0.0-jre".parse().unwrap();
        assert_eq!(
            Label::for_coordinate("maven", &coordinate).as_str(),
            "@maven//:com_google_guava_guava"
        );

        let classified: Coordinate = "io.netty:netty-transport-native-epoll:jar:linux-x86_64:4.1.0"
            .parse()
            .unwrap();
        assert_eq!(
            Label::for_coordinate("maven", &classified).as_str(),
            "@maven//:io_netty_netty_transport_native_epoll_linux_x86_64"
        );
    }

    #[test]
    fn parse_accepts_only_label_shapes() {
        assert!(Label::parse("//pkg/b:b").is_some());
        assert!(Label::parse("@maven//:com_example_lib").is_some());
        assert!(Label::parse("com_example_lib").is_none());
        assert!(Label::parse("@maven:lib").is_none());
        assert!(Label::parse("//pkg b").is_none());
    }
}
