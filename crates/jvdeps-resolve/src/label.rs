//! Translating source directories into build labels.

use std::path::{Component, Path};

use jvdeps_maven::Label;

/// Supplied by the build-file generator: the label of the rule it will emit
/// for a source directory.
pub trait LabelLookup: Send + Sync {
    fn label_for(&self, directory: &Path) -> Label;
}

impl<F> LabelLookup for F
where
    F: Fn(&Path) -> Label + Send + Sync,
{
    fn label_for(&self, directory: &Path) -> Label {
        self(directory)
    }
}

/// `//pkg/b:b` for `pkg/b`; `//:root` for the workspace root.
#[derive(Debug, Clone, Copy, Default)]
pub struct BazelConvention;

impl LabelLookup for BazelConvention {
    fn label_for(&self, directory: &Path) -> Label {
        let segments: Vec<String> = directory
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        match segments.last() {
            None => Label::new_unchecked("//:root"),
            Some(name) => Label::new_unchecked(format!("//{}:{name}", segments.join("/"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bazel_convention_names_target_after_directory() {
        assert_eq!(BazelConvention.label_for(Path::new("pkg/b")).as_str(), "//pkg/b:b");
        assert_eq!(
            BazelConvention.label_for(Path::new("./src/main/java/com/x")).as_str(),
            "//src/main/java/com/x:x"
        );
        assert_eq!(BazelConvention.label_for(Path::new("")).as_str(), "//:root");
    }

    #[test]
    fn closures_are_lookups() {
        let lookup = |dir: &Path| Label::new_unchecked(format!("//custom/{}:lib", dir.display()));
        assert_eq!(lookup.label_for(Path::new("a")).as_str(), "//custom/a:lib");
    }
}
