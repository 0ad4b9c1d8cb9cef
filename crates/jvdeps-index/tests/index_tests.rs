//! Concurrent population and order independence of the package index.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use jvdeps_index::{Lookup, SourcePackageIndex};
use jvdeps_parser::{ParseResult, SourceFile};
use proptest::prelude::*;

fn declaring(package: &str, name: &str, imports: &[&str]) -> ParseResult {
    ParseResult {
        package: package.to_string(),
        declared_types: vec![name.to_string()],
        imports: imports.iter().map(|s| s.to_string()).collect(),
        ..ParseResult::default()
    }
}

#[test]
fn concurrent_merges_into_shared_directories_lose_nothing() {
    let index = SourcePackageIndex::new();
    let directories = ["pkg/a", "pkg/b", "pkg/c", "pkg/d"];

    std::thread::scope(|scope| {
        for thread in 0..8 {
            let index = &index;
            scope.spawn(move || {
                for i in 0..25 {
                    let directory = directories[(thread + i) % directories.len()];
                    let package = directory.replace('/', ".");
                    let name = format!("T{thread}x{i}");
                    let file = SourceFile::new(
                        format!("{directory}/{name}.java"),
                        format!("package {package}; class {name} {{}}"),
                    );
                    index.record_parse(directory, &file, declaring(&package, &name, &[]));
                }
            });
        }
    });

    assert_eq!(index.len(), 4);
    assert_eq!(index.generation(), 200);

    let declared: usize = directories
        .iter()
        .map(|dir| index.package(Path::new(dir)).unwrap().declared_types.len())
        .sum();
    assert_eq!(declared, 200);

    for thread in 0..8 {
        for i in 0..25 {
            let directory = directories[(thread + i) % directories.len()];
            let symbol = format!("{}.T{thread}x{i}", directory.replace('/', "."));
            assert_eq!(index.lookup(&symbol), Lookup::Found(PathBuf::from(directory)));
        }
    }
    for directory in directories {
        assert!(index.conflicts_in(Path::new(directory)).is_empty());
    }
}

#[test]
fn referenced_symbols_union_every_file() {
    let index = SourcePackageIndex::new();
    let a = SourceFile::new("pkg/a/A.java", "a");
    let b = SourceFile::new("pkg/a/B.java", "b");
    index.record_parse("pkg/a", &a, declaring("pkg.a", "A", &["pkg.b.Foo"]));
    index.record_parse(
        "pkg/a",
        &b,
        ParseResult {
            reflective_references: BTreeSet::from(["org.h2.Driver".to_string()]),
            wildcard_imports: BTreeSet::from(["pkg.c".to_string()]),
            ..declaring("pkg.a", "B", &["com.example.lib.Bar"])
        },
    );

    let symbols = index.all_referenced_symbols(Path::new("pkg/a")).unwrap();
    assert_eq!(symbols.package, "pkg.a");
    assert_eq!(
        symbols.qualified,
        BTreeSet::from(["com.example.lib.Bar".to_string(), "pkg.b.Foo".to_string()])
    );
    assert_eq!(symbols.reflective, BTreeSet::from(["org.h2.Driver".to_string()]));
    assert_eq!(symbols.wildcard_packages, BTreeSet::from(["pkg.c".to_string()]));
}

fn file_strategy() -> impl Strategy<Value = Vec<(usize, String)>> {
    prop::collection::vec((0usize..3, "[A-Z][a-z]{1,6}"), 1..=12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Recording the same files in any order yields the same index.
    #[test]
    fn prop_merge_order_does_not_matter(files in file_strategy(), seed in any::<u64>()) {
        let sources: Vec<(String, SourceFile, ParseResult)> = files
            .iter()
            .enumerate()
            .map(|(n, (dir, name))| {
                let directory = format!("d{dir}");
                let file = SourceFile::new(format!("{directory}/F{n}.java"), format!("{n}{name}"));
                let result = declaring(&directory, name, &[]);
                (directory, file, result)
            })
            .collect();

        let forward = SourcePackageIndex::new();
        for (directory, file, result) in &sources {
            forward.record_parse(directory.as_str(), file, result.clone());
        }

        let mut shuffled: Vec<_> = sources.iter().collect();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();
        let backward = SourcePackageIndex::new();
        for (directory, file, result) in shuffled {
            backward.record_parse(directory.as_str(), file, result.clone());
        }

        prop_assert_eq!(forward.directories(), backward.directories());
        for directory in forward.directories() {
            prop_assert_eq!(forward.conflicts_in(&directory), backward.conflicts_in(&directory));
            let a = forward.package(&directory).unwrap();
            let b = backward.package(&directory).unwrap();
            prop_assert_eq!(a.declared_types, b.declared_types);
            prop_assert_eq!(a.files, b.files);
        }
        for (_, _, result) in &sources {
            for symbol in result.qualified_declared_types() {
                prop_assert_eq!(forward.lookup(&symbol), backward.lookup(&symbol));
            }
        }
    }
}
