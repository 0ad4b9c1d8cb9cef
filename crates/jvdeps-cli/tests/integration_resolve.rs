//! End-to-end tests for the resolve and parse commands, using the in-process
//! scanner and real files.

use std::fs;
use std::path::{Path, PathBuf};

use jvdeps_cli::CliError;
use jvdeps_cli::cli::{ParseArgs, ResolveArgs};
use jvdeps_cli::commands::{CommandContext, parse, resolve};
use jvdeps_config::JvdepsConfig;
use jvdeps_resolve::UnitKind;
use tempfile::TempDir;

const LOCK: &str = r#"{
  "version": 1,
  "repository": "maven",
  "artifacts": [
    {"coordinate": "com.example:lib:1.0",
     "label": "@maven//:com_example_lib",
     "classes": ["com.example.lib.Bar"]}
  ]
}"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "maven_install.json", LOCK);
    write(
        root,
        "pkg/a/A.java",
        "package pkg.a;\nimport pkg.b.Foo;\nimport com.example.lib.Bar;\npublic class A { Foo f; Bar b; }\n",
    );
    write(root, "pkg/b/Foo.java", "package pkg.b;\npublic class Foo {}\n");
    write(
        root,
        "pkg/c/C.java",
        "package pkg.c;\nimport com.unknown.Baz;\nclass C { Baz baz; }\n",
    );
    write(root, "bazel-out/gen/Gen.java", "package gen; class Gen {}\n");
    dir
}

fn context(root: &Path) -> CommandContext {
    let mut config = JvdepsConfig::default();
    config.resolver.lock_file = Some(PathBuf::from("maven_install.json"));
    CommandContext::new(root, config)
}

fn args() -> ResolveArgs {
    ResolveArgs {
        lock_file: None,
        units: vec![],
        json: None,
        strict: false,
        in_process: true,
        jobs: None,
        worker_log: None,
    }
}

#[tokio::test]
async fn resolves_discovered_units() {
    let dir = workspace();
    let report = resolve::run(&context(dir.path()), &args()).await.unwrap();

    let directories: Vec<_> = report.units.iter().map(|u| u.directory().to_path_buf()).collect();
    assert_eq!(
        directories,
        vec![PathBuf::from("pkg/a"), PathBuf::from("pkg/b"), PathBuf::from("pkg/c")]
    );

    let a = report
        .resolved()
        .find(|unit| unit.directory == Path::new("pkg/a"))
        .unwrap();
    let deps: Vec<_> = a.deps.iter().map(|l| l.as_str()).collect();
    assert_eq!(deps, vec!["//pkg/b:b", "@maven//:com_example_lib"]);
    assert_eq!(report.unresolved(), 1);
}

#[tokio::test]
async fn unit_flag_limits_resolution() {
    let dir = workspace();
    let mut args = args();
    args.units = vec![PathBuf::from("pkg/b")];

    let report = resolve::run(&context(dir.path()), &args).await.unwrap();
    assert_eq!(report.units.len(), 1);
    assert_eq!(report.units[0].directory(), Path::new("pkg/b"));
}

#[tokio::test]
async fn generated_and_test_roots_change_what_is_emitted() {
    let dir = workspace();
    let root = dir.path();
    write(root, "gen/proto/Msg.java", "package gen.proto;\npublic class Msg {}\n");
    write(
        root,
        "test/pkg/a/ATest.java",
        "package pkg.a;\nimport gen.proto.Msg;\nclass ATest { A a; Msg m; }\n",
    );

    let mut config = JvdepsConfig::default();
    config.resolver.lock_file = Some(PathBuf::from("maven_install.json"));
    config.resolver.test_roots = vec!["test".into()];
    config.resolver.generated_roots = vec!["gen".into()];
    let report = resolve::run(&CommandContext::new(root, config), &args()).await.unwrap();

    let directories: Vec<_> = report.units.iter().map(|u| u.directory().to_path_buf()).collect();
    assert_eq!(
        directories,
        vec![
            PathBuf::from("pkg/a"),
            PathBuf::from("pkg/b"),
            PathBuf::from("pkg/c"),
            PathBuf::from("test/pkg/a"),
        ]
    );

    let test_unit = report
        .resolved()
        .find(|unit| unit.directory == Path::new("test/pkg/a"))
        .unwrap();
    assert_eq!(test_unit.kind, UnitKind::Test);
    let deps: Vec<_> = test_unit.deps.iter().map(|l| l.as_str()).collect();
    assert_eq!(deps, vec!["//gen/proto:proto", "//pkg/a:a"]);
}

#[tokio::test]
async fn unreadable_generated_sources_are_not_reported() {
    let dir = workspace();
    let root = dir.path();
    let generated = root.join("gen/proto/Msg.java");
    fs::create_dir_all(generated.parent().unwrap()).unwrap();
    fs::write(&generated, b"package gen.proto;\n\xff class Msg {}\n").unwrap();

    let mut config = JvdepsConfig::default();
    config.resolver.lock_file = Some(PathBuf::from("maven_install.json"));
    config.resolver.generated_roots = vec!["gen".into()];
    let report = resolve::run(&CommandContext::new(root, config), &args()).await.unwrap();

    let directories: Vec<_> = report.units.iter().map(|u| u.directory().to_path_buf()).collect();
    assert_eq!(
        directories,
        vec![PathBuf::from("pkg/a"), PathBuf::from("pkg/b"), PathBuf::from("pkg/c")]
    );
    assert_eq!(report.skipped(), 0);
}

#[tokio::test]
async fn json_report_is_written() {
    let dir = workspace();
    let out = dir.path().join("report.json");
    let mut args = args();
    args.json = Some(out.clone());

    resolve::execute(&context(dir.path()), args).await.unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
    let units = json["units"].as_array().unwrap();
    assert_eq!(units.len(), 3);
    assert_eq!(units[0]["status"], "resolved");
    assert_eq!(units[0]["label"], "//pkg/a:a");
    assert_eq!(units[2]["report"]["unresolved"][0], "com.unknown.Baz");
}

#[tokio::test]
async fn strict_mode_fails_on_unresolved_symbols() {
    let dir = workspace();
    let mut args = args();
    args.strict = true;

    let err = resolve::execute(&context(dir.path()), args).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Strict {
            unresolved: 1,
            ambiguities: 0,
            skipped: 0
        }
    ));
}

#[tokio::test]
async fn missing_lock_file_is_fatal() {
    let dir = workspace();
    let mut config = JvdepsConfig::default();
    config.resolver.lock_file = Some(PathBuf::from("nope.json"));

    let err = resolve::run(&CommandContext::new(dir.path(), config), &args())
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Coordinates(_)));
}

#[tokio::test]
async fn parse_prints_structural_facts() {
    let dir = workspace();
    let args = ParseArgs {
        file: dir.path().join("pkg/a/A.java"),
        in_process: true,
    };

    let parsed = parse::parse_file(&context(dir.path()), &args).await.unwrap();
    assert_eq!(parsed.package, "pkg.a");
    assert_eq!(parsed.declared_types, vec!["A".to_string()]);
    assert!(parsed.imports.contains("pkg.b.Foo"));
}
