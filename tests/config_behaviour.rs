// tests/config_behaviour.rs

use std::fs;
use std::path::PathBuf;

use modwatch::config::loader::load_and_validate;
use modwatch::config::model::ConfigFile;
use modwatch::config::validate::validate_config;
use tempfile::tempdir;

fn parse(toml_str: &str) -> ConfigFile {
    toml::from_str(toml_str).expect("config parses")
}

#[test]
fn minimal_config_gets_defaults() {
    let cfg = parse(
        r#"
[watch]
dirs = ["views"]

[build]
generator = "viewc"
"#,
    );

    assert_eq!(cfg.watch.dirs, [PathBuf::from("views")]);
    assert_eq!(cfg.watch.source_ext, "csp");
    assert!(cfg.watch.exclude.is_empty());
    assert_eq!(cfg.build.compiler, "g++");
    assert_eq!(cfg.build.gen_ext, "cc");
    assert_eq!(cfg.build.module_ext, "so");
    assert_eq!(cfg.build.extra_flags, ["--no-gnu-unique"]);
    assert!(cfg.build.output_dir.is_none());
    assert_eq!(cfg.reload.interval_secs, 5.0);
    assert_eq!(cfg.reload.lock_release_secs, 3.5);

    validate_config(&cfg).unwrap();
}

#[test]
fn full_config_parses() {
    let cfg = parse(
        r#"
[watch]
dirs = ["views", "admin/views"]
source_ext = "tpl"
exclude = ["*tmp*", "draft-*"]

[build]
generator = "tplgen"
compiler = "clang++"
flags = ["-std=c++20", "-O1"]
include_dirs = ["include", "/usr/local/include"]
extra_flags = []
output_dir = "build/modules"
gen_ext = "cpp"
module_ext = "dylib"

[reload]
interval_secs = 1.5
lock_release_secs = 0.5
"#,
    );

    assert_eq!(cfg.watch.dirs.len(), 2);
    assert_eq!(cfg.watch.source_ext, "tpl");
    assert_eq!(cfg.watch.exclude, ["*tmp*", "draft-*"]);
    assert_eq!(cfg.build.generator, "tplgen");
    assert_eq!(cfg.build.compiler, "clang++");
    assert_eq!(cfg.build.flags, ["-std=c++20", "-O1"]);
    assert_eq!(cfg.build.include_dirs.len(), 2);
    assert!(cfg.build.extra_flags.is_empty());
    assert_eq!(cfg.build.output_dir, Some(PathBuf::from("build/modules")));
    assert_eq!(cfg.build.gen_ext, "cpp");
    assert_eq!(cfg.build.module_ext, "dylib");
    assert_eq!(cfg.reload.interval_secs, 1.5);
    assert_eq!(cfg.reload.lock_release_secs, 0.5);

    validate_config(&cfg).unwrap();
}

#[test]
fn empty_watch_dirs_are_rejected() {
    let cfg = parse("[build]\ngenerator = \"viewc\"\n");
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn missing_generator_is_rejected() {
    let cfg = parse("[watch]\ndirs = [\"views\"]\n");
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn dotted_extensions_are_rejected() {
    let cfg = parse(
        r#"
[watch]
dirs = ["views"]
source_ext = ".csp"

[build]
generator = "viewc"
"#,
    );
    let err = validate_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("source_ext"));
}

#[test]
fn non_positive_interval_is_rejected() {
    let cfg = parse(
        r#"
[watch]
dirs = ["views"]

[build]
generator = "viewc"

[reload]
interval_secs = 0.0
"#,
    );
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn negative_lock_release_is_rejected() {
    let cfg = parse(
        r#"
[watch]
dirs = ["views"]

[build]
generator = "viewc"

[reload]
lock_release_secs = -1.0
"#,
    );
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn bad_exclude_glob_is_rejected() {
    let cfg = parse(
        r#"
[watch]
dirs = ["views"]
exclude = ["[unclosed"]

[build]
generator = "viewc"
"#,
    );
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn load_and_validate_reads_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Modwatch.toml");
    fs::write(
        &path,
        "[watch]\ndirs = [\"views\"]\n\n[build]\ngenerator = \"viewc\"\n",
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.watch.dirs, [PathBuf::from("views")]);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(load_and_validate(dir.path().join("nope.toml")).is_err());
}
