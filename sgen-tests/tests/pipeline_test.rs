//! End-to-end runs of the generator and the line patcher on temp directories

use std::fs;
use std::path::{Path, PathBuf};

use sgen_codegen::deploy::copy_dir;
use sgen_codegen::patch::{PatchRequest, Scope};
use sgen_codegen::register::{LedgerStore, TomlLedgerStore};
use sgen_codegen::{CodegenError, GeneratorConfig, Stage};
use tempfile::{tempdir, TempDir};

const USER: &str = "pub struct User { pub id: i64, pub name: String }";
const POST: &str = "pub struct Post { pub id: i64, pub title: String }";

fn project(files: &[(&str, &str)]) -> (TempDir, GeneratorConfig) {
    let dir = tempdir().unwrap();
    let data = dir.path().join("models");
    fs::create_dir_all(&data).unwrap();
    for (name, source) in files {
        fs::write(data.join(name), source).unwrap();
    }

    let mut config = GeneratorConfig::default_with_data_dir(data);
    config.database_dir = dir.path().join("database");
    config.register_file = dir.path().join("sgen-register.toml");
    config.format_generated = false;
    (dir, config)
}

fn storage(config: &GeneratorConfig, module: &str) -> PathBuf {
    config
        .database_dir
        .join("storages")
        .join(module)
        .join(format!("{module}.rs"))
}

#[test]
fn test_layout_after_generate() {
    let (_dir, config) = project(&[("user.rs", USER)]);
    let summary = sgen_codegen::generate(&config).unwrap();
    assert_eq!(summary.entities, 1);

    let base = &config.database_dir;
    for path in [
        "mod.rs",
        "general/mod.rs",
        "general/db/db.rs",
        "general/query_builder/mod.rs",
        "general/query_builder/select.rs",
        "storages/mod.rs",
        "storages/user/user.rs",
    ] {
        assert!(base.join(path).is_file(), "missing {path}");
    }

    let driver = fs::read_to_string(base.join("general/db/db.rs")).unwrap();
    assert!(driver.contains("Dialect::MySql"));
}

#[test]
fn test_regenerate_is_idempotent() {
    let (_dir, config) = project(&[("user.rs", USER), ("post.rs", POST)]);
    sgen_codegen::generate(&config).unwrap();
    let first = fs::read_to_string(storage(&config, "user")).unwrap();

    let report = sgen_codegen::generate(&config).unwrap().deployment.unwrap();
    assert!(report.orphans.is_empty());
    assert_eq!(fs::read_to_string(storage(&config, "user")).unwrap(), first);

    let ledger = TomlLedgerStore::new(&config.register_file).load().unwrap();
    let owners: Vec<&str> = ledger.owners().collect();
    assert_eq!(owners, vec!["Post", "User", "models"]);
}

#[test]
fn test_removed_entity_is_deleted() {
    let (_dir, mut config) = project(&[("user.rs", USER), ("post.rs", POST)]);
    config.auto_delete = true;
    sgen_codegen::generate(&config).unwrap();

    fs::remove_file(config.data_dir.join("post.rs")).unwrap();
    let report = sgen_codegen::generate(&config).unwrap().deployment.unwrap();

    assert_eq!(report.orphans, vec![storage(&config, "post")]);
    assert_eq!(report.removed, report.orphans);
    assert!(!storage(&config, "post").exists());
    assert!(!config.database_dir.join("storages/post").exists());
    assert!(storage(&config, "user").exists());

    let index = fs::read_to_string(config.database_dir.join("storages/mod.rs")).unwrap();
    assert!(!index.contains("pub mod post;"));
}

#[test]
fn test_orphans_kept_without_auto_delete() {
    let (_dir, config) = project(&[("user.rs", USER), ("post.rs", POST)]);
    sgen_codegen::generate(&config).unwrap();

    fs::remove_file(config.data_dir.join("post.rs")).unwrap();
    let report = sgen_codegen::generate(&config).unwrap().deployment.unwrap();

    assert_eq!(report.orphans, vec![storage(&config, "post")]);
    assert!(report.removed.is_empty());
    assert!(storage(&config, "post").exists());
}

#[test]
fn test_invalid_declarations_write_nothing() {
    let (_dir, config) = project(&[
        ("user.rs", USER),
        ("broken.rs", "pub struct {"),
        ("nokey.rs", "pub struct NoKey { pub name: String }"),
    ]);

    let err = sgen_codegen::generate(&config).unwrap_err();
    match err {
        CodegenError::Generation(errors) => {
            assert_eq!(errors.get(Stage::Parsing).len(), 1);
            assert_eq!(errors.get(Stage::Validating).len(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!config.database_dir.exists());
    assert!(!config.register_file.exists());
}

#[test]
fn test_inject_after_declaration() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("main.go");
    fs::write(
        &path,
        "package main\nimport (\n\t\"fmt\"\n)\nfunc main() {}",
    )
    .unwrap();

    let mut config = GeneratorConfig::default();
    config.format_generated = false;
    let request = PatchRequest::new(&path, r"^import \(", "\t\"os\"", Scope::Declaration);
    let report = sgen_codegen::inject(&config, &request).unwrap();
    assert_eq!(report.positions, vec![2]);

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[2], "\t\"os\"");
    assert_eq!(lines[3], "\t\"fmt\"");
}

#[test]
fn test_inject_whole_file_prefixes_match() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    fs::write(&path, "fn a() {}\nfn b() {}\n").unwrap();

    let mut config = GeneratorConfig::default();
    config.format_generated = false;
    let request = PatchRequest::new(&path, r"fn ", "pub ", Scope::WholeFile);
    sgen_codegen::inject(&config, &request).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "pub fn a() {}\npub fn b() {}\n"
    );
}

#[test]
fn test_inject_without_match_leaves_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    fs::write(&path, "fn a() {}\n").unwrap();

    let config = GeneratorConfig::default();
    let request = PatchRequest::new(&path, r"^struct ", "// x", Scope::Declaration);
    assert!(matches!(
        sgen_codegen::inject(&config, &request),
        Err(CodegenError::NoMatchError { .. })
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), "fn a() {}\n");
}

#[cfg(unix)]
#[test]
fn test_copy_tree_skips_symlinks() {
    use std::os::unix::fs::{symlink, PermissionsExt};

    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::write(src.join("a.rs"), "a").unwrap();
    fs::write(src.join("nested/b.rs"), "b").unwrap();
    fs::set_permissions(src.join("a.rs"), fs::Permissions::from_mode(0o640)).unwrap();
    symlink(src.join("a.rs"), src.join("link.rs")).unwrap();

    let dst = dir.path().join("dst");
    assert_eq!(copy_dir(&src, &dst).unwrap(), 2);

    assert_eq!(fs::read_to_string(dst.join("nested/b.rs")).unwrap(), "b");
    assert!(!dst.join("link.rs").exists());
    let mode = fs::metadata(dst.join("a.rs")).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
}

#[test]
fn test_copy_tree_requires_directory() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.rs");
    fs::write(&file, "").unwrap();
    assert!(copy_dir(&file, Path::new("unused")).is_err());
}
