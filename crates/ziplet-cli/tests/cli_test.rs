//! Command-line behavior and exit codes

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// A ziplet command isolated from the user's configuration
fn ziplet(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ziplet").unwrap();
    cmd.env("ZIPLET_CONFIG", temp_dir.path().join("config.toml"));
    cmd
}

fn create_source(root: &Path) {
    fs::create_dir_all(root.join("pages")).unwrap();
    fs::write(root.join("cover.gif"), b"GIF89a cover").unwrap();
    fs::write(root.join("pages/001.gif"), b"GIF89a page").unwrap();
}

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().unwrap();
    ziplet(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("zip"))
        .stdout(predicate::str::contains("unzip"))
        .stdout(predicate::str::contains("ext"));
}

#[test]
fn test_zip_then_unzip() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("comic");
    create_source(&source);
    let archive = temp_dir.path().join("comic.cbz");
    let output = temp_dir.path().join("out");

    ziplet(&temp_dir)
        .arg("zip")
        .arg(&source)
        .arg("-o")
        .arg(&archive)
        .assert()
        .success();
    assert!(archive.exists());

    ziplet(&temp_dir)
        .arg("unzip")
        .arg(&archive)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read(output.join("comic/pages/001.gif")).unwrap(),
        b"GIF89a page"
    );
}

#[test]
fn test_unzip_defaults_to_archive_stem() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("note.txt");
    fs::write(&file, b"hello").unwrap();
    let archive = temp_dir.path().join("bundle.zip");

    ziplet(&temp_dir)
        .args(["--quiet", "zip"])
        .arg(&file)
        .arg("-o")
        .arg(&archive)
        .assert()
        .success();
    ziplet(&temp_dir)
        .args(["--quiet", "unzip"])
        .arg(&archive)
        .assert()
        .success();

    assert_eq!(
        fs::read(temp_dir.path().join("bundle/note.txt")).unwrap(),
        b"hello"
    );
}

#[test]
fn test_list_json() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("comic");
    create_source(&source);
    let archive = temp_dir.path().join("comic.zip");

    ziplet(&temp_dir)
        .arg("zip")
        .arg(&source)
        .arg("-o")
        .arg(&archive)
        .assert()
        .success();

    ziplet(&temp_dir)
        .arg("list")
        .arg(&archive)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"comic/pages/001.gif\""));
}

#[test]
fn test_invalid_extension_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("a.txt");
    fs::write(&file, b"a").unwrap();

    ziplet(&temp_dir)
        .arg("zip")
        .arg(&file)
        .arg("-o")
        .arg(temp_dir.path().join("a.xyz"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid archive extension"));
}

#[test]
fn test_allow_extension_flag() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("a.txt");
    fs::write(&file, b"a").unwrap();
    let archive = temp_dir.path().join("a.xyz");

    ziplet(&temp_dir)
        .arg("zip")
        .arg(&file)
        .arg("-o")
        .arg(&archive)
        .args(["--allow-extension", "xyz"])
        .assert()
        .success();
    assert!(archive.exists());
}

#[test]
fn test_configured_extension_is_accepted() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[extensions]\ncustom = [\"cstm\"]\n",
    )
    .unwrap();

    ziplet(&temp_dir)
        .args(["ext", "check", ".CSTM"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));

    ziplet(&temp_dir)
        .args(["ext", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cbz"))
        .stdout(predicate::str::contains("cstm"));
}

#[test]
fn test_ext_check_invalid() {
    let temp_dir = TempDir::new().unwrap();
    ziplet(&temp_dir)
        .args(["ext", "check", "rar"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("rar: invalid"));
}

#[test]
fn test_missing_input_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    ziplet(&temp_dir)
        .arg("zip")
        .arg(temp_dir.path().join("missing"))
        .arg("-o")
        .arg(temp_dir.path().join("out.zip"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_wrong_password_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("secret.txt");
    fs::write(&file, b"secret").unwrap();
    let archive = temp_dir.path().join("secret.zip");

    ziplet(&temp_dir)
        .arg("zip")
        .arg(&file)
        .arg("-o")
        .arg(&archive)
        .args(["--password", "right"])
        .assert()
        .success();

    ziplet(&temp_dir)
        .arg("unzip")
        .arg(&archive)
        .args(["--password", "wrong"])
        .assert()
        .code(5);

    ziplet(&temp_dir)
        .arg("unzip")
        .arg(&archive)
        .args(["--password", "right", "--overwrite"])
        .assert()
        .success();
    assert_eq!(
        fs::read(temp_dir.path().join("secret/secret.txt")).unwrap(),
        b"secret"
    );
}

#[test]
fn test_traversal_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("evil.zip");
    let mut zip = zip::ZipWriter::new(File::create(&archive).unwrap());
    zip.start_file("../escape.txt", zip::write::FileOptions::<()>::default())
        .unwrap();
    zip.write_all(b"gotcha").unwrap();
    zip.finish().unwrap();

    ziplet(&temp_dir)
        .arg("unzip")
        .arg(&archive)
        .arg("-o")
        .arg(temp_dir.path().join("a/b"))
        .assert()
        .code(3);
    assert!(!temp_dir.path().join("a/escape.txt").exists());
}

#[test]
fn test_store_conflicts_with_level() {
    let temp_dir = TempDir::new().unwrap();
    ziplet(&temp_dir)
        .args(["zip", "x", "-o", "x.zip", "--store", "--level", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_config_path_and_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    ziplet(&temp_dir)
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    ziplet(&temp_dir)
        .args(["--quiet", "config", "--init"])
        .assert()
        .success();
    assert!(fs::read_to_string(&config_path)
        .unwrap()
        .contains("[compression]"));

    ziplet(&temp_dir)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("method = \"deflated\""));
}

#[test]
fn test_missing_config_file_warns() {
    let temp_dir = TempDir::new().unwrap();

    ziplet(&temp_dir)
        .args(["ext", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cbz"))
        .stderr(predicate::str::contains("does not exist"));

    ziplet(&temp_dir)
        .args(["--quiet", "config", "--init"])
        .assert()
        .success();

    ziplet(&temp_dir)
        .args(["ext", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("does not exist").not());
}
