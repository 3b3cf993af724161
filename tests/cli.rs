use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write_elf(root: &Path, relative: &str, libraries: &[&str]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let mut data = vec![0x7f, b'E', b'L', b'F', 2];
    data.extend_from_slice(&[0u8; 11]);
    for library in libraries {
        data.extend_from_slice(library.as_bytes());
        data.push(0);
    }
    fs::write(path, data).unwrap();
}

fn blobdeps() -> Command {
    Command::cargo_bin("blobdeps").unwrap()
}

#[test]
fn tree_prints_json_graph() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "lib64/libx.so", &["libfoo.so"]);

    let output = blobdeps()
        .args(["--quiet", "tree"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["libx.so"]["architectures"][0], "64");
}

#[test]
fn usage_prints_ranking() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "bin/X", &["libz.so"]);
    write_elf(dir.path(), "bin/Y", &["libz.so", "libq.so"]);

    let output = blobdeps()
        .args(["usage", "-q", "--jobs", "2"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, serde_json::json!([["libq.so", 1], ["libz.so", 2]]));
}

#[test]
fn closure_streams_relative_paths() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "lib64/liba.so", &["libb.so", "libc.so"]);
    write_elf(dir.path(), "lib64/libb.so", &["libc.so"]);

    blobdeps()
        .args(["-q", "closure"])
        .arg(dir.path())
        .arg("lib64/liba.so")
        .assert()
        .success()
        .stdout(predicate::eq("lib64/libb.so\n"));
}

#[test]
fn closure_requires_a_seed() {
    let dir = tempfile::TempDir::new().unwrap();

    blobdeps()
        .arg("closure")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("SEED"));
}

#[test]
fn missing_seed_fails_before_scanning() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "lib64/liba.so", &[]);

    blobdeps()
        .args(["-q", "closure"])
        .arg(dir.path())
        .arg("lib64/absent.so")
        .assert()
        .failure()
        .stderr(predicate::str::contains("seed file not found"));
}
