use blobdeps::core::Mode;
use blobdeps::{
    ArchStrategy, Architecture, BlobAnalyzer, CollectingReporter, Config, Error, JsonReporter,
    Toolchain,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Minimal ELF identification followed by NUL-separated strings
fn write_elf(root: &Path, relative: &str, bits: u8, libraries: &[&str]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let class = if bits == 64 { 2 } else { 1 };
    let mut data = vec![0x7f, b'E', b'L', b'F', class];
    data.extend_from_slice(&[0u8; 11]);
    for library in libraries {
        data.extend_from_slice(library.as_bytes());
        data.push(0);
    }
    data.extend_from_slice(b"\0GLIBC_2.17\0/system/lib64/libbogus.so\0");
    fs::write(path, data).unwrap();
}

fn analyzer(root: &Path, config: Config) -> BlobAnalyzer {
    BlobAnalyzer::new(root, config, Toolchain::native(), ArchStrategy::Content).unwrap()
}

fn small_config() -> Config {
    Config {
        jobs: Some(2),
        ..Config::default()
    }
}

#[test]
fn closure_skips_unresolved_and_ignored_libraries() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "lib64/liba.so", 64, &["libb.so", "libc.so"]);
    write_elf(dir.path(), "lib64/libb.so", 64, &["libc.so"]);

    let analyzer = analyzer(dir.path(), small_config());
    let mut reporter = CollectingReporter::new();
    let closure = analyzer
        .closure(Path::new("lib64/liba.so"), &mut reporter)
        .unwrap();

    assert_eq!(closure.paths, vec![analyzer.root().join("lib64/libb.so")]);
    assert_eq!(reporter.paths, vec![PathBuf::from("lib64/libb.so")]);
}

#[test]
fn closure_reports_present_library_exactly_once() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "lib64/liba.so", 64, &["libb.so", "libc.so"]);
    write_elf(dir.path(), "lib64/libb.so", 64, &["libc.so"]);
    write_elf(dir.path(), "lib64/libc.so", 64, &[]);
    write_elf(dir.path(), "lib/libc.so", 32, &[]);

    let config = Config {
        ignored_libraries: vec![],
        ..small_config()
    };
    let analyzer = analyzer(dir.path(), config);
    let mut reporter = CollectingReporter::new();
    let closure = analyzer
        .closure(Path::new("lib64/liba.so"), &mut reporter)
        .unwrap();

    let reported: BTreeSet<_> = reporter.paths.iter().cloned().collect();
    assert_eq!(reporter.paths.len(), 2);
    assert_eq!(
        reported,
        BTreeSet::from([PathBuf::from("lib64/libb.so"), PathBuf::from("lib64/libc.so")])
    );
    assert_eq!(closure.len(), 2);
}

#[test]
fn unnormalized_seed_is_not_its_own_dependency() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "lib64/liba.so", 64, &["libb.so"]);
    write_elf(dir.path(), "lib64/libb.so", 64, &["liba.so"]);

    let analyzer = analyzer(dir.path(), small_config());
    let mut reporter = CollectingReporter::new();
    let closure = analyzer
        .closure(Path::new("lib64/../lib64/liba.so"), &mut reporter)
        .unwrap();

    assert_eq!(closure.seed, analyzer.root().join("lib64/liba.so"));
    assert!(!closure.contains(&closure.seed));
    assert!(closure.contains(&analyzer.root().join("lib64/libb.so")));
    assert_eq!(reporter.paths, vec![PathBuf::from("lib64/libb.so")]);
}

#[test]
fn closure_rejects_missing_seed() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "lib64/liba.so", 64, &[]);

    let err = analyzer(dir.path(), small_config())
        .closure(Path::new("lib64/nope.so"), &mut CollectingReporter::new())
        .unwrap_err();
    assert!(matches!(err, Error::SeedNotFound(_)));
}

#[test]
fn tree_merges_architectures_of_same_named_blobs() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "vendor/lib/libx.so", 32, &["libfoo.so"]);
    write_elf(dir.path(), "vendor/lib64/libx.so", 64, &["libfoo.so"]);
    fs::write(dir.path().join("vendor/lib64/libx.xml"), "<libx.so/>").unwrap();

    let graph = analyzer(dir.path(), small_config()).tree().unwrap();

    assert_eq!(graph.len(), 1);
    let record = graph.get("libx.so").unwrap();
    assert_eq!(record.dependencies, vec!["libfoo.so"]);
    assert_eq!(
        record.architectures,
        BTreeSet::from([Architecture::Bits32, Architecture::Bits64])
    );
}

#[test]
fn tree_folds_libraries_into_their_dependants() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "bin/daemon", 64, &["libx.so", "libbar.so"]);
    write_elf(dir.path(), "lib/libx.so", 32, &["libfoo.so"]);
    write_elf(dir.path(), "lib64/libx.so", 64, &["libfoo.so"]);
    write_elf(dir.path(), "lib64/libfoo.so", 64, &["libz.so"]);
    fs::create_dir_all(dir.path().join("etc")).unwrap();
    fs::write(dir.path().join("etc/daemon.rc"), "service daemon /vendor/bin/daemon").unwrap();

    let graph = analyzer(dir.path(), small_config()).tree().unwrap();

    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["daemon"]);
    assert_eq!(
        graph.get("daemon").unwrap().dependencies,
        vec!["libx.so", "libbar.so", "libfoo.so", "libz.so"]
    );
}

#[test]
fn tree_by_path_convention_needs_no_elf_headers() {
    let dir = tempfile::TempDir::new().unwrap();
    for (relative, body) in [
        ("lib/libcam.so", "libisp.so\0"),
        ("lib64/libcam.so", "libisp.so\0"),
        ("bin/readme", "libisp.so\0"),
    ] {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    let analyzer = BlobAnalyzer::new(
        dir.path(),
        small_config(),
        Toolchain::native(),
        ArchStrategy::PathConvention,
    )
    .unwrap();
    let graph = analyzer.tree().unwrap();

    assert_eq!(graph.len(), 1);
    assert_eq!(
        graph.get("libcam.so").unwrap().architectures,
        BTreeSet::from([Architecture::Bits32, Architecture::Bits64])
    );
}

#[test]
fn usage_ranks_libraries_ascending() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "bin/X", 64, &["libz.so"]);
    write_elf(dir.path(), "bin/Y", 64, &["libz.so", "libq.so"]);

    let ranking = analyzer(dir.path(), small_config()).usage().unwrap();
    assert_eq!(
        ranking,
        vec![("libq.so".to_string(), 1), ("libz.so".to_string(), 2)]
    );
}

#[test]
fn run_writes_graph_json() {
    let dir = tempfile::TempDir::new().unwrap();
    write_elf(dir.path(), "lib64/libx.so", 64, &["libfoo.so"]);

    let mut reporter = JsonReporter::new(Vec::new());
    analyzer(dir.path(), small_config())
        .run(&Mode::Tree, &mut reporter)
        .unwrap();

    let value: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();
    assert_eq!(value["libx.so"]["dependencies"][0], "libfoo.so");
    assert_eq!(value["libx.so"]["architectures"][0], "64");
}

#[test]
fn analyzer_rejects_missing_root() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("absent");
    let result = BlobAnalyzer::new(
        &missing,
        Config::default(),
        Toolchain::native(),
        ArchStrategy::Content,
    );
    assert!(matches!(result, Err(Error::Io { .. })));
}
