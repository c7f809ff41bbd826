//! Conformance tests that run YAML fixtures against shapecheck
//!
//! Run with: cargo test -p shapecheck-test --test conformance --features shapecheck-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use shapecheck_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the fixtures directory at the workspace root
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let ext_test = Path::new(manifest_dir);

    // Go up: ext/test -> ext -> workspace root
    ext_test
        .parent() // ext
        .and_then(|p| p.parent()) // root
        .expect("Could not find workspace root")
        .join("fixtures")
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    if !dir.exists() {
        panic!("Fixtures directory does not exist: {}", dir.display());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|e| e == "yaml" || e == "yml"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "no fixtures in {}", dir.display());

    for path in paths {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");

        // Parse potentially multiple fixtures (separated by ---)
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_literals() {
    run_fixtures_in_dir(&fixtures_dir().join("01_literals"));
}

#[test]
fn test_sequences() {
    run_fixtures_in_dir(&fixtures_dir().join("02_sequences"));
}

#[test]
fn test_mappings() {
    run_fixtures_in_dir(&fixtures_dir().join("03_mappings"));
}

#[test]
fn test_predicates() {
    run_fixtures_in_dir(&fixtures_dir().join("04_predicates"));
}

#[test]
fn test_loading() {
    run_fixtures_in_dir(&fixtures_dir().join("05_loading"));
}
