use std::fs;

use kpanic_sym::absolute_path;
use tempfile::tempdir;

#[test]
fn absolute_path_canonicalizes_existing_paths() {
    let tmp = tempdir().expect("tempdir");
    let nested = tmp.path().join("nested");
    fs::create_dir_all(&nested).expect("create nested");

    let result = absolute_path(&nested.to_string_lossy()).expect("absolute");
    assert_eq!(result, nested.canonicalize().expect("canonicalize nested"));
}

#[test]
fn absolute_path_keeps_missing_absolute_paths() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("missing.panic");
    let result = absolute_path(&missing.to_string_lossy()).expect("absolute");
    assert_eq!(result, missing);
}

#[test]
fn absolute_path_joins_missing_relative_paths_to_cwd() {
    let result = absolute_path("definitely-not-here/Kernel.panic").expect("absolute");
    let cwd = std::env::current_dir().expect("cwd");
    assert_eq!(result, cwd.join("definitely-not-here/Kernel.panic"));
}
