//! Shared test utilities for rstcheck.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary project directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the project subdirectory
///
/// File discovery skips hidden directories, and some systems create temp
/// directories under paths like `/tmp/.tmpXXXXX`, so files go into a
/// non-hidden "project" subdirectory.
///
/// # Example
///
/// ```ignore
/// use crate::test_utils::create_test_project_dir;
///
/// let (_temp_dir, project_dir) = create_test_project_dir();
/// std::fs::write(project_dir.join("index.rst"), "Title\n=====\n").unwrap();
/// ```
pub fn create_test_project_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let project_dir = temp_dir.path().join("project");
    fs::create_dir(&project_dir).expect("Failed to create project subdirectory");
    (temp_dir, project_dir)
}

/// Creates a Sphinx project whose `conf.py` holds `conf_py`.
pub fn create_sphinx_project(conf_py: &str) -> (TempDir, PathBuf) {
    let (temp_dir, project_dir) = create_test_project_dir();
    fs::write(project_dir.join("conf.py"), conf_py).expect("Failed to write conf.py");
    (temp_dir, project_dir)
}
