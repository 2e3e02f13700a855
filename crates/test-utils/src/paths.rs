//! Path utilities for locating workspace files from tests.

use std::path::PathBuf;

pub use tempfile::TempDir;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the test-utils manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the shipped `config/` directory.
pub fn config_dir() -> PathBuf {
    workspace_root().join("config")
}

/// A fresh temporary directory, removed when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Writes `contents` to `name` inside a fresh temporary directory.
///
/// The directory is removed when the returned guard is dropped.
pub fn temp_file_with(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write temp file");
    (dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn test_temp_file_with() {
        let (_dir, path) = temp_file_with("a.yaml", "x: 1\n");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "x: 1\n");
    }
}
