use std::path::{Path, PathBuf};

/// Nearest directory at or above `start` holding a file named `filename`.
/// Used to locate the project root from a nested working directory.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(filename).is_file())
        .map(Path::to_path_buf)
}

/// Create `path` and its parents unless it is already a directory.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    tracing::debug!("Creating directory {}", path.display());
    std::fs::create_dir_all(path)
}

/// Write `contents` to `path`; missing parent directories are created.
pub fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    std::fs::write(path, contents)
}
