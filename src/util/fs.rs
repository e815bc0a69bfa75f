//! Filesystem utilities.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        tracing::debug!("removing {}", path.display());
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Walk up from `start` to the outermost directory holding `file_name`.
///
/// Nested projects are subdirectories of the outermost one, so the top of
/// the chain is the root the loader must start from.
pub fn find_outermost(start: &Path, file_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .filter(|dir| dir.join(file_name).is_file())
        .last()
        .map(Path::to_path_buf)
}

/// Lexically resolve `.` and `..` components without touching the
/// filesystem. Leading `..` that cannot be resolved are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}
