// src/dispatch/preconditions.rs

//! Checks run before a job id is issued.

use std::path::{Path, PathBuf};

use super::DispatchError;

/// Resolve `name` under `root` and require that something exists there.
pub fn resolve_playbook(root: &Path, name: &str) -> Result<PathBuf, DispatchError> {
    let path = root.join(name);
    if !path.exists() {
        return Err(DispatchError::NotFound(format!(
            "Playbook file '{}' not found.",
            path.display()
        )));
    }
    Ok(path)
}

/// Resolve `name` under `root` and require a regular file with an execute
/// bit set.
pub fn resolve_executable(root: &Path, name: &str) -> Result<PathBuf, DispatchError> {
    let path = root.join(name);
    if !path.exists() {
        return Err(DispatchError::NotFound(format!(
            "Executable '{}' does not exist.",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(DispatchError::NotFound(format!(
            "Executable '{name}' is not a valid file."
        )));
    }
    if !is_executable(&path)? {
        return Err(DispatchError::NotExecutable(format!(
            "Executable '{name}' is not marked as executable."
        )));
    }
    Ok(path)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> Result<bool, DispatchError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).map_err(crate::errors::LsoError::from)?;
    Ok(metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> Result<bool, DispatchError> {
    Ok(true)
}
