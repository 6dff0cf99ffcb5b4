//! File system-related utilities.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::Error;

/// Canonicalize the given path if it exists. If it does not exist, returns
/// `Ok(None)`.
pub fn maybe_canonicalize<P>(path: P) -> Result<Option<PathBuf>, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.exists() {
        Ok(Some(path.canonicalize().map_err(|e| {
            Error::Io(format!("while resolving {}", path.display()), e)
        })?))
    } else {
        Ok(None)
    }
}

/// Replaces the file at `path` with `content`, creating parent directories
/// as needed.
pub fn write_output(path: &Path, content: &str) -> Result<(), Error> {
    ensure_parent_path_exists(path)?;
    fs::write(path, content)
        .map_err(|e| Error::Io(format!("while writing {}", path.display()), e))
}

fn ensure_parent_path_exists(path: &Path) -> Result<(), Error> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::PathMissingParent(path.to_path_buf()))?;
    ensure_path_exists(parent)
}

fn ensure_path_exists(path: &Path) -> Result<(), Error> {
    // A bare file name has an empty parent.
    if !path.as_os_str().is_empty() && !path.is_dir() {
        fs::create_dir_all(path)
            .map_err(|e| Error::Io(format!("while creating {}", path.display()), e))?;
        debug!("Created path: {}", path.display());
    }
    Ok(())
}
