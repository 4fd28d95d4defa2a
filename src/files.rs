//! Filesystem access behind the file routes.
//!
//! Callers only learn whether a file was missing or something else broke.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found")]
    NotFound,

    #[error("file access failed: {0}")]
    Internal(#[source] io::Error),
}

impl From<io::Error> for FileError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            FileError::NotFound
        } else {
            FileError::Internal(e)
        }
    }
}

/// Joins `relative` onto `root`, refusing anything that could leave it.
pub fn resolve(root: &Path, relative: &str) -> Result<PathBuf, FileError> {
    let relative = Path::new(relative);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(FileError::NotFound);
    }
    Ok(root.join(relative))
}

pub fn read(root: &Path, relative: &str) -> Result<Vec<u8>, FileError> {
    let path = resolve(root, relative)?;
    if path.is_dir() {
        return Err(FileError::NotFound);
    }
    Ok(std::fs::read(path)?)
}

pub fn write(root: &Path, relative: &str, contents: &[u8]) -> Result<(), FileError> {
    let path = resolve(root, relative)?;
    std::fs::write(path, contents).map_err(FileError::Internal)
}
