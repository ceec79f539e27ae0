//! Filesystem helpers
//!
//! Synchronous, single-pass operations that stop at the first error: tree
//! copy, zip extraction and a few path utilities.

mod archive;
mod copy;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FsError;

pub use archive::extract_archive;
pub use copy::{copy_file, copy_tree};

/// Platform path separator as a string
pub const PATH_SEPARATOR: &str = std::path::MAIN_SEPARATOR_STR;

/// True if anything (file or directory) exists at `path`
pub fn directory_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// The current user's home directory
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Parent of a path string; one trailing separator is ignored.
/// Returns `""` when there is no separator to cut at.
pub fn parent_dir(path: &str) -> &str {
    let trimmed = path.strip_suffix(std::path::is_separator).unwrap_or(path);
    trimmed
        .rfind(std::path::is_separator)
        .map_or("", |i| &trimmed[..i])
}

/// Remove a file or a whole directory tree. A missing path is not an error.
pub fn remove_path(path: impl AsRef<Path>) -> Result<(), FsError> {
    let path = path.as_ref();
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    };
    result.map_err(|e| FsError::io("delete", path, e))
}

/// Rename (move) `old` to `new`, replacing `new` if it is a file
pub fn rename_path(old: impl AsRef<Path>, new: impl AsRef<Path>) -> Result<(), FsError> {
    fs::rename(old.as_ref(), new.as_ref()).map_err(|e| FsError::io("rename", old.as_ref(), e))
}
