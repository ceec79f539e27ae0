//! Zip extraction

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::error::FsError;

/// Extract the zip at `archive` into `target`, creating `target` if absent
///
/// Relative structure and the Unix modes stored in the archive are kept.
/// Returns the first directory the archive created, if it holds any.
/// Entries whose names would land outside `target` fail the extraction.
pub fn extract_archive(
    archive: impl AsRef<Path>,
    target: impl AsRef<Path>,
) -> Result<Option<PathBuf>, FsError> {
    let (archive_path, target) = (archive.as_ref(), target.as_ref());

    let file = File::open(archive_path).map_err(|e| FsError::io("open file", archive_path, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| invalid(archive_path, e.to_string()))?;

    fs::create_dir_all(target).map_err(|e| FsError::io("create directory", target, e))?;

    let mut created_root = None;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| invalid(archive_path, e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(invalid(
                archive_path,
                format!("entry escapes target: {}", entry.name()),
            ));
        };
        let path = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&path).map_err(|e| FsError::io("create directory", &path, e))?;
            apply_mode(&path, entry.unix_mode())?;
            if created_root.is_none() {
                created_root = Some(path);
            }
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| FsError::io("create directory", parent, e))?;
        }
        let mut out = File::create(&path).map_err(|e| FsError::io("open file", &path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| FsError::io("copy file", &path, e))?;
        apply_mode(&path, entry.unix_mode())?;
    }

    Ok(created_root)
}

fn invalid(path: &Path, reason: String) -> FsError {
    FsError::InvalidArchive {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<(), FsError> {
    use std::os::unix::fs::PermissionsExt;

    let Some(mode) = mode else {
        return Ok(());
    };
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
        .map_err(|e| FsError::io("set permissions", path, e))
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<(), FsError> {
    Ok(())
}
