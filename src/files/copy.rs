//! File and directory tree copy

use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::error::FsError;

/// Copy one file, overwriting `dest`, and sync it to disk
pub fn copy_file(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<(), FsError> {
    let (source, dest) = (source.as_ref(), dest.as_ref());

    let mut reader = File::open(source).map_err(|e| FsError::io("open file", source, e))?;
    let mut writer = File::create(dest).map_err(|e| FsError::io("create file", dest, e))?;
    io::copy(&mut reader, &mut writer).map_err(|e| FsError::io("copy file", source, e))?;
    writer
        .sync_all()
        .map_err(|e| FsError::io("copy file", dest, e))
}

/// Recursively copy the directory `source` into `dest`
///
/// `dest` (and any missing parents) is created with the permissions of
/// `source`. Fails with [`FsError::NotADirectory`] before touching `dest`
/// when `source` is not a directory.
pub fn copy_tree(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<(), FsError> {
    let (source, dest) = (source.as_ref(), dest.as_ref());

    let meta = fs::metadata(source).map_err(|e| FsError::io("stat", source, e))?;
    if !meta.is_dir() {
        return Err(FsError::NotADirectory(source.to_path_buf()));
    }

    fs::create_dir_all(dest).map_err(|e| FsError::io("create directory", dest, e))?;
    fs::set_permissions(dest, meta.permissions())
        .map_err(|e| FsError::io("create directory", dest, e))?;

    let entries = fs::read_dir(source).map_err(|e| FsError::io("read directory", source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| FsError::io("read directory", source, e))?;
        let from = entry.path();
        let to = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| FsError::io("stat", &from, e))?;
        if file_type.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::write(src.join("root.txt"), "root").unwrap();
        fs::write(src.join("a/b/deep.bin"), [1u8, 2, 3]).unwrap();

        let dst = dir.path().join("out/copy");
        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("root.txt")).unwrap(), "root");
        assert_eq!(fs::read(dst.join("a/b/deep.bin")).unwrap(), vec![1u8, 2, 3]);
    }

    #[test]
    fn test_copy_tree_rejects_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let dst = dir.path().join("dst");

        assert!(matches!(
            copy_tree(&file, &dst),
            Err(FsError::NotADirectory(_))
        ));
        assert!(!dst.exists());
    }

    #[test]
    fn test_copy_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "new").unwrap();
        fs::write(&b, "old contents").unwrap();

        copy_file(&a, &b).unwrap();
        assert_eq!(fs::read_to_string(&b).unwrap(), "new");
    }
}
