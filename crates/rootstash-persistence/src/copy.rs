//! File and tree copies that keep permission bits and modification times.

use std::fs;
use std::path::Path;

use filetime::FileTime;
use tracing::trace;
use walkdir::WalkDir;

use crate::error::{PersistenceError, Result};

/// Options shared by every copy in one save.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    /// Echo each copy as `cp <src> <dst>` on stdout.
    pub verbose: bool,
}

/// Returns true for file names that never belong in a snapshot.
///
/// Core dumps and compiled test binaries are build droppings, not toolchain.
pub fn is_excluded(file_name: &str) -> bool {
    file_name == "core" || file_name.ends_with(".test")
}

/// The verbose echo for one copy.
pub fn echo_line(src: &Path, shown_dst: &Path) -> String {
    format!("cp {} {}", src.display(), shown_dst.display())
}

/// Copies a single file, creating parent directories of `dst` as needed.
///
/// The destination ends up with the source's permission bits and with both
/// its access and modification times set to the source's modification time.
pub fn copy_file(src: &Path, dst: &Path, options: CopyOptions) -> Result<()> {
    copy_file_shown(src, dst, dst, options)
}

/// Like [`copy_file`], but the verbose echo names `shown_dst`, the place the
/// file will end up once `dst`'s staging directory is moved.
pub fn copy_file_shown(
    src: &Path,
    dst: &Path,
    shown_dst: &Path,
    options: CopyOptions,
) -> Result<()> {
    if options.verbose {
        println!("{}", echo_line(src, shown_dst));
    }
    trace!(src = %src.display(), dst = %dst.display(), "copy file");

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::DirectoryError {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let data = fs::read(src).map_err(|source| PersistenceError::ReadError {
        path: src.to_path_buf(),
        source,
    })?;
    let metadata = fs::metadata(src).map_err(|source| PersistenceError::MetadataError {
        path: src.to_path_buf(),
        source,
    })?;

    fs::write(dst, &data).map_err(|source| PersistenceError::WriteError {
        path: dst.to_path_buf(),
        source,
    })?;
    fs::set_permissions(dst, metadata.permissions()).map_err(|source| {
        PersistenceError::PermissionsError {
            path: dst.to_path_buf(),
            source,
        }
    })?;

    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(dst, mtime, mtime).map_err(|source| PersistenceError::TimesError {
        path: dst.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Recursively copies every non-directory entry under `src` into `dst`,
/// keeping relative paths and skipping names matched by [`is_excluded`].
///
/// Returns the number of files copied. A missing `src` is an error.
pub fn copy_tree(src: &Path, dst: &Path, options: CopyOptions) -> Result<usize> {
    copy_tree_shown(src, dst, dst, options)
}

/// Like [`copy_tree`], echoing destinations under `shown_dst`.
pub fn copy_tree_shown(
    src: &Path,
    dst: &Path,
    shown_dst: &Path,
    options: CopyOptions,
) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|source| PersistenceError::WalkError {
            root: src.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(is_excluded) {
            continue;
        }

        // Every walked path lives under `src`.
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        copy_file_shown(
            entry.path(),
            &dst.join(relative),
            &shown_dst.join(relative),
            options,
        )?;
        copied += 1;
    }

    Ok(copied)
}
