//! Small metadata files stored beside a snapshot's trees.

use std::fs;
use std::path::Path;

use crate::error::{PersistenceError, Result};

/// Writes a metadata file such as `diff` or `commit`.
///
/// Snapshots are assembled in a staging directory that is renamed into place
/// as a whole, so a plain write is enough. The file is left readable by all.
pub fn write_metadata(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).map_err(|source| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644)).map_err(|source| {
            PersistenceError::PermissionsError {
                path: path.to_path_buf(),
                source,
            }
        })?;
    }

    Ok(())
}

/// Reads a metadata file, returning None if the snapshot has none.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PersistenceError::ReadError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_metadata_round_trips_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("diff");

        write_metadata(&path, b"--- a/x\n+++ b/x\n").unwrap();

        assert_eq!(read_optional(&path).unwrap().unwrap(), b"--- a/x\n+++ b/x\n");
    }

    #[test]
    fn test_write_metadata_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let err = write_metadata(&dir.path().join("gone/commit"), b"x").unwrap_err();
        assert!(matches!(err, PersistenceError::WriteError { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_metadata_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("commit");
        write_metadata(&path, b"tree abc\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn test_read_optional_missing() {
        let dir = tempdir().unwrap();
        assert!(read_optional(&dir.path().join("commit")).unwrap().is_none());
    }
}
