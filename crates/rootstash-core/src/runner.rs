//! Running binaries from a saved toolchain.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::config::Toolchain;
use crate::error::{Result, StashError};

/// Launches `<store>/<name>/bin/<program>` with the toolchain root pointed
/// at the snapshot.
///
/// Aliases are plain symlinks, so `name` may be an identity or an alias
/// without any lookup here.
#[derive(Debug, Clone)]
pub struct Runner {
    store_dir: PathBuf,
    toolchain: Toolchain,
}

impl Runner {
    pub fn new(store_dir: impl Into<PathBuf>, toolchain: Toolchain) -> Self {
        Self {
            store_dir: store_dir.into(),
            toolchain,
        }
    }

    /// Toolchain root handed to programs run from snapshot `name`.
    pub fn toolchain_root(&self, name: &str) -> PathBuf {
        self.store_dir.join(name)
    }

    /// Executable launched for `program` from snapshot `name`.
    pub fn executable_path(&self, name: &str, program: &str) -> PathBuf {
        self.toolchain_root(name).join("bin").join(program)
    }

    /// Runs `command` (program then arguments) from snapshot `name`, with
    /// the caller's stdio and environment plus the toolchain root variable.
    pub fn run(&self, name: &str, command: &[String]) -> Result<ExitStatus> {
        let (program, args) = command.split_first().ok_or(StashError::EmptyCommand)?;

        let root = self.toolchain_root(name);
        if !root.is_dir() {
            return Err(StashError::SnapshotMissing {
                name: name.to_string(),
                store: self.store_dir.clone(),
            });
        }

        let executable = self.executable_path(name, program);
        debug!(
            executable = %executable.display(),
            root = %root.display(),
            "Running saved toolchain binary"
        );

        Command::new(&executable)
            .args(args)
            .env(self.toolchain.root_env, &root)
            .status()
            .map_err(|source| StashError::CommandLaunch {
                program: executable,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_executable_path_layout() {
        let runner = Runner::new("/store", Toolchain::go());
        assert_eq!(
            runner.executable_path("a1b2c3d", "go"),
            PathBuf::from("/store/a1b2c3d/bin/go")
        );
        assert_eq!(runner.toolchain_root("tip"), PathBuf::from("/store/tip"));
    }

    #[cfg(unix)]
    #[test]
    fn test_alias_resolves_to_same_executable() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a1b2c3d/bin")).unwrap();
        fs::write(dir.path().join("a1b2c3d/bin/go"), "").unwrap();
        std::os::unix::fs::symlink("a1b2c3d", dir.path().join("tip")).unwrap();

        let runner = Runner::new(dir.path(), Toolchain::go());
        let via_alias = runner.executable_path("tip", "go").canonicalize().unwrap();
        let via_identity = runner
            .executable_path("a1b2c3d", "go")
            .canonicalize()
            .unwrap();
        assert_eq!(via_alias, via_identity);
    }

    #[test]
    fn test_run_missing_snapshot() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(dir.path(), Toolchain::go());
        let err = runner.run("nope", &["go".to_string()]).unwrap_err();
        assert!(matches!(err, StashError::SnapshotMissing { .. }));
    }

    #[test]
    fn test_run_empty_command() {
        let runner = Runner::new("/store", Toolchain::go());
        assert!(matches!(
            runner.run("tip", &[]).unwrap_err(),
            StashError::EmptyCommand
        ));
    }

    #[test]
    fn test_run_missing_binary_is_launch_error() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a1b2c3d/bin")).unwrap();
        let runner = Runner::new(dir.path(), Toolchain::go());

        let err = runner.run("a1b2c3d", &["vet".to_string()]).unwrap_err();
        assert!(matches!(err, StashError::CommandLaunch { .. }));
    }
}
