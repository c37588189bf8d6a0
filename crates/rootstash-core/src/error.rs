//! Error types for snapshot operations.

use std::path::PathBuf;
use std::process::ExitStatus;

use rootstash_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur while saving, listing or running snapshots.
#[derive(Error, Debug)]
pub enum StashError {
    /// The version-control executable could not be started.
    #[error("error executing git {args}: {source}")]
    VcsLaunch {
        args: String,
        #[source]
        source: std::io::Error,
    },

    /// The version-control executable exited unsuccessfully.
    #[error("error executing git {args}: {status}")]
    VcsFailed { args: String, status: ExitStatus },

    /// A commit object could not be parsed.
    #[error("malformed author in commit: {0}")]
    MalformedCommit(String),

    /// An alias name is already taken by something else.
    #[error("cannot alias '{name}' to {identity}: {existing} already exists")]
    AliasConflict {
        name: String,
        identity: String,
        existing: PathBuf,
    },

    /// An alias name cannot be used as a store entry.
    #[error("invalid snapshot name '{0}'")]
    InvalidName(String),

    /// No toolchain checkout could be located.
    #[error("cannot locate toolchain root; set {0} or pass --root")]
    ToolchainRootUnknown(&'static str),

    /// No snapshot or alias by that name.
    #[error("no saved toolchain named '{name}' in {store}")]
    SnapshotMissing { name: String, store: PathBuf },

    /// The run command line was empty.
    #[error("no command given")]
    EmptyCommand,

    /// A saved binary could not be launched.
    #[error("{program}: {source}")]
    CommandLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store directory I/O failed.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Copying or writing snapshot files failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for snapshot operations.
pub type Result<T> = std::result::Result<T, StashError>;
