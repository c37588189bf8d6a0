//! The snapshot store: saving toolchain snapshots and naming them.
//!
//! # Layout
//!
//! ```text
//! <store>/
//! ├── <identity>/
//! │   ├── bin/                  # go, godoc, gofmt (those present)
//! │   ├── pkg/<os>_<arch>/
//! │   ├── pkg/tool/<os>_<arch>/
//! │   ├── pkg/include/
//! │   ├── src/                  # minus core dumps and *.test binaries
//! │   ├── diff                  # only for dirty identities
//! │   └── commit                # raw commit object of HEAD
//! └── <alias> -> <identity>     # relative symlink
//! ```
//!
//! A save is staged in a hidden `.<identity>.partial*` directory and moved
//! into place once every file is written, so an aborted save leaves nothing
//! behind under the identity's name. Saved snapshots are never modified or
//! removed; saving an identity that already exists only links the alias.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rootstash_persistence::{copy_file_shown, copy_tree_shown, write_metadata, CopyOptions};
use tracing::{debug, info};

use crate::config::{Platform, StashConfig, Toolchain};
use crate::error::{Result, StashError};
use crate::identity::{resolve_identity, Identity};
use crate::vcs::Vcs;

/// File holding the uncommitted diff of a dirty snapshot.
pub const DIFF_FILE: &str = "diff";

/// File holding the raw commit object of a snapshot.
pub const COMMIT_FILE: &str = "commit";

/// Prefix of in-progress save directories.
pub const STAGING_PREFIX: char = '.';

/// What to copy a snapshot from.
#[derive(Debug, Clone)]
pub struct ToolchainSource {
    pub root: PathBuf,
    pub toolchain: Toolchain,
    pub platform: Platform,
    pub options: CopyOptions,
}

impl ToolchainSource {
    /// Source described by `config`, rooted at `root`.
    pub fn from_config(config: &StashConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            toolchain: config.toolchain,
            platform: config.platform.clone(),
            options: config.copy_options(),
        }
    }

    /// Directory trees copied into a snapshot, relative to both the
    /// toolchain root and the snapshot directory.
    fn trees(&self) -> Vec<PathBuf> {
        let pair = self.platform.pair();
        vec![
            Path::new("pkg").join(&pair),
            Path::new("pkg").join("tool").join(&pair),
            Path::new("pkg").join("include"),
            PathBuf::from("src"),
        ]
    }
}

/// Outcome of a successful save.
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub identity: Identity,
    /// Final snapshot directory.
    pub path: PathBuf,
    pub files_copied: usize,
    /// Alias pointing at the snapshot, if one was requested.
    pub alias: Option<String>,
    /// Whether a snapshot of this identity already existed and was kept.
    pub reused: bool,
}

/// Directory of snapshots and aliases.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a snapshot or alias entry.
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Saves the checkout behind `vcs` and optionally aliases it as `name`.
    pub fn save(
        &self,
        source: &ToolchainSource,
        vcs: &dyn Vcs,
        name: Option<&str>,
    ) -> Result<SaveReport> {
        if let Some(name) = name {
            validate_name(name)?;
        }

        let resolved = resolve_identity(vcs)?;
        let identity = resolved.identity;
        let path = self.entry_path(identity.as_str());

        let (files_copied, reused) = if self.snapshot_exists(&path)? {
            info!(identity = %identity, "Snapshot already saved, keeping it");
            (0, true)
        } else {
            info!(identity = %identity, root = %source.root.display(), "Saving toolchain");
            let copied = self.create(source, vcs, resolved.diff.as_deref(), &path)?;
            (copied, false)
        };

        let alias = match name {
            Some(name) if name != identity.as_str() => {
                self.link_alias(name, &identity)?;
                Some(name.to_string())
            }
            _ => None,
        };

        info!(
            identity = %identity,
            files = files_copied,
            reused,
            "Saved toolchain"
        );

        Ok(SaveReport {
            identity,
            path,
            files_copied,
            alias,
            reused,
        })
    }

    /// Whether `path` already holds a snapshot. Anything else by that name
    /// blocks the save.
    fn snapshot_exists(&self, path: &Path) -> Result<bool> {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(true),
            Ok(_) => Err(StashError::AliasConflict {
                name: file_name(path),
                identity: file_name(path),
                existing: path.to_path_buf(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(path)(e)),
        }
    }

    /// Builds a new snapshot at `path` through a staging directory.
    fn create(
        &self,
        source: &ToolchainSource,
        vcs: &dyn Vcs,
        diff: Option<&[u8]>,
        path: &Path,
    ) -> Result<usize> {
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let staging = tempfile::Builder::new()
            .prefix(&format!("{}{}.partial", STAGING_PREFIX, file_name(path)))
            .tempdir_in(&self.dir)
            .map_err(io_error(&self.dir))?;

        let files_copied = copy_snapshot(source, staging.path(), path)?;

        if let Some(diff) = diff {
            write_metadata(&staging.path().join(DIFF_FILE), diff)?;
        }
        let commit = vcs.commit_object()?;
        write_metadata(&staging.path().join(COMMIT_FILE), &commit)?;

        set_snapshot_mode(staging.path())?;
        fs::rename(staging.path(), path).map_err(io_error(path))?;
        // Dropping `staging` now finds nothing left to clean up.
        Ok(files_copied)
    }

    /// Points alias `name` at `identity`.
    ///
    /// Returns `false` when the alias already pointed there. Any other
    /// existing entry called `name` is a conflict.
    pub fn link_alias(&self, name: &str, identity: &Identity) -> Result<bool> {
        validate_name(name)?;
        let link = self.entry_path(name);

        match fs::symlink_metadata(&link) {
            Ok(meta) => {
                if meta.file_type().is_symlink() {
                    let target = fs::read_link(&link).map_err(|source| StashError::Io {
                        path: link.clone(),
                        source,
                    })?;
                    if target == Path::new(identity.as_str()) {
                        debug!(alias = name, identity = %identity, "Alias already in place");
                        return Ok(false);
                    }
                }
                Err(StashError::AliasConflict {
                    name: name.to_string(),
                    identity: identity.to_string(),
                    existing: link,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                symlink_dir(identity.as_str(), &link).map_err(|source| StashError::Io {
                    path: link.clone(),
                    source,
                })?;
                info!(alias = name, identity = %identity, "Linked alias");
                Ok(true)
            }
            Err(source) => Err(StashError::Io { path: link, source }),
        }
    }
}

/// Copies binaries and trees from `source` into `dest`, echoing paths as
/// if they were copied to `shown` (the final snapshot directory).
fn copy_snapshot(source: &ToolchainSource, dest: &Path, shown: &Path) -> Result<usize> {
    let mut copied = 0;

    for binary in source.toolchain.binaries {
        let file = format!("{}{}", binary, std::env::consts::EXE_SUFFIX);
        let src = source.root.join("bin").join(&file);
        if fs::metadata(&src).is_ok() {
            let rel = Path::new("bin").join(&file);
            copy_file_shown(&src, &dest.join(&rel), &shown.join(&rel), source.options)?;
            copied += 1;
        } else {
            debug!(binary = %src.display(), "Toolchain binary not present");
        }
    }

    for tree in source.trees() {
        copied += copy_tree_shown(
            &source.root.join(&tree),
            &dest.join(&tree),
            &shown.join(&tree),
            source.options,
        )?;
    }

    Ok(copied)
}

/// Rejects names that cannot be a plain entry of the store.
fn validate_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name.starts_with(STAGING_PREFIX)
        || name.contains('/')
        || name.contains(std::path::MAIN_SEPARATOR);
    if bad {
        return Err(StashError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StashError {
    let path = path.to_path_buf();
    move |source| StashError::Io { path, source }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(unix)]
fn set_snapshot_mode(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    // Staging directories are created private.
    fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).map_err(|source| StashError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(not(unix))]
fn set_snapshot_mode(_dir: &Path) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn symlink_dir(target: &str, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &str, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
