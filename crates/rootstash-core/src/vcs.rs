//! Version-control queries against the toolchain checkout.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Result, StashError};

/// The three questions a save asks of version control.
pub trait Vcs {
    /// Short form of the current revision, without surrounding whitespace.
    fn short_revision(&self) -> Result<String>;

    /// Working-tree diff against the current revision.
    fn diff(&self) -> Result<Vec<u8>>;

    /// Raw serialized commit object of the current revision.
    fn commit_object(&self) -> Result<Vec<u8>>;
}

/// [`Vcs`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Queries the repository at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Runs `git -C <root> <args>` and returns its stdout.
    fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let describe = || {
            let mut all = vec!["-C".to_string(), self.root.display().to_string()];
            all.extend(args.iter().map(|a| a.to_string()));
            all.join(" ")
        };

        debug!(args = %describe(), "Running git");
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| StashError::VcsLaunch {
                args: describe(),
                source,
            })?;

        if !output.status.success() {
            return Err(StashError::VcsFailed {
                args: describe(),
                status: output.status,
            });
        }
        Ok(output.stdout)
    }
}

impl Vcs for GitCli {
    fn short_revision(&self) -> Result<String> {
        let out = self.run(&["rev-parse", "--short", "HEAD"])?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }

    fn diff(&self) -> Result<Vec<u8>> {
        self.run(&["diff", "HEAD"])
    }

    fn commit_object(&self) -> Result<Vec<u8>> {
        self.run(&["cat-file", "commit", "HEAD"])
    }
}
