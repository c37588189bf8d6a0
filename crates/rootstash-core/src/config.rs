//! Shared configuration for rootstash.
//!
//! A [`StashConfig`] is built once at startup and handed to each operation.
//! It answers three questions: where snapshots live, which toolchain is being
//! snapshotted, and for which platform pair.
//!
//! # Store Location
//!
//! The store directory is determined by:
//! 1. `--dir` on the command line
//! 2. `ROOTSTASH_DIR` environment variable
//! 3. `$XDG_CACHE_HOME/rootstash`
//! 4. the platform cache directory plus `rootstash`
//! 5. `~/.cache/rootstash`
//! 6. `.rootstash` in the current directory as fallback

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use rootstash_persistence::CopyOptions;
use tracing::debug;

use crate::error::{Result, StashError};

/// Environment variable for a custom store directory.
pub const STORE_DIR_ENV: &str = "ROOTSTASH_DIR";

/// Environment variable naming the XDG cache base.
pub const XDG_CACHE_ENV: &str = "XDG_CACHE_HOME";

/// Store directory name under a cache directory.
const STORE_SUBDIR: &str = "rootstash";

/// Store directory name when nothing better is known.
const FALLBACK_STORE_DIR: &str = ".rootstash";

/// Describes the toolchain whose installations are snapshotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toolchain {
    /// Driver executable, used to ask for the installation root.
    pub driver: &'static str,
    /// Variable that tells a toolchain binary where its root is.
    pub root_env: &'static str,
    /// Variable overriding the target operating system.
    pub os_env: &'static str,
    /// Variable overriding the target architecture.
    pub arch_env: &'static str,
    /// Executables copied from `<root>/bin`.
    pub binaries: &'static [&'static str],
}

impl Toolchain {
    /// The Go toolchain.
    pub const fn go() -> Self {
        Self {
            driver: "go",
            root_env: "GOROOT",
            os_env: "GOOS",
            arch_env: "GOARCH",
            binaries: &["go", "godoc", "gofmt"],
        }
    }

    /// Locates the installation root of this toolchain.
    ///
    /// Uses the root variable if set, otherwise asks the driver found in
    /// `PATH` (`go env GOROOT`).
    pub fn detect_root(&self) -> Option<PathBuf> {
        if let Some(root) = non_empty_env(self.root_env) {
            return Some(PathBuf::from(root));
        }

        let driver = which::which(self.driver).ok()?;
        let output = Command::new(&driver)
            .args(["env", self.root_env])
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(driver = %driver.display(), root = %root, "Detected toolchain root");
        (!root.is_empty()).then(|| PathBuf::from(root))
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::go()
    }
}

/// Target operating system and architecture, in the toolchain's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// The platform this binary runs on.
    pub fn host() -> Self {
        Self {
            os: host_os(std::env::consts::OS).to_string(),
            arch: host_arch(std::env::consts::ARCH).to_string(),
        }
    }

    /// The host platform with the toolchain's environment overrides applied.
    pub fn from_env(toolchain: &Toolchain) -> Self {
        Self::resolve(
            non_empty_env(toolchain.os_env),
            non_empty_env(toolchain.arch_env),
        )
    }

    /// The host platform with explicit overrides applied.
    pub fn resolve(os: Option<String>, arch: Option<String>) -> Self {
        let host = Self::host();
        Self {
            os: os.unwrap_or(host.os),
            arch: arch.unwrap_or(host.arch),
        }
    }

    /// Directory component such as `linux_amd64`.
    pub fn pair(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}

fn host_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        other => other,
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Default store directory, ignoring any command-line override.
pub fn default_store_dir() -> PathBuf {
    if let Some(dir) = non_empty_env(STORE_DIR_ENV) {
        return PathBuf::from(dir);
    }
    store_dir_from(
        non_empty_env(XDG_CACHE_ENV).map(PathBuf::from),
        dirs::cache_dir(),
        dirs::home_dir(),
    )
}

/// Picks the store directory from the candidate cache locations.
pub fn store_dir_from(
    xdg_cache: Option<PathBuf>,
    platform_cache: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    xdg_cache
        .or(platform_cache)
        .or_else(|| home.map(|h| h.join(".cache")))
        .map(|cache| cache.join(STORE_SUBDIR))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_STORE_DIR))
}

/// Configuration passed to every operation.
#[derive(Debug, Clone)]
pub struct StashConfig {
    /// Directory holding snapshots and aliases.
    pub store_dir: PathBuf,
    /// Explicit toolchain root; detected on demand when unset.
    pub toolchain_root: Option<PathBuf>,
    pub toolchain: Toolchain,
    pub platform: Platform,
    /// Echo file copies during save.
    pub verbose: bool,
}

impl StashConfig {
    /// Creates a Go configuration for the given store.
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        let toolchain = Toolchain::go();
        Self {
            store_dir: store_dir.into(),
            toolchain_root: None,
            platform: Platform::from_env(&toolchain),
            toolchain,
            verbose: false,
        }
    }

    /// Sets the toolchain root explicitly.
    pub fn with_toolchain_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.toolchain_root = Some(root.into());
        self
    }

    /// Enables copy echoing.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Returns the toolchain root, detecting it if none was given.
    pub fn resolve_toolchain_root(&self) -> Result<PathBuf> {
        match &self.toolchain_root {
            Some(root) => Ok(root.clone()),
            None => self
                .toolchain
                .detect_root()
                .ok_or(StashError::ToolchainRootUnknown(self.toolchain.root_env)),
        }
    }

    /// Copy options for this configuration.
    pub fn copy_options(&self) -> CopyOptions {
        CopyOptions {
            verbose: self.verbose,
        }
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }
}
