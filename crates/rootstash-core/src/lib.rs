//! Core logic for rootstash.
//!
//! Snapshots of a toolchain installation are keyed by a content identity
//! derived from version control, stored as plain directories, named by
//! symlink aliases, listed in author-time order, and run in place.
//!
//! # Example
//!
//! ```no_run
//! use rootstash_core::{catalog, GitCli, SnapshotStore, StashConfig, ToolchainSource};
//!
//! let config = StashConfig::new("/home/user/.cache/rootstash");
//! let root = config.resolve_toolchain_root().unwrap();
//! let store = SnapshotStore::new(config.store_dir());
//!
//! store
//!     .save(&ToolchainSource::from_config(&config, &root), &GitCli::new(&root), Some("tip"))
//!     .unwrap();
//!
//! for entry in catalog::scan(config.store_dir()).unwrap() {
//!     println!("{}", entry.render());
//! }
//! ```

pub mod catalog;
pub mod commit;
pub mod config;
pub mod error;
pub mod identity;
pub mod runner;
pub mod store;
pub mod vcs;

pub use catalog::CatalogEntry;
pub use commit::CommitInfo;
pub use config::{Platform, StashConfig, Toolchain};
pub use error::{Result, StashError};
pub use identity::{resolve_identity, Identity, ResolvedIdentity};
pub use runner::Runner;
pub use store::{SaveReport, SnapshotStore, ToolchainSource};
pub use vcs::{GitCli, Vcs};
