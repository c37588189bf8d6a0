//! Persistence layer for rootstash.
//!
//! This crate provides the filesystem primitives a snapshot is built from:
//! faithful file and tree copies (content, permission bits, modification
//! time) and the small `diff`/`commit` metadata files.
//!
//! # Example
//!
//! ```no_run
//! use rootstash_persistence::{copy_tree, CopyOptions};
//! use std::path::Path;
//!
//! let copied = copy_tree(
//!     Path::new("/usr/local/go/src"),
//!     Path::new("/tmp/snapshot/src"),
//!     CopyOptions::default(),
//! )
//! .unwrap();
//! println!("copied {} files", copied);
//! ```

pub mod copy;
pub mod error;
pub mod metadata;

pub use copy::{
    copy_file, copy_file_shown, copy_tree, copy_tree_shown, echo_line, is_excluded, CopyOptions,
};
pub use error::{PersistenceError, Result};
pub use metadata::{read_optional, write_metadata};
