//! Listing saved snapshots.

use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{Local, TimeZone};
use rootstash_persistence::read_optional;
use tracing::{debug, warn};

use crate::commit::CommitInfo;
use crate::error::{Result, StashError};
use crate::store::{COMMIT_FILE, STAGING_PREFIX};

/// One saved snapshot as shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Snapshot directory name.
    pub identity: String,
    /// Parsed `commit` file, if the snapshot has one.
    pub commit: Option<CommitInfo>,
    /// Aliases linking to this snapshot, in name order.
    pub aliases: Vec<String>,
}

impl CatalogEntry {
    fn new(identity: String) -> Self {
        Self {
            identity,
            commit: None,
            aliases: Vec::new(),
        }
    }

    fn author_date(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.commit.as_ref().and_then(|c| c.author_date)
    }

    /// Renders the entry with its timestamp in `zone`.
    ///
    /// `<identity> [<timestamp>] [[alias ...]] [<summary>]`, each optional
    /// field present only when known.
    pub fn render_in<Tz: TimeZone>(&self, zone: &Tz) -> String
    where
        Tz::Offset: Display,
    {
        let mut line = self.identity.clone();
        if let Some(commit) = &self.commit {
            if let Some(date) = commit.format_author_date(zone) {
                line.push(' ');
                line.push_str(&date);
            }
        }
        if !self.aliases.is_empty() {
            line.push_str(&format!(" [{}]", self.aliases.join(" ")));
        }
        if let Some(commit) = &self.commit {
            if !commit.summary.is_empty() {
                line.push(' ');
                line.push_str(&commit.summary);
            }
        }
        line
    }

    /// Renders the entry in local time.
    pub fn render(&self) -> String {
        self.render_in(&Local)
    }
}

/// Scans `dir` and returns its snapshots, oldest author time first.
///
/// A missing store is an empty catalog. Snapshots without a `commit` file
/// are kept and sort first; ties keep name order.
pub fn scan(dir: &Path) -> Result<Vec<CatalogEntry>> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "Store does not exist");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StashError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut listing = Vec::new();
    for entry in read {
        let entry = entry.map_err(|source| StashError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(STAGING_PREFIX) {
            continue;
        }
        let file_type = entry.file_type().map_err(|source| StashError::Io {
            path: entry.path(),
            source,
        })?;
        listing.push((name, file_type));
    }
    listing.sort_by(|a, b| a.0.cmp(&b.0));

    let mut entries = Vec::new();
    let mut by_identity = HashMap::new();
    for (name, file_type) in &listing {
        if !file_type.is_dir() {
            continue;
        }
        let mut snapshot = CatalogEntry::new(name.clone());
        if let Some(object) = read_optional(&dir.join(name).join(COMMIT_FILE))? {
            snapshot.commit = Some(CommitInfo::parse(&object)?);
        }
        by_identity.insert(name.clone(), entries.len());
        entries.push(snapshot);
    }

    for (name, file_type) in &listing {
        if !file_type.is_symlink() {
            continue;
        }
        let target = match fs::read_link(dir.join(name)) {
            Ok(target) => target,
            Err(e) => {
                warn!(alias = %name, error = %e, "Unreadable alias");
                continue;
            }
        };
        if let Some(&index) = target.to_str().and_then(|t| by_identity.get(t)) {
            entries[index].aliases.push(name.clone());
        }
    }

    entries.sort_by_key(CatalogEntry::author_date);
    Ok(entries)
}
