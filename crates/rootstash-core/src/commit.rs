//! Metadata extracted from raw commit objects.

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::error::{Result, StashError};

/// Timestamp format used in catalog lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Author time and summary of a saved commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitInfo {
    /// Author timestamp; `None` when the object has no author header.
    pub author_date: Option<DateTime<Utc>>,
    /// First line of the commit message.
    pub summary: String,
}

impl CommitInfo {
    /// Parses the output of `git cat-file commit`.
    ///
    /// Headers end at the first blank line; the line after it is the summary.
    /// The author time is the second-to-last field of the `author ` header.
    pub fn parse(object: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(object);
        let lines: Vec<&str> = text.split('\n').collect();
        let mut info = CommitInfo::default();

        for (i, line) in lines.iter().enumerate() {
            if line.starts_with("author ") {
                info.author_date = Some(parse_author_time(line)?);
            }
            if line.is_empty() {
                info.summary = lines.get(i + 1).copied().unwrap_or_default().to_string();
                break;
            }
        }

        Ok(info)
    }

    /// Author time in `zone`, formatted for catalog output.
    pub fn format_author_date<Tz: TimeZone>(&self, zone: &Tz) -> Option<String>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.author_date
            .map(|date| date.with_timezone(zone).format(TIMESTAMP_FORMAT).to_string())
    }

    /// Author time in the local zone, formatted for catalog output.
    pub fn local_author_date(&self) -> Option<String> {
        self.format_author_date(&Local)
    }
}

fn parse_author_time(line: &str) -> Result<DateTime<Utc>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let field = fields
        .len()
        .checked_sub(2)
        .map(|i| fields[i])
        .ok_or_else(|| StashError::MalformedCommit(format!("short author line {:?}", line)))?;

    let secs: i64 = field
        .parse()
        .map_err(|e| StashError::MalformedCommit(format!("{:?}: {}", field, e)))?;

    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| StashError::MalformedCommit(format!("timestamp {} out of range", secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMIT: &str = "tree 9bd0f0b5ab1d4d8ac6a9f2e1f8c4b6b0b3a0f1de\n\
parent 1f0e2d3c4b5a69788796a5b4c3d2e1f00f1e2d3c\n\
author Jane Doe <jane@example.com> 1623715200 -0700\n\
committer Jane Doe <jane@example.com> 1623801600 -0700\n\
\n\
cmd/compile: inline more closures\n\
\n\
Longer description.\n";

    #[test]
    fn test_parse_author_and_summary() {
        let info = CommitInfo::parse(COMMIT.as_bytes()).unwrap();
        assert_eq!(info.author_date.unwrap().timestamp(), 1_623_715_200);
        assert_eq!(info.summary, "cmd/compile: inline more closures");
    }

    #[test]
    fn test_parse_uses_author_not_committer() {
        let info = CommitInfo::parse(COMMIT.as_bytes()).unwrap();
        assert_ne!(info.author_date.unwrap().timestamp(), 1_623_801_600);
    }

    #[test]
    fn test_parse_without_author_leaves_date_unset() {
        let info = CommitInfo::parse(b"tree abc\n\nsummary only\n").unwrap();
        assert!(info.author_date.is_none());
        assert_eq!(info.summary, "summary only");
    }

    #[test]
    fn test_parse_without_blank_line_has_empty_summary() {
        let info = CommitInfo::parse(b"tree abc\nauthor A <a@b> 0 +0000").unwrap();
        assert_eq!(info.summary, "");
        assert_eq!(info.author_date.unwrap().timestamp(), 0);
    }

    #[test]
    fn test_parse_trailing_blank_line_has_empty_summary() {
        let info = CommitInfo::parse(b"tree abc\nauthor A <a@b> 5 +0000\n").unwrap();
        assert_eq!(info.summary, "");
    }

    #[test]
    fn test_parse_ignores_author_in_message_body() {
        let info = CommitInfo::parse(b"tree abc\n\nfix\nauthor X <x> nope +0000\n").unwrap();
        assert!(info.author_date.is_none());
        assert_eq!(info.summary, "fix");
    }

    #[test]
    fn test_parse_malformed_author_time() {
        let err = CommitInfo::parse(b"author A <a@b> yesterday +0000\n\nmsg\n").unwrap_err();
        assert!(matches!(err, StashError::MalformedCommit(_)));
    }

    #[test]
    fn test_parse_short_author_line() {
        let err = CommitInfo::parse(b"author \n\nmsg\n").unwrap_err();
        assert!(matches!(err, StashError::MalformedCommit(_)));
    }

    #[test]
    fn test_format_author_date_in_utc() {
        let info = CommitInfo::parse(COMMIT.as_bytes()).unwrap();
        assert_eq!(
            info.format_author_date(&Utc).as_deref(),
            Some("2021-06-15T00:00:00")
        );
        assert!(CommitInfo::default().format_author_date(&Utc).is_none());
    }
}
