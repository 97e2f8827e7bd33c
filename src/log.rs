//! Parser for `git log` output produced with a NUL/unit-separator pretty format.
//!
//! Every commit is written as nine fields joined by `0x1F` and records are
//! separated by NUL (`-z`). The field order is fixed by [`LOG_FORMAT_FIELDS`]
//! and [`parse_log_output`] relies on it.

use crate::error::GitError;
use crate::models::{Commit, CommitIdentity, Trailers};
use crate::types::{CommitHash, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

pub const FIELD_SEPARATOR: char = '\u{1f}';
pub const RECORD_SEPARATOR: char = '\0';

/// Trailer separators git uses when `trailer.separators` is not configured.
pub const DEFAULT_TRAILER_SEPARATORS: &str = ":";

/// Pretty-format placeholders, in record order.
pub const LOG_FORMAT_FIELDS: [&str; 9] = [
    "%H",
    "%h",
    "%s",
    "%b",
    "%an <%ae> %ad",
    "%cn <%ce> %cd",
    "%P",
    "%(trailers:unfold,only)",
    "%D",
];

static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^tag: (\S+)$").expect("Invalid static tag regex"));

/// The `--format=` argument matching [`LOG_FORMAT_FIELDS`].
pub fn log_format_arg() -> String {
    format!("--format={}", LOG_FORMAT_FIELDS.join("%x1F"))
}

/// What to ask `git log` for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub revision_range: String,
    pub max_count: Option<usize>,
    pub skip: Option<usize>,
    /// Passed to git verbatim, before the `--` terminator.
    pub extra_args: Vec<String>,
}

impl LogQuery {
    pub fn new<S: Into<String>>(revision_range: S) -> LogQuery {
        LogQuery {
            revision_range: revision_range.into(),
            max_count: None,
            skip: None,
            extra_args: Vec::new(),
        }
    }

    pub fn max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Full argument vector for the `git log` invocation.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "log".to_string(),
            self.revision_range.clone(),
            "--date=raw".to_string(),
        ];
        if let Some(max_count) = self.max_count {
            args.push(format!("--max-count={}", max_count));
        }
        if let Some(skip) = self.skip {
            args.push(format!("--skip={}", skip));
        }
        args.push(log_format_arg());
        args.push("-z".to_string());
        args.push("--no-show-signature".to_string());
        args.push("--no-color".to_string());
        args.extend(self.extra_args.iter().cloned());
        args.push("--".to_string());
        args
    }
}

fn malformed(record: &str, reason: &str) -> GitError {
    GitError::MalformedCommit {
        record: record.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses the stdout of a `git log` run with [`log_format_arg`].
///
/// `trailer_separators` is the repository's `trailer.separators` value. Any
/// record whose author or committer cannot be parsed fails the whole batch.
pub fn parse_log_output(output: &str, trailer_separators: &str) -> Result<Vec<Commit>> {
    let trimmed = output.strip_suffix(RECORD_SEPARATOR).unwrap_or(output);
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    trimmed
        .split(RECORD_SEPARATOR)
        .map(|record| parse_commit_record(record, trailer_separators))
        .collect()
}

/// Parses one `0x1F`-separated commit record.
pub fn parse_commit_record(record: &str, trailer_separators: &str) -> Result<Commit> {
    let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
    if fields.len() != LOG_FORMAT_FIELDS.len() {
        return Err(malformed(
            record,
            &format!(
                "expected {} fields, found {}",
                LOG_FORMAT_FIELDS.len(),
                fields.len()
            ),
        ));
    }

    let sha = CommitHash::from_str(fields[0]).map_err(|_| malformed(record, "invalid sha"))?;
    let short_sha =
        CommitHash::from_str(fields[1]).map_err(|_| malformed(record, "invalid short sha"))?;
    let identity = |raw: &str| {
        CommitIdentity::parse(raw).ok_or_else(|| GitError::MalformedIdentity {
            sha: sha.to_string(),
            identity: raw.to_string(),
        })
    };
    let author = identity(fields[4])?;
    let committer = identity(fields[5])?;
    let parents = parse_parents(fields[6]).map_err(|_| malformed(record, "invalid parent sha"))?;

    Ok(Commit {
        sha,
        short_sha,
        summary: fields[2].to_string(),
        body: fields[3].to_string(),
        author,
        committer,
        parents,
        trailers: parse_trailers(fields[7], trailer_separators),
        tags: extract_tags(fields[8]),
    })
}

/// Splits the space-separated `%P` field. An empty field is a root commit.
pub fn parse_parents(field: &str) -> Result<Vec<CommitHash>> {
    field.split_whitespace().map(CommitHash::from_str).collect()
}

/// Parses an unfolded trailers block (one `Key<sep> value` per line).
///
/// Separators are tried in the order given; the first one found after at
/// least one key character splits the line. Lines without one are skipped.
pub fn parse_trailers(block: &str, separators: &str) -> Trailers {
    let mut trailers = Trailers::new();
    for line in block.lines() {
        if let Some((key, value)) = parse_trailer_line(line, separators) {
            trailers.push(key, value);
        }
    }
    trailers
}

fn parse_trailer_line<'a>(line: &'a str, separators: &str) -> Option<(&'a str, &'a str)> {
    separators.chars().find_map(|separator| {
        let index = line.find(separator).filter(|index| *index > 0)?;
        let key = line[..index].trim();
        let value = line[index + separator.len_utf8()..].trim();
        (!key.is_empty()).then_some((key, value))
    })
}

/// Extracts tag names from a `%D` decoration such as
/// `HEAD -> main, tag: v1.0.0, origin/main`.
pub fn extract_tags(decoration: &str) -> Vec<String> {
    decoration
        .split(", ")
        .filter_map(|entry| TAG_REGEX.captures(entry.trim()))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}
