//! Parser for `git status --porcelain=2 --branch -z` output.
//!
//! Records are NUL-terminated. Each one is a `#` header, an ordinary (`1`),
//! renamed/copied (`2`), unmerged (`u`), untracked (`?`) or ignored (`!`)
//! entry. A `2` entry is followed by one extra record holding the rename or
//! copy source.
//!
//! The format is versioned and stable, so any record that does not match one
//! of these shapes is an error rather than something to skip.

use crate::error::GitError;
use crate::models::SubmoduleStatus;
use crate::status_code::{is_porcelain_v2_state, split_xy};
use crate::types::Result;
use std::str::Split;

/// A `# key value` line, with the leading `# ` removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusHeader {
    pub value: String,
}

impl StatusHeader {
    /// The header key, e.g. `branch.head`.
    pub fn key(&self) -> &str {
        self.value.split(' ').next().unwrap_or("")
    }

    /// Everything after the key.
    pub fn rest(&self) -> &str {
        self.value
            .split_once(' ')
            .map(|(_, rest)| rest)
            .unwrap_or("")
    }
}

/// What kind of record a [`StatusEntry`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Ordinary,
    Renamed { old_path: String },
    Copied { old_path: String },
    Conflicted,
    Untracked,
    Ignored,
}

/// One non-header porcelain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub kind: EntryKind,
    pub path: String,
    /// The raw `XY` code; `??` for untracked and `!!` for ignored entries.
    pub status_code: String,
    pub submodule: Option<SubmoduleStatus>,
}

impl StatusEntry {
    pub fn old_path(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Renamed { old_path } | EntryKind::Copied { old_path } => Some(old_path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusItem {
    Header(StatusHeader),
    Entry(StatusEntry),
}

/// Lazily parses porcelain v2 records in the order git wrote them.
///
/// After the first error the iterator is exhausted.
pub struct PorcelainRecords<'a> {
    records: Option<Split<'a, char>>,
}

/// Starts parsing `output`. A single trailing NUL terminator is expected and
/// dropped; empty output yields no records.
pub fn parse_porcelain_status(output: &str) -> PorcelainRecords<'_> {
    let trimmed = output.strip_suffix('\0').unwrap_or(output);
    let records = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.split('\0'))
    };
    PorcelainRecords { records }
}

impl<'a> Iterator for PorcelainRecords<'a> {
    type Item = Result<StatusItem>;

    fn next(&mut self) -> Option<Self::Item> {
        let records = self.records.as_mut()?;
        let record = records.next()?;
        let item = parse_record(record, records);
        if item.is_err() {
            self.records = None;
        }
        Some(item)
    }
}

fn malformed(record: &str, reason: &str) -> GitError {
    GitError::MalformedStatus {
        record: record.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_record<'a>(record: &'a str, rest: &mut Split<'a, char>) -> Result<StatusItem> {
    let mut chars = record.chars();
    match (chars.next(), chars.next()) {
        (Some('#'), Some(' ')) => Ok(StatusItem::Header(StatusHeader {
            value: record[2..].to_string(),
        })),
        (Some('1'), Some(' ')) => parse_ordinary(record),
        (Some('2'), Some(' ')) => {
            let old_path = rest
                .next()
                .filter(|path| !path.is_empty())
                .ok_or_else(|| malformed(record, "missing rename or copy source"))?;
            parse_renamed_or_copied(record, old_path)
        }
        (Some('u'), Some(' ')) => parse_unmerged(record),
        (Some('?'), Some(' ')) => parse_path_only(record, "??", EntryKind::Untracked),
        (Some('!'), Some(' ')) => parse_path_only(record, "!!", EntryKind::Ignored),
        _ => Err(malformed(record, "unknown record type")),
    }
}

// 1 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>
fn parse_ordinary(record: &str) -> Result<StatusItem> {
    let fields = fields(record, 9, "ordinary")?;
    entry(record, fields[1], fields[2], fields[8], EntryKind::Ordinary)
}

// 2 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <X><score> <path>
fn parse_renamed_or_copied(record: &str, old_path: &str) -> Result<StatusItem> {
    let fields = fields(record, 10, "rename or copy")?;
    let old_path = old_path.to_string();
    let kind = match fields[8].chars().next() {
        Some('R') => EntryKind::Renamed { old_path },
        Some('C') => EntryKind::Copied { old_path },
        _ => return Err(malformed(record, "rename or copy score must start with R or C")),
    };
    entry(record, fields[1], fields[2], fields[9], kind)
}

// u <XY> <sub> <m1> <m2> <m3> <mW> <h1> <h2> <h3> <path>
fn parse_unmerged(record: &str) -> Result<StatusItem> {
    let fields = fields(record, 11, "unmerged")?;
    entry(record, fields[1], fields[2], fields[10], EntryKind::Conflicted)
}

fn parse_path_only(record: &str, code: &str, kind: EntryKind) -> Result<StatusItem> {
    let path = &record[2..];
    if path.is_empty() {
        return Err(malformed(record, "missing path"));
    }
    Ok(StatusItem::Entry(StatusEntry {
        kind,
        path: path.to_string(),
        status_code: code.to_string(),
        submodule: None,
    }))
}

/// Splits off `count` space-separated fields; the last one (the path) keeps
/// any spaces it contains.
fn fields<'a>(record: &'a str, count: usize, what: &str) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = record.splitn(count, ' ').collect();
    if fields.len() != count || fields[count - 1].is_empty() {
        return Err(malformed(record, &format!("truncated {} entry", what)));
    }
    Ok(fields)
}

fn entry(record: &str, code: &str, sub: &str, path: &str, kind: EntryKind) -> Result<StatusItem> {
    let valid_code = split_xy(code)
        .map(|(x, y)| is_porcelain_v2_state(x) && is_porcelain_v2_state(y))
        .unwrap_or(false);
    if !valid_code {
        return Err(malformed(record, "invalid XY status code"));
    }
    let submodule = parse_submodule(sub).ok_or_else(|| malformed(record, "invalid submodule field"))?;
    Ok(StatusItem::Entry(StatusEntry {
        kind,
        path: path.to_string(),
        status_code: code.to_string(),
        submodule,
    }))
}

/// `N...` for plain files, `S<c><m><u>` for submodules.
fn parse_submodule(field: &str) -> Option<Option<SubmoduleStatus>> {
    let bytes = field.as_bytes();
    if bytes.len() != 4 {
        return None;
    }
    match bytes[0] {
        b'N' if &bytes[1..] == b"..." => Some(None),
        b'S' => Some(Some(SubmoduleStatus {
            commit_changed: flag(bytes[1], b'C')?,
            modified_changes: flag(bytes[2], b'M')?,
            untracked_changes: flag(bytes[3], b'U')?,
        })),
        _ => None,
    }
}

fn flag(byte: u8, set: u8) -> Option<bool> {
    match byte {
        b'.' => Some(false),
        b if b == set => Some(true),
        _ => None,
    }
}
