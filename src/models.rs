//! Provides structured types representing interpreted git output.

use crate::types::{BranchName, CommitHash};
use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static IDENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?) <(.*?)> (\d+) ([+-])?(\d{2})(\d{2})$")
        .expect("Invalid static identity regex")
});

static AUTHOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*<(.*?)>\s*$").expect("Invalid static author regex"));

/// The state of one side (index or working tree) of a status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FileState {
    Unmodified,
    Modified,
    TypeChanged,
    Added,
    Deleted,
    Renamed,
    Copied,
    UpdatedButUnmerged,
    Untracked,
    Ignored,
}

impl FileState {
    /// Parses one half of a porcelain `XY` code.
    ///
    /// Both the v2 placeholder `.` and the v1 placeholder space mean unmodified.
    pub fn from_code(code: char) -> Option<FileState> {
        match code {
            '.' | ' ' => Some(FileState::Unmodified),
            'M' => Some(FileState::Modified),
            'T' => Some(FileState::TypeChanged),
            'A' => Some(FileState::Added),
            'D' => Some(FileState::Deleted),
            'R' => Some(FileState::Renamed),
            'C' => Some(FileState::Copied),
            'U' => Some(FileState::UpdatedButUnmerged),
            '?' => Some(FileState::Untracked),
            '!' => Some(FileState::Ignored),
            _ => None,
        }
    }
}

/// How the two sides of a merge disagree about an unmerged path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnmergedSummary {
    BothDeleted,
    AddedByUs,
    DeletedByThem,
    AddedByThem,
    DeletedByUs,
    BothAdded,
    BothModified,
}

/// Status payload of a conflicted path: the raw `XY` sub-codes plus the
/// summary git documents for that pair, when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConflictedFileStatus {
    /// State of the path in "our" side (the `X` code).
    pub us: char,
    /// State of the path in "their" side (the `Y` code).
    pub them: char,
    pub summary: Option<UnmergedSummary>,
}

impl ConflictedFileStatus {
    pub fn from_codes(us: char, them: char) -> ConflictedFileStatus {
        let summary = match (us, them) {
            ('D', 'D') => Some(UnmergedSummary::BothDeleted),
            ('A', 'U') => Some(UnmergedSummary::AddedByUs),
            ('U', 'D') => Some(UnmergedSummary::DeletedByThem),
            ('U', 'A') => Some(UnmergedSummary::AddedByThem),
            ('D', 'U') => Some(UnmergedSummary::DeletedByUs),
            ('A', 'A') => Some(UnmergedSummary::BothAdded),
            ('U', 'U') => Some(UnmergedSummary::BothModified),
            _ => None,
        };
        ConflictedFileStatus { us, them, summary }
    }
}

/// The closed set of statuses presented for a changed file.
///
/// `Renamed` and `Copied` always carry the source path; no other variant does.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum AppFileStatus {
    New,
    Modified,
    Deleted,
    Renamed { old_path: String },
    Copied { old_path: String },
    Conflicted(ConflictedFileStatus),
    Untracked,
}

impl AppFileStatus {
    /// The rename or copy source, if this status has one.
    pub fn old_path(&self) -> Option<&str> {
        match self {
            AppFileStatus::Renamed { old_path } | AppFileStatus::Copied { old_path } => {
                Some(old_path)
            }
            _ => None,
        }
    }

    pub fn is_conflicted(&self) -> bool {
        matches!(self, AppFileStatus::Conflicted(_))
    }
}

/// Submodule state reported in the `<sub>` field of a porcelain v2 entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubmoduleStatus {
    pub commit_changed: bool,
    pub modified_changes: bool,
    pub untracked_changes: bool,
}

/// A name, email and point in time, as recorded for a commit author or committer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
    pub date: DateTime<FixedOffset>,
    /// Offset from UTC in minutes, positive east of Greenwich.
    pub tz_offset_minutes: i32,
}

impl CommitIdentity {
    /// Parses the raw `Name <email> 1700000000 +0100` form produced by `--date=raw`.
    pub fn parse(identity: &str) -> Option<CommitIdentity> {
        let caps = IDENTITY_REGEX.captures(identity)?;
        let name = caps.get(1)?.as_str().to_string();
        let email = caps.get(2)?.as_str().to_string();
        let seconds = caps.get(3)?.as_str().parse::<i64>().ok()?;
        let hours = caps.get(5)?.as_str().parse::<i32>().ok()?;
        let minutes = caps.get(6)?.as_str().parse::<i32>().ok()?;

        let sign = match caps.get(4).map(|m| m.as_str()) {
            Some("-") => -1,
            _ => 1,
        };
        let tz_offset_minutes = sign * (hours * 60 + minutes);
        let offset = FixedOffset::east_opt(tz_offset_minutes * 60)?;
        let date = DateTime::from_timestamp(seconds, 0)?.with_timezone(&offset);

        Some(CommitIdentity {
            name,
            email,
            date,
            tz_offset_minutes,
        })
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.date.timestamp()
    }
}

/// A `Name <email>` pair without a date, as found in `Co-authored-by` trailers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GitAuthor {
    pub name: String,
    pub email: String,
}

impl GitAuthor {
    pub fn parse(value: &str) -> Option<GitAuthor> {
        let caps = AUTHOR_REGEX.captures(value.trim())?;
        Some(GitAuthor {
            name: caps.get(1)?.as_str().to_string(),
            email: caps.get(2)?.as_str().to_string(),
        })
    }
}

/// Trailer values grouped by key, in the order keys were first seen.
///
/// Keys compare case-insensitively; the spelling of the first occurrence is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trailers {
    entries: Vec<(String, Vec<String>)>,
}

impl Trailers {
    pub fn new() -> Trailers {
        Trailers::default()
    }

    /// Appends `value` under `key`, after any values already recorded for it.
    pub fn push(&mut self, key: &str, value: &str) {
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
        {
            Some((_, values)) => values.push(value.to_string()),
            None => self
                .entries
                .push((key.to_string(), vec![value.to_string()])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
            .map(|(_, values)| values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Represents a Git commit as read from `git log`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Commit {
    pub sha: CommitHash,
    pub short_sha: CommitHash,
    /// First line of the commit message.
    pub summary: String,
    /// Remainder of the commit message.
    pub body: String,
    pub author: CommitIdentity,
    pub committer: CommitIdentity,
    /// Parent hashes; empty for a root commit, two or more for merges.
    pub parents: Vec<CommitHash>,
    pub trailers: Trailers,
    pub tags: Vec<String>,
}

impl Commit {
    pub fn is_merge_commit(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn trailer(&self, key: &str) -> Option<&[String]> {
        self.trailers.get(key)
    }

    /// Co-authors named in `Co-authored-by` trailers. Values that are not in
    /// `Name <email>` form are skipped.
    pub fn co_authors(&self) -> Vec<GitAuthor> {
        self.trailer("Co-authored-by")
            .unwrap_or_default()
            .iter()
            .filter_map(|value| GitAuthor::parse(value))
            .collect()
    }
}

/// A file changed by a commit (or between two commits).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommittedFileChange {
    pub path: String,
    pub status: AppFileStatus,
    /// The commit-ish the change was computed against, as supplied by the caller.
    pub commitish: String,
}

/// A changed file in the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkingDirectoryFileChange {
    pub path: String,
    pub status: AppFileStatus,
    pub index: FileState,
    pub worktree: FileState,
    pub submodule: Option<SubmoduleStatus>,
}

impl WorkingDirectoryFileChange {
    /// Returns `true` when the index holds a change for this path.
    pub fn is_staged(&self) -> bool {
        !matches!(
            self.index,
            FileState::Unmodified | FileState::Untracked | FileState::Ignored
        )
    }
}

/// Ordered collection of working directory changes, unique by path.
///
/// Inserting a path that is already present replaces the earlier change but
/// keeps its position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(
        from = "Vec<WorkingDirectoryFileChange>",
        into = "Vec<WorkingDirectoryFileChange>"
    )
)]
pub struct WorkingDirectoryStatus {
    files: Vec<WorkingDirectoryFileChange>,
    positions: HashMap<String, usize>,
}

impl WorkingDirectoryStatus {
    pub fn new() -> WorkingDirectoryStatus {
        WorkingDirectoryStatus::default()
    }

    pub fn insert(&mut self, change: WorkingDirectoryFileChange) {
        match self.positions.get(&change.path) {
            Some(&position) => self.files[position] = change,
            None => {
                self.positions.insert(change.path.clone(), self.files.len());
                self.files.push(change);
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&WorkingDirectoryFileChange> {
        self.positions.get(path).map(|&position| &self.files[position])
    }

    pub fn files(&self) -> &[WorkingDirectoryFileChange] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn has_conflicts(&self) -> bool {
        self.files.iter().any(|file| file.status.is_conflicted())
    }
}

impl From<Vec<WorkingDirectoryFileChange>> for WorkingDirectoryStatus {
    fn from(files: Vec<WorkingDirectoryFileChange>) -> Self {
        let mut status = WorkingDirectoryStatus::new();
        for file in files {
            status.insert(file);
        }
        status
    }
}

impl From<WorkingDirectoryStatus> for Vec<WorkingDirectoryFileChange> {
    fn from(status: WorkingDirectoryStatus) -> Self {
        status.files
    }
}

/// Commits ahead of and behind the upstream branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AheadBehind {
    pub ahead: u32,
    pub behind: u32,
}

/// Represents the result of a `git status` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatusResult {
    /// The current branch name, `None` when HEAD is detached.
    pub current_branch: Option<BranchName>,
    /// The commit HEAD points at, `None` on an unborn branch.
    pub current_tip: Option<CommitHash>,
    pub current_upstream_branch: Option<String>,
    pub branch_ahead_behind: Option<AheadBehind>,
    pub stash_count: usize,
    pub working_directory: WorkingDirectoryStatus,
    /// Whether the repository is in a merge state.
    pub merging: bool,
    /// Whether the repository is in a rebase state.
    pub rebasing: bool,
    /// Whether the repository is in a cherry-pick state.
    pub cherry_picking: bool,
}

impl StatusResult {
    pub fn is_clean(&self) -> bool {
        self.working_directory.is_empty()
    }
}
