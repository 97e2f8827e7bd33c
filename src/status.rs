//! Builds a [`StatusResult`] from porcelain v2 records.

use crate::config::ParserConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::GitError;
use crate::models::{
    AheadBehind, AppFileStatus, FileState, StatusResult, WorkingDirectoryFileChange,
    WorkingDirectoryStatus,
};
use crate::porcelain::{parse_porcelain_status, EntryKind, StatusEntry, StatusHeader, StatusItem};
use crate::status_code::{map_porcelain_status, split_xy};
use crate::types::{BranchName, CommitHash, Result};
use std::str::FromStr;

/// Parses the complete output of one `git status --porcelain=2 --branch -z`
/// invocation.
///
/// Output larger than `config.max_status_bytes` is not parsed: `Ok(None)` is
/// returned and an [`Diagnostic::OversizedStatus`] event is reported.
pub fn parse_status_output(
    output: &str,
    config: &ParserConfig,
    sink: &dyn DiagnosticSink,
) -> Result<Option<StatusResult>> {
    if output.len() > config.max_status_bytes {
        sink.report(Diagnostic::OversizedStatus {
            size: output.len(),
            limit: config.max_status_bytes,
        });
        return Ok(None);
    }

    let mut status = StatusResult::default();
    let mut files = WorkingDirectoryStatus::new();

    for item in parse_porcelain_status(output) {
        match item? {
            StatusItem::Header(header) => apply_header(&mut status, &header)?,
            StatusItem::Entry(entry) => {
                if let Some(change) = to_file_change(entry) {
                    files.insert(change);
                }
            }
        }
    }

    status.working_directory = files;
    Ok(Some(status))
}

fn malformed_header(header: &StatusHeader, reason: &str) -> GitError {
    GitError::MalformedStatus {
        record: format!("# {}", header.value),
        reason: reason.to_string(),
    }
}

fn apply_header(status: &mut StatusResult, header: &StatusHeader) -> Result<()> {
    let value = header.rest();
    match header.key() {
        "branch.oid" => {
            status.current_tip = match value {
                "(initial)" => None,
                sha => Some(
                    CommitHash::from_str(sha)
                        .map_err(|_| malformed_header(header, "invalid branch tip"))?,
                ),
            };
        }
        "branch.head" => {
            status.current_branch = match value {
                "(detached)" => None,
                name => Some(
                    BranchName::from_str(name)
                        .map_err(|_| malformed_header(header, "invalid branch name"))?,
                ),
            };
        }
        "branch.upstream" => {
            status.current_upstream_branch = Some(value.to_string());
        }
        "branch.ab" => {
            status.branch_ahead_behind = Some(
                parse_ahead_behind(value)
                    .ok_or_else(|| malformed_header(header, "invalid ahead/behind counts"))?,
            );
        }
        "stash" => {
            status.stash_count = value
                .parse()
                .map_err(|_| malformed_header(header, "invalid stash count"))?;
        }
        // Headers added by newer git versions carry nothing we use.
        _ => {}
    }
    Ok(())
}

// `+<ahead> -<behind>`
fn parse_ahead_behind(value: &str) -> Option<AheadBehind> {
    let (ahead, behind) = value.split_once(' ')?;
    Some(AheadBehind {
        ahead: ahead.strip_prefix('+')?.parse().ok()?,
        behind: behind.strip_prefix('-')?.parse().ok()?,
    })
}

/// Converts a porcelain entry into a working directory change.
///
/// Returns `None` for entries that are not shown: ignored files, and paths
/// added to the index and then deleted from the worktree (`AD`), which no
/// longer exist anywhere.
pub fn to_file_change(entry: StatusEntry) -> Option<WorkingDirectoryFileChange> {
    let (index, worktree) = match entry.kind {
        EntryKind::Ignored => return None,
        EntryKind::Untracked => (FileState::Untracked, FileState::Untracked),
        _ => {
            let (x, y) = split_xy(&entry.status_code)?;
            (FileState::from_code(x)?, FileState::from_code(y)?)
        }
    };

    if index == FileState::Added && worktree == FileState::Deleted {
        return None;
    }

    let status = match &entry.kind {
        EntryKind::Untracked => AppFileStatus::Untracked,
        _ => map_porcelain_status(&entry.status_code, entry.old_path()),
    };

    Some(WorkingDirectoryFileChange {
        path: entry.path,
        status,
        index,
        worktree,
        submodule: entry.submodule,
    })
}
