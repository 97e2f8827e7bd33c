//! Parser for `--name-status -z` output from `git log` or `git diff`.
//!
//! The output is a flat list of NUL-terminated tokens. A record is a status
//! token followed by one path, except for renames and copies (`R`, `C`, with
//! an optional similarity score such as `R100`) which carry the source path
//! and then the destination path. Reading a rename as a one-path record
//! shifts every following record, so all cursor movement goes through
//! [`next_record`].

use crate::config::NameStatusMode;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::GitError;
use crate::models::CommittedFileChange;
use crate::status_code::{is_known_name_status, is_rename_or_copy_code, map_name_status};
use crate::types::Result;

/// One name-status record, borrowed from the token list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameStatusRecord<'a> {
    pub code: &'a str,
    pub old_path: Option<&'a str>,
    pub path: &'a str,
}

/// Splits output on NUL, dropping the terminator after the last token.
pub fn tokenize(output: &str) -> Vec<&str> {
    let trimmed = output.strip_suffix('\0').unwrap_or(output);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('\0').collect()
}

/// Reads the record starting at `index`.
///
/// Returns the record and the index of the first token after it, or `None`
/// when no tokens remain. Status tokens may carry a leading newline (git
/// writes one after an empty `--format`); blank status tokens are skipped.
pub fn next_record<'a>(
    tokens: &[&'a str],
    index: usize,
) -> Result<Option<(NameStatusRecord<'a>, usize)>> {
    let mut index = index;
    let code = loop {
        let Some(token) = tokens.get(index) else {
            return Ok(None);
        };
        let code = token.trim_start_matches('\n');
        if !code.is_empty() {
            break code;
        }
        index += 1;
    };

    let path_at = |at: usize, what: &str| -> Result<&'a str> {
        tokens
            .get(at)
            .copied()
            .filter(|path| !path.is_empty())
            .ok_or_else(|| GitError::MalformedNameStatus {
                index: at,
                reason: format!("missing {} for status {:?}", what, code),
            })
    };

    if is_rename_or_copy_code(code) {
        let old_path = path_at(index + 1, "source path")?;
        let path = path_at(index + 2, "destination path")?;
        Ok(Some((
            NameStatusRecord {
                code,
                old_path: Some(old_path),
                path,
            },
            index + 3,
        )))
    } else {
        let path = path_at(index + 1, "path")?;
        Ok(Some((
            NameStatusRecord {
                code,
                old_path: None,
                path,
            },
            index + 2,
        )))
    }
}

/// Parses name-status output into changes tagged with `commitish`.
pub fn parse_changed_files(
    output: &str,
    commitish: &str,
    mode: NameStatusMode,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<CommittedFileChange>> {
    let tokens = tokenize(output);
    let mut changes = Vec::new();
    let mut index = 0;

    while let Some((record, next)) = next_record(&tokens, index)? {
        let status = map_name_status(record.code, record.old_path, mode)?;
        if !is_known_name_status(record.code) {
            sink.report(Diagnostic::UnknownNameStatus {
                code: record.code.to_string(),
                path: record.path.to_string(),
            });
        }
        changes.push(CommittedFileChange {
            path: record.path.to_string(),
            status,
            commitish: commitish.to_string(),
        });
        index = next;
    }

    Ok(changes)
}
