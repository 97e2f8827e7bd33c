//! Maps raw git status codes onto [`AppFileStatus`].
//!
//! Two code families are handled: the two-character `XY` codes of
//! `git status --porcelain` and the single letters (optionally followed by a
//! similarity score) of `--name-status` output. Both mappings are total.

use crate::config::NameStatusMode;
use crate::error::GitError;
use crate::models::{AppFileStatus, ConflictedFileStatus, FileState};
use crate::types::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static SCORED_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([RC])(\d*)$").expect("Invalid static status code regex"));

/// Splits an `XY` code into its index and worktree characters.
///
/// Returns `None` unless the code is exactly two characters long.
pub fn split_xy(code: &str) -> Option<(char, char)> {
    let mut chars = code.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(x), Some(y), None) => Some((x, y)),
        _ => None,
    }
}

/// Returns `true` for the characters allowed in either half of a porcelain v2
/// `XY` code: `.`, `M`, `T`, `A`, `D`, `R`, `C` and `U`.
pub fn is_porcelain_v2_state(code: char) -> bool {
    matches!(code, '.' | 'M' | 'T' | 'A' | 'D' | 'R' | 'C' | 'U')
}

/// Returns `true` when an `XY` code describes an unmerged path.
pub fn is_conflict_code(x: char, y: char) -> bool {
    x == 'U' || y == 'U' || (x == 'A' && y == 'A') || (x == 'D' && y == 'D')
}

/// Maps a porcelain `XY` code onto an [`AppFileStatus`].
///
/// `old_path` is the rename or copy source when the record carried one. A
/// rename or copy code without a source cannot be represented faithfully and
/// falls back to `Modified`, as does anything outside the porcelain alphabet.
pub fn map_porcelain_status(code: &str, old_path: Option<&str>) -> AppFileStatus {
    let Some((x, y)) = split_xy(code) else {
        return AppFileStatus::Modified;
    };

    if x == '?' && y == '?' {
        return AppFileStatus::Untracked;
    }
    if is_conflict_code(x, y) {
        return AppFileStatus::Conflicted(ConflictedFileStatus::from_codes(x, y));
    }

    let (index, worktree) = match (FileState::from_code(x), FileState::from_code(y)) {
        (Some(index), Some(worktree)) => (index, worktree),
        _ => return AppFileStatus::Modified,
    };

    if let Some(old_path) = old_path {
        if index == FileState::Renamed || worktree == FileState::Renamed {
            return AppFileStatus::Renamed {
                old_path: old_path.to_string(),
            };
        }
        if index == FileState::Copied || worktree == FileState::Copied {
            return AppFileStatus::Copied {
                old_path: old_path.to_string(),
            };
        }
    }

    // The worktree side wins whenever it reports a change of its own.
    let displayed = if worktree == FileState::Unmodified {
        index
    } else {
        worktree
    };
    match displayed {
        FileState::Added => AppFileStatus::New,
        FileState::Deleted => AppFileStatus::Deleted,
        _ => AppFileStatus::Modified,
    }
}

/// Maps a `--name-status` code such as `M`, `A`, `R100` or `C075`.
///
/// Unknown codes map to `Modified` in [`NameStatusMode::Lenient`] and are an
/// error in [`NameStatusMode::Strict`].
pub fn map_name_status(
    code: &str,
    old_path: Option<&str>,
    mode: NameStatusMode,
) -> Result<AppFileStatus> {
    match code {
        "M" | "T" => return Ok(AppFileStatus::Modified),
        "A" => return Ok(AppFileStatus::New),
        "D" => return Ok(AppFileStatus::Deleted),
        "?" => return Ok(AppFileStatus::Untracked),
        _ => {}
    }

    if let Some(caps) = SCORED_CODE_REGEX.captures(code) {
        if let Some(old_path) = old_path {
            let old_path = old_path.to_string();
            return Ok(match &caps[1] {
                "R" => AppFileStatus::Renamed { old_path },
                _ => AppFileStatus::Copied { old_path },
            });
        }
    }

    match mode {
        NameStatusMode::Lenient => Ok(AppFileStatus::Modified),
        NameStatusMode::Strict => Err(GitError::UnknownStatusCode(code.to_string())),
    }
}

/// Returns `true` when a name-status code is followed by two paths.
pub fn is_rename_or_copy_code(code: &str) -> bool {
    SCORED_CODE_REGEX.is_match(code)
}

/// Returns `true` when the code is one [`map_name_status`] knows by name.
pub fn is_known_name_status(code: &str) -> bool {
    matches!(code, "M" | "T" | "A" | "D" | "?") || is_rename_or_copy_code(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIDES: [char; 8] = ['.', 'M', 'T', 'A', 'D', 'R', 'C', 'U'];

    #[test]
    fn test_non_conflict_codes_map_to_plain_or_rename() {
        for x in SIDES.iter() {
            for y in SIDES.iter() {
                let code = format!("{}{}", x, y);
                if is_conflict_code(*x, *y) {
                    continue;
                }
                let status = map_porcelain_status(&code, Some("old"));
                match &status {
                    AppFileStatus::New | AppFileStatus::Modified | AppFileStatus::Deleted => {}
                    AppFileStatus::Renamed { .. } => {
                        assert!(*x == 'R' || *y == 'R', "unexpected rename for {}", code)
                    }
                    AppFileStatus::Copied { .. } => {
                        assert!(*x == 'C' || *y == 'C', "unexpected copy for {}", code)
                    }
                    other => panic!("unexpected {:?} for {}", other, code),
                }
            }
        }
    }

    #[test]
    fn test_u_codes_are_conflicted_with_raw_codes() {
        for x in SIDES.iter() {
            for y in SIDES.iter() {
                if *x != 'U' && *y != 'U' {
                    continue;
                }
                let code = format!("{}{}", x, y);
                match map_porcelain_status(&code, None) {
                    AppFileStatus::Conflicted(conflict) => {
                        assert_eq!((conflict.us, conflict.them), (*x, *y));
                    }
                    other => panic!("expected conflict for {}, got {:?}", code, other),
                }
            }
        }
    }

    #[test]
    fn test_worktree_side_takes_precedence() {
        assert_eq!(map_porcelain_status(".M", None), AppFileStatus::Modified);
        assert_eq!(map_porcelain_status("A.", None), AppFileStatus::New);
        assert_eq!(map_porcelain_status("D.", None), AppFileStatus::Deleted);
        assert_eq!(map_porcelain_status(".D", None), AppFileStatus::Deleted);
        assert_eq!(map_porcelain_status("AM", None), AppFileStatus::Modified);
        assert_eq!(map_porcelain_status("MD", None), AppFileStatus::Deleted);
        assert_eq!(map_porcelain_status(" M", None), AppFileStatus::Modified);
    }

    #[test]
    fn test_rename_and_copy_require_old_path() {
        assert_eq!(
            map_porcelain_status("R.", Some("a.txt")),
            AppFileStatus::Renamed {
                old_path: "a.txt".into()
            }
        );
        assert_eq!(
            map_porcelain_status("C.", Some("a.txt")),
            AppFileStatus::Copied {
                old_path: "a.txt".into()
            }
        );
        assert_eq!(map_porcelain_status("R.", None), AppFileStatus::Modified);
    }

    #[test]
    fn test_porcelain_mapping_is_total() {
        let odd = vec!["", "M", "MMM", "??", "!!", "XY", "é.", "\0\0"];
        for code in odd.iter() {
            let _ = map_porcelain_status(code, None);
        }
        assert_eq!(map_porcelain_status("??", None), AppFileStatus::Untracked);
        assert_eq!(map_porcelain_status("XY", None), AppFileStatus::Modified);
    }

    #[test]
    fn test_both_added_and_both_deleted_are_conflicts() {
        assert!(map_porcelain_status("AA", None).is_conflicted());
        assert!(map_porcelain_status("DD", None).is_conflicted());
    }

    #[test]
    fn test_name_status_letters() {
        let lenient = NameStatusMode::Lenient;
        assert_eq!(map_name_status("M", None, lenient).unwrap(), AppFileStatus::Modified);
        assert_eq!(map_name_status("A", None, lenient).unwrap(), AppFileStatus::New);
        assert_eq!(map_name_status("D", None, lenient).unwrap(), AppFileStatus::Deleted);
        assert_eq!(map_name_status("?", None, lenient).unwrap(), AppFileStatus::Untracked);
        assert_eq!(
            map_name_status("R087", Some("old"), lenient).unwrap(),
            AppFileStatus::Renamed { old_path: "old".into() }
        );
        assert_eq!(
            map_name_status("C", Some("old"), lenient).unwrap(),
            AppFileStatus::Copied { old_path: "old".into() }
        );
    }

    #[test]
    fn test_unknown_name_status_by_mode() {
        assert_eq!(
            map_name_status("X", None, NameStatusMode::Lenient).unwrap(),
            AppFileStatus::Modified
        );
        assert_eq!(
            map_name_status("R1x", Some("old"), NameStatusMode::Lenient).unwrap(),
            AppFileStatus::Modified
        );
        match map_name_status("X", None, NameStatusMode::Strict) {
            Err(GitError::UnknownStatusCode(code)) => assert_eq!(code, "X"),
            other => panic!("expected unknown code error, got {:?}", other),
        }
    }

    #[test]
    fn test_rename_or_copy_detection() {
        for code in ["R", "R100", "C", "C050"].iter() {
            assert!(is_rename_or_copy_code(code), "{}", code);
        }
        for code in ["M", "A", "RM", "R-1", ""].iter() {
            assert!(!is_rename_or_copy_code(code), "{}", code);
        }
    }
}
