//! Drives `Repository` with canned git output.

use gitpilot_porcelain::diagnostics::{Diagnostic, MemorySink};
use gitpilot_porcelain::exec::{ExecOptions, GitExecutor, GitOutput};
use gitpilot_porcelain::log::LogQuery;
use gitpilot_porcelain::models::AppFileStatus;
use gitpilot_porcelain::{GitError, NameStatusMode, ParserConfig, Repository, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

const SHA_A: &str = "1111111111111111111111111111111111111111";
const SHA_B: &str = "2222222222222222222222222222222222222222";

/// Answers invocations in order and records the arguments it saw.
#[derive(Debug, Default)]
struct ScriptedExecutor {
    responses: Mutex<VecDeque<(i32, Vec<u8>)>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedExecutor {
    fn respond(self, exit_code: i32, stdout: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back((exit_code, stdout.as_bytes().to_vec()));
        self
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl GitExecutor for ScriptedExecutor {
    fn exec(&self, _dir: &Path, args: &[String], options: &ExecOptions) -> Result<GitOutput> {
        self.calls.lock().unwrap().push(args.to_vec());
        let (exit_code, stdout) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected git invocation");
        if !options.is_success(Some(exit_code)) {
            return Err(GitError::GitError {
                exit_code: Some(exit_code),
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: "fatal: scripted failure".to_string(),
            });
        }
        Ok(GitOutput {
            exit_code: Some(exit_code),
            stdout,
            stderr: Vec::new(),
        })
    }
}

type Scripted = (Repository<Arc<ScriptedExecutor>>, Arc<ScriptedExecutor>, Arc<MemorySink>);

fn repo(executor: ScriptedExecutor) -> Scripted {
    let executor = Arc::new(executor);
    let sink = Arc::new(MemorySink::new());
    let dir = std::env::temp_dir().join("gitpilot-porcelain-scripted-no-git-dir");
    let repo = Repository::with_executor(dir, Arc::clone(&executor)).with_diagnostics(sink.clone());
    (repo, executor, sink)
}

fn log_record(sha: &str, summary: &str, parents: &str, trailers: &str, decoration: &str) -> String {
    [
        sha,
        &sha[..7],
        summary,
        "",
        "Jane Doe <jane@example.com> 1700000000 +0200",
        "Jane Doe <jane@example.com> 1700000100 +0200",
        parents,
        trailers,
        decoration,
    ]
    .join("\u{1f}")
}

#[test]
fn test_status_interprets_stream() {
    let output = format!(
        "# branch.oid {}\0# branch.head main\0\
         1 .M N... 100644 100644 100644 {} {} src/lib.rs\0\
         2 R. N... 100644 100644 100644 {} {} R100 new.rs\0old.rs\0\
         ? notes.txt\0",
        SHA_A, SHA_A, SHA_A, SHA_A, SHA_A
    );
    let (repo, executor, _) = repo(
        ScriptedExecutor::default()
            .respond(0, &output)
            .respond(0, "/nonexistent/gitpilot-porcelain/.git\n"),
    );

    let status = repo.status().unwrap().unwrap();
    assert_eq!(status.current_branch.as_ref().unwrap().to_string(), "main");
    let files = status.working_directory.files();
    assert_eq!(files.len(), 3);
    assert_eq!(files[1].path, "new.rs");
    assert_eq!(files[1].status.old_path(), Some("old.rs"));
    assert_eq!(files[2].status, AppFileStatus::Untracked);
    assert!(!status.merging && !status.rebasing && !status.cherry_picking);

    let calls = executor.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].contains(&"--porcelain=2".to_string()));
    assert_eq!(calls[1], vec!["rev-parse", "--absolute-git-dir"]);
}

#[test]
fn test_status_reads_state_from_reported_git_dir() {
    let git_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(git_dir.path().join("rebase-apply")).unwrap();
    std::fs::write(git_dir.path().join("CHERRY_PICK_HEAD"), "x").unwrap();

    let (repo, _, _) = repo(
        ScriptedExecutor::default()
            .respond(0, "? a.txt\0")
            .respond(0, &format!("{}\n", git_dir.path().display())),
    );
    let status = repo.status().unwrap().unwrap();
    assert!(status.rebasing);
    assert!(status.cherry_picking);
    assert!(!status.merging);
}

#[test]
fn test_status_rejects_nonzero_exit() {
    let (repo, _, _) = repo(ScriptedExecutor::default().respond(128, ""));
    assert!(matches!(
        repo.status(),
        Err(GitError::GitError { exit_code: Some(128), .. })
    ));
}

#[test]
fn test_status_over_limit_is_none() {
    let (repo, _, sink) = repo(ScriptedExecutor::default().respond(0, "? a.txt\0? b.txt\0"));
    let repo = repo.with_config(ParserConfig::default().with_max_status_bytes(8));
    assert!(repo.status().unwrap().is_none());
    assert_eq!(
        sink.events(),
        vec![Diagnostic::OversizedStatus { size: 16, limit: 8 }]
    );
}

#[test]
fn test_get_commits_reads_separators_then_parses() {
    let output = format!(
        "{}\0{}\0",
        log_record(
            SHA_B,
            "Merge feature",
            &format!("{} {}", SHA_A, SHA_A),
            "Co-authored-by: Sam <sam@example.com>\nReviewed-by: Kim <kim@example.com>\n",
            "HEAD -> main, tag: v2.0.0"
        ),
        log_record(SHA_A, "Initial", "", "", "tag: v1.0.0, tag: first")
    );
    let (repo, executor, _) = repo(
        ScriptedExecutor::default()
            .respond(0, &output)
            .respond(1, ""),
    );

    let commits = repo.get_commits(&LogQuery::new("HEAD").max_count(2)).unwrap();
    assert_eq!(commits.len(), 2);
    assert!(commits[0].is_merge_commit());
    assert_eq!(commits[0].tags, vec!["v2.0.0"]);
    assert_eq!(commits[0].co_authors()[0].name, "Sam");
    assert_eq!(
        commits[0].trailer("reviewed-by"),
        Some(&["Kim <kim@example.com>".to_string()][..])
    );
    assert!(commits[1].parents.is_empty());
    assert_eq!(commits[1].tags, vec!["v1.0.0", "first"]);
    assert_eq!(commits[1].author.tz_offset_minutes, 120);

    let calls = executor.calls();
    assert_eq!(calls[0][0], "log");
    assert!(calls[0].contains(&"--max-count=2".to_string()));
    assert_eq!(calls[1], vec!["config", "trailer.separators"]);
}

#[test]
fn test_configured_trailer_separators_are_used() {
    let output = format!(
        "{}\0",
        log_record(SHA_A, "Fix", "", "Fixes# 42\n", "")
    );
    let (repo, _, _) = repo(
        ScriptedExecutor::default()
            .respond(0, &output)
            .respond(0, ":#\n"),
    );
    let commits = repo.get_commits(&LogQuery::new("HEAD")).unwrap();
    assert_eq!(commits[0].trailer("Fixes"), Some(&["42".to_string()][..]));
}

#[test]
fn test_unborn_log_is_empty() {
    let (repo, executor, sink) = repo(ScriptedExecutor::default().respond(128, ""));
    assert!(repo.get_commits(&LogQuery::new("HEAD")).unwrap().is_empty());
    assert_eq!(
        sink.events(),
        vec![Diagnostic::EmptyLog {
            command: "log".into()
        }]
    );
    // No trailer lookup once the log is known to be empty.
    assert_eq!(executor.calls().len(), 1);
}

#[test]
fn test_get_commit_takes_first() {
    let output = format!("{}\0", log_record(SHA_A, "Only", "", "", ""));
    let (repo, executor, _) = repo(
        ScriptedExecutor::default()
            .respond(0, &output)
            .respond(1, ""),
    );
    let commit = repo.get_commit("v1.0.0").unwrap().unwrap();
    assert_eq!(commit.summary, "Only");
    assert!(executor.calls()[0].contains(&"--max-count=1".to_string()));
}

#[test]
fn test_malformed_identity_fails_batch() {
    let good = log_record(SHA_A, "Good", "", "", "");
    let bad = log_record(SHA_B, "Bad", "", "", "").replace("Jane Doe <jane@example.com> 1700000000 +0200", "nobody");
    let output = format!("{}\0{}\0", good, bad);
    let (repo, _, _) = repo(
        ScriptedExecutor::default()
            .respond(0, &output)
            .respond(1, ""),
    );
    assert!(matches!(
        repo.get_commits(&LogQuery::new("HEAD")),
        Err(GitError::MalformedIdentity { .. })
    ));
}

#[test]
fn test_changed_files_for_commit() {
    let (repo, executor, _) = repo(
        ScriptedExecutor::default().respond(0, "\nR100\0a.txt\0b.txt\0M\0c.txt\0D\0d.txt\0"),
    );
    let changes = repo.get_changed_files(SHA_A).unwrap();
    assert_eq!(changes.len(), 3);
    assert_eq!(
        changes[0].status,
        AppFileStatus::Renamed {
            old_path: "a.txt".into()
        }
    );
    assert_eq!(changes[1].path, "c.txt");
    assert_eq!(changes[2].status, AppFileStatus::Deleted);
    assert!(changes.iter().all(|c| c.commitish == SHA_A));
    assert_eq!(executor.calls()[0][1], SHA_A);
}

#[test]
fn test_changed_files_between_strict_mode() {
    let (repo, executor, _) = repo(ScriptedExecutor::default().respond(0, "X\0weird\0"));
    let repo = repo.with_config(ParserConfig::default().with_name_status_mode(NameStatusMode::Strict));
    assert!(matches!(
        repo.get_changed_files_between("main", "feature"),
        Err(GitError::UnknownStatusCode(_))
    ));
    let calls = executor.calls();
    assert_eq!(calls[0][0], "diff");
    assert!(calls[0].contains(&"main".to_string()));
    assert!(calls[0].contains(&"feature".to_string()));
}

#[test]
fn test_unknown_reference_is_none_with_empty_log_event() {
    let (repo, _, sink) = repo(ScriptedExecutor::default().respond(128, ""));
    assert!(repo.get_commit("no-such-ref").unwrap().is_none());
    assert_eq!(
        sink.events(),
        vec![Diagnostic::EmptyLog {
            command: "log".into()
        }]
    );
}
