//! Provides the core Repository implementation.

use crate::changed_files::parse_changed_files;
use crate::config::ParserConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::exec::{ExecOptions, GitExecutor, GitOutput, ProcessGitExecutor};
use crate::log::{parse_log_output, LogQuery, DEFAULT_TRAILER_SEPARATORS};
use crate::models::{Commit, CommittedFileChange, StatusResult};
use crate::status::parse_status_output;
use crate::types::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Exit code `git log` uses when HEAD has no commits yet or the revision
/// does not resolve.
pub(crate) const UNBORN_EXIT_CODE: i32 = 128;

/// Represents a local Git repository located at a specific path.
///
/// Runs git through a [`GitExecutor`] and interprets the output into the
/// structured types of [`crate::models`].
#[derive(Clone)]
pub struct Repository<E = ProcessGitExecutor> {
    pub(crate) location: PathBuf,
    executor: E,
    config: ParserConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl Repository<ProcessGitExecutor> {
    /// Creates a `Repository` instance pointing to an existing local Git repository.
    ///
    /// This does *not* check if the path is actually a valid Git repository.
    /// Operations will fail later if it's not.
    pub fn new<P: AsRef<Path>>(p: P) -> Repository<ProcessGitExecutor> {
        Repository::with_executor(p, ProcessGitExecutor::new())
    }
}

impl<E: GitExecutor> Repository<E> {
    /// Creates a `Repository` that runs git through `executor`.
    pub fn with_executor<P: AsRef<Path>>(p: P, executor: E) -> Repository<E> {
        Repository {
            location: PathBuf::from(p.as_ref()),
            executor,
            config: ParserConfig::default(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Sends soft-failure diagnostics to `sink` instead of `tracing`.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Gets the current status of the working directory.
    ///
    /// Equivalent to `git status --untracked-files=all --branch --porcelain=2 -z`.
    ///
    /// # Returns
    /// `None` when the output exceeds `ParserConfig::max_status_bytes`.
    ///
    /// # Errors
    /// Returns `GitError` if git fails or the output is not valid porcelain v2.
    pub fn status(&self) -> Result<Option<StatusResult>> {
        let output = self.git(&status_args(), &ExecOptions::default())?;
        let stdout = output.stdout_str()?;
        let Some(mut status) = parse_status_output(stdout, &self.config, self.sink.as_ref())? else {
            return Ok(None);
        };

        let git_dir = self.git(&git_dir_args(), &ExecOptions::default())?;
        let state = RepositoryState::detect(&interpret_git_dir(&self.location, &git_dir)?);
        status.merging = state.merging;
        status.rebasing = state.rebasing;
        status.cherry_picking = state.cherry_picking;
        Ok(Some(status))
    }

    /// Lists commits matching `query`, newest first.
    ///
    /// An unborn HEAD (exit code 128) yields an empty list.
    ///
    /// # Errors
    /// Returns `GitError` if git fails or any record is malformed. A malformed
    /// author or committer fails the whole batch.
    pub fn get_commits(&self, query: &LogQuery) -> Result<Vec<Commit>> {
        let output = self.git(
            &query.to_args(),
            &ExecOptions::accepting(&[0, UNBORN_EXIT_CODE]),
        )?;
        if output.exit_code == Some(UNBORN_EXIT_CODE) {
            self.sink.report(Diagnostic::EmptyLog {
                command: "log".to_string(),
            });
            return Ok(Vec::new());
        }

        let separators = self.get_trailer_separators()?;
        parse_log_output(output.stdout_str()?, &separators)
    }

    /// Gets a single commit by reference. A reference that does not resolve
    /// yields `None`.
    pub fn get_commit(&self, reference: &str) -> Result<Option<Commit>> {
        let commits = self.get_commits(&LogQuery::new(reference).max_count(1))?;
        Ok(commits.into_iter().next())
    }

    /// Reads the characters git accepts between a trailer key and its value.
    ///
    /// Equivalent to `git config trailer.separators`, defaulting to `:`.
    pub fn get_trailer_separators(&self) -> Result<String> {
        let output = self.git(&trailer_separator_args(), &ExecOptions::accepting(&[0, 1]))?;
        interpret_trailer_separators(&output)
    }

    /// Lists the files changed by commit `sha` against its first parent.
    pub fn get_changed_files(&self, sha: &str) -> Result<Vec<CommittedFileChange>> {
        let output = self.git(&changed_files_args(sha), &ExecOptions::default())?;
        parse_changed_files(
            output.stdout_str()?,
            sha,
            self.config.name_status_mode,
            self.sink.as_ref(),
        )
    }

    /// Lists the files that differ between `base` and `head`, tagged with `head`.
    pub fn get_changed_files_between(
        &self,
        base: &str,
        head: &str,
    ) -> Result<Vec<CommittedFileChange>> {
        let output = self.git(&diff_args(base, head), &ExecOptions::default())?;
        parse_changed_files(
            output.stdout_str()?,
            head,
            self.config.name_status_mode,
            self.sink.as_ref(),
        )
    }

    fn git(&self, args: &[String], options: &ExecOptions) -> Result<GitOutput> {
        self.executor.exec(&self.location, args, options)
    }
}

impl<E: fmt::Debug> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("location", &self.location)
            .field("executor", &self.executor)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// --- Argument builders shared with the async repository ---

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

pub(crate) fn status_args() -> Vec<String> {
    owned(&[
        "--no-optional-locks",
        "status",
        "--untracked-files=all",
        "--branch",
        "--porcelain=2",
        "-z",
    ])
}

pub(crate) fn trailer_separator_args() -> Vec<String> {
    owned(&["config", "trailer.separators"])
}

pub(crate) fn changed_files_args(sha: &str) -> Vec<String> {
    owned(&[
        "log",
        sha,
        "-C",
        "-M",
        "-m",
        "-1",
        "--no-show-signature",
        "--first-parent",
        "--name-status",
        "--format=format:",
        "-z",
        "--",
    ])
}

pub(crate) fn diff_args(base: &str, head: &str) -> Vec<String> {
    owned(&["diff", "--name-status", "-z", "-M", "-C", base, head, "--"])
}

/// `git config` exits with 1 when the key is not set.
pub(crate) fn interpret_trailer_separators(output: &GitOutput) -> Result<String> {
    if output.exit_code == Some(1) {
        return Ok(DEFAULT_TRAILER_SEPARATORS.to_string());
    }
    let value = output.stdout_str()?.trim_end_matches(['\r', '\n']);
    if value.is_empty() {
        Ok(DEFAULT_TRAILER_SEPARATORS.to_string())
    } else {
        Ok(value.to_string())
    }
}

pub(crate) fn git_dir_args() -> Vec<String> {
    owned(&["rev-parse", "--absolute-git-dir"])
}

/// Reads the git directory printed by `git rev-parse --absolute-git-dir`.
/// A relative answer is taken relative to `location`.
pub(crate) fn interpret_git_dir(location: &Path, output: &GitOutput) -> Result<PathBuf> {
    let git_dir = Path::new(output.stdout_str()?.trim_end_matches(['\r', '\n']));
    if git_dir.is_absolute() {
        Ok(git_dir.to_path_buf())
    } else {
        Ok(location.join(git_dir))
    }
}

/// In-progress operations recorded in the git directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RepositoryState {
    pub merging: bool,
    pub rebasing: bool,
    pub cherry_picking: bool,
}

impl RepositoryState {
    pub fn detect(git_dir: &Path) -> RepositoryState {
        RepositoryState {
            merging: git_dir.join("MERGE_HEAD").exists(),
            rebasing: git_dir.join("rebase-apply").exists()
                || git_dir.join("rebase-merge").exists(),
            cherry_picking: git_dir.join("CHERRY_PICK_HEAD").exists(),
        }
    }
}
