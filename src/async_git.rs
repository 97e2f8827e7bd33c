//! Provides asynchronous versions of the Git operations.

use crate::changed_files::parse_changed_files;
use crate::config::ParserConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::exec::{finish, spawn_error, ExecOptions, GitOutput};
use crate::log::{parse_log_output, LogQuery};
use crate::models::{Commit, CommittedFileChange, StatusResult};
use crate::repository::{
    changed_files_args, diff_args, git_dir_args, interpret_git_dir, interpret_trailer_separators,
    status_args, trailer_separator_args, UNBORN_EXIT_CODE,
};
use crate::status::parse_status_output;
use crate::types::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::process::Command;

/// Represents a local Git repository with async operations.
///
/// This struct mirrors the read operations of the synchronous `Repository`
/// but runs git with `tokio::process`.
#[derive(Clone)]
pub struct AsyncRepository {
    location: PathBuf,
    program: PathBuf,
    config: ParserConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl AsyncRepository {
    /// Creates an `AsyncRepository` instance pointing to an existing local Git repository.
    ///
    /// This does *not* check if the path is actually a valid Git repository.
    /// Operations will fail later if it's not.
    pub fn new<P: AsRef<Path>>(p: P) -> AsyncRepository {
        AsyncRepository {
            location: PathBuf::from(p.as_ref()),
            program: PathBuf::from("git"),
            config: ParserConfig::default(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Uses `program` instead of the `git` found on PATH.
    pub fn with_program<P: AsRef<Path>>(mut self, program: P) -> Self {
        self.program = PathBuf::from(program.as_ref());
        self
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Gets the current status of the working directory asynchronously.
    ///
    /// # Returns
    /// `None` when the output exceeds `ParserConfig::max_status_bytes`.
    pub async fn status(&self) -> Result<Option<StatusResult>> {
        let output = self.git(&status_args(), &ExecOptions::default()).await?;
        let stdout = output.stdout_str()?;
        let Some(mut status) = parse_status_output(stdout, &self.config, self.sink.as_ref())? else {
            return Ok(None);
        };

        let output = self.git(&git_dir_args(), &ExecOptions::default()).await?;
        let git_dir = interpret_git_dir(&self.location, &output)?;
        status.merging = exists(&git_dir.join("MERGE_HEAD")).await;
        status.rebasing = exists(&git_dir.join("rebase-apply")).await
            || exists(&git_dir.join("rebase-merge")).await;
        status.cherry_picking = exists(&git_dir.join("CHERRY_PICK_HEAD")).await;
        Ok(Some(status))
    }

    /// Lists commits matching `query` asynchronously. An unborn HEAD yields
    /// an empty list.
    pub async fn get_commits(&self, query: &LogQuery) -> Result<Vec<Commit>> {
        let output = self
            .git(&query.to_args(), &ExecOptions::accepting(&[0, UNBORN_EXIT_CODE]))
            .await?;
        if output.exit_code == Some(UNBORN_EXIT_CODE) {
            self.sink.report(Diagnostic::EmptyLog {
                command: "log".to_string(),
            });
            return Ok(Vec::new());
        }

        let separators = self.get_trailer_separators().await?;
        parse_log_output(output.stdout_str()?, &separators)
    }

    pub async fn get_commit(&self, reference: &str) -> Result<Option<Commit>> {
        let commits = self
            .get_commits(&LogQuery::new(reference).max_count(1))
            .await?;
        Ok(commits.into_iter().next())
    }

    pub async fn get_trailer_separators(&self) -> Result<String> {
        let output = self
            .git(&trailer_separator_args(), &ExecOptions::accepting(&[0, 1]))
            .await?;
        interpret_trailer_separators(&output)
    }

    pub async fn get_changed_files(&self, sha: &str) -> Result<Vec<CommittedFileChange>> {
        let output = self
            .git(&changed_files_args(sha), &ExecOptions::default())
            .await?;
        parse_changed_files(
            output.stdout_str()?,
            sha,
            self.config.name_status_mode,
            self.sink.as_ref(),
        )
    }

    pub async fn get_changed_files_between(
        &self,
        base: &str,
        head: &str,
    ) -> Result<Vec<CommittedFileChange>> {
        let output = self
            .git(&diff_args(base, head), &ExecOptions::default())
            .await?;
        parse_changed_files(
            output.stdout_str()?,
            head,
            self.config.name_status_mode,
            self.sink.as_ref(),
        )
    }

    async fn git(&self, args: &[String], options: &ExecOptions) -> Result<GitOutput> {
        tracing::trace!(dir = ?self.location, ?args, "running git");
        let process_output = Command::new(&self.program)
            .current_dir(&self.location)
            .args(args)
            .output()
            .await;

        match process_output {
            Ok(output) => finish(output.status.code(), output.stdout, output.stderr, options),
            Err(e) => Err(spawn_error(e)),
        }
    }
}

impl fmt::Debug for AsyncRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRepository")
            .field("location", &self.location)
            .field("program", &self.program)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitError;

    #[tokio::test]
    async fn test_missing_program_is_git_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = AsyncRepository::new(dir.path()).with_program("definitely-not-a-real-git-binary-xyz");
        let result = repo.status().await;
        assert!(matches!(result, Err(GitError::GitNotFound)));
    }

    #[tokio::test]
    async fn test_exists_checks_state_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("MERGE_HEAD"), "x").await.unwrap();
        assert!(exists(&dir.path().join("MERGE_HEAD")).await);
        assert!(!exists(&dir.path().join("CHERRY_PICK_HEAD")).await);
    }

    #[tokio::test]
    async fn test_status_from_subdirectory_sees_merge() {
        let version = std::process::Command::new("git").arg("--version").output();
        if !version.map(|o| o.status.success()).unwrap_or(false) {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let git = |args: &[&str]| {
            std::process::Command::new("git")
                .current_dir(dir.path())
                .args(args)
                .output()
                .unwrap()
        };
        assert!(git(&["init", "-q"]).status.success());
        tokio::fs::create_dir(dir.path().join("sub")).await.unwrap();
        tokio::fs::write(dir.path().join(".git").join("MERGE_HEAD"), "x")
            .await
            .unwrap();

        let status = AsyncRepository::new(dir.path().join("sub"))
            .status()
            .await
            .unwrap()
            .unwrap();
        assert!(status.merging);
        assert!(!status.rebasing);
    }
}
