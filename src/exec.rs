//! Running the `git` executable.
//!
//! [`GitExecutor`] is the seam between the parsers and the process layer:
//! it runs git with an argument vector in a working directory and hands back
//! the exit code with the raw stdout and stderr buffers.

use crate::error::GitError;
use crate::types::Result;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str;
use std::sync::Arc;

/// Options for one git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    /// Exit codes that count as success. Defaults to `[0]`.
    pub success_exit_codes: Vec<i32>,
}

impl ExecOptions {
    /// Accepts `codes` as successful exits.
    pub fn accepting(codes: &[i32]) -> ExecOptions {
        ExecOptions {
            success_exit_codes: codes.to_vec(),
        }
    }

    pub fn is_success(&self, exit_code: Option<i32>) -> bool {
        exit_code.is_some_and(|code| self.success_exit_codes.contains(&code))
    }
}

impl Default for ExecOptions {
    fn default() -> Self {
        ExecOptions::accepting(&[0])
    }
}

/// Captured result of a git invocation whose exit code was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl GitOutput {
    /// Stdout decoded as UTF-8.
    pub fn stdout_str(&self) -> Result<&str> {
        str::from_utf8(&self.stdout).map_err(|_| GitError::Undecodable)
    }
}

/// Runs git commands.
pub trait GitExecutor {
    /// Runs git with `args` inside `dir`.
    ///
    /// # Errors
    /// Returns `GitError::GitError` if the exit code is not listed in
    /// `options.success_exit_codes`, and `GitError::GitNotFound` or
    /// `GitError::Execution` if the process could not be started.
    fn exec(&self, dir: &Path, args: &[String], options: &ExecOptions) -> Result<GitOutput>;
}

impl<E: GitExecutor + ?Sized> GitExecutor for &E {
    fn exec(&self, dir: &Path, args: &[String], options: &ExecOptions) -> Result<GitOutput> {
        (**self).exec(dir, args, options)
    }
}

impl<E: GitExecutor + ?Sized> GitExecutor for Arc<E> {
    fn exec(&self, dir: &Path, args: &[String], options: &ExecOptions) -> Result<GitOutput> {
        (**self).exec(dir, args, options)
    }
}

/// Runs the real `git` binary with `std::process::Command`.
#[derive(Debug, Clone)]
pub struct ProcessGitExecutor {
    program: PathBuf,
}

impl ProcessGitExecutor {
    pub fn new() -> ProcessGitExecutor {
        ProcessGitExecutor {
            program: PathBuf::from("git"),
        }
    }

    /// Uses `program` instead of the `git` found on PATH.
    pub fn with_program<P: AsRef<Path>>(program: P) -> ProcessGitExecutor {
        ProcessGitExecutor {
            program: PathBuf::from(program.as_ref()),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for ProcessGitExecutor {
    fn default() -> Self {
        ProcessGitExecutor::new()
    }
}

impl GitExecutor for ProcessGitExecutor {
    fn exec(&self, dir: &Path, args: &[String], options: &ExecOptions) -> Result<GitOutput> {
        tracing::trace!(?dir, ?args, "running git");
        let process_output = Command::new(&self.program)
            .current_dir(dir)
            .args(args)
            .output();

        match process_output {
            Ok(output) => finish(output.status.code(), output.stdout, output.stderr, options),
            Err(e) => Err(spawn_error(e)),
        }
    }
}

/// Applies the success set to a finished process.
pub(crate) fn finish(
    exit_code: Option<i32>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    options: &ExecOptions,
) -> Result<GitOutput> {
    if options.is_success(exit_code) {
        return Ok(GitOutput {
            exit_code,
            stdout,
            stderr,
        });
    }

    // Command failed, try to capture stdout and stderr
    let stdout = str::from_utf8(&stdout)
        .map(|s| s.trim_end().to_owned())
        .unwrap_or_else(|_| String::from("[stdout: undecodable UTF-8]"));
    let stderr = str::from_utf8(&stderr)
        .map(|s| s.trim_end().to_owned())
        .unwrap_or_else(|_| String::from("[stderr: undecodable UTF-8]"));

    Err(GitError::GitError {
        exit_code,
        stdout,
        stderr,
    })
}

/// Maps an error from spawning the process.
pub(crate) fn spawn_error(e: io::Error) -> GitError {
    if e.kind() == io::ErrorKind::NotFound {
        tracing::error!("git executable not found: {}", e);
        GitError::GitNotFound
    } else {
        tracing::error!("Failed to execute git command: {}", e);
        GitError::Execution
    }
}
