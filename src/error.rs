//! Defines the error types used throughout the library.
use thiserror::Error;

/// Represents errors that can occur while running git or interpreting its output.
#[derive(Debug, Error)]
pub enum GitError {
    /// Failed to execute the external 'git' process.
    #[error("Unable to execute git process")]
    Execution,

    /// The output from the 'git' process was not valid UTF-8.
    #[error("Unable to decode output from git executable")]
    Undecodable,

    /// The provided string is not a valid Git reference name (e.g., branch name).
    #[error("Ref name is invalid: {0}")]
    InvalidRefName(String),

    #[error("Commit hash is invalid: {0}")]
    InvalidCommitHash(String),

    /// The 'git' command ran but exited with a code outside the accepted set.
    /// Contains the exit code and the captured stdout and stderr.
    #[error("git exited with code {exit_code:?} and the following stdout: {stdout} stderr: {stderr}")]
    GitError {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// A porcelain v2 status record did not match any known shape.
    #[error("Malformed status record {record:?}: {reason}")]
    MalformedStatus { record: String, reason: String },

    /// An author or committer line could not be parsed as `name <email> seconds offset`.
    #[error("Malformed identity {identity:?} in commit {sha}")]
    MalformedIdentity { sha: String, identity: String },

    /// A log record did not carry the expected fields.
    #[error("Malformed commit record {record:?}: {reason}")]
    MalformedCommit { record: String, reason: String },

    /// A name-status stream ended in the middle of a record.
    #[error("Malformed name-status output at token {index}: {reason}")]
    MalformedNameStatus { index: usize, reason: String },

    /// A name-status letter was not recognized while running in strict mode.
    #[error("Unknown name-status code: {0}")]
    UnknownStatusCode(String),

    /// The 'git' executable was not found in the system's PATH.
    #[error("'git' command not found. Please ensure Git is installed and that its executable is included in your system's PATH environment variable.")]
    GitNotFound,
}

impl GitError {
    /// Returns `true` for errors raised while interpreting git output, as
    /// opposed to errors raised while running git.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            GitError::MalformedStatus { .. }
                | GitError::MalformedIdentity { .. }
                | GitError::MalformedCommit { .. }
                | GitError::MalformedNameStatus { .. }
                | GitError::UnknownStatusCode(_)
        )
    }
}
