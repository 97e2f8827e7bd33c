//! A Rust library that turns the machine-readable output of the `git`
//! command-line tool into typed values.
//!
//! The parsers work on captured output and never run git themselves:
//!
//! - [`porcelain`] splits `git status --porcelain=2 -z` into records,
//!   and [`status`] builds a [`StatusResult`] from them.
//! - [`status_code`] maps `XY` and name-status letters to [`AppFileStatus`].
//! - [`log`] builds and parses the separator-delimited `git log` format.
//! - [`changed_files`] parses `--name-status -z` output.
//!
//! [`Repository`] runs git through a [`GitExecutor`] and feeds the parsers.
//! Running git requires the `git` executable on the PATH.
//!
//! # Examples
//!
//! ```no_run
//! use gitpilot_porcelain::Repository;
//! use gitpilot_porcelain::log::LogQuery;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::new(".");
//!
//! if let Some(status) = repo.status()? {
//!     for file in status.working_directory.files() {
//!         println!("{:?} {}", file.status, file.path);
//!     }
//! }
//!
//! for commit in repo.get_commits(&LogQuery::new("HEAD").max_count(10))? {
//!     println!("{} {}", commit.short_sha, commit.summary);
//!     for file in repo.get_changed_files(&commit.sha.to_string())? {
//!         println!("    {:?} {}", file.status, file.path);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization of model structs using the `serde` crate.
//! - `async`: Enables asynchronous Git operations using Tokio.

pub mod error;
pub mod types;
pub mod models;
pub mod config;
pub mod diagnostics;
pub mod exec;
pub mod status_code;
pub mod porcelain;
pub mod status;
pub mod log;
pub mod changed_files;
pub mod repository;

// Feature-gated modules
#[cfg(feature = "async")]
pub mod async_git;

// Re-export key types
pub use crate::config::{NameStatusMode, ParserConfig};
pub use crate::diagnostics::{Diagnostic, DiagnosticSink, MemorySink, TracingSink};
pub use crate::error::GitError;
pub use crate::exec::{ExecOptions, GitExecutor, GitOutput, ProcessGitExecutor};
pub use crate::models::{AppFileStatus, Commit, CommittedFileChange, StatusResult};
pub use crate::repository::Repository;
pub use crate::types::{BranchName, CommitHash, Result};

#[cfg(feature = "async")]
pub use crate::async_git::AsyncRepository;

pub mod prelude {
    //! Convenient import for common types and traits.
    pub use crate::config::{NameStatusMode, ParserConfig};
    pub use crate::diagnostics::{Diagnostic, DiagnosticSink};
    pub use crate::error::GitError;
    pub use crate::exec::{ExecOptions, GitExecutor, GitOutput};
    pub use crate::log::LogQuery;
    pub use crate::models::*;
    pub use crate::repository::Repository;
    pub use crate::types::{BranchName, CommitHash, Result};

    #[cfg(feature = "async")]
    pub use crate::async_git::AsyncRepository;
}
