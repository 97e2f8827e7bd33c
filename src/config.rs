//! Parser configuration.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest `git status` output, in bytes, that will be parsed.
pub const DEFAULT_MAX_STATUS_BYTES: usize = 20_000_000;

/// How unrecognized `--name-status` letters are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NameStatusMode {
    /// Unknown letters map to `Modified`.
    #[default]
    Lenient,
    /// Unknown letters are an error.
    Strict,
}

/// Tunables shared by the status and changed-files parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParserConfig {
    pub max_status_bytes: usize,
    pub name_status_mode: NameStatusMode,
}

impl ParserConfig {
    pub fn with_max_status_bytes(mut self, max_status_bytes: usize) -> Self {
        self.max_status_bytes = max_status_bytes;
        self
    }

    pub fn with_name_status_mode(mut self, name_status_mode: NameStatusMode) -> Self {
        self.name_status_mode = name_status_mode;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_status_bytes: DEFAULT_MAX_STATUS_BYTES,
            name_status_mode: NameStatusMode::Lenient,
        }
    }
}
