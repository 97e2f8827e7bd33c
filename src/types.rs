//! Defines core validated types like commit hashes and branch names.
use super::GitError;
use once_cell::sync::Lazy;
use regex::Regex;
#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::{
    ffi::OsStr,
    fmt,
    fmt::{Display, Formatter},
    result::Result as stdResult,
};

/// A specialized `Result` type for Git operations.
pub type Result<A> = stdResult<A, GitError>;

// Abbreviated hashes are at least 4 characters; SHA-256 object names are 64.
static COMMIT_HASH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[0-9a-fA-F]{4,64}$").expect("Invalid static commit hash regex")
});

/// Represents a validated commit hash, either full or abbreviated.
///
/// Can be created from a string using `FromStr`, which checks that the value
/// is a run of 4 to 64 hexadecimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitHash {
    pub(crate) value: String,
}

impl CommitHash {
    /// Returns `true` for a full SHA-1 (40) or SHA-256 (64) object name.
    pub fn is_full(&self) -> bool {
        self.value.len() == 40 || self.value.len() == 64
    }

    /// Returns the first `len` characters of the hash.
    pub fn abbreviate(&self, len: usize) -> &str {
        &self.value[..len.min(self.value.len())]
    }
}

impl FromStr for CommitHash {
    type Err = GitError;

    fn from_str(value: &str) -> Result<Self> {
        if COMMIT_HASH_REGEX.is_match(value) {
            Ok(CommitHash {
                value: value.to_ascii_lowercase(),
            })
        } else {
            Err(GitError::InvalidCommitHash(value.to_string()))
        }
    }
}

impl Display for CommitHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl AsRef<str> for CommitHash {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl AsRef<OsStr> for CommitHash {
    fn as_ref(&self) -> &OsStr {
        self.value.as_ref()
    }
}

/// Represents a validated Git branch name (or more generally, a reference name).
///
/// Can be created from a string using `FromStr`, which validates the format
/// according to Git's reference naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName {
    pub(crate) value: String,
}

impl FromStr for BranchName {
    type Err = GitError;

    /// Parses a string into a `BranchName`, returning `Err(GitError::InvalidRefName)` if
    /// the string does not conform to Git's reference naming rules.
    fn from_str(s: &str) -> Result<Self> {
        if is_valid_reference_name(s) {
            Ok(BranchName {
                value: String::from(s),
            })
        } else {
            Err(GitError::InvalidRefName(s.to_string()))
        }
    }
}

impl Display for BranchName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl AsRef<OsStr> for BranchName {
    fn as_ref(&self) -> &OsStr {
        self.value.as_ref()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BranchName {
    /// Deserializes a string into a `BranchName`, validating the format.
    fn deserialize<D>(deserializer: D) -> stdResult<BranchName, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BranchName::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl Serialize for BranchName {
    fn serialize<S: Serializer>(&self, serializer: S) -> stdResult<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for CommitHash {
    fn deserialize<D>(deserializer: D) -> stdResult<CommitHash, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CommitHash::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl Serialize for CommitHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> stdResult<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

// --- Internal validation logic ---

const FORBIDDEN_REFERENCE_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '*', '?', '['];
const FORBIDDEN_REFERENCE_SEQUENCES: [&str; 4] = ["..", "@{", "//", "/."];

/// Checks a reference name against the rules of `git check-ref-format`.
///
/// See: https://git-scm.com/docs/git-check-ref-format
fn is_valid_reference_name(name: &str) -> bool {
    if name.is_empty() || name == "@" {
        return false;
    }
    if name.starts_with(['-', '.', '/']) || name.ends_with(['.', '/']) || name.ends_with(".lock") {
        return false;
    }
    if name
        .chars()
        .any(|c| c.is_ascii_control() || FORBIDDEN_REFERENCE_CHARS.contains(&c))
    {
        return false;
    }
    !FORBIDDEN_REFERENCE_SEQUENCES
        .iter()
        .any(|sequence| name.contains(sequence))
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_commit_hashes() {
        let valid = vec![
            "a1b2",
            "deadbeef",
            "0123456789abcdef0123456789abcdef01234567",
            "0123456789ABCDEF0123456789ABCDEF01234567",
        ];
        for hash in valid.iter() {
            assert!(CommitHash::from_str(hash).is_ok(), "Expected valid: {}", hash);
        }
    }

    #[test]
    fn test_invalid_commit_hashes() {
        let invalid = vec!["", "abc", "xyz123", "deadbeef ", "dead-beef", "(initial)"];
        for hash in invalid.iter() {
            assert!(CommitHash::from_str(hash).is_err(), "Expected invalid: {}", hash);
        }
    }

    #[test]
    fn test_commit_hash_is_lowercased_and_abbreviates() {
        let hash = CommitHash::from_str("0123456789ABCDEF0123456789ABCDEF01234567").unwrap();
        assert!(hash.is_full());
        assert_eq!(hash.abbreviate(7), "0123456");
        assert_eq!(hash.abbreviate(100).len(), 40);
        assert_eq!(hash.to_string(), "0123456789abcdef0123456789abcdef01234567");
    }

    #[test]
    fn test_valid_reference_names() {
        let valid_references = vec![
            "avalidreference",
            "a/valid/ref",
            "a-valid-ref",
            "v1.0.0",
            "HEAD",
            "feature/new_stuff",
            "fix_123",
        ];

        for reference_name in valid_references.iter() {
            assert!(
                BranchName::from_str(reference_name).is_ok(),
                "Expected OK: {}",
                reference_name
            );
        }
    }

    #[test]
    fn test_invalid_reference_names() {
        let invalid_references = vec![
            "",
            "double..dot",
            "inavlid^character",
            "invalid~character",
            "invalid:character",
            "invalid\\character",
            "@",
            "inavlid@{sequence",
            ".start",
            "end.",
            "/start",
            "end/",
            "with space",
            "with\tcontrol",
            "with//double",
            "path/./dotslash",
            "-startwithdash",
            "glob*star",
            "branch.lock",
        ];

        for reference_name in invalid_references.iter() {
            assert!(
                !is_valid_reference_name(reference_name),
                "Expected invalid: {}",
                reference_name
            );
        }
    }
}
