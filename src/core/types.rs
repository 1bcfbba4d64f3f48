//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`RepoFullName`] - Validated `owner/name` repository identifier
//!
//! # Validation
//!
//! These types enforce validity at construction time, so a malformed
//! request is rejected before any remote call is made.
//!
//! # Examples
//!
//! ```
//! use vocab_publisher::core::types::{BranchName, RepoFullName};
//!
//! let branch = BranchName::new("202401020304_animals").unwrap();
//! assert_eq!(branch.ref_name(), "refs/heads/202401020304_animals");
//!
//! let repo = RepoFullName::new("org/vocabs").unwrap();
//! assert_eq!(repo.owner(), "org");
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(RepoFullName::new("no-slash").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName { name: String, reason: String },

    #[error("invalid repository full name '{0}': expected 'owner/name'")]
    InvalidRepoFullName(String),
}

/// Characters Git refuses anywhere in a ref name.
const INVALID_BRANCH_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty or exactly `@`
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
/// - No path component may start with `.` or end with `.lock`
///
/// # Example
///
/// ```
/// use vocab_publisher::core::types::BranchName;
///
/// assert!(BranchName::new("release/animals").is_ok());
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("branch.lock").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if let Some(reason) = Self::violation(&name) {
            return Err(TypeError::InvalidBranchName { name, reason });
        }
        Ok(Self(name))
    }

    /// First refname rule `name` breaks, if any.
    fn violation(name: &str) -> Option<String> {
        if name.is_empty() {
            return Some("cannot be empty".into());
        }
        if name == "@" {
            return Some("cannot be '@' (reserved)".into());
        }
        if name.starts_with('.') || name.starts_with('-') {
            return Some("cannot start with '.' or '-'".into());
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return Some("cannot end with '.lock' or '/'".into());
        }
        for seq in ["..", "@{", "//"] {
            if name.contains(seq) {
                return Some(format!("cannot contain '{seq}'"));
            }
        }
        if let Some(c) = name.chars().find(|c| INVALID_BRANCH_CHARS.contains(c)) {
            return Some(format!("cannot contain '{c}'"));
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return Some("cannot contain control characters".into());
        }
        if name
            .split('/')
            .any(|part| part.starts_with('.') || part.ends_with(".lock"))
        {
            return Some("path component cannot start with '.' or end with '.lock'".into());
        }
        None
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified ref for this branch (`refs/heads/<name>`).
    pub fn ref_name(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoFullName(String);

impl RepoFullName {
    /// Create a validated repository full name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepoFullName` unless `name` is exactly
    /// two non-empty segments separated by `/` with no whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let valid = match name.split_once('/') {
            Some((owner, repo)) => {
                !owner.is_empty()
                    && !repo.is_empty()
                    && !repo.contains('/')
                    && !name.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if valid {
            Ok(Self(name))
        } else {
            Err(TypeError::InvalidRepoFullName(name))
        }
    }

    /// Get the full name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The owning user or organization.
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map(|(o, _)| o).unwrap_or_default()
    }

    /// The repository name without its owner.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(_, n)| n).unwrap_or_default()
    }
}

impl TryFrom<String> for RepoFullName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RepoFullName> for String {
    fn from(name: RepoFullName) -> Self {
        name.0
    }
}

impl AsRef<str> for RepoFullName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepoFullName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
