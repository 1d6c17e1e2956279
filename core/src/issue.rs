//! Issues reported while resolving or validating an argument vector.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a path: an argv index or an object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathKey {
    /// Array position (argv token index, array item).
    Index(usize),
    /// Object key.
    Key(String),
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathKey {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Index(index) => write!(f, "{index}"),
            PathKey::Key(key) => f.write_str(key),
        }
    }
}

/// Machine-readable issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// No schema node answers to a flag name.
    UnknownArgument,
    /// A `-`-prefixed token matches no flag grammar.
    MalformedArgument,
    /// A leaf rejected the value given to it.
    IncorrectValue,
    /// A leaf needs a value and none followed the flag.
    MissingValue,
    /// The input could not be processed at all.
    StructuralAbort,
    /// Validation: the value has the wrong type.
    InvalidType,
    /// Validation: a required value is absent.
    Required,
    /// Validation: a literal did not match.
    InvalidLiteral,
    /// Validation: no union option accepted the value.
    InvalidUnion,
    /// Validation: a strict object received an unexpected key.
    UnrecognizedKey,
}

/// A located problem with the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Token index (resolution) or key path (validation).
    pub path: Vec<PathKey>,
    /// Issue category.
    pub code: IssueCode,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    /// Creates an issue at an arbitrary path.
    pub fn new(path: Vec<PathKey>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path,
            code,
            message: message.into(),
        }
    }

    /// Creates an issue located at an argv token.
    pub fn at_token(index: usize, code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(vec![PathKey::Index(index)], code, message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return f.write_str(&self.message);
        }
        let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        write!(f, "[{}] {}", path.join("."), self.message)
    }
}
