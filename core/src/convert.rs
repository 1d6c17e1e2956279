//! Naming conventions for deriving external flag spellings from keys.
//!
//! Object fields are declared with internal keys (`output_dir`,
//! `dryRun`, ...). The flag a user types is derived from that key through a
//! [`NameConverter`]. Every converter carries a stable [`id`](NameConverter::id)
//! so that object nodes can memoize their name tables per converter.
//!
//! # Examples
//!
//! ```
//! use argz_core::{NameCase, NameConverter};
//!
//! assert_eq!(NameCase::Kebab.convert("outputDir"), "output-dir");
//! assert_eq!(NameCase::Kebab.convert("output_dir"), "output-dir");
//! assert_eq!(NameCase::Snake.convert("outputDir"), "output_dir");
//! assert_eq!(NameCase::Camel.convert("output_dir"), "outputDir");
//! assert_eq!(NameCase::Verbatim.convert("output_dir"), "output_dir");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Converts an internal key into the external flag spelling.
pub trait NameConverter: Send + Sync {
    /// Identifier used as the cache key for derived name tables.
    ///
    /// Two converters with the same id must produce the same names.
    fn id(&self) -> &str;

    /// Converts `key` into the flag name a user types (without dashes).
    fn convert(&self, key: &str) -> String;
}

/// Built-in naming conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCase {
    /// `outputDir` / `output_dir` → `output-dir` (the default).
    #[default]
    Kebab,
    /// `outputDir` → `output_dir`.
    Snake,
    /// `output_dir` → `outputDir`.
    Camel,
    /// Keys are used as-is.
    Verbatim,
}

impl NameCase {
    /// All conventions, in declaration order.
    pub const ALL: [NameCase; 4] = [
        NameCase::Kebab,
        NameCase::Snake,
        NameCase::Camel,
        NameCase::Verbatim,
    ];

    /// Returns the lowercase identifier of this convention.
    pub fn as_str(self) -> &'static str {
        match self {
            NameCase::Kebab => "kebab",
            NameCase::Snake => "snake",
            NameCase::Camel => "camel",
            NameCase::Verbatim => "verbatim",
        }
    }
}

impl fmt::Display for NameCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NameConverter for NameCase {
    fn id(&self) -> &str {
        self.as_str()
    }

    fn convert(&self, key: &str) -> String {
        match self {
            NameCase::Kebab => split_words(key).join("-"),
            NameCase::Snake => split_words(key).join("_"),
            NameCase::Camel => {
                let mut out = String::with_capacity(key.len());
                for (i, word) in split_words(key).into_iter().enumerate() {
                    if i == 0 {
                        out.push_str(&word);
                        continue;
                    }
                    let mut chars = word.chars();
                    if let Some(first) = chars.next() {
                        out.extend(first.to_uppercase());
                        out.push_str(chars.as_str());
                    }
                }
                out
            }
            NameCase::Verbatim => key.to_string(),
        }
    }
}

/// A converter backed by an arbitrary function.
///
/// The `id` must change whenever the function's behavior changes, otherwise
/// object nodes keep serving names cached for the previous function.
pub struct FnConverter<F> {
    id: String,
    func: F,
}

impl<F> FnConverter<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    /// Wraps `func` under the cache identifier `id`.
    pub fn new(id: impl Into<String>, func: F) -> Self {
        Self {
            id: id.into(),
            func,
        }
    }
}

impl<F> NameConverter for FnConverter<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn convert(&self, key: &str) -> String {
        (self.func)(key)
    }
}

impl<F> fmt::Debug for FnConverter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConverter").field("id", &self.id).finish()
    }
}

/// Splits a key into lowercase words on `_`, `-`, whitespace and case
/// boundaries (`fooBar`, `HTTPServer`, `v2Name`).
fn split_words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}
