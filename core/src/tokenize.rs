//! Classification of individual argv tokens.
//!
//! Patterns are tried in order:
//!
//! | token | classification |
//! |---|---|
//! | `--` | [`Token::Separator`] |
//! | `--name=value` | one flag item carrying its value |
//! | `--name` | one flag item that wants the next token |
//! | `-xyz` | `x`, `y` as bare flags, `z` wanting the next token |
//! | other `-…` | [`Token::Malformed`] |
//! | anything else | [`Token::Positional`] |

use std::sync::LazyLock;

use regex::Regex;

/// The token that ends flag parsing.
pub const SEPARATOR: &str = "--";

static LONG_EXPRESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^--(?P<name>[^\s=]+)=(?P<value>.+)$").expect("static regex must compile")
});
static LONG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^--(?P<name>[^\s=]+)$").expect("static regex must compile"));
static SHORT_CLUSTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-(?P<flags>[^\s=]+)$").expect("static regex must compile"));

/// One flag extracted from a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagItem<'a> {
    /// Flag name without dashes; may be dotted (`group.child`).
    pub name: &'a str,
    /// Value from the `--name=value` form.
    pub value: Option<&'a str>,
    /// Whether the value should be taken from the next token.
    pub needs_value: bool,
}

/// Classification of one raw argv token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Bare `--`.
    Separator,
    /// One or more flags (a short cluster expands into several).
    Flags(Vec<FlagItem<'a>>),
    /// A plain value.
    Positional(&'a str),
    /// Starts with `-` but matches no flag grammar.
    Malformed(&'a str),
}

/// Classifies a single argv token.
pub fn classify(raw: &str) -> Token<'_> {
    if raw == SEPARATOR {
        return Token::Separator;
    }

    if let Some(caps) = LONG_EXPRESSION_RE.captures(raw) {
        if let (Some(name), Some(value)) = (caps.name("name"), caps.name("value")) {
            return Token::Flags(vec![FlagItem {
                name: name.as_str(),
                value: Some(value.as_str()),
                needs_value: false,
            }]);
        }
    }

    if let Some(name) = LONG_NAME_RE.captures(raw).and_then(|caps| caps.name("name")) {
        return Token::Flags(vec![FlagItem {
            name: name.as_str(),
            value: None,
            needs_value: true,
        }]);
    }

    if let Some(flags) = SHORT_CLUSTER_RE.captures(raw).and_then(|caps| caps.name("flags")) {
        return Token::Flags(short_cluster(flags.as_str()));
    }

    if looks_like_flag(raw) {
        Token::Malformed(raw)
    } else {
        Token::Positional(raw)
    }
}

/// Whether a token would be read as a flag rather than a value.
pub fn looks_like_flag(raw: &str) -> bool {
    raw.starts_with('-')
}

fn short_cluster(flags: &str) -> Vec<FlagItem<'_>> {
    let count = flags.chars().count();
    flags
        .char_indices()
        .enumerate()
        .map(|(position, (offset, c))| FlagItem {
            name: &flags[offset..offset + c.len_utf8()],
            value: None,
            needs_value: position + 1 == count,
        })
        .collect()
}
